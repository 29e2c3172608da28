//! # Document Schemas Module / 文档模式模块
//!
//! The XML shape of every report type, declared once with [`Schema`].
//!
//! ```text
//! <test-case id="…" start="…" stop="…" status="…">
//!   <name>…</name>
//!   <failure><message>…</message><stack-trace>…</stack-trace></failure>
//!   <steps>
//!     <step name="…" start="…" stop="…" status="…">
//!       <steps>…</steps>
//!       <attachments><attachment title="…" type="…" size="…"><content>…</content></attachment></attachments>
//!     </step>
//!   </steps>
//!   <attachments>…</attachments>
//! </test-case>
//! ```
//!
//! 每种报告类型的 XML 结构，通过 [`Schema`] 一次性声明。

use once_cell::sync::Lazy;

use crate::core::models::{Attachment, Failure, Status, Step, TestCaseReport};
use crate::markup::{Attribute, Element, Many, Nested, Schema, ToValue, Value, Xmlfied, to_xml};
use crate::reporting::suite::SuiteReport;

fn millis(value: f64) -> Value<'static> {
    Value::text(value.to_string())
}

fn status(value: Option<Status>) -> Value<'static> {
    value.map_or(Value::Absent, |status| Value::text(status.as_str()))
}

fn is_empty(value: &Value<'_>) -> bool {
    value.is_empty()
}

static ATTACHMENT_SCHEMA: Lazy<Schema<Attachment>> = Lazy::new(|| {
    Schema::<Attachment>::new("attachment")
        .field("title", Attribute::new(), |attachment| {
            Value::text(attachment.title())
        })
        .field("type", Attribute::new(), |attachment| {
            attachment
                .mime_type()
                .map_or(Value::Absent, |mime_type| Value::text(mime_type))
        })
        .field("size", Attribute::new(), |attachment| {
            Value::text(attachment.size().to_string())
        })
        .field("content", Element::new(), |attachment| {
            Value::bytes(attachment.content())
        })
});

static STEP_SCHEMA: Lazy<Schema<Step>> = Lazy::new(|| {
    Schema::<Step>::new("step")
        .field("name", Attribute::new(), |step| Value::text(step.name()))
        .field("start", Attribute::new(), |step| millis(step.start()))
        .field("stop", Attribute::new(), |step| {
            step.stop().map_or(Value::Absent, millis)
        })
        .field("status", Attribute::new(), |step| status(step.status()))
        .field(
            "steps",
            Many::new(Nested::new()).wrapped("steps").if_(is_empty),
            |step| Value::nodes(step.children()),
        )
        .field(
            "attachments",
            Many::new(Nested::new()).wrapped("attachments").if_(is_empty),
            |step| Value::nodes(step.attachments()),
        )
});

static FAILURE_SCHEMA: Lazy<Schema<Failure>> = Lazy::new(|| {
    Schema::<Failure>::new("failure")
        .field("message", Element::new(), |failure| {
            Value::text(failure.message.as_str())
        })
        .field("stack_trace", Element::new().if_(is_empty), |failure| {
            failure.stack_trace.to_value()
        })
});

static TEST_CASE_SCHEMA: Lazy<Schema<TestCaseReport>> = Lazy::new(|| {
    Schema::<TestCaseReport>::new("test-case")
        .field("id", Attribute::new(), |report| {
            Value::text(report.id().to_string())
        })
        .field("start", Attribute::new(), |report| millis(report.start()))
        .field("stop", Attribute::new(), |report| millis(report.stop()))
        .field("status", Attribute::new(), |report| {
            status(Some(report.status()))
        })
        .field("name", Element::new(), |report| Value::text(report.name()))
        .field("failure", Nested::new(), |report| {
            report.failure().map_or(Value::Absent, |failure| Value::node(failure))
        })
        .field("steps", Many::new(Nested::new()).wrapped("steps"), |report| {
            Value::nodes(report.steps())
        })
        .field(
            "attachments",
            Many::new(Nested::new()).wrapped("attachments").if_(is_empty),
            |report| Value::nodes(report.attachments()),
        )
});

static TEST_SUITE_SCHEMA: Lazy<Schema<SuiteReport>> = Lazy::new(|| {
    Schema::<SuiteReport>::new("test-suite")
        .field("id", Attribute::new(), |suite| {
            Value::text(suite.id().to_string())
        })
        .field("start", Attribute::new(), |suite| millis(suite.start()))
        .field("stop", Attribute::new(), |suite| millis(suite.stop()))
        .field("name", Element::new(), |suite| Value::text(suite.name()))
        .field(
            "test_cases",
            Many::new(Nested::new()).wrapped("test-cases"),
            |suite| Value::nodes(suite.cases()),
        )
});

impl Xmlfied for Attachment {
    fn schema() -> &'static Schema<Self> {
        &ATTACHMENT_SCHEMA
    }
}

impl Xmlfied for Step {
    fn schema() -> &'static Schema<Self> {
        &STEP_SCHEMA
    }
}

impl Xmlfied for Failure {
    fn schema() -> &'static Schema<Self> {
        &FAILURE_SCHEMA
    }
}

impl Xmlfied for TestCaseReport {
    fn schema() -> &'static Schema<Self> {
        &TEST_CASE_SCHEMA
    }
}

impl Xmlfied for SuiteReport {
    fn schema() -> &'static Schema<Self> {
        &TEST_SUITE_SCHEMA
    }
}

impl TestCaseReport {
    /// Renders the report as a standalone `test-case` document.
    /// 将报告渲染为独立的 `test-case` 文档。
    pub fn to_xml(&self) -> Vec<u8> {
        to_xml(self)
    }
}

impl SuiteReport {
    /// Renders the suite as a `test-suite` document embedding every test case.
    /// 将测试套件渲染为包含所有测试用例的 `test-suite` 文档。
    pub fn to_xml(&self) -> Vec<u8> {
        to_xml(self)
    }
}
