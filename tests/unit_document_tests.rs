//! # Document Module Unit Tests / Document 模块单元测试
//!
//! Tests for the report document schemas: attachments, failures and steps.
//!
//! 测试报告文档模式：附件、失败记录和步骤。

mod common;

use common::contains_in_order;
use step_report::markup::to_xml_fragment;
use step_report::reporting::run_unit;
use step_report::{Attachment, Failure};

#[cfg(test)]
mod document_shape_tests {
    use super::*;

    #[test]
    fn test_attachment_without_mime_type_omits_type() {
        let attachment = Attachment::new("log", b"a<b".to_vec());
        assert_eq!(
            to_xml_fragment(&attachment),
            r#"<attachment title="log" size="3"><content>a&lt;b</content></attachment>"#
        );
    }

    #[test]
    fn test_attachment_with_mime_type() {
        let attachment = Attachment::new("page", "<p/>").with_mime_type("text/html");
        assert_eq!(
            to_xml_fragment(&attachment),
            r#"<attachment title="page" type="text/html" size="4"><content>&lt;p/&gt;</content></attachment>"#
        );
    }

    #[test]
    fn test_failure_without_stack_trace_has_only_message() {
        let failure = Failure::new("boom");
        assert_eq!(
            to_xml_fragment(&failure),
            "<failure><message>boom</message></failure>"
        );
        let failure = Failure::new("boom").with_stack_trace("at line 1");
        assert_eq!(
            to_xml_fragment(&failure),
            "<failure><message>boom</message><stack-trace>at line 1</stack-trace></failure>"
        );
    }

    #[test]
    fn test_closed_leaf_step_self_closes() {
        let report = run_unit("unit", |tracker| {
            tracker.step("leaf", || ());
            Ok(())
        });
        let xml = to_xml_fragment(&report.steps()[0]);
        assert!(contains_in_order(
            &xml,
            &[r#"<step name="leaf""#, "start=", "stop=", r#"status="passed"/>"#]
        ));
        assert!(!xml.contains("</step>"));
    }
}
