//! # Markup Module / 标记模块
//!
//! Declarative XML mapping: a type declares once, as an ordered list of field
//! descriptors, how it renders to an element; the writer walks the object graph and
//! produces a well-formed document from arbitrary (even non-UTF-8) content.
//!
//! 声明式 XML 映射：类型以有序字段描述符列表的形式一次性声明如何渲染为元素；
//! 写入器遍历对象图，并从任意（甚至非 UTF-8）内容生成格式良好的文档。

pub mod schema;
pub mod text;
pub mod writer;

// Re-exports
pub use schema::{Attribute, Element, Many, Markup, Nested, Rule, Schema, ToValue, Value, Xmlfied};
pub use writer::{XmlWriter, to_xml, to_xml_fragment};
