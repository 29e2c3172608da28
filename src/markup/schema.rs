//! # Markup Schema Module / 标记模式模块
//!
//! A [`Schema`] is the declaration, made once per type, of how that type renders to an
//! XML element: the element's root tag plus an ordered list of fields, each with a
//! descriptor and an accessor.
//!
//! Descriptors:
//! - [`Attribute`] renders `key="value"` on the owning element;
//! - [`Element`] renders `<key>value</key>`;
//! - [`Nested`] renders another schema-described object under its own root tag;
//! - [`Many`] renders one sibling per item of a sequence with an inner descriptor,
//!   optionally grouped in a container element.
//!
//! Every descriptor accepts `if_(predicate)`: the field is left out when the predicate
//! holds for its value. Absent values (`None`) are always left out.
//!
//! Fields render in declaration order; attributes necessarily land in the start tag,
//! ahead of any child element.
//!
//! 模式是每个类型只声明一次的、关于如何渲染为 XML 元素的声明：
//! 元素的根标签加上有序的字段列表，每个字段都有描述符和访问器。

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::core::models::Status;
use crate::markup::text::decode_lossy;
use crate::markup::writer::XmlWriter;

/// A field value as seen by the serializer.
pub enum Value<'a> {
    /// Nothing to render; the field is omitted.
    Absent,
    /// Raw content; need not be valid UTF-8.
    Text(Cow<'a, [u8]>),
    /// A schema-described object.
    Node(&'a dyn Markup),
    /// An ordered sequence of values.
    List(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        match text.into() {
            Cow::Borrowed(text) => Value::Text(Cow::Borrowed(text.as_bytes())),
            Cow::Owned(text) => Value::Text(Cow::Owned(text.into_bytes())),
        }
    }

    pub fn bytes(bytes: &'a [u8]) -> Self {
        Value::Text(Cow::Borrowed(bytes))
    }

    pub fn node<M: Markup>(node: &'a M) -> Self {
        Value::Node(node)
    }

    /// One [`Value::Node`] per item, in order.
    pub fn nodes<M: Markup>(nodes: &'a [M]) -> Self {
        Value::List(nodes.iter().map(|node| Value::Node(node)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value<'a>>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Absent values, empty text and empty lists are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Absent => true,
            Value::Text(text) => text.is_empty(),
            Value::Node(_) => false,
            Value::List(items) => items.is_empty(),
        }
    }

    /// The text content decoded for inspection, if this is a text value.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(text) => Some(decode_lossy(text)),
            _ => None,
        }
    }

    fn items(&self) -> &[Value<'a>] {
        match self {
            Value::Absent => &[],
            Value::List(items) => items,
            single => std::slice::from_ref(single),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("Absent"),
            Value::Text(text) => f.debug_tuple("Text").field(&decode_lossy(text)).finish(),
            Value::Node(_) => f.write_str("Node(..)"),
            Value::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

/// Conversion of field data into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::text(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::text(self.as_str())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(value) => value.to_value(),
            None => Value::Absent,
        }
    }
}

impl ToValue for Status {
    fn to_value(&self) -> Value<'_> {
        Value::text(self.as_str())
    }
}

impl ToValue for uuid::Uuid {
    fn to_value(&self) -> Value<'_> {
        Value::text(self.to_string())
    }
}

macro_rules! display_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::text(self.to_string())
                }
            }
        )*
    };
}

display_to_value!(bool, i32, i64, u32, u64, usize, f64);

/// Suppression predicate attached with `if_`.
type Gate = Arc<dyn Fn(&Value<'_>) -> bool + Send + Sync>;

/// The serialized key: the explicit name, else the field name with `_` mapped to `-`.
fn key<'n>(explicit: Option<&'n str>, field: &str) -> Cow<'n, str> {
    match explicit {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(field.replace('_', "-")),
    }
}

/// Renders a field as an attribute of the owning element.
#[derive(Clone, Default)]
pub struct Attribute {
    name: Option<Cow<'static, str>>,
    gate: Option<Gate>,
}

impl Attribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the serialized key.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
            gate: None,
        }
    }

    /// Leaves the field out whenever `predicate` holds for its value.
    pub fn if_(mut self, predicate: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.gate = Some(Arc::new(predicate));
        self
    }
}

/// Renders a field as a child element holding the value as text.
#[derive(Clone, Default)]
pub struct Element {
    name: Option<Cow<'static, str>>,
    gate: Option<Gate>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the element name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
            gate: None,
        }
    }

    /// Leaves the element out whenever `predicate` holds for its value.
    pub fn if_(mut self, predicate: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.gate = Some(Arc::new(predicate));
        self
    }
}

/// Renders a schema-described object as a child element under its own root tag.
#[derive(Clone, Default)]
pub struct Nested {
    gate: Option<Gate>,
}

impl Nested {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn if_(mut self, predicate: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.gate = Some(Arc::new(predicate));
        self
    }
}

/// Renders every item of a sequence with an inner descriptor, as siblings.
///
/// `Many` over an [`Attribute`] renders a single attribute with space-separated values.
#[derive(Clone)]
pub struct Many {
    inner: Box<Rule>,
    container: Option<Cow<'static, str>>,
    gate: Option<Gate>,
}

impl Many {
    pub fn new(inner: impl Into<Rule>) -> Self {
        Self {
            inner: Box::new(inner.into()),
            container: None,
            gate: None,
        }
    }

    /// Groups the items inside a `<container>` element.
    pub fn wrapped(mut self, container: impl Into<Cow<'static, str>>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Leaves the whole sequence out whenever `predicate` holds for it.
    pub fn if_(mut self, predicate: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.gate = Some(Arc::new(predicate));
        self
    }
}

/// Any field descriptor.
#[derive(Clone)]
pub enum Rule {
    Attribute(Attribute),
    Element(Element),
    Nested(Nested),
    Many(Many),
}

impl From<Attribute> for Rule {
    fn from(rule: Attribute) -> Self {
        Rule::Attribute(rule)
    }
}

impl From<Element> for Rule {
    fn from(rule: Element) -> Self {
        Rule::Element(rule)
    }
}

impl From<Nested> for Rule {
    fn from(rule: Nested) -> Self {
        Rule::Nested(rule)
    }
}

impl From<Many> for Rule {
    fn from(rule: Many) -> Self {
        Rule::Many(rule)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gated = self.gate().is_some();
        match self {
            Rule::Attribute(rule) => f
                .debug_struct("Attribute")
                .field("name", &rule.name)
                .field("gated", &gated)
                .finish(),
            Rule::Element(rule) => f
                .debug_struct("Element")
                .field("name", &rule.name)
                .field("gated", &gated)
                .finish(),
            Rule::Nested(_) => f.debug_struct("Nested").field("gated", &gated).finish(),
            Rule::Many(rule) => f
                .debug_struct("Many")
                .field("inner", &rule.inner)
                .field("container", &rule.container)
                .field("gated", &gated)
                .finish(),
        }
    }
}

impl Rule {
    fn gate(&self) -> Option<&Gate> {
        match self {
            Rule::Attribute(rule) => rule.gate.as_ref(),
            Rule::Element(rule) => rule.gate.as_ref(),
            Rule::Nested(rule) => rule.gate.as_ref(),
            Rule::Many(rule) => rule.gate.as_ref(),
        }
    }

    /// Whether `value` is left out under this rule.
    pub fn suppresses(&self, value: &Value<'_>) -> bool {
        value.is_absent() || self.gate().is_some_and(|gate| gate(value))
    }

    fn is_attribute(&self) -> bool {
        match self {
            Rule::Attribute(_) => true,
            Rule::Many(many) => many.inner.is_attribute(),
            _ => false,
        }
    }

    fn write_attribute(&self, field: &str, value: &Value<'_>, writer: &mut XmlWriter) {
        match self {
            Rule::Attribute(rule) => {
                let name = key(rule.name.as_deref(), field);
                writer.attribute(&name, &attribute_text(value));
            }
            Rule::Many(many) => {
                let Rule::Attribute(rule) = many.inner.as_ref() else {
                    return;
                };
                let joined = value
                    .items()
                    .iter()
                    .filter(|item| !many.inner.suppresses(item))
                    .map(attribute_text)
                    .collect::<Vec<_>>()
                    .join(&b' ');
                let name = key(rule.name.as_deref(), field);
                writer.attribute(&name, &joined);
            }
            _ => {}
        }
    }

    fn write_child(&self, field: &str, value: &Value<'_>, writer: &mut XmlWriter) {
        match (self, value) {
            (_, Value::Absent) => {}
            (Rule::Many(many), value) => {
                if let Some(container) = &many.container {
                    writer.start_element(container);
                }
                for item in value.items() {
                    if !many.inner.suppresses(item) {
                        many.inner.write_child(field, item, writer);
                    }
                }
                if many.container.is_some() {
                    writer.end_element();
                }
            }
            (rule, Value::List(items)) => {
                for item in items {
                    if !rule.suppresses(item) {
                        rule.write_child(field, item, writer);
                    }
                }
            }
            (Rule::Nested(_), Value::Node(node)) => node.write_markup(writer),
            (Rule::Element(rule), Value::Node(node)) => {
                writer.start_element(&key(rule.name.as_deref(), field));
                node.write_markup(writer);
                writer.end_element();
            }
            (Rule::Element(rule), Value::Text(text)) => {
                writer.text_element(&key(rule.name.as_deref(), field), text);
            }
            (Rule::Nested(_), Value::Text(text)) => {
                writer.text_element(&key(None, field), text);
            }
            (Rule::Attribute(_), _) => {}
        }
    }
}

fn attribute_text(value: &Value<'_>) -> Vec<u8> {
    match value {
        Value::Text(text) => text.to_vec(),
        Value::List(items) => items
            .iter()
            .map(attribute_text)
            .collect::<Vec<_>>()
            .join(&b' '),
        Value::Node(node) => {
            let mut writer = XmlWriter::new();
            node.write_markup(&mut writer);
            writer.finish()
        }
        Value::Absent => Vec::new(),
    }
}

/// Reads one field's value from an object.
pub type Accessor<T> = for<'a> fn(&'a T) -> Value<'a>;

struct Field<T> {
    name: &'static str,
    rule: Rule,
    get: Accessor<T>,
}

/// The ordered rendering declaration of a type.
pub struct Schema<T> {
    root: Cow<'static, str>,
    fields: Vec<Field<T>>,
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("root", &self.root)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|field| (field.name, &field.rule))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T> Schema<T> {
    /// Starts a schema for elements tagged `root`.
    pub fn new(root: impl Into<Cow<'static, str>>) -> Self {
        Self {
            root: root.into(),
            fields: Vec::new(),
        }
    }

    /// Declares the next field. Declaration order is render order.
    pub fn field(mut self, name: &'static str, rule: impl Into<Rule>, get: Accessor<T>) -> Self {
        self.fields.push(Field {
            name,
            rule: rule.into(),
            get,
        });
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Renders `object` as one element.
    pub fn render(&self, object: &T, writer: &mut XmlWriter) {
        let values: Vec<(&Field<T>, Value<'_>)> = self
            .fields
            .iter()
            .map(|field| (field, (field.get)(object)))
            .filter(|(field, value)| !field.rule.suppresses(value))
            .collect();

        writer.start_element(&self.root);
        for (field, value) in values.iter().filter(|(field, _)| field.rule.is_attribute()) {
            field.rule.write_attribute(field.name, value, writer);
        }
        for (field, value) in values.iter().filter(|(field, _)| !field.rule.is_attribute()) {
            field.rule.write_child(field.name, value, writer);
        }
        writer.end_element();
    }
}

/// Anything that can write itself as markup. Object safe; used for nested values.
pub trait Markup {
    fn write_markup(&self, writer: &mut XmlWriter);
}

/// A type with a static [`Schema`].
pub trait Xmlfied: Sized + 'static {
    fn schema() -> &'static Schema<Self>;
}

impl<T: Xmlfied> Markup for T {
    fn write_markup(&self, writer: &mut XmlWriter) {
        T::schema().render(self, writer);
    }
}
