//! Schema Model.
//!
//! Parses the subset of JSON Schema the reifier understands into a
//! [`SchemaNode`] tree. The raw keywords are deserialized with serde (through
//! `serde_path_to_error`, so a bad keyword is reported with its pointer), then
//! folded into a [`SchemaKind`] that only carries the attributes meaningful for
//! that kind.
//!
//! Precedence when several shaping keywords appear on one node:
//! `$ref` > `enum`/`const` > type arrays > `allOf` > `anyOf` > `oneOf` > `not` > `type`.
//! Declared `properties` win over combinators (the combinators are ignored).
pub mod resolve;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

pub use resolve::{RefResolver, ResolvedRef};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: SchemaKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(ObjectSchema),
    Array { items: Option<Box<SchemaNode>> },
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// Closed set of literals sharing one primitive kind.
    Enum { base: Scalar, values: Vec<Value> },
    Reference(String),
    AllOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    Not(Box<SchemaNode>),
    /// `{}`: accepts anything.
    Any,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Document order is kept for stable output.
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub additional: AdditionalProperties,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    #[default]
    Allowed,
    Forbidden,
    Schema(Box<SchemaNode>),
}

/// Primitive kinds a literal (or an enum of literals) can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl Scalar {
    /// Kind of a literal; `None` for arrays and objects.
    pub fn of(value: &Value) -> Option<Scalar> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(_) => Some(Scalar::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Scalar::Integer),
            Value::Number(_) => Some(Scalar::Number),
            Value::String(_) => Some(Scalar::String),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether a literal of kind `other` is a member of this kind.
    fn admits(self, other: Scalar) -> bool {
        self == other || (self == Scalar::Number && other == Scalar::Integer)
    }
}

/// A whole schema document; `$ref` pointers are resolved against it.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// RAW KEYWORDS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SimpleType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawType {
    One(SimpleType),
    Many(Vec<SimpleType>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAdditional {
    Flag(bool),
    Schema(Box<RawSchema>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(rename = "type")]
    ty: Option<RawType>,
    title: Option<String>,
    description: Option<String>,
    properties: Option<IndexMap<String, RawSchema>>,
    required: Option<Vec<String>>,
    additional_properties: Option<RawAdditional>,
    items: Option<Box<RawSchema>>,
    #[serde(rename = "enum")]
    enum_: Option<Vec<Value>>,
    /// `"const": null` must stay distinguishable from an absent keyword.
    #[serde(rename = "const", default, deserialize_with = "present")]
    constant: Option<Value>,
    all_of: Option<Vec<RawSchema>>,
    any_of: Option<Vec<RawSchema>>,
    one_of: Option<Vec<RawSchema>>,
    not: Option<Box<RawSchema>>,
}

fn present<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    /// Parse a standalone schema value.
    pub fn from_value(value: &Value) -> Result<SchemaNode, SchemaError> {
        Self::parse_at(value, "")
    }

    /// Parse the schema found at `pointer` (used for error locations only).
    pub(crate) fn parse_at(value: &Value, pointer: &str) -> Result<SchemaNode, SchemaError> {
        let raw = deserialize_raw(value, pointer)?;
        convert(&raw, &raw_types(&raw), pointer)
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Object(_) => "object",
            SchemaKind::Array { .. } => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Enum { .. } => "enum",
            SchemaKind::Reference(_) => "$ref",
            SchemaKind::AllOf(_) => "allOf",
            SchemaKind::AnyOf(_) => "anyOf",
            SchemaKind::OneOf(_) => "oneOf",
            SchemaKind::Not(_) => "not",
            SchemaKind::Any => "any",
        }
    }

    /// Title and description, for doc comments.
    pub fn docs(&self) -> Vec<String> {
        [&self.title, &self.description]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

impl SchemaDocument {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Pointers (`#/definitions/x`, `#/$defs/y`) of every named definition, in
    /// document order.
    pub fn definition_pointers(&self) -> Vec<String> {
        let mut out = Vec::new();
        for section in ["definitions", "$defs"] {
            if let Some(Value::Object(defs)) = self.root.get(section) {
                for key in defs.keys() {
                    out.push(format!("#/{section}/{}", escape_pointer_segment(key)));
                }
            }
        }
        out
    }
}

/// RFC 6901 escaping of one reference token.
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Deserialize the keyword layer with JSON-path context in error messages.
fn deserialize_raw(value: &Value, pointer: &str) -> Result<RawSchema, SchemaError> {
    match serde_path_to_error::deserialize::<_, RawSchema>(value) {
        Ok(raw) => Ok(raw),
        Err(err) => {
            let mut at = pointer.to_string();
            for segment in err.path().iter() {
                match segment {
                    serde_path_to_error::Segment::Seq { index } => {
                        at.push_str(&format!("/{index}"));
                    }
                    serde_path_to_error::Segment::Map { key } => {
                        at.push('/');
                        at.push_str(&escape_pointer_segment(key));
                    }
                    serde_path_to_error::Segment::Enum { variant } => {
                        at.push('/');
                        at.push_str(variant);
                    }
                    serde_path_to_error::Segment::Unknown => {}
                }
            }
            Err(SchemaError::malformed(&at, err.into_inner().to_string()))
        }
    }
}

fn raw_types(raw: &RawSchema) -> Vec<SimpleType> {
    match &raw.ty {
        None => Vec::new(),
        Some(RawType::One(t)) => vec![*t],
        Some(RawType::Many(ts)) => ts.clone(),
    }
}

fn convert(raw: &RawSchema, types: &[SimpleType], pointer: &str) -> Result<SchemaNode, SchemaError> {
    let node = |kind| SchemaNode {
        title: raw.title.clone(),
        description: raw.description.clone(),
        kind,
    };

    if let Some(reference) = &raw.reference {
        return Ok(node(SchemaKind::Reference(reference.clone())));
    }

    if raw.items.is_some() && !types.contains(&SimpleType::Array) {
        return Err(SchemaError::malformed(pointer, "`items` requires `type: array`"));
    }
    let has_properties = raw.properties.as_ref().is_some_and(|p| !p.is_empty());
    if raw.properties.is_some() && !types.is_empty() && !types.contains(&SimpleType::Object) {
        return Err(SchemaError::malformed(pointer, "`properties` requires `type: object`"));
    }

    let literals = match (&raw.enum_, &raw.constant) {
        (Some(values), _) => Some(values.clone()),
        (None, Some(value)) => Some(vec![value.clone()]),
        (None, None) => None,
    };
    if let Some(values) = literals {
        let base = enum_base(&values, types, pointer)?;
        return Ok(node(SchemaKind::Enum { base, values }));
    }

    if types.len() > 1 {
        let mut branches = Vec::with_capacity(types.len());
        for ty in types {
            let mut narrowed = raw.clone();
            narrowed.title = None;
            narrowed.description = None;
            if *ty != SimpleType::Array {
                narrowed.items = None;
            }
            if *ty != SimpleType::Object {
                narrowed.properties = None;
                narrowed.required = None;
                narrowed.additional_properties = None;
            }
            branches.push(convert(&narrowed, std::slice::from_ref(ty), pointer)?);
        }
        return Ok(node(SchemaKind::OneOf(branches)));
    }

    let combinators = [
        ("allOf", &raw.all_of),
        ("anyOf", &raw.any_of),
        ("oneOf", &raw.one_of),
    ];
    let mut present_combinators = combinators.iter().filter(|(_, b)| b.is_some());
    if let Some((keyword, Some(branches))) = present_combinators.next() {
        if has_properties {
            tracing::warn!(pointer, keyword, "`{keyword}` alongside `properties` is ignored");
        } else {
            for (ignored, _) in present_combinators {
                tracing::warn!(pointer, keyword = ignored, "`{ignored}` ignored in favour of `{keyword}`");
            }
            let mut nodes = Vec::with_capacity(branches.len());
            for (index, branch) in branches.iter().enumerate() {
                let at = format!("{pointer}/{keyword}/{index}");
                nodes.push(convert(branch, &raw_types(branch), &at)?);
            }
            if nodes.is_empty() {
                return Err(SchemaError::malformed(pointer, format!("`{keyword}` needs at least one branch")));
            }
            let kind = match *keyword {
                "allOf" => SchemaKind::AllOf(nodes),
                "anyOf" => SchemaKind::AnyOf(nodes),
                _ => SchemaKind::OneOf(nodes),
            };
            return Ok(node(kind));
        }
    }

    if let Some(negated) = &raw.not {
        if types.is_empty() && !has_properties {
            let at = format!("{pointer}/not");
            let inner = convert(negated, &raw_types(negated), &at)?;
            return Ok(node(SchemaKind::Not(Box::new(inner))));
        }
        tracing::warn!(pointer, "`not` alongside other keywords is ignored");
    }

    let kind = match types.first() {
        Some(SimpleType::Object) => SchemaKind::Object(convert_object(raw, pointer)?),
        None if raw.properties.is_some()
            || raw.required.is_some()
            || raw.additional_properties.is_some() =>
        {
            SchemaKind::Object(convert_object(raw, pointer)?)
        }
        Some(SimpleType::Array) => {
            let items = match &raw.items {
                Some(items) => {
                    let at = format!("{pointer}/items");
                    Some(Box::new(convert(items, &raw_types(items), &at)?))
                }
                None => None,
            };
            SchemaKind::Array { items }
        }
        Some(SimpleType::String) => SchemaKind::String,
        Some(SimpleType::Number) => SchemaKind::Number,
        Some(SimpleType::Integer) => SchemaKind::Integer,
        Some(SimpleType::Boolean) => SchemaKind::Boolean,
        Some(SimpleType::Null) => SchemaKind::Null,
        None => SchemaKind::Any,
    };
    Ok(node(kind))
}

fn convert_object(raw: &RawSchema, pointer: &str) -> Result<ObjectSchema, SchemaError> {
    let mut properties = IndexMap::new();
    for (key, prop) in raw.properties.iter().flatten() {
        let at = format!("{pointer}/properties/{}", escape_pointer_segment(key));
        properties.insert(key.clone(), convert(prop, &raw_types(prop), &at)?);
    }

    let mut required: Vec<String> = Vec::new();
    for name in raw.required.iter().flatten() {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }

    let additional = match &raw.additional_properties {
        None | Some(RawAdditional::Flag(true)) => AdditionalProperties::Allowed,
        Some(RawAdditional::Flag(false)) => AdditionalProperties::Forbidden,
        Some(RawAdditional::Schema(schema)) => {
            let at = format!("{pointer}/additionalProperties");
            AdditionalProperties::Schema(Box::new(convert(schema, &raw_types(schema), &at)?))
        }
    };

    Ok(ObjectSchema { properties, required, additional })
}

fn enum_base(values: &[Value], types: &[SimpleType], pointer: &str) -> Result<Scalar, SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::malformed(pointer, "`enum` must list at least one value"));
    }
    let mut kinds = Vec::with_capacity(values.len());
    for value in values {
        match Scalar::of(value) {
            Some(kind) => kinds.push(kind),
            None => {
                return Err(SchemaError::malformed(
                    pointer,
                    format!("enum literal {value} is not a scalar"),
                ));
            }
        }
    }

    let declared = match types {
        [SimpleType::String] => Some(Scalar::String),
        [SimpleType::Number] => Some(Scalar::Number),
        [SimpleType::Integer] => Some(Scalar::Integer),
        [SimpleType::Boolean] => Some(Scalar::Boolean),
        [SimpleType::Null] => Some(Scalar::Null),
        [SimpleType::Object] | [SimpleType::Array] => {
            return Err(SchemaError::malformed(pointer, "`enum` requires a scalar `type`"));
        }
        _ => None,
    };

    let base = match declared {
        Some(base) => base,
        None => {
            let first = kinds[0];
            if kinds.iter().all(|k| *k == first) {
                first
            } else if kinds.iter().all(|k| Scalar::Number.admits(*k)) {
                Scalar::Number
            } else {
                return Err(SchemaError::malformed(pointer, "enum literals must share one primitive kind"));
            }
        }
    };

    if let Some((value, _)) = values.iter().zip(&kinds).find(|(_, k)| !base.admits(**k)) {
        return Err(SchemaError::malformed(
            pointer,
            format!("enum literal {value} does not match the declared type"),
        ));
    }
    Ok(base)
}
