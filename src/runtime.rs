//! Runtime Codec Contract.
//!
//! Generated types implement [`Codec`] on top of the helpers in this module:
//! [`ObjectReader`]/[`ObjectWriter`] for records, [`decode_one_of`] and
//! [`ensure_any_match`] for sums, [`decode_enum`] for closed enums. The
//! [`crate::codec`] interpreter follows the same rules for any module.
//!
//! Decoding validates while it builds; every error carries the [`JsonPath`]
//! of the offending value. Encoding is total.
use std::fmt;

use thiserror::Error;

pub use indexmap::IndexMap;
pub use serde_json::{Map, Number, Value};

// ————————————————————————————————————————————————————————————————————————————
// PATHS
// ————————————————————————————————————————————————————————————————————————————

/// Location inside a JSON instance, shown pointer-style: `#/list/1/prop`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> JsonPath {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.to_string()));
        next
    }

    pub fn index(&self, index: usize) -> JsonPath {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?,
                PathSegment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        })
    }
}

/// Why a JSON value does not fit a generated type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing required property \"{name}\" at {path}")]
    MissingRequiredProperty { name: String, path: JsonPath },

    /// Key not declared by a closed record.
    #[error("unexpected property \"{name}\" at {path}")]
    UnexpectedProperty { name: String, path: JsonPath },

    #[error("expected {expected} at {path}")]
    TypeMismatch { expected: ValueKind, path: JsonPath },

    #[error("invalid value {value} at {path}; expected one of {}", literal_list(.allowed))]
    InvalidEnumValue { value: Value, allowed: Vec<Value>, path: JsonPath },

    /// More than one `oneOf` branch accepted the value.
    #[error("value at {path} matches several oneOf branches: {}", .branches.join(", "))]
    AmbiguousOneOf { branches: Vec<String>, path: JsonPath },

    #[error("value at {path} matches no branch")]
    NoMatchingBranch { path: JsonPath },

    /// The value is accepted by a `not` branch of an `allOf`.
    #[error("value at {path} matches the negated branch `{branch}`")]
    NegatedMatch { branch: String, path: JsonPath },

    #[error("expected object at {path}")]
    ExpectedObject { path: JsonPath },

    #[error("expected array at {path}")]
    ExpectedArray { path: JsonPath },
}

fn literal_list(values: &[Value]) -> String {
    values.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
}

impl DecodeError {
    pub fn path(&self) -> &JsonPath {
        match self {
            DecodeError::MissingRequiredProperty { path, .. }
            | DecodeError::UnexpectedProperty { path, .. }
            | DecodeError::TypeMismatch { path, .. }
            | DecodeError::InvalidEnumValue { path, .. }
            | DecodeError::AmbiguousOneOf { path, .. }
            | DecodeError::NoMatchingBranch { path }
            | DecodeError::NegatedMatch { path, .. }
            | DecodeError::ExpectedObject { path }
            | DecodeError::ExpectedArray { path } => path,
        }
    }

    pub(crate) fn mismatch(expected: ValueKind, path: &JsonPath) -> Self {
        DecodeError::TypeMismatch { expected, path: path.clone() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CODEC
// ————————————————————————————————————————————————————————————————————————————

/// Decode from and encode to a JSON value.
///
/// For every `v` that decodes, `encode(decode(v)) == v`.
pub trait Codec: Sized {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError>;
    fn encode(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Self::decode(value, &JsonPath::root())
    }
}

impl Codec for String {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch(ValueKind::String, path))
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Numbers keep their exact textual form for the round trip.
impl Codec for Number {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        match value {
            Value::Number(n) => Ok(n.clone()),
            _ => Err(DecodeError::mismatch(ValueKind::Number, path)),
        }
    }

    fn encode(&self) -> Value {
        Value::Number(self.clone())
    }
}

/// `integer` values must fit in `i64`.
impl Codec for i64 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        value.as_i64().ok_or_else(|| DecodeError::mismatch(ValueKind::Integer, path))
    }

    fn encode(&self) -> Value {
        Value::from(*self)
    }
}

impl Codec for bool {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        value.as_bool().ok_or_else(|| DecodeError::mismatch(ValueKind::Boolean, path))
    }

    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Codec for () {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        value.as_null().ok_or_else(|| DecodeError::mismatch(ValueKind::Null, path))
    }

    fn encode(&self) -> Value {
        Value::Null
    }
}

/// Untyped: accepts anything.
impl Codec for Value {
    fn decode(value: &Value, _path: &JsonPath) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }

    fn encode(&self) -> Value {
        self.clone()
    }
}

impl<T: Codec> Codec for Vec<T> {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let items = value
            .as_array()
            .ok_or_else(|| DecodeError::ExpectedArray { path: path.clone() })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::decode(item, &path.index(i)))
            .collect()
    }

    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Codec::encode).collect())
    }
}

impl<T: Codec> Codec for Box<T> {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        T::decode(value, path).map(Box::new)
    }

    fn encode(&self) -> Value {
        (**self).encode()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORDS
// ————————————————————————————————————————————————————————————————————————————

/// Property access on an object being decoded.
pub struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    path: &'a JsonPath,
}

impl<'a> ObjectReader<'a> {
    pub fn new(value: &'a Value, path: &'a JsonPath) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            _ => Err(DecodeError::ExpectedObject { path: path.clone() }),
        }
    }

    pub fn path(&self) -> &'a JsonPath {
        self.path
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn entries(&self) -> &'a Map<String, Value> {
        self.map
    }

    pub fn missing(&self, key: &str) -> DecodeError {
        DecodeError::MissingRequiredProperty { name: key.to_string(), path: self.path.clone() }
    }

    pub fn required<T: Codec>(&self, key: &str) -> Result<T, DecodeError> {
        match self.map.get(key) {
            Some(value) => T::decode(value, &self.path.key(key)),
            None => Err(self.missing(key)),
        }
    }

    pub fn optional<T: Codec>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        self.map
            .get(key)
            .map(|value| T::decode(value, &self.path.key(key)))
            .transpose()
    }

    /// First key (in input order) not in `known`.
    pub fn deny_unknown(&self, known: &[&str]) -> Result<(), DecodeError> {
        match self.map.keys().find(|k| !known.contains(&k.as_str())) {
            Some(name) => Err(DecodeError::UnexpectedProperty {
                name: name.clone(),
                path: self.path.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Keys not in `known`, decoded as `T`, in input order.
    pub fn remaining<T: Codec>(&self, known: &[&str]) -> Result<IndexMap<String, T>, DecodeError> {
        self.map
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| Ok((k.clone(), T::decode(v, &self.path.key(k))?)))
            .collect()
    }
}

/// Builds the object encoding of a record.
#[derive(Debug, Default)]
pub struct ObjectWriter {
    map: Map<String, Value>,
}

impl ObjectWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required<T: Codec>(&mut self, key: &str, value: &T) {
        self.map.insert(key.to_string(), value.encode());
    }

    /// Absent stays absent.
    pub fn optional<T: Codec>(&mut self, key: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.required(key, value);
        }
    }

    pub fn extend<T: Codec>(&mut self, extra: &IndexMap<String, T>) {
        for (key, value) in extra {
            self.map.entry(key.clone()).or_insert_with(|| value.encode());
        }
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENUMS & SUMS
// ————————————————————————————————————————————————————————————————————————————

/// Index of the literal equal to `value` (same kind, same value).
pub fn decode_enum(value: &Value, path: &JsonPath, literals: &[Value]) -> Result<usize, DecodeError> {
    literals
        .iter()
        .position(|literal| literal == value)
        .ok_or_else(|| DecodeError::InvalidEnumValue {
            value: value.clone(),
            allowed: literals.to_vec(),
            path: path.clone(),
        })
}

pub type DecodeFn<'a, T> = &'a dyn Fn(&Value, &JsonPath) -> Result<T, DecodeError>;

/// One branch of a sum, for [`decode_one_of`].
pub struct Alternative<'a, T> {
    pub name: &'a str,
    pub decode: DecodeFn<'a, T>,
}

/// Exactly one alternative must accept the value; all are tried.
pub fn decode_one_of<T>(value: &Value, path: &JsonPath, alternatives: &[Alternative<'_, T>]) -> Result<T, DecodeError> {
    let mut matched: Vec<(&str, T)> = Vec::new();
    for alternative in alternatives {
        if let Ok(decoded) = (alternative.decode)(value, path) {
            matched.push((alternative.name, decoded));
        }
    }
    match matched.len() {
        0 => Err(DecodeError::NoMatchingBranch { path: path.clone() }),
        1 => Ok(matched.remove(0).1),
        _ => Err(DecodeError::AmbiguousOneOf {
            branches: matched.into_iter().map(|(name, _)| name.to_string()).collect(),
            path: path.clone(),
        }),
    }
}

/// Decode one `anyOf` branch; a failure only means "not this one".
pub fn try_branch<T: Codec>(value: &Value, path: &JsonPath) -> Option<T> {
    T::decode(value, path).ok()
}

/// `anyOf` needs at least one accepting branch.
pub fn ensure_any_match(matched: bool, path: &JsonPath) -> Result<(), DecodeError> {
    if matched {
        Ok(())
    } else {
        Err(DecodeError::NoMatchingBranch { path: path.clone() })
    }
}

/// Fails when `T` accepts the value (a `not` branch of an `allOf`).
pub fn reject_negated<T: Codec>(value: &Value, path: &JsonPath, branch: &str) -> Result<(), DecodeError> {
    match T::decode(value, path) {
        Ok(_) => Err(DecodeError::NegatedMatch { branch: branch.to_string(), path: path.clone() }),
        Err(_) => Ok(()),
    }
}

/// Combine the encodings of several matched `anyOf` branches.
///
/// Objects are merged key by key, earlier branches winning; anything else is
/// represented by the first encoding.
pub fn merge_encoded(encodings: Vec<Value>) -> Value {
    let mut encodings = encodings.into_iter();
    let Some(first) = encodings.next() else {
        return Value::Null;
    };
    match first {
        Value::Object(mut map) => {
            for next in encodings {
                if let Value::Object(other) = next {
                    for (key, value) in other {
                        map.entry(key).or_insert(value);
                    }
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}
