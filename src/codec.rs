//! Module-driven codec.
//!
//! Interprets the runtime contract for any type of a [`CodeModule`] without
//! generating code: a JSON value decodes into a dynamic [`Instance`] that
//! encodes back to an equivalent value. Generated code and this interpreter
//! agree on every accept/reject decision and on error paths.
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::ir::{
    Additional, CodeModule, Exclusivity, MergeStep, Merged, Primitive, Record, SumType, TypeId, TypeRef,
    TypeSpec,
};
use crate::runtime::{decode_enum, merge_encoded, Codec, DecodeError, JsonPath, ObjectReader};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Instance {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(Number),
    String(String),
    Array(Vec<Instance>),
    Any(Value),
    Record(RecordInstance),
    Enum { ty: TypeId, case: String, literal: Value },
    /// The single `oneOf` branch that accepted the value.
    OneOf { ty: TypeId, branch: String, value: Box<Instance> },
    /// Every `anyOf` branch that accepted the value, in declaration order.
    AnyOf { ty: TypeId, matches: Vec<(String, Instance)> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordInstance {
    pub ty: TypeId,
    /// Present properties, in declaration order.
    pub fields: Vec<(String, Instance)>,
    /// Retained unknown keys, in input order.
    pub additional: IndexMap<String, Instance>,
}

pub struct Interpreter<'m> {
    module: &'m CodeModule,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m CodeModule) -> Self {
        Self { module }
    }

    /// Decode against the module's root type (untyped when there is none).
    pub fn decode_root(&self, value: &Value) -> Result<Instance, DecodeError> {
        let ty = match self.module.root {
            Some(id) => TypeRef::Defined(id),
            None => TypeRef::Primitive(Primitive::Any),
        };
        self.decode(&ty, value, &JsonPath::root())
    }

    pub fn decode(&self, ty: &TypeRef, value: &Value, path: &JsonPath) -> Result<Instance, DecodeError> {
        match ty {
            TypeRef::Primitive(primitive) => self.decode_primitive(primitive, value, path),
            TypeRef::Defined(id) => self.decode_defined(*id, value, path),
        }
    }

    fn decode_primitive(&self, primitive: &Primitive, value: &Value, path: &JsonPath) -> Result<Instance, DecodeError> {
        Ok(match primitive {
            Primitive::String => Instance::String(String::decode(value, path)?),
            Primitive::Number => Instance::Number(Number::decode(value, path)?),
            Primitive::Integer => Instance::Integer(i64::decode(value, path)?),
            Primitive::Boolean => Instance::Boolean(bool::decode(value, path)?),
            Primitive::Null => {
                <()>::decode(value, path)?;
                Instance::Null
            }
            Primitive::Any => Instance::Any(value.clone()),
            Primitive::Array(item) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| DecodeError::ExpectedArray { path: path.clone() })?;
                let mut out = Vec::with_capacity(items.len());
                for (index, element) in items.iter().enumerate() {
                    out.push(self.decode(item, element, &path.index(index))?);
                }
                Instance::Array(out)
            }
        })
    }

    fn decode_defined(&self, id: TypeId, value: &Value, path: &JsonPath) -> Result<Instance, DecodeError> {
        match &self.module.get(id).spec {
            TypeSpec::Alias { target } => self.decode(target, value, path),
            TypeSpec::Record(record) => self.decode_record(id, record, value, path).map(Instance::Record),
            TypeSpec::Merged(merged) => self.decode_merged(id, merged, value, path).map(Instance::Record),
            TypeSpec::ClosedEnum(closed) => {
                let literals: Vec<Value> = closed.cases.iter().map(|c| c.value.clone()).collect();
                let index = decode_enum(value, path, &literals)?;
                Ok(Instance::Enum {
                    ty: id,
                    case: closed.cases[index].name.clone(),
                    literal: literals[index].clone(),
                })
            }
            TypeSpec::Sum(sum) => self.decode_sum(id, sum, value, path),
        }
    }

    fn decode_record(&self, id: TypeId, record: &Record, value: &Value, path: &JsonPath) -> Result<RecordInstance, DecodeError> {
        let reader = ObjectReader::new(value, path)?;

        // 1) Declared fields, declaration order
        let mut fields = Vec::with_capacity(record.fields.len());
        for field in &record.fields {
            match reader.get(&field.key) {
                Some(raw) => {
                    let decoded = self.decode(&field.ty, raw, &path.key(&field.key))?;
                    fields.push((field.key.clone(), decoded));
                }
                None if field.required => return Err(reader.missing(&field.key)),
                None => {}
            }
        }

        // 2) Everything else
        let known = known_keys(record);
        if record.additional == Additional::Forbidden {
            reader.deny_unknown(&known)?;
        }
        let additional = self.decode_additional(record, &reader, &known)?;

        Ok(RecordInstance { ty: id, fields, additional })
    }

    /// `allOf`: each branch's checks in declaration order, first failure wins.
    fn decode_merged(&self, id: TypeId, merged: &Merged, value: &Value, path: &JsonPath) -> Result<RecordInstance, DecodeError> {
        let record = &merged.record;
        let reader = ObjectReader::new(value, path)?;
        let known = known_keys(record);
        let mut found: Vec<Option<Instance>> = vec![None; record.fields.len()];

        for step in &merged.steps {
            match step {
                MergeStep::Branch { fields, required, closed } => {
                    for &index in fields {
                        let field = &record.fields[index];
                        match reader.get(&field.key) {
                            Some(raw) => found[index] = Some(self.decode(&field.ty, raw, &path.key(&field.key))?),
                            None if required.contains(&index) => return Err(reader.missing(&field.key)),
                            None => {}
                        }
                    }
                    if let Some(&index) = required.iter().find(|&&index| found[index].is_none()) {
                        return Err(reader.missing(&record.fields[index].key));
                    }
                    if *closed {
                        reader.deny_unknown(&known)?;
                    }
                }
                MergeStep::Negation { index } => {
                    let negation = &merged.negations[*index];
                    if self.decode(&negation.ty, value, path).is_ok() {
                        return Err(DecodeError::NegatedMatch {
                            branch: negation.name.clone(),
                            path: path.clone(),
                        });
                    }
                }
            }
        }

        let additional = self.decode_additional(record, &reader, &known)?;
        let fields = record
            .fields
            .iter()
            .zip(found)
            .filter_map(|(field, decoded)| decoded.map(|decoded| (field.key.clone(), decoded)))
            .collect();
        Ok(RecordInstance { ty: id, fields, additional })
    }

    /// Unknown keys kept by an open record, in input order.
    fn decode_additional(
        &self,
        record: &Record,
        reader: &ObjectReader<'_>,
        known: &[&str],
    ) -> Result<IndexMap<String, Instance>, DecodeError> {
        let mut additional = IndexMap::new();
        match &record.additional {
            Additional::Forbidden => {}
            Additional::Allowed => {
                for (key, raw) in unknown(reader.entries(), known) {
                    additional.insert(key.clone(), Instance::Any(raw.clone()));
                }
            }
            Additional::Typed(ty) => {
                for (key, raw) in unknown(reader.entries(), known) {
                    additional.insert(key.clone(), self.decode(ty, raw, &reader.path().key(key))?);
                }
            }
        }
        Ok(additional)
    }

    fn decode_sum(&self, id: TypeId, sum: &SumType, value: &Value, path: &JsonPath) -> Result<Instance, DecodeError> {
        let mut matches: Vec<(String, Instance)> = sum
            .branches
            .iter()
            .filter_map(|branch| {
                self.decode(&branch.ty, value, path)
                    .ok()
                    .map(|instance| (branch.name.clone(), instance))
            })
            .collect();

        match (sum.exclusivity, matches.len()) {
            (_, 0) => Err(DecodeError::NoMatchingBranch { path: path.clone() }),
            (Exclusivity::ExactlyOne, 1) => {
                let (branch, instance) = matches.remove(0);
                Ok(Instance::OneOf { ty: id, branch, value: Box::new(instance) })
            }
            (Exclusivity::ExactlyOne, _) => Err(DecodeError::AmbiguousOneOf {
                branches: matches.into_iter().map(|(name, _)| name).collect(),
                path: path.clone(),
            }),
            (Exclusivity::AtLeastOne, _) => Ok(Instance::AnyOf { ty: id, matches }),
        }
    }
}

fn known_keys(record: &Record) -> Vec<&str> {
    record.fields.iter().map(|f| f.key.as_str()).collect()
}

fn unknown<'v>(entries: &'v Map<String, Value>, known: &[&str]) -> Vec<(&'v String, &'v Value)> {
    entries.iter().filter(|(k, _)| !known.contains(&k.as_str())).collect()
}

impl Instance {
    /// Total: every instance has an encoding.
    pub fn encode(&self) -> Value {
        match self {
            Instance::Null => Value::Null,
            Instance::Boolean(b) => Value::Bool(*b),
            Instance::Integer(i) => Value::from(*i),
            Instance::Number(n) => Value::Number(n.clone()),
            Instance::String(s) => Value::String(s.clone()),
            Instance::Array(items) => Value::Array(items.iter().map(Instance::encode).collect()),
            Instance::Any(value) => value.clone(),
            Instance::Record(record) => {
                let mut map = Map::new();
                for (key, field) in &record.fields {
                    map.insert(key.clone(), field.encode());
                }
                for (key, extra) in &record.additional {
                    map.entry(key.clone()).or_insert_with(|| extra.encode());
                }
                Value::Object(map)
            }
            Instance::Enum { literal, .. } => literal.clone(),
            Instance::OneOf { value, .. } => value.encode(),
            Instance::AnyOf { matches, .. } => merge_encoded(matches.iter().map(|(_, m)| m.encode()).collect()),
        }
    }
}
