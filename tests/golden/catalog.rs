// @generated by json-reify. Do not edit.

#[allow(unused_imports)]
use json_reify::runtime::{Alternative, Codec, DecodeError, IndexMap, JsonPath, Number, ObjectReader, ObjectWriter, Value, decode_enum, decode_one_of, ensure_any_match, merge_encoded, reject_negated, try_branch};

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub root: Node,
    pub labels: Option<Labels>,
    pub note: Option<Note>,
    pub entry: Option<Entry>,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Catalog {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            root: object.required("root")?,
            labels: object.optional("labels")?,
            note: object.optional("note")?,
            entry: object.optional("entry")?,
            additional_properties: object.remaining(&["root", "labels", "note", "entry"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("root", &self.root);
        object.optional("labels", &self.labels);
        object.optional("note", &self.note);
        object.optional("entry", &self.entry);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: i64,
    pub children: Option<Vec<Node>>,
    pub parent: Option<Box<Node>>,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Node {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            value: object.required("value")?,
            children: object.optional("children")?,
            parent: object.optional("parent")?,
            additional_properties: object.remaining(&["value", "children", "parent"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("value", &self.value);
        object.optional("children", &self.children);
        object.optional("parent", &self.parent);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub additional_properties: IndexMap<String, i64>,
}

impl Codec for Labels {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            additional_properties: object.remaining(&[])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    String(String),
    Null(()),
}

impl Codec for Note {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        decode_one_of(value, path, &[
            Alternative { name: "String", decode: &|v: &Value, p: &JsonPath| <String as Codec>::decode(v, p).map(Self::String) },
            Alternative { name: "Null", decode: &|v: &Value, p: &JsonPath| <() as Codec>::decode(v, p).map(Self::Null) },
        ])
    }

    fn encode(&self) -> Value {
        match self {
            Self::String(inner) => inner.encode(),
            Self::Null(inner) => inner.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub kind: Kind,
}

impl Codec for Entry {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let f0: Option<i64> = object.optional("id")?;
        object.deny_unknown(&["id", "kind"])?;
        let f1: Kind = object.required("kind")?;
        reject_negated::<Anonymous>(value, path, "anonymous")?;
        Ok(Self {
            id: f0,
            kind: f1,
        })
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.optional("id", &self.id);
        object.required("kind", &self.kind);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub id: Option<i64>,
}

impl Codec for Base {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            id: object.optional("id")?,
        };
        object.deny_unknown(&["id"])?;
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.optional("id", &self.id);
        object.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    File,
    Dir,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::File, Kind::Dir];

    pub fn literal(self) -> Value {
        match self {
            Kind::File => Value::from("file"),
            Kind::Dir => Value::from("dir"),
        }
    }
}

impl Codec for Kind {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let literals: Vec<Value> = Self::ALL.iter().map(|case| case.literal()).collect();
        decode_enum(value, path, &literals).map(|index| Self::ALL[index])
    }

    fn encode(&self) -> Value {
        self.literal()
    }
}

/// Anonymous
#[derive(Debug, Clone, PartialEq)]
pub struct Anonymous {
    pub id: Id,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Anonymous {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            id: object.required("id")?,
            additional_properties: object.remaining(&["id"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("id", &self.id);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Id {
    U48,
}

impl Id {
    pub const ALL: [Id; 1] = [Id::U48];

    pub fn literal(self) -> Value {
        match self {
            Id::U48 => Value::from(0i64),
        }
    }
}

impl Codec for Id {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let literals: Vec<Value> = Self::ALL.iter().map(|case| case.literal()).collect();
        decode_enum(value, path, &literals).map(|index| Self::ALL[index])
    }

    fn encode(&self) -> Value {
        self.literal()
    }
}
