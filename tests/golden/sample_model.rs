// @generated by json-reify. Do not edit.

#[allow(unused_imports)]
use json_reify::runtime::{Alternative, Codec, DecodeError, IndexMap, JsonPath, Number, ObjectReader, ObjectWriter, Value, decode_enum, decode_one_of, ensure_any_match, merge_encoded, reject_negated, try_branch};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleModel {
    pub list: Option<Vec<ListItem>>,
    pub nested1: Option<Nested1>,
    pub all_of_field: AllOfField,
    pub any_of_field: AnyOfField,
    pub one_of_field: OneOfField,
    pub keyword_fields: Option<KeywordFields>,
    pub simple_one_of: Option<SimpleOneOf>,
}

impl Codec for SampleModel {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            list: object.optional("list")?,
            nested1: object.optional("nested1")?,
            all_of_field: object.required("allOfField")?,
            any_of_field: object.required("anyOfField")?,
            one_of_field: object.required("oneOfField")?,
            keyword_fields: object.optional("keywordFields")?,
            simple_one_of: object.optional("simpleOneOf")?,
        };
        object.deny_unknown(&["list", "nested1", "allOfField", "anyOfField", "oneOfField", "keywordFields", "simpleOneOf"])?;
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.optional("list", &self.list);
        object.optional("nested1", &self.nested1);
        object.required("allOfField", &self.all_of_field);
        object.required("anyOfField", &self.any_of_field);
        object.required("oneOfField", &self.one_of_field);
        object.optional("keywordFields", &self.keyword_fields);
        object.optional("simpleOneOf", &self.simple_one_of);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub prop: Prop,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for ListItem {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            prop: object.required("prop")?,
            additional_properties: object.remaining(&["prop"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("prop", &self.prop);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Value,
}

impl Prop {
    pub const ALL: [Prop; 1] = [Prop::Value];

    pub fn literal(self) -> Value {
        match self {
            Prop::Value => Value::from("value"),
        }
    }
}

impl Codec for Prop {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let literals: Vec<Value> = Self::ALL.iter().map(|case| case.literal()).collect();
        decode_enum(value, path, &literals).map(|index| Self::ALL[index])
    }

    fn encode(&self) -> Value {
        self.literal()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested1 {
    pub nested2: Nested2,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Nested1 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            nested2: object.required("nested2")?,
            additional_properties: object.remaining(&["nested2"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("nested2", &self.nested2);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested2 {
    pub nested3: Nested3,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Nested2 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            nested3: object.required("nested3")?,
            additional_properties: object.remaining(&["nested3"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("nested3", &self.nested3);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested3 {
    pub nested4: Nested4,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Nested3 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            nested4: object.required("nested4")?,
            additional_properties: object.remaining(&["nested4"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("nested4", &self.nested4);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested4 {
    pub nested5: Nested5,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Nested4 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            nested5: object.required("nested5")?,
            additional_properties: object.remaining(&["nested5"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("nested5", &self.nested5);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested5 {
    pub single: Single,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for Nested5 {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            single: object.required("single")?,
            additional_properties: object.remaining(&["single"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("single", &self.single);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Single {
    Value,
}

impl Single {
    pub const ALL: [Single; 1] = [Single::Value];

    pub fn literal(self) -> Value {
        match self {
            Single::Value => Value::from("value"),
        }
    }
}

impl Codec for Single {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let literals: Vec<Value> = Self::ALL.iter().map(|case| case.literal()).collect();
        decode_enum(value, path, &literals).map(|index| Self::ALL[index])
    }

    fn encode(&self) -> Value {
        self.literal()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllOfField {
    pub a1: i64,
    pub a2: String,
    pub a3: bool,
    pub a4: Number,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for AllOfField {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let f0: i64 = object.required("a1")?;
        let f1: String = object.required("a2")?;
        let f2: bool = object.required("a3")?;
        let f3: Number = object.required("a4")?;
        Ok(Self {
            a1: f0,
            a2: f1,
            a3: f2,
            a4: f3,
            additional_properties: object.remaining(&["a1", "a2", "a3", "a4"])?,
        })
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("a1", &self.a1);
        object.required("a2", &self.a2);
        object.required("a3", &self.a3);
        object.required("a4", &self.a4);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnyOfField {
    pub first_any: Option<FirstAny>,
    pub second_any: Option<SecondAny>,
}

impl Codec for AnyOfField {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let decoded = Self {
            first_any: try_branch(value, path),
            second_any: try_branch(value, path),
        };
        ensure_any_match(decoded.first_any.is_some() || decoded.second_any.is_some(), path)?;
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut encodings = Vec::new();
        if let Some(branch) = &self.first_any { encodings.push(branch.encode()); }
        if let Some(branch) = &self.second_any { encodings.push(branch.encode()); }
        merge_encoded(encodings)
    }
}

/// FirstAny
#[derive(Debug, Clone, PartialEq)]
pub struct FirstAny {
    pub b1: i64,
    pub b2: String,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for FirstAny {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            b1: object.required("b1")?,
            b2: object.required("b2")?,
            additional_properties: object.remaining(&["b1", "b2"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("b1", &self.b1);
        object.required("b2", &self.b2);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

/// SecondAny
#[derive(Debug, Clone, PartialEq)]
pub struct SecondAny {
    pub b3: bool,
    pub b4: Number,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for SecondAny {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            b3: object.required("b3")?,
            b4: object.required("b4")?,
            additional_properties: object.remaining(&["b3", "b4"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("b3", &self.b3);
        object.required("b4", &self.b4);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OneOfField {
    FirstOne(FirstOne),
    SecondOne(SecondOne),
}

impl Codec for OneOfField {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        decode_one_of(value, path, &[
            Alternative { name: "FirstOne", decode: &|v: &Value, p: &JsonPath| <FirstOne as Codec>::decode(v, p).map(Self::FirstOne) },
            Alternative { name: "SecondOne", decode: &|v: &Value, p: &JsonPath| <SecondOne as Codec>::decode(v, p).map(Self::SecondOne) },
        ])
    }

    fn encode(&self) -> Value {
        match self {
            Self::FirstOne(inner) => inner.encode(),
            Self::SecondOne(inner) => inner.encode(),
        }
    }
}

/// FirstOne
#[derive(Debug, Clone, PartialEq)]
pub struct FirstOne {
    pub c1: i64,
    pub c2: String,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for FirstOne {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            c1: object.required("c1")?,
            c2: object.required("c2")?,
            additional_properties: object.remaining(&["c1", "c2"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("c1", &self.c1);
        object.required("c2", &self.c2);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

/// SecondOne
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOne {
    pub c3: bool,
    pub c4: Number,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for SecondOne {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            c3: object.required("c3")?,
            c4: object.required("c4")?,
            additional_properties: object.remaining(&["c3", "c4"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.required("c3", &self.c3);
        object.required("c4", &self.c4);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordFields {
    pub r#in: Option<String>,
    pub r#for: Option<String>,
    pub r#while: Option<String>,
    pub var: Option<String>,
    pub r#let: Option<String>,
    pub inout: Option<String>,
    pub case: Option<String>,
    pub additional_properties: IndexMap<String, Value>,
}

impl Codec for KeywordFields {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(value, path)?;
        let decoded = Self {
            r#in: object.optional("in")?,
            r#for: object.optional("for")?,
            r#while: object.optional("while")?,
            var: object.optional("var")?,
            r#let: object.optional("let")?,
            inout: object.optional("inout")?,
            case: object.optional("case")?,
            additional_properties: object.remaining(&["in", "for", "while", "var", "let", "inout", "case"])?,
        };
        Ok(decoded)
    }

    fn encode(&self) -> Value {
        let mut object = ObjectWriter::new();
        object.optional("in", &self.r#in);
        object.optional("for", &self.r#for);
        object.optional("while", &self.r#while);
        object.optional("var", &self.var);
        object.optional("let", &self.r#let);
        object.optional("inout", &self.inout);
        object.optional("case", &self.case);
        object.extend(&self.additional_properties);
        object.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimpleOneOf {
    String(String),
    Number(Number),
}

impl Codec for SimpleOneOf {
    fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {
        decode_one_of(value, path, &[
            Alternative { name: "String", decode: &|v: &Value, p: &JsonPath| <String as Codec>::decode(v, p).map(Self::String) },
            Alternative { name: "Number", decode: &|v: &Value, p: &JsonPath| <Number as Codec>::decode(v, p).map(Self::Number) },
        ])
    }

    fn encode(&self) -> Value {
        match self {
            Self::String(inner) => inner.encode(),
            Self::Number(inner) => inner.encode(),
        }
    }
}
