//! Emitter: `CodeModule` → Rust source text.
//!
//! Every emitted type implements the runtime `Codec` trait; records go through
//! `ObjectReader`/`ObjectWriter`, sums through `decode_one_of` or
//! `try_branch`/`ensure_any_match`, closed enums through `decode_enum`.
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::ir::{
    Additional, ClosedEnum, CodeModule, Exclusivity, MergeStep, Merged, Primitive, Record, SumType,
    TypeDef, TypeRef, TypeSpec,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Module path generated code imports the runtime from.
    pub runtime_path: String,
    /// Leading `// @generated` comment.
    pub header: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { runtime_path: "json_reify::runtime".to_string(), header: true }
    }
}

impl EmitOptions {
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

pub struct Codegen {
    options: EmitOptions,
    out: String,
    indent: usize,
}

const RUNTIME_ITEMS: &str = "Alternative, Codec, DecodeError, IndexMap, JsonPath, Number, ObjectReader, \
ObjectWriter, Value, decode_enum, decode_one_of, ensure_any_match, merge_encoded, reject_negated, try_branch";

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINTS
// ————————————————————————————————————————————————————————————————————————————

/// Render `module` and write it to `dir/file_name`; returns the written path.
pub fn emit(module: &CodeModule, file_name: &str, dir: &Path, options: &EmitOptions) -> io::Result<PathBuf> {
    let source = render(module, options);
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, source)?;
    Ok(path)
}

pub fn render(module: &CodeModule, options: &EmitOptions) -> String {
    let mut cg = Codegen::new(options.clone());
    cg.emit_module(module);
    cg.into_string()
}

impl Codegen {
    pub fn new(options: EmitOptions) -> Self {
        Self { options, out: String::new(), indent: 0 }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn emit_module(&mut self, module: &CodeModule) {
        if self.options.header {
            self.line("// @generated by json-reify. Do not edit.");
            self.blank();
        }
        self.line("#[allow(unused_imports)]");
        let import = format!("use {}::{{{RUNTIME_ITEMS}}};", self.options.runtime_path);
        self.line(&import);

        for def in module.emitted() {
            self.blank();
            self.emit(module, def);
        }
    }

    pub fn emit(&mut self, module: &CodeModule, def: &TypeDef) {
        self.docs(&def.docs);
        match &def.spec {
            TypeSpec::Record(record) => self.record(module, def, record, None),
            TypeSpec::Merged(merged) => self.record(module, def, &merged.record, Some(merged)),
            TypeSpec::ClosedEnum(closed) => self.closed_enum(def, closed),
            TypeSpec::Sum(sum) => match sum.exclusivity {
                Exclusivity::ExactlyOne => self.one_of(module, def, sum),
                Exclusivity::AtLeastOne => self.any_of(module, def, sum),
            },
            TypeSpec::Alias { target } => {
                let line = format!("{}type {} = {};", def.access.prefix(), def.ident, rust_type(module, target));
                self.line(&line);
            }
        }
    }

    // ————————————————————————————————————————————————————————————————————————
    // SHAPES
    // ————————————————————————————————————————————————————————————————————————

    fn record(&mut self, module: &CodeModule, def: &TypeDef, record: &Record, merged: Option<&Merged>) {
        let vis = def.access.prefix();
        let name = &def.ident;

        // 1) Struct
        self.line("#[derive(Debug, Clone, PartialEq)]");
        if record.fields.is_empty() && record.extras_member.is_none() {
            self.line(&format!("{vis}struct {name} {{}}"));
        } else {
            self.open(&format!("{vis}struct {name} {{"));
            for field in &record.fields {
                self.docs(&field.docs);
                let ty = field_type(module, &field.ty, field.boxed);
                let ty = if field.required { ty } else { format!("Option<{ty}>") };
                self.line(&format!("{vis}{}: {ty},", field.member));
            }
            if let Some(extras) = &record.extras_member {
                self.line(&format!("{vis}{extras}: IndexMap<String, {}>,", extras_type(module, record)));
            }
            self.close("}");
        }
        self.blank();

        // 2) Codec
        self.open(&format!("impl Codec for {name} {{"));
        self.open("fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {");
        self.line("let object = ObjectReader::new(value, path)?;");
        match merged {
            Some(merged) => self.merged_decode(module, merged),
            None => self.record_decode(record),
        }
        self.close("}");
        self.blank();
        self.open("fn encode(&self) -> Value {");
        self.line("let mut object = ObjectWriter::new();");
        for field in &record.fields {
            let method = if field.required { "required" } else { "optional" };
            self.line(&format!("object.{method}({:?}, &self.{});", field.key, field.member));
        }
        if let Some(extras) = &record.extras_member {
            self.line(&format!("object.extend(&self.{extras});"));
        }
        self.line("object.finish()");
        self.close("}");
        self.close("}");
    }

    /// Fields in declaration order, then unknown keys.
    fn record_decode(&mut self, record: &Record) {
        let keys = key_list(record);
        self.open("let decoded = Self {");
        for field in &record.fields {
            let method = if field.required { "required" } else { "optional" };
            self.line(&format!("{}: object.{method}({:?})?,", field.member, field.key));
        }
        if let Some(extras) = &record.extras_member {
            self.line(&format!("{extras}: object.remaining(&[{keys}])?,"));
        }
        self.close("};");
        if record.additional == Additional::Forbidden {
            self.line(&format!("object.deny_unknown(&[{keys}])?;"));
        }
        self.line("Ok(decoded)");
    }

    /// One block of checks per `allOf` branch, in declaration order; field
    /// `i` is held in `f{i}` until the struct is built.
    fn merged_decode(&mut self, module: &CodeModule, merged: &Merged) {
        let record = &merged.record;
        let keys = key_list(record);
        for step in &merged.steps {
            match step {
                MergeStep::Branch { fields, required, closed } => {
                    for &index in fields {
                        let field = &record.fields[index];
                        let ty = field_type(module, &field.ty, field.boxed);
                        let line = if required.contains(&index) {
                            format!("let f{index}: {ty} = object.required({:?})?;", field.key)
                        } else {
                            format!("let f{index}: Option<{ty}> = object.optional({:?})?;", field.key)
                        };
                        self.line(&line);
                    }
                    for &index in required.iter().filter(|index| !fields.contains(index)) {
                        let field = &record.fields[index];
                        let ty = field_type(module, &field.ty, field.boxed);
                        self.line(&format!(
                            "let f{index}: {ty} = f{index}.ok_or_else(|| object.missing({:?}))?;",
                            field.key
                        ));
                    }
                    if *closed {
                        self.line(&format!("object.deny_unknown(&[{keys}])?;"));
                    }
                }
                MergeStep::Negation { index } => {
                    let negation = &merged.negations[*index];
                    let ty = rust_type(module, &negation.ty);
                    self.line(&format!("reject_negated::<{ty}>(value, path, {:?})?;", negation.name));
                }
            }
        }
        if record.fields.is_empty() && record.extras_member.is_none() {
            self.line("Ok(Self {})");
            return;
        }
        self.open("Ok(Self {");
        for (index, field) in record.fields.iter().enumerate() {
            self.line(&format!("{}: f{index},", field.member));
        }
        if let Some(extras) = &record.extras_member {
            self.line(&format!("{extras}: object.remaining(&[{keys}])?,"));
        }
        self.close("})");
    }

    fn closed_enum(&mut self, def: &TypeDef, closed: &ClosedEnum) {
        let vis = def.access.prefix();
        let name = &def.ident;
        let count = closed.cases.len();

        self.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        self.open(&format!("{vis}enum {name} {{"));
        for case in &closed.cases {
            self.line(&format!("{},", case.name));
        }
        self.close("}");
        self.blank();

        self.open(&format!("impl {name} {{"));
        let all = closed.cases.iter().map(|c| format!("{name}::{}", c.name)).collect::<Vec<_>>().join(", ");
        self.line(&format!("{vis}const ALL: [{name}; {count}] = [{all}];"));
        self.blank();
        self.open(&format!("{vis}fn literal(self) -> Value {{"));
        self.open("match self {");
        for case in &closed.cases {
            self.line(&format!("{name}::{} => {},", case.name, literal_expr(&case.value)));
        }
        self.close("}");
        self.close("}");
        self.close("}");
        self.blank();

        self.open(&format!("impl Codec for {name} {{"));
        self.open("fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {");
        self.line("let literals: Vec<Value> = Self::ALL.iter().map(|case| case.literal()).collect();");
        self.line("decode_enum(value, path, &literals).map(|index| Self::ALL[index])");
        self.close("}");
        self.blank();
        self.open("fn encode(&self) -> Value {");
        self.line("self.literal()");
        self.close("}");
        self.close("}");
    }

    fn one_of(&mut self, module: &CodeModule, def: &TypeDef, sum: &SumType) {
        let vis = def.access.prefix();
        let name = &def.ident;

        self.line("#[derive(Debug, Clone, PartialEq)]");
        self.open(&format!("{vis}enum {name} {{"));
        for branch in &sum.branches {
            self.line(&format!("{}({}),", branch.name, field_type(module, &branch.ty, branch.boxed)));
        }
        self.close("}");
        self.blank();

        self.open(&format!("impl Codec for {name} {{"));
        self.open("fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {");
        self.open("decode_one_of(value, path, &[");
        for branch in &sum.branches {
            let ty = field_type(module, &branch.ty, branch.boxed);
            self.line(&format!(
                "Alternative {{ name: {:?}, decode: &|v: &Value, p: &JsonPath| <{ty} as Codec>::decode(v, p).map(Self::{}) }},",
                branch.name, branch.name
            ));
        }
        self.close("])");
        self.close("}");
        self.blank();
        self.open("fn encode(&self) -> Value {");
        self.open("match self {");
        for branch in &sum.branches {
            self.line(&format!("Self::{}(inner) => inner.encode(),", branch.name));
        }
        self.close("}");
        self.close("}");
        self.close("}");
    }

    fn any_of(&mut self, module: &CodeModule, def: &TypeDef, sum: &SumType) {
        let vis = def.access.prefix();
        let name = &def.ident;

        self.line("#[derive(Debug, Clone, PartialEq, Default)]");
        self.open(&format!("{vis}struct {name} {{"));
        for branch in &sum.branches {
            let ty = field_type(module, &branch.ty, branch.boxed);
            self.line(&format!("{vis}{}: Option<{ty}>,", branch.name));
        }
        self.close("}");
        self.blank();

        self.open(&format!("impl Codec for {name} {{"));
        self.open("fn decode(value: &Value, path: &JsonPath) -> Result<Self, DecodeError> {");
        self.open("let decoded = Self {");
        for branch in &sum.branches {
            self.line(&format!("{}: try_branch(value, path),", branch.name));
        }
        self.close("};");
        let any = sum
            .branches
            .iter()
            .map(|b| format!("decoded.{}.is_some()", b.name))
            .collect::<Vec<_>>()
            .join(" || ");
        self.line(&format!("ensure_any_match({any}, path)?;"));
        self.line("Ok(decoded)");
        self.close("}");
        self.blank();
        self.open("fn encode(&self) -> Value {");
        self.line("let mut encodings = Vec::new();");
        for branch in &sum.branches {
            self.line(&format!(
                "if let Some(branch) = &self.{} {{ encodings.push(branch.encode()); }}",
                branch.name
            ));
        }
        self.line("merge_encoded(encodings)");
        self.close("}");
        self.close("}");
    }

    // ————————————————————————————————————————————————————————————————————————
    // OUTPUT
    // ————————————————————————————————————————————————————————————————————————

    fn docs(&mut self, docs: &[String]) {
        for doc in docs {
            for line in doc.lines() {
                let line = line.trim_end();
                if line.is_empty() {
                    self.line("///");
                } else {
                    self.line(&format!("/// {line}"));
                }
            }
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

pub fn rust_type(module: &CodeModule, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Defined(id) => module.get(*id).ident.clone(),
        TypeRef::Primitive(Primitive::String) => "String".to_string(),
        TypeRef::Primitive(Primitive::Number) => "Number".to_string(),
        TypeRef::Primitive(Primitive::Integer) => "i64".to_string(),
        TypeRef::Primitive(Primitive::Boolean) => "bool".to_string(),
        TypeRef::Primitive(Primitive::Null) => "()".to_string(),
        TypeRef::Primitive(Primitive::Any) => "Value".to_string(),
        TypeRef::Primitive(Primitive::Array(item)) => format!("Vec<{}>", rust_type(module, item)),
    }
}

fn field_type(module: &CodeModule, ty: &TypeRef, boxed: bool) -> String {
    let ty = rust_type(module, ty);
    if boxed { format!("Box<{ty}>") } else { ty }
}

fn extras_type(module: &CodeModule, record: &Record) -> String {
    match &record.additional {
        Additional::Typed(ty) => rust_type(module, ty),
        Additional::Allowed | Additional::Forbidden => "Value".to_string(),
    }
}

fn key_list(record: &Record) -> String {
    record.fields.iter().map(|f| format!("{:?}", f.key)).collect::<Vec<_>>().join(", ")
}

/// A Rust expression building the JSON literal `value` (scalars only).
fn literal_expr(value: &Value) -> String {
    match value {
        Value::Null => "Value::Null".to_string(),
        Value::Bool(b) => format!("Value::Bool({b})"),
        Value::String(s) => format!("Value::from({s:?})"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                format!("Value::from({i}i64)")
            } else if let Some(u) = n.as_u64() {
                format!("Value::from({u}u64)")
            } else {
                let f = n.as_f64().unwrap_or_default();
                format!("Value::from({f:?}f64)")
            }
        }
        Value::Array(_) | Value::Object(_) => "Value::Null".to_string(),
    }
}
