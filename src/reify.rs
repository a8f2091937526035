//! Type Reifier: walks a schema tree and accumulates type definitions into a
//! [`CodeModule`].
//!
//! Primitives and arrays stay inline as [`TypeRef::Primitive`]; objects, enums
//! and combinators get a definition of their own, named from the enclosing
//! path. `$ref` targets are reified once per canonical pointer and shared.
mod indirect;
mod merge;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ReifyError, SchemaError};
use crate::ir::{
    Additional, Branch, ClosedEnum, CodeModule, EnumCase, Exclusivity, Field, Negation, Primitive,
    Record, SumType, TypeHeader, TypeId, TypeRef, TypeSpec,
};
use crate::naming::{member_ident, unique, variant_ident, Namer, ReifyOptions};
use crate::schema::{
    escape_pointer_segment, AdditionalProperties, ObjectSchema, RefResolver, SchemaDocument,
    SchemaKind, SchemaNode,
};

pub struct Reifier<'a> {
    resolver: RefResolver<'a>,
    namer: Namer,
    module: CodeModule,
    root_name: String,
    /// Canonical pointer → the definition reified for it.
    by_pointer: HashMap<String, TypeId>,
    /// Definitions whose bodies are still being built.
    building: HashSet<TypeId>,
}

/// Reify the root (`#`) and then every `definitions`/`$defs` entry.
pub fn reify_document(
    document: &SchemaDocument,
    root_name: &str,
    options: ReifyOptions,
) -> Result<CodeModule, ReifyError> {
    let mut reifier = Reifier::new(document, root_name, options);
    let root = reifier.reify_pointer("#")?;
    for pointer in document.definition_pointers() {
        reifier.reify_definition(&pointer)?;
    }
    reifier.finish(Some(root))
}

/// [`reify_document`] over a bare JSON value.
pub fn reify_value(value: Value, root_name: &str, options: ReifyOptions) -> Result<CodeModule, ReifyError> {
    reify_document(&SchemaDocument::new(value), root_name, options)
}

const ORDINALS: [&str; 10] = [
    "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth", "Ninth", "Tenth",
];

/// `First<Id>`, `Second<Id>`, ... for untitled combinator branches.
fn ordinal_id(index: usize, id: &str) -> String {
    match ORDINALS.get(index) {
        Some(ordinal) => format!("{ordinal}{id}"),
        None => format!("Branch{}{id}", index + 1),
    }
}

fn primitive_label(primitive: &Primitive) -> &'static str {
    match primitive {
        Primitive::String => "String",
        Primitive::Number => "Number",
        Primitive::Integer => "Integer",
        Primitive::Boolean => "Boolean",
        Primitive::Null => "Null",
        Primitive::Any => "Any",
        Primitive::Array(_) => "Array",
    }
}

impl<'a> Reifier<'a> {
    pub fn new(document: &'a SchemaDocument, root_name: &str, options: ReifyOptions) -> Self {
        Self {
            resolver: RefResolver::new(document),
            namer: Namer::new(options),
            module: CodeModule::new(),
            root_name: root_name.to_string(),
            by_pointer: HashMap::new(),
            building: HashSet::new(),
        }
    }

    /// Reify `node` as a named definition under `parents`.
    ///
    /// Unlike nested properties, the result is always a definition: a primitive
    /// or reference becomes an alias.
    pub fn reify(&mut self, node: &SchemaNode, id: &str, parents: &[String]) -> Result<TypeId, ReifyError> {
        self.define_node(node, id, parents, "")
    }

    /// Reify the node at a local `$ref` pointer, once per canonical target.
    pub fn reify_pointer(&mut self, pointer: &str) -> Result<TypeId, ReifyError> {
        let resolved = self.resolver.resolve(pointer)?;
        if let Some(id) = self.by_pointer.get(&resolved.target) {
            return Ok(*id);
        }
        let name = if resolved.target == "#" {
            self.root_name.clone()
        } else {
            resolved.target.clone()
        };
        let fragment = resolved.target.trim_start_matches('#').to_string();
        let id = self.declare(&resolved.node, &name, &[], &fragment)?;
        self.by_pointer.insert(resolved.target.clone(), id);
        self.fill(id, Arc::clone(&resolved.node), &fragment)?;
        Ok(id)
    }

    /// A definition that is itself a `$ref` still gets its own alias.
    fn reify_definition(&mut self, pointer: &str) -> Result<(), ReifyError> {
        if self.by_pointer.contains_key(pointer) {
            return Ok(());
        }
        let node = self.resolver.parse(pointer)?;
        if let SchemaKind::Reference(target) = &node.kind {
            let target = self.reify_pointer(target)?;
            let fragment = pointer.trim_start_matches('#');
            let id = self.declare(&node, pointer, &[], fragment)?;
            self.by_pointer.insert(pointer.to_string(), id);
            self.module.define(id, TypeSpec::Alias { target: TypeRef::Defined(target) });
            self.building.remove(&id);
            return Ok(());
        }
        self.reify_pointer(pointer).map(|_| ())
    }

    /// Run whole-module passes and hand the module over.
    pub fn finish(mut self, root: Option<TypeId>) -> Result<CodeModule, ReifyError> {
        indirect::analyze(&mut self.module)?;
        self.module.root = root;
        Ok(self.module)
    }

    // ————————————————————————————————————————————————————————————————————————
    // DEFINITIONS
    // ————————————————————————————————————————————————————————————————————————

    fn define_node(&mut self, node: &SchemaNode, id: &str, parents: &[String], pointer: &str) -> Result<TypeId, ReifyError> {
        let tid = self.declare(node, id, parents, pointer)?;
        self.fill(tid, Arc::new(node.clone()), pointer)?;
        Ok(tid)
    }

    /// Claim a name and reserve an id; the body comes later in [`Self::fill`].
    fn declare(&mut self, node: &SchemaNode, id: &str, parents: &[String], pointer: &str) -> Result<TypeId, ReifyError> {
        let claimed = self.namer.claim(parents, id)?;
        let mut path = parents.to_vec();
        path.push(claimed.local.clone());
        let access = self.namer.options().access_for(&path);
        let tid = self.module.reserve(TypeHeader {
            name: claimed.local,
            parents: parents.to_vec(),
            ident: claimed.ident,
            access,
            docs: node.docs(),
            origin: format!("#{pointer}"),
        });
        self.building.insert(tid);
        Ok(tid)
    }

    fn fill(&mut self, tid: TypeId, node: Arc<SchemaNode>, pointer: &str) -> Result<(), ReifyError> {
        let path = self.module.get(tid).path();
        let spec = self.build(&node, tid, &path, pointer)?;
        tracing::debug!(
            name = %self.module.get(tid).qualified_name(),
            kind = node.kind_name(),
            "reified type"
        );
        self.module.define(tid, spec);
        self.building.remove(&tid);
        Ok(())
    }

    fn build(&mut self, node: &SchemaNode, tid: TypeId, path: &[String], pointer: &str) -> Result<TypeSpec, ReifyError> {
        let local = self.module.get(tid).name.clone();
        match &node.kind {
            SchemaKind::Object(obj) => Ok(TypeSpec::Record(self.record(obj, path, pointer)?)),
            SchemaKind::Enum { base, values } => {
                let mut taken = HashSet::new();
                let mut seen: Vec<&Value> = Vec::new();
                let mut cases = Vec::new();
                for value in values {
                    if seen.contains(&value) {
                        continue;
                    }
                    seen.push(value);
                    let raw = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    cases.push(EnumCase { name: unique(&mut taken, variant_ident(&raw)), value: value.clone() });
                }
                Ok(TypeSpec::ClosedEnum(ClosedEnum { base: *base, cases }))
            }
            SchemaKind::OneOf(branches) => {
                self.sum(branches, "oneOf", Exclusivity::ExactlyOne, &local, path, pointer)
            }
            SchemaKind::AnyOf(branches) => {
                self.sum(branches, "anyOf", Exclusivity::AtLeastOne, &local, path, pointer)
            }
            SchemaKind::AllOf(branches) => merge::merged(self, tid, branches, &local, path, pointer),
            SchemaKind::Not(_) => Err(ReifyError::UnsupportedConstruct {
                type_name: self.module.get(tid).qualified_name(),
                construct: "`not` outside of `allOf`".to_string(),
            }),
            _ => {
                let parents = &path[..path.len() - 1];
                let target = self.type_ref(node, &local, parents, pointer)?;
                Ok(TypeSpec::Alias { target })
            }
        }
    }

    // ————————————————————————————————————————————————————————————————————————
    // REFERENCES
    // ————————————————————————————————————————————————————————————————————————

    /// Type of a value described by `node`, defining a new type when needed.
    fn type_ref(&mut self, node: &SchemaNode, id: &str, parents: &[String], pointer: &str) -> Result<TypeRef, ReifyError> {
        let primitive = |p: Primitive| -> Result<TypeRef, ReifyError> { Ok(TypeRef::Primitive(p)) };
        match &node.kind {
            SchemaKind::String => primitive(Primitive::String),
            SchemaKind::Number => primitive(Primitive::Number),
            SchemaKind::Integer => primitive(Primitive::Integer),
            SchemaKind::Boolean => primitive(Primitive::Boolean),
            SchemaKind::Null => primitive(Primitive::Null),
            SchemaKind::Any => primitive(Primitive::Any),
            SchemaKind::Array { items } => {
                let item = match items {
                    Some(items) => {
                        let item_id = format!("{id}Item");
                        let at = format!("{pointer}/items");
                        self.type_ref(items, &item_id, parents, &at)?
                    }
                    None => TypeRef::Primitive(Primitive::Any),
                };
                Ok(TypeRef::array_of(item))
            }
            SchemaKind::Reference(target) => Ok(TypeRef::Defined(self.reify_pointer(target)?)),
            SchemaKind::Object(_)
            | SchemaKind::Enum { .. }
            | SchemaKind::AllOf(_)
            | SchemaKind::AnyOf(_)
            | SchemaKind::OneOf(_)
            | SchemaKind::Not(_) => Ok(TypeRef::Defined(self.define_node(node, id, parents, pointer)?)),
        }
    }

    // ————————————————————————————————————————————————————————————————————————
    // SHAPES
    // ————————————————————————————————————————————————————————————————————————

    fn record(&mut self, obj: &ObjectSchema, path: &[String], pointer: &str) -> Result<Record, ReifyError> {
        let mut members = HashSet::new();
        let mut fields = Vec::with_capacity(obj.properties.len());

        // 1) Declared properties, document order
        for (key, prop) in &obj.properties {
            let at = format!("{pointer}/properties/{}", escape_pointer_segment(key));
            let id = prop.title.clone().unwrap_or_else(|| key.clone());
            let ty = self.type_ref(prop, &id, path, &at)?;
            fields.push(Field {
                key: key.clone(),
                member: unique(&mut members, self.namer.member(path, key)),
                ty,
                required: obj.required.contains(key),
                boxed: false,
                docs: prop.docs(),
            });
        }

        // 2) Required but undeclared: present with any value
        for key in obj.required.iter().filter(|k| !obj.properties.contains_key(*k)) {
            fields.push(Field {
                key: key.clone(),
                member: unique(&mut members, self.namer.member(path, key)),
                ty: TypeRef::Primitive(Primitive::Any),
                required: true,
                boxed: false,
                docs: Vec::new(),
            });
        }

        // 3) Unknown keys
        let additional = match &obj.additional {
            AdditionalProperties::Allowed => Additional::Allowed,
            AdditionalProperties::Forbidden => Additional::Forbidden,
            AdditionalProperties::Schema(schema) => {
                let local = path.last().cloned().unwrap_or_default();
                let at = format!("{pointer}/additionalProperties");
                Additional::Typed(self.type_ref(schema, &format!("{local}Value"), path, &at)?)
            }
        };
        let extras_member = match additional {
            Additional::Forbidden => None,
            _ => Some(unique(&mut members, "additional_properties".to_string())),
        };

        Ok(Record { fields, additional, extras_member })
    }

    fn sum(
        &mut self,
        branches: &[SchemaNode],
        keyword: &str,
        exclusivity: Exclusivity,
        id: &str,
        path: &[String],
        pointer: &str,
    ) -> Result<TypeSpec, ReifyError> {
        // one branch: nothing to choose between
        if let [only] = branches {
            let at = format!("{pointer}/{keyword}/0");
            let branch_id = only.title.clone().unwrap_or_else(|| ordinal_id(0, id));
            let target = self.type_ref(only, &branch_id, path, &at)?;
            return Ok(TypeSpec::Alias { target });
        }

        let mut names = HashSet::new();
        let mut out = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let at = format!("{pointer}/{keyword}/{index}");
            let branch_id = branch.title.clone().unwrap_or_else(|| ordinal_id(index, id));
            let ty = self.type_ref(branch, &branch_id, path, &at)?;

            let label = match (&branch.title, &ty) {
                (Some(title), _) => variant_ident(title),
                (None, TypeRef::Defined(def)) => self.module.get(*def).name.clone(),
                (None, TypeRef::Primitive(p)) => primitive_label(p).to_string(),
            };
            let name = match exclusivity {
                Exclusivity::ExactlyOne => unique(&mut names, variant_ident(&label)),
                Exclusivity::AtLeastOne => unique(&mut names, member_ident(&label)),
            };
            out.push(Branch { name, ty, boxed: false });
        }
        Ok(TypeSpec::Sum(SumType { exclusivity, branches: out }))
    }

    /// Fields of a branch that must be record-shaped (used by `allOf`).
    fn record_of(&self, owner: TypeId, ty: &TypeRef) -> Result<(Record, Vec<Negation>), ReifyError> {
        let unsupported = |what: &str| ReifyError::UnsupportedConstruct {
            type_name: self.module.get(owner).qualified_name(),
            construct: format!("allOf branch of kind {what}"),
        };
        match self.module.resolve_alias(ty) {
            TypeRef::Primitive(Primitive::Any) => Ok((Record::default(), Vec::new())),
            TypeRef::Primitive(p) => Err(unsupported(primitive_label(p))),
            TypeRef::Defined(id) if self.building.contains(id) => {
                let def = self.module.get(*id);
                Err(SchemaError::CyclicRef {
                    pointer: def.origin.clone(),
                    chain: vec![self.module.get(owner).origin.clone(), def.origin.clone()],
                }
                .into())
            }
            TypeRef::Defined(id) => match &self.module.get(*id).spec {
                TypeSpec::Record(record) => Ok((record.clone(), Vec::new())),
                TypeSpec::Merged(merged) => Ok((merged.record.clone(), merged.negations.clone())),
                TypeSpec::ClosedEnum(_) => Err(unsupported("enum")),
                TypeSpec::Sum(sum) => Err(unsupported(match sum.exclusivity {
                    Exclusivity::ExactlyOne => "oneOf",
                    Exclusivity::AtLeastOne => "anyOf",
                })),
                TypeSpec::Alias { .. } => Err(unsupported("alias")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeDef;
    use serde_json::json;

    fn reify(schema: Value) -> CodeModule {
        reify_value(schema, "Root", ReifyOptions::default()).unwrap()
    }

    fn def<'m>(module: &'m CodeModule, name: &str) -> &'m TypeDef {
        module.find(name).unwrap_or_else(|| panic!("no type {name}"))
    }

    fn record<'m>(module: &'m CodeModule, name: &str) -> &'m Record {
        match &def(module, name).spec {
            TypeSpec::Record(record) => record,
            other => panic!("{name} is not a record: {other:?}"),
        }
    }

    #[test]
    fn object_properties_become_fields_in_order() {
        let module = reify(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "for": { "type": "integer" },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["name"],
            "additionalProperties": false
        }));
        let root = record(&module, "Root");
        let summary: Vec<(&str, &str, bool)> = root
            .fields
            .iter()
            .map(|f| (f.key.as_str(), f.member.as_str(), f.required))
            .collect();
        assert_eq!(
            summary,
            [("name", "name", true), ("for", "r#for", false), ("tags", "tags", false)]
        );
        assert_eq!(
            root.fields[2].ty,
            TypeRef::array_of(TypeRef::Primitive(Primitive::String))
        );
        assert_eq!(root.additional, Additional::Forbidden);
        assert_eq!(root.extras_member, None);
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn enums_in_array_items_are_named_from_the_path() {
        let module = reify(json!({
            "properties": {
                "list": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "prop": { "type": "string", "enum": ["value", "other"] } }
                    }
                }
            }
        }));
        let prop = def(&module, "Root.ListItem.Prop");
        match &prop.spec {
            TypeSpec::ClosedEnum(e) => {
                let names: Vec<&str> = e.cases.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, ["Value", "Other"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(record(&module, "Root").extras_member.as_deref(), Some("additional_properties"));
    }

    #[test]
    fn combinator_branches_use_title_or_ordinal() {
        let module = reify(json!({
            "properties": {
                "choice": {
                    "oneOf": [
                        { "type": "object", "properties": { "a": { "type": "string" } } },
                        { "title": "Named", "type": "object", "properties": { "b": { "type": "string" } } },
                        { "type": "number" }
                    ]
                },
                "either": { "anyOf": [{ "type": "string" }, { "type": "boolean" }] }
            }
        }));
        match &def(&module, "Root.Choice").spec {
            TypeSpec::Sum(sum) => {
                assert_eq!(sum.exclusivity, Exclusivity::ExactlyOne);
                let names: Vec<&str> = sum.branches.iter().map(|b| b.name.as_str()).collect();
                assert_eq!(names, ["FirstChoice", "Named", "Number"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(module.find("Root.Choice.FirstChoice").is_some());
        match &def(&module, "Root.Either").spec {
            TypeSpec::Sum(sum) => {
                assert_eq!(sum.exclusivity, Exclusivity::AtLeastOne);
                let names: Vec<&str> = sum.branches.iter().map(|b| b.name.as_str()).collect();
                assert_eq!(names, ["string", "boolean"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_branch_combinator_is_an_alias() {
        let module = reify(json!({ "properties": { "x": { "oneOf": [{ "type": "string" }] } } }));
        assert!(matches!(
            def(&module, "Root.X").spec,
            TypeSpec::Alias { target: TypeRef::Primitive(Primitive::String) }
        ));
    }

    #[test]
    fn references_are_shared_and_definitions_all_emitted() {
        let module = reify(json!({
            "properties": {
                "a": { "$ref": "#/definitions/point" },
                "b": { "$ref": "#/definitions/point" }
            },
            "definitions": {
                "point": { "type": "object", "properties": { "x": { "type": "number" } } },
                "unused": { "type": "string" },
                "alias": { "$ref": "#/definitions/point" }
            }
        }));
        let root = record(&module, "Root");
        assert_eq!(root.fields[0].ty, root.fields[1].ty);
        let point = def(&module, "Point").id;
        assert_eq!(root.fields[0].ty, TypeRef::Defined(point));
        assert!(matches!(
            def(&module, "Unused").spec,
            TypeSpec::Alias { target: TypeRef::Primitive(Primitive::String) }
        ));
        assert!(matches!(
            def(&module, "Alias").spec,
            TypeSpec::Alias { target: TypeRef::Defined(id) } if id == point
        ));
        assert_eq!(module.root, Some(def(&module, "Root").id));
    }

    #[test]
    fn required_but_undeclared_is_an_untyped_field() {
        let module = reify(json!({ "type": "object", "required": ["anything"] }));
        let root = record(&module, "Root");
        assert_eq!(root.fields[0].ty, TypeRef::Primitive(Primitive::Any));
        assert!(root.fields[0].required);
    }

    #[test]
    fn typed_additional_properties_are_kept() {
        let module = reify(json!({ "additionalProperties": { "type": "integer" } }));
        let root = record(&module, "Root");
        assert_eq!(root.additional, Additional::Typed(TypeRef::Primitive(Primitive::Integer)));
    }

    #[test]
    fn bare_not_is_unsupported() {
        let err = reify_value(
            json!({ "properties": { "n": { "not": { "type": "string" } } } }),
            "Root",
            ReifyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReifyError::UnsupportedConstruct { .. }), "{err}");
    }

    #[test]
    fn dangling_reference_is_a_schema_error() {
        let err = reify_value(
            json!({ "properties": { "n": { "$ref": "#/definitions/missing" } } }),
            "Root",
            ReifyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReifyError::Schema(SchemaError::UnresolvedRef { .. })));
    }

    #[test]
    fn standalone_reify_of_a_primitive_is_an_alias() {
        let doc = SchemaDocument::new(json!({}));
        let mut reifier = Reifier::new(&doc, "Unused", ReifyOptions::default());
        let node = SchemaNode::from_value(&json!({ "type": "boolean" })).unwrap();
        let id = reifier.reify(&node, "flag", &[]).unwrap();
        let module = reifier.finish(None).unwrap();
        assert_eq!(module.get(id).name, "Flag");
        assert!(matches!(
            module.get(id).spec,
            TypeSpec::Alias { target: TypeRef::Primitive(Primitive::Boolean) }
        ));
    }

    #[test]
    fn every_reference_resolves_and_idents_are_unique() {
        let module = reify(json!({
            "properties": {
                "a": { "type": "object", "properties": { "item": { "enum": [1, 2] } } },
                "b": { "type": "object", "properties": { "item": { "enum": [3] } } }
            }
        }));
        let mut idents = HashSet::new();
        for def in module.iter() {
            assert!(idents.insert(def.ident.clone()), "duplicate {}", def.ident);
            for id in CodeModule::references(&def.spec) {
                assert!(id.0 < module.len());
            }
        }
        assert_eq!(def(&module, "Root.B.Item").ident, "BItem");
    }
}
