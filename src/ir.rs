// Strongly-typed Code Model for codegen. No schema nodes here.
//
// Every synthesized type lives in one `CodeModule` arena and is addressed by a
// stable `TypeId`; cross-references (including recursive ones) are ids, never
// owned subtrees.

use serde::Serialize;
use serde_json::Value;

use crate::naming::Access;
use crate::schema::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub usize);

/// Where a value's type comes from: a definition in the module, or inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    Defined(TypeId),
    Primitive(Primitive),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    /// Held as `i64`: integers past `i64::MAX` (valid `u64` literals included)
    /// fail to decode. Enum literals are compared as JSON values and keep the
    /// full range.
    Integer,
    Boolean,
    Null,
    Any,
    Array(Box<TypeRef>),
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDef {
    pub id: TypeId,
    /// Name within the enclosing path.
    pub name: String,
    /// Names of the enclosing types, outermost first.
    pub parents: Vec<String>,
    /// Identifier in the flat namespace of the emitted file.
    pub ident: String,
    pub access: Access,
    pub docs: Vec<String>,
    /// Pointer of the schema node this type was reified from.
    pub origin: String,
    /// Inline `allOf` branch: addressable for docs, folded into its merge.
    pub constituent: bool,
    pub spec: TypeSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSpec {
    Record(Record),
    #[serde(rename = "closed_enum")]
    ClosedEnum(ClosedEnum),
    Sum(SumType),
    Merged(Merged),
    Alias { target: TypeRef },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record {
    pub fields: Vec<Field>,
    pub additional: Additional,
    /// Member holding retained unknown keys; `None` when the record is closed.
    pub extras_member: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// JSON key.
    pub key: String,
    pub member: String,
    pub ty: TypeRef,
    /// Absent means `None`; present `null` is only valid when `ty` admits null.
    pub required: bool,
    pub boxed: bool,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Additional {
    #[default]
    Allowed,
    Forbidden,
    Typed(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedEnum {
    pub base: Scalar,
    pub cases: Vec<EnumCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumCase {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusivity {
    /// `oneOf`
    ExactlyOne,
    /// `anyOf`
    AtLeastOne,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumType {
    pub exclusivity: Exclusivity,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    /// Variant (oneOf) or member (anyOf) name.
    pub name: String,
    pub ty: TypeRef,
    pub boxed: bool,
}

/// `allOf`: one flattened record checked branch by branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Merged {
    pub record: Record,
    pub constituents: Vec<TypeRef>,
    pub negations: Vec<Negation>,
    /// Decode order, one step per branch in declaration order.
    pub steps: Vec<MergeStep>,
}

/// What one `allOf` branch checks when the merged record is decoded.
///
/// Indexes point into `Merged::record.fields` and `Merged::negations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum MergeStep {
    Branch {
        /// Fields first declared by this branch; decoded here when present.
        fields: Vec<usize>,
        /// Fields first required by this branch; missing ones fail here.
        required: Vec<usize>,
        /// Unknown keys fail here.
        closed: bool,
    },
    Negation { index: usize },
}

/// A `{ "not": S }` branch of an `allOf`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Negation {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CodeModule {
    pub root: Option<TypeId>,
    defs: Vec<TypeDef>,
}

/// Everything about a type except its spec, known before its body is built.
#[derive(Debug, Clone)]
pub struct TypeHeader {
    pub name: String,
    pub parents: Vec<String>,
    pub ident: String,
    pub access: Access,
    pub docs: Vec<String>,
    pub origin: String,
}

impl TypeRef {
    pub fn array_of(item: TypeRef) -> TypeRef {
        TypeRef::Primitive(Primitive::Array(Box::new(item)))
    }

    pub fn defined(&self) -> Option<TypeId> {
        match self {
            TypeRef::Defined(id) => Some(*id),
            TypeRef::Primitive(_) => None,
        }
    }
}

impl TypeDef {
    /// `Sample.ListItem.Prop`
    pub fn qualified_name(&self) -> String {
        if self.parents.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.parents.join("."), self.name)
        }
    }

    /// Enclosing names plus this one; the scope of nested types.
    pub fn path(&self) -> Vec<String> {
        let mut path = self.parents.clone();
        path.push(self.name.clone());
        path
    }
}

impl CodeModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id before the body exists, so recursive references to the
    /// type can be made while it is being built.
    pub fn reserve(&mut self, header: TypeHeader) -> TypeId {
        let id = TypeId(self.defs.len());
        self.defs.push(TypeDef {
            id,
            name: header.name,
            parents: header.parents,
            ident: header.ident,
            access: header.access,
            docs: header.docs,
            origin: header.origin,
            constituent: false,
            spec: TypeSpec::Alias { target: TypeRef::Primitive(Primitive::Any) },
        });
        id
    }

    pub fn define(&mut self, id: TypeId, spec: TypeSpec) {
        self.defs[id.0].spec = spec;
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.0]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.defs[id.0]
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// All definitions in creation (document) order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.iter()
    }

    /// Definitions that become public API (inline `allOf` branches excluded).
    pub fn emitted(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.iter().filter(|def| !def.constituent)
    }

    /// Look up by qualified name (`Sample.ListItem`) or flat identifier.
    pub fn find(&self, name: &str) -> Option<&TypeDef> {
        self.defs
            .iter()
            .find(|def| def.qualified_name() == name)
            .or_else(|| self.defs.iter().find(|def| def.ident == name))
    }

    /// Follow alias definitions to the first non-alias reference.
    pub fn resolve_alias<'a>(&'a self, mut ty: &'a TypeRef) -> &'a TypeRef {
        for _ in 0..=self.defs.len() {
            match ty {
                TypeRef::Defined(id) => match &self.get(*id).spec {
                    TypeSpec::Alias { target } => ty = target,
                    _ => return ty,
                },
                TypeRef::Primitive(_) => return ty,
            }
        }
        ty
    }

    /// Every `TypeRef::Defined` reachable from a definition's spec.
    pub fn references(spec: &TypeSpec) -> Vec<TypeId> {
        fn walk(ty: &TypeRef, out: &mut Vec<TypeId>) {
            match ty {
                TypeRef::Defined(id) => out.push(*id),
                TypeRef::Primitive(Primitive::Array(item)) => walk(item, out),
                TypeRef::Primitive(_) => {}
            }
        }
        fn record(rec: &Record, out: &mut Vec<TypeId>) {
            for field in &rec.fields {
                walk(&field.ty, out);
            }
            if let Additional::Typed(ty) = &rec.additional {
                walk(ty, out);
            }
        }

        let mut out = Vec::new();
        match spec {
            TypeSpec::Record(rec) => record(rec, &mut out),
            TypeSpec::ClosedEnum(_) => {}
            TypeSpec::Sum(sum) => sum.branches.iter().for_each(|b| walk(&b.ty, &mut out)),
            TypeSpec::Merged(merged) => {
                record(&merged.record, &mut out);
                merged.constituents.iter().for_each(|c| walk(c, &mut out));
                merged.negations.iter().for_each(|n| walk(&n.ty, &mut out));
            }
            TypeSpec::Alias { target } => walk(target, &mut out),
        }
        out
    }
}
