//! `allOf`: fold every branch into one flattened record, remembering which
//! branch declared, required or closed what so decoding can check the branches
//! in order.
use std::collections::HashSet;

use indexmap::IndexMap;

use super::{ordinal_id, Reifier};
use crate::error::ReifyError;
use crate::ir::{
    Additional, CodeModule, EnumCase, Field, MergeStep, Merged, Negation, Primitive, Record, TypeId,
    TypeRef, TypeSpec,
};
use crate::naming::{member_ident, unique};
use crate::schema::{SchemaKind, SchemaNode};

pub(super) fn merged(
    reifier: &mut Reifier<'_>,
    owner: TypeId,
    branches: &[SchemaNode],
    id: &str,
    path: &[String],
    pointer: &str,
) -> Result<TypeSpec, ReifyError> {
    let mut fields: IndexMap<String, Field> = IndexMap::new();
    let mut members = HashSet::new();
    let mut closed = false;
    let mut typed: Option<TypeRef> = None;
    let mut constituents = Vec::new();
    let mut negations: Vec<Negation> = Vec::new();
    let mut negation_names = HashSet::new();
    let mut steps = Vec::new();
    let mut required_seen = HashSet::new();

    for (index, branch) in branches.iter().enumerate() {
        let at = format!("{pointer}/allOf/{index}");

        if let SchemaKind::Not(inner) = &branch.kind {
            let name_id = inner
                .title
                .clone()
                .unwrap_or_else(|| format!("Not{}", ordinal_id(index, id)));
            let ty = reifier.type_ref(inner, &name_id, path, &format!("{at}/not"))?;
            steps.push(MergeStep::Negation { index: negations.len() });
            negations.push(Negation { name: unique(&mut negation_names, member_ident(&name_id)), ty });
            continue;
        }

        let branch_id = branch.title.clone().unwrap_or_else(|| ordinal_id(index, id));
        let ty = reifier.type_ref(branch, &branch_id, path, &at)?;
        if !matches!(branch.kind, SchemaKind::Reference(_)) {
            if let TypeRef::Defined(def) = &ty {
                reifier.module.get_mut(*def).constituent = true;
            }
        }

        let (record, nested) = reifier.record_of(owner, &ty)?;
        let branch_closed = record.additional == Additional::Forbidden;
        match record.additional {
            Additional::Forbidden => closed = true,
            Additional::Typed(ty) => {
                typed.get_or_insert(ty);
            }
            Additional::Allowed => {}
        }

        let mut declared = Vec::new();
        let mut required = Vec::new();
        for field in record.fields {
            let is_required = field.required;
            let slot = match fields.get_full_mut(&field.key) {
                Some((slot, _, existing)) => {
                    let ty = compatible(&reifier.module, &existing.ty, &field.ty).ok_or_else(|| {
                        ReifyError::ConflictingMerge {
                            type_name: reifier.module.get(owner).qualified_name(),
                            property: field.key.clone(),
                        }
                    })?;
                    existing.ty = ty;
                    existing.required |= field.required;
                    if existing.docs.is_empty() {
                        existing.docs = field.docs;
                    }
                    slot
                }
                None => {
                    let member = unique(&mut members, field.member.clone());
                    let (slot, _) = fields.insert_full(field.key.clone(), Field { member, ..field });
                    declared.push(slot);
                    slot
                }
            };
            if is_required && required_seen.insert(slot) {
                required.push(slot);
            }
        }
        steps.push(MergeStep::Branch { fields: declared, required, closed: branch_closed });

        for negation in nested {
            let name = unique(&mut negation_names, negation.name);
            steps.push(MergeStep::Negation { index: negations.len() });
            negations.push(Negation { name, ty: negation.ty });
        }
        constituents.push(ty);
    }

    let additional = match (closed, typed) {
        (true, _) => Additional::Forbidden,
        (false, Some(ty)) => Additional::Typed(ty),
        (false, None) => Additional::Allowed,
    };
    let extras_member = match additional {
        Additional::Forbidden => None,
        _ => Some(unique(&mut members, "additional_properties".to_string())),
    };

    Ok(TypeSpec::Merged(Merged {
        record: Record { fields: fields.into_values().collect(), additional, extras_member },
        constituents,
        negations,
        steps,
    }))
}

/// The type two branches agree on for one property, if any.
///
/// An untyped property (required but undeclared) yields to a typed one; enums
/// agree when they list the same literals.
fn compatible(module: &CodeModule, a: &TypeRef, b: &TypeRef) -> Option<TypeRef> {
    let any = TypeRef::Primitive(Primitive::Any);
    if a == b || *b == any {
        return Some(a.clone());
    }
    if *a == any {
        return Some(b.clone());
    }
    let (ra, rb) = (module.resolve_alias(a), module.resolve_alias(b));
    if ra == rb {
        return Some(a.clone());
    }
    match (ra, rb) {
        (TypeRef::Defined(x), TypeRef::Defined(y)) => match (&module.get(*x).spec, &module.get(*y).spec) {
            (TypeSpec::ClosedEnum(ex), TypeSpec::ClosedEnum(ey)) => {
                let values = |cases: &[EnumCase]| cases.iter().map(|c| c.value.clone()).collect::<Vec<_>>();
                (values(&ex.cases) == values(&ey.cases)).then(|| a.clone())
            }
            _ => None,
        },
        _ => None,
    }
}
