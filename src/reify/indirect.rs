//! Indirection analysis over the finished module.
//!
//! A field or branch whose type leads back to its own definition without
//! passing through an array (or a map of additional properties) is stored
//! boxed. A cycle made only of sums and aliases has no object or array in it
//! to stop the recursion and is rejected.
use std::collections::HashSet;

use crate::error::{ReifyError, SchemaError};
use crate::ir::{CodeModule, TypeId, TypeRef, TypeSpec};

pub(super) fn analyze(module: &mut CodeModule) -> Result<(), ReifyError> {
    // 1) Sum/alias-only cycles
    for def in module.iter() {
        if is_shapeless(&def.spec) {
            if let Some(chain) = shapeless_cycle(module, def.id) {
                return Err(SchemaError::CyclicRef {
                    pointer: def.origin.clone(),
                    chain: chain.iter().map(|id| module.get(*id).origin.clone()).collect(),
                }
                .into());
            }
        }
    }

    // 2) Boxes
    for index in 0..module.len() {
        let owner = TypeId(index);
        let needs_box = |ty: &TypeRef| match ty {
            TypeRef::Defined(target) => *target == owner || reaches(module, *target, owner),
            TypeRef::Primitive(_) => false,
        };
        let flags: Vec<bool> = match &module.get(owner).spec {
            TypeSpec::Record(record) => record.fields.iter().map(|f| needs_box(&f.ty)).collect(),
            TypeSpec::Merged(merged) => merged.record.fields.iter().map(|f| needs_box(&f.ty)).collect(),
            TypeSpec::Sum(sum) => sum.branches.iter().map(|b| needs_box(&b.ty)).collect(),
            TypeSpec::ClosedEnum(_) | TypeSpec::Alias { .. } => continue,
        };
        if !flags.contains(&true) {
            continue;
        }
        tracing::debug!(name = %module.get(owner).qualified_name(), "boxing recursive members");
        match &mut module.get_mut(owner).spec {
            TypeSpec::Record(record) => record.fields.iter_mut().zip(flags).for_each(|(f, b)| f.boxed = b),
            TypeSpec::Merged(merged) => {
                merged.record.fields.iter_mut().zip(flags).for_each(|(f, b)| f.boxed = b)
            }
            TypeSpec::Sum(sum) => sum.branches.iter_mut().zip(flags).for_each(|(br, b)| br.boxed = b),
            TypeSpec::ClosedEnum(_) | TypeSpec::Alias { .. } => {}
        }
    }
    Ok(())
}

fn is_shapeless(spec: &TypeSpec) -> bool {
    matches!(spec, TypeSpec::Sum(_) | TypeSpec::Alias { .. })
}

/// Definitions stored inline (not behind a `Vec` or map) by `spec`.
fn direct_edges(spec: &TypeSpec) -> Vec<TypeId> {
    let direct = |ty: &TypeRef| ty.defined();
    match spec {
        TypeSpec::Record(record) => record.fields.iter().filter_map(|f| direct(&f.ty)).collect(),
        TypeSpec::Merged(merged) => merged.record.fields.iter().filter_map(|f| direct(&f.ty)).collect(),
        TypeSpec::Sum(sum) => sum.branches.iter().filter_map(|b| direct(&b.ty)).collect(),
        TypeSpec::Alias { target } => direct(target).into_iter().collect(),
        TypeSpec::ClosedEnum(_) => Vec::new(),
    }
}

fn reaches(module: &CodeModule, from: TypeId, to: TypeId) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == to {
            return true;
        }
        if seen.insert(id) {
            stack.extend(direct_edges(&module.get(id).spec));
        }
    }
    false
}

/// A path `start -> ... -> start` through sums and aliases only.
fn shapeless_cycle(module: &CodeModule, start: TypeId) -> Option<Vec<TypeId>> {
    fn walk(module: &CodeModule, at: TypeId, start: TypeId, trail: &mut Vec<TypeId>, seen: &mut HashSet<TypeId>) -> bool {
        for next in direct_edges(&module.get(at).spec) {
            if !is_shapeless(&module.get(next).spec) {
                continue;
            }
            if next == start {
                trail.push(next);
                return true;
            }
            if seen.insert(next) {
                trail.push(next);
                if walk(module, next, start, trail, seen) {
                    return true;
                }
                trail.pop();
            }
        }
        false
    }

    let mut trail = vec![start];
    let mut seen = HashSet::from([start]);
    walk(module, start, start, &mut trail, &mut seen).then_some(trail)
}
