//! Reification-time errors.
//!
//! Anything here means the schema itself cannot be turned into types. Decode
//! failures of JSON instances live in [`crate::runtime::DecodeError`] and never
//! mix with these.
use thiserror::Error;

/// The schema document is malformed or its references cannot be followed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A node's shape is inconsistent with its kind.
    #[error("malformed schema at {pointer}: {reason}")]
    Malformed { pointer: String, reason: String },

    /// A `$ref` points outside the document or at nothing.
    #[error("unresolved reference `{pointer}`")]
    UnresolvedRef { pointer: String },

    /// A reference chain loops without crossing an object or array boundary.
    #[error("cyclic reference `{pointer}` ({})", .chain.join(" -> "))]
    CyclicRef { pointer: String, chain: Vec<String> },
}

impl SchemaError {
    pub(crate) fn malformed(pointer: &str, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            pointer: display_pointer(pointer),
            reason: reason.into(),
        }
    }
}

/// A well-formed schema uses something the reifier cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReifyError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Two `allOf` branches declare the same property with different types.
    #[error("`{type_name}`: property `{property}` has conflicting types across allOf branches")]
    ConflictingMerge { type_name: String, property: String },

    #[error("`{type_name}`: unsupported construct: {construct}")]
    UnsupportedConstruct { type_name: String, construct: String },

    /// A renamer override asked for a name that is already taken in its scope.
    #[error("type name `{name}` is already taken in scope `{scope}`")]
    NameCollision { name: String, scope: String },
}

/// `""` is the document root; show it as `#` like the `$ref` syntax does.
fn display_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "#".to_string()
    } else {
        format!("#{pointer}")
    }
}
