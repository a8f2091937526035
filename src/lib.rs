//! Reify JSON Schema documents into strongly-typed Rust.
//!
//! `schema` parses a document, `reify` turns it into a [`ir::CodeModule`],
//! `codegen` renders the module as Rust source whose types implement
//! [`runtime::Codec`]. `codec` runs the same decode/encode rules directly
//! against a module, without generating code.
pub mod cli;
pub mod codec;
pub mod codegen;
pub mod error;
pub mod generate;
pub mod ir;
pub mod naming;
pub mod reify;
pub mod runtime;
pub mod schema;

pub use codec::{Instance, Interpreter};
pub use codegen::{emit, render, EmitOptions};
pub use error::{ReifyError, SchemaError};
pub use ir::CodeModule;
pub use naming::{Access, ReifyOptions};
pub use reify::{reify_document, reify_value, Reifier};
pub use runtime::{Codec, DecodeError, JsonPath};
pub use schema::SchemaDocument;
