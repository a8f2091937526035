//! Batch driver: many schema files → many generated modules.
//!
//! Files are processed in parallel; one file failing never stops the others.
//! Outcomes come back in input order.
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::codegen::{self, EmitOptions};
use crate::error::ReifyError;
use crate::ir::CodeModule;
use crate::naming::{member_ident, type_ident, ReifyOptions};
use crate::reify::reify_document;
use crate::schema::SchemaDocument;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} is not valid JSON: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },

    #[error("{}: JSON pointer {pointer} selects nothing", path.display())]
    Pointer { path: PathBuf, pointer: String },

    #[error("{}: {source}", path.display())]
    Reify { path: PathBuf, source: ReifyError },

    #[error("failed to write output for {}: {source}", path.display())]
    Emit { path: PathBuf, source: io::Error },

    #[error("{}: output {file_name} is already produced by {}", path.display(), first.display())]
    DuplicateOutput { path: PathBuf, file_name: String, first: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    /// Written here when set; rendered in memory otherwise.
    pub out_dir: Option<PathBuf>,
    /// Root type name; derived from each file stem when unset.
    pub root_name: Option<String>,
    /// Sub-document used as the schema root (`/definitions/thing`).
    pub json_pointer: Option<String>,
    pub reify: ReifyOptions,
    pub emit: EmitOptions,
}

#[derive(Debug)]
pub enum Output {
    Written(PathBuf),
    Rendered(String),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<Output, GenerateError>,
}

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINTS
// ————————————————————————————————————————————————————————————————————————————

pub fn generate_all(inputs: &[PathBuf], settings: &GenerateSettings) -> Vec<FileOutcome> {
    // 1) Output names are claimed up front, in input order
    let mut claimed: HashMap<String, &PathBuf> = HashMap::new();
    let plan: Vec<Result<String, GenerateError>> = inputs
        .iter()
        .map(|input| {
            let file_name = output_file_name(input);
            let first = claimed.get(&file_name).map(|first| (*first).clone());
            match first {
                Some(first) if settings.out_dir.is_some() => Err(GenerateError::DuplicateOutput {
                    path: input.clone(),
                    file_name,
                    first,
                }),
                _ => {
                    claimed.entry(file_name.clone()).or_insert(input);
                    Ok(file_name)
                }
            }
        })
        .collect();

    // 2) Work
    inputs
        .par_iter()
        .zip(plan)
        .map(|(input, file_name)| FileOutcome {
            input: input.clone(),
            result: file_name.and_then(|file_name| generate_one(input, &file_name, settings)),
        })
        .collect()
}

pub fn generate_one(input: &Path, file_name: &str, settings: &GenerateSettings) -> Result<Output, GenerateError> {
    let module = reify_file(input, settings.root_name.as_deref(), settings.json_pointer.as_deref(), &settings.reify)?;
    match &settings.out_dir {
        Some(dir) => {
            let written = codegen::emit(&module, file_name, dir, &settings.emit)
                .map_err(|source| GenerateError::Emit { path: input.to_path_buf(), source })?;
            tracing::info!(input = %input.display(), output = %written.display(), types = module.len(), "generated");
            Ok(Output::Written(written))
        }
        None => Ok(Output::Rendered(codegen::render(&module, &settings.emit))),
    }
}

/// Read, select and reify one schema file.
pub fn reify_file(
    input: &Path,
    root_name: Option<&str>,
    json_pointer: Option<&str>,
    options: &ReifyOptions,
) -> Result<CodeModule, GenerateError> {
    let document = load_schema(input, json_pointer)?;
    let root_name = root_name.map(str::to_string).unwrap_or_else(|| root_name_for(input));
    reify_document(&document, &root_name, options.clone())
        .map_err(|source| GenerateError::Reify { path: input.to_path_buf(), source })
}

/// Parse a schema file; `json_pointer` picks a sub-document as the new root,
/// and local `$ref`s then resolve against that sub-document.
pub fn load_schema(input: &Path, json_pointer: Option<&str>) -> Result<SchemaDocument, GenerateError> {
    let value = read_json(input)?;
    match json_pointer {
        None => Ok(SchemaDocument::new(value)),
        Some(pointer) => value
            .pointer(pointer)
            .cloned()
            .map(SchemaDocument::new)
            .ok_or_else(|| GenerateError::Pointer {
                path: input.to_path_buf(),
                pointer: pointer.to_string(),
            }),
    }
}

pub fn read_json(input: &Path) -> Result<Value, GenerateError> {
    let source = std::fs::read_to_string(input)
        .map_err(|source| GenerateError::Io { path: input.to_path_buf(), source })?;
    serde_json::from_str(&source).map_err(|source| GenerateError::Json { path: input.to_path_buf(), source })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn stem(input: &Path) -> String {
    let name = input.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    // `thing.schema.json` → `thing`
    name.split('.').next().unwrap_or_default().to_string()
}

/// `sample-model.json` → `SampleModel`
pub fn root_name_for(input: &Path) -> String {
    type_ident(&stem(input))
}

/// `sample-model.json` → `sample_model.rs`
pub fn output_file_name(input: &Path) -> String {
    let name = member_ident(&stem(input));
    format!("{}.rs", name.trim_start_matches("r#"))
}
