//! CLI: schema → (rust | inspect | check)
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::codec::Interpreter;
use crate::codegen::EmitOptions;
use crate::generate::{self, GenerateSettings, Output};
use crate::naming::{is_identifier, Access, ReifyOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// reify JSON Schema documents into Rust types that decode, validate and encode JSON
#[derive(Parser, Debug)]
#[command(name = "json-reify", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// debug logging (overridden by JSON_REIFY_LOG)
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// errors only
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate a Rust module per schema file
    Rust(RustOut),
    /// print the reified code model as JSON
    Inspect(InspectOut),
    /// decode JSON instances against a schema and verify the round trip
    Check(CheckIn),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// root type name (default: derived from the schema file name)
    #[arg(long)]
    root_name: Option<String>,

    /// override a generated name; FROM is the raw id or its dotted path (e.g. `Root.list`)
    #[arg(long, value_name = "FROM=TO", value_parser = parse_rename)]
    rename: Vec<(String, String)>,

    /// visibility of generated types and members: pub, crate or private
    #[arg(long, default_value = "pub")]
    access: Access,

    /// JSON Pointer selecting the schema root inside each document (e.g. /components/item)
    #[arg(long)]
    json_pointer: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct RustOut {
    /// One or more schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// module path generated code imports the runtime from
    #[arg(long, default_value = "json_reify::runtime")]
    runtime_path: String,

    /// output directory, one .rs file per schema (stdout if omitted)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    /// schema file
    #[arg(long, short)]
    input: PathBuf,

    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckIn {
    /// schema file
    #[arg(long, short)]
    schema: PathBuf,

    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// One or more instance files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn reify_options(&self) -> ReifyOptions {
        let access = self.access;
        let mut options = ReifyOptions::default().with_accessor(move |_| access);
        if !self.rename.is_empty() {
            let renames = self.rename.clone();
            let trim = options.trim_prefixes.clone();
            options = options.with_renamer(move |path, id| {
                let short = trim.iter().fold(id, |id, prefix| id.strip_prefix(prefix.as_str()).unwrap_or(id));
                let dotted = path.iter().map(String::as_str).chain([short]).collect::<Vec<_>>().join(".");
                renames
                    .iter()
                    .find(|(from, _)| from == id || from == short || *from == dotted)
                    .map(|(_, to)| to.clone())
            });
        }
        options
    }

    fn reify(&self, schema: &Path) -> anyhow::Result<crate::ir::CodeModule> {
        let module = generate::reify_file(
            schema,
            self.root_name.as_deref(),
            self.json_pointer.as_deref(),
            &self.reify_options(),
        )?;
        Ok(module)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Default log level for this invocation.
    pub fn log_level(&self) -> &'static str {
        match (self.verbose, self.quiet) {
            (true, _) => "debug",
            (_, true) => "error",
            _ => "warn",
        }
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Rust(target) => target.run(),
            Command::Inspect(target) => target.run(),
            Command::Check(target) => target.run(),
        }
    }
}

impl RustOut {
    fn run(&self) -> anyhow::Result<()> {
        // 1) inputs
        let inputs = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;

        // 2) generate
        let settings = GenerateSettings {
            out_dir: self.out_dir.clone(),
            root_name: self.schema_settings.root_name.clone(),
            json_pointer: self.schema_settings.json_pointer.clone(),
            reify: self.schema_settings.reify_options(),
            emit: EmitOptions::default().with_runtime_path(&self.runtime_path),
        };
        let outcomes = generate::generate_all(&inputs, &settings);

        // 3) report
        let mut failed = 0;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(Output::Written(path)) => {
                    eprintln!("{} {} → {}", "✓".green(), outcome.input.display(), path.display());
                }
                Ok(Output::Rendered(source)) => println!("{source}"),
                Err(error) => {
                    failed += 1;
                    eprintln!("{} {}", "✗".red(), error.to_string().as_str().red());
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} schema files failed", outcomes.len());
        }
        Ok(())
    }
}

impl InspectOut {
    fn run(&self) -> anyhow::Result<()> {
        let module = self.schema_settings.reify(&self.input)?;
        let model_src = serde_json::to_string_pretty(&module)?;
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &model_src).with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{model_src}");
        }
        Ok(())
    }
}

impl CheckIn {
    fn run(&self) -> anyhow::Result<()> {
        let module = self.schema_settings.reify(&self.schema)?;
        let interpreter = Interpreter::new(&module);
        let inputs = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;

        let mut failed = 0;
        for input in &inputs {
            let verdict = generate::read_json(input)
                .map_err(|error| error.to_string())
                .and_then(|value| {
                    let instance = interpreter.decode_root(&value).map_err(|error| error.to_string())?;
                    if instance.encode() == value {
                        Ok(())
                    } else {
                        Err("decoded value does not encode back to the input".to_string())
                    }
                });
            match verdict {
                Ok(()) => eprintln!("{} {}", "✓".green(), input.display()),
                Err(reason) => {
                    failed += 1;
                    eprintln!("{} {}: {}", "✗".red(), input.display(), reason.as_str().red());
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} instances failed", inputs.len());
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_rename(raw: &str) -> Result<(String, String), String> {
    let (from, to) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got `{raw}`"))?;
    if from.is_empty() {
        return Err(format!("empty FROM in `{raw}`"));
    }
    if !is_identifier(to) {
        return Err(format!("`{to}` is not a valid Rust identifier"));
    }
    Ok((from.to_string(), to.to_string()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_pairs_are_validated() {
        assert_eq!(parse_rename("list=Items").unwrap(), ("list".to_string(), "Items".to_string()));
        assert!(parse_rename("list").is_err());
        assert!(parse_rename("=Items").is_err());
        assert!(parse_rename("list=not valid").is_err());
    }

    #[test]
    fn renames_match_raw_trimmed_or_dotted_ids() {
        let settings = SchemaSettings {
            root_name: None,
            rename: vec![
                ("point".to_string(), "Coordinate".to_string()),
                ("Root.item".to_string(), "Entry".to_string()),
            ],
            access: Access::Crate,
            json_pointer: None,
        };
        let options = settings.reify_options();
        let renamer = options.renamer.as_ref().unwrap();
        assert_eq!(renamer(&[], "#/definitions/point").as_deref(), Some("Coordinate"));
        assert_eq!(renamer(&["Root".to_string()], "item").as_deref(), Some("Entry"));
        assert_eq!(renamer(&["Other".to_string()], "item"), None);
        assert_eq!(options.access_for(&["Root".to_string()]), Access::Crate);
    }

    #[test]
    fn globs_must_match_something() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        let hit = format!("{}/*.json", dir.path().display());
        assert_eq!(resolve_file_path_patterns([hit]).unwrap().len(), 1);
        let miss = format!("{}/*.yaml", dir.path().display());
        assert!(resolve_file_path_patterns([miss]).is_err());
    }

    #[test]
    fn arguments_parse() {
        let cli = CommandLineInterface::try_parse_from([
            "json-reify", "rust", "-i", "a.json", "--rename", "a=B", "--access", "crate", "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "debug");
        match cli.cmd {
            Command::Rust(target) => {
                assert_eq!(target.schema_settings.access, Access::Crate);
                assert_eq!(target.runtime_path, "json_reify::runtime");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
