//! Name Resolver.
//!
//! Turns schema keys, titles and `$ref` pointers into Rust identifiers:
//! `UpperCamel` type and variant names, `snake_case` members, keyword-safe
//! everywhere. Type names are claimed per scope (the path of enclosing type
//! names) and once more in the flat namespace of the emitted file.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ReifyError;

// ————————————————————————————————————————————————————————————————————————————
// CONFIGURATION
// ————————————————————————————————————————————————————————————————————————————

/// `renamer(parents, default_id) -> Some(override)`.
pub type Renamer = Arc<dyn Fn(&[String], &str) -> Option<String> + Send + Sync>;

/// `accessor(type_path) -> visibility` for a generated type and its members.
pub type Accessor = Arc<dyn Fn(&[String]) -> Access + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Crate,
    Private,
}

impl Access {
    /// Visibility prefix, including the trailing space when non-empty.
    pub fn prefix(self) -> &'static str {
        match self {
            Access::Public => "pub ",
            Access::Crate => "pub(crate) ",
            Access::Private => "",
        }
    }
}

impl std::str::FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pub" | "public" => Ok(Access::Public),
            "crate" => Ok(Access::Crate),
            "private" | "priv" => Ok(Access::Private),
            other => Err(format!("unknown access level `{other}` (expected pub, crate or private)")),
        }
    }
}

/// Hooks and knobs for one reification run. Passed explicitly, never global.
#[derive(Clone)]
pub struct ReifyOptions {
    pub renamer: Option<Renamer>,
    pub accessor: Option<Accessor>,
    /// Stripped from `$ref` pointers before they become type names.
    pub trim_prefixes: Vec<String>,
}

impl Default for ReifyOptions {
    fn default() -> Self {
        Self {
            renamer: None,
            accessor: None,
            trim_prefixes: vec![
                "#/definitions/".to_string(),
                "#/$defs/".to_string(),
                "#/defs/".to_string(),
            ],
        }
    }
}

impl fmt::Debug for ReifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReifyOptions")
            .field("renamer", &self.renamer.is_some())
            .field("accessor", &self.accessor.is_some())
            .field("trim_prefixes", &self.trim_prefixes)
            .finish()
    }
}

impl ReifyOptions {
    pub fn with_renamer<F>(mut self, renamer: F) -> Self
    where
        F: Fn(&[String], &str) -> Option<String> + Send + Sync + 'static,
    {
        self.renamer = Some(Arc::new(renamer));
        self
    }

    pub fn with_accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&[String]) -> Access + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    pub fn with_trim_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trim_prefixes.push(prefix.into());
        self
    }

    pub fn access_for(&self, path: &[String]) -> Access {
        self.accessor.as_ref().map(|f| f(path)).unwrap_or_default()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RESERVED WORDS
// ————————————————————————————————————————————————————————————————————————————

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
        "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
        "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
        "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
    ]
    .into_iter()
    .collect()
});

/// Keywords that cannot be written as raw identifiers.
const NOT_RAW: &[&str] = &["crate", "self", "super", "Self", "_"];

/// Names the generated file already uses; a schema type may not shadow them.
const SHADOWED_TYPES: &[&str] = &[
    "Self", "String", "Vec", "Option", "Box", "Result", "Some", "None", "Ok", "Err", "Value",
    "Number", "IndexMap", "JsonPath", "DecodeError", "Codec", "ObjectReader", "ObjectWriter",
    "Alternative",
];

static IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern")
});

pub fn is_identifier(s: &str) -> bool {
    IDENT.is_match(s) && s != "_"
}

/// Escape a member or function identifier: `for` → `r#for`, `self` → `self_`.
pub fn escape_keyword(name: &str) -> String {
    if NOT_RAW.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SANITIZING
// ————————————————————————————————————————————————————————————————————————————

/// `UpperCamel` form of an arbitrary string; empty when nothing usable remains.
///
/// Characters outside `[A-Za-z0-9_]` are dropped and capitalize what follows;
/// leading digits are dropped.
fn camel(raw: &str) -> String {
    let mut name = String::new();
    let mut cap_next = true;
    for c in raw.chars() {
        let valid = if name.is_empty() {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !valid {
            cap_next = true;
        } else if cap_next {
            name.push(c.to_ascii_uppercase());
            cap_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// `">="` → `"U62U61"`.
fn scalar_codes(raw: &str, prefix: char) -> String {
    raw.chars().map(|c| format!("{prefix}{}", c as u32)).collect()
}

/// Sanitized `UpperCamel` type or variant name for `raw`.
pub fn type_ident(raw: &str) -> String {
    let mut name = camel(raw);
    if name.is_empty() {
        name = if raw.is_empty() { "Empty".to_string() } else { scalar_codes(raw, 'U') };
    }
    if SHADOWED_TYPES.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Enum variant name for a case or branch; only `Self` needs escaping here.
pub fn variant_ident(raw: &str) -> String {
    let mut name = camel(raw);
    if name.is_empty() {
        name = if raw.is_empty() { "Empty".to_string() } else { scalar_codes(raw, 'U') };
    }
    if name == "Self" {
        name.push('_');
    }
    name
}

/// Sanitized, keyword-escaped `snake_case` member name for a JSON key.
pub fn member_ident(raw: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = raw.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() {
                let prev = i.checked_sub(1).map(|j| chars[j]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                    _ => false,
                };
                if boundary && !out.ends_with('_') && !out.is_empty() {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        return if raw.is_empty() { "empty".to_string() } else { scalar_codes(raw, 'u') };
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    escape_keyword(&out)
}

/// `base`, or `base2`, `base3`, ... whichever is not yet in `taken`; claims it.
pub fn unique(taken: &mut HashSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NAMER
// ————————————————————————————————————————————————————————————————————————————

/// A claimed type name: unique within its scope, and unique in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimed {
    /// Name within the enclosing path (`Prop` under `Sample.ListItem`).
    pub local: String,
    /// Name in the flat namespace of the emitted file.
    pub ident: String,
}

pub struct Namer {
    options: ReifyOptions,
    scopes: HashMap<Vec<String>, HashSet<String>>,
    idents: HashSet<String>,
}

impl Namer {
    pub fn new(options: ReifyOptions) -> Self {
        Self { options, scopes: HashMap::new(), idents: HashSet::new() }
    }

    pub fn options(&self) -> &ReifyOptions {
        &self.options
    }

    fn renamed(&self, path: &[String], id: &str) -> Option<String> {
        self.options.renamer.as_ref().and_then(|f| f(path, id))
    }

    fn trimmed<'s>(&self, id: &'s str) -> &'s str {
        let mut id = id;
        for prefix in &self.options.trim_prefixes {
            if let Some(rest) = id.strip_prefix(prefix.as_str()) {
                id = rest;
            }
        }
        id
    }

    /// The name `candidate` would get under `path`, without claiming it.
    pub fn name(&self, path: &[String], candidate: &str) -> String {
        self.renamed(path, candidate)
            .unwrap_or_else(|| type_ident(self.trimmed(candidate)))
    }

    /// Claim a type name for `candidate` under `path`.
    ///
    /// Sanitized names get an index suffix when taken; an override from the
    /// renamer is used as-is and colliding with it is an error.
    pub fn claim(&mut self, path: &[String], candidate: &str) -> Result<Claimed, ReifyError> {
        if let Some(forced) = self.renamed(path, candidate) {
            let scope = self.scopes.entry(path.to_vec()).or_default();
            if !scope.insert(forced.clone()) {
                return Err(ReifyError::NameCollision { name: forced, scope: scope_label(path) });
            }
            if !self.idents.insert(forced.clone()) {
                return Err(ReifyError::NameCollision { name: forced, scope: "<module>".to_string() });
            }
            tracing::debug!(candidate, name = %forced, "renamer override");
            return Ok(Claimed { local: forced.clone(), ident: forced });
        }

        let base = type_ident(self.trimmed(candidate));
        let local = unique(self.scopes.entry(path.to_vec()).or_default(), base);
        let ident = self.flat_ident(path, &local);
        Ok(Claimed { local, ident })
    }

    /// Qualify by enclosing names until the flat ident is free, then index it.
    fn flat_ident(&mut self, path: &[String], local: &str) -> String {
        let mut candidate = local.to_string();
        for depth in 0..=path.len() {
            if depth > 0 {
                candidate = format!("{}{candidate}", path[path.len() - depth]);
            }
            if self.idents.insert(candidate.clone()) {
                return candidate;
            }
        }
        unique(&mut self.idents, candidate)
    }

    /// Member name for the JSON key `key` of the type at `path`.
    pub fn member(&self, path: &[String], key: &str) -> String {
        self.renamed(path, key).unwrap_or_else(|| member_ident(key))
    }
}

fn scope_label(path: &[String]) -> String {
    if path.is_empty() { "<root>".to_string() } else { path.join(".") }
}
