//! Per-category registry files (`app/<category>/__init__.py`).
//!
//! A registry holds one import line per generated artifact followed by a
//! single `__all__` declaration. Instead of patching the file line by line it
//! is loaded into a [`Registry`], mutated and serialized back whole, sorted by
//! identifier, so the result does not depend on the order tables were
//! generated in.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use super::schema::to_camel_case;
use super::templates::write_artifact;
use crate::error::ScaffoldError;

/// File name of a registry inside its category directory
pub const REGISTRY_FILE: &str = "__init__.py";

/// First line of every registry file
pub const REGISTRY_HEADER: &str = "# Generated by pgscaffold. Do not edit by hand.";

const AGGREGATE_PREFIX: &str = "__all__";
const IDENT: &str = "[A-Za-z0-9_]+";

/// Import-line template with `{name}` and `{display}` placeholders
///
/// `{name}` is the lower-case artifact identifier and `{display}` its
/// CamelCase form. The pattern doubles as a parser for lines it produced.
#[derive(Debug, Clone)]
pub struct ImportPattern {
    template: String,
    matcher: Regex,
}

impl ImportPattern {
    /// Compile a pattern; it must contain `{name}` at least once
    pub fn new(template: &str) -> Result<Self, ScaffoldError> {
        if !template.contains("{name}") {
            return Err(ScaffoldError::Config(format!(
                "import pattern '{template}' has no {{name}} placeholder"
            )));
        }
        let escaped = regex::escape(template);
        let name_token = regex::escape("{name}");
        let display_token = regex::escape("{display}");
        // First {name} captures; later ones are checked by re-formatting.
        let source = escaped
            .replacen(&name_token, &format!("(?P<name>{IDENT})"), 1)
            .replace(&name_token, IDENT)
            .replace(&display_token, IDENT);
        let matcher = Regex::new(&format!("^{source}$")).map_err(|e| {
            ScaffoldError::Config(format!("import pattern '{template}' is invalid: {e}"))
        })?;
        Ok(Self {
            template: template.to_string(),
            matcher,
        })
    }

    /// Import line for `identifier`
    pub fn format(&self, identifier: &str) -> String {
        let name = identifier.to_lowercase();
        self.template
            .replace("{display}", &to_camel_case(&name))
            .replace("{name}", &name)
    }

    /// Identifier of a line this pattern would have produced
    pub fn parse(&self, line: &str) -> Option<String> {
        let name = self.matcher.captures(line)?.name("name")?.as_str();
        (self.format(name) == line).then(|| name.to_string())
    }
}

/// Names bound by a Python `from x import a, b as c` / `import x` line
pub fn imported_names(line: &str) -> Vec<String> {
    let line = line.trim();
    let (names, is_from) = if let Some(rest) = line.strip_prefix("from ") {
        match rest.split_once(" import ") {
            Some((_, names)) => (names, true),
            None => return Vec::new(),
        }
    } else if let Some(rest) = line.strip_prefix("import ") {
        (rest, false)
    } else {
        return Vec::new();
    };
    names
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            let bound = match part.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None if is_from => part,
                // `import a.b` binds `a`
                None => part.split('.').next().unwrap_or(part),
            };
            (!bound.is_empty() && bound != "*").then(|| bound.to_string())
        })
        .collect()
}

/// In-memory form of one registry file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    /// Hand-written lines, kept verbatim in their original order
    preamble: Vec<String>,
    /// identifier → generated import line
    entries: BTreeMap<String, String>,
}

/// Outcome of [`update_registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryUpdate {
    /// A new import line was added and the file rewritten
    Added,
    /// The import line was already present; the file was not touched
    Unchanged,
}

impl Registry {
    /// Parse registry text, sorting lines into generated entries and preamble
    pub fn parse(content: &str, pattern: &ImportPattern) -> Self {
        let mut registry = Registry::default();
        let mut in_aggregate = false;
        for raw in content.lines() {
            let line = raw.trim_end();
            if in_aggregate {
                in_aggregate = !line.contains(']');
                continue;
            }
            if line.starts_with(AGGREGATE_PREFIX) {
                in_aggregate = line.contains('[') && !line.contains(']');
                continue;
            }
            if line.is_empty() || line == REGISTRY_HEADER {
                continue;
            }
            match pattern.parse(line) {
                Some(identifier) => {
                    registry.entries.insert(identifier, line.to_string());
                }
                None => registry.preamble.push(line.to_string()),
            }
        }
        registry
    }

    /// Add or replace the entry for `identifier`
    pub fn insert(&mut self, identifier: &str, pattern: &ImportPattern) {
        self.entries
            .insert(identifier.to_lowercase(), pattern.format(identifier));
    }

    /// Generated identifiers in serialization order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every name imported by the file, deduplicated and sorted
    pub fn exported_names(&self) -> BTreeSet<String> {
        self.preamble
            .iter()
            .chain(self.entries.values())
            .flat_map(|line| imported_names(line))
            .collect()
    }

    /// Serialize: header, preamble, sorted imports, one `__all__` line
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REGISTRY_HEADER);
        out.push('\n');
        for line in self.preamble.iter().chain(self.entries.values()) {
            out.push_str(line);
            out.push('\n');
        }
        let names = self
            .exported_names()
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ");
        out.push('\n');
        out.push_str(&format!("{AGGREGATE_PREFIX} = [{names}]\n"));
        out
    }
}

/// Path of the registry file in `category_dir`
pub fn registry_path(category_dir: &Path) -> PathBuf {
    category_dir.join(REGISTRY_FILE)
}

/// Register `identifier` in the registry of `category_dir`
///
/// Creates the registry with only its header if it does not exist. When the
/// exact import line is already present nothing is written. Otherwise the
/// entry is added, every previous `__all__` declaration is dropped and the
/// file is rewritten with one fresh declaration.
///
/// # Errors
///
/// Returns [`ScaffoldError::Filesystem`] if the file cannot be read or written.
pub fn update_registry(
    category_dir: &Path,
    identifier: &str,
    pattern: &ImportPattern,
) -> Result<RegistryUpdate, ScaffoldError> {
    let path = registry_path(category_dir);
    if !path.exists() {
        write_artifact(&path, &format!("{REGISTRY_HEADER}\n"))?;
    }
    let content = fs::read_to_string(&path).map_err(|e| ScaffoldError::fs(&path, e))?;

    let candidate = pattern.format(identifier);
    if content.lines().any(|line| line.trim_end() == candidate) {
        debug!(path = %path.display(), identifier, "registry entry already present");
        return Ok(RegistryUpdate::Unchanged);
    }

    let mut registry = Registry::parse(&content, pattern);
    registry.insert(identifier, pattern);
    write_artifact(&path, &registry.render())?;
    debug!(path = %path.display(), identifier, "registry entry added");
    Ok(RegistryUpdate::Added)
}
