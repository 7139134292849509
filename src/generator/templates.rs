use askama::Template;
use minijinja::{Environment, Error as JinjaError, ErrorKind, UndefinedBehavior};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::context::RenderContext;
use super::schema::to_camel_case;
use crate::error::ScaffoldError;

/// Template type used when none is requested
pub const DEFAULT_TEMPLATE_TYPE: &str = "default";

/// Per-table templates compiled into the binary, keyed by identifier
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        "models/default_model.j2",
        include_str!("../../templates/models/default_model.j2"),
    ),
    (
        "controllers/default_controller.j2",
        include_str!("../../templates/controllers/default_controller.j2"),
    ),
    (
        "repositories/default_repository.j2",
        include_str!("../../templates/repositories/default_repository.j2"),
    ),
    (
        "services/default_service.j2",
        include_str!("../../templates/services/default_service.j2"),
    ),
];

/// `ModelToDictMixin`, copied verbatim into every project
pub const MODEL_MIXINS_PY: &str = include_str!("../../templates/static/model_mixins.py");

/// Renders per-table artifacts by template identifier
///
/// Identifiers look like `models/default_model.j2`. When an override
/// directory is configured, a file at `<dir>/<identifier>` wins over the
/// embedded template of the same name; unknown identifiers are only looked up
/// there. Undefined variables are errors, so a template that expects column
/// data fails loudly when given a minimal context.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Renderer over the embedded templates only
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Renderer that prefers files under `dir`
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self::build(Some(dir.into()))
    }

    fn build(overrides: Option<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("pascal_case", |value: String| to_camel_case(&value));
        env.add_filter("constant_case", constant_case);
        env.add_filter("py_str", py_str);
        env.set_loader(move |name| {
            if let Some(dir) = &overrides {
                if let Some(path) = map_template_path(dir, name) {
                    if path.is_file() {
                        debug!(template = name, path = %path.display(), "using template override");
                        return fs::read_to_string(&path).map(Some).map_err(|e| {
                            JinjaError::new(
                                ErrorKind::InvalidOperation,
                                format!("cannot read {}: {e}", path.display()),
                            )
                        });
                    }
                }
            }
            Ok(EMBEDDED_TEMPLATES
                .iter()
                .find(|(id, _)| *id == name)
                .map(|(_, source)| (*source).to_string()))
        });
        Self { env }
    }

    /// Render `template_id` with `ctx`
    ///
    /// # Errors
    ///
    /// [`ScaffoldError::Template`] if the template is missing, does not parse
    /// or fails while rendering.
    pub fn render(&self, template_id: &str, ctx: &RenderContext) -> Result<String, ScaffoldError> {
        let to_err = |e: JinjaError| ScaffoldError::Template {
            template: template_id.to_string(),
            reason: e.to_string(),
        };
        let tmpl = self.env.get_template(template_id).map_err(to_err)?;
        tmpl.render(ctx).map_err(to_err)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a template identifier below `base`, rejecting `..` and absolute parts
fn map_template_path(base: &Path, template_id: &str) -> Option<PathBuf> {
    let mut pb = base.to_path_buf();
    for comp in Path::new(template_id).components() {
        match comp {
            Component::Normal(s) => pb.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(pb)
}

/// `in-progress` → `IN_PROGRESS`, usable as a Python enum member
fn constant_case(value: String) -> String {
    let mut out: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Double-quoted Python string literal
fn py_str(value: String) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// One blueprint registration in `run.py`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintEntry {
    /// Controller module, e.g. `users_controller`
    pub module: String,
    /// Blueprint variable, e.g. `users_bp`
    pub name: String,
}

impl BlueprintEntry {
    /// Derive the entry from a controller file stem (`users_controller`)
    ///
    /// The blueprint name is lower-cased like the one the controller
    /// template declares.
    pub fn from_stem(stem: &str) -> Option<Self> {
        let table = stem.strip_suffix("_controller")?;
        if table.is_empty() {
            return None;
        }
        Some(Self {
            module: stem.to_string(),
            name: format!("{}_bp", table.to_lowercase()),
        })
    }
}

/// Template data for the project's `run.py`
#[derive(Template)]
#[template(path = "run.py.txt", escape = "none")]
pub struct RunPyTemplateData {
    /// Project name, shown in the module docstring
    pub project: String,
    /// Blueprints in registration order
    pub blueprints: Vec<BlueprintEntry>,
}

/// Template for `app/extensions.py` (the shared `db` handle)
#[derive(Template)]
#[template(path = "extensions.py.txt", escape = "none")]
pub struct ExtensionsPyTemplate;

/// Template data for `app/config.py`
#[derive(Template)]
#[template(path = "config.py.txt", escape = "none")]
pub struct ConfigPyTemplateData {
    /// SQLAlchemy URI without the password
    pub database_uri: String,
}

fn askama_err(template: &str) -> impl Fn(askama::Error) -> ScaffoldError + '_ {
    move |e| ScaffoldError::Template {
        template: template.to_string(),
        reason: e.to_string(),
    }
}

/// Write `content` to `path`, replacing any previous file
///
/// An existing file is deleted first and the content written fresh, so a
/// shorter render never leaves trailing bytes behind. Missing parent
/// directories are created.
///
/// # Errors
///
/// [`ScaffoldError::Filesystem`] naming the path that failed.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), ScaffoldError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| ScaffoldError::fs(path, e))?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ScaffoldError::fs(parent, e))?;
    }
    fs::write(path, content).map_err(|e| ScaffoldError::fs(path, e))
}

/// Write `run.py`, registering one blueprint per entry
pub fn write_run_py(
    path: &Path,
    project: &str,
    blueprints: Vec<BlueprintEntry>,
) -> Result<(), ScaffoldError> {
    let count = blueprints.len();
    let rendered = RunPyTemplateData {
        project: project.to_string(),
        blueprints,
    }
    .render()
    .map_err(askama_err("run.py.txt"))?;
    write_artifact(path, &rendered)?;
    info!(path = %path.display(), blueprints = count, "generated run.py");
    println!("✅ Generated run.py → {path:?}");
    Ok(())
}

/// Write `app/extensions.py`
pub fn write_extensions_py(path: &Path) -> Result<(), ScaffoldError> {
    let rendered = ExtensionsPyTemplate
        .render()
        .map_err(askama_err("extensions.py.txt"))?;
    write_artifact(path, &rendered)?;
    println!("✅ Generated extensions.py → {path:?}");
    Ok(())
}

/// Write `app/config.py`
pub fn write_config_py(path: &Path, database_uri: &str) -> Result<(), ScaffoldError> {
    let rendered = ConfigPyTemplateData {
        database_uri: database_uri.to_string(),
    }
    .render()
    .map_err(askama_err("config.py.txt"))?;
    write_artifact(path, &rendered)?;
    println!("✅ Generated config.py → {path:?}");
    Ok(())
}

/// Copy `model_mixins.py` into the models directory
pub fn write_model_mixins(path: &Path) -> Result<(), ScaffoldError> {
    write_artifact(path, MODEL_MIXINS_PY)?;
    println!("✅ Copied model_mixins.py → {path:?}");
    Ok(())
}
