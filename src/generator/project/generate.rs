use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use super::layout::ProjectLayout;
use crate::catalog::{introspect_table, Catalog};
use crate::error::ScaffoldError;
use crate::generator::context::{build_context, ArtifactKind};
use crate::generator::registry::{update_registry, ImportPattern, RegistryUpdate};
use crate::generator::templates::{
    write_artifact, write_config_py, write_extensions_py, write_model_mixins, write_run_py,
    BlueprintEntry, TemplateRenderer, DEFAULT_TEMPLATE_TYPE,
};

/// Which artifact categories to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationScope {
    /// Generate `app/models/*_model.py`
    pub models: bool,
    /// Generate `app/controllers/*_controller.py`
    pub controllers: bool,
    /// Generate `app/repositories/*_repository.py`
    pub repositories: bool,
    /// Generate `app/services/*_service.py`
    pub services: bool,
}

impl GenerationScope {
    /// Every category
    pub fn all() -> Self {
        Self {
            models: true,
            controllers: true,
            repositories: true,
            services: true,
        }
    }

    /// No category; combine with field updates to build a selection
    pub fn none() -> Self {
        Self {
            models: false,
            controllers: false,
            repositories: false,
            services: false,
        }
    }

    /// Whether `kind` is selected
    pub fn includes(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Model => self.models,
            ArtifactKind::Controller => self.controllers,
            ArtifactKind::Repository => self.repositories,
            ArtifactKind::Service => self.services,
        }
    }

    /// Selected kinds in generation order
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|k| self.includes(*k))
            .collect()
    }
}

impl Default for GenerationScope {
    fn default() -> Self {
        Self::all()
    }
}

/// Inputs of one generation run that are not tied to a table
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Where the project's files go
    pub layout: ProjectLayout,
    /// Template type, e.g. `default` → `models/default_model.j2`
    pub template_type: String,
    /// Categories to generate
    pub scope: GenerationScope,
    /// Written into `app/config.py`; never contains the password
    pub database_uri: String,
}

impl GenerationOptions {
    /// Default template type and every category
    pub fn new(layout: ProjectLayout, database_uri: impl Into<String>) -> Self {
        Self {
            layout,
            template_type: DEFAULT_TEMPLATE_TYPE.to_string(),
            scope: GenerationScope::all(),
            database_uri: database_uri.into(),
        }
    }
}

/// Files written for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    /// Table name as listed by the catalog
    pub table: String,
    /// Artifact files written, in generation order
    pub files: Vec<PathBuf>,
    /// Registry result per generated category
    pub registries: Vec<(ArtifactKind, RegistryUpdate)>,
}

/// A table that produced no files, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    /// Table name as requested
    pub table: String,
    /// Display form of the error that skipped it
    pub reason: String,
}

/// Result of [`generate_project`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Tables whose artifacts were written, in processing order
    pub generated: Vec<TableOutcome>,
    /// Tables skipped after an introspection or template failure
    pub skipped: Vec<SkippedTable>,
    /// Controller modules registered in `run.py`
    pub blueprints: Vec<String>,
}

impl GenerationReport {
    /// Total number of artifact files written
    pub fn file_count(&self) -> usize {
        self.generated.iter().map(|t| t.files.len()).sum()
    }
}

/// Split `requested` into tables present in the catalog and unknown names
///
/// An empty request selects every table the catalog lists.
pub fn select_tables<C: Catalog + ?Sized>(
    catalog: &C,
    requested: &[String],
) -> Result<(Vec<String>, Vec<String>), ScaffoldError> {
    let available = catalog.list_tables()?;
    if requested.is_empty() {
        return Ok((available, Vec::new()));
    }
    let known: BTreeSet<&str> = available.iter().map(String::as_str).collect();
    let mut selected = Vec::new();
    let mut unknown = Vec::new();
    let mut seen = BTreeSet::new();
    for table in requested {
        if !seen.insert(table.as_str()) {
            continue;
        }
        if known.contains(table.as_str()) {
            selected.push(table.clone());
        } else {
            unknown.push(table.clone());
        }
    }
    Ok((selected, unknown))
}

/// Create the project skeleton and its fixed files
///
/// Creates the four category directories, copies `model_mixins.py` and
/// (re)writes `app/config.py` and `app/extensions.py`.
pub fn setup_project(layout: &ProjectLayout, database_uri: &str) -> Result<(), ScaffoldError> {
    for kind in ArtifactKind::ALL {
        let dir = layout.category_dir(kind);
        fs::create_dir_all(&dir).map_err(|e| ScaffoldError::fs(&dir, e))?;
    }
    write_model_mixins(&layout.model_mixins_py())?;
    write_config_py(&layout.config_py(), database_uri)?;
    write_extensions_py(&layout.extensions_py())?;
    info!(project = layout.name(), root = %layout.root().display(), "project structure ready");
    Ok(())
}

/// Generate every selected artifact for one table
///
/// All artifacts are rendered before the first write, so a template failure
/// leaves nothing behind for this table. Write and registry failures
/// propagate as [`ScaffoldError::Filesystem`].
pub fn generate_table<C: Catalog + ?Sized>(
    catalog: &C,
    renderer: &TemplateRenderer,
    table: &str,
    options: &GenerationOptions,
) -> Result<TableOutcome, ScaffoldError> {
    let schema = introspect_table(catalog, table)?;

    let mut rendered = Vec::new();
    for kind in options.scope.kinds() {
        let ctx = build_context(&schema, kind);
        let content = renderer.render(&kind.template_id(&options.template_type), &ctx)?;
        rendered.push((kind, content));
    }

    let mut outcome = TableOutcome {
        table: table.to_string(),
        files: Vec::new(),
        registries: Vec::new(),
    };
    for (kind, content) in &rendered {
        let path = options.layout.artifact_path(*kind, table);
        write_artifact(&path, content)?;
        info!(table, kind = kind.suffix(), path = %path.display(), "artifact written");
        println!("✅ Generated {} → {path:?}", kind.suffix());
        outcome.files.push(path);
    }
    for (kind, _) in &rendered {
        let pattern = ImportPattern::new(kind.import_pattern())?;
        let update = update_registry(&options.layout.category_dir(*kind), table, &pattern)?;
        outcome.registries.push((*kind, update));
    }
    Ok(outcome)
}

/// Collect blueprints from `*_controller.py` files, sorted by module name
pub fn collect_blueprints(layout: &ProjectLayout) -> Result<Vec<BlueprintEntry>, ScaffoldError> {
    let dir = layout.category_dir(ArtifactKind::Controller);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut by_module = BTreeMap::new();
    for entry in fs::read_dir(&dir).map_err(|e| ScaffoldError::fs(&dir, e))? {
        let path = entry.map_err(|e| ScaffoldError::fs(&dir, e))?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("py") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(bp) = BlueprintEntry::from_stem(stem) {
            by_module.insert(bp.module.clone(), bp);
        }
    }
    Ok(by_module.into_values().collect())
}

/// Rebuild `run.py` from the controllers currently on disk
pub fn write_run_entry(layout: &ProjectLayout) -> Result<Vec<String>, ScaffoldError> {
    let blueprints = collect_blueprints(layout)?;
    let modules = blueprints.iter().map(|b| b.module.clone()).collect();
    write_run_py(&layout.run_py(), layout.name(), blueprints)?;
    Ok(modules)
}

/// Run the whole pipeline for `tables`
///
/// Sets up the project, generates each table in order and rebuilds `run.py`.
/// Introspection and template failures skip the table and are listed in the
/// report; connection and filesystem failures abort the run.
///
/// # Example
///
/// ```rust,ignore
/// let layout = ProjectLayout::new("projects", "shop");
/// let options = GenerationOptions::new(layout, config.database_uri());
/// let report = generate_project(&catalog, &TemplateRenderer::new(), &tables, &options)?;
/// println!("{} files", report.file_count());
/// ```
pub fn generate_project<C: Catalog + ?Sized>(
    catalog: &C,
    renderer: &TemplateRenderer,
    tables: &[String],
    options: &GenerationOptions,
) -> Result<GenerationReport, ScaffoldError> {
    setup_project(&options.layout, &options.database_uri)?;

    let mut report = GenerationReport::default();
    for table in tables {
        match generate_table(catalog, renderer, table, options) {
            Ok(outcome) => report.generated.push(outcome),
            Err(err) if err.is_table_scoped() => {
                warn!(table = %table, error = %err, "skipping table");
                println!("⚠️  Skipping table '{table}': {err}");
                report.skipped.push(SkippedTable {
                    table: table.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    report.blueprints = write_run_entry(&options.layout)?;
    info!(
        project = options.layout.name(),
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        files = report.file_count(),
        "generation finished"
    );
    Ok(report)
}
