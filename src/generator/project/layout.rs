use std::path::{Path, PathBuf};

use crate::generator::context::ArtifactKind;
use crate::generator::registry::registry_path;

/// Default directory holding all projects
pub const DEFAULT_PROJECTS_ROOT: &str = "projects";

/// File name of the persisted connection settings
pub const DB_CONFIG_FILE: &str = "db_config.toml";

/// Paths of one generated project
///
/// ```text
/// projects/{project}/
/// ├── db_config.toml
/// ├── run.py
/// └── app/
///     ├── config.py
///     ├── extensions.py
///     ├── models/         __init__.py, model_mixins.py, {table}_model.py
///     ├── controllers/    __init__.py, {table}_controller.py
///     ├── repositories/   __init__.py, {table}_repository.py
///     └── services/       __init__.py, {table}_service.py
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    name: String,
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout for `project` below `projects_root`
    pub fn new(projects_root: impl AsRef<Path>, project: &str) -> Self {
        Self {
            name: project.to_string(),
            root: projects_root.as_ref().join(project),
        }
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `projects/{project}`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `projects/{project}/app`
    pub fn app_dir(&self) -> PathBuf {
        self.root.join("app")
    }

    /// Directory of one artifact category
    pub fn category_dir(&self, kind: ArtifactKind) -> PathBuf {
        self.app_dir().join(kind.directory())
    }

    /// Generated file for (`kind`, `table`)
    pub fn artifact_path(&self, kind: ArtifactKind, table: &str) -> PathBuf {
        self.category_dir(kind).join(kind.file_name(table))
    }

    /// Registry file of one category
    pub fn registry_path(&self, kind: ArtifactKind) -> PathBuf {
        registry_path(&self.category_dir(kind))
    }

    pub fn run_py(&self) -> PathBuf {
        self.root.join("run.py")
    }

    pub fn config_py(&self) -> PathBuf {
        self.app_dir().join("config.py")
    }

    pub fn extensions_py(&self) -> PathBuf {
        self.app_dir().join("extensions.py")
    }

    pub fn model_mixins_py(&self) -> PathBuf {
        self.category_dir(ArtifactKind::Model).join("model_mixins.py")
    }

    pub fn db_config_path(&self) -> PathBuf {
        self.root.join(DB_CONFIG_FILE)
    }
}
