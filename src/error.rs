//! Error taxonomy for the scaffolding pipeline.
//!
//! The variants encode how far a failure reaches:
//!
//! - [`ScaffoldError::Introspection`] and [`ScaffoldError::Template`] only
//!   affect the table being processed; the orchestrator records the table as
//!   skipped and moves on.
//! - [`ScaffoldError::Connection`], [`ScaffoldError::Filesystem`] and
//!   [`ScaffoldError::Config`] abort the whole run.

use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while introspecting, rendering or writing a project
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    /// The catalog cannot be reached (connect failure or a dropped connection)
    #[error("cannot reach the catalog: {0}")]
    Connection(String),

    /// A metadata query for a specific table was rejected or returned nothing usable
    #[error("introspection of table '{table}' failed: {reason}")]
    Introspection {
        /// Table being introspected
        table: String,
        /// Backend message or local reason
        reason: String,
    },

    /// The template renderer failed for one artifact
    #[error("template '{template}' failed to render: {reason}")]
    Template {
        /// Template identifier, e.g. `models/default_model.j2`
        template: String,
        /// Renderer message
        reason: String,
    },

    /// Writing an artifact or a registry file failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Invalid or incomplete configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScaffoldError {
    /// Build a [`ScaffoldError::Filesystem`] for `path`
    pub fn fs(path: impl AsRef<Path>, source: io::Error) -> Self {
        ScaffoldError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`ScaffoldError::Introspection`] for `table`
    pub fn introspection(table: &str, reason: impl Into<String>) -> Self {
        ScaffoldError::Introspection {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the failure is confined to a single table.
    ///
    /// Table-scoped failures skip the table; everything else aborts the run.
    #[must_use]
    pub fn is_table_scoped(&self) -> bool {
        matches!(
            self,
            ScaffoldError::Introspection { .. } | ScaffoldError::Template { .. }
        )
    }
}
