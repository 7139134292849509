//! # pgscaffold
//!
//! **pgscaffold** introspects a PostgreSQL schema and scaffolds a Flask +
//! SQLAlchemy project from it: one model, controller, repository and service
//! per table, the registry `__init__.py` files that import them, and the
//! wiring files (`run.py`, `app/config.py`, `app/extensions.py`).
//!
//! ## Architecture
//!
//! - **[`catalog`]** - the [`catalog::Catalog`] trait, `TableSchema` and the PostgreSQL implementation
//! - **[`generator`]** - type mapping, render contexts, templates, registries and the per-table pipeline
//! - **[`config`]** - connection settings persisted per project (without the password)
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `pgscaffold` command line
//! - **[`error`]** - [`ScaffoldError`], split into skip-the-table and abort-the-run failures
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(pgscaffold)
//!     participant Cat as catalog::PgCatalog
//!     participant Gen as generator::project
//!     participant Tpl as generator::templates
//!     participant Reg as generator::registry
//!     participant FS as File System
//!
//!     CLI->>Cat: connect(&DbConfig)
//!     CLI->>Cat: list_tables()
//!     CLI->>Gen: generate_project(tables)
//!     Gen->>FS: app/ skeleton, config.py, extensions.py
//!     loop every table
//!         Gen->>Cat: columns / primary keys / foreign keys / enum labels
//!         Gen->>Tpl: render model, controller, repository, service
//!         Gen->>FS: write {table}_{kind}.py
//!         Gen->>Reg: update_registry(category, table)
//!     end
//!     Gen->>FS: run.py from app/controllers
//!     Gen-->>CLI: GenerationReport
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgscaffold::catalog::postgres::PgCatalog;
//! use pgscaffold::config::{DbConfig, DbOverrides};
//! use pgscaffold::generator::{generate_project, GenerationOptions, ProjectLayout, TemplateRenderer};
//!
//! let config = DbConfig::resolve(None, &overrides)?;
//! let catalog = PgCatalog::connect(&config)?;
//! let options = GenerationOptions::new(ProjectLayout::new("projects", "shop"), config.database_uri());
//! let report = generate_project(&catalog, &TemplateRenderer::new(), &["users".into()], &options)?;
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;

pub use error::ScaffoldError;
