//! # Generator Module
//!
//! Turns introspected tables into a Flask/SQLAlchemy project skeleton.
//!
//! ## Overview
//!
//! For every selected table the generator emits four artifacts:
//! - **Model** - SQLAlchemy class with typed columns, keys and enums
//! - **Controller** - Flask blueprint exposing CRUD routes
//! - **Repository** - data access around the model
//! - **Service** - thin layer the controller talks to
//!
//! ## Architecture
//!
//! ```text
//! Catalog → TableSchema → RenderContext → Template Rendering → Files + Registries
//! ```
//!
//! 1. **Introspection** - [`crate::catalog::introspect_table`] builds a `TableSchema`
//! 2. **Context** - [`build_context`] flattens it per artifact kind
//! 3. **Rendering** - [`TemplateRenderer`] renders `{category}/{type}_{kind}.j2`
//! 4. **Writing** - [`write_artifact`] replaces the target file
//! 5. **Registries** - [`update_registry`] keeps each `__init__.py` in sync
//!
//! After the tables, `run.py` is rebuilt from the controllers on disk.
//!
//! ## Generated Structure
//!
//! ```text
//! projects/shop/
//! ├── run.py                  # Flask app factory, one blueprint per controller
//! └── app/
//!     ├── config.py           # SQLAlchemy URI (DATABASE_URL overrides)
//!     ├── extensions.py       # db = SQLAlchemy()
//!     ├── models/
//!     │   ├── __init__.py
//!     │   ├── model_mixins.py
//!     │   └── *_model.py
//!     ├── controllers/
//!     ├── repositories/
//!     └── services/
//! ```
//!
//! ## Template Customization
//!
//! Per-table templates are embedded from `templates/{models,controllers,repositories,services}/`.
//! A directory passed to [`TemplateRenderer::with_overrides`] may replace any of
//! them or add new template types (`models/slim_model.j2` selected with
//! template type `slim`). `run.py`, `config.py` and `extensions.py` are fixed
//! Askama templates.

mod context;
mod project;
mod registry;
mod schema;
mod templates;

pub use context::*;
pub use project::*;
pub use registry::*;
pub use schema::*;
pub use templates::*;
