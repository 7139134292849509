//! # CLI Module
//!
//! Command-line interface of the `pgscaffold` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Scaffold a project from every table of a schema, or from selected tables:
//!
//! ```bash
//! pgscaffold generate --project shop --user app --dbname shop
//! pgscaffold generate --project shop --table users --table orders --only models,repositories
//! ```
//!
//! Options:
//! - `--project <NAME>` - Project name (required)
//! - `--table <TABLE>` - Table to generate, repeatable (default: all)
//! - `--only <PARTS>` - models, controllers, repositories, services
//! - `--template <TYPE>` - Template type (default: `default`)
//! - `--templates-dir <DIR>` - Replacement templates
//! - `--projects-root <DIR>` - Where projects live (default: `projects`)
//!
//! ### `tables`
//!
//! List the tables of the configured schema.
//!
//! ### `check`
//!
//! Connect once and save the working settings to `db_config.toml`.
//!
//! ## Connection settings
//!
//! `--host`, `--port`, `--user`, `--password`, `--dbname` and `--schema`
//! fall back to `PGSCAFFOLD_DB_HOST`, `_PORT`, `_USER`, `_PASSWORD`, `_NAME`
//! and `_SCHEMA`, then to the project's saved settings. The password is
//! never saved.

mod commands;


pub use commands::{run, run_cli, Cli, Commands, DbArgs, OnlyPart, ProjectArgs};
