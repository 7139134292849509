use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::catalog::postgres::PgCatalog;
use crate::catalog::Catalog;
use crate::config::{load_db_config, save_db_config, DbConfig, DbOverrides};
use crate::generator::{
    generate_project, select_tables, GenerationOptions, GenerationScope, ProjectLayout,
    TemplateRenderer, DEFAULT_PROJECTS_ROOT, DEFAULT_TEMPLATE_TYPE,
};

/// Command-line interface for pgscaffold
///
/// Introspects a PostgreSQL schema and scaffolds a Flask/SQLAlchemy project.
#[derive(Parser, Debug)]
#[command(name = "pgscaffold")]
#[command(about = "Scaffold a Flask/SQLAlchemy project from a PostgreSQL schema", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Project selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project name; files go to {projects-root}/{project}
    #[arg(short, long, value_parser = parse_project_name)]
    pub project: String,

    /// Directory holding all projects
    #[arg(long, default_value = DEFAULT_PROJECTS_ROOT)]
    pub projects_root: PathBuf,
}

/// Connection flags; unset flags fall back to the environment, then to the
/// project's saved db_config.toml
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// Database host
    #[arg(long, env = "PGSCAFFOLD_DB_HOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, env = "PGSCAFFOLD_DB_PORT")]
    pub port: Option<u16>,

    /// Database user
    #[arg(short = 'U', long = "user", env = "PGSCAFFOLD_DB_USER")]
    pub username: Option<String>,

    /// Database password (never saved)
    #[arg(long, env = "PGSCAFFOLD_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(short = 'd', long, env = "PGSCAFFOLD_DB_NAME")]
    pub dbname: Option<String>,

    /// Schema to introspect (default: public)
    #[arg(long, env = "PGSCAFFOLD_DB_SCHEMA")]
    pub schema: Option<String>,
}

impl DbArgs {
    fn overrides(&self) -> DbOverrides {
        DbOverrides {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            dbname: self.dbname.clone(),
            schema: self.schema.clone(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate models, controllers, repositories and services for tables
    Generate {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        db: DbArgs,

        /// Table to generate (repeatable); default: every table in the schema
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// Limit generation to specific categories (comma-separated or repeated)
        #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
        only: Option<Vec<OnlyPart>>,

        /// Template type, e.g. `default` → models/default_model.j2
        #[arg(long, default_value = DEFAULT_TEMPLATE_TYPE)]
        template: String,

        /// Directory whose files replace the embedded templates
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },
    /// List the tables of the configured schema
    Tables {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        db: DbArgs,
    },
    /// Check the connection and save the project's database settings
    Check {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        db: DbArgs,
    },
}

/// Artifact categories selectable with `--only`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnlyPart {
    /// SQLAlchemy models
    Models,
    /// Flask blueprints
    Controllers,
    /// Data-access classes
    Repositories,
    /// Service classes
    Services,
}

fn parse_project_name(s: &str) -> Result<String, String> {
    let valid = !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!(
            "invalid project name '{s}': use letters, digits, '_', '-' or '.'"
        ))
    }
}

/// Parse the process arguments and execute the command
///
/// # Errors
///
/// Returns an error if the configuration is incomplete, the database cannot
/// be reached or a generated file cannot be written.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Execute an already parsed command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            project,
            db,
            tables,
            only,
            template,
            templates_dir,
        } => {
            let (layout, config, catalog) = connect(&project, &db)?;
            let (selected, unknown) = select_tables(&catalog, &tables)?;
            for table in &unknown {
                warn!(table = %table, "table does not exist in the database");
                println!("⚠️  Table '{table}' does not exist in the database; ignoring");
            }
            if selected.is_empty() {
                println!("ℹ️  No tables to generate");
            }

            let renderer = match &templates_dir {
                Some(dir) => TemplateRenderer::with_overrides(dir.clone()),
                None => TemplateRenderer::new(),
            };
            let mut options = GenerationOptions::new(layout, config.database_uri());
            options.template_type = template;
            options.scope = map_only_to_scope(only.as_deref());

            let report = generate_project(&catalog, &renderer, &selected, &options)
                .context("Project generation failed")?;

            println!(
                "📦 Project '{}': {} table(s) generated ({} files), {} skipped, {} blueprint(s) in run.py",
                options.layout.name(),
                report.generated.len(),
                report.file_count(),
                report.skipped.len(),
                report.blueprints.len()
            );
            for skipped in &report.skipped {
                println!("   ⚠️  {}: {}", skipped.table, skipped.reason);
            }
            Ok(())
        }
        Commands::Tables { project, db } => {
            let (_, config, catalog) = connect(&project, &db)?;
            let tables = catalog.list_tables()?;
            println!("📋 {} table(s) in schema '{}':", tables.len(), config.schema);
            for table in tables {
                println!("  - {table}");
            }
            Ok(())
        }
        Commands::Check { project, db } => {
            let (layout, config, _) = connect(&project, &db)?;
            println!(
                "✅ Connected to {} as {}; settings saved to {:?}",
                config.database_uri(),
                config.username,
                layout.db_config_path()
            );
            Ok(())
        }
    }
}

/// Resolve settings, connect, and persist the settings that worked
fn connect(
    project: &ProjectArgs,
    db: &DbArgs,
) -> anyhow::Result<(ProjectLayout, DbConfig, PgCatalog)> {
    let layout = ProjectLayout::new(&project.projects_root, &project.project);
    let config_path = layout.db_config_path();
    let persisted = load_db_config(&config_path)?;
    if persisted.is_some() {
        info!(path = %config_path.display(), "using saved database configuration");
    }
    let config = DbConfig::resolve(persisted, &db.overrides())?;
    let catalog = PgCatalog::connect(&config)
        .with_context(|| format!("Failed to connect to {}", config.database_uri()))?;
    save_db_config(&config_path, &config)?;
    Ok((layout, config, catalog))
}

/// Map `--only` selections to a [`GenerationScope`]; `None` means everything
pub(crate) fn map_only_to_scope(only: Option<&[OnlyPart]>) -> GenerationScope {
    let Some(parts) = only else {
        return GenerationScope::all();
    };
    let mut scope = GenerationScope::none();
    for p in parts {
        match p {
            OnlyPart::Models => scope.models = true,
            OnlyPart::Controllers => scope.controllers = true,
            OnlyPart::Repositories => scope.repositories = true,
            OnlyPart::Services => scope.services = true,
        }
    }
    scope
}

