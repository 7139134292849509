mod generate;
mod layout;

pub use generate::{
    collect_blueprints, generate_project, generate_table, select_tables, setup_project,
    write_run_entry, GenerationOptions, GenerationReport, GenerationScope, SkippedTable,
    TableOutcome,
};
pub use layout::{ProjectLayout, DB_CONFIG_FILE, DEFAULT_PROJECTS_ROOT};
