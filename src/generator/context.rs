use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::schema::{map_column_type, to_camel_case};
use crate::catalog::{EnumDef, TableSchema};

/// Template variables for one (table, artifact kind) pair
///
/// Ordered map so that two contexts built from the same schema serialize
/// identically.
pub type RenderContext = BTreeMap<String, Value>;

/// The four per-table artifact categories
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// SQLAlchemy model class
    Model,
    /// Flask blueprint with CRUD routes
    Controller,
    /// Data-access class around the model
    Repository,
    /// Business layer between controller and repository
    Service,
}

impl ArtifactKind {
    /// All kinds in generation order
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Model,
        ArtifactKind::Controller,
        ArtifactKind::Repository,
        ArtifactKind::Service,
    ];

    /// File-name suffix (`users_model.py`)
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Controller => "controller",
            ArtifactKind::Repository => "repository",
            ArtifactKind::Service => "service",
        }
    }

    /// Directory under `app/` and under the template root
    pub fn directory(self) -> &'static str {
        match self {
            ArtifactKind::Model => "models",
            ArtifactKind::Controller => "controllers",
            ArtifactKind::Repository => "repositories",
            ArtifactKind::Service => "services",
        }
    }

    /// Registry import line with `{name}` and `{display}` placeholders
    pub fn import_pattern(self) -> &'static str {
        match self {
            ArtifactKind::Model => "from .{name}_model import {display}",
            ArtifactKind::Controller => "from .{name}_controller import {name}_bp",
            ArtifactKind::Repository => "from .{name}_repository import {display}Repository",
            ArtifactKind::Service => "from .{name}_service import {display}Service",
        }
    }

    /// Template identifier, e.g. `models/default_model.j2`
    pub fn template_id(self, template_type: &str) -> String {
        format!(
            "{}/{}_{}.j2",
            self.directory(),
            template_type,
            self.suffix()
        )
    }

    /// Generated file name for `table`, e.g. `users_model.py`
    ///
    /// Always lower-case so it matches the registry import and the
    /// `table_name_lower` references in sibling templates.
    pub fn file_name(self, table: &str) -> String {
        format!("{}_{}.py", table.to_lowercase(), self.suffix())
    }
}

/// Build the render context for `kind`
///
/// Only models see column-level detail. Controllers, repositories and
/// services get `table_name` and `table_name_lower` and nothing else.
pub fn build_context(schema: &TableSchema, kind: ArtifactKind) -> RenderContext {
    let lower = schema.name.to_lowercase();
    let mut ctx = RenderContext::new();
    ctx.insert("table_name".into(), json!(schema.name));
    ctx.insert("table_name_lower".into(), json!(lower));
    if kind != ArtifactKind::Model {
        return ctx;
    }

    let columns: Vec<Value> = schema
        .columns
        .iter()
        .map(|col| {
            json!({
                "name": col.name,
                "catalog_type": col.catalog_type,
                "nullable": col.nullable,
                "default": col.default,
                "type_expr": map_column_type(&col.name, &col.catalog_type, &schema.enums),
                "primary_key": schema.is_primary_key(&col.name),
                "foreign_key": schema.foreign_key_for(&col.name).map(|fk| fk.reference()),
            })
        })
        .collect();

    let foreign_keys: Vec<Value> = schema
        .foreign_keys
        .iter()
        .map(|fk| {
            json!({
                "source_column": fk.source_column,
                "target_table": fk.target_table,
                "target_column": fk.target_column,
                "reference": fk.reference(),
            })
        })
        .collect();

    // Several columns may share one enum type; declare each type once.
    let mut enum_types: BTreeMap<&str, &EnumDef> = BTreeMap::new();
    for def in schema.enums.values() {
        enum_types.entry(def.display_name.as_str()).or_insert(def);
    }

    ctx.insert("class_name".into(), json!(to_camel_case(&lower)));
    ctx.insert("columns".into(), Value::Array(columns));
    ctx.insert("primary_keys".into(), json!(schema.primary_keys));
    ctx.insert("foreign_keys".into(), Value::Array(foreign_keys));
    ctx.insert("enums".into(), json!(schema.enums));
    ctx.insert(
        "enum_types".into(),
        json!(enum_types.values().collect::<Vec<_>>()),
    );
    ctx.insert("repr_fields".into(), json!(repr_fields(schema)));
    ctx
}

/// `id={self.id}, name={self.name}` for the model's `__repr__`
fn repr_fields(schema: &TableSchema) -> String {
    schema
        .columns
        .iter()
        .map(|c| format!("{0}={{self.{0}}}", c.name))
        .collect::<Vec<_>>()
        .join(", ")
}
