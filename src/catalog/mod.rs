//! # Catalog Module
//!
//! Read-only access to the relational store's system metadata and the
//! per-table [`TableSchema`] assembled from it.
//!
//! ## Overview
//!
//! The [`Catalog`] trait is the seam between the generator and the database.
//! It exposes the five metadata queries the generator needs:
//!
//! - table enumeration
//! - columns, ordered by physical position
//! - primary-key columns, ordered by key position
//! - foreign keys, ordered by key position
//! - the ordered labels of an enumerated type
//!
//! [`introspect_table`] runs the table-keyed queries and resolves every
//! `USER-DEFINED` column against its enum type. [`postgres::PgCatalog`] is
//! the PostgreSQL implementation; tests use in-memory fakes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgscaffold::catalog::{introspect_table, postgres::PgCatalog};
//!
//! let catalog = PgCatalog::connect(&db_config)?;
//! let schema = introspect_table(&catalog, "users")?;
//! println!("{} columns", schema.columns.len());
//! ```

pub mod postgres;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::ScaffoldError;
use crate::generator::enum_display_name;

/// `information_schema.columns.data_type` value for user-defined (enum) types
pub const USER_DEFINED: &str = "USER-DEFINED";

/// One column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Raw backend type string (`integer`, `character varying`, `USER-DEFINED`, ...)
    pub catalog_type: String,
    /// Underlying type name; for `USER-DEFINED` columns this is the enum type name
    pub udt_name: String,
    /// Schema that owns the underlying type
    pub udt_schema: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Raw default expression, if any
    pub default: Option<String>,
}

impl ColumnInfo {
    /// Whether the catalog reports this column as a user-defined type
    #[must_use]
    pub fn is_user_defined(&self) -> bool {
        self.catalog_type == USER_DEFINED
    }
}

/// Directed reference from a column of this table to another table's column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    /// Referencing column in this table
    pub source_column: String,
    /// Referenced table
    pub target_table: String,
    /// Referenced column
    pub target_column: String,
}

impl ForeignKeyRef {
    /// `"table.column"` reference string
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}.{}", self.target_table, self.target_column)
    }
}

/// An enumerated type used by one of the table's columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    /// Type name in the catalog (e.g. `user_status_enum`)
    pub catalog_enum_name: String,
    /// Identifier used in generated code (e.g. `User_status`)
    pub display_name: String,
    /// Permitted labels in catalog sort order
    pub values: Vec<String>,
}

impl EnumDef {
    /// Build an enum definition, deriving the display name from the catalog name
    #[must_use]
    pub fn new(catalog_enum_name: &str, values: Vec<String>) -> Self {
        Self {
            catalog_enum_name: catalog_enum_name.to_string(),
            display_name: enum_display_name(catalog_enum_name),
            values,
        }
    }
}

/// Everything the generator knows about one table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Columns in physical order
    pub columns: Vec<ColumnInfo>,
    /// Primary-key column names in key order
    pub primary_keys: Vec<String>,
    /// Foreign keys in key order
    pub foreign_keys: Vec<ForeignKeyRef>,
    /// Enum-typed column name → enum definition
    pub enums: BTreeMap<String, EnumDef>,
}

impl TableSchema {
    /// Whether `column` is part of the primary key
    #[must_use]
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk == column)
    }

    /// Foreign key whose source is `column`, if any
    #[must_use]
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKeyRef> {
        self.foreign_keys.iter().find(|fk| fk.source_column == column)
    }
}

/// Read-only metadata queries against a relational catalog.
///
/// Implementations must return rows in the documented order; the generator
/// relies on it for deterministic output. A query against an unknown table
/// may either fail with [`ScaffoldError::Introspection`] or return no rows.
pub trait Catalog {
    /// Base tables of the configured schema, sorted by name
    fn list_tables(&self) -> Result<Vec<String>, ScaffoldError>;

    /// Columns of `table` ordered by physical position
    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, ScaffoldError>;

    /// Primary-key column names of `table` ordered by key position
    fn primary_keys(&self, table: &str) -> Result<Vec<String>, ScaffoldError>;

    /// Foreign keys of `table` ordered by key position
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRef>, ScaffoldError>;

    /// Labels of the enumerated type `enum_schema.enum_type` in sort order.
    ///
    /// Returns an empty list when the type exists but is not an enum.
    fn enum_values(&self, enum_schema: &str, enum_type: &str)
        -> Result<Vec<String>, ScaffoldError>;
}

/// Introspect one table.
///
/// Runs the column, primary-key and foreign-key queries, then the enum query
/// once per distinct user-defined type referenced by the table. A table with
/// no columns is reported as [`ScaffoldError::Introspection`] so that no
/// artifacts are written for it.
///
/// # Errors
///
/// Propagates any catalog error unchanged.
pub fn introspect_table<C: Catalog + ?Sized>(
    catalog: &C,
    table: &str,
) -> Result<TableSchema, ScaffoldError> {
    let columns = catalog.columns(table)?;
    if columns.is_empty() {
        return Err(ScaffoldError::introspection(
            table,
            "table does not exist or has no columns",
        ));
    }

    let mut primary_keys: Vec<String> = Vec::new();
    for pk in catalog.primary_keys(table)? {
        if !primary_keys.contains(&pk) {
            primary_keys.push(pk);
        }
    }
    let foreign_keys = catalog.foreign_keys(table)?;

    // Keyed by (schema, type): equal type names in two schemas are distinct.
    let mut labels_by_type: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
    let mut enums = BTreeMap::new();
    for column in columns.iter().filter(|c| c.is_user_defined()) {
        let key = (column.udt_schema.as_str(), column.udt_name.as_str());
        let values = match labels_by_type.get(&key) {
            Some(values) => values.clone(),
            None => {
                let values = catalog.enum_values(key.0, key.1)?;
                labels_by_type.insert(key, values.clone());
                values
            }
        };
        if values.is_empty() {
            debug!(
                table,
                column = %column.name,
                udt = %column.udt_name,
                "user-defined type has no enum labels; treating as plain type"
            );
            continue;
        }
        enums.insert(column.name.clone(), EnumDef::new(&column.udt_name, values));
    }

    debug!(
        table,
        columns = columns.len(),
        primary_keys = primary_keys.len(),
        foreign_keys = foreign_keys.len(),
        enums = enums.len(),
        "introspected table"
    );

    Ok(TableSchema {
        name: table.to_string(),
        columns,
        primary_keys,
        foreign_keys,
        enums,
    })
}
