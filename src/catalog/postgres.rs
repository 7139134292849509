//! PostgreSQL implementation of [`Catalog`] over `tokio-postgres`.
//!
//! The generator is synchronous, so the catalog owns a current-thread Tokio
//! runtime and blocks on each query. The connection future is spawned onto
//! that runtime and only makes progress while a query is being awaited,
//! which is all a strictly sequential reader needs.

use tokio::runtime::{Builder, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};

use super::{Catalog, ColumnInfo, ForeignKeyRef};
use crate::config::DbConfig;
use crate::error::ScaffoldError;

// Every selected column is cast to text: information_schema uses domain types
// (sql_identifier, yes_or_no) that do not decode as String directly.

const LIST_TABLES_SQL: &str = "
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = $1::text AND table_type = 'BASE TABLE'
    ORDER BY table_name";

const COLUMNS_SQL: &str = "
    SELECT column_name::text, data_type::text, udt_name::text, udt_schema::text,
           (is_nullable = 'YES') AS nullable, column_default::text
    FROM information_schema.columns
    WHERE table_schema = $1::text AND table_name = $2::text
    ORDER BY ordinal_position";

const PRIMARY_KEYS_SQL: &str = "
    SELECT k.column_name::text
    FROM information_schema.table_constraints t
    JOIN information_schema.key_column_usage k
      USING (constraint_name, table_schema, table_name)
    WHERE t.constraint_type = 'PRIMARY KEY'
      AND t.table_schema = $1::text AND t.table_name = $2::text
    ORDER BY k.ordinal_position";

// conkey and confkey are parallel arrays: unnesting them together pairs each
// referencing column with its referenced column, also for composite keys.
const FOREIGN_KEYS_SQL: &str = "
    SELECT a.attname::text, ft.relname::text, fa.attname::text
    FROM pg_constraint c
    JOIN pg_class t ON t.oid = c.conrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_class ft ON ft.oid = c.confrelid
    CROSS JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(attnum, fattnum, pos)
    JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.attnum
    JOIN pg_attribute fa ON fa.attrelid = c.confrelid AND fa.attnum = k.fattnum
    WHERE c.contype = 'f'
      AND n.nspname = $1::text AND t.relname = $2::text
    ORDER BY k.pos, c.conname";

const ENUM_VALUES_SQL: &str = "
    SELECT e.enumlabel::text
    FROM pg_type t
    JOIN pg_namespace n ON n.oid = t.typnamespace
    JOIN pg_enum e ON e.enumtypid = t.oid
    WHERE n.nspname = $1::text AND t.typname = $2::text
    ORDER BY e.enumsortorder";

/// A live connection to one PostgreSQL database schema
pub struct PgCatalog {
    runtime: Runtime,
    client: Client,
    schema: String,
}

impl PgCatalog {
    /// Connect using `config`
    ///
    /// # Errors
    ///
    /// [`ScaffoldError::Connection`] if the runtime cannot start or the
    /// server rejects the connection.
    pub fn connect(config: &DbConfig) -> Result<Self, ScaffoldError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ScaffoldError::Connection(format!("cannot start runtime: {e}")))?;

        let pg_config = config.pg_config()?;
        let (client, connection) = runtime
            .block_on(pg_config.connect(NoTls))
            .map_err(|e| ScaffoldError::Connection(e.to_string()))?;

        runtime.spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        info!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            schema = %config.schema,
            "connected to catalog"
        );
        Ok(Self {
            runtime,
            client,
            schema: config.schema.clone(),
        })
    }

    /// Schema whose tables are introspected
    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn query(
        &self,
        table: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, ScaffoldError> {
        debug!(table, "catalog query");
        self.runtime
            .block_on(self.client.query(sql, params))
            .map_err(|e| self.classify(table, &e))
    }

    /// A closed client means the connection is gone; anything else is the query's fault
    fn classify(&self, table: &str, err: &tokio_postgres::Error) -> ScaffoldError {
        if self.client.is_closed() {
            ScaffoldError::Connection(err.to_string())
        } else {
            ScaffoldError::introspection(table, err.to_string())
        }
    }

    fn text(&self, table: &str, row: &Row, idx: usize) -> Result<String, ScaffoldError> {
        row.try_get::<_, String>(idx)
            .map_err(|e| ScaffoldError::introspection(table, e.to_string()))
    }
}

impl Catalog for PgCatalog {
    fn list_tables(&self) -> Result<Vec<String>, ScaffoldError> {
        let rows = self.query("*", LIST_TABLES_SQL, &[&self.schema])?;
        rows.iter().map(|row| self.text("*", row, 0)).collect()
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, ScaffoldError> {
        let rows = self.query(table, COLUMNS_SQL, &[&self.schema, &table])?;
        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: self.text(table, row, 0)?,
                    catalog_type: self.text(table, row, 1)?,
                    udt_name: self.text(table, row, 2)?,
                    udt_schema: self.text(table, row, 3)?,
                    nullable: row
                        .try_get::<_, bool>(4)
                        .map_err(|e| ScaffoldError::introspection(table, e.to_string()))?,
                    default: row
                        .try_get::<_, Option<String>>(5)
                        .map_err(|e| ScaffoldError::introspection(table, e.to_string()))?,
                })
            })
            .collect()
    }

    fn primary_keys(&self, table: &str) -> Result<Vec<String>, ScaffoldError> {
        let rows = self.query(table, PRIMARY_KEYS_SQL, &[&self.schema, &table])?;
        rows.iter().map(|row| self.text(table, row, 0)).collect()
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRef>, ScaffoldError> {
        let rows = self.query(table, FOREIGN_KEYS_SQL, &[&self.schema, &table])?;
        rows.iter()
            .map(|row| {
                Ok(ForeignKeyRef {
                    source_column: self.text(table, row, 0)?,
                    target_table: self.text(table, row, 1)?,
                    target_column: self.text(table, row, 2)?,
                })
            })
            .collect()
    }

    fn enum_values(
        &self,
        enum_schema: &str,
        enum_type: &str,
    ) -> Result<Vec<String>, ScaffoldError> {
        let rows = self.query(enum_type, ENUM_VALUES_SQL, &[&enum_schema, &enum_type])?;
        rows.iter().map(|row| self.text(enum_type, row, 0)).collect()
    }
}
