#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh, empty directory with a name unique to this process and call
    pub fn temp_dir(prefix: &str) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "{}_{}_{}_{}",
            prefix,
            std::process::id(),
            counter,
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

pub mod catalog {
    use pgscaffold::catalog::{Catalog, ColumnInfo, ForeignKeyRef, USER_DEFINED};
    use pgscaffold::ScaffoldError;
    use std::collections::BTreeMap;

    /// One table held by [`MockCatalog`]
    #[derive(Debug, Clone, Default)]
    pub struct MockTable {
        pub columns: Vec<ColumnInfo>,
        pub primary_keys: Vec<String>,
        pub foreign_keys: Vec<ForeignKeyRef>,
    }

    /// In-memory catalog
    ///
    /// Tables listed in `rejected` fail every query with an introspection
    /// error, as a backend does for a table dropped mid-run. When
    /// `disconnected` is set every query fails with a connection error.
    #[derive(Debug, Clone, Default)]
    pub struct MockCatalog {
        pub tables: BTreeMap<String, MockTable>,
        /// `schema.type` → labels
        pub enums: BTreeMap<String, Vec<String>>,
        pub rejected: Vec<String>,
        pub disconnected: bool,
    }

    pub fn column(name: &str, catalog_type: &str, udt: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            catalog_type: catalog_type.into(),
            udt_name: udt.into(),
            udt_schema: "public".into(),
            nullable,
            default: None,
        }
    }

    impl MockCatalog {
        /// `users(id integer, status user_status_enum, name character varying)`
        /// with primary key `id` and `user_status_enum = {active, inactive}`
        pub fn users() -> Self {
            let mut catalog = MockCatalog::default();
            catalog.tables.insert(
                "users".into(),
                MockTable {
                    columns: vec![
                        column("id", "integer", "int4", false),
                        column("status", USER_DEFINED, "user_status_enum", false),
                        column("name", "character varying", "varchar", true),
                    ],
                    primary_keys: vec!["id".into()],
                    foreign_keys: vec![],
                },
            );
            catalog.enums.insert(
                "public.user_status_enum".into(),
                vec!["active".into(), "inactive".into()],
            );
            catalog
        }

        /// `users` plus `orders(id, user_id → users.id, total numeric)`
        pub fn shop() -> Self {
            let mut catalog = Self::users();
            catalog.tables.insert(
                "orders".into(),
                MockTable {
                    columns: vec![
                        column("id", "bigint", "int8", false),
                        column("user_id", "integer", "int4", false),
                        column("total", "numeric", "numeric", true),
                    ],
                    primary_keys: vec!["id".into()],
                    foreign_keys: vec![ForeignKeyRef {
                        source_column: "user_id".into(),
                        target_table: "users".into(),
                        target_column: "id".into(),
                    }],
                },
            );
            catalog
        }

        fn check(&self, table: &str) -> Result<(), ScaffoldError> {
            if self.disconnected {
                return Err(ScaffoldError::Connection("connection closed".into()));
            }
            if self.rejected.iter().any(|t| t == table) {
                return Err(ScaffoldError::introspection(table, "permission denied"));
            }
            Ok(())
        }
    }

    impl Catalog for MockCatalog {
        fn list_tables(&self) -> Result<Vec<String>, ScaffoldError> {
            self.check("*")?;
            Ok(self.tables.keys().cloned().collect())
        }

        fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, ScaffoldError> {
            self.check(table)?;
            Ok(self
                .tables
                .get(table)
                .map(|t| t.columns.clone())
                .unwrap_or_default())
        }

        fn primary_keys(&self, table: &str) -> Result<Vec<String>, ScaffoldError> {
            self.check(table)?;
            Ok(self
                .tables
                .get(table)
                .map(|t| t.primary_keys.clone())
                .unwrap_or_default())
        }

        fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRef>, ScaffoldError> {
            self.check(table)?;
            Ok(self
                .tables
                .get(table)
                .map(|t| t.foreign_keys.clone())
                .unwrap_or_default())
        }

        fn enum_values(
            &self,
            enum_schema: &str,
            enum_type: &str,
        ) -> Result<Vec<String>, ScaffoldError> {
            self.check(enum_type)?;
            Ok(self
                .enums
                .get(&format!("{enum_schema}.{enum_type}"))
                .cloned()
                .unwrap_or_default())
        }
    }
}
