//! Database introspection
//!
//! This module provides functionality for reading table and column
//! information from databases. Each supported database has its own
//! feature-gated submodule.

use tracing::{debug, info, trace};

use crate::prelude::{Column, PgJuliaError, Schema, Table};

/// Filters to apply during introspection
#[derive(Debug, Default, Clone)]
pub struct TableFilter {
    /// Only include these tables (if Some)
    pub include: Option<Vec<String>>,
    /// Exclude these tables
    pub exclude: Option<Vec<String>>,
}

impl TableFilter {
    /// Check if a table should be included
    pub fn should_include(&self, table_name: &str) -> bool {
        // Check include list
        if let Some(include) = &self.include {
            if !include.iter().any(|t| t == table_name) {
                return false;
            }
        }

        // Check exclude list
        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|t| t == table_name) {
                return false;
            }
        }

        true
    }

    pub fn is_active(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }
}

/// Trait for database introspection implementations
pub trait Introspector {
    /// List the table names of a schema, in the order the database returns them
    fn table_names(&mut self, schema_name: &str) -> Result<Vec<String>, PgJuliaError>;

    /// List the columns of one table in declaration order
    fn columns(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<Column>, PgJuliaError>;

    /// Primary key column names of one table, in key order
    fn primary_key(
        &mut self,
        _schema_name: &str,
        _table_name: &str,
    ) -> Result<Vec<String>, PgJuliaError> {
        Ok(Vec::new())
    }

    /// Read every table of a schema that passes `filter`.
    ///
    /// The first failing query aborts the whole pass. Tables keep the order
    /// returned by [`Introspector::table_names`].
    fn introspect(
        &mut self,
        schema_name: &str,
        filter: &TableFilter,
    ) -> Result<Schema, PgJuliaError> {
        info!(schema = ?schema_name, "Starting schema introspection");

        let all_table_names = self.table_names(schema_name)?;
        debug!(count = ?all_table_names.len(), "Found all tables");

        let table_names: Vec<String> = all_table_names
            .into_iter()
            .filter(|name| filter.should_include(name))
            .collect();
        debug!(count = ?table_names.len(), "Tables after filtering");

        let mut schema = Schema::new(schema_name);
        for table_name in table_names {
            debug!(table = ?table_name, "Introspecting table");

            let columns = self.columns(schema_name, &table_name)?;
            trace!(table = ?table_name, columns = ?columns.len(), "Found columns");

            let primary_key = self.primary_key(schema_name, &table_name)?;
            trace!(table = ?table_name, primary_key = ?primary_key, "Found primary key");

            schema.push_table(Table {
                name: table_name,
                columns,
                primary_key,
            })?;
        }

        info!(
            schema = ?schema_name,
            tables = ?schema.len(),
            "Schema introspection complete"
        );

        Ok(schema)
    }
}

// Feature-gated database implementations
#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresIntrospector;


#[cfg(test)]
mod tests {
    use super::testing::{table, FakeIntrospector};
    use super::*;

    #[test]
    fn test_filter_default_includes_everything() {
        let filter = TableFilter::default();
        assert!(filter.should_include("users"));
        assert!(!filter.is_active());
    }

    #[test]
    fn test_filter_include_and_exclude() {
        let filter = TableFilter {
            include: Some(vec!["users".to_string(), "orders".to_string()]),
            exclude: Some(vec!["orders".to_string()]),
        };
        assert!(filter.should_include("users"));
        assert!(!filter.should_include("orders"));
        assert!(!filter.should_include("payments"));
        assert!(filter.is_active());
    }

    #[test]
    fn test_introspect_preserves_table_and_column_order() {
        let mut reader = FakeIntrospector::new(vec![
            table("users", &[("id", "int"), ("name", "string"), ("age", "int64")]),
            table("orders", &[("id", "int64"), ("total", "float64")]),
        ]);

        let schema = reader.introspect("public", &TableFilter::default()).unwrap();

        assert_eq!(schema.name, "public");
        let names: Vec<_> = schema.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["users", "orders"]);
        let columns: Vec<_> = schema.tables()[0]
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(columns, ["id", "name", "age"]);
    }

    #[test]
    fn test_introspect_applies_filter_before_column_queries() {
        let mut reader = FakeIntrospector::new(vec![
            table("users", &[("id", "int")]),
            table("audit_log", &[("id", "int")]),
        ]);
        let filter = TableFilter {
            include: None,
            exclude: Some(vec!["audit_log".to_string()]),
        };

        let schema = reader.introspect("public", &filter).unwrap();

        assert_eq!(schema.len(), 1);
        assert_eq!(reader.column_queries, ["users"]);
    }

    #[test]
    fn test_introspect_aborts_on_first_failure() {
        let mut reader = FakeIntrospector::new(vec![
            table("a", &[("id", "int")]),
            table("b", &[("id", "int")]),
            table("c", &[("id", "int")]),
            table("d", &[("id", "int")]),
            table("e", &[("id", "int")]),
        ]);
        reader.fail_on = Some("c".to_string());

        let err = reader
            .introspect("public", &TableFilter::default())
            .unwrap_err();

        assert!(matches!(err, PgJuliaError::Introspection { .. }));
        assert_eq!(reader.column_queries, ["a", "b", "c"]);
    }

    #[test]
    fn test_introspect_rejects_duplicate_table_names() {
        let mut reader = FakeIntrospector::new(vec![
            table("users", &[("id", "int")]),
            table("users", &[("id", "int")]),
        ]);

        let err = reader
            .introspect("public", &TableFilter::default())
            .unwrap_err();

        assert!(matches!(err, PgJuliaError::DuplicateTable { .. }));
    }
}
