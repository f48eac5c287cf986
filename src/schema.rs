//! Schema data structures
//!
//! These types represent database schema information and form the contract
//! between introspection (produces) and code generation (consumes).

use crate::error::PgJuliaError;

/// The tables read from one database schema, in reader order
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    tables: Vec<Table>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Append a table, rejecting a name that is already present
    pub fn push_table(&mut self, table: Table) -> Result<(), PgJuliaError> {
        if self.tables.iter().any(|t| t.name == table.name) {
            return Err(PgJuliaError::DuplicateTable { table: table.name });
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

/// Database table
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
    /// Column names that form the primary key (in order)
    pub primary_key: Vec<String>,
}

impl Table {
    /// Check if the primary key is auto-generated (SERIAL, BIGSERIAL, identity)
    pub fn has_auto_generated_pk(&self) -> bool {
        self.primary_key_columns()
            .iter()
            .any(|col| col.is_auto_generated)
    }

    /// Get primary key columns in order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key
            .iter()
            .filter_map(|pk_name| self.columns.iter().find(|col| &col.name == pk_name))
            .collect()
    }
}

/// A table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Normalized source type label (`int64`, `string`, `float64`, ...)
    pub data_type: String,
    pub is_nullable: bool,
    /// Column has a server-side default (DEFAULT value, NOW(), etc.)
    pub has_default: bool,
    /// Column is auto-generated (SERIAL, BIGSERIAL, IDENTITY)
    pub is_auto_generated: bool,
}

impl Column {
    /// A non-null column without defaults
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: false,
            has_default: false,
            is_auto_generated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Table {
        Table {
            name: name.to_string(),
            columns: vec![],
            primary_key: vec![],
        }
    }

    #[test]
    fn test_push_table_keeps_reader_order() {
        let mut schema = Schema::new("public");
        schema.push_table(table("users")).unwrap();
        schema.push_table(table("orders")).unwrap();
        schema.push_table(table("accounts")).unwrap();

        let names: Vec<_> = schema.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["users", "orders", "accounts"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_push_table_rejects_duplicate() {
        let mut schema = Schema::new("public");
        schema.push_table(table("users")).unwrap();

        let err = schema.push_table(table("users")).unwrap_err();
        assert!(matches!(err, PgJuliaError::DuplicateTable { ref table } if table == "users"));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_new_schema_is_empty() {
        assert!(Schema::new("public").is_empty());
    }

    #[test]
    fn test_has_auto_generated_pk_true() {
        let table = Table {
            name: "users".to_string(),
            columns: vec![Column {
                has_default: true,
                is_auto_generated: true,
                ..Column::new("id", "int64")
            }],
            primary_key: vec!["id".to_string()],
        };
        assert!(table.has_auto_generated_pk());
    }

    #[test]
    fn test_has_auto_generated_pk_false() {
        let table = Table {
            name: "users".to_string(),
            columns: vec![Column::new("id", "string")],
            primary_key: vec!["id".to_string()],
        };
        assert!(!table.has_auto_generated_pk());
    }

    #[test]
    fn test_primary_key_columns_in_key_order() {
        let table = Table {
            name: "memberships".to_string(),
            columns: vec![
                Column::new("group_id", "int64"),
                Column::new("note", "string"),
                Column::new("user_id", "int64"),
            ],
            primary_key: vec!["user_id".to_string(), "group_id".to_string()],
        };
        let names: Vec<_> = table
            .primary_key_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["user_id", "group_id"]);
    }
}
