use postgres::{Client, NoTls};
use tracing::{debug, error, info, trace};

use super::Introspector;
use crate::config::DbConfig;
use crate::prelude::PgJuliaError;
use crate::schema::Column;

/// PostgreSQL introspector
///
/// The connection is opened on the first query and closed when the
/// introspector is dropped.
pub struct PostgresIntrospector {
    config: postgres::Config,
    redacted: String,
    client: Option<Client>,
}

impl PostgresIntrospector {
    /// Parse the driver configuration without connecting
    pub fn new(db: &DbConfig) -> Result<Self, PgJuliaError> {
        let redacted = db.redacted_connection_string();
        let config = db
            .connection_string()
            .parse::<postgres::Config>()
            .map_err(|e| {
                error!(connection = ?redacted, error = ?e, "Invalid connection string");
                PgJuliaError::Config(format!("Invalid connection string {}: {}", redacted, e))
            })?;

        Ok(Self {
            config,
            redacted,
            client: None,
        })
    }

    fn client(&mut self) -> Result<&mut Client, PgJuliaError> {
        if self.client.is_none() {
            info!(connection = ?self.redacted, "Connecting to PostgreSQL");
            let client = self.config.connect(NoTls).map_err(|e| {
                error!(connection = ?self.redacted, error = ?e, "Connection failed");
                PgJuliaError::Connection(format!("{}: {}", self.redacted, e))
            })?;
            info!("Connected to database");
            self.client = Some(client);
        }

        self.client
            .as_mut()
            .ok_or_else(|| PgJuliaError::Connection(self.redacted.clone()))
    }
}

impl Introspector for PostgresIntrospector {
    fn table_names(&mut self, schema_name: &str) -> Result<Vec<String>, PgJuliaError> {
        query_tables(self.client()?, schema_name)
    }

    fn columns(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<Column>, PgJuliaError> {
        query_columns(self.client()?, schema_name, table_name)
    }

    fn primary_key(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<String>, PgJuliaError> {
        query_primary_key(self.client()?, schema_name, table_name)
    }
}

/// Query all table names in a schema
fn query_tables(client: &mut Client, schema_name: &str) -> Result<Vec<String>, PgJuliaError> {
    trace!(schema = ?schema_name, "Querying tables");

    let sql = r#"
        SELECT c.relname AS table_name
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind IN ('r', 'p')
            AND n.nspname = $1
        ORDER BY c.relname
    "#;

    let rows = client.query(sql, &[&schema_name]).map_err(|e| {
        error!(schema = ?schema_name, error = ?e, "Failed to query tables");
        PgJuliaError::Introspection {
            schema: schema_name.to_string(),
            message: format!("Failed to query tables: {}", e),
        }
    })?;

    let tables: Vec<String> = rows.iter().map(|row| row.get("table_name")).collect();
    trace!(tables = ?tables, "Tables found");
    Ok(tables)
}

/// Query all columns for a table
fn query_columns(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
) -> Result<Vec<Column>, PgJuliaError> {
    trace!(schema = ?schema_name, table = ?table_name, "Querying columns");

    let sql = r#"
        SELECT
            a.attname AS column_name,
            format_type(a.atttypid, a.atttypmod) AS data_type,
            NOT a.attnotnull AS is_nullable,
            pg_get_expr(d.adbin, d.adrelid) AS default_value,
            a.attidentity <> '' AS is_identity
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_attrdef d ON d.adrelid = c.oid AND d.adnum = a.attnum
        WHERE c.relname = $1
            AND n.nspname = $2
            AND a.attnum > 0
            AND NOT a.attisdropped
        ORDER BY a.attnum
    "#;

    let rows = client
        .query(sql, &[&table_name, &schema_name])
        .map_err(|e| {
            error!(
                schema = ?schema_name,
                table = ?table_name,
                error = ?e,
                "Failed to query columns"
            );
            PgJuliaError::Introspection {
                schema: schema_name.to_string(),
                message: format!("Failed to query columns for table '{}': {}", table_name, e),
            }
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let column_name: String = row.get("column_name");
        let type_str: String = row.get("data_type");
        let is_nullable: bool = row.get("is_nullable");
        let default_value: Option<String> = row.get("default_value");
        let is_identity: bool = row.get("is_identity");

        let is_auto_generated = is_identity || is_auto_generated_column(&default_value);
        let has_default = default_value.is_some() || is_identity;
        let data_type = normalize_data_type(&type_str);

        trace!(
            column = ?column_name,
            pg_type = ?type_str,
            data_type = ?data_type,
            is_nullable = ?is_nullable,
            has_default = ?has_default,
            is_auto_generated = ?is_auto_generated,
            "Parsed column"
        );

        columns.push(Column {
            name: column_name,
            data_type,
            is_nullable,
            has_default,
            is_auto_generated,
        });
    }

    debug!(table = ?table_name, columns = ?columns.len(), "Columns read");
    Ok(columns)
}

/// Query primary key columns for a table
fn query_primary_key(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
) -> Result<Vec<String>, PgJuliaError> {
    trace!(schema = ?schema_name, table = ?table_name, "Querying primary key");

    let sql = r#"
        SELECT a.attname AS column_name
        FROM pg_constraint con
        JOIN pg_class c ON c.oid = con.conrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(con.conkey)
        WHERE con.contype = 'p'
            AND c.relname = $1
            AND n.nspname = $2
        ORDER BY array_position(con.conkey, a.attnum)
    "#;

    let rows = client
        .query(sql, &[&table_name, &schema_name])
        .map_err(|e| {
            error!(
                schema = ?schema_name,
                table = ?table_name,
                error = ?e,
                "Failed to query primary key"
            );
            PgJuliaError::Introspection {
                schema: schema_name.to_string(),
                message: format!(
                    "Failed to query primary key for table '{}': {}",
                    table_name, e
                ),
            }
        })?;

    let pk_columns: Vec<String> = rows.iter().map(|row| row.get("column_name")).collect();
    trace!(table = ?table_name, primary_key = ?pk_columns, "Primary key found");
    Ok(pk_columns)
}

/// Check if a column default comes from a sequence (SERIAL, BIGSERIAL).
/// Identity columns are detected through `attidentity` instead.
fn is_auto_generated_column(default_value: &Option<String>) -> bool {
    match default_value {
        Some(default) => default.to_lowercase().contains("nextval("),
        None => false,
    }
}

/// Normalize a `format_type` string into a source type label.
///
/// Integers of every width become `int64`, floating and arbitrary precision
/// numbers `float64`, character-like types `string`. Types with no label of
/// their own are passed through lower-cased.
fn normalize_data_type(type_str: &str) -> String {
    let lower = type_str.to_lowercase();
    let trimmed = lower.trim();

    // Handle arrays first (e.g., "integer[]", "character varying(255)[]")
    if let Some(inner) = trimmed.strip_suffix("[]") {
        return format!("[]{}", normalize_data_type(inner));
    }

    // Drop modifiers: "numeric(10,2)" -> "numeric", "timestamp(3) with time zone" -> "timestamp"
    let base = trimmed.split('(').next().unwrap_or(trimmed).trim();

    if base.starts_with("timestamp") || base.starts_with("time ") {
        return "time.Time".to_string();
    }

    let label = match base {
        "smallint" | "int2" | "integer" | "int" | "int4" | "serial" | "serial4"
        | "smallserial" | "serial2" | "bigint" | "int8" | "bigserial" | "serial8" => "int64",
        "real" | "float4" | "double precision" | "float8" | "numeric" | "decimal" | "money" => {
            "float64"
        }
        "text" | "character varying" | "varchar" | "character" | "char" | "bpchar" | "name"
        | "uuid" | "json" | "jsonb" | "citext" | "inet" | "cidr" | "macaddr" | "xml" => "string",
        "boolean" | "bool" => "bool",
        "date" | "time" | "timetz" | "timestamptz" | "interval" => "time.Time",
        "bytea" => "[]byte",
        _ => return trimmed.to_string(),
    };

    label.to_string()
}
