use std::path::PathBuf;

use thiserror::Error;

/// pgjulia errors
#[derive(Error, Debug)]
pub enum PgJuliaError {
    #[error("Failed to create output directory '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Failed to introspect schema '{schema}': {message}")]
    Introspection { schema: String, message: String },

    #[error("no tables matched in schema '{schema}'")]
    NoTablesMatched { schema: String },

    #[error("Table '{table}' was returned more than once")]
    DuplicateTable { table: String },

    #[error("Code generation failed for table '{table}': {message}")]
    CodeGen { table: String, message: String },

    #[error("Failed to write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}
