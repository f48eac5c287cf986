//! # pgjulia
//!
//! Generate Julia model modules from PostgreSQL schemas
//!
//! This crate provides a CLI tool and library for reading the tables of a
//! PostgreSQL schema and writing one Julia module per table, with one typed
//! constant per column.

pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod introspect;
pub mod schema;

pub mod prelude {
    pub use crate::codegen::{CodeGenerator, GeneratedFile, JuliaGenerator};
    pub use crate::config::{DbConfig, GenerateOptions};
    pub use crate::error::PgJuliaError;
    pub use crate::generate::{generate, run_with};
    pub use crate::introspect::{Introspector, TableFilter};
    pub use crate::schema::{Column, Schema, Table};
}

#[cfg(feature = "postgres")]
pub use generate::run;
#[cfg(feature = "postgres")]
pub use introspect::PostgresIntrospector;
