//! Generation pipeline
//!
//! Runs one generation pass: prepare the output directory, resolve
//! configuration, read the schema, then emit and write one file per table.
//! The first error aborts the run.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codegen::{ensure_output_dir, CodeGenerator, JuliaGenerator};
use crate::config::{DbConfig, GenerateOptions};
use crate::introspect::{Introspector, TableFilter};
use crate::prelude::PgJuliaError;

/// Run the pipeline against PostgreSQL
#[cfg(feature = "postgres")]
pub fn run(options: &GenerateOptions) -> Result<Vec<PathBuf>, PgJuliaError> {
    run_with(options, crate::introspect::PostgresIntrospector::new)
}

/// Run the pipeline with a caller-supplied introspector factory.
///
/// `connect` is only called once the output directory exists and the
/// configuration has been resolved. The introspector is dropped, closing
/// any connection, before this returns.
pub fn run_with<I, F>(options: &GenerateOptions, connect: F) -> Result<Vec<PathBuf>, PgJuliaError>
where
    I: Introspector,
    F: FnOnce(&DbConfig) -> Result<I, PgJuliaError>,
{
    ensure_output_dir(&options.output_dir)?;

    let db = DbConfig::load(options.url.as_deref(), &options.env_file)?;
    debug!(connection = ?db.redacted_connection_string(), "Loaded configuration");

    let generator = JuliaGenerator::new()?;

    if let Some(api_file) = &options.api_file {
        debug!(path = ?api_file, "API file is not used for model generation");
    }
    if options.filter.is_active() {
        debug!(filter = ?options.filter, "Table filter configured");
    }

    let mut introspector = connect(&db)?;

    generate(
        &mut introspector,
        &generator,
        &options.output_dir,
        &options.schema,
        &options.filter,
    )
}

/// Read every matching table and write one generated file per table.
///
/// Files are written in the order the introspector lists tables. Nothing is
/// written until every table has been read.
pub fn generate<I, G>(
    introspector: &mut I,
    generator: &G,
    output_dir: &Path,
    schema_name: &str,
    filter: &TableFilter,
) -> Result<Vec<PathBuf>, PgJuliaError>
where
    I: Introspector + ?Sized,
    G: CodeGenerator + ?Sized,
{
    let schema = introspector.introspect(schema_name, filter)?;

    if schema.is_empty() {
        warn!(schema = ?schema_name, "No tables matched");
        return Err(PgJuliaError::NoTablesMatched {
            schema: schema_name.to_string(),
        });
    }

    info!(tables = ?schema.len(), "Schema ready for code generation");

    let mut written = Vec::with_capacity(schema.len());
    for table in schema.tables() {
        debug!(
            table = ?table.name,
            columns = ?table.columns.len(),
            primary_key = ?table.primary_key,
            auto_generated_pk = table.has_auto_generated_pk(),
            "Table"
        );

        let file = generator.generate_file(output_dir, table)?;
        file.write()?;
        written.push(file.path);
    }

    info!(files = written.len(), output = ?output_dir, "Code generation complete");

    Ok(written)
}
