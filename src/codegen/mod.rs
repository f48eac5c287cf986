//! Code generation
//!
//! This module provides functionality for turning introspected tables into
//! source files and writing them to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::prelude::{PgJuliaError, Table};

pub mod julia;

pub use julia::JuliaGenerator;

/// Trait for language-specific code generators
pub trait CodeGenerator {
    /// File extension of generated files, without the dot
    fn file_extension(&self) -> &str;

    /// Render the complete source text for one table
    fn emit(&self, table: &Table) -> Result<String, PgJuliaError>;

    /// Render one table into a file under `dir`
    fn generate_file(&self, dir: &Path, table: &Table) -> Result<GeneratedFile, PgJuliaError> {
        let contents = self.emit(table)?;
        Ok(GeneratedFile {
            path: file_path(dir, table, self.file_extension()),
            contents,
        })
    }
}

/// A rendered file that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    /// Write the file, replacing any existing file at the same path
    pub fn write(&self) -> Result<(), PgJuliaError> {
        fs::write(&self.path, &self.contents).map_err(|source| PgJuliaError::Output {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = ?self.path, bytes = self.contents.len(), "Wrote file");
        Ok(())
    }
}

/// `<dir>/<table name>.<extension>`
pub fn file_path(dir: &Path, table: &Table, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", table.name, extension))
}

/// Create the output directory and its parents if missing
pub fn ensure_output_dir(dir: &Path) -> Result<(), PgJuliaError> {
    fs::create_dir_all(dir).map_err(|source| PgJuliaError::Filesystem {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(path = ?dir, "Output directory ready");
    Ok(())
}
