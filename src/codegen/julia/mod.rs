//! Julia code generator
//!
//! Generates one Julia module per table with one typed constant per column.

use minijinja::Environment;
use tracing::{debug, error, trace};

use crate::codegen::CodeGenerator;
use crate::error::PgJuliaError;
use crate::schema::{Column, Table};

/// Source type label -> Julia type
const TYPE_MAP: &[(&str, &str)] = &[
    ("int", "Int64"),
    ("int64", "Int64"),
    ("float64", "Float64"),
    ("string", "String"),
];

/// Julia type for every label missing from [`TYPE_MAP`]
pub const FALLBACK_TYPE: &str = "Any";

/// Map a source type label to a Julia type name. Never fails.
pub fn julia_type(data_type: &str) -> &'static str {
    TYPE_MAP
        .iter()
        .find(|(source, _)| *source == data_type)
        .map(|(_, target)| *target)
        .unwrap_or(FALLBACK_TYPE)
}

/// Julia code generator
pub struct JuliaGenerator {
    env: Environment<'static>,
}

impl JuliaGenerator {
    pub fn new() -> Result<Self, PgJuliaError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.add_template("module", include_str!("templates/module.jl.jinja"))
            .map_err(|e| {
                error!(error = ?e, "Failed to load Julia module template");
                PgJuliaError::Config(format!("Failed to load Julia module template: {}", e))
            })?;

        Ok(Self { env })
    }
}

impl CodeGenerator for JuliaGenerator {
    fn file_extension(&self) -> &str {
        "jl"
    }

    fn emit(&self, table: &Table) -> Result<String, PgJuliaError> {
        let template = self
            .env
            .get_template("module")
            .map_err(|e| PgJuliaError::CodeGen {
                table: table.name.clone(),
                message: format!("Template error: {}", e),
            })?;

        let columns: Vec<_> = table.columns.iter().map(build_column_context).collect();

        let code = template
            .render(minijinja::context! {
                module_name => &table.name,
                columns => columns,
            })
            .map_err(|e| PgJuliaError::CodeGen {
                table: table.name.clone(),
                message: format!("Render error: {}", e),
            })?;

        debug!(table = ?table.name, columns = table.columns.len(), "Rendered Julia module");
        Ok(code)
    }
}

/// Build template context for a column
fn build_column_context(col: &Column) -> minijinja::Value {
    let target = julia_type(&col.data_type);
    if target == FALLBACK_TYPE {
        trace!(column = ?col.name, data_type = ?col.data_type, "Unmapped type, using Any");
    }

    minijinja::context! {
        name => &col.name,
        julia_type => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[(&str, &str)]) -> Table {
        Table {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(name, data_type)| Column::new(*name, *data_type))
                .collect(),
            primary_key: vec![],
        }
    }

    fn declarations(code: &str) -> Vec<&str> {
        code.lines().filter(|l| l.starts_with("const ")).collect()
    }

    #[test]
    fn test_julia_type_known_labels() {
        assert_eq!(julia_type("int"), "Int64");
        assert_eq!(julia_type("int64"), "Int64");
        assert_eq!(julia_type("float64"), "Float64");
        assert_eq!(julia_type("string"), "String");
    }

    #[test]
    fn test_julia_type_fallback() {
        assert_eq!(julia_type("bool"), "Any");
        assert_eq!(julia_type("time.Time"), "Any");
        assert_eq!(julia_type("[]byte"), "Any");
        assert_eq!(julia_type(""), "Any");
        assert_eq!(julia_type("INT"), "Any");
    }

    #[test]
    fn test_emit_exact_text() {
        let generator = JuliaGenerator::new().unwrap();
        let code = generator
            .emit(&table("users", &[("id", "int"), ("name", "string")]))
            .unwrap();

        assert_eq!(
            code,
            "module users\n\nconst id::Int64\nconst name::String\n\nend\n"
        );
    }

    #[test]
    fn test_emit_keeps_column_order() {
        let generator = JuliaGenerator::new().unwrap();
        let code = generator
            .emit(&table(
                "orders",
                &[
                    ("total", "float64"),
                    ("id", "int64"),
                    ("placed_at", "time.Time"),
                    ("note", "string"),
                ],
            ))
            .unwrap();

        assert_eq!(
            declarations(&code),
            [
                "const total::Float64",
                "const id::Int64",
                "const placed_at::Any",
                "const note::String",
            ]
        );
    }

    #[test]
    fn test_emit_zero_columns() {
        let generator = JuliaGenerator::new().unwrap();
        let code = generator.emit(&table("empty", &[])).unwrap();

        assert_eq!(code, "module empty\n\n\nend\n");
        assert!(declarations(&code).is_empty());
    }

    #[test]
    fn test_emit_does_not_escape_names() {
        let generator = JuliaGenerator::new().unwrap();
        let code = generator
            .emit(&table("a<b>", &[("x&y", "int")]))
            .unwrap();

        assert!(code.starts_with("module a<b>\n"));
        assert_eq!(declarations(&code), ["const x&y::Int64"]);
    }

    #[test]
    fn test_generate_file_path() {
        let generator = JuliaGenerator::new().unwrap();
        let file = generator
            .generate_file(std::path::Path::new("models"), &table("users", &[]))
            .unwrap();

        assert_eq!(file.path, std::path::Path::new("models").join("users.jl"));
        assert!(file.contents.starts_with("module users"));
    }
}
