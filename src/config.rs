//! Configuration loading
//!
//! [`GenerateOptions`] carries everything one generation run needs.
//! [`DbConfig`] resolves the database connection string from the command
//! line, a .env file, or the environment.

use std::{env, path::Path, path::PathBuf};

use tracing::{debug, error, trace, warn};
use url::Url;

use crate::introspect::TableFilter;
use crate::prelude::PgJuliaError;

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the generated modules are written to
    pub output_dir: PathBuf,
    /// API definition file; accepted for future API-driven generation
    pub api_file: Option<PathBuf>,
    /// Explicit connection string, takes precedence over the environment
    pub url: Option<String>,
    /// Database schema to introspect
    pub schema: String,
    /// Path to .env file for connection config
    pub env_file: PathBuf,
    pub filter: TableFilter,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            api_file: None,
            url: None,
            schema: "public".to_string(),
            env_file: PathBuf::from("./.env"),
            filter: TableFilter::default(),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    connection_string: String,
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            connection_string: url.into(),
        }
    }

    /// Load a .env file and then resolve the connection string
    pub fn load(url: Option<&str>, env_file: &Path) -> Result<Self, PgJuliaError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                PgJuliaError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        Self::resolve(url, |key| env::var(key).ok())
    }

    /// Resolve the connection string from an explicit URL or variable lookup
    ///
    /// Precedence: `url`, then `DATABASE_URL`, then `DB_HOST` / `DB_PORT` /
    /// `DB_NAME` / `DB_USER` / `DB_PASSWORD` when `DB_NAME` is set. `DB_USER`
    /// and `DB_PASSWORD` are optional; the driver defaults the user to the
    /// OS user.
    pub fn resolve<F>(url: Option<&str>, lookup: F) -> Result<Self, PgJuliaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            debug!("Using connection string from command line");
            return Ok(Self::from_url(url));
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            debug!("Using connection string from DATABASE_URL");
            return Ok(Self::from_url(url));
        }

        let Some(database) = lookup("DB_NAME") else {
            error!("No database connection configured");
            return Err(PgJuliaError::Config(
                "no connection string: pass --url or set DATABASE_URL".to_string(),
            ));
        };

        let host = lookup("DB_HOST").unwrap_or_else(|| {
            trace!("DB_HOST not set, using default");
            "localhost".to_string()
        });

        let port_str = lookup("DB_PORT").unwrap_or_else(|| {
            trace!("DB_PORT not set, using default");
            "5432".to_string()
        });

        let port = port_str.parse::<u16>().map_err(|e| {
            error!(port = ?port_str, error = ?e, "Invalid DB_PORT value");
            PgJuliaError::Config("DB_PORT must be a valid port number".to_string())
        })?;

        let user = lookup("DB_USER");
        if user.is_none() {
            trace!("DB_USER not set, driver will use the OS user");
        }

        let mut pairs = vec![
            ("host", host.clone()),
            ("port", port.to_string()),
            ("dbname", database.clone()),
        ];
        if let Some(user) = &user {
            pairs.push(("user", user.clone()));
        }
        match lookup("DB_PASSWORD") {
            Some(password) => pairs.push(("password", password)),
            None => warn!("DB_PASSWORD not set, connecting without a password"),
        }

        let connection_string = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, quote_value(value)))
            .collect::<Vec<_>>()
            .join(" ");

        debug!(host = ?host, port = ?port, database = ?database, user = ?user, "Configuration loaded");

        Ok(Self { connection_string })
    }

    /// The connection string as given, in URL or key/value form
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Build a connection string with password redacted (for logs and error messages)
    pub fn redacted_connection_string(&self) -> String {
        let raw = self.connection_string.trim();

        if raw.contains("://") {
            return match Url::parse(raw) {
                Ok(mut url) => {
                    if url.password().is_some() {
                        // Only fails for URLs that cannot carry credentials
                        let _ = url.set_password(Some("***"));
                    }
                    url.to_string()
                }
                Err(_) => "<unparseable connection url>".to_string(),
            };
        }

        match parse_key_values(raw) {
            Some(pairs) => pairs
                .iter()
                .map(|(key, value)| match key.as_str() {
                    "password" => "password=***".to_string(),
                    _ => format!("{}={}", key, quote_value(value)),
                })
                .collect::<Vec<_>>()
                .join(" "),
            None => "<unparseable connection string>".to_string(),
        }
    }
}

/// Quote a key/value connection parameter the way libpq reads it
fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Split a libpq key/value connection string into unquoted pairs.
///
/// Returns `None` for anything libpq would reject (missing `=`, unterminated
/// quote, dangling backslash).
fn parse_key_values(raw: &str) -> Option<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = raw.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            return Some(pairs);
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next() != Some('=') || key.is_empty() {
            return None;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'\'').is_some() {
            loop {
                match chars.next()? {
                    '\'' => break,
                    '\\' => value.push(chars.next()?),
                    c => value.push(c),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '\\' {
                    value.push(chars.next()?);
                } else {
                    value.push(c);
                }
            }
        }

        pairs.push((key, value));
    }
}
