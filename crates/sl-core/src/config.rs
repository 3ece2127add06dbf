//! Configuration types and parsing for sluice.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names searched for, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["sluice.yml", "sluice.yaml"];

/// Project configuration from sluice.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding migration files, relative to the config file
    #[serde(default = "default_migrations")]
    pub migrations: String,

    /// SQL dialect used to split and classify statements
    #[serde(default)]
    pub dialect: Dialect,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Squash defaults
    #[serde(default)]
    pub squash: SquashConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations: default_migrations(),
            dialect: Dialect::default(),
            database: DatabaseConfig::default(),
            squash: SquashConfig::default(),
        }
    }
}

/// SQL dialect selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL (default)
    #[default]
    Postgres,
    /// DuckDB
    DuckDb,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Where the connection string comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Literal connection string (a DuckDB path or `:memory:`)
    #[serde(default)]
    pub path: Option<String>,

    /// Name of an environment variable holding the connection string
    #[serde(default)]
    pub env: Option<String>,
}

/// Defaults for `sluice squash`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SquashConfig {
    /// Rename replaced files to `.bak` instead of deleting them
    #[serde(default)]
    pub backup: bool,

    /// Append `-- source: <id>` to every merged statement
    #[serde(default)]
    pub annotate_source: bool,
}

fn default_migrations() -> String {
    "migrations".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match config_file_in(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Walk up from `start` to the first directory holding a config file.
    ///
    /// Returns the project root together with the parsed config.
    pub fn find(start: &Path) -> CoreResult<(PathBuf, Self)> {
        for dir in start.ancestors() {
            if let Some(path) = config_file_in(dir) {
                log::debug!("Using config {}", path.display());
                return Ok((dir.to_path_buf(), Self::load(&path)?));
            }
        }
        Err(CoreError::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Absolute migrations directory for a project rooted at `root`
    pub fn migrations_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations)
    }

    /// Resolve the database connection string.
    ///
    /// Precedence: `explicit` (e.g. a `--database` flag), then the variable
    /// named by `database.env`, then `database.path`.
    pub fn resolve_connection_string(&self, explicit: Option<&str>) -> CoreResult<String> {
        if let Some(conn) = explicit.filter(|s| !s.is_empty()) {
            return Ok(conn.to_string());
        }
        if let Some(var) = &self.database.env {
            match std::env::var(var) {
                Ok(value) if !value.is_empty() => return Ok(value),
                _ => log::debug!("Environment variable {var} is not set"),
            }
        }
        if let Some(path) = self.database.path.as_deref().filter(|s| !s.is_empty()) {
            return Ok(path.to_string());
        }
        Err(CoreError::ConfigInvalid {
            message: match &self.database.env {
                Some(var) => format!(
                    "no database connection: ${var} is unset and database.path is empty"
                ),
                None => "no database connection: set database.path or database.env".to_string(),
            },
        })
    }

    fn validate(&self) -> CoreResult<()> {
        if self.migrations.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations directory cannot be empty".to_string(),
            });
        }
        if matches!(&self.database.env, Some(var) if var.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "database.env cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
