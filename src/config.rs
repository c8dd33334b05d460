//! Global configuration for qfilter

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::query::{Compiler, Dialect, DEFAULT_MAX_DEPTH};

/// Global qfilter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database used when a command names none
    #[serde(default)]
    pub default_database: Option<String>,

    /// Limit on filter nesting
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Named database connections
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,
}

/// One named database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQL driver name, e.g. `mysql` or `pgsql`
    #[serde(default = "default_driver")]
    pub driver: String,

    /// SQLite file the `run` command executes against
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_driver() -> String {
    Dialect::default().name().to_string()
}

impl Config {
    /// Load config from default location (~/.config/qfilter/config.toml)
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Get default config file path
    /// Checks ~/.config/qfilter/config.toml first (XDG style),
    /// then falls back to OS-specific location
    pub fn default_path() -> PathBuf {
        if let Some(xdg_path) = Self::xdg_path() {
            if xdg_path.exists() {
                return xdg_path;
            }
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qfilter")
            .join("config.toml")
    }

    /// Get the XDG-style config path (~/.config/qfilter/config.toml)
    pub fn xdg_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("qfilter").join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::default_path();
        Self::create_at(&config_path)?;
        Ok(config_path)
    }

    /// Write the default config to `path` unless a file is already there
    pub fn create_at(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default_config = r#"# qfilter configuration

# Database used when --database is not given
# default_database = "main"

# Maximum filter nesting depth (untagged scopes plus joins)
# max_depth = 32

# [databases.main]
# driver = "mysql"          # mysql | pgsql
# path = "/path/to/main.db" # SQLite file used by `qf run`
"#;

        std::fs::write(path, default_config)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Look up a database by name, or the default database
    pub fn database(&self, name: Option<&str>) -> Result<(&str, &DatabaseConfig)> {
        let name = name
            .or(self.default_database.as_deref())
            .ok_or_else(|| anyhow!("No database given and no default_database configured"))?;

        self.databases
            .get_key_value(name)
            .map(|(key, db)| (key.as_str(), db))
            .ok_or_else(|| anyhow!("Unknown database '{}'", name))
    }

    /// Dialect for a named database; unknown names use the default dialect
    pub fn driver(&self, name: Option<&str>) -> Dialect {
        match self.database(name) {
            Ok((_, db)) => Dialect::from_driver(&db.driver),
            Err(_) => Dialect::default(),
        }
    }

    /// A compiler for `dialect` honoring `max_depth`
    pub fn compiler(&self, dialect: Dialect) -> Compiler {
        Compiler::new(dialect).with_max_depth(self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
default_database = "shop"
max_depth = 4

[databases.shop]
driver = "pgsql"
path = "shop.db"

[databases.legacy]
driver = "oracle"

[databases.plain]
"#;

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_database.as_deref(), Some("shop"));
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.databases.len(), 3);
        assert_eq!(config.databases["plain"].driver, "mysql");
        assert_eq!(config.databases["shop"].path, Some(PathBuf::from("shop.db")));
    }

    #[test]
    fn test_driver_lookup() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.driver(None), Dialect::Postgres);
        assert_eq!(config.driver(Some("shop")), Dialect::Postgres);
        assert_eq!(config.driver(Some("legacy")), Dialect::Mysql);
        assert_eq!(config.driver(Some("missing")), Dialect::Mysql);
        assert_eq!(Config::default().driver(None), Dialect::Mysql);
    }

    #[test]
    fn test_database_lookup_errors() {
        let config = Config::default();
        assert!(config.database(None).is_err());

        let config: Config = toml::from_str(SAMPLE).unwrap();
        let (name, _) = config.database(None).unwrap();
        assert_eq!(name, "shop");
        let err = config.database(Some("nope")).unwrap_err();
        assert!(err.to_string().contains("Unknown database 'nope'"));
    }

    #[test]
    fn test_compiler_uses_max_depth() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let compiler = config.compiler(Dialect::Postgres);
        assert_eq!(compiler.dialect(), Dialect::Postgres);
        assert_eq!(compiler.max_depth(), 4);
        assert_eq!(Config::default().compiler(Dialect::Mysql).max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_create_at_writes_loadable_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::create_at(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.databases.is_empty());
        assert!(config.default_database.is_none());

        // Existing files are left alone
        std::fs::write(&path, "max_depth = 2\n").unwrap();
        Config::create_at(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().max_depth, Some(2));
    }
}
