//! Configuration: database credentials from the environment, `.env`
//! loading, and the optional `~/.pkb/config.toml` settings file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::postgres::PgSslMode;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::{DEFAULT_CREATED_BY, DEFAULT_ENTRY_TYPE};

/// Required connection variables, in the order they are reported.
pub const REQUIRED_VARS: [&str; 5] = ["user", "password", "host", "port", "dbname"];

/// Optional TLS mode variable.
pub const SSLMODE_VAR: &str = "sslmode";

/// Example `.env`, printed when configuration is missing.
pub const ENV_TEMPLATE: &str = "\
user=postgres.your_project_id
password=your_password
host=aws-0-region.pooler.supabase.com
port=6543
dbname=postgres";

/// Rows shown by `list-entries` when no limit is given
const DEFAULT_LIST_LIMIT: u32 = 20;

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub ssl_mode: Option<PgSslMode>,
}

impl DbConfig {
    /// Read the connection settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Blank values count as missing. Every missing variable is reported at
    /// once; `port` is only parsed when all variables are present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let raw_port = get("port").unwrap_or_default();
        let port = raw_port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ConfigError::InvalidPort(raw_port.clone()))?;

        let ssl_mode = match get(SSLMODE_VAR) {
            Some(raw) => match raw.trim().parse::<PgSslMode>() {
                Ok(mode) => Some(mode),
                Err(_) => return Err(ConfigError::InvalidSslMode(raw)),
            },
            None => None,
        };

        Ok(Self {
            user: get("user").unwrap_or_default(),
            password: get("password").unwrap_or_default(),
            host: get("host").unwrap_or_default().trim().to_owned(),
            port,
            dbname: get("dbname").unwrap_or_default().trim().to_owned(),
            ssl_mode,
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Load environment variables from .env files.
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.pkb/.env
///
/// Returns the files that were loaded.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("Loaded .env from current directory: {}", path.display());
            loaded.push(path);
        }
        Err(e) if e.not_found() => {}
        Err(e) => debug!("Failed to load ./.env: {}", e),
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            // dotenvy doesn't overwrite existing vars, so ./.env keeps priority
            match dotenvy::from_path(&env_file) {
                Ok(()) => {
                    debug!("Loaded .env from {}", env_file.display());
                    loaded.push(env_file);
                }
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    if loaded.is_empty() {
        debug!("No .env files found (current dir or ~/.pkb)");
    }

    loaded
}

/// Get the pkb config directory path (~/.pkb)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pkb"))
}

// ============================================================================
// TOML Settings
// ============================================================================

/// Optional user settings from `~/.pkb/config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Type given to new entries without `--type`
    #[serde(default = "default_entry_type")]
    pub entry_type: String,

    /// Creator label for new entries
    #[serde(default = "default_created_by")]
    pub created_by: String,

    /// Row cap for `list-entries` without `--limit`
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            entry_type: default_entry_type(),
            created_by: default_created_by(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_entry_type() -> String {
    DEFAULT_ENTRY_TYPE.to_owned()
}

fn default_created_by() -> String {
    DEFAULT_CREATED_BY.to_owned()
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

impl Settings {
    /// Load `~/.pkb/config.toml`, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        ("user", "postgres.abc"),
        ("password", "s3cr:t@/"),
        ("host", "db.example.com"),
        ("port", "6543"),
        ("dbname", "postgres"),
    ];

    #[test]
    fn reads_all_fields() {
        let cfg = DbConfig::from_lookup(lookup(FULL)).unwrap();
        assert_eq!(cfg.user, "postgres.abc");
        assert_eq!(cfg.password, "s3cr:t@/");
        assert_eq!(cfg.host, "db.example.com");
        assert_eq!(cfg.port, 6543);
        assert_eq!(cfg.dbname, "postgres");
        assert!(cfg.ssl_mode.is_none());
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = DbConfig::from_lookup(lookup(&[("host", "h"), ("port", "5432")])).unwrap_err();
        match err {
            ConfigError::Missing(vars) => assert_eq!(vars, vec!["user", "password", "dbname"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = FULL.to_vec();
        pairs[0] = ("user", "   ");
        let err = DbConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref v) if v == &vec!["user"]));
    }

    #[test]
    fn rejects_malformed_port() {
        for bad in ["abc", "0", "70000", "-1", "54 32"] {
            let mut pairs = FULL.to_vec();
            pairs[3] = ("port", bad);
            let err = DbConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort(_)), "port {bad}");
        }
    }

    #[test]
    fn parses_sslmode() {
        let mut pairs = FULL.to_vec();
        pairs.push(("sslmode", "require"));
        let cfg = DbConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(matches!(cfg.ssl_mode, Some(PgSslMode::Require)));

        let mut pairs = FULL.to_vec();
        pairs.push(("sslmode", "sometimes"));
        let err = DbConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSslMode(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = DbConfig::from_lookup(lookup(FULL)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("s3cr:t@/"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn settings_default_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.defaults.entry_type, "note");
        assert_eq!(settings.defaults.created_by, "user");
        assert_eq!(settings.defaults.list_limit, 20);
    }

    #[test]
    fn settings_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nentry_type = \"idea\"").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.defaults.entry_type, "idea");
        assert_eq!(settings.defaults.list_limit, 20);
    }

    #[test]
    fn settings_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults\nlist_limit = ").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseSettings { .. }));
    }
}
