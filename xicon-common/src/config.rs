//! Configuration loading and database location resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The database name has no compiled default. Startup fails fast when it is
//! absent from every tier.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the database
pub const ENV_DB_NAME: &str = "XICON_DB_NAME";
/// Environment variable overriding the local data directory
pub const ENV_DATA_DIR: &str = "XICON_DATA_DIR";
/// Environment variable set by hosted deployments to the managed volume path
pub const ENV_DB_SOCKET_DIR: &str = "XICON_DB_SOCKET_DIR";
/// Environment variable overriding the listen address
pub const ENV_BIND: &str = "XICON_BIND";
/// Environment variable naming the bootstrap admin account
pub const ENV_ADMIN_USERNAME: &str = "XICON_ADMIN_USERNAME";
/// Environment variable holding the bootstrap admin password
pub const ENV_ADMIN_PASSWORD: &str = "XICON_ADMIN_PASSWORD";

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";

/// On-disk TOML configuration
///
/// All sections and keys are optional; a missing file is equivalent to an
/// empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database: DatabaseSection,
    pub server: ServerSection,
    pub admin: AdminSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Database name (file stem of the SQLite database)
    pub name: Option<String>,
    /// Local data directory holding the database file
    pub data_dir: Option<PathBuf>,
    /// Managed volume path used in hosted deployments
    pub socket_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load the platform config file if one exists, otherwise an empty config
    pub fn load_default() -> Result<Self> {
        match default_config_file() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_name: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub socket_dir: Option<PathBuf>,
    pub bind: Option<String>,
}

/// Where the database file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Local data directory (development, self-hosted)
    Local(PathBuf),
    /// Managed volume provided by the hosting environment
    Hosted(PathBuf),
}

impl DatabaseLocation {
    pub fn dir(&self) -> &Path {
        match self {
            DatabaseLocation::Local(dir) | DatabaseLocation::Hosted(dir) => dir,
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, DatabaseLocation::Hosted(_))
    }
}

/// Resolved database settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub name: String,
    pub location: DatabaseLocation,
}

impl DatabaseSettings {
    /// Full path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.location.dir().join(format!("{}.db", self.name))
    }
}

/// Bootstrap admin account
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub database: DatabaseSettings,
    pub bind_addr: String,
    pub admin: Option<AdminCredentials>,
}

/// Resolve configuration from CLI overrides, the process environment and TOML
pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<ResolvedConfig> {
    resolve_with_env(overrides, toml, |key| std::env::var(key).ok())
}

/// Resolve configuration using a caller-supplied environment lookup
pub fn resolve_with_env<F>(
    overrides: &ConfigOverrides,
    toml: &TomlConfig,
    env: F,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let name = overrides
        .database_name
        .clone()
        .or_else(|| env(ENV_DB_NAME))
        .or_else(|| toml.database.name.clone())
        .ok_or_else(|| {
            Error::Config(format!(
                "Database name not configured. Set one of:\n\
                 1. Command line: --db-name <name>\n\
                 2. Environment: {}=<name>\n\
                 3. TOML config: [database] name = \"<name>\"",
                ENV_DB_NAME
            ))
        })?;
    validate_database_name(&name)?;

    // A managed volume wins over any local directory
    let socket_dir = overrides
        .socket_dir
        .clone()
        .or_else(|| env(ENV_DB_SOCKET_DIR).map(PathBuf::from))
        .or_else(|| toml.database.socket_dir.clone());

    let location = match socket_dir {
        Some(dir) => DatabaseLocation::Hosted(dir),
        None => DatabaseLocation::Local(
            overrides
                .data_dir
                .clone()
                .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
                .or_else(|| toml.database.data_dir.clone())
                .unwrap_or_else(default_data_dir),
        ),
    };

    let bind_addr = overrides
        .bind
        .clone()
        .or_else(|| env(ENV_BIND))
        .or_else(|| toml.server.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    let username = env(ENV_ADMIN_USERNAME).or_else(|| toml.admin.username.clone());
    let password = env(ENV_ADMIN_PASSWORD).or_else(|| toml.admin.password.clone());
    let admin = match (username, password) {
        (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
        (None, None) => None,
        _ => {
            return Err(Error::Config(
                "Admin username and password must be configured together".to_string(),
            ))
        }
    };

    Ok(ResolvedConfig {
        database: DatabaseSettings { name, location },
        bind_addr,
        admin,
    })
}

/// Database names become file names; keep them to a safe character set
fn validate_database_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() < 100
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid database name: {:?}", name)))
    }
}

/// Platform config file, if present
///
/// Linux checks `~/.config/xicon/config.toml` then `/etc/xicon/config.toml`.
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("xicon").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/xicon/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("xicon"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/xicon"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("xicon"))
            .unwrap_or_else(|| PathBuf::from("./xicon_data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_name_fails_fast() {
        let result = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env_from(&[]));
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains(ENV_DB_NAME)),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_beats_env_beats_toml() {
        let toml = TomlConfig::parse("[database]\nname = \"from_toml\"\n").unwrap();
        let env = env_from(&[(ENV_DB_NAME, "from_env")]);

        let overrides = ConfigOverrides {
            database_name: Some("from_cli".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&overrides, &toml, &env).unwrap();
        assert_eq!(resolved.database.name, "from_cli");

        let resolved = resolve_with_env(&ConfigOverrides::default(), &toml, &env).unwrap();
        assert_eq!(resolved.database.name, "from_env");

        let resolved =
            resolve_with_env(&ConfigOverrides::default(), &toml, env_from(&[])).unwrap();
        assert_eq!(resolved.database.name, "from_toml");
    }

    #[test]
    fn test_socket_dir_selects_hosted_location() {
        let env = env_from(&[
            (ENV_DB_NAME, "xicon"),
            (ENV_DATA_DIR, "/tmp/local"),
            (ENV_DB_SOCKET_DIR, "/cloudsql/project:region:instance"),
        ]);
        let resolved = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env).unwrap();

        assert!(resolved.database.location.is_hosted());
        assert_eq!(
            resolved.database.database_path(),
            PathBuf::from("/cloudsql/project:region:instance/xicon.db")
        );
    }

    #[test]
    fn test_local_data_dir_and_default_bind() {
        let env = env_from(&[(ENV_DB_NAME, "xicon"), (ENV_DATA_DIR, "/tmp/local")]);
        let resolved = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env).unwrap();

        assert_eq!(
            resolved.database.location,
            DatabaseLocation::Local(PathBuf::from("/tmp/local"))
        );
        assert_eq!(resolved.bind_addr, DEFAULT_BIND);
        assert!(resolved.admin.is_none());
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let toml = TomlConfig::parse("[database]\nname = \"from_toml\"\n").unwrap();
        let env = env_from(&[(ENV_DB_NAME, "  ")]);
        let resolved = resolve_with_env(&ConfigOverrides::default(), &toml, env).unwrap();
        assert_eq!(resolved.database.name, "from_toml");
    }

    #[test]
    fn test_invalid_database_name_rejected() {
        let env = env_from(&[(ENV_DB_NAME, "../escape")]);
        let result = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_admin_requires_both_fields() {
        let env = env_from(&[(ENV_DB_NAME, "xicon"), (ENV_ADMIN_USERNAME, "admin")]);
        let result = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env);
        assert!(matches!(result, Err(Error::Config(_))));

        let env = env_from(&[
            (ENV_DB_NAME, "xicon"),
            (ENV_ADMIN_USERNAME, "admin"),
            (ENV_ADMIN_PASSWORD, "hunter2"),
        ]);
        let resolved = resolve_with_env(&ConfigOverrides::default(), &TomlConfig::default(), env).unwrap();
        let admin = resolved.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert!(!format!("{:?}", admin).contains("hunter2"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(TomlConfig::parse("[database"), Err(Error::Config(_))));
    }
}
