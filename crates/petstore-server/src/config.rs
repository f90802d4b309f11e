//! Server configuration with layered loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. Profile preset selected by `PETSTORE_ENV` (`dev`, `prod`, `test`)
//! 3. TOML file named by `PETSTORE_CONFIG` (optional)
//! 4. Individual `PETSTORE_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use petstore_auth::AuthConfig;
use petstore_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Dev,
    Prod,
    Test,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Profile::Dev),
            "prod" | "production" => Ok(Profile::Prod),
            "test" => Ok(Profile::Test),
            other => Err(ConfigError::InvalidValue {
                key: "PETSTORE_ENV".into(),
                value: other.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: "PETSTORE_LOG_FORMAT".into(),
                value: other.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Preset for a deployment profile.
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self::default();
        match profile {
            Profile::Dev => {
                config.logging.level = "debug".into();
            }
            Profile::Prod => {
                config.server.host = "0.0.0.0".into();
                config.database.url = "ws://127.0.0.1:8000".into();
                config.logging.format = LogFormat::Json;
                config.auth.seed_default_users = false;
            }
            Profile::Test => {
                config.logging.level = "warn".into();
            }
        }
        config
    }

    /// Load from the process environment (`.env` files are expected to
    /// have been applied by the caller).
    pub fn from_env() -> Result<Self, ConfigError> {
        ConfigLoader::from_lookup(|key| std::env::var(key).ok()).load()
    }

    /// Read the JWT key files named in `auth` into PEM strings.
    pub fn resolve_keys(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = &self.auth.jwt_private_key_path {
            self.auth.jwt_private_key_pem = read_file(Path::new(path))?;
        }
        if let Some(path) = &self.auth.jwt_public_key_path {
            self.auth.jwt_public_key_pem = read_file(Path::new(path))?;
        }
        Ok(())
    }

    /// Check the settings required before serving requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".into()));
        }
        if !self.auth.has_key_material() {
            return Err(ConfigError::Validation(
                "JWT key pair missing: set auth.jwt_private_key_path and auth.jwt_public_key_path".into(),
            ));
        }
        Ok(())
    }
}

/// Builds a [`ServerConfig`] from a key lookup, normally the process
/// environment.
pub struct ConfigLoader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> ConfigLoader<F> {
    pub fn from_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    pub fn load(&self) -> Result<ServerConfig, ConfigError> {
        let profile = match self.var("PETSTORE_ENV") {
            Some(raw) => raw.parse()?,
            None => Profile::default(),
        };
        let mut config = ServerConfig::for_profile(profile);

        if let Some(path) = self.var("PETSTORE_CONFIG") {
            config = merge_file(config, Path::new(&path))?;
        }

        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn apply_overrides(&self, config: &mut ServerConfig) -> Result<(), ConfigError> {
        if let Some(host) = self.var("PETSTORE_HOST") {
            config.server.host = host;
        }
        if let Some(port) = self.var("PETSTORE_PORT") {
            config.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PETSTORE_PORT".into(),
                value: port.clone(),
            })?;
        }
        if let Some(url) = self.var("PETSTORE_DB_URL") {
            config.database.url = url;
        }
        if let Some(namespace) = self.var("PETSTORE_DB_NAMESPACE") {
            config.database.namespace = namespace;
        }
        if let Some(database) = self.var("PETSTORE_DB_DATABASE") {
            config.database.database = database;
        }
        if let Some(username) = self.var("PETSTORE_DB_USERNAME") {
            config.database.username = Some(username);
        }
        if let Some(password) = self.var("PETSTORE_DB_PASSWORD") {
            config.database.password = Some(password);
        }
        if let Some(path) = self.var("PETSTORE_JWT_PRIVATE_KEY_PATH") {
            config.auth.jwt_private_key_path = Some(path);
        }
        if let Some(path) = self.var("PETSTORE_JWT_PUBLIC_KEY_PATH") {
            config.auth.jwt_public_key_path = Some(path);
        }
        if let Some(level) = self.var("PETSTORE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = self.var("PETSTORE_LOG_FORMAT") {
            config.logging.format = format.parse()?;
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay the tables present in a TOML file onto `base`.
///
/// Keys absent from the file keep the value from `base`, so a file only
/// needs to mention what it changes.
fn merge_file(base: ServerConfig, path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = read_file(path)?;
    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let overlay: toml::Table = toml::from_str(&content).map_err(parse_err)?;
    let mut merged = match toml::Value::try_from(&base) {
        Ok(toml::Value::Table(table)) => table,
        Ok(_) => toml::Table::new(),
        Err(e) => return Err(ConfigError::Validation(e.to_string())),
    };
    merge_tables(&mut merged, overlay);

    let mut config: ServerConfig = toml::Value::Table(merged).try_into().map_err(parse_err)?;
    // Key material is never serialised; carry it across the round trip.
    config.auth.jwt_private_key_pem = base.auth.jwt_private_key_pem;
    config.auth.jwt_public_key_pem = base.auth.jwt_public_key_pem;
    Ok(config)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLoader::from_lookup(|key| vars.get(key).cloned()).load()
    }

    #[test]
    fn defaults_use_embedded_database() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.logging.level, "debug");
        assert!(config.auth.seed_default_users);
    }

    #[test]
    fn prod_profile_switches_presets() {
        let config = load(&[("PETSTORE_ENV", "prod")]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.auth.seed_default_users);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(matches!(
            load(&[("PETSTORE_ENV", "staging")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn file_overrides_profile_and_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[database]\nnamespace = \"shop\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = load(&[("PETSTORE_CONFIG", path.as_str()), ("PETSTORE_PORT", "9100")]).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.namespace, "shop");
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert!(matches!(
            load(&[("PETSTORE_CONFIG", path.as_str())]),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(matches!(
            load(&[("PETSTORE_PORT", "eighty")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn key_files_are_resolved_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let private = dir.path().join("private.pem");
        let public = dir.path().join("public.pem");
        fs::write(&private, "PRIVATE").unwrap();
        fs::write(&public, "PUBLIC").unwrap();

        let private = private.to_string_lossy().to_string();
        let public = public.to_string_lossy().to_string();
        let mut config = load(&[
            ("PETSTORE_JWT_PRIVATE_KEY_PATH", private.as_str()),
            ("PETSTORE_JWT_PUBLIC_KEY_PATH", public.as_str()),
        ])
        .unwrap();
        assert!(config.validate().is_err());

        config.resolve_keys().unwrap();
        assert_eq!(config.auth.jwt_private_key_pem, "PRIVATE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_key_file_is_a_read_error() {
        let mut config = load(&[("PETSTORE_JWT_PRIVATE_KEY_PATH", "/nonexistent/key.pem")]).unwrap();
        assert!(matches!(config.resolve_keys(), Err(ConfigError::Read { .. })));
    }
}
