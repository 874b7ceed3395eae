//! TOML-based configuration for Draco
//!
//! Server, authentication and database settings are read once at startup
//! from `draco.toml`. The signing secret itself never lives in the file: the
//! `[auth]` section names the environment variable that holds it.
//!
//! There is no hot reloading. Every token in a process is signed and checked
//! with the same secret, so the configuration is fixed for the process
//! lifetime.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum accepted signing secret length, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted session token validity: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Root configuration structure loaded from draco.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DracoConfig {
    /// `[server]` section
    #[serde(default)]
    pub server: ServerConfig,
    /// `[auth]` section
    #[serde(default)]
    pub auth: AuthConfig,
    /// `[database]` section
    #[serde(default)]
    pub database: DatabaseConfig,
}

// ============= Server Configuration =============

/// HTTP listener and logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:8080".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_origins: default_cors_origins(),
        }
    }
}

// ============= Authentication Configuration =============

/// Session token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Session token validity in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

fn default_jwt_secret_env() -> String {
    "DRACO_JWT_SECRET".to_string()
}

fn default_token_ttl() -> i64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

// ============= Database Configuration =============

/// Storage backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/draco.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config path does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The config file could not be read.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A setting is out of range.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A referenced environment variable is unset.
    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    /// The signing secret is too short.
    #[error("Secret in '{0}' must be at least {min} bytes", min = MIN_SECRET_LEN)]
    WeakSecret(String),
}

impl DracoConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: DracoConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate settings and the availability of the signing secret
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_secs <= 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        if self.server.cors_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "server.cors_origins must not contain empty entries".to_string(),
            ));
        }

        self.jwt_secret()?;

        if let Some(ref env) = self.database.turso_url_env {
            self.validate_env_var(env)?;
        }
        if let Some(ref env) = self.database.turso_token_env {
            self.validate_env_var(env)?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get the JWT signing secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        let env = &self.auth.jwt_secret_env;
        let secret = std::env::var(env).map_err(|_| ConfigError::MissingEnvVar(env.clone()))?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret(env.clone()));
        }

        Ok(secret)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(secret_env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 8081
log_level = "debug"
cors_origins = ["http://localhost:8080", "https://play.example.com"]

[auth]
jwt_secret_env = "{}"
token_ttl_secs = 900

[database]
url = ":memory:"
"#,
            secret_env
        )
    }

    fn set_env(name: &str, value: &str) {
        // SAFETY: every test uses its own variable name
        unsafe {
            std::env::set_var(name, value);
        }
    }

    #[test]
    fn test_parse_config() {
        let config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_PARSE_SECRET")).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.auth.token_ttl_secs, 900);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
    }

    #[test]
    fn test_defaults() {
        let config: DracoConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:8080"]);
        assert_eq!(config.auth.jwt_secret_env, "DRACO_JWT_SECRET");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.database.url, "./data/draco.db");
    }

    #[test]
    fn test_validation_missing_secret() {
        let config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_UNSET_SECRET")).unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn test_validation_weak_secret() {
        set_env("TOML_TEST_WEAK_SECRET", "too-short");
        let config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_WEAK_SECRET")).unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::WeakSecret(_))));
    }

    #[test]
    fn test_validation_non_positive_ttl() {
        set_env("TOML_TEST_TTL_SECRET", "test-secret-at-least-32-characters-long");
        let mut config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_TTL_SECRET")).unwrap();
        config.auth.token_ttl_secs = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_ttl_above_one_year() {
        set_env("TOML_TEST_LONG_TTL_SECRET", "test-secret-at-least-32-characters-long");
        let mut config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_LONG_TTL_SECRET")).unwrap();

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_secs = 10_000_000_000_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_weak_secret_message_names_minimum() {
        let err = ConfigError::WeakSecret("DRACO_JWT_SECRET".to_string());
        assert_eq!(
            err.to_string(),
            "Secret in 'DRACO_JWT_SECRET' must be at least 32 bytes"
        );
    }

    #[test]
    fn test_valid_config_exposes_secret() {
        set_env("TOML_TEST_GOOD_SECRET", "test-secret-at-least-32-characters-long");
        let config: DracoConfig =
            toml::from_str(&create_test_config("TOML_TEST_GOOD_SECRET")).unwrap();

        config.validate().expect("config should be valid");
        assert_eq!(
            config.jwt_secret().unwrap(),
            "test-secret-at-least-32-characters-long"
        );
    }
}
