//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/hr-admin/config.toml`,
//! overridable with `HR_ADMIN_CONFIG`). Every section and field has a
//! default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::InfraError;

/// Environment variable that points to an alternative config file.
pub const CONFIG_ENV_VAR: &str = "HR_ADMIN_CONFIG";

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hr-admin")
        .join("config.toml")
}

/// Config path from `HR_ADMIN_CONFIG`, falling back to [`default_config_path`].
pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./hr_admin.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    /// Initial password for accounts created by an administrator.
    ///
    /// A shared fixed password is a known weak spot: users are expected to
    /// change it through `change-password` right after first login.
    pub default_user_password: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "super-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            default_user_password: "Password123#".to_string(),
        }
    }
}

/// Bootstrap administrator, created when the users table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let cfg: Self = toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), InfraError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(InfraError::Config("security.jwt_secret must not be empty".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(InfraError::Config(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(InfraError::Config(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(InfraError::Config(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.api_port, 8080);
        assert_eq!(cfg.security.default_user_password, "Password123#");
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9999

            [security]
            bcrypt_cost = 6
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 9999);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.security.bcrypt_cost, 6);
        assert_eq!(cfg.security.jwt_expiration_hours, 24);
    }

    #[test]
    fn out_of_range_bcrypt_cost_is_rejected() {
        let err = AppConfig::from_toml("[security]\nbcrypt_cost = 2\n").unwrap_err();
        assert!(err.to_string().contains("bcrypt_cost"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            AppConfig::from_toml("[server\napi_port = 1"),
            Err(InfraError::Config(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(cfg.database.max_connections, 10);
    }
}
