//! Configuration loading for Tubescope.
//!
//! Reads `tubescope.toml` from the current directory (or the path in
//! `TUBESCOPE_CONFIG`), then lets the classic `DB_*` environment variables
//! override the database section. A `.env` file is honoured via dotenvy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TubescopeError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
}

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 3306 }
fn default_max_connections() -> u32 { 10 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            name: String::new(),
            max_connections: default_max_connections(),
            min_connections: 0,
        }
    }
}

impl DatabaseConfig {
    /// `user@host:port/name`, safe to log.
    pub fn target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }

    fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("DB_HOST") { self.host = v; }
        if let Some(v) = get("DB_USER") { self.user = v; }
        if let Some(v) = get("DB_PASSWORD") { self.password = v; }
        if let Some(v) = get("DB_NAME") { self.name = v; }
        if let Some(v) = get("DB_PORT") {
            // An unparsable port falls back to the MySQL default
            self.port = v.trim().parse().unwrap_or_else(|_| default_port());
        }
        if self.max_connections == 0 {
            return Err(TubescopeError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind() -> String { "127.0.0.1:3001".to_string() }
fn default_static_dir() -> String { "static".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), static_dir: default_static_dir() }
    }
}

impl Config {
    /// Load configuration from tubescope.toml plus environment overrides.
    /// A missing file is fine as long as the environment names a database.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var("TUBESCOPE_CONFIG")
            .unwrap_or_else(|_| "tubescope.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| TubescopeError::Config(format!("{}: {}", path, e)))?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!(path = %path, "config file not found, using defaults");
            Config::default()
        };

        config.database.apply_env(|key| std::env::var(key).ok())?;

        if config.database.name.is_empty() {
            return Err(TubescopeError::Config(
                "no database configured: set DB_NAME or [database].name".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TubescopeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_mysql_pool() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server.bind, "127.0.0.1:3001");
    }

    #[test]
    fn test_toml_sections() {
        let config = Config::from_toml(
            r#"
            [database]
            host = "db.internal"
            user = "reader"
            name = "youtube"

            [server]
            bind = "0.0.0.0:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.name, "youtube");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.static_dir, "static");
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("DB_HOST", "10.0.0.5"),
            ("DB_PORT", "not-a-port"),
            ("DB_PASSWORD", "s3cret"),
        ]
        .into_iter()
        .collect();

        let mut db = DatabaseConfig { user: "app".into(), name: "yt".into(), ..Default::default() };
        db.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(db.host, "10.0.0.5");
        assert_eq!(db.port, 3306);
        assert_eq!(db.password, "s3cret");
        assert_eq!(db.target(), "app@10.0.0.5:3306/yt");
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut db = DatabaseConfig { max_connections: 0, ..Default::default() };
        assert!(db.apply_env(|_| None).is_err());
    }

    #[test]
    fn test_target_never_contains_password() {
        let db = DatabaseConfig { user: "ro".into(), password: "pw".into(), name: "yt".into(), ..Default::default() };
        assert_eq!(db.target(), "ro@localhost:3306/yt");
    }
}
