use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8400;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (flatmate.toml + FLATMATE_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatmateConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for FlatmateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Bot-token signing secret. Must be set before the gateway will start.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub secret: String,
}

/// Quotas enforced by the registry and rotation managers. Passed down
/// explicitly at construction — there is no global settings lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Pending invitations per sender.
    #[serde(default = "default_quota")]
    pub max_invitations: u32,
    /// Orders per room.
    #[serde(default = "default_quota")]
    pub max_orders: u32,
    /// Tasks per room, counted separately for periodic and manual tasks.
    #[serde(default = "default_quota")]
    pub max_tasks: u32,
    /// Days until a pending invitation expires.
    #[serde(default = "default_invitation_lifespan")]
    pub invitation_lifespan_days: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_invitations: default_quota(),
            max_orders: default_quota(),
            max_tasks: default_quota(),
            invitation_lifespan_days: default_invitation_lifespan(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.flatmate/flatmate.db", home)
}
fn default_quota() -> u32 {
    50
}
fn default_invitation_lifespan() -> i64 {
    7
}

impl FlatmateConfig {
    /// Load config from a TOML file with FLATMATE_* env var overrides.
    ///
    /// Env vars use `__` as the section separator so snake_case field names
    /// survive the split: `FLATMATE_LIMITS__MAX_TASKS` maps to
    /// `limits.max_tasks`.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.flatmate/flatmate.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: FlatmateConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("FLATMATE_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.flatmate/flatmate.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = FlatmateConfig::default();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.limits.max_orders, 50);
        assert_eq!(cfg.limits.invitation_lifespan_days, 7);
        assert!(cfg.auth.secret.is_empty());
    }

    #[test]
    fn toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "flatmate.toml",
                r#"
                [server]
                port = 9000

                [auth]
                secret = "s3cret"

                [limits]
                max_tasks = 3
                "#,
            )?;
            let cfg = FlatmateConfig::load(Some("flatmate.toml")).expect("load");
            assert_eq!(cfg.server.port, 9000);
            assert_eq!(cfg.auth.secret, "s3cret");
            assert_eq!(cfg.limits.max_tasks, 3);
            // untouched sections keep defaults
            assert_eq!(cfg.limits.max_orders, 50);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_snake_case_fields() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FLATMATE_AUTH__SECRET", "from-env");
            jail.set_env("FLATMATE_LIMITS__MAX_TASKS", "3");
            jail.set_env("FLATMATE_LIMITS__INVITATION_LIFESPAN_DAYS", "14");
            let cfg = FlatmateConfig::load(Some("missing.toml")).expect("load");
            assert_eq!(cfg.auth.secret, "from-env");
            assert_eq!(cfg.limits.max_tasks, 3);
            assert_eq!(cfg.limits.invitation_lifespan_days, 14);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_beat_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "flatmate.toml",
                r#"
                [server]
                port = 9000
                "#,
            )?;
            jail.set_env("FLATMATE_SERVER__PORT", "9100");
            let cfg = FlatmateConfig::load(Some("flatmate.toml")).expect("load");
            assert_eq!(cfg.server.port, 9100);
            Ok(())
        });
    }
}
