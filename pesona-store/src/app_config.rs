use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Secret material and per-scope cookie settings for the session authority.
/// The two scopes keep independent cookies and lifetimes.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    #[serde(default = "default_admin_cookie")]
    pub admin_cookie_name: String,
    #[serde(default = "default_user_cookie")]
    pub user_cookie_name: String,
    // Admin sessions run one working day, user sessions a week.
    #[serde(default = "default_admin_max_age")]
    pub admin_max_age_seconds: u64,
    #[serde(default = "default_user_max_age")]
    pub user_max_age_seconds: u64,
}

fn default_admin_cookie() -> String {
    "admin-session-token".to_string()
}

fn default_user_cookie() -> String {
    "user-session-token".to_string()
}

fn default_admin_max_age() -> u64 {
    3600 * 8
}

fn default_user_max_age() -> u64 {
    86400 * 7
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PESONA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
