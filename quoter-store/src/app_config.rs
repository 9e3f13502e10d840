use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limits: RateLimits,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a URL the ledger and user accounts live in memory
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_jwt_expiration() -> u64 { 7 * 24 * 60 * 60 }
fn default_bcrypt_cost() -> u32 { 12 }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: u64,
    pub window_seconds: u64,
}

impl RateLimitRule {
    pub const fn new(limit: u64, window_seconds: u64) -> Self {
        Self { limit, window_seconds }
    }
}

/// Per-scope request budgets. Routes without a scope of their own are
/// checked against every `default` rule.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimits {
    pub calculate: RateLimitRule,
    pub auth: RateLimitRule,
    pub history: RateLimitRule,
    pub export: RateLimitRule,
    pub default: Vec<RateLimitRule>,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            calculate: RateLimitRule::new(10, 60),
            auth: RateLimitRule::new(5, 60),
            history: RateLimitRule::new(30, 60),
            export: RateLimitRule::new(5, 60),
            default: vec![RateLimitRule::new(50, 3600), RateLimitRule::new(200, 86400)],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `QUOTER__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("QUOTER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
