/*
 * Responsibility
 * - 環境変数の読み込み (PORT, JWT_SECRET, DATABASE_URL, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 読み込みは起動時の一度だけ。以降は read-only
 */
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::services::password::{MAX_HASH_COST, MIN_HASH_COST};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn default_port(&self) -> u16 {
        if self.is_production() { 80 } else { 8000 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // None -> in-memory user store
    pub database_url: Option<String>,

    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub password_hash_cost: u32,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the signing secret or the database credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let app_env = AppEnv::from_env();

        let port: u16 = match std::env::var("PORT") {
            Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => app_env.default_port(),
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let access_token_ttl_seconds =
            access_token_ttl(env_u64("ACCESS_TOKEN_TTL_SECONDS", 7 * 24 * 60 * 60)?)?; // 7 days
        let access_token_leeway_seconds = env_u64("ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let password_hash_cost = match std::env::var("PASSWORD_HASH_COST") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|c| (MIN_HASH_COST..=MAX_HASH_COST).contains(c))
                .ok_or(ConfigError::Invalid("PASSWORD_HASH_COST"))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let request_timeout = Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECONDS", 30)?);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            jwt_secret,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            password_hash_cost,
            request_timeout,
        })
    }
}

// One year.
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

fn access_token_ttl(seconds: u64) -> Result<u64, ConfigError> {
    if seconds == 0 || seconds > MAX_ACCESS_TOKEN_TTL_SECONDS {
        return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
    }
    Ok(seconds)
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}
