use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных. Без DATABASE_URL записи хранятся в памяти.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки Redis (хранилище сессий провайдера входа)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
}

// Настройки авторизации
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub login_url: String,
    pub session_cookie: String,
    pub dev_session_token: Option<String>,
    pub dev_session_email: Option<String>,
}

// Настройки страниц и статики
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub static_dir: String,
    pub template_dir: Option<String>,
    pub list_limit: usize,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_learning: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "8000", "port number")?,
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "gigcity=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: optional_var("DATABASE_URL"),
                pool_size: parse_var("DB_POOL_SIZE", "20", "number")?,
            },
            redis: RedisConfig {
                url: optional_var("REDIS_URL"),
            },
            auth: AuthConfig {
                login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/_ah/login".to_string()),
                session_cookie: env::var("SESSION_COOKIE")
                    .unwrap_or_else(|_| "gigcity_session".to_string()),
                dev_session_token: optional_var("DEV_SESSION_TOKEN"),
                dev_session_email: optional_var("DEV_SESSION_EMAIL"),
            },
            site: SiteConfig {
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
                template_dir: optional_var("TEMPLATE_DIR"),
                list_limit: parse_var("LIST_LIMIT", "10", "number")?,
            },
            features: FeatureFlags {
                enable_learning: parse_var("ENABLE_LEARNING", "true", "boolean")?,
            },
        })
    }
}

impl Default for Config {
    /// Локальная конфигурация без внешних сервисов: записи и сессии в памяти.
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "gigcity=debug,tower_http=debug".to_string(),
            },
            database: DatabaseConfig { url: None, pool_size: 20 },
            redis: RedisConfig { url: None },
            auth: AuthConfig {
                login_url: "/_ah/login".to_string(),
                session_cookie: "gigcity_session".to_string(),
                dev_session_token: None,
                dev_session_email: None,
            },
            site: SiteConfig {
                static_dir: "static".to_string(),
                template_dir: None,
                list_limit: 10,
            },
            features: FeatureFlags { enable_learning: true },
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_number_names_the_variable() {
        env::set_var("GIGCITY_TEST_PORT", "abc");
        let err = parse_var::<u16>("GIGCITY_TEST_PORT", "8000", "port number").unwrap_err();
        assert_eq!(
            err.to_string(),
            "GIGCITY_TEST_PORT must be a valid port number, got \"abc\""
        );
    }

    #[test]
    fn missing_variable_falls_back_to_default() {
        let limit: usize = parse_var("GIGCITY_TEST_UNSET_LIMIT", "10", "number").unwrap();
        assert_eq!(limit, 10);
    }

    #[test]
    fn default_config_lists_ten_records() {
        let config = Config::default();
        assert_eq!(config.site.list_limit, 10);
        assert!(config.database.url.is_none());
        assert!(config.features.enable_learning);
    }
}
