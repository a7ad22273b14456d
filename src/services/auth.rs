//! auth.rs
//!
//! Проверка входа для админских страниц.
//!
//! Сами сессии создаёт внешний провайдер входа: после успешного входа он
//! кладёт JSON пользователя в общее хранилище сессий и выставляет cookie.
//! Сайт сессии только читает, а анонимных пользователей отправляет на
//! страницу входа провайдера с адресом возврата.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::warn;

use crate::{config::AuthConfig, models::User, redis_client::RedisClient};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login URL is not configured")]
    LoginUrlMissing,

    #[error("failed to encode login return path: {0}")]
    ReturnPath(#[from] serde_urlencoded::ser::Error),

    #[error("session store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("in-memory session store lock poisoned")]
    Poisoned,
}

/// Сессии в памяти процесса: локальная разработка и тесты.
#[derive(Clone, Default)]
pub struct MemorySessions(Arc<RwLock<HashMap<String, User>>>);

impl MemorySessions {
    pub fn insert(&self, token: impl Into<String>, user: User) -> Result<(), AuthError> {
        self.0
            .write()
            .map_err(|_| AuthError::Poisoned)?
            .insert(token.into(), user);
        Ok(())
    }

    fn get(&self, token: &str) -> Result<Option<User>, AuthError> {
        let sessions = self.0.read().map_err(|_| AuthError::Poisoned)?;
        Ok(sessions.get(token).cloned())
    }
}

/// Откуда читаются сессии. В Redis их пишет только провайдер входа.
#[derive(Clone)]
pub enum SessionStore {
    Redis(RedisClient),
    Memory(MemorySessions),
}

impl SessionStore {
    pub fn memory() -> Self {
        SessionStore::Memory(MemorySessions::default())
    }

    pub async fn lookup(&self, token: &str) -> Result<Option<User>, AuthError> {
        match self {
            SessionStore::Redis(redis) => {
                let Some(data) = redis.get_session(token).await? else {
                    return Ok(None);
                };
                // Битая сессия = нет сессии, пусть пользователь войдёт заново
                match serde_json::from_str(&data) {
                    Ok(user) => Ok(Some(user)),
                    Err(e) => {
                        warn!("Ignoring malformed session payload: {}", e);
                        Ok(None)
                    }
                }
            }
            SessionStore::Memory(sessions) => sessions.get(token),
        }
    }
}

#[derive(Clone)]
pub struct AuthGate {
    login_url: String,
    cookie_name: String,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn new(config: &AuthConfig, sessions: SessionStore) -> Self {
        Self {
            login_url: config.login_url.clone(),
            cookie_name: config.session_cookie.clone(),
            sessions,
        }
    }

    /// Текущий пользователь по cookie сессии; `None` для анонимов.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<User>, AuthError> {
        match session_token(headers, &self.cookie_name) {
            Some(token) => self.sessions.lookup(token).await,
            None => Ok(None),
        }
    }

    /// Адрес страницы входа провайдера с возвратом на `return_path`.
    pub fn login_redirect_url(&self, return_path: &str) -> Result<String, AuthError> {
        if self.login_url.is_empty() {
            return Err(AuthError::LoginUrlMissing);
        }
        let query = serde_urlencoded::to_string([("continue", return_path)])?;
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", self.login_url, separator, query))
    }
}

fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}
