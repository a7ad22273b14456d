use serde::{Deserialize, Serialize};

/// Пользователь, которого провайдер входа записал в сессию.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.email)
    }
}
