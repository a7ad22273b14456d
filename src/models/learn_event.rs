use serde::{Deserialize, Serialize};

/// Встреча учебной группы.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnEvent {
    pub id: String,
    pub title: String,
    pub datetime: String,
    pub loc_id: String,
    pub details: String,
}
