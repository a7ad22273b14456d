use serde::{Deserialize, Serialize};

/// Событие группы. `datetime` хранится так, как прислал браузер
/// (`YYYY-MM-DDTHH:MM`), и переформатируется только при выводе.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub datetime: String,
    pub loc_id: String,
    pub google_plus: String,
    pub details: String,
}
