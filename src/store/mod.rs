//! Хранилище записей сайта.
//!
//! Каждая коллекция (события, площадки, учебные группы) живёт в одном
//! фиксированном разделе, и все запросы ограничены этим разделом.
//! Записи неизменяемы: есть только создание, выборка последних и поиск по полю.

pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::database::Database;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Логическая коллекция записей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Locations,
    LearnEvents,
}

impl Collection {
    pub fn kind(self) -> &'static str {
        match self {
            Collection::Events => "Events",
            Collection::Locations => "Locations",
            Collection::LearnEvents => "LearnEvent",
        }
    }

    /// Один раздел на коллекцию, общий для всех её записей.
    pub fn partition_key(self) -> &'static str {
        match self {
            Collection::Events => "default_eventlist",
            Collection::Locations => "default_locationlist",
            Collection::LearnEvents => "default_learneventlist",
        }
    }
}

/// Ключ, выданный хранилищем при создании записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredKey {
    pub collection: Collection,
    pub id: i64,
}

/// Сортировка по строковому значению поля. Для `datetime` это работает
/// только потому, что формат ISO с ведущими нулями.
#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub field: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn desc(field: &'static str) -> Self {
        Order { field, descending: true }
    }
}

#[derive(Clone)]
pub enum RecordStore {
    Postgres(Database),
    Memory(MemoryStore),
}

impl RecordStore {
    pub fn memory() -> Self {
        RecordStore::Memory(MemoryStore::default())
    }

    /// Stores the record as is under the collection partition. No dedup and
    /// no check against existing identifiers.
    pub async fn create<T: Serialize>(
        &self,
        collection: Collection,
        record: &T,
    ) -> Result<StoredKey, StoreError> {
        let payload = serde_json::to_value(record)?;
        let id = match self {
            RecordStore::Postgres(db) => db.insert_record(collection, &payload).await?,
            RecordStore::Memory(mem) => mem.insert(collection, payload)?,
        };
        Ok(StoredKey { collection, id })
    }

    /// Up to `limit` records of the partition, ordered by `order` or by
    /// creation when no order is given.
    pub async fn list_recent<T: DeserializeOwned>(
        &self,
        collection: Collection,
        order: Option<Order>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let payloads = match self {
            RecordStore::Postgres(db) => db.list_records(collection, order, limit).await?,
            RecordStore::Memory(mem) => mem.list(collection, order, limit)?,
        };
        decode_all(payloads)
    }

    /// Equality lookup on a payload field. The whole result set is walked and
    /// the last match is returned when several records share the value.
    pub async fn find_by_field<T: DeserializeOwned>(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let found = match self {
            RecordStore::Postgres(db) => db.find_last_record(collection, field, value).await?,
            RecordStore::Memory(mem) => mem.find_last(collection, field, value)?,
        };
        found.map(serde_json::from_value::<T>).transpose().map_err(StoreError::from)
    }
}

fn decode_all<T: DeserializeOwned>(payloads: Vec<Value>) -> Result<Vec<T>, StoreError> {
    payloads
        .into_iter()
        .map(|payload| serde_json::from_value(payload).map_err(StoreError::from))
        .collect()
}

/// Строковое представление поля для сортировки и сравнения,
/// как `payload->>'field'` в Postgres.
pub(crate) fn field_text(payload: &Value, field: &str) -> Option<String> {
    match payload.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Location};

    fn event(title: &str, datetime: &str) -> Event {
        Event {
            id: crate::utils::derive_id(title),
            title: title.to_string(),
            datetime: datetime.to_string(),
            loc_id: "library".to_string(),
            google_plus: "https://plus.google.com/events/1".to_string(),
            details: "bring a laptop".to_string(),
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_bounded() {
        let store = RecordStore::memory();
        for day in 1..=15 {
            let e = event(&format!("Meetup {day}"), &format!("2015-03-{day:02}T18:30"));
            store.create(Collection::Events, &e).await.unwrap();
        }

        let events: Vec<Event> = store
            .list_recent(Collection::Events, Some(Order::desc("datetime")), Some(10))
            .await
            .unwrap();

        assert_eq!(events.len(), 10);
        assert_eq!(events[0].datetime, "2015-03-15T18:30");
        assert_eq!(events[9].datetime, "2015-03-06T18:30");
    }

    #[tokio::test]
    async fn collections_do_not_leak_into_each_other() {
        let store = RecordStore::memory();
        store.create(Collection::Events, &event("Go Night", "2015-03-04T18:30")).await.unwrap();
        let loc = Location {
            id: "go-night".to_string(),
            name: "Go Night".to_string(),
            ..Location::default()
        };
        store.create(Collection::Locations, &loc).await.unwrap();

        let locations: Vec<Location> =
            store.list_recent(Collection::Locations, None, None).await.unwrap();
        assert_eq!(locations, vec![loc]);

        let found: Option<Event> =
            store.find_by_field(Collection::Events, "id", "go-night").await.unwrap();
        assert_eq!(found.unwrap().title, "Go Night");
    }

    #[tokio::test]
    async fn duplicate_identifiers_resolve_to_last_created() {
        let store = RecordStore::memory();
        let first = event("Go Night", "2015-03-04T18:30");
        let mut second = event("go night", "2015-04-01T18:30");
        second.details = "second one".to_string();
        store.create(Collection::Events, &first).await.unwrap();
        store.create(Collection::Events, &second).await.unwrap();

        let found: Option<Event> =
            store.find_by_field(Collection::Events, "id", "go-night").await.unwrap();
        assert_eq!(found.unwrap().details, "second one");
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let store = RecordStore::memory();
        let found: Option<Event> =
            store.find_by_field(Collection::Events, "id", "nope").await.unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn field_text_matches_postgres_text_extraction() {
        let payload = serde_json::json!({"title": "Go", "count": 3, "gone": null});
        assert_eq!(field_text(&payload, "title").as_deref(), Some("Go"));
        assert_eq!(field_text(&payload, "count").as_deref(), Some("3"));
        assert_eq!(field_text(&payload, "gone"), None);
        assert_eq!(field_text(&payload, "missing"), None);
    }
}
