use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use super::{field_text, Collection, Order, StoreError};

/// Хранилище в памяти процесса: для локальной разработки без Postgres и для тестов.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<Row>,
}

struct Row {
    kind: &'static str,
    partition_key: &'static str,
    payload: Value,
}

impl Row {
    fn belongs_to(&self, collection: Collection) -> bool {
        self.kind == collection.kind() && self.partition_key == collection.partition_key()
    }
}

impl MemoryStore {
    pub fn insert(&self, collection: Collection, payload: Value) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(Row {
            kind: collection.kind(),
            partition_key: collection.partition_key(),
            payload,
        });
        Ok(id)
    }

    pub fn list(
        &self,
        collection: Collection,
        order: Option<Order>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut rows: Vec<&Row> = inner.rows.iter().filter(|r| r.belongs_to(collection)).collect();

        // Стабильная сортировка: при равных значениях порядок вставки (как `, id` в SQL).
        // Записи без поля идут в конец в обе стороны, как `NULLS LAST`.
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                match (field_text(&a.payload, order.field), field_text(&b.payload, order.field)) {
                    (Some(a), Some(b)) if order.descending => b.cmp(&a),
                    (Some(a), Some(b)) => a.cmp(&b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        Ok(rows
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|r| r.payload.clone())
            .collect())
    }

    pub fn find_last(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut found = None;
        for row in inner.rows.iter().filter(|r| r.belongs_to(collection)) {
            if field_text(&row.payload, field).as_deref() == Some(value) {
                found = Some(row.payload.clone());
            }
        }
        Ok(found)
    }

    /// Количество записей коллекции.
    pub fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.iter().filter(|r| r.belongs_to(collection)).count())
    }

    /// Отравляет блокировку: все следующие вызовы вернут `StoreError::Poisoned`.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.write();
            panic!("poisoning the in-memory store");
        })
        .join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_assigned_in_order() {
        let store = MemoryStore::default();
        let a = store.insert(Collection::Events, json!({"id": "a"})).unwrap();
        let b = store.insert(Collection::Locations, json!({"id": "b"})).unwrap();
        let c = store.insert(Collection::Events, json!({"id": "c"})).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(store.count(Collection::Events).unwrap(), 2);
    }

    #[test]
    fn records_without_the_sort_field_come_last() {
        let store = MemoryStore::default();
        store.insert(Collection::Events, json!({"id": "undated"})).unwrap();
        store.insert(Collection::Events, json!({"id": "old", "datetime": "2015-01-01T10:00"})).unwrap();
        store.insert(Collection::Events, json!({"id": "new", "datetime": "2015-02-01T10:00"})).unwrap();

        let ids = |descending: bool| -> Vec<Value> {
            let order = Order { field: "datetime", descending };
            store
                .list(Collection::Events, Some(order), None)
                .unwrap()
                .into_iter()
                .map(|v| v["id"].clone())
                .collect()
        };
        assert_eq!(ids(true), vec![json!("new"), json!("old"), json!("undated")]);
        assert_eq!(ids(false), vec![json!("old"), json!("new"), json!("undated")]);
    }

    #[test]
    fn poisoned_store_reports_an_error() {
        let store = MemoryStore::default();
        store.poison();
        assert!(matches!(
            store.insert(Collection::Events, json!({"id": "a"})),
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(store.list(Collection::Events, None, None), Err(StoreError::Poisoned)));
    }

    #[test]
    fn ascending_order_and_no_limit() {
        let store = MemoryStore::default();
        for name in ["c", "a", "b"] {
            store.insert(Collection::Locations, json!({ "name": name })).unwrap();
        }
        let order = Order { field: "name", descending: false };
        let names: Vec<Value> = store.list(Collection::Locations, Some(order), None).unwrap();
        assert_eq!(names, vec![json!({"name": "a"}), json!({"name": "b"}), json!({"name": "c"})]);
    }

    #[test]
    fn unordered_listing_keeps_insertion_order() {
        let store = MemoryStore::default();
        for name in ["c", "a", "b"] {
            store.insert(Collection::Locations, json!({ "name": name })).unwrap();
        }
        let listed = store.list(Collection::Locations, None, Some(2)).unwrap();
        assert_eq!(listed, vec![json!({"name": "c"}), json!({"name": "a"})]);
    }
}
