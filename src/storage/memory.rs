//! In-memory store for local runs and tests.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Attributes, ItemKey, Table};
use crate::storage::{InsertOutcome, RecordStore};

type Items = BTreeMap<(Table, ItemKey), Attributes>;

/// Store holding items in a map, with optional per-key write failures.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Items>,
    failing: Mutex<HashSet<ItemKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `key` fail with a store error.
    pub async fn fail_writes_for(&self, key: ItemKey) {
        self.failing.lock().await.insert(key);
    }

    /// Attributes stored under `key`, if any.
    pub async fn get(&self, table: Table, key: &ItemKey) -> Option<Attributes> {
        self.items.lock().await.get(&(table, key.clone())).cloned()
    }

    /// All keys present in `table`, sorted.
    pub async fn keys(&self, table: Table) -> Vec<ItemKey> {
        self.items
            .lock()
            .await
            .keys()
            .filter(|(t, _)| *t == table)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    async fn check_failure(&self, key: &ItemKey) -> Result<()> {
        if self.failing.lock().await.contains(key) {
            return Err(AppError::store(format!("injected write failure for {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_if_absent(
        &self,
        table: Table,
        key: &ItemKey,
        attributes: &Attributes,
    ) -> Result<InsertOutcome> {
        self.check_failure(key).await?;

        let mut items = self.items.lock().await;
        let slot = (table, key.clone());
        if items.contains_key(&slot) {
            return Ok(InsertOutcome::Duplicate);
        }
        items.insert(slot, attributes.clone());
        Ok(InsertOutcome::Created)
    }

    async fn merge(&self, table: Table, key: &ItemKey, attributes: &Attributes) -> Result<()> {
        self.check_failure(key).await?;

        let mut items = self.items.lock().await;
        let existing = items
            .get_mut(&(table, key.clone()))
            .ok_or_else(|| AppError::MergeNotFound {
                table: table.to_string(),
                provider: key.provider.clone(),
                id: key.id.clone(),
            })?;
        for (name, value) in attributes {
            existing.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Attribute::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_is_guarded_by_existence() {
        let store = MemoryStore::new();
        let key = ItemKey::new("asura", "alpha");

        let first = store
            .insert_if_absent(Table::Series, &key, &attrs(&[("SeriesTitle", "Alpha")]))
            .await
            .unwrap();
        let second = store
            .insert_if_absent(Table::Series, &key, &attrs(&[("SeriesTitle", "Changed")]))
            .await
            .unwrap();

        assert_eq!(first, InsertOutcome::Created);
        assert_eq!(second, InsertOutcome::Duplicate);
        let stored = store.get(Table::Series, &key).await.unwrap();
        assert_eq!(stored["SeriesTitle"], Attribute::from("Alpha"));
    }

    #[tokio::test]
    async fn test_same_id_in_different_tables_is_independent() {
        let store = MemoryStore::new();
        let key = ItemKey::new("asura", "alpha");
        let empty = Attributes::new();

        store.insert_if_absent(Table::Series, &key, &empty).await.unwrap();
        let outcome = store
            .insert_if_absent(Table::Chapters, &key, &empty)
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Created);
    }

    #[tokio::test]
    async fn test_merge_overwrites_only_given_attributes() {
        let store = MemoryStore::new();
        let key = ItemKey::new("asura", "alpha");
        store
            .insert_if_absent(
                Table::Series,
                &key,
                &attrs(&[("SeriesTitle", "Alpha"), ("ScrapeDate", "old")]),
            )
            .await
            .unwrap();

        store
            .merge(
                Table::Series,
                &key,
                &attrs(&[("SeriesCover", "c.jpg"), ("ScrapeDate", "new")]),
            )
            .await
            .unwrap();

        let stored = store.get(Table::Series, &key).await.unwrap();
        assert_eq!(stored["SeriesTitle"], Attribute::from("Alpha"));
        assert_eq!(stored["SeriesCover"], Attribute::from("c.jpg"));
        assert_eq!(stored["ScrapeDate"], Attribute::from("new"));
    }

    #[tokio::test]
    async fn test_merge_missing_key_never_inserts() {
        let store = MemoryStore::new();
        let key = ItemKey::new("asura", "ghost");

        let err = store
            .merge(Table::Series, &key, &attrs(&[("SeriesCover", "c.jpg")]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MergeNotFound { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new();
        let key = ItemKey::new("asura", "broken");
        store.fail_writes_for(key.clone()).await;

        let err = store
            .insert_if_absent(Table::Series, &key, &Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
