//! Record storage backends.
//!
//! [`RecordStore`] abstracts the managed backend the CRM persists records
//! in. Stores know nothing about principals or policy: authorization is the
//! job of [`CrudService`](crate::service::CrudService), which consults the
//! access policy before it asks a store to mutate anything.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use stationery_acl::{Record, TenantId};
use stationery_core::{Error, Result};

use crate::models::Identified;

/// Abstraction over record backends.
///
/// Records are keyed by `(tenant_id, id)`: two tenants may use the same id
/// without either being able to observe the other's record.
#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Identified + Clone + Send + Sync + 'static,
{
    /// All records of every tenant, in insertion order.
    async fn list(&self) -> Result<Vec<Record<T>>>;

    /// The tenant's record with the given id, if any.
    async fn get(&self, tenant: &TenantId, id: &str) -> Result<Option<Record<T>>>;

    /// Add a new record.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidData`] if the record's tenant already has
    /// a record with that id.
    async fn insert(&self, record: Record<T>) -> Result<()>;

    /// Replace the stored version of `record`.
    ///
    /// The stored record must have the same tenant, id and creation time;
    /// a record that was deleted and re-created in the meantime is not
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if no such record is stored.
    async fn replace(&self, record: Record<T>) -> Result<()>;

    /// Remove and return the tenant's record with the given id, if any.
    async fn remove(&self, tenant: &TenantId, id: &str) -> Result<Option<Record<T>>>;
}

fn is_key<T: Identified>(record: &Record<T>, tenant: &TenantId, id: &str) -> bool {
    &record.tenant_id == tenant && record.data.id() == id
}

/// In-memory store backed by a vector behind an async lock.
///
/// Cloning is cheap and clones share the same records.
#[derive(Debug)]
pub struct MemoryStore<T> {
    records: Arc<RwLock<Vec<Record<T>>>>,
}

impl<T> MemoryStore<T> {
    /// An empty store.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// A store seeded with records.
    pub fn with_records(records: Vec<Record<T>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<Record<T>>> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, tenant: &TenantId, id: &str) -> Result<Option<Record<T>>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| is_key(r, tenant, id)).cloned())
    }

    async fn insert(&self, record: Record<T>) -> Result<()> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| is_key(r, &record.tenant_id, record.data.id()))
        {
            return Err(Error::invalid_data(format!(
                "{} '{}' already exists",
                T::KIND,
                record.data.id()
            )));
        }
        records.push(record);
        Ok(())
    }

    async fn replace(&self, record: Record<T>) -> Result<()> {
        let mut records = self.records.write().await;
        let slot = records.iter_mut().find(|r| {
            is_key(r, &record.tenant_id, record.data.id()) && r.created_at == record.created_at
        });
        match slot {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(Error::not_found(format!(
                "{} '{}'",
                T::KIND,
                record.data.id()
            ))),
        }
    }

    async fn remove(&self, tenant: &TenantId, id: &str) -> Result<Option<Record<T>>> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|r| is_key(r, tenant, id));
        Ok(position.map(|index| records.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use chrono::Utc;

    fn record(id: &str, tenant: &str) -> Record<Product> {
        let mut p = Product::new(format!("Product {id}"), "Pens", 10.0);
        p.id = id.to_string();
        Record::new(tenant, None, Utc::now(), p)
    }

    #[tokio::test]
    async fn test_insert_and_list_in_order() {
        let store = MemoryStore::new();
        store.insert(record("b", "t1")).await.unwrap();
        store.insert(record("a", "t2")).await.unwrap();
        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.data.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.len().await, 2);
    }

    fn t(tenant: &str) -> TenantId {
        TenantId::new(tenant)
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected_within_tenant() {
        let store = MemoryStore::with_records(vec![record("p1", "t1")]);
        let err = store.insert(record("p1", "t1")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_same_id_in_two_tenants() {
        let store = MemoryStore::with_records(vec![record("p1", "t1")]);
        store.insert(record("p1", "t2")).await.unwrap();
        assert_eq!(store.len().await, 2);

        let removed = store.remove(&t("t2"), "p1").await.unwrap().unwrap();
        assert_eq!(removed.tenant_id, t("t2"));
        assert!(store.get(&t("t1"), "p1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_and_remove() {
        let store = MemoryStore::with_records(vec![record("p1", "t1"), record("p2", "t1")]);
        assert!(store.get(&t("t1"), "p2").await.unwrap().is_some());
        assert!(store.get(&t("t2"), "p2").await.unwrap().is_none());
        assert!(store.get(&t("t1"), "nope").await.unwrap().is_none());

        assert!(store.remove(&t("t2"), "p1").await.unwrap().is_none());
        let removed = store.remove(&t("t1"), "p1").await.unwrap().unwrap();
        assert_eq!(removed.data.id, "p1");
        assert!(store.remove(&t("t1"), "p1").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_replace() {
        let original = record("p1", "t1");
        let store = MemoryStore::with_records(vec![original.clone()]);
        let mut changed = original.clone();
        changed.data.price = 99.0;
        store.replace(changed).await.unwrap();
        let stored = store.get(&t("t1"), "p1").await.unwrap().unwrap();
        assert_eq!(stored.data.price, 99.0);

        let err = store.replace(record("zz", "t1")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_replace_never_crosses_tenants() {
        let theirs = record("x", "t2");
        let store = MemoryStore::with_records(vec![theirs.clone()]);

        let mut mine = theirs.clone();
        mine.tenant_id = t("t1");
        mine.data.price = 1.0;
        assert!(store.replace(mine).await.unwrap_err().is_not_found());
        assert_eq!(store.get(&t("t2"), "x").await.unwrap().unwrap(), theirs);
    }

    #[tokio::test]
    async fn test_replace_skips_recreated_record() {
        let stale = record("x", "t1");
        let store = MemoryStore::with_records(vec![stale.clone()]);
        store.remove(&t("t1"), "x").await.unwrap();

        let mut recreated = record("x", "t1");
        recreated.created_at = stale.created_at + chrono::Duration::seconds(1);
        recreated.updated_at = recreated.created_at;
        store.insert(recreated.clone()).await.unwrap();

        let mut edit = stale;
        edit.data.price = 1.0;
        assert!(store.replace(edit).await.unwrap_err().is_not_found());
        assert_eq!(store.get(&t("t1"), "x").await.unwrap().unwrap(), recreated);
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let store: MemoryStore<Product> = MemoryStore::new();
        let other = store.clone();
        other.insert(record("p1", "t1")).await.unwrap();
        assert!(!store.is_empty().await);
    }
}
