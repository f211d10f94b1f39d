//! Authorized CRUD over a record store.
//!
//! [`CrudService`] is the only path through which the CRM reads or mutates
//! records. Every call takes the acting [`Principal`] explicitly, and every
//! mutation is checked against the access policy before the store is asked
//! to change anything. Denied reads are invisible: lists omit the record and
//! lookups report it as not found.

use std::marker::PhantomData;
use std::sync::Arc;

use stationery_acl::{
    Operation, Principal, Record, authorize, can_read, filter_by_access, stamp_on_create,
    stamp_on_update,
};
use stationery_core::{Error, Result};

use crate::models::Identified;
use crate::store::RecordStore;

/// Authorized create/read/update/delete for one record type.
pub struct CrudService<T, S> {
    store: Arc<S>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Clone for CrudService<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T, S> CrudService<T, S>
where
    T: Identified + Clone + Send + Sync + 'static,
    S: RecordStore<T>,
{
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Wrap a shared store.
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every record the principal may read, in store order.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Record<T>>> {
        let records = self.store.list().await?;
        Ok(filter_by_access(principal, records).collect())
    }

    /// A single readable record.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the record does not exist *or* belongs to
    /// another tenant; the two cases are indistinguishable to the caller.
    pub async fn get(&self, principal: &Principal, id: &str) -> Result<Record<T>> {
        match self.store.get(&principal.tenant_id, id).await? {
            Some(record) if can_read(principal, &record) => Ok(record),
            _ => Err(Error::not_found(format!("{} '{id}'", T::KIND))),
        }
    }

    /// Stamp and store a new record owned by the principal's tenant.
    pub async fn create(&self, principal: &Principal, draft: &T) -> Result<Record<T>> {
        if draft.id().trim().is_empty() {
            return Err(Error::invalid_data(format!("{} id is required", T::KIND)));
        }
        draft.validate()?;

        let record = stamp_on_create(principal, draft);
        authorize(principal, Operation::Create, &record).into_result(Operation::Create)?;
        self.store.insert(record.clone()).await?;
        log::debug!("{principal} created {} '{}'", T::KIND, draft.id());
        Ok(record)
    }

    /// Apply `edit` to a copy of the record and store the result.
    ///
    /// The id must not change. Tenancy, ownership and creation time are
    /// carried over; only the modification time is restamped.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] as for [`get`](Self::get);
    /// [`Error::PermissionDenied`] if the principal may not modify the
    /// record, in which case the store is never asked to change it.
    pub async fn update<F>(&self, principal: &Principal, id: &str, edit: F) -> Result<Record<T>>
    where
        F: FnOnce(&mut T) + Send,
    {
        let existing = self.get(principal, id).await?;
        authorize(principal, Operation::Update, &existing).into_result(Operation::Update)?;

        let mut edited = existing.clone();
        edit(&mut edited.data);
        if edited.data.id() != id {
            return Err(Error::invalid_data(format!(
                "{} id cannot change ('{id}' -> '{}')",
                T::KIND,
                edited.data.id()
            )));
        }
        edited.data.validate()?;

        let record = stamp_on_update(&edited);
        self.store.replace(record.clone()).await?;
        log::debug!("{principal} updated {} '{id}'", T::KIND);
        Ok(record)
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// As for [`update`](Self::update).
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<Record<T>> {
        let existing = self.get(principal, id).await?;
        authorize(principal, Operation::Delete, &existing).into_result(Operation::Delete)?;

        match self.store.remove(&existing.tenant_id, id).await? {
            Some(removed) => {
                log::debug!("{principal} deleted {} '{id}'", T::KIND);
                Ok(removed)
            }
            None => Err(Error::not_found(format!("{} '{id}'", T::KIND))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
