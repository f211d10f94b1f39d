//! Metadata stamping for new and modified records.
//!
//! Stamping never mutates its input: callers get a fresh [`Record`] and keep
//! whatever they passed in. Tenancy and ownership are fixed at creation and
//! carried through every later update unchanged.

use chrono::{DateTime, Utc};

use crate::principal::Principal;
use crate::resource::Record;

/// Stamp a new record for the principal, timestamped now.
pub fn stamp_on_create<T: Clone>(principal: &Principal, partial: &T) -> Record<T> {
    stamp_on_create_at(principal, partial, Utc::now())
}

/// Stamp a new record for the principal at an explicit instant.
///
/// The record belongs to the principal's tenant, names the principal as its
/// creator, and has `created_at == updated_at == now`.
pub fn stamp_on_create_at<T: Clone>(
    principal: &Principal,
    partial: &T,
    now: DateTime<Utc>,
) -> Record<T> {
    Record {
        tenant_id: principal.tenant_id.clone(),
        created_by: Some(principal.id.clone()),
        created_at: now,
        updated_at: now,
        data: partial.clone(),
    }
}

/// Copy a record with its modification time set to now.
pub fn stamp_on_update<T: Clone>(record: &Record<T>) -> Record<T> {
    stamp_on_update_at(record, Utc::now())
}

/// Copy a record with its modification time set to `now`.
///
/// Only `updated_at` changes.
pub fn stamp_on_update_at<T: Clone>(record: &Record<T>, now: DateTime<Utc>) -> Record<T> {
    Record {
        updated_at: now,
        ..record.clone()
    }
}
