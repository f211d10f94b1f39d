//! Tenant-scoped resources.
//!
//! Anything the access policy can reason about implements [`TenantScoped`]:
//! it names the tenant that owns it and, optionally, the user that created
//! it. [`Record<T>`] is the stamped envelope collaborators store; it wraps a
//! domain payload `T` with tenancy, ownership and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::principal::{TenantId, UserId};

// ============================================================================
// TenantScoped
// ============================================================================

/// A record owned by exactly one tenant.
pub trait TenantScoped {
    /// The owning tenant.
    fn tenant_id(&self) -> &TenantId;

    /// The creating user, if recorded.
    ///
    /// Creation metadata is informational; it only restricts writes by
    /// principals with the `user` role.
    fn created_by(&self) -> Option<&UserId>;
}

impl<R: TenantScoped + ?Sized> TenantScoped for &R {
    fn tenant_id(&self) -> &TenantId {
        (**self).tenant_id()
    }

    fn created_by(&self) -> Option<&UserId> {
        (**self).created_by()
    }
}

// ============================================================================
// ResourceRef
// ============================================================================

/// A bare tenant/creator pair.
///
/// Useful for checking a permission before the full record is at hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// The owning tenant.
    #[serde(alias = "company_id", alias = "companyId", alias = "tenantId")]
    pub tenant_id: TenantId,

    /// The creating user.
    #[serde(default, alias = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl ResourceRef {
    /// A resource with no recorded creator.
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            created_by: None,
        }
    }

    /// Set the creator.
    pub fn with_creator(mut self, user: impl Into<UserId>) -> Self {
        self.created_by = Some(user.into());
        self
    }
}

impl TenantScoped for ResourceRef {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }
}

// ============================================================================
// Record
// ============================================================================

/// A domain payload stamped with tenancy, ownership and timestamps.
///
/// Serialized flat: the metadata fields sit next to the payload's own
/// fields. Legacy spellings (`company_id`, `companyId`, `createdBy`, ...) are
/// accepted on input; output always uses the snake_case names.
///
/// Missing timestamps are filled in on input: `created_at` defaults to the
/// load time and `updated_at` to `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    /// The owning tenant.
    #[serde(alias = "company_id", alias = "companyId", alias = "tenantId")]
    pub tenant_id: TenantId,

    /// The creating user.
    #[serde(default, alias = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,

    /// The domain payload.
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    /// Wrap a payload with explicit metadata.
    ///
    /// Collaborators normally obtain records from
    /// [`stamp_on_create`](crate::stamp_on_create) instead.
    pub fn new(
        tenant_id: impl Into<TenantId>,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
        data: T,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            created_by,
            created_at,
            updated_at: created_at,
            data,
        }
    }

    /// The tenant/creator pair of this record.
    pub fn resource_ref(&self) -> ResourceRef {
        ResourceRef {
            tenant_id: self.tenant_id.clone(),
            created_by: self.created_by.clone(),
        }
    }

    /// Replace the payload, keeping all metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Record<U> {
        Record {
            tenant_id: self.tenant_id,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data: f(self.data),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Record<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire<T> {
            #[serde(alias = "company_id", alias = "companyId", alias = "tenantId")]
            tenant_id: TenantId,
            #[serde(default, alias = "createdBy")]
            created_by: Option<UserId>,
            #[serde(default, alias = "createdAt")]
            created_at: Option<DateTime<Utc>>,
            #[serde(default, alias = "updatedAt")]
            updated_at: Option<DateTime<Utc>>,
            #[serde(flatten)]
            data: T,
        }

        let wire = Wire::<T>::deserialize(deserializer)?;
        let created_at = wire.created_at.unwrap_or_else(Utc::now);
        Ok(Self {
            tenant_id: wire.tenant_id,
            created_by: wire.created_by,
            created_at,
            updated_at: wire.updated_at.unwrap_or(created_at),
            data: wire.data,
        })
    }
}

impl<T> TenantScoped for Record<T> {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================
