//! Row-level access control for StationeryConnect.
//!
//! Decides, for a given principal and tenant-scoped record, whether an
//! operation is permitted, and stamps new and modified records with the
//! correct tenancy, ownership and timestamps. Everything here is pure: no
//! I/O, no shared state, no failure modes. It has no internal dependencies
//! (dependency level 0).
//!
//! # Modules
//!
//! - [`principal`]: Principals, roles, tenant and user identifiers
//! - [`resource`]: The [`TenantScoped`] trait and the [`Record`] envelope
//! - [`policy`]: Read/create/update/delete checks and access filtering
//! - [`stamp`]: Creation and update stamping

#![doc = include_str!("../README.md")]

pub mod policy;
pub mod principal;
pub mod resource;
pub mod stamp;

// Re-export key types at crate root for convenience
pub use policy::{
    AccessDenied, Decision, DenyReason, Operation, authorize, can_create, can_delete, can_read,
    can_update, filter_by_access, is_admin, is_known_role, is_manager_or_above,
    retain_accessible, tenant_matches,
};
pub use principal::{Principal, Role, TenantId, UnknownRole, UserId};
pub use resource::{Record, ResourceRef, TenantScoped};
pub use stamp::{stamp_on_create, stamp_on_create_at, stamp_on_update, stamp_on_update_at};
