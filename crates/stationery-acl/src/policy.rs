//! The row-level access policy.
//!
//! Every check is a total, side-effect-free function of a [`Principal`] and
//! a [`TenantScoped`] resource. [`tenant_matches`] is the foundation; all
//! other checks compose it, and a cross-tenant resource is always denied
//! before the principal's role is considered.
//!
//! The boolean predicates are what collaborators normally call.
//! [`authorize`] returns the same answer as a [`Decision`] that also says
//! *why* an operation was denied.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::principal::{Principal, Role, TenantId};
use crate::resource::TenantScoped;

// ============================================================================
// Predicates
// ============================================================================

/// Whether the principal belongs to the given tenant.
pub fn tenant_matches(principal: &Principal, resource_tenant_id: &TenantId) -> bool {
    principal.tenant_id == *resource_tenant_id
}

/// Whether the principal may read the resource.
///
/// Reads are granted to every role within the owning tenant.
pub fn can_read<R: TenantScoped + ?Sized>(principal: &Principal, resource: &R) -> bool {
    tenant_matches(principal, resource.tenant_id())
}

/// Whether the principal may create resources.
///
/// Always true for an authenticated principal. Tenancy of the new resource
/// comes from [`stamp_on_create`](crate::stamp_on_create), not from this check.
pub fn can_create(_principal: &Principal) -> bool {
    true
}

/// Whether the principal may modify the resource.
pub fn can_update<R: TenantScoped + ?Sized>(principal: &Principal, resource: &R) -> bool {
    write_decision(principal, resource).is_allowed()
}

/// Whether the principal may delete the resource.
///
/// Same policy as [`can_update`].
pub fn can_delete<R: TenantScoped + ?Sized>(principal: &Principal, resource: &R) -> bool {
    write_decision(principal, resource).is_allowed()
}

/// Yield only the resources the principal may read.
///
/// Lazy; input order is preserved and nothing is deduplicated. Works over
/// borrowed (`&[R]`, `&Vec<R>`) and owned collections alike.
pub fn filter_by_access<'p, I>(
    principal: &'p Principal,
    resources: I,
) -> impl Iterator<Item = I::Item> + 'p
where
    I: IntoIterator,
    I::IntoIter: 'p,
    I::Item: TenantScoped,
{
    resources
        .into_iter()
        .filter(move |resource| can_read(principal, resource))
}

/// Eager, owning form of [`filter_by_access`].
pub fn retain_accessible<R: TenantScoped>(principal: &Principal, mut resources: Vec<R>) -> Vec<R> {
    resources.retain(|resource| can_read(principal, resource));
    resources
}

// ============================================================================
// Role predicates
// ============================================================================

/// Whether the principal is a tenant administrator.
pub fn is_admin(principal: &Principal) -> bool {
    principal.role == Role::Admin
}

/// Whether the principal is a manager or administrator.
pub fn is_manager_or_above(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Manager)
}

/// Whether the principal holds one of the recognised roles.
pub fn is_known_role(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Manager | Role::User)
}

// ============================================================================
// Decisions
// ============================================================================

/// An operation a principal may request on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Observe the resource.
    Read,
    /// Create a new resource.
    Create,
    /// Modify the resource.
    Update,
    /// Remove the resource.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The resource belongs to another tenant.
    CrossTenant,
    /// The resource was created by someone else.
    NotOwner,
    /// The resource has no recorded creator, so ownership cannot be shown.
    MissingOwner,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::CrossTenant => "resource belongs to another tenant",
            DenyReason::NotOwner => "resource was created by another user",
            DenyReason::MissingOwner => "resource has no recorded creator",
        };
        f.write_str(text)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The operation is permitted.
    Allow,
    /// The operation is not permitted.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the operation is permitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert into a `Result` for callers that propagate denials with `?`.
    pub fn into_result(self, operation: Operation) -> Result<(), AccessDenied> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AccessDenied { operation, reason }),
        }
    }
}

/// A denied operation, for surfacing as a "not permitted" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} not permitted: {reason}")]
pub struct AccessDenied {
    /// The requested operation.
    pub operation: Operation,
    /// Why it was denied.
    pub reason: DenyReason,
}

/// Evaluate an operation against a resource.
///
/// Agrees with the boolean predicates: `authorize(p, Operation::Update, r)
/// .is_allowed() == can_update(p, r)` and so on. For [`Operation::Create`]
/// the resource names the tenant the record would be created under, so a
/// cross-tenant target is denied.
pub fn authorize<R: TenantScoped + ?Sized>(
    principal: &Principal,
    operation: Operation,
    resource: &R,
) -> Decision {
    let decision = match operation {
        Operation::Read => tenant_decision(principal, resource),
        // can_create is unconditional; only the target tenant matters.
        Operation::Create => tenant_decision(principal, resource),
        Operation::Update | Operation::Delete => write_decision(principal, resource),
    };

    if let Decision::Deny(reason) = decision {
        log::debug!(
            "denied {operation} for {principal} on tenant {}: {reason}",
            resource.tenant_id()
        );
    }

    decision
}

fn tenant_decision<R: TenantScoped + ?Sized>(principal: &Principal, resource: &R) -> Decision {
    if tenant_matches(principal, resource.tenant_id()) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::CrossTenant)
    }
}

/// Shared update/delete policy.
fn write_decision<R: TenantScoped + ?Sized>(principal: &Principal, resource: &R) -> Decision {
    if !tenant_matches(principal, resource.tenant_id()) {
        return Decision::Deny(DenyReason::CrossTenant);
    }

    if is_manager_or_above(principal) {
        return Decision::Allow;
    }

    // Role::User: only the recorded, non-empty creator may write.
    match resource.created_by() {
        Some(owner) if !owner.is_empty() => {
            if *owner == principal.id {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotOwner)
            }
        }
        _ => Decision::Deny(DenyReason::MissingOwner),
    }
}

// ============================================================================
// Tests
// ============================================================================
