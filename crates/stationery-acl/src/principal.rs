//! Principals, roles, and the identifiers they carry.
//!
//! A [`Principal`] is the authenticated actor behind every request. It is
//! established once at login and never changes for the rest of the session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a tenant (a company).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (or whitespace only).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (or whitespace only).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Role
// ============================================================================

/// Role of a principal within its tenant.
///
/// The set is closed: strings that are not one of `admin`, `manager` or
/// `user` are rejected with [`UnknownRole`] when parsed or deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Full control over the tenant's records.
    Admin,
    /// Full control over the tenant's records.
    Manager,
    /// May read everything in the tenant but only write its own records.
    User,
}

impl Role {
    /// Every recognised role, most privileged first.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

    /// The canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A role string that is not one of the recognised roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected one of: admin, manager, user)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.name().to_string()
    }
}

// ============================================================================
// Principal
// ============================================================================

/// The authenticated actor making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User identifier.
    pub id: UserId,

    /// Login email.
    #[serde(default)]
    pub email: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Role within the tenant.
    pub role: Role,

    /// Tenant the principal belongs to.
    #[serde(alias = "company_id", alias = "companyId", alias = "tenantId")]
    pub tenant_id: TenantId,
}

impl Principal {
    /// Create a principal with an empty email and display name.
    pub fn new(id: impl Into<UserId>, tenant_id: impl Into<TenantId>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: String::new(),
            name: String::new(),
            role,
            tenant_id: tenant_id.into(),
        }
    }

    /// Set the login email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}@{})", self.id, self.role, self.tenant_id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert_eq!(" user ".parse::<Role>(), Ok(Role::User));
    }

    #[test]
    fn test_role_from_str_unknown() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("superuser".into()));
        assert!(err.to_string().contains("superuser"));
    }

    #[test]
    fn test_role_display_matches_name() {
        for role in Role::ALL {
            assert_eq!(role.to_string(), role.name());
        }
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let result: Result<Role, _> = serde_json::from_str("\"owner\"");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown role"));
    }

    #[test]
    fn test_ids_empty() {
        assert!(UserId::new("").is_empty());
        assert!(UserId::new("  ").is_empty());
        assert!(!UserId::new("u1").is_empty());
        assert!(TenantId::new("").is_empty());
        assert!(!TenantId::new("t1").is_empty());
    }

    #[test]
    fn test_principal_builder() {
        let p = Principal::new("u1", "t1", Role::User)
            .with_email("user@company.com")
            .with_name("Regular User");
        assert_eq!(p.id.as_str(), "u1");
        assert_eq!(p.tenant_id.as_str(), "t1");
        assert_eq!(p.email, "user@company.com");
        assert_eq!(p.name, "Regular User");
        assert_eq!(p.to_string(), "u1 (user@t1)");
    }

    #[test]
    fn test_principal_deserialize_company_alias() {
        let json = r#"{"id":"1","email":"a@b.c","name":"A","role":"admin","company_id":"company-1"}"#;
        let p: Principal = serde_json::from_str(json).unwrap();
        assert_eq!(p.tenant_id, TenantId::new("company-1"));
        assert_eq!(p.role, Role::Admin);

        let json = r#"{"id":"1","role":"user","companyId":"company-2"}"#;
        let p: Principal = serde_json::from_str(json).unwrap();
        assert_eq!(p.tenant_id, TenantId::new("company-2"));
        assert!(p.email.is_empty());
    }

    #[test]
    fn test_principal_serializes_tenant_id() {
        let p = Principal::new("1", "company-1", Role::Admin);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"tenant_id\":\"company-1\""));
        assert!(!json.contains("company_id"));
    }
}
