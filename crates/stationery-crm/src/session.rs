//! Demo login and sessions.
//!
//! A [`Session`] pins the [`Principal`] for the lifetime of a login. Nothing
//! reads the principal from ambient state: callers pass
//! [`Session::principal`] into every CRM call.
//!
//! Authentication is a mock of the original dashboard's dummy login: an
//! account matches by email, and the password is either the account's own
//! or the directory-wide demo password.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stationery_acl::{Principal, Role, TenantId};
use stationery_core::{Error, Result};

use crate::models::new_id;

/// Password accepted for accounts without their own.
pub const DEFAULT_DEMO_PASSWORD: &str = "password123";

/// A user that can log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Identity, role and tenant.
    #[serde(flatten)]
    pub principal: Principal,

    /// Account-specific password; falls back to the demo password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserAccount {
    /// An account using the demo password.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            password: None,
        }
    }
}

/// Details of an account to sign up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Own password; `None` uses the demo password.
    pub password: Option<String>,
    /// Role; new accounts are plain users unless told otherwise.
    pub role: Role,
    /// Company to join.
    pub tenant_id: TenantId,
}

impl NewAccount {
    /// A `user` account in the given company.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        tenant_id: impl Into<TenantId>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: None,
            role: Role::User,
            tenant_id: tenant_id.into(),
        }
    }

    /// Set the account's own password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// The accounts known to the CRM.
#[derive(Debug, Clone)]
pub struct Directory {
    accounts: Vec<UserAccount>,
    demo_password: String,
}

impl Directory {
    /// A directory over the given accounts using [`DEFAULT_DEMO_PASSWORD`].
    pub fn new(accounts: Vec<UserAccount>) -> Self {
        Self {
            accounts,
            demo_password: DEFAULT_DEMO_PASSWORD.to_string(),
        }
    }

    /// Override the demo password.
    pub fn with_demo_password(mut self, password: impl Into<String>) -> Self {
        self.demo_password = password.into();
        self
    }

    /// All accounts.
    pub fn accounts(&self) -> &[UserAccount] {
        &self.accounts
    }

    /// Look up an account by email, ignoring case.
    pub fn find(&self, email: &str) -> Option<&UserAccount> {
        let email = email.trim();
        self.accounts
            .iter()
            .find(|a| a.principal.email.eq_ignore_ascii_case(email))
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] for a blank name, an email without `@`, an
    /// empty tenant, or an email that is already registered.
    pub fn signup(&mut self, account: NewAccount) -> Result<Principal> {
        let email = account.email.trim();
        let name = account.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_data("name is required"));
        }
        if !email.contains('@') {
            return Err(Error::invalid_data(format!("'{email}' is not an email address")));
        }
        if account.tenant_id.is_empty() {
            return Err(Error::invalid_data("company is required"));
        }
        if self.find(email).is_some() {
            return Err(Error::invalid_data("user with this email already exists"));
        }

        let principal = Principal::new(format!("user_{}", new_id()), account.tenant_id, account.role)
            .with_email(email)
            .with_name(name);
        self.accounts.push(UserAccount {
            principal: principal.clone(),
            password: account.password,
        });
        log::info!("{principal} signed up");
        Ok(principal)
    }

    fn verify(&self, account: &UserAccount, password: &str) -> bool {
        let expected = account.password.as_deref().unwrap_or(&self.demo_password);
        expected == password
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    principal: Principal,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Log in by email and password.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCredentials`] for an unknown email or a wrong
    /// password; the two are deliberately indistinguishable.
    pub fn login(directory: &Directory, email: &str, password: &str) -> Result<Self> {
        let account = match directory.find(email) {
            Some(account) if directory.verify(account, password) => account,
            _ => {
                log::warn!("failed login for '{}'", email.trim());
                return Err(Error::InvalidCredentials);
            }
        };

        log::info!("{} logged in", account.principal);
        Ok(Self {
            principal: account.principal.clone(),
            started_at: Utc::now(),
        })
    }

    /// The session's principal.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// When the session began.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// End the session.
    pub fn logout(self) {
        log::info!("{} logged out", self.principal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        let admin = Principal::new("1", "company-1", Role::Admin).with_email("admin@company.com");
        let user = Principal::new("3", "company-1", Role::User).with_email("user@company.com");
        let mut special = UserAccount::new(
            Principal::new("4", "company-2", Role::Manager).with_email("boss@rival.com"),
        );
        special.password = Some("s3cret".into());
        Directory::new(vec![UserAccount::new(admin), UserAccount::new(user), special])
    }

    #[test]
    fn test_login_with_demo_password() {
        let session = Session::login(&directory(), "admin@company.com", "password123").unwrap();
        assert_eq!(session.principal().id.as_str(), "1");
        assert_eq!(session.principal().role, Role::Admin);
        assert!(session.started_at() <= Utc::now());
        session.logout();
    }

    #[test]
    fn test_login_email_case_insensitive() {
        let session = Session::login(&directory(), "  USER@company.com ", "password123").unwrap();
        assert_eq!(session.principal().id.as_str(), "3");
    }

    #[test]
    fn test_login_account_password() {
        let dir = directory();
        assert!(Session::login(&dir, "boss@rival.com", "s3cret").is_ok());
        assert!(Session::login(&dir, "boss@rival.com", "password123").is_err());
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let dir = directory();
        let unknown = Session::login(&dir, "nobody@company.com", "password123").unwrap_err();
        let wrong = Session::login(&dir, "admin@company.com", "nope").unwrap_err();
        assert!(matches!(unknown, Error::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn test_custom_demo_password() {
        let dir = directory().with_demo_password("letmein");
        assert!(Session::login(&dir, "admin@company.com", "letmein").is_ok());
        assert!(Session::login(&dir, "admin@company.com", "password123").is_err());
    }

    #[test]
    fn test_signup_defaults_to_user() {
        let mut dir = directory();
        let principal = dir
            .signup(NewAccount::new(" New@Shop.in ", "Asha Traders", "company-1"))
            .unwrap();
        assert_eq!(principal.role, Role::User);
        assert_eq!(principal.email, "New@Shop.in");
        assert!(principal.id.as_str().starts_with("user_"));
        assert_eq!(dir.accounts().len(), 4);

        let session = Session::login(&dir, "new@shop.in", "password123").unwrap();
        assert_eq!(session.principal(), &principal);
    }

    #[test]
    fn test_signup_own_password_and_role() {
        let mut dir = directory();
        dir.signup(
            NewAccount::new("lead@company.com", "Lead", "company-1")
                .with_password("pw")
                .with_role(Role::Manager),
        )
        .unwrap();
        let session = Session::login(&dir, "lead@company.com", "pw").unwrap();
        assert_eq!(session.principal().role, Role::Manager);
        assert!(Session::login(&dir, "lead@company.com", "password123").is_err());
    }

    #[test]
    fn test_signup_rejects_duplicates_and_bad_input() {
        let mut dir = directory();
        let err = dir
            .signup(NewAccount::new("ADMIN@company.com", "Again", "company-1"))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(dir.signup(NewAccount::new("x@y.z", "  ", "company-1")).is_err());
        assert!(dir.signup(NewAccount::new("not-an-email", "X", "company-1")).is_err());
        assert!(dir.signup(NewAccount::new("x@y.z", "X", "")).is_err());
        assert_eq!(dir.accounts().len(), 3);
    }

    #[test]
    fn test_user_account_deserialize() {
        let json = r#"{"id":"2","email":"manager@company.com","name":"Manager User",
                       "role":"manager","company_id":"company-1"}"#;
        let account: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.principal.role, Role::Manager);
        assert_eq!(account.principal.tenant_id.as_str(), "company-1");
        assert!(account.password.is_none());
    }
}
