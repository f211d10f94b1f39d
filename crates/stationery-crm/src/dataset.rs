//! Seed datasets.
//!
//! A [`Dataset`] is the JSON document the CRM is loaded from and saved to:
//! user accounts, companies, and the tenant-scoped products, customers and
//! blasts. Everything is validated when it crosses this boundary, so the
//! rest of the crate can assume well-formed records.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use stationery_acl::{Record, TenantId};
use stationery_core::{Error, Result};

use crate::models::{Blast, Company, Customer, Identified, Product};
use crate::session::UserAccount;

const DEMO_JSON: &str = include_str!("../data/demo.json");

/// Everything the CRM holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Accounts that can log in.
    #[serde(default)]
    pub users: Vec<UserAccount>,

    /// Tenant profiles.
    #[serde(default)]
    pub companies: Vec<Company>,

    /// Catalog.
    #[serde(default)]
    pub products: Vec<Record<Product>>,

    /// Customer list.
    #[serde(default)]
    pub customers: Vec<Record<Customer>>,

    /// Blast history.
    #[serde(default)]
    pub blasts: Vec<Record<Blast>>,
}

impl Dataset {
    /// The bundled demo data: two companies, the first mirroring the
    /// dashboard's mock catalog, customers and campaigns.
    ///
    /// # Errors
    ///
    /// Only if the bundled file is malformed.
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_JSON)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] for malformed JSON or an unknown role;
    /// [`Error::InvalidData`] for anything [`validate`](Self::validate)
    /// rejects.
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Read and validate a dataset file.
    ///
    /// # Errors
    ///
    /// [`Error::IoWithPath`] if the file cannot be read, otherwise as for
    /// [`from_json`](Self::from_json).
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let dataset = Self::from_json(&json)?;
        log::debug!(
            "loaded {} users, {} products, {} customers, {} blasts from {}",
            dataset.users.len(),
            dataset.products.len(),
            dataset.customers.len(),
            dataset.blasts.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Write the dataset as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`Error::IoWithPath`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
        Ok(())
    }

    /// Check the dataset's internal consistency.
    ///
    /// - user ids and emails are non-blank and unique
    /// - every tenant id is non-blank and names a listed company (when any
    ///   companies are listed)
    /// - record ids are unique per kind within a tenant and every payload
    ///   passes its own validation
    /// - no blast references another tenant's customers or products
    ///   (references to deleted records are kept as history)
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let companies: HashSet<&str> = self.companies.iter().map(|c| c.id.as_str()).collect();
        if companies.len() != self.companies.len() {
            return Err(Error::invalid_data("duplicate company id"));
        }
        let check_tenant = |tenant: &TenantId, what: &str| -> Result<()> {
            if tenant.is_empty() {
                return Err(Error::invalid_data(format!("{what} has an empty tenant id")));
            }
            if !companies.is_empty() && !companies.contains(tenant.as_str()) {
                return Err(Error::invalid_data(format!(
                    "{what} belongs to unknown company '{tenant}'"
                )));
            }
            Ok(())
        };

        let mut ids = HashSet::new();
        let mut emails = HashSet::new();
        for account in &self.users {
            let p = &account.principal;
            if p.id.is_empty() {
                return Err(Error::invalid_data("user with an empty id"));
            }
            if p.email.trim().is_empty() {
                return Err(Error::invalid_data(format!("user '{}' has no email", p.id)));
            }
            if !ids.insert(p.id.as_str()) {
                return Err(Error::invalid_data(format!("duplicate user id '{}'", p.id)));
            }
            if !emails.insert(p.email.to_ascii_lowercase()) {
                return Err(Error::invalid_data(format!("duplicate user email '{}'", p.email)));
            }
            check_tenant(&p.tenant_id, &format!("user '{}'", p.id))?;
        }

        validate_records(&self.products, &check_tenant)?;
        validate_records(&self.customers, &check_tenant)?;
        validate_records(&self.blasts, &check_tenant)?;
        self.validate_blast_references()
    }

    fn validate_blast_references(&self) -> Result<()> {
        let customers = Keys::new(&self.customers);
        let products = Keys::new(&self.products);
        for blast in &self.blasts {
            let tenant = blast.tenant_id.as_str();
            let b = &blast.data;
            if let Some(id) = customers.first_foreign(tenant, &b.customer_ids) {
                return Err(Error::invalid_data(format!(
                    "blast '{}' references customer '{id}' of another company",
                    b.id
                )));
            }
            if let Some(id) = products.first_foreign(tenant, &b.product_ids) {
                return Err(Error::invalid_data(format!(
                    "blast '{}' references product '{id}' of another company",
                    b.id
                )));
            }
        }
        Ok(())
    }
}

/// Record keys of one kind, for cross-reference checks.
struct Keys<'a> {
    scoped: HashSet<(&'a str, &'a str)>,
    ids: HashSet<&'a str>,
}

impl<'a> Keys<'a> {
    fn new<T: Identified>(records: &'a [Record<T>]) -> Self {
        Self {
            scoped: records
                .iter()
                .map(|r| (r.tenant_id.as_str(), r.data.id()))
                .collect(),
            ids: records.iter().map(|r| r.data.id()).collect(),
        }
    }

    /// The first id that only exists under some other tenant.
    fn first_foreign(&self, tenant: &'a str, refs: &'a [String]) -> Option<&'a str> {
        refs.iter()
            .map(String::as_str)
            .find(|id| self.ids.contains(*id) && !self.scoped.contains(&(tenant, *id)))
    }
}

fn validate_records<T: Identified>(
    records: &[Record<T>],
    check_tenant: &impl Fn(&TenantId, &str) -> Result<()>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        let id = record.data.id();
        let what = format!("{} '{id}'", T::KIND);
        if id.trim().is_empty() {
            return Err(Error::invalid_data(format!("{} with an empty id", T::KIND)));
        }
        if !seen.insert((record.tenant_id.as_str(), id)) {
            return Err(Error::invalid_data(format!("duplicate {what}")));
        }
        check_tenant(&record.tenant_id, &what)?;
        record
            .data
            .validate()
            .map_err(|e| Error::invalid_data(format!("{what}: {e}")))?;
    }
    Ok(())
}
