//! The assembled CRM.
//!
//! [`Crm`] bundles the account directory, company profiles and one
//! [`CrudService`] per record type over in-memory stores. It is what the
//! CLI (or any other front end) drives.

use chrono::Utc;

use stationery_acl::{Principal, Record};
use stationery_core::{Error, Result};

use crate::composer::BlastComposer;
use crate::dataset::Dataset;
use crate::models::{Blast, Company, Customer, Product};
use crate::reports::{DashboardReport, ExportSummary, compute_report};
use crate::service::CrudService;
use crate::session::{Directory, NewAccount, Session};
use crate::store::{MemoryStore, RecordStore};

/// Authorized access to products.
pub type ProductService = CrudService<Product, MemoryStore<Product>>;

/// Authorized access to customers.
pub type CustomerService = CrudService<Customer, MemoryStore<Customer>>;

/// Authorized access to blasts.
pub type BlastService = CrudService<Blast, MemoryStore<Blast>>;

/// Every collaborator of the CRM, ready to use.
#[derive(Clone)]
pub struct Crm {
    directory: Directory,
    companies: Vec<Company>,
    products: ProductService,
    customers: CustomerService,
    blasts: BlastService,
}

impl Crm {
    /// Build a CRM over a validated dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            directory: Directory::new(dataset.users),
            companies: dataset.companies,
            products: CrudService::new(MemoryStore::with_records(dataset.products)),
            customers: CrudService::new(MemoryStore::with_records(dataset.customers)),
            blasts: CrudService::new(MemoryStore::with_records(dataset.blasts)),
        }
    }

    /// The bundled demo CRM.
    ///
    /// # Errors
    ///
    /// As for [`Dataset::demo`].
    pub fn demo() -> Result<Self> {
        Ok(Self::from_dataset(Dataset::demo()?))
    }

    /// Replace the password accepted for accounts without their own.
    pub fn with_demo_password(mut self, password: impl Into<String>) -> Self {
        self.directory = self.directory.with_demo_password(password);
        self
    }

    /// Account directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Log in against the directory.
    ///
    /// # Errors
    ///
    /// As for [`Session::login`].
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        Session::login(&self.directory, email, password)
    }

    /// Register an account in one of the listed companies.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] for an unknown company, otherwise as for
    /// [`Directory::signup`].
    pub fn signup(&mut self, account: NewAccount) -> Result<Principal> {
        if !self.companies.is_empty()
            && !self.companies.iter().any(|c| c.id == account.tenant_id.as_str())
        {
            return Err(Error::invalid_data(format!(
                "unknown company '{}'",
                account.tenant_id
            )));
        }
        self.directory.signup(account)
    }

    /// Company profiles.
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// The principal's own company profile.
    pub fn company(&self, principal: &Principal) -> Option<&Company> {
        self.companies
            .iter()
            .find(|c| c.id == principal.tenant_id.as_str())
    }

    /// Product service.
    pub fn products(&self) -> &ProductService {
        &self.products
    }

    /// Customer service.
    pub fn customers(&self) -> &CustomerService {
        &self.customers
    }

    /// Blast service.
    pub fn blasts(&self) -> &BlastService {
        &self.blasts
    }

    /// Dashboard figures over everything the principal can see.
    pub async fn report(&self, principal: &Principal) -> Result<DashboardReport> {
        let products = self.products.list(principal).await?;
        let customers = self.customers.list(principal).await?;
        let blasts = self.blasts.list(principal).await?;
        Ok(compute_report(principal, &products, &customers, &blasts))
    }

    /// Export summary for the principal as of now.
    pub async fn export_summary(&self, principal: &Principal) -> Result<ExportSummary> {
        let report = self.report(principal).await?;
        Ok(ExportSummary::from_report(&report, Utc::now()))
    }

    /// Render a composer's preview against the principal's catalog.
    pub async fn preview_blast(
        &self,
        principal: &Principal,
        composer: &BlastComposer,
    ) -> Result<String> {
        let products = self.products.list(principal).await?;
        Ok(composer.preview(&products))
    }

    /// Queue a composed blast. Recipients and products must be visible to
    /// the principal.
    ///
    /// # Errors
    ///
    /// As for [`BlastComposer::into_blast`] and [`CrudService::create`].
    pub async fn send_blast(
        &self,
        principal: &Principal,
        composer: BlastComposer,
    ) -> Result<Record<Blast>> {
        let customers = self.customers.list(principal).await?;
        let products = self.products.list(principal).await?;
        let blast = composer.into_blast(&customers, &products)?;
        let record = self.blasts.create(principal, &blast).await?;
        log::info!(
            "{principal} queued blast '{}' to {} customers",
            record.data.id,
            record.data.customer_ids.len()
        );
        Ok(record)
    }

    /// Every record across all tenants, for persisting.
    pub async fn snapshot(&self) -> Result<Dataset> {
        Ok(Dataset {
            users: self.directory.accounts().to_vec(),
            companies: self.companies.clone(),
            products: self.products.store().list().await?,
            customers: self.customers.store().list().await?,
            blasts: self.blasts.store().list().await?,
        })
    }
}
