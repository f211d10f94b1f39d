//! StationeryConnect CRM.
//!
//! The catalog, customer list, WhatsApp blast composer and reports of a
//! multi-tenant stationery distributor. Every read and write goes through
//! [`CrudService`], which consults the access policy in `stationery-acl`
//! before touching a [`RecordStore`].
//!
//! # Modules
//!
//! - [`models`]: Products, customers, blasts and companies
//! - [`filter`]: Search and facet filters
//! - [`store`]: The [`RecordStore`] trait and [`MemoryStore`]
//! - [`service`]: Authorized CRUD
//! - [`session`]: Accounts, login and logout
//! - [`composer`]: Blast composition and preview
//! - [`reports`]: Dashboard figures and export
//! - [`dataset`]: JSON seed data
//! - [`crm`]: The assembled [`Crm`]

#![doc = include_str!("../README.md")]

pub mod composer;
pub mod crm;
pub mod dataset;
pub mod filter;
pub mod models;
pub mod reports;
pub mod service;
pub mod session;
pub mod store;

pub use composer::BlastComposer;
pub use crm::{BlastService, Crm, CustomerService, ProductService};
pub use dataset::Dataset;
pub use filter::{CustomerFilter, ProductFilter, categories};
pub use models::{Blast, BlastStatus, Company, Customer, CustomerGroup, Identified, Product};
pub use reports::{DashboardReport, ExportSummary, RankedEntry, compute_report};
pub use service::CrudService;
pub use session::{DEFAULT_DEMO_PASSWORD, Directory, NewAccount, Session, UserAccount};
pub use store::{MemoryStore, RecordStore};
