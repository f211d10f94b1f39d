//! Dashboard and report figures.
//!
//! Every figure is computed over the records the principal may read; records
//! from other tenants never contribute, even if the caller passes them in.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stationery_acl::{Principal, Record, filter_by_access};
use stationery_core::{Error, Result};

use crate::models::{Blast, BlastStatus, Customer, Product};

/// How many entries the top-N rankings hold.
pub const TOP_N: usize = 5;

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The ranked figure.
    pub value: f64,
}

/// Aggregate figures for the dashboard and reports pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Visible products.
    pub total_products: usize,
    /// Visible customers.
    pub total_customers: usize,
    /// Visible blasts.
    pub total_blasts: usize,
    /// Blasts awaiting delivery.
    pub pending_blasts: usize,
    /// Delivered blasts.
    pub sent_blasts: usize,
    /// Sum of price times stock.
    pub inventory_value: f64,
    /// Mean open rate of sent blasts; `None` when nothing was sent.
    pub average_open_rate: Option<f64>,
    /// Sum of customer budgets.
    pub total_budget: u64,
    /// Products offered for sale.
    pub in_stock: usize,
    /// Products not offered for sale.
    pub out_of_stock: usize,
    /// Customers with the largest budgets.
    pub top_customers: Vec<RankedEntry>,
    /// Products with the largest inventory value.
    pub top_products: Vec<RankedEntry>,
    /// Product count per category.
    pub category_distribution: BTreeMap<String, usize>,
    /// Customer count per group label.
    pub group_distribution: BTreeMap<String, usize>,
}

/// Compute the report for a principal.
pub fn compute_report(
    principal: &Principal,
    products: &[Record<Product>],
    customers: &[Record<Customer>],
    blasts: &[Record<Blast>],
) -> DashboardReport {
    let products: Vec<&Product> = filter_by_access(principal, products)
        .map(|r| &r.data)
        .collect();
    let customers: Vec<&Customer> = filter_by_access(principal, customers)
        .map(|r| &r.data)
        .collect();
    let blasts: Vec<&Blast> = filter_by_access(principal, blasts)
        .map(|r| &r.data)
        .collect();

    let sent_rates: Vec<f64> = blasts
        .iter()
        .filter(|b| b.status == BlastStatus::Sent)
        .map(|b| b.open_rate)
        .collect();
    let average_open_rate = if sent_rates.is_empty() {
        None
    } else {
        Some(sent_rates.iter().sum::<f64>() / sent_rates.len() as f64)
    };

    let in_stock = products.iter().filter(|p| p.in_stock).count();

    let mut category_distribution = BTreeMap::new();
    for product in &products {
        *category_distribution
            .entry(product.category.clone())
            .or_insert(0) += 1;
    }
    let mut group_distribution = BTreeMap::new();
    for customer in &customers {
        *group_distribution
            .entry(customer.group.label().to_string())
            .or_insert(0) += 1;
    }

    DashboardReport {
        total_products: products.len(),
        total_customers: customers.len(),
        total_blasts: blasts.len(),
        pending_blasts: blasts
            .iter()
            .filter(|b| b.status == BlastStatus::Pending)
            .count(),
        sent_blasts: sent_rates.len(),
        inventory_value: products.iter().map(|p| p.inventory_value()).sum(),
        average_open_rate,
        total_budget: customers
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.budget)),
        in_stock,
        out_of_stock: products.len() - in_stock,
        top_customers: top_n(customers.iter().map(|c| RankedEntry {
            id: c.id.clone(),
            name: c.name.clone(),
            value: c.budget as f64,
        })),
        top_products: top_n(products.iter().map(|p| RankedEntry {
            id: p.id.clone(),
            name: p.name.clone(),
            value: p.inventory_value(),
        })),
        category_distribution,
        group_distribution,
    }
}

// Stable: ties keep input order.
fn top_n(entries: impl Iterator<Item = RankedEntry>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = entries.collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(TOP_N);
    entries
}

// ============================================================================
// Export
// ============================================================================

/// Summary written by the report export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Visible customers.
    pub customers: usize,
    /// Visible products.
    pub products: usize,
    /// Visible blasts.
    pub campaigns: usize,
    /// When the export was taken.
    #[serde(alias = "exportDate")]
    pub export_date: DateTime<Utc>,
}

impl ExportSummary {
    /// Summarise a report as of `now`.
    pub fn from_report(report: &DashboardReport, now: DateTime<Utc>) -> Self {
        Self {
            customers: report.total_customers,
            products: report.total_products,
            campaigns: report.total_blasts,
            export_date: now,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// [`Error::IoWithPath`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
        log::info!("exported report summary to {}", path.display());
        Ok(())
    }
}
