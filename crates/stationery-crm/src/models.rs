//! Domain records: products, customers, blasts and companies.
//!
//! These are the payloads stored inside [`Record<T>`](stationery_acl::Record);
//! tenancy and ownership live on the envelope, not here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use stationery_core::{Error, Result};

// ============================================================================
// Identified
// ============================================================================

/// A payload with a stable identifier.
pub trait Identified {
    /// Human-readable kind, used in messages ("product", "customer", ...).
    const KIND: &'static str;

    /// The record identifier.
    fn id(&self) -> &str;

    /// Reject payloads a form would not accept.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// Trimmed, non-blank, no duplicates.
fn push_unique(values: &mut Vec<String>, value: String) -> bool {
    let value = value.trim();
    if value.is_empty() || values.iter().any(|v| v == value) {
        return false;
    }
    values.push(value.to_string());
    true
}

fn remove_value(values: &mut Vec<String>, value: &str) -> bool {
    let before = values.len();
    values.retain(|v| v != value.trim());
    values.len() != before
}

// ============================================================================
// Product
// ============================================================================

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Catalog category (e.g. "Notebooks", "Pens").
    pub category: String,

    /// Unit price in rupees.
    pub price: f64,

    /// Image URL.
    #[serde(default)]
    pub image: String,

    /// Free-form tags used by search.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Units on hand.
    #[serde(default)]
    pub stock: u32,

    /// Whether the product is offered for sale.
    #[serde(default = "default_true", alias = "inStock")]
    pub in_stock: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a product with a fresh id, no stock and no tags.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            category: category.into(),
            price,
            image: String::new(),
            tags: Vec::new(),
            stock: 0,
            in_stock: true,
        }
    }

    /// Set the stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Add a tag, ignoring blanks and duplicates.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    /// Add a tag, ignoring blanks and duplicates. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        push_unique(&mut self.tags, tag.into())
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        remove_value(&mut self.tags, tag)
    }

    /// Price times units on hand.
    pub fn inventory_value(&self) -> f64 {
        self.price * f64::from(self.stock)
    }
}

impl Identified for Product {
    const KIND: &'static str = "product";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_data("product name is required"));
        }
        if self.category.trim().is_empty() {
            return Err(Error::invalid_data("product category is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::invalid_data(format!(
                "product price must be a non-negative amount, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Customer
// ============================================================================

/// Segment a customer is grouped into for targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomerGroup {
    /// High-budget retailers.
    Premium,
    /// Rural outlets.
    Rural,
    /// Price-sensitive buyers.
    #[serde(rename = "Budget Buyers", alias = "BudgetBuyers")]
    BudgetBuyers,
}

impl CustomerGroup {
    /// Every group, in display order.
    pub const ALL: [CustomerGroup; 3] = [
        CustomerGroup::Premium,
        CustomerGroup::Rural,
        CustomerGroup::BudgetBuyers,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            CustomerGroup::Premium => "Premium",
            CustomerGroup::Rural => "Rural",
            CustomerGroup::BudgetBuyers => "Budget Buyers",
        }
    }
}

impl fmt::Display for CustomerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for CustomerGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "premium" => Ok(CustomerGroup::Premium),
            "rural" => Ok(CustomerGroup::Rural),
            "budgetbuyers" | "budget" => Ok(CustomerGroup::BudgetBuyers),
            _ => Err(Error::invalid_data(format!("unknown customer group '{s}'"))),
        }
    }
}

/// A retailer the distributor sells to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Identifier.
    pub id: String,

    /// Business name.
    pub name: String,

    /// City and state.
    #[serde(default)]
    pub location: String,

    /// Purchasing budget in rupees.
    #[serde(default)]
    pub budget: u64,

    /// Interest tags.
    #[serde(default)]
    pub interests: Vec<String>,

    /// WhatsApp contact number.
    #[serde(alias = "whatsappNumber")]
    pub whatsapp_number: String,

    /// Targeting segment.
    pub group: CustomerGroup,

    /// Date of the last contact.
    #[serde(default, alias = "lastContact", skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<NaiveDate>,
}

impl Customer {
    /// Create a customer with a fresh id.
    pub fn new(
        name: impl Into<String>,
        whatsapp_number: impl Into<String>,
        group: CustomerGroup,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            location: String::new(),
            budget: 0,
            interests: Vec::new(),
            whatsapp_number: whatsapp_number.into(),
            group,
            last_contact: None,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the budget.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Add an interest, ignoring blanks and duplicates. Returns whether it
    /// was added.
    pub fn add_interest(&mut self, interest: impl Into<String>) -> bool {
        push_unique(&mut self.interests, interest.into())
    }

    /// Remove an interest. Returns whether it was present.
    pub fn remove_interest(&mut self, interest: &str) -> bool {
        remove_value(&mut self.interests, interest)
    }
}

impl Identified for Customer {
    const KIND: &'static str = "customer";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_data("customer name is required"));
        }
        let digits = self
            .whatsapp_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .count();
        if digits < 7 {
            return Err(Error::invalid_data(format!(
                "'{}' is not a usable WhatsApp number",
                self.whatsapp_number
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Blast
// ============================================================================

/// Delivery state of a blast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlastStatus {
    /// Being composed.
    Draft,
    /// Queued for sending.
    Pending,
    /// Queued for a later time.
    Scheduled,
    /// Delivered.
    Sent,
    /// Delivery failed.
    Failed,
}

impl fmt::Display for BlastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlastStatus::Draft => "draft",
            BlastStatus::Pending => "pending",
            BlastStatus::Scheduled => "scheduled",
            BlastStatus::Sent => "sent",
            BlastStatus::Failed => "failed",
        };
        f.pad(name)
    }
}

/// A promotional WhatsApp message sent to a set of customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    /// Identifier.
    pub id: String,

    /// Short title.
    #[serde(default)]
    pub title: String,

    /// Message body.
    pub message: String,

    /// Recipients.
    #[serde(default, alias = "customerIds", alias = "recipients")]
    pub customer_ids: Vec<String>,

    /// Featured products.
    #[serde(default, alias = "productIds")]
    pub product_ids: Vec<String>,

    /// Delivery state.
    pub status: BlastStatus,

    /// When a scheduled blast should go out.
    #[serde(default, alias = "scheduledAt", skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// When the blast went out.
    #[serde(default, alias = "sentAt", skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,

    /// Percentage of recipients that opened the message.
    #[serde(default, alias = "openRate")]
    pub open_rate: f64,
}

impl Identified for Blast {
    const KIND: &'static str = "blast";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(Error::invalid_data("blast message is required"));
        }
        if !(0.0..=100.0).contains(&self.open_rate) {
            return Err(Error::invalid_data(format!(
                "open rate must be a percentage, got {}",
                self.open_rate
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Company
// ============================================================================

/// A tenant's organisation profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Identifier; the tenant id of everything the company owns.
    pub id: String,

    /// Registered name.
    pub name: String,

    /// Contact email.
    #[serde(default)]
    pub email: String,

    /// Contact phone.
    #[serde(default)]
    pub phone: String,

    /// Postal address.
    #[serde(default)]
    pub address: String,
}

// ============================================================================
// Tests
// ============================================================================
