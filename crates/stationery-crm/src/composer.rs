//! Blast composition.
//!
//! A [`BlastComposer`] collects the recipients, featured products and message
//! text for a promotional blast, renders the preview a customer would see,
//! and turns a complete selection into a [`Blast`] queued as
//! [`BlastStatus::Pending`]. Nothing is delivered.

use std::collections::BTreeSet;

use stationery_acl::Record;
use stationery_core::{Error, Result};

use crate::models::{Blast, BlastStatus, Customer, CustomerGroup, Product, new_id};

/// Heading placed above the featured product list.
pub const FEATURED_HEADING: &str = "🛍️ Featured Products:";

/// Footer closing a preview that features products.
pub const BULK_ORDER_FOOTER: &str = "📞 Contact us for bulk orders!";

/// Builder for a blast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlastComposer {
    title: String,
    message: String,
    customer_ids: BTreeSet<String>,
    product_ids: BTreeSet<String>,
}

impl BlastComposer {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the message text.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a recipient.
    pub fn customer(mut self, id: impl Into<String>) -> Self {
        self.customer_ids.insert(id.into());
        self
    }

    /// Add a featured product.
    pub fn product(mut self, id: impl Into<String>) -> Self {
        self.product_ids.insert(id.into());
        self
    }

    /// Select or deselect a recipient. Returns whether it is now selected.
    pub fn toggle_customer(&mut self, id: &str) -> bool {
        toggle(&mut self.customer_ids, id)
    }

    /// Select or deselect a featured product. Returns whether it is now selected.
    pub fn toggle_product(&mut self, id: &str) -> bool {
        toggle(&mut self.product_ids, id)
    }

    /// Add every customer in `group`. Returns how many were newly selected.
    pub fn select_group(&mut self, customers: &[Record<Customer>], group: CustomerGroup) -> usize {
        customers
            .iter()
            .filter(|r| r.data.group == group)
            .filter(|r| self.customer_ids.insert(r.data.id.clone()))
            .count()
    }

    /// Deselect every recipient.
    pub fn clear_customers(&mut self) {
        self.customer_ids.clear();
    }

    /// Selected recipient ids, sorted.
    pub fn customer_ids(&self) -> impl Iterator<Item = &str> {
        self.customer_ids.iter().map(String::as_str)
    }

    /// Selected product ids, sorted.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.product_ids.iter().map(String::as_str)
    }

    /// Render the message as recipients would see it.
    ///
    /// Selected ids are resolved against `products`; ids with no matching
    /// product are skipped. The featured section and footer only appear
    /// when at least one product resolves.
    pub fn preview(&self, products: &[Record<Product>]) -> String {
        let featured: Vec<&Product> = products
            .iter()
            .map(|r| &r.data)
            .filter(|p| self.product_ids.contains(&p.id))
            .collect();

        let mut out = format!("{}\n\n", self.message);
        if !featured.is_empty() {
            out.push_str(FEATURED_HEADING);
            out.push('\n');
            for product in featured {
                out.push_str(&format!("• {} - ₹{}\n", product.name, product.price));
            }
            out.push('\n');
            out.push_str(BULK_ORDER_FOOTER);
        }
        out
    }

    /// Check the selection is complete.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] unless at least one customer, at least one
    /// product and a non-blank message are present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.customer_ids.is_empty() {
            missing.push("a customer");
        }
        if self.product_ids.is_empty() {
            missing.push("a product");
        }
        if self.message.trim().is_empty() {
            missing.push("a message");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_data(format!(
                "incomplete selection: select {}",
                missing.join(", ")
            )))
        }
    }

    /// Queue the blast.
    ///
    /// Every selected id must resolve against the given records, which
    /// should be the principal-visible lists.
    ///
    /// # Errors
    ///
    /// As for [`validate`](Self::validate), plus [`Error::NotFound`] for an
    /// id that does not resolve.
    pub fn into_blast(
        self,
        customers: &[Record<Customer>],
        products: &[Record<Product>],
    ) -> Result<Blast> {
        self.validate()?;
        require_known(&self.customer_ids, customers.iter().map(|r| r.data.id.as_str()), "customer")?;
        require_known(&self.product_ids, products.iter().map(|r| r.data.id.as_str()), "product")?;

        let preview = self.preview(products);
        let title = if self.title.trim().is_empty() {
            default_title(&self.message)
        } else {
            self.title
        };
        Ok(Blast {
            id: new_id(),
            title,
            message: preview,
            customer_ids: self.customer_ids.into_iter().collect(),
            product_ids: self.product_ids.into_iter().collect(),
            status: BlastStatus::Pending,
            scheduled_at: None,
            sent_at: None,
            open_rate: 0.0,
        })
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}

fn require_known<'a>(
    selected: &BTreeSet<String>,
    known: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<()> {
    let known: BTreeSet<&str> = known.collect();
    match selected.iter().find(|id| !known.contains(id.as_str())) {
        Some(id) => Err(Error::not_found(format!("{kind} '{id}'"))),
        None => Ok(()),
    }
}

fn default_title(message: &str) -> String {
    let first_line = message.trim().lines().next().unwrap_or_default();
    let mut title: String = first_line.chars().take(40).collect();
    if first_line.chars().count() > 40 {
        title.push('…');
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, name: &str, price: f64) -> Record<Product> {
        let mut p = Product::new(name, "Pens", price);
        p.id = id.to_string();
        Record::new("company-1", None, Utc::now(), p)
    }

    fn customer(id: &str, group: CustomerGroup) -> Record<Customer> {
        let mut c = Customer::new(format!("Customer {id}"), "+91 90000 00000", group);
        c.id = id.to_string();
        Record::new("company-1", None, Utc::now(), c)
    }

    fn catalog() -> Vec<Record<Product>> {
        vec![
            product("p-1", "Premium Notebooks Set", 450.0),
            product("p-2", "Gel Pen Collection", 120.0),
        ]
    }

    #[test]
    fn test_preview_with_products() {
        let composer = BlastComposer::new()
            .message("New stock is in!")
            .product("p-1")
            .product("p-2");
        let expected = "New stock is in!\n\n\
                        🛍️ Featured Products:\n\
                        • Premium Notebooks Set - ₹450\n\
                        • Gel Pen Collection - ₹120\n\
                        \n\
                        📞 Contact us for bulk orders!";
        assert_eq!(composer.preview(&catalog()), expected);
    }

    #[test]
    fn test_preview_without_products() {
        let composer = BlastComposer::new().message("Hello");
        assert_eq!(composer.preview(&catalog()), "Hello\n\n");
    }

    #[test]
    fn test_preview_skips_unknown_products() {
        let composer = BlastComposer::new().message("Hi").product("p-404");
        assert_eq!(composer.preview(&catalog()), "Hi\n\n");
    }

    #[test]
    fn test_toggle() {
        let mut composer = BlastComposer::new();
        assert!(composer.toggle_customer("c-1"));
        assert!(composer.toggle_product("p-1"));
        assert!(!composer.toggle_customer("c-1"));
        assert_eq!(composer.customer_ids().count(), 0);
        assert_eq!(composer.product_ids().collect::<Vec<_>>(), vec!["p-1"]);
    }

    #[test]
    fn test_select_group() {
        let customers = vec![
            customer("c-1", CustomerGroup::Premium),
            customer("c-2", CustomerGroup::Rural),
            customer("c-3", CustomerGroup::Premium),
        ];
        let mut composer = BlastComposer::new().customer("c-1");
        assert_eq!(composer.select_group(&customers, CustomerGroup::Premium), 1);
        assert_eq!(composer.customer_ids().collect::<Vec<_>>(), vec!["c-1", "c-3"]);
        composer.clear_customers();
        assert_eq!(composer.customer_ids().count(), 0);
    }

    #[test]
    fn test_validate_incomplete() {
        let err = BlastComposer::new().message("  ").validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("incomplete selection"));
        assert!(msg.contains("a customer"));
        assert!(msg.contains("a product"));
        assert!(msg.contains("a message"));

        let ok = BlastComposer::new()
            .message("Sale")
            .customer("c-1")
            .product("p-1");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_into_blast_is_pending() {
        let customers = vec![customer("c-1", CustomerGroup::Premium)];
        let blast = BlastComposer::new()
            .message("Back to school offers")
            .customer("c-1")
            .product("p-2")
            .into_blast(&customers, &catalog())
            .unwrap();
        assert_eq!(blast.status, BlastStatus::Pending);
        assert_eq!(blast.title, "Back to school offers");
        assert_eq!(blast.customer_ids, vec!["c-1"]);
        assert_eq!(blast.product_ids, vec!["p-2"]);
        assert!(blast.message.contains("• Gel Pen Collection - ₹120"));
        assert!(blast.sent_at.is_none());
    }

    #[test]
    fn test_into_blast_rejects_unknown_ids() {
        let customers = vec![customer("c-1", CustomerGroup::Premium)];
        let err = BlastComposer::new()
            .message("Sale")
            .customer("c-9")
            .product("p-1")
            .into_blast(&customers, &catalog())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_default_title_truncates() {
        let long = "a".repeat(50);
        let title = default_title(&long);
        assert_eq!(title.chars().count(), 41);
        assert!(title.ends_with('…'));
    }
}
