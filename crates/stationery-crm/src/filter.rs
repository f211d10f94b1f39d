//! Search and facet filters for catalog and customer lists.
//!
//! Filters run after access filtering, over records the principal can
//! already see. An empty search term or a `None` facet matches everything.

use std::collections::BTreeSet;

use stationery_acl::Record;

use crate::models::{Customer, CustomerGroup, Product};

/// Filter over products by search term and category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name or any tag.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

impl ProductFilter {
    /// Match everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to a category. `"all"` clears the restriction.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(category)
        };
        self
    }

    /// Whether the product passes the filter.
    pub fn matches(&self, product: &Product) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => {
                product.name.to_lowercase().contains(&term)
                    || product.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
        };
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| product.category == c);
        matches_search && matches_category
    }

    /// Keep the matching records, in order.
    pub fn apply<'a>(&self, records: &'a [Record<Product>]) -> Vec<&'a Record<Product>> {
        records.iter().filter(|r| self.matches(&r.data)).collect()
    }
}

/// Filter over customers by search term and group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the name or location.
    pub search: Option<String>,
    /// Exact group.
    pub group: Option<CustomerGroup>,
}

impl CustomerFilter {
    /// Match everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to a group.
    pub fn group(mut self, group: CustomerGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// Whether the customer passes the filter.
    pub fn matches(&self, customer: &Customer) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => {
                customer.name.to_lowercase().contains(&term)
                    || customer.location.to_lowercase().contains(&term)
            }
        };
        let matches_group = self.group.is_none_or(|g| customer.group == g);
        matches_search && matches_group
    }

    /// Keep the matching records, in order.
    pub fn apply<'a>(&self, records: &'a [Record<Customer>]) -> Vec<&'a Record<Customer>> {
        records.iter().filter(|r| self.matches(&r.data)).collect()
    }
}

/// Distinct product categories, sorted.
pub fn categories(records: &[Record<Product>]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.data.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn normalized(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}
