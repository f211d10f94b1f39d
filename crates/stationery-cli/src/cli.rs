//! CLI argument parsing and command definitions.
//!
//! Global flags select the configuration file, verbosity and the account to
//! act as; subcommands map onto the CRM's pages.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level arguments for the `stationery` binary.
#[derive(Parser, Debug)]
#[command(name = "stationery", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "STATIONERY_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Email of the account to act as (defaults to `session.email`).
    #[arg(long = "as", value_name = "EMAIL")]
    pub as_email: Option<String>,

    /// Password for the account (defaults to the configured demo password).
    #[arg(long, env = "STATIONERY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print version information.
    Version,

    /// Show the logged-in account and its company.
    Whoami,

    /// Register a new account (a plain user unless `--role` says otherwise).
    ///
    /// Uses `--password` as the account's own password when given.
    Signup {
        /// Login email.
        #[arg(long)]
        email: String,

        /// Display name.
        #[arg(long)]
        name: String,

        /// Role: admin, manager or user.
        #[arg(long)]
        role: Option<String>,

        /// Company id to join (defaults to the first listed company).
        #[arg(long)]
        company: Option<String>,
    },

    /// Catalog operations.
    Products(ProductsCommand),

    /// Customer operations.
    Customers(CustomersCommand),

    /// WhatsApp blast operations.
    Blast(BlastCommand),

    /// Dashboard figures, optionally exported as JSON.
    Report {
        /// Write the export summary to this file.
        #[arg(
            long,
            value_name = "PATH",
            num_args = 0..=1,
            default_missing_value = DEFAULT_EXPORT_FILE
        )]
        export: Option<String>,
    },

    /// Configuration operations.
    Config(ConfigCommand),
}

/// File name used by `report --export` without a path.
pub const DEFAULT_EXPORT_FILE: &str = "stationery-connect-report.json";

/// Product subcommands.
#[derive(Parser, Debug)]
pub struct ProductsCommand {
    /// Product subcommand to execute.
    #[command(subcommand)]
    pub command: ProductsAction,
}

/// Available product subcommands.
#[derive(Subcommand, Debug)]
pub enum ProductsAction {
    /// List visible products.
    List {
        /// Match name or tag.
        #[arg(short, long)]
        search: Option<String>,

        /// Restrict to a category ("all" for every category).
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add a product.
    Add(ProductAddArgs),

    /// Change a product.
    Edit {
        /// Product id.
        id: String,

        /// Fields to change.
        #[command(flatten)]
        changes: ProductEditArgs,
    },

    /// Delete a product.
    Delete {
        /// Product id.
        id: String,
    },
}

/// Fields of a new product.
#[derive(Args, Debug, Clone)]
pub struct ProductAddArgs {
    /// Product id (generated when omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Catalog category.
    #[arg(long)]
    pub category: String,

    /// Unit price in rupees.
    #[arg(long)]
    pub price: f64,

    /// Units on hand.
    #[arg(long, default_value_t = 0)]
    pub stock: u32,

    /// Image URL.
    #[arg(long)]
    pub image: Option<String>,

    /// Search tag (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// List the product as out of stock.
    #[arg(long)]
    pub out_of_stock: bool,
}

/// Changes to an existing product.
#[derive(Args, Debug, Clone, Default)]
pub struct ProductEditArgs {
    /// New display name.
    #[arg(long)]
    pub name: Option<String>,

    /// New category.
    #[arg(long)]
    pub category: Option<String>,

    /// New unit price.
    #[arg(long)]
    pub price: Option<f64>,

    /// New stock level.
    #[arg(long)]
    pub stock: Option<u32>,

    /// New image URL.
    #[arg(long)]
    pub image: Option<String>,

    /// Tag to add (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    pub add_tags: Vec<String>,

    /// Tag to remove (repeatable).
    #[arg(long = "remove-tag", value_name = "TAG")]
    pub remove_tags: Vec<String>,

    /// Whether the product is in stock.
    #[arg(long, value_name = "BOOL")]
    pub in_stock: Option<bool>,
}

/// Customer subcommands.
#[derive(Parser, Debug)]
pub struct CustomersCommand {
    /// Customer subcommand to execute.
    #[command(subcommand)]
    pub command: CustomersAction,
}

/// Available customer subcommands.
#[derive(Subcommand, Debug)]
pub enum CustomersAction {
    /// List visible customers.
    List {
        /// Match name or location.
        #[arg(short, long)]
        search: Option<String>,

        /// Restrict to a group: premium, rural or budget-buyers.
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Add a customer.
    Add(CustomerAddArgs),

    /// Change a customer.
    Edit {
        /// Customer id.
        id: String,

        /// Fields to change.
        #[command(flatten)]
        changes: CustomerEditArgs,
    },

    /// Delete a customer.
    Delete {
        /// Customer id.
        id: String,
    },
}

impl ProductEditArgs {
    /// Whether no change was requested.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image.is_none()
            && self.add_tags.is_empty()
            && self.remove_tags.is_empty()
            && self.in_stock.is_none()
    }
}

/// Fields of a new customer.
#[derive(Args, Debug, Clone)]
pub struct CustomerAddArgs {
    /// Customer id (generated when omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Business name.
    #[arg(long)]
    pub name: String,

    /// WhatsApp number.
    #[arg(long, value_name = "NUMBER")]
    pub whatsapp: String,

    /// City and state.
    #[arg(long, default_value = "")]
    pub location: String,

    /// Purchasing budget in rupees.
    #[arg(long, default_value_t = 0)]
    pub budget: u64,

    /// Group: premium, rural or budget-buyers.
    #[arg(long, default_value = "budget-buyers")]
    pub group: String,

    /// Interest (repeatable).
    #[arg(long = "interest", value_name = "INTEREST")]
    pub interests: Vec<String>,

    /// Date of the last contact (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub last_contact: Option<NaiveDate>,
}

/// Changes to an existing customer.
#[derive(Args, Debug, Clone, Default)]
pub struct CustomerEditArgs {
    /// New business name.
    #[arg(long)]
    pub name: Option<String>,

    /// New WhatsApp number.
    #[arg(long, value_name = "NUMBER")]
    pub whatsapp: Option<String>,

    /// New location.
    #[arg(long)]
    pub location: Option<String>,

    /// New budget.
    #[arg(long)]
    pub budget: Option<u64>,

    /// New group.
    #[arg(long)]
    pub group: Option<String>,

    /// Interest to add (repeatable).
    #[arg(long = "interest", value_name = "INTEREST")]
    pub add_interests: Vec<String>,

    /// Interest to remove (repeatable).
    #[arg(long = "remove-interest", value_name = "INTEREST")]
    pub remove_interests: Vec<String>,

    /// Date of the last contact.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub last_contact: Option<NaiveDate>,
}

impl CustomerEditArgs {
    /// Whether no change was requested.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.whatsapp.is_none()
            && self.location.is_none()
            && self.budget.is_none()
            && self.group.is_none()
            && self.add_interests.is_empty()
            && self.remove_interests.is_empty()
            && self.last_contact.is_none()
    }
}

/// Blast subcommands.
#[derive(Parser, Debug)]
pub struct BlastCommand {
    /// Blast subcommand to execute.
    #[command(subcommand)]
    pub command: BlastAction,
}

/// Available blast subcommands.
#[derive(Subcommand, Debug)]
pub enum BlastAction {
    /// Render the message recipients would receive.
    Preview(ComposeArgs),

    /// Queue a blast (mocked: nothing is delivered).
    Send(ComposeArgs),

    /// List visible blasts.
    List,
}

/// Recipients, products and text of a blast.
#[derive(Args, Debug, Clone, Default)]
pub struct ComposeArgs {
    /// Recipient customer id (repeatable).
    #[arg(long = "customer", value_name = "ID")]
    pub customers: Vec<String>,

    /// Add every customer in this group.
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Featured product id (repeatable).
    #[arg(long = "product", value_name = "ID")]
    pub products: Vec<String>,

    /// Message text.
    #[arg(short, long, default_value = "")]
    pub message: String,

    /// Blast title (defaults to the first line of the message).
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "session.email").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "data.path").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
