//! The `stationery` application.
//!
//! [`StationeryCli`] owns the loaded configuration, installs logging and
//! dispatches parsed commands to the handlers.

use tracing_subscriber::EnvFilter;

use stationery_core::{AppState, Result};
use stationery_crm::{Crm, CustomerFilter, ProductFilter, Session};

use crate::cli::{BlastAction, CliArgs, Command, CustomersAction, ProductsAction};
use crate::config::StationeryConfig;
use crate::{config_handlers, crm_handlers};

// ============================================================================
// StationeryCli
// ============================================================================

/// The CLI application.
pub struct StationeryCli {
    name: String,
    state: AppState<StationeryConfig>,
    version: String,
}

impl StationeryCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = StationeryConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create with an explicit configuration.
    pub fn new(name: impl Into<String>, config: StationeryConfig) -> Self {
        Self {
            name: name.into(),
            state: AppState::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &StationeryConfig {
        self.state.config()
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        let command = match args.command {
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                return Ok(());
            }
            Some(Command::Config(config_cmd)) => {
                return config_handlers::handle_config_command(
                    args.config.as_deref(),
                    config_cmd.command,
                );
            }
            Some(Command::Signup {
                email,
                name,
                role,
                company,
            }) => {
                let config = self.config();
                let mut crm = crm_handlers::open_crm(config)?;
                crm_handlers::handle_signup(
                    &mut crm,
                    &email,
                    &name,
                    role.as_deref(),
                    company.as_deref(),
                    args.password.as_deref(),
                )?;
                return crm_handlers::persist(&crm, config).await;
            }
            None => {
                println!("{} {} - use --help for usage", self.name, self.version);
                return Ok(());
            }
            Some(command) => command,
        };

        let config = self.config();
        let crm = crm_handlers::open_crm(config)?;
        let session = crm_handlers::login(
            &crm,
            config,
            args.as_email.as_deref(),
            args.password.as_deref(),
        )?;
        tracing::debug!(principal = %session.principal(), "dispatching command");

        let result = self.execute(&crm, &session, command).await;
        session.logout();
        result
    }

    async fn execute(&self, crm: &Crm, session: &Session, command: Command) -> Result<()> {
        let config = self.config();
        let principal = session.principal();
        match command {
            Command::Whoami => crm_handlers::handle_whoami(crm, session),
            Command::Products(cmd) => match cmd.command {
                ProductsAction::List { search, category } => {
                    let mut filter = ProductFilter::new();
                    if let Some(term) = search {
                        filter = filter.search(term);
                    }
                    if let Some(category) = category {
                        filter = filter.category(category);
                    }
                    let products = crm_handlers::list_products(crm, principal, &filter).await?;
                    crm_handlers::print_products(&products);
                    Ok(())
                }
                ProductsAction::Add(add) => {
                    crm_handlers::handle_product_add(crm, principal, &add).await?;
                    crm_handlers::persist(crm, config).await
                }
                ProductsAction::Edit { id, changes } => {
                    crm_handlers::handle_product_edit(crm, principal, &id, &changes).await?;
                    crm_handlers::persist(crm, config).await
                }
                ProductsAction::Delete { id } => {
                    let removed = crm
                        .products()
                        .delete(principal, &id)
                        .await
                        .map_err(crm_handlers::describe)?;
                    crm_handlers::persist(crm, config).await?;
                    println!("Deleted product {} ({})", removed.data.id, removed.data.name);
                    Ok(())
                }
            },
            Command::Customers(cmd) => match cmd.command {
                CustomersAction::List { search, group } => {
                    let mut filter = CustomerFilter::new();
                    if let Some(term) = search {
                        filter = filter.search(term);
                    }
                    if let Some(group) = crm_handlers::parse_group(group.as_deref())? {
                        filter = filter.group(group);
                    }
                    let customers =
                        crm_handlers::list_customers(crm, principal, &filter).await?;
                    crm_handlers::print_customers(&customers);
                    Ok(())
                }
                CustomersAction::Add(add) => {
                    crm_handlers::handle_customer_add(crm, principal, &add).await?;
                    crm_handlers::persist(crm, config).await
                }
                CustomersAction::Edit { id, changes } => {
                    crm_handlers::handle_customer_edit(crm, principal, &id, &changes).await?;
                    crm_handlers::persist(crm, config).await
                }
                CustomersAction::Delete { id } => {
                    let removed = crm
                        .customers()
                        .delete(principal, &id)
                        .await
                        .map_err(crm_handlers::describe)?;
                    crm_handlers::persist(crm, config).await?;
                    println!("Deleted customer {} ({})", removed.data.id, removed.data.name);
                    Ok(())
                }
            },
            Command::Blast(cmd) => match cmd.command {
                BlastAction::Preview(compose) => {
                    crm_handlers::handle_blast_preview(crm, principal, &compose).await
                }
                BlastAction::Send(compose) => {
                    crm_handlers::handle_blast_send(crm, principal, &compose).await?;
                    crm_handlers::persist(crm, config).await
                }
                BlastAction::List => crm_handlers::handle_blast_list(crm, principal).await,
            },
            Command::Report { export } => {
                crm_handlers::handle_report(crm, &self.state, principal, export.as_deref())
                    .await
                    .map(|_| ())
            }
            Command::Version | Command::Config(_) | Command::Signup { .. } => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
