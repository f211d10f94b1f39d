//! Handler functions for the CRM commands.
//!
//! These implement `whoami`, `signup`, `products`, `customers`, `blast` and
//! `report`. Every handler other than `signup` acts as the principal of an
//! explicit [`Session`].

use std::path::PathBuf;

use chrono::Utc;
use stationery_acl::{Principal, Record, Role};
use stationery_core::{AppState, Error, Result};
use stationery_crm::{
    Blast, BlastComposer, Crm, Customer, CustomerFilter, CustomerGroup, Dataset, NewAccount,
    Product, ProductFilter, Session,
};

use crate::cli::{ComposeArgs, CustomerAddArgs, CustomerEditArgs, ProductAddArgs, ProductEditArgs};
use crate::config::StationeryConfig;

// ============================================================================
// Setup
// ============================================================================

/// Build the CRM from the configured dataset, or the bundled demo.
pub fn open_crm(config: &StationeryConfig) -> Result<Crm> {
    let dataset = match config.dataset_path()? {
        Some(path) => Dataset::load(&path)?,
        None => Dataset::demo()?,
    };
    Ok(Crm::from_dataset(dataset).with_demo_password(config.session.demo_password.clone()))
}

/// Log in as `--as` (or the configured account).
pub fn login(
    crm: &Crm,
    config: &StationeryConfig,
    as_email: Option<&str>,
    password: Option<&str>,
) -> Result<Session> {
    let email = as_email.unwrap_or(&config.session.email);
    let password = password.unwrap_or(&config.session.demo_password);
    crm.login(email, password)
}

/// Write the CRM back to the configured dataset file.
///
/// The bundled demo is never written; changes to it last for one command.
pub async fn persist(crm: &Crm, config: &StationeryConfig) -> Result<()> {
    if let Some(path) = config.dataset_path()? {
        crm.snapshot().await?.save(&path)?;
        log::debug!("saved dataset to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// whoami
// ============================================================================

/// Print the session's account and company.
pub fn handle_whoami(crm: &Crm, session: &Session) -> Result<()> {
    let p = session.principal();
    println!("{} <{}>", display_name(p), p.email);
    println!("  Role:    {}", p.role);
    match crm.company(p) {
        Some(company) => println!("  Company: {} ({})", company.name, company.id),
        None => println!("  Company: {}", p.tenant_id),
    }
    Ok(())
}

fn display_name(p: &Principal) -> &str {
    if p.name.is_empty() { p.id.as_str() } else { &p.name }
}

// ============================================================================
// signup
// ============================================================================

/// Register an account. Without `company` the first listed company is
/// joined; without `password` the account uses the demo password.
pub fn handle_signup(
    crm: &mut Crm,
    email: &str,
    name: &str,
    role: Option<&str>,
    company: Option<&str>,
    password: Option<&str>,
) -> Result<Principal> {
    let role = match role {
        Some(r) => r
            .parse::<Role>()
            .map_err(|e| Error::invalid_data(e.to_string()))?,
        None => Role::User,
    };
    let tenant = match company {
        Some(c) => c.trim().to_string(),
        None => crm
            .companies()
            .first()
            .map(|c| c.id.clone())
            .ok_or_else(|| Error::invalid_data("company is required"))?,
    };

    let mut account = NewAccount::new(email, name, tenant).with_role(role);
    if let Some(password) = password {
        account = account.with_password(password);
    }
    let principal = crm.signup(account)?;
    println!(
        "Signed up {} <{}> as {} in {}",
        display_name(&principal),
        principal.email,
        principal.role,
        principal.tenant_id
    );
    Ok(principal)
}

// ============================================================================
// products / customers
// ============================================================================

/// Visible products matching the filter.
pub async fn list_products(
    crm: &Crm,
    principal: &Principal,
    filter: &ProductFilter,
) -> Result<Vec<Record<Product>>> {
    let products = crm.products().list(principal).await?;
    Ok(products.into_iter().filter(|r| filter.matches(&r.data)).collect())
}

/// Print a product table.
pub fn print_products(products: &[Record<Product>]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    println!("{:<8} {:<40} {:<12} {:>9} {:>6}", "ID", "NAME", "CATEGORY", "PRICE", "STOCK");
    for record in products {
        let p = &record.data;
        let stock = if p.in_stock {
            p.stock.to_string()
        } else {
            "out".to_string()
        };
        println!(
            "{:<8} {:<40} {:<12} {:>9} {:>6}",
            p.id,
            truncate(&p.name, 40),
            p.category,
            format!("₹{}", p.price),
            stock
        );
    }
    println!("\n{} product(s)", products.len());
}

/// Visible customers matching the filter.
pub async fn list_customers(
    crm: &Crm,
    principal: &Principal,
    filter: &CustomerFilter,
) -> Result<Vec<Record<Customer>>> {
    let customers = crm.customers().list(principal).await?;
    Ok(customers.into_iter().filter(|r| filter.matches(&r.data)).collect())
}

/// Print a customer table.
pub fn print_customers(customers: &[Record<Customer>]) {
    if customers.is_empty() {
        println!("No customers found.");
        return;
    }
    println!("{:<8} {:<28} {:<24} {:<14} {:>8}", "ID", "NAME", "LOCATION", "GROUP", "BUDGET");
    for record in customers {
        let c = &record.data;
        println!(
            "{:<8} {:<28} {:<24} {:<14} {:>8}",
            c.id,
            truncate(&c.name, 28),
            truncate(&c.location, 24),
            c.group.label(),
            c.budget
        );
    }
    println!("\n{} customer(s)", customers.len());
}

/// Parse a `--group` argument.
pub fn parse_group(group: Option<&str>) -> Result<Option<CustomerGroup>> {
    match group {
        None => Ok(None),
        Some(g) if g.eq_ignore_ascii_case("all") => Ok(None),
        Some(g) => g.parse().map(Some),
    }
}

/// Build a new product from `products add` arguments.
pub fn product_draft(args: &ProductAddArgs) -> Product {
    let mut product = Product::new(&args.name, &args.category, args.price).with_stock(args.stock);
    if let Some(id) = &args.id {
        product.id = id.trim().to_string();
    }
    if let Some(image) = &args.image {
        product.image = image.clone();
    }
    for tag in &args.tags {
        product.add_tag(tag.as_str());
    }
    product.in_stock = !args.out_of_stock;
    product
}

/// Apply `products edit` changes.
pub fn apply_product_edit(changes: &ProductEditArgs, product: &mut Product) {
    if let Some(name) = &changes.name {
        product.name = name.clone();
    }
    if let Some(category) = &changes.category {
        product.category = category.clone();
    }
    if let Some(price) = changes.price {
        product.price = price;
    }
    if let Some(stock) = changes.stock {
        product.stock = stock;
    }
    if let Some(image) = &changes.image {
        product.image = image.clone();
    }
    for tag in &changes.remove_tags {
        product.remove_tag(tag);
    }
    for tag in &changes.add_tags {
        product.add_tag(tag.as_str());
    }
    if let Some(in_stock) = changes.in_stock {
        product.in_stock = in_stock;
    }
}

/// Create a product in the principal's company.
pub async fn handle_product_add(
    crm: &Crm,
    principal: &Principal,
    args: &ProductAddArgs,
) -> Result<Record<Product>> {
    let record = crm.products().create(principal, &product_draft(args)).await?;
    println!("Added product {} ({})", record.data.id, record.data.name);
    Ok(record)
}

/// Change a product the principal may modify.
pub async fn handle_product_edit(
    crm: &Crm,
    principal: &Principal,
    id: &str,
    changes: &ProductEditArgs,
) -> Result<Record<Product>> {
    if changes.is_empty() {
        return Err(Error::invalid_data("nothing to change"));
    }
    let record = crm
        .products()
        .update(principal, id, |p| apply_product_edit(changes, p))
        .await
        .map_err(describe)?;
    println!("Updated product {} ({})", record.data.id, record.data.name);
    Ok(record)
}

/// Build a new customer from `customers add` arguments.
///
/// The last contact defaults to today.
pub fn customer_draft(args: &CustomerAddArgs) -> Result<Customer> {
    let group: CustomerGroup = args.group.parse()?;
    let mut customer = Customer::new(&args.name, &args.whatsapp, group)
        .with_location(&args.location)
        .with_budget(args.budget);
    if let Some(id) = &args.id {
        customer.id = id.trim().to_string();
    }
    for interest in &args.interests {
        customer.add_interest(interest.as_str());
    }
    customer.last_contact = Some(args.last_contact.unwrap_or_else(|| Utc::now().date_naive()));
    Ok(customer)
}

/// Apply `customers edit` changes. The group is parsed by the caller.
pub fn apply_customer_edit(
    changes: &CustomerEditArgs,
    group: Option<CustomerGroup>,
    customer: &mut Customer,
) {
    if let Some(name) = &changes.name {
        customer.name = name.clone();
    }
    if let Some(whatsapp) = &changes.whatsapp {
        customer.whatsapp_number = whatsapp.clone();
    }
    if let Some(location) = &changes.location {
        customer.location = location.clone();
    }
    if let Some(budget) = changes.budget {
        customer.budget = budget;
    }
    if let Some(group) = group {
        customer.group = group;
    }
    for interest in &changes.remove_interests {
        customer.remove_interest(interest);
    }
    for interest in &changes.add_interests {
        customer.add_interest(interest.as_str());
    }
    if let Some(date) = changes.last_contact {
        customer.last_contact = Some(date);
    }
}

/// Create a customer in the principal's company.
pub async fn handle_customer_add(
    crm: &Crm,
    principal: &Principal,
    args: &CustomerAddArgs,
) -> Result<Record<Customer>> {
    let draft = customer_draft(args)?;
    let record = crm.customers().create(principal, &draft).await?;
    println!("Added customer {} ({})", record.data.id, record.data.name);
    Ok(record)
}

/// Change a customer the principal may modify.
pub async fn handle_customer_edit(
    crm: &Crm,
    principal: &Principal,
    id: &str,
    changes: &CustomerEditArgs,
) -> Result<Record<Customer>> {
    if changes.is_empty() {
        return Err(Error::invalid_data("nothing to change"));
    }
    let group = changes
        .group
        .as_deref()
        .map(str::parse::<CustomerGroup>)
        .transpose()?;
    let record = crm
        .customers()
        .update(principal, id, |c| apply_customer_edit(changes, group, c))
        .await
        .map_err(describe)?;
    println!("Updated customer {} ({})", record.data.id, record.data.name);
    Ok(record)
}

// ============================================================================
// blast
// ============================================================================

/// Turn `blast preview|send` arguments into a composer.
pub async fn compose(crm: &Crm, principal: &Principal, args: &ComposeArgs) -> Result<BlastComposer> {
    let mut composer = BlastComposer::new().message(args.message.clone());
    if let Some(title) = &args.title {
        composer = composer.title(title.clone());
    }
    for id in &args.customers {
        composer = composer.customer(id.clone());
    }
    for id in &args.products {
        composer = composer.product(id.clone());
    }
    if let Some(group) = parse_group(args.group.as_deref())? {
        let customers = crm.customers().list(principal).await?;
        let added = composer.select_group(&customers, group);
        log::debug!("selected {added} customer(s) from group {group}");
    }
    Ok(composer)
}

/// Print the preview of a blast.
pub async fn handle_blast_preview(crm: &Crm, principal: &Principal, args: &ComposeArgs) -> Result<()> {
    let composer = compose(crm, principal, args).await?;
    let preview = crm.preview_blast(principal, &composer).await?;
    println!("{preview}");
    if let Err(e) = composer.validate() {
        eprintln!("\n(not ready to send: {e})");
    }
    Ok(())
}

/// Queue a blast and report what was queued.
pub async fn handle_blast_send(
    crm: &Crm,
    principal: &Principal,
    args: &ComposeArgs,
) -> Result<Record<Blast>> {
    let composer = compose(crm, principal, args).await?;
    let record = crm.send_blast(principal, composer).await?;
    println!(
        "WhatsApp blast queued: {} customer(s), {} product(s) [{}]",
        record.data.customer_ids.len(),
        record.data.product_ids.len(),
        record.data.id
    );
    Ok(record)
}

/// Print visible blasts.
pub async fn handle_blast_list(crm: &Crm, principal: &Principal) -> Result<()> {
    let blasts = crm.blasts().list(principal).await?;
    if blasts.is_empty() {
        println!("No blasts found.");
        return Ok(());
    }
    println!("{:<10} {:<10} {:>10} {:>6}  TITLE", "ID", "STATUS", "RECIPIENTS", "OPEN%");
    for record in &blasts {
        let b = &record.data;
        println!(
            "{:<10} {:<10} {:>10} {:>6}  {}",
            truncate(&b.id, 10),
            b.status,
            b.customer_ids.len(),
            b.open_rate,
            truncate(&b.title, 40)
        );
    }
    Ok(())
}

// ============================================================================
// report
// ============================================================================

/// Print the dashboard and optionally export the summary.
///
/// Relative export paths are resolved against the configured base path.
pub async fn handle_report(
    crm: &Crm,
    state: &AppState<StationeryConfig>,
    principal: &Principal,
    export: Option<&str>,
) -> Result<Option<PathBuf>> {
    let report = crm.report(principal).await?;

    println!("Dashboard for {}", principal.tenant_id);
    println!("  Products:          {}", report.total_products);
    println!("  Customers:         {}", report.total_customers);
    println!("  Pending blasts:    {}", report.pending_blasts);
    println!("  Inventory value:   ₹{}", report.inventory_value);
    match report.average_open_rate {
        Some(rate) => println!("  Avg open rate:     {rate:.1}%"),
        None => println!("  Avg open rate:     n/a"),
    }
    println!("  Total budget:      ₹{}", report.total_budget);
    println!(
        "  Stock:             {} in / {} out",
        report.in_stock, report.out_of_stock
    );

    println!("\nTop customers by budget:");
    for entry in &report.top_customers {
        println!("  {:<28} ₹{}", truncate(&entry.name, 28), entry.value);
    }
    println!("\nTop products by inventory value:");
    for entry in &report.top_products {
        println!("  {:<40} ₹{}", truncate(&entry.name, 40), entry.value);
    }
    println!("\nCategories:");
    for (category, count) in &report.category_distribution {
        println!("  {category:<14} {count}");
    }
    println!("\nCustomer groups:");
    for (group, count) in &report.group_distribution {
        println!("  {group:<14} {count}");
    }

    let Some(name) = export else {
        return Ok(None);
    };
    let path = state.data_path(name)?;
    let summary = crm.export_summary(principal).await?;
    summary.write_to(&path)?;
    println!("\nReport exported to {}", path.display());
    Ok(Some(path))
}

// ============================================================================
// Helpers
// ============================================================================

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Map "not found" for an explicitly named record to a friendlier message.
pub fn describe(err: Error) -> Error {
    match err {
        Error::NotFound(what) => Error::NotFound(format!("{what} (no such record in your company)")),
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stationery_crm::BlastStatus;

    fn demo() -> (Crm, StationeryConfig) {
        let config = StationeryConfig::default();
        (open_crm(&config).unwrap(), config)
    }

    #[test]
    fn test_login_defaults_to_configured_account() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        assert_eq!(session.principal().role, Role::Admin);

        let session = login(&crm, &config, Some("user@company.com"), None).unwrap();
        assert_eq!(session.principal().role, Role::User);

        let err = login(&crm, &config, Some("user@company.com"), Some("bad")).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[test]
    fn test_open_crm_honours_demo_password() {
        let mut config = StationeryConfig::default();
        config.session.demo_password = "opensesame".into();
        let crm = open_crm(&config).unwrap();
        assert!(login(&crm, &config, None, None).is_ok());
        assert!(crm.login("admin@company.com", "password123").is_err());
    }

    #[tokio::test]
    async fn test_list_products_filtered() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        let filter = ProductFilter::new().search("set");
        let products = list_products(&crm, session.principal(), &filter).await.unwrap();
        let ids: Vec<&str> = products.iter().map(|r| r.data.id.as_str()).collect();
        assert_eq!(ids, vec!["p-1", "p-4"]);
        print_products(&products);
    }

    #[tokio::test]
    async fn test_list_customers_by_group() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        let group = parse_group(Some("premium")).unwrap().unwrap();
        let filter = CustomerFilter::new().group(group);
        let customers = list_customers(&crm, session.principal(), &filter).await.unwrap();
        assert_eq!(customers.len(), 3);
        print_customers(&customers);
    }

    fn sketch_pad() -> ProductAddArgs {
        ProductAddArgs {
            id: Some("p-sketch".into()),
            name: "Sketch Pad".into(),
            category: "Art".into(),
            price: 120.0,
            stock: 40,
            image: None,
            tags: vec!["art".into(), "art".into(), " ".into()],
            out_of_stock: false,
        }
    }

    #[test]
    fn test_product_draft() {
        let product = product_draft(&sketch_pad());
        assert_eq!(product.id, "p-sketch");
        assert_eq!(product.tags, vec!["art"]);
        assert!(product.in_stock);

        let mut args = sketch_pad();
        args.id = None;
        args.out_of_stock = true;
        let product = product_draft(&args);
        assert!(!product.id.is_empty());
        assert!(!product.in_stock);
    }

    #[tokio::test]
    async fn test_product_add_and_edit() {
        let (crm, config) = demo();
        let session = login(&crm, &config, Some("user@company.com"), None).unwrap();
        let principal = session.principal();

        let added = handle_product_add(&crm, principal, &sketch_pad()).await.unwrap();
        assert_eq!(added.tenant_id.as_str(), principal.tenant_id.as_str());

        let changes = ProductEditArgs {
            price: Some(99.0),
            add_tags: vec!["school".into()],
            remove_tags: vec!["art".into()],
            ..Default::default()
        };
        let edited = handle_product_edit(&crm, principal, "p-sketch", &changes)
            .await
            .unwrap();
        assert_eq!(edited.data.price, 99.0);
        assert_eq!(edited.data.tags, vec!["school"]);
        assert_eq!(edited.created_at, added.created_at);

        let err = handle_product_add(&crm, principal, &sketch_pad()).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_product_edit_rejections() {
        let (crm, config) = demo();
        let session = login(&crm, &config, Some("user@company.com"), None).unwrap();
        let principal = session.principal();
        let changes = ProductEditArgs {
            price: Some(1.0),
            ..Default::default()
        };

        let err = handle_product_edit(&crm, principal, "p-1", &changes).await.unwrap_err();
        assert!(err.is_permission_denied());

        let err = handle_product_edit(&crm, principal, "p2-1", &changes).await.unwrap_err();
        assert!(err.to_string().contains("no such record in your company"));

        let err = handle_product_edit(&crm, principal, "p-1", &ProductEditArgs::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nothing to change"));

        let invalid = ProductEditArgs {
            price: Some(-5.0),
            ..Default::default()
        };
        let admin = login(&crm, &config, None, None).unwrap();
        let err = handle_product_edit(&crm, admin.principal(), "p-1", &invalid)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        let unchanged = crm.products().get(admin.principal(), "p-1").await.unwrap();
        assert!(unchanged.data.price > 0.0);
    }

    #[tokio::test]
    async fn test_customer_add_and_edit() {
        let (crm, config) = demo();
        let session = login(&crm, &config, Some("manager@company.com"), None).unwrap();
        let principal = session.principal();

        let args = CustomerAddArgs {
            id: Some("c-new".into()),
            name: "Asha Traders".into(),
            whatsapp: "+91 90000 11111".into(),
            location: "Pune, Maharashtra".into(),
            budget: 8_000,
            group: "rural".into(),
            interests: vec!["Pens".into()],
            last_contact: None,
        };
        let added = handle_customer_add(&crm, principal, &args).await.unwrap();
        assert_eq!(added.data.group, CustomerGroup::Rural);
        assert_eq!(added.data.last_contact, Some(Utc::now().date_naive()));

        let changes = CustomerEditArgs {
            group: Some("premium".into()),
            budget: Some(25_000),
            add_interests: vec!["Diaries".into()],
            remove_interests: vec!["Pens".into()],
            last_contact: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        let edited = handle_customer_edit(&crm, principal, "c-new", &changes)
            .await
            .unwrap();
        assert_eq!(edited.data.group, CustomerGroup::Premium);
        assert_eq!(edited.data.budget, 25_000);
        assert_eq!(edited.data.interests, vec!["Diaries"]);
        assert_eq!(edited.data.last_contact, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_customer_bad_input() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        let principal = session.principal();

        let args = CustomerAddArgs {
            id: None,
            name: "Nobody".into(),
            whatsapp: "12".into(),
            location: String::new(),
            budget: 0,
            group: "budget-buyers".into(),
            interests: Vec::new(),
            last_contact: None,
        };
        let err = handle_customer_add(&crm, principal, &args).await.unwrap_err();
        assert!(err.to_string().contains("WhatsApp"));

        let changes = CustomerEditArgs {
            group: Some("vip".into()),
            ..Default::default()
        };
        let err = handle_customer_edit(&crm, principal, "c-1", &changes)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown customer group"));
    }

    #[test]
    fn test_signup_defaults() {
        let (mut crm, config) = demo();
        let principal =
            handle_signup(&mut crm, "new@company.com", "New Hire", None, None, None).unwrap();
        assert_eq!(principal.role, Role::User);
        assert_eq!(principal.tenant_id.as_str(), crm.companies()[0].id);
        assert!(login(&crm, &config, Some("new@company.com"), None).is_ok());

        let err = handle_signup(&mut crm, "x@company.com", "X", Some("owner"), None, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = handle_signup(&mut crm, "y@company.com", "Y", None, Some("nowhere"), None)
            .unwrap_err();
        assert!(err.to_string().contains("unknown company"));
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group(None).unwrap(), None);
        assert_eq!(parse_group(Some("ALL")).unwrap(), None);
        assert_eq!(
            parse_group(Some("budget-buyers")).unwrap(),
            Some(CustomerGroup::BudgetBuyers)
        );
        assert!(parse_group(Some("vip")).is_err());
    }

    #[tokio::test]
    async fn test_compose_with_group() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        let args = ComposeArgs {
            group: Some("rural".into()),
            customers: vec!["c-1".into()],
            products: vec!["p-3".into()],
            message: "Paper restocked".into(),
            ..Default::default()
        };
        let composer = compose(&crm, session.principal(), &args).await.unwrap();
        assert_eq!(composer.customer_ids().collect::<Vec<_>>(), vec!["c-1", "c-4"]);
        assert!(composer.validate().is_ok());
    }

    #[tokio::test]
    async fn test_blast_send_and_list() {
        let (crm, config) = demo();
        let session = login(&crm, &config, Some("manager@company.com"), None).unwrap();
        let args = ComposeArgs {
            customers: vec!["c-2".into()],
            products: vec!["p-6".into()],
            message: "Combo deals".into(),
            ..Default::default()
        };
        let record = handle_blast_send(&crm, session.principal(), &args).await.unwrap();
        assert_eq!(record.data.status, BlastStatus::Pending);
        handle_blast_list(&crm, session.principal()).await.unwrap();
        assert_eq!(crm.blasts().list(session.principal()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_blast_send_incomplete() {
        let (crm, config) = demo();
        let session = login(&crm, &config, None, None).unwrap();
        let args = ComposeArgs {
            message: "Nobody to send to".into(),
            ..Default::default()
        };
        let err = handle_blast_send(&crm, session.principal(), &args).await.unwrap_err();
        assert!(err.to_string().contains("incomplete selection"));
        handle_blast_preview(&crm, session.principal(), &args).await.unwrap();
    }

    #[tokio::test]
    async fn test_report_export_relative_to_base() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = StationeryConfig {
            base_path: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        };
        let crm = open_crm(&config).unwrap();
        let session = login(&crm, &config, None, None).unwrap();
        let state = AppState::new(config);

        let path = handle_report(&crm, &state, session.principal(), Some("out.json"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("out.json"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"campaigns\": 3"));

        let none = handle_report(&crm, &state, session.principal(), None).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_persist_writes_configured_dataset() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_file = dir.path().join("data.json");
        Dataset::demo().unwrap().save(&data_file).unwrap();

        let mut config = StationeryConfig::default();
        config.data.path = Some(data_file.to_string_lossy().into_owned());
        let crm = open_crm(&config).unwrap();
        let session = login(&crm, &config, None, None).unwrap();
        crm.products().delete(session.principal(), "p-2").await.unwrap();
        persist(&crm, &config).await.unwrap();

        let reloaded = Dataset::load(&data_file).unwrap();
        assert_eq!(reloaded.products.len(), 6);
        assert!(reloaded.products.iter().all(|r| r.data.id != "p-2"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_describe_not_found() {
        let err = describe(Error::not_found("product 'p-9'"));
        assert!(err.to_string().contains("no such record in your company"));
        let err = describe(Error::InvalidCredentials);
        assert!(matches!(err, Error::InvalidCredentials));
    }
}
