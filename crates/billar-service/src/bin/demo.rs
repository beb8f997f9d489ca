//! # Register Walkthrough
//!
//! Seeds a small bar catalog and walks every register operation once:
//! bootstrap login, catalog upsert, an invoiced restock, a purchase draft,
//! sales, and the printed documents (price list, receipt, sales report,
//! inventory-at-date report).
//!
//! ## Usage
//! ```bash
//! # Default database (./billar.db, created on first run)
//! cargo run -p billar-service --bin demo
//!
//! # Custom database path
//! cargo run -p billar-service --bin demo -- --db ./data/club.db
//!
//! # Show service logs alongside the documents
//! RUST_LOG=info cargo run -p billar-service --bin demo
//! ```

use std::env;

use billar_core::{DocumentRenderer, Money, PurchaseDraft, TextRenderer};
use billar_db::{Database, DbConfig};
use billar_service::{
    AuthService, CatalogService, Feedback, InventoryService, ProductEntry, ReportService,
    RestockService, SaleService, ServiceConfig,
};
use chrono::{Duration, Utc};
use tracing_subscriber::EnvFilter;

/// Bar catalog seeded on first run: (code, name, price, cost, stock, iva bps).
const CATALOG: &[(&str, &str, i64, i64, i64, u32)] = &[
    ("FER750", "Fernet 750", 9000, 6500, 12, 2100),
    ("COC150", "Coca 1.5L", 2300, 1200, 24, 2100),
    ("QUI100", "Quilmes litro", 2800, 1600, 36, 2100),
    ("AGU500", "Agua 500ml", 1000, 450, 30, 2100),
    ("PAP090", "Papas fritas 90g", 1500, 800, 18, 2100),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = ServiceConfig::load()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Billar POS Register Walkthrough");
                println!();
                println!("Usage: demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./billar.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🎱 Billar POS Register Walkthrough");
    println!("==================================");
    println!("Database: {}", config.database_path.display());
    println!("Business: {}", config.business_name);
    println!();

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let auth = AuthService::new(db.clone(), &config);
    let catalog = CatalogService::new(db.clone());
    let restock = RestockService::new(db.clone());
    let register = SaleService::new(db.clone());
    let inventory = InventoryService::new(db.clone());
    let reports = ReportService::new(db.clone(), &config.business_name);
    let renderer = TextRenderer::default();

    // The bootstrap pair works even on an empty users table.
    let session = auth
        .login(&config.bootstrap_user, &config.bootstrap_password)
        .await?;
    println!("✓ Logged in as {} (admin)", session.username);

    let caro = Feedback::from_result(auth.create_user(&session, "caro", "caro1234", false).await);
    println!("{} {}", if caro.ok { "✓" } else { "⚠" }, caro.message);

    // Seed stock counts only once; re-runs refresh names and prices but
    // leave the counted stock alone.
    let first_run = db.products().count().await? == 0;
    let mut created = 0;
    let mut updated = 0;
    for &(code, name, price, cost, stock, iva_bps) in CATALOG {
        let outcome = catalog
            .upsert_product(ProductEntry {
                code: code.to_string(),
                name: name.to_string(),
                price: Money::from_units(price),
                cost: Money::from_units(cost),
                stock: if first_run { Some(stock) } else { None },
                iva_bps,
                company: Some("Distribuidora Sur".to_string()),
            })
            .await?;
        if outcome.created {
            created += 1;
        } else {
            updated += 1;
        }
    }
    println!("✓ Catalog upserted ({} created, {} updated)", created, updated);

    let fernet = catalog
        .find_by_code("FER750")
        .await?
        .ok_or("Fernet missing from catalog")?;
    let coca = catalog
        .find_by_code("COC150")
        .await?
        .ok_or("Coca missing from catalog")?;
    let agua = catalog
        .find_by_code("AGU500")
        .await?
        .ok_or("Agua missing from catalog")?;

    // Invoiced restock: the unit cost is derived from the invoice total.
    println!();
    println!("Restocking...");
    let outcome = restock
        .restock(&session, &fernet.id, 12, Some(Money::from_units(78_000)), None)
        .await?;
    println!("✓ {}: {}", fernet.name, outcome.summary);

    // Multi-product delivery entered as one draft, applied as one batch.
    let mut draft = PurchaseDraft::new(Some("Distribuidora Sur".to_string()));
    draft.add_line(&coca, 24, Some(Money::from_units(26_400)), None)?;
    draft.add_line(&agua, 30, Some(Money::from_units(10_500)), Some(Money::from_units(1_100)))?;
    let batch = restock.submit_draft(&session, &draft).await?;
    println!("✓ {} (batch {})", batch.summary, batch.batch_id);

    // A day at the tables.
    println!();
    println!("Selling...");
    let sale = register.register_sale(&fernet.id, 2).await?;
    println!("✓ {}", sale.summary);
    let second = register.register_sale(&coca.id, 3).await?;
    println!("✓ {}", second.summary);

    // An over-ask is refused with the available count; stock never goes
    // negative.
    let refused = Feedback::from_result(register.register_sale(&agua.id, 10_000).await);
    println!("⚠ {}", refused.message);

    // Printed documents.
    println!();
    let price_list = reports.render_price_list(&renderer).await?;
    print!("{}", String::from_utf8_lossy(&price_list));

    println!();
    let receipt = reports.receipt(&sale.sale_id).await?;
    print!("{}", String::from_utf8_lossy(&renderer.render_receipt(&receipt)));

    println!();
    let window_start = Utc::now() - Duration::hours(1);
    let sales_report = reports
        .render_sales_report(&renderer, window_start, Utc::now())
        .await?;
    print!("{}", String::from_utf8_lossy(&sales_report));

    println!();
    let cutoff = Utc::now() - Duration::days(1);
    let report = inventory.inventory_at(cutoff).await?;
    print!("{}", String::from_utf8_lossy(&renderer.render_inventory(&report)));

    println!();
    println!("✓ Walkthrough complete!");

    Ok(())
}
