//! # Seed Data Generator
//!
//! Populates a database with a demo merchant for local development.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockwise-db --bin seed
//!
//! # Specify database path and starting stock per item
//! cargo run -p stockwise-db --bin seed -- --db ./stockwise.db --stock 25
//! ```
//!
//! ## Generated Data
//! - One merchant with two shops
//! - A small catalog (beverages, snacks, dairy)
//! - Opening stock for every item in both shops, each with a `stock_in`
//!   movement
//! - One active, merchant-wide 10% promotion with no minimum spend

use chrono::Utc;
use std::env;
use stockwise_core::{MovementType, Promotion, PromotionType};
use stockwise_db::{Database, DbConfig, NewMovement};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (sku, name, price cents, cost cents)
const CATALOG: &[(&str, &str, i64, i64)] = &[
    ("BEV-COKE-330", "Coca-Cola 330ml", 150, 90),
    ("BEV-WATER-500", "Still Water 500ml", 100, 40),
    ("BEV-OJ-1L", "Orange Juice 1L", 350, 210),
    ("SNK-CHIPS-150", "Salted Chips 150g", 275, 150),
    ("SNK-CHOC-50", "Milk Chocolate 50g", 125, 70),
    ("DRY-MILK-1L", "Whole Milk 1L", 199, 130),
    ("DRY-EGGS-12", "Eggs Dozen", 425, 300),
    ("DRY-BUTTER-250", "Butter 250g", 380, 260),
];

const SHOPS: &[&str] = &["Main Street", "Harbour Kiosk"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockwise_dev.db");
    let mut opening_stock: i64 = 50;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    opening_stock = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockwise Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./stockwise_dev.db)");
                println!("  -s, --stock <N>     Opening stock per item and shop (default: 50)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, opening_stock, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();
    let ledger = db.stock();

    let merchant_id = catalog.insert_merchant("Demo Merchant").await?;

    let mut shops = Vec::with_capacity(SHOPS.len());
    for name in SHOPS {
        shops.push(catalog.insert_shop(&merchant_id, name).await?);
    }

    let mut items = Vec::with_capacity(CATALOG.len());
    for (sku, name, price, cost) in CATALOG {
        items.push(catalog.insert_item(&merchant_id, sku, name, *price, Some(*cost)).await?);
    }

    // Opening stock: one transaction, one movement per row.
    let mut tx = db.begin().await?;
    let now = Utc::now();
    for shop in &shops {
        for item in &items {
            let new_quantity = ledger
                .increment(&mut tx, &shop.id, &item.id, opening_stock, Some(now))
                .await?;
            ledger
                .record_movement(
                    &mut tx,
                    NewMovement {
                        shop_id: &shop.id,
                        item_id: &item.id,
                        user_id: &merchant_id,
                        movement_type: MovementType::StockIn,
                        quantity_changed: opening_stock,
                        new_quantity_after: new_quantity,
                        reason: Some("opening stock"),
                        reference_id: None,
                    },
                )
                .await?;
        }
    }
    tx.commit().await?;

    let promotion = Promotion {
        id: Uuid::new_v4().to_string(),
        merchant_id: merchant_id.clone(),
        shop_id: None,
        name: "Ten percent off".to_string(),
        promotion_type: PromotionType::Percentage,
        value: 1000,
        min_spend_cents: 0,
        start_date: None,
        end_date: None,
        is_active: true,
        created_at: now,
    };
    db.promotions().insert(&promotion).await?;

    println!();
    println!("✓ Seed complete");
    println!("  Merchant:  {}", merchant_id);
    for shop in &shops {
        println!("  Shop:      {} ({})", shop.id, shop.name);
    }
    println!("  Items:     {}", catalog.count_items(&merchant_id).await?);
    println!("  Promotion: {} (10% off)", promotion.id);

    Ok(())
}
