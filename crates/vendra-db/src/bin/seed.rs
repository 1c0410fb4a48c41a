//! # Seed Data Generator
//!
//! Populates the database with development products, and can drive a demo
//! sale through the full engine.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p vendra-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p vendra-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p vendra-db --bin seed -- --db ./data/vendra.db
//!
//! # Also ring up one demo sale against the seeded catalog
//! cargo run -p vendra-db --bin seed -- --demo
//! ```
//!
//! ## Generated Products
//! Creates realistic product data across categories (beverages, snacks,
//! dairy, frozen, grocery). Each product has:
//! - Unique SKU: `{CATEGORY}-{NAME}-{INDEX}`
//! - Deterministic pseudo-random price and cost
//! - Stock level 0-100

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use vendra_core::{LineItemRequest, NewSale, PaymentMethod, Product};
use vendra_db::{Database, DbConfig};
use vendra_engine::{AllowAll, SaleEngine};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Cola", "Lemon Soda", "Orange Juice", "Apple Juice", "Iced Tea",
            "Sparkling Water", "Still Water", "Energy Drink", "Cold Brew", "Lemonade",
        ],
    ),
    (
        "SNK",
        &[
            "Salted Chips", "Tortilla Chips", "Chocolate Bar", "Gummy Bears", "Pretzels",
            "Trail Mix", "Granola Bar", "Cookies", "Crackers", "Popcorn",
        ],
    ),
    (
        "DRY",
        &[
            "Whole Milk", "Skim Milk", "Oat Milk", "Butter", "Cheddar Cheese",
            "Greek Yogurt", "Cream Cheese", "Sour Cream", "Eggs Dozen", "Parmesan",
        ],
    ),
    (
        "FRZ",
        &[
            "Vanilla Ice Cream", "Frozen Pizza", "Frozen Peas", "Fish Sticks", "Frozen Fries",
            "Frozen Berries", "Ice Cream Bars", "Frozen Waffles", "Sorbet", "Frozen Dinner",
        ],
    ),
    (
        "GRO",
        &[
            "White Bread", "Wheat Bread", "Spaghetti", "Penne", "White Rice",
            "Canned Beans", "Canned Tomatoes", "Peanut Butter", "Honey", "Oatmeal",
        ],
    ),
];

/// Size variants for products
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("6-Pack", 300),
    ("12-Pack", 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./vendra_dev.db");
    let mut demo = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--demo" => {
                demo = true;
            }
            "--help" | "-h" => {
                println!("Vendra Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./vendra_dev.db)");
                println!("      --demo         Ring up one demo sale after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Vendra Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("Connected to database, migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products", existing);
        println!("Skipping seed to avoid duplicates.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let mut first_product_id: Option<String> = None;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(
                    category_code,
                    name,
                    size_name,
                    *price_addon,
                    category_idx * 1000 + name_idx * 20 + size_idx,
                );

                let in_stock = product.quantity > 0;

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }

                // The demo sale needs a product with units on the shelf.
                if in_stock {
                    first_product_id.get_or_insert(product.id);
                }
                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Generated {} products in {:?}", generated, elapsed);

    if demo {
        run_demo_sale(&db, first_product_id).await?;
    }

    println!();
    println!("Seed complete!");

    Ok(())
}

/// Rings up, inspects, and refunds one sale through the full engine.
async fn run_demo_sale(
    db: &Database,
    product_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(product_id) = product_id else {
        println!("No products seeded; skipping demo sale");
        return Ok(());
    };

    println!();
    println!("Running demo sale...");

    let engine = SaleEngine::new(db.products(), db.sales(), AllowAll);

    let before = db
        .products()
        .get_by_id(&product_id)
        .await?
        .map(|p| p.quantity)
        .unwrap_or(0);

    let sale = engine
        .create_sale(
            "seed-tool",
            NewSale {
                store_id: "store-demo".to_string(),
                items: vec![LineItemRequest {
                    product_id: product_id.clone(),
                    quantity: 1,
                }],
                discount_cents: 0,
                tax_cents: 0,
                payment_method: PaymentMethod::Cash,
                notes: Some("seed demo sale".to_string()),
            },
        )
        .await?;

    println!("  Sale {} recorded, total {}", sale.sale_number, sale.total_amount());

    let refunded = engine.refund_sale("seed-tool", &sale.id).await?;
    let after = db
        .products()
        .get_by_id(&product_id)
        .await?
        .map(|p| p.quantity)
        .unwrap_or(0);

    println!(
        "  Refunded {}; stock {} -> {} (restored)",
        refunded.sale_number, before, after
    );

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> Product {
    let now = Utc::now();

    let compact: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    let sku = format!(
        "{}-{}-{:03}",
        category,
        compact[..compact.len().min(3)].to_uppercase(),
        seed
    );

    // Base price $1.99 - $9.99 plus the size addon
    let base_price = 199 + ((seed * 17) % 800) as i64;
    let price_cents = base_price + price_addon;

    // Cost at 60-80% of price
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_price_cents = price_cents * cost_pct / 100;

    Product {
        id: Uuid::new_v4().to_string(),
        sku,
        name: format!("{} {}", name, size),
        quantity: (seed % 101) as i64,
        price_cents,
        cost_price_cents,
        created_at: now,
        updated_at: now,
    }
}
