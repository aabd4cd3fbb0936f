//! # Seed Data Generator
//!
//! Populates the database with a menu and a floor plan for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p tavola-db --bin seed
//!
//! # Specify database path and table count
//! cargo run -p tavola-db --bin seed -- --db ./data/tavola.db --tables 16
//! ```

use std::env;

use tavola_db::{Database, DbConfig};

/// Menu sections with (name, price in cents).
const MENU: &[(&str, &[(&str, i64)])] = &[
    (
        "Starters",
        &[
            ("Bruschetta", 650),
            ("Garlic Bread", 450),
            ("Caprese Salad", 850),
            ("Calamari Fritti", 1150),
            ("Minestrone Soup", 600),
        ],
    ),
    (
        "Mains",
        &[
            ("Margherita Pizza", 1200),
            ("Diavola Pizza", 1400),
            ("Spaghetti Carbonara", 1350),
            ("Lasagna al Forno", 1450),
            ("Risotto ai Funghi", 1550),
            ("Chicken Parmigiana", 1650),
            ("Grilled Salmon", 1950),
        ],
    ),
    (
        "Desserts",
        &[
            ("Tiramisu", 700),
            ("Panna Cotta", 650),
            ("Gelato (2 scoops)", 500),
        ],
    ),
    (
        "Drinks",
        &[
            ("Sparkling Water", 300),
            ("House Red (glass)", 650),
            ("House White (glass)", 650),
            ("Espresso", 250),
            ("Cappuccino", 350),
            ("Fresh Lemonade", 400),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tavola_dev.db");
    let mut table_count: usize = 12;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tavola POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./tavola_dev.db)");
                println!("  -t, --tables <N>     Number of dining tables (default: 12)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tavola POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if already seeded
    let existing = db.menu_repo().list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} menu items", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Menu
    println!();
    println!("Seeding menu...");
    let mut item_count = 0;
    for (category, items) in MENU {
        for (name, price_cents) in *items {
            db.menu_repo()
                .create(name, None, category, *price_cents)
                .await?;
            item_count += 1;
        }
    }
    println!("✓ Created {} menu items", item_count);

    // Floor plan: tables 1..N with varied capacities
    println!("Seeding floor plan...");
    for n in 1..=table_count {
        let capacity = match n % 4 {
            0 => 8,
            1 => 2,
            2 => 4,
            _ => 6,
        };
        db.tables()
            .create_table(&n.to_string(), capacity)
            .await?;
    }
    println!("✓ Created {} tables", table_count);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
