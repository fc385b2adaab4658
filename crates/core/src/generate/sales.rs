//! Flat sales ledger used for descriptive-statistics exercises.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    ensure_dir, pick, random_date, round2, seeded_rng, write_csv, ymd, DatasetSummary,
    DEFAULT_SEED,
};
use crate::error::CoreError;
use crate::types::Date;

pub const DEFAULT_ORDERS: usize = 500;
pub const SALES_FILE: &str = "sales_data.csv";

const REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];
const CHANNELS: &[&str] = &["Online", "Store", "Phone"];
const SEGMENTS: &[&str] = &["Individual", "Corporate", "Small Business"];

/// A product category with its catalogue and price/margin ranges.
struct CategoryProfile {
    name: &'static str,
    products: [&'static str; 5],
    unit_price: (f64, f64),
    margin_percent: (f64, f64),
}

const CATEGORIES: &[CategoryProfile] = &[
    CategoryProfile {
        name: "Electronics",
        products: ["Laptop", "Smartphone", "Tablet", "Headphones", "Smart Watch"],
        unit_price: (200.0, 2000.0),
        margin_percent: (15.0, 40.0),
    },
    CategoryProfile {
        name: "Clothing",
        products: ["T-Shirt", "Jeans", "Jacket", "Shoes", "Dress"],
        unit_price: (20.0, 200.0),
        margin_percent: (30.0, 60.0),
    },
    CategoryProfile {
        name: "Food",
        products: ["Coffee", "Snacks", "Beverages", "Frozen Food", "Fresh Produce"],
        unit_price: (5.0, 50.0),
        margin_percent: (20.0, 45.0),
    },
    CategoryProfile {
        name: "Books",
        products: ["Fiction", "Non-Fiction", "Educational", "Comics", "Magazines"],
        unit_price: (10.0, 60.0),
        margin_percent: (35.0, 55.0),
    },
    CategoryProfile {
        name: "Toys",
        products: ["Action Figures", "Board Games", "Puzzles", "Dolls", "Building Blocks"],
        unit_price: (15.0, 150.0),
        margin_percent: (25.0, 50.0),
    },
    CategoryProfile {
        name: "Sports",
        products: ["Basketball", "Football", "Tennis Racket", "Yoga Mat", "Dumbbells"],
        unit_price: (30.0, 300.0),
        margin_percent: (28.0, 48.0),
    },
    CategoryProfile {
        name: "Home & Garden",
        products: ["Furniture", "Kitchen Appliances", "Decor", "Gardening Tools", "Bedding"],
        unit_price: (50.0, 500.0),
        margin_percent: (22.0, 45.0),
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesConfig {
    pub orders: usize,
    pub seed: u64,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            orders: DEFAULT_ORDERS,
            seed: DEFAULT_SEED,
        }
    }
}

/// One order line. Money columns carry two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub order_id: String,
    pub date: Date,
    pub region: String,
    pub sales_channel: String,
    pub customer_segment: String,
    pub category: String,
    pub product: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_sales: f64,
    pub discount_percent: f64,
    pub shipping_cost: f64,
    pub profit_margin: f64,
    pub discount_amount: f64,
    pub net_sales: f64,
    pub profit: f64,
    pub total_cost: f64,
}

pub fn generate(config: &SalesConfig) -> Result<Vec<SaleRecord>, CoreError> {
    if config.orders == 0 {
        return Err(CoreError::Validation(
            "order count must be at least 1".into(),
        ));
    }

    let mut rng = seeded_rng(config.seed);
    let start = ymd(2023, 1, 1);
    let end = ymd(2024, 12, 31);

    let records = (0..config.orders)
        .map(|_| {
            let order_id = format!(
                "ORD{}{}",
                2023 + rng.random_range(0..=1),
                rng.random_range(10_000..=99_999)
            );
            let date = random_date(&mut rng, start, end);
            let profile = pick(&mut rng, CATEGORIES);
            let product = *pick(&mut rng, &profile.products);

            let quantity = rng.random_range(1..50u32);
            let unit_price = round2(rng.random_range(profile.unit_price.0..profile.unit_price.1));
            let profit_margin =
                round2(rng.random_range(profile.margin_percent.0..profile.margin_percent.1));
            let total_sales = round2(f64::from(quantity) * unit_price);
            let discount_percent = round2(rng.random_range(0.0..25.0));

            let channel = *pick(&mut rng, CHANNELS);
            let shipping_cost = match channel {
                "Online" => round2(rng.random_range(5.0..30.0)),
                "Phone" => round2(rng.random_range(10.0..40.0)),
                _ => 0.0,
            };

            let discount_amount = round2(total_sales * discount_percent / 100.0);
            let net_sales = round2(total_sales - discount_amount);

            SaleRecord {
                order_id,
                date,
                region: (*pick(&mut rng, REGIONS)).into(),
                sales_channel: channel.into(),
                customer_segment: (*pick(&mut rng, SEGMENTS)).into(),
                category: profile.name.into(),
                product: product.into(),
                quantity,
                unit_price,
                total_sales,
                discount_percent,
                shipping_cost,
                profit_margin,
                discount_amount,
                net_sales,
                profit: round2(net_sales * profit_margin / 100.0),
                total_cost: round2(net_sales + shipping_cost),
            }
        })
        .collect();

    Ok(records)
}

/// Write the ledger to `<dir>/sales_data.csv`.
pub fn write(records: &[SaleRecord], dir: &Path) -> Result<DatasetSummary, CoreError> {
    ensure_dir(dir)?;
    let written = write_csv(dir, SALES_FILE, records)?;
    tracing::info!(rows = written, "Generated {SALES_FILE}");

    let mut summary = DatasetSummary::default();
    summary.push(SALES_FILE, written);
    Ok(summary)
}
