//! # Presale Mapper
//!
//! Turns Korean apartment pre-sale notices (분양공고) into per-unit price
//! tables, and looks up building ledger (건축물대장) records by address.
//!
//! ## Features
//!
//! - Extract price tiers, layout, options, balcony, schedule and supply
//!   tables from notice PDFs through a document extraction service
//! - Parse floor descriptors such as `5~9층`, `10층 이상`, `최상층`
//! - Expand layout rules into units and attach the matching price tier
//! - Write CSV (UTF-8 with BOM) and JSON tables
//! - Look up ledger title info with a SQLite cache
//! - Browse resolved units in the terminal
//!
//! ## Example
//!
//! ```no_run
//! use presale_mapper::model::LayoutRule;
//! use presale_mapper::parser::read_price_tiers;
//! use presale_mapper::resolver::resolve;
//!
//! let tiers = read_price_tiers("prices.json").expect("failed to read tiers");
//! let rules = [LayoutRule::new("101", 1, "84A", 25).starting_at(2)];
//! let resolution = resolve(&rules, tiers);
//! println!("priced: {}", resolution.summary.priced);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod ui;
