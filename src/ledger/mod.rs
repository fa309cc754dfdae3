//! Building ledger (건축물대장) lookup: address → PNU → title info.

pub mod cache;
pub mod client;
pub mod pnu;
pub mod service;

pub use crate::error::LedgerError;
pub use cache::LedgerCache;
pub use client::{BuildingHubClient, Geocoded, Geocoder, RetryPolicy, TitleInfoSource, VworldClient};
pub use pnu::{extract_pnu, normalize_service_key, split_pnu};
pub use service::LedgerService;
