pub mod extraction;
pub mod floor_range;
pub mod layout_csv;
pub mod price_table;

pub use crate::error::LoadError;
pub use extraction::{parse_section, strip_code_fence};
pub use floor_range::{parse_floor_ranges, FloorRange, ParsedFloors, TOP_FLOOR};
pub use layout_csv::{detect_layout_kind, read_layout_rules, read_unit_list, LayoutKind, Loaded};
pub use price_table::read_price_tiers;
