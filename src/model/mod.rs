pub mod layout;
pub mod ledger;
pub mod lenient;
pub mod notice;
pub mod price_tier;
pub mod resolved;

pub use layout::{LayoutRule, Unit, MAX_FLOOR, MAX_LINE_NUMBER};
pub use ledger::{BuildingLedgerData, CodeParts, LedgerLookup};
pub use notice::{BalconyItem, LayoutEntry, LineSpec, OptionItem, ScheduleItem, SupplyInfo};
pub use price_tier::{
    normalize_unit_type, PaymentBreakdown, PriceTier, RawPriceTier, TierScope,
    INTERIM_INSTALLMENTS,
};
pub use resolved::{group_by_building, Building, ResolvedUnit, NO_PRICE_INFO};
