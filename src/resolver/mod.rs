//! Unit price resolution: expand the layout into units, then look each unit
//! up in the price tier index.

pub mod expand;
pub mod index;
pub mod join;

pub use expand::{expand_layout, expand_rule};
pub use index::{Collision, IndexReport, PriceTierIndex};
pub use join::{join_prices, JoinSummary};

use crate::model::{LayoutRule, PriceTier, ResolvedUnit};

/// Result of resolving one notice.
#[derive(Debug)]
pub struct Resolution {
    pub units: Vec<ResolvedUnit>,
    pub summary: JoinSummary,
    pub index_report: IndexReport,
}

/// Expand `rules` and price every unit from `tiers`.
#[must_use]
pub fn resolve(rules: &[LayoutRule], tiers: Vec<PriceTier>) -> Resolution {
    let index = PriceTierIndex::build(tiers);
    let (units, summary) = join_prices(expand_layout(rules), &index);
    Resolution {
        units,
        summary,
        index_report: index.report().clone(),
    }
}
