use super::{PriceTier, Unit};
use serde::{Deserialize, Serialize};

/// Marker written in the price column when no tier covers a unit.
pub const NO_PRICE_INFO: &str = "가격정보없음";

/// A unit with the price tier that applies to it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUnit {
    #[serde(flatten)]
    pub unit: Unit,
    pub price: Option<PriceTier>,
}

impl ResolvedUnit {
    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.price.is_some()
    }

    #[must_use]
    pub fn total_price(&self) -> Option<u64> {
        self.price.as_ref().map(|tier| tier.total_price)
    }
}

/// Resolved units grouped by building, in first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub units: Vec<ResolvedUnit>,
}

impl Building {
    #[must_use]
    pub fn priced_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_priced()).count()
    }
}

/// Group units by building without reordering within a building.
#[must_use]
pub fn group_by_building(units: &[ResolvedUnit]) -> Vec<Building> {
    let mut buildings: Vec<Building> = Vec::new();
    for unit in units {
        match buildings.iter_mut().find(|b| b.id == unit.unit.building_id) {
            Some(building) => building.units.push(unit.clone()),
            None => buildings.push(Building {
                id: unit.unit.building_id.clone(),
                units: vec![unit.clone()],
            }),
        }
    }
    buildings
}
