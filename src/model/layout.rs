use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Highest line a 호 number can carry in its last two digits.
pub const MAX_LINE_NUMBER: u32 = 99;

/// Highest floor a layout may reach.
pub const MAX_FLOOR: u32 = 999;

/// One building line and the floors it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRule {
    pub building_id: String,
    pub line_number: u32,
    pub unit_type: String,
    pub floor_max: u32,
    /// Piloti and mechanical floors without units.
    pub excluded_floors: BTreeSet<u32>,
    pub direction: Option<String>,
}

impl LayoutRule {
    #[must_use]
    pub fn new(
        building_id: impl Into<String>,
        line_number: u32,
        unit_type: impl Into<String>,
        floor_max: u32,
    ) -> Self {
        Self {
            building_id: building_id.into(),
            line_number,
            unit_type: unit_type.into(),
            floor_max,
            excluded_floors: BTreeSet::new(),
            direction: None,
        }
    }

    #[must_use]
    pub fn excluding(mut self, floors: impl IntoIterator<Item = u32>) -> Self {
        self.excluded_floors.extend(floors);
        self
    }

    /// Exclude everything below `floor_min` (layout files give a lowest floor
    /// instead of listing piloti floors).
    #[must_use]
    pub fn starting_at(self, floor_min: u32) -> Self {
        self.excluding(1..floor_min.min(MAX_FLOOR + 1))
    }

    /// Line and top floor fit `floor * 100 + line` numbering.
    #[must_use]
    pub fn is_numberable(&self) -> bool {
        self.line_number <= MAX_LINE_NUMBER && self.floor_max <= MAX_FLOOR
    }
}

/// A physical unit (세대).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub building_id: String,
    pub unit_number: u32,
    pub unit_type: String,
    pub floor: u32,
    pub line_number: u32,
    pub direction: Option<String>,
}

impl Unit {
    /// Build a unit from its 호 number: 305 → floor 3, line 5.
    ///
    /// Numbers below 100 carry no floor digits and are placed on floor 1.
    #[must_use]
    pub fn from_unit_number(
        building_id: impl Into<String>,
        unit_number: u32,
        unit_type: impl Into<String>,
    ) -> Self {
        let floor = if unit_number >= 100 { unit_number / 100 } else { 1 };
        Self {
            building_id: building_id.into(),
            unit_number,
            unit_type: unit_type.into(),
            floor,
            line_number: unit_number % 100,
            direction: None,
        }
    }
}
