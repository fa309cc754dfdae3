//! (unit type, floor) → price tier lookup.
//!
//! Ranges are expanded floor by floor when the index is built, so lookups are
//! a single hash probe and overlapping ranges resolve deterministically: the
//! tier registered last for a floor wins. Every such overwrite is recorded as
//! a [`Collision`] so overlapping price tables can be reviewed.

use crate::model::{normalize_unit_type, PriceTier, TierScope};
use crate::parser::parse_floor_ranges;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

type FloorTable = HashMap<(String, u32), usize>;

/// Key of a line-specific override table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LineKey {
    unit_type: String,
    building_id: String,
    line_number: u32,
}

/// Two tiers claimed the same floor; `winner` replaced `replaced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub unit_type: String,
    pub floor: u32,
    pub scope: TierScope,
    pub replaced: usize,
    pub winner: usize,
}

/// Data-quality summary of one index build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub tiers: usize,
    pub registered_floors: usize,
    /// Floor-descriptor segments that could not be read.
    pub skipped_segments: usize,
    /// Tier positions whose descriptor produced no floors at all.
    pub empty_tiers: Vec<usize>,
    pub collisions: Vec<Collision>,
}

#[derive(Debug, Default)]
pub struct PriceTierIndex {
    tiers: Vec<PriceTier>,
    default: FloorTable,
    overrides: HashMap<LineKey, FloorTable>,
    report: IndexReport,
}

impl PriceTierIndex {
    /// Build the index from tiers in source order.
    #[must_use]
    pub fn build(tiers: Vec<PriceTier>) -> Self {
        let mut index = Self {
            report: IndexReport {
                tiers: tiers.len(),
                ..IndexReport::default()
            },
            ..Self::default()
        };

        for (position, mut tier) in tiers.into_iter().enumerate() {
            tier.unit_type = normalize_unit_type(&tier.unit_type);
            let parsed = parse_floor_ranges(&tier.floor_text);
            index.report.skipped_segments += parsed.skipped;

            let floors: Vec<u32> = parsed.ranges.iter().flat_map(|r| r.floors()).collect();
            if floors.is_empty() {
                warn!(
                    unit_type = %tier.unit_type,
                    descriptor = %tier.floor_text,
                    "price tier covers no floors"
                );
                index.report.empty_tiers.push(position);
            }

            let table = match &tier.scope {
                TierScope::Default => &mut index.default,
                TierScope::Line {
                    building_id,
                    line_number,
                } => index
                    .overrides
                    .entry(LineKey {
                        unit_type: tier.unit_type.clone(),
                        building_id: building_id.clone(),
                        line_number: *line_number,
                    })
                    .or_default(),
            };

            for floor in floors {
                index.report.registered_floors += 1;
                if let Some(replaced) = table.insert((tier.unit_type.clone(), floor), position) {
                    warn!(
                        unit_type = %tier.unit_type,
                        floor,
                        replaced,
                        winner = position,
                        "overlapping price tiers, keeping the later one"
                    );
                    index.report.collisions.push(Collision {
                        unit_type: tier.unit_type.clone(),
                        floor,
                        scope: tier.scope.clone(),
                        replaced,
                        winner: position,
                    });
                }
            }

            index.tiers.push(tier);
        }

        info!(
            tiers = index.report.tiers,
            floors = index.report.registered_floors,
            overrides = index.overrides.len(),
            skipped_segments = index.report.skipped_segments,
            collisions = index.report.collisions.len(),
            "built price tier index"
        );
        index
    }

    /// Type-level tier for a floor.
    #[must_use]
    pub fn lookup(&self, unit_type: &str, floor: u32) -> Option<&PriceTier> {
        self.find(&self.default, unit_type, floor)
    }

    /// Tier for a unit on a specific building line.
    ///
    /// When the line has its own table for this unit type, only that table
    /// is consulted; otherwise the type-level table is used.
    #[must_use]
    pub fn lookup_for_line(
        &self,
        unit_type: &str,
        building_id: &str,
        line_number: u32,
        floor: u32,
    ) -> Option<&PriceTier> {
        let key = LineKey {
            unit_type: normalize_unit_type(unit_type),
            building_id: building_id.to_string(),
            line_number,
        };
        match self.overrides.get(&key) {
            Some(table) => self.find(table, unit_type, floor),
            None => self.lookup(unit_type, floor),
        }
    }

    fn find(&self, table: &FloorTable, unit_type: &str, floor: u32) -> Option<&PriceTier> {
        table
            .get(&(normalize_unit_type(unit_type), floor))
            .and_then(|&position| self.tiers.get(position))
    }

    #[must_use]
    pub fn has_line_override(&self, unit_type: &str, building_id: &str, line_number: u32) -> bool {
        self.overrides.contains_key(&LineKey {
            unit_type: normalize_unit_type(unit_type),
            building_id: building_id.to_string(),
            line_number,
        })
    }

    #[must_use]
    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }

    #[must_use]
    pub fn report(&self) -> &IndexReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentBreakdown;
    use pretty_assertions::assert_eq;

    fn tier(unit_type: &str, floors: &str, total: u64) -> PriceTier {
        PriceTier {
            unit_type: unit_type.to_string(),
            floor_text: floors.to_string(),
            scope: TierScope::Default,
            land_cost: 0,
            building_cost: 0,
            vat: 0,
            total_price: total,
            payment: PaymentBreakdown::default(),
        }
    }

    fn line_tier(unit_type: &str, floors: &str, building: &str, line: u32, total: u64) -> PriceTier {
        PriceTier {
            scope: TierScope::Line {
                building_id: building.to_string(),
                line_number: line,
            },
            ..tier(unit_type, floors, total)
        }
    }

    #[test]
    fn every_floor_of_every_range_is_registered() {
        let index = PriceTierIndex::build(vec![
            tier("84A", "5층", 490),
            tier("84A", "6~9층", 500),
            tier("84A", "26층 이상", 520),
        ]);

        assert_eq!(index.lookup("84A", 5).map(|t| t.total_price), Some(490));
        assert_eq!(index.lookup("84A", 7).map(|t| t.total_price), Some(500));
        assert_eq!(index.lookup("84A", 99).map(|t| t.total_price), Some(520));
        assert_eq!(index.lookup("84A", 4), None);
        assert_eq!(index.lookup("84A", 12), None);
        assert_eq!(index.report().registered_floors, 1 + 4 + 74);
    }

    #[test]
    fn lookup_is_total_and_type_normalized() {
        let index = PriceTierIndex::build(vec![tier("84 A", "1~3", 1)]);
        assert!(index.lookup(" 84A", 2).is_some());
        assert!(index.lookup("84A", 0).is_none());
        assert!(index.lookup("nope", u32::MAX).is_none());
        assert!(PriceTierIndex::build(Vec::new()).lookup("84A", 1).is_none());
    }

    #[test]
    fn later_tier_wins_and_collision_is_reported() {
        let index = PriceTierIndex::build(vec![tier("84A", "5~9", 1), tier("84A", "9~10", 2)]);

        assert_eq!(index.lookup("84A", 9).map(|t| t.total_price), Some(2));
        assert_eq!(index.lookup("84A", 8).map(|t| t.total_price), Some(1));
        assert_eq!(
            index.report().collisions,
            vec![Collision {
                unit_type: "84A".to_string(),
                floor: 9,
                scope: TierScope::Default,
                replaced: 0,
                winner: 1,
            }]
        );
    }

    #[test]
    fn unreadable_descriptors_are_counted() {
        let index = PriceTierIndex::build(vec![tier("84A", "기준층", 1), tier("84A", "1, x, 3", 2)]);
        let report = index.report();

        assert_eq!(report.empty_tiers, vec![0]);
        assert_eq!(report.skipped_segments, 2);
        assert_eq!(index.lookup("84A", 3).map(|t| t.total_price), Some(2));
    }

    #[test]
    fn line_override_replaces_default_table() {
        let index = PriceTierIndex::build(vec![
            tier("84A", "5~9", 500),
            line_tier("84A", "6~9", "105", 5, 490),
        ]);

        assert!(index.has_line_override("84A", "105", 5));
        assert_eq!(
            index.lookup_for_line("84A", "105", 5, 7).map(|t| t.total_price),
            Some(490)
        );
        // The override table has no floor 5, and the default is not consulted.
        assert_eq!(index.lookup_for_line("84A", "105", 5, 5), None);
        assert_eq!(
            index.lookup_for_line("84A", "105", 4, 5).map(|t| t.total_price),
            Some(500)
        );
        assert_eq!(
            index.lookup_for_line("84B", "105", 5, 7).map(|t| t.total_price),
            None
        );
    }
}
