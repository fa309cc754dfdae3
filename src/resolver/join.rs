use super::PriceTierIndex;
use crate::model::{ResolvedUnit, Unit};
use serde::Serialize;
use tracing::info;

/// How many units found a price tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub priced: usize,
    pub unpriced: usize,
}

impl JoinSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.priced + self.unpriced
    }
}

/// Attach a price tier to every unit, keeping the input order.
pub fn join_prices<I>(units: I, index: &PriceTierIndex) -> (Vec<ResolvedUnit>, JoinSummary)
where
    I: IntoIterator<Item = Unit>,
{
    let mut summary = JoinSummary::default();
    let resolved: Vec<ResolvedUnit> = units
        .into_iter()
        .map(|unit| {
            let price = index
                .lookup_for_line(&unit.unit_type, &unit.building_id, unit.line_number, unit.floor)
                .cloned();
            if price.is_some() {
                summary.priced += 1;
            } else {
                summary.unpriced += 1;
            }
            ResolvedUnit { unit, price }
        })
        .collect();

    info!(
        priced = summary.priced,
        unpriced = summary.unpriced,
        "joined prices onto units"
    );
    (resolved, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayoutRule, PaymentBreakdown, PriceTier, TierScope};
    use crate::resolver::expand_layout;
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

    #[test]
    fn piloti_floor_is_never_emitted_and_the_rest_are_priced() {
        let rules = [LayoutRule::new("101", 1, "84A", 5).excluding([1])];
        let index = PriceTierIndex::build(vec![tier("84A", "2~5층", 500_000_000)]);

        let (resolved, summary) = join_prices(expand_layout(&rules), &index);

        let numbers: Vec<u32> = resolved.iter().map(|r| r.unit.unit_number).collect();
        assert_eq!(numbers, vec![201, 301, 401, 501]);
        assert!(resolved
            .iter()
            .all(|r| r.total_price() == Some(500_000_000)));
        assert_eq!(summary, JoinSummary { priced: 4, unpriced: 0 });
    }

    #[test]
    fn uncovered_floors_stay_unpriced() {
        let rules = [LayoutRule::new("101", 2, "84A", 4)];
        let index = PriceTierIndex::build(vec![tier("84A", "3층 이상", 1), tier("59", "1~4", 2)]);

        let (resolved, summary) = join_prices(expand_layout(&rules), &index);

        let priced: Vec<Option<u64>> = resolved.iter().map(ResolvedUnit::total_price).collect();
        assert_eq!(priced, vec![None, None, Some(1), Some(1)]);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.unpriced, 2);
    }

    #[test]
    fn line_override_applies_to_its_line_only() {
        let rules = [
            LayoutRule::new("105", 4, "84A", 3),
            LayoutRule::new("105", 5, "84A", 3),
        ];
        let mut special = tier("84A", "1~3", 9);
        special.scope = TierScope::Line {
            building_id: "105".to_string(),
            line_number: 5,
        };
        let index = PriceTierIndex::build(vec![tier("84A", "1~3", 1), special]);

        let (resolved, _) = join_prices(expand_layout(&rules), &index);
        let prices: Vec<(u32, Option<u64>)> = resolved
            .iter()
            .map(|r| (r.unit.unit_number, r.total_price()))
            .collect();

        assert_eq!(
            prices,
            vec![
                (104, Some(1)),
                (204, Some(1)),
                (304, Some(1)),
                (105, Some(9)),
                (205, Some(9)),
                (305, Some(9)),
            ]
        );
    }

    #[test]
    fn repeated_runs_give_identical_output() {
        let rules = [
            LayoutRule::new("101", 1, "84A", 6).excluding([1, 2]),
            LayoutRule::new("102", 3, "59", 4),
        ];
        let tiers = vec![tier("84A", "3, 4", 1), tier("84A", "4~6", 2), tier("59", "최상층", 3)];

        let first = join_prices(expand_layout(&rules), &PriceTierIndex::build(tiers.clone()));
        let second = join_prices(expand_layout(&rules), &PriceTierIndex::build(tiers));

        assert_eq!(first, second);
    }
}
