use crate::model::{LayoutRule, Unit};
use tracing::warn;

/// Enumerate every unit a rule describes: floors `1..=floor_max` minus the
/// excluded ones, numbered `floor * 100 + line`.
///
/// A rule whose line or top floor cannot be numbered yields nothing.
pub fn expand_rule(rule: &LayoutRule) -> impl Iterator<Item = Unit> + '_ {
    let floor_max = if rule.is_numberable() {
        rule.floor_max
    } else {
        warn!(
            building = %rule.building_id,
            line = rule.line_number,
            floor_max = rule.floor_max,
            "line or top floor out of range, skipping rule"
        );
        0
    };
    (1..=floor_max)
        .filter(|floor| !rule.excluded_floors.contains(floor))
        .map(|floor| Unit {
            building_id: rule.building_id.clone(),
            unit_number: floor * 100 + rule.line_number,
            unit_type: rule.unit_type.clone(),
            floor,
            line_number: rule.line_number,
            direction: rule.direction.clone(),
        })
}

/// Expand all rules in order.
#[must_use]
pub fn expand_layout(rules: &[LayoutRule]) -> Vec<Unit> {
    rules.iter().flat_map(expand_rule).collect()
}
