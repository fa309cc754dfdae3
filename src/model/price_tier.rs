use super::lenient;
use serde::{Deserialize, Serialize};

/// Number of interim (중도금) installments carried in output tables.
pub const INTERIM_INSTALLMENTS: usize = 6;

/// Which units a tier applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierScope {
    /// Every line of the unit type.
    Default,
    /// One building line only (e.g. 105동 5호 라인).
    Line {
        building_id: String,
        line_number: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub contract_first: u64,
    pub contract_second: u64,
    pub interim: Vec<u64>,
    pub balance: u64,
}

impl PaymentBreakdown {
    #[must_use]
    pub fn contract_total(&self) -> u64 {
        self.contract_first.saturating_add(self.contract_second)
    }

    #[must_use]
    pub fn interim_total(&self) -> u64 {
        self.interim.iter().fold(0, |total, amount| total.saturating_add(*amount))
    }
}

/// One row of a notice's price table: a unit type, the floors it covers and
/// the money owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub unit_type: String,
    /// Floor descriptor as written in the notice ("5~9층", "10층 이상").
    pub floor_text: String,
    pub scope: TierScope,
    pub land_cost: u64,
    pub building_cost: u64,
    pub vat: u64,
    pub total_price: u64,
    pub payment: PaymentBreakdown,
}

/// A `분양가` record exactly as the extractor returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceTier {
    #[serde(rename = "타입", default, deserialize_with = "lenient::string")]
    pub unit_type: String,
    #[serde(rename = "층구분", default, deserialize_with = "lenient::string")]
    pub floor_text: String,
    #[serde(rename = "동", default, deserialize_with = "lenient::optional_string")]
    pub building_id: Option<String>,
    #[serde(rename = "라인", default, deserialize_with = "lenient::optional_u32")]
    pub line_number: Option<u32>,
    #[serde(rename = "대지비", default, deserialize_with = "lenient::won")]
    pub land_cost: u64,
    #[serde(rename = "건축비", default, deserialize_with = "lenient::won")]
    pub building_cost: u64,
    #[serde(rename = "부가가치세", default, deserialize_with = "lenient::won")]
    pub vat: u64,
    #[serde(rename = "분양가", default, deserialize_with = "lenient::won")]
    pub total_price: u64,
    #[serde(
        rename = "1차계약금",
        alias = "계약금",
        default,
        deserialize_with = "lenient::won"
    )]
    pub contract_first: u64,
    #[serde(rename = "2차계약금", default, deserialize_with = "lenient::won")]
    pub contract_second: u64,
    /// Single interim amount used by notices that do not itemize installments.
    #[serde(rename = "중도금", default, deserialize_with = "lenient::optional_won")]
    pub interim: Option<u64>,
    #[serde(rename = "중도금1회", default, deserialize_with = "lenient::optional_won")]
    pub interim_1: Option<u64>,
    #[serde(rename = "중도금2회", default, deserialize_with = "lenient::optional_won")]
    pub interim_2: Option<u64>,
    #[serde(rename = "중도금3회", default, deserialize_with = "lenient::optional_won")]
    pub interim_3: Option<u64>,
    #[serde(rename = "중도금4회", default, deserialize_with = "lenient::optional_won")]
    pub interim_4: Option<u64>,
    #[serde(rename = "중도금5회", default, deserialize_with = "lenient::optional_won")]
    pub interim_5: Option<u64>,
    #[serde(rename = "중도금6회", default, deserialize_with = "lenient::optional_won")]
    pub interim_6: Option<u64>,
    #[serde(rename = "잔금", default, deserialize_with = "lenient::won")]
    pub balance: u64,
}

impl From<RawPriceTier> for PriceTier {
    fn from(raw: RawPriceTier) -> Self {
        let itemized: Vec<u64> = [
            raw.interim_1,
            raw.interim_2,
            raw.interim_3,
            raw.interim_4,
            raw.interim_5,
            raw.interim_6,
        ]
        .into_iter()
        .flatten()
        .collect();

        let interim = if itemized.is_empty() {
            raw.interim.into_iter().collect()
        } else {
            itemized
        };

        // A line override needs both halves of the key.
        let scope = match (raw.building_id, raw.line_number) {
            (Some(building_id), Some(line_number)) => TierScope::Line {
                building_id,
                line_number,
            },
            _ => TierScope::Default,
        };

        Self {
            unit_type: raw.unit_type,
            floor_text: raw.floor_text,
            scope,
            land_cost: raw.land_cost,
            building_cost: raw.building_cost,
            vat: raw.vat,
            total_price: raw.total_price,
            payment: PaymentBreakdown {
                contract_first: raw.contract_first,
                contract_second: raw.contract_second,
                interim,
                balance: raw.balance,
            },
        }
    }
}

/// Strip every whitespace character from a unit type ("84 A" → "84A").
#[must_use]
pub fn normalize_unit_type(unit_type: &str) -> String {
    unit_type.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn itemized_installments_win_over_single_interim() {
        let raw: RawPriceTier = serde_json::from_str(
            r#"{"타입": "84A", "층구분": "5층", "분양가": 490000000,
                "1차계약금": 10000000, "2차계약금": "39,000,000",
                "중도금": 1, "중도금1회": 49000000, "중도금2회": 49000000,
                "잔금": 147000000}"#,
        )
        .unwrap();
        let tier = PriceTier::from(raw);

        assert_eq!(tier.payment.interim, vec![49_000_000, 49_000_000]);
        assert_eq!(tier.payment.contract_total(), 49_000_000);
        assert_eq!(tier.scope, TierScope::Default);
    }

    #[test]
    fn simple_notice_fields_map_to_breakdown() {
        let raw: RawPriceTier = serde_json::from_str(
            r#"{"타입": "59", "층구분": "3층", "분양가": 300000000,
                "계약금": 30000000, "중도금": 180000000, "잔금": 90000000}"#,
        )
        .unwrap();
        let tier = PriceTier::from(raw);

        assert_eq!(tier.payment.contract_first, 30_000_000);
        assert_eq!(tier.payment.interim, vec![180_000_000]);
        assert_eq!(tier.payment.interim_total(), 180_000_000);
    }

    #[test]
    fn building_and_line_make_an_override() {
        let raw: RawPriceTier =
            serde_json::from_str(r#"{"타입": "84A", "층구분": "5층", "동": 105, "라인": "5"}"#)
                .unwrap();
        assert_eq!(
            PriceTier::from(raw).scope,
            TierScope::Line {
                building_id: "105".to_string(),
                line_number: 5
            }
        );

        let raw: RawPriceTier =
            serde_json::from_str(r#"{"타입": "84A", "층구분": "5층", "동": "105"}"#).unwrap();
        assert_eq!(PriceTier::from(raw).scope, TierScope::Default);
    }

    #[test]
    fn absurd_amounts_saturate_instead_of_overflowing() {
        let raw: RawPriceTier = serde_json::from_str(
            r#"{"타입": "84A", "층구분": "5층",
                "1차계약금": "20000000000000000000원", "2차계약금": 1,
                "중도금1회": 18446744073709551615, "중도금2회": 5}"#,
        )
        .unwrap();
        let tier = PriceTier::from(raw);

        assert_eq!(tier.payment.contract_first, u64::MAX);
        assert_eq!(tier.payment.contract_total(), u64::MAX);
        assert_eq!(tier.payment.interim_total(), u64::MAX);
    }

    #[test]
    fn unit_type_whitespace_is_removed() {
        assert_eq!(normalize_unit_type(" 84 A "), "84A");
        assert_eq!(normalize_unit_type("150P"), "150P");
    }
}
