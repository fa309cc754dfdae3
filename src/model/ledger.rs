use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Building HUB query codes derived from a PNU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeParts {
    pub sigungu_code: String,
    pub bdong_code: String,
    pub plat_code: String,
    pub bun: String,
    pub ji: String,
}

/// Title-section (표제부) fields of the building ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingLedgerData {
    pub regstr_kind_name: Option<String>,
    pub road_address: Option<String>,
    pub plat_area: Option<f64>,
    pub arch_area: Option<f64>,
    pub bc_ratio: Option<f64>,
    pub tot_area: Option<f64>,
    pub vl_ratio_estm_tot_area: Option<f64>,
    pub vl_ratio: Option<f64>,
    pub structure_name: Option<String>,
    pub etc_structure: Option<String>,
    pub seismic_design_yn: Option<String>,
    pub seismic_ability: Option<String>,
    pub use_approval_day: Option<String>,
}

impl BuildingLedgerData {
    /// Map a raw `getBrTitleInfo` item. `fallback_address` fills the road
    /// address when the registry leaves it blank.
    #[must_use]
    pub fn from_item(item: &Map<String, Value>, fallback_address: &str) -> Self {
        let text = |key: &str| -> Option<String> {
            match item.get(key)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        };
        let number = |key: &str| -> Option<f64> {
            match item.get(key)? {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        };

        Self {
            regstr_kind_name: text("regstrKindCdNm"),
            road_address: text("newPlatPlc").or_else(|| Some(fallback_address.to_string())),
            plat_area: number("platArea"),
            arch_area: number("archArea"),
            bc_ratio: number("bcRat"),
            tot_area: number("totArea"),
            vl_ratio_estm_tot_area: number("vlRatEstmTotArea"),
            vl_ratio: number("vlRat"),
            structure_name: text("strctCdNm"),
            etc_structure: text("etcStrct").or_else(|| text("strctCd")),
            seismic_design_yn: text("rserthqkDsgnApplyYn").or_else(|| text("rgnlLmtSe")),
            seismic_ability: text("rserthqkAblty").or_else(|| text("rgnlLmtSe")),
            use_approval_day: text("useAprDay"),
        }
    }
}

/// Result of one address lookup, also the cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLookup {
    pub success: bool,
    pub input_address: String,
    pub road_address: String,
    pub pnu: String,
    pub codes: CodeParts,
    pub from_cache: bool,
    pub data: BuildingLedgerData,
    pub raw_item: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_fields_are_typed_with_fallbacks() {
        let item = json!({
            "regstrKindCdNm": "일반건축물",
            "newPlatPlc": "",
            "platArea": "330.5",
            "archArea": 198.2,
            "bcRat": "",
            "strctCd": "21",
            "rgnlLmtSe": "Y",
            "useAprDay": "19981020"
        });
        let data = BuildingLedgerData::from_item(item.as_object().unwrap(), "충남 아산시 탕정면 1");

        assert_eq!(data.regstr_kind_name.as_deref(), Some("일반건축물"));
        assert_eq!(data.road_address.as_deref(), Some("충남 아산시 탕정면 1"));
        assert_eq!(data.plat_area, Some(330.5));
        assert_eq!(data.arch_area, Some(198.2));
        assert_eq!(data.bc_ratio, None);
        assert_eq!(data.etc_structure.as_deref(), Some("21"));
        assert_eq!(data.seismic_design_yn.as_deref(), Some("Y"));
        assert_eq!(data.seismic_ability.as_deref(), Some("Y"));
    }
}
