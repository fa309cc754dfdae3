//! Records for the non-price sections of a pre-sale notice.

use super::{lenient, LayoutRule, MAX_LINE_NUMBER};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Paid option (유상옵션) such as system air conditioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    #[serde(rename = "단지명", default)]
    pub complex_name: String,
    #[serde(rename = "옵션구분", default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(rename = "타입", default, deserialize_with = "lenient::string")]
    pub unit_type: String,
    #[serde(
        rename = "품목",
        alias = "품목명",
        default,
        deserialize_with = "lenient::string"
    )]
    pub item: String,
    #[serde(rename = "품목세부", default, deserialize_with = "lenient::string")]
    pub detail: String,
    #[serde(rename = "설치내역", default, deserialize_with = "lenient::string")]
    pub installation: String,
    #[serde(
        rename = "공급금액",
        alias = "금액",
        default,
        deserialize_with = "lenient::won"
    )]
    pub price: u64,
}

/// Balcony extension (발코니 확장) cost per unit type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalconyItem {
    #[serde(rename = "단지명", default)]
    pub complex_name: String,
    #[serde(rename = "타입", default, deserialize_with = "lenient::string")]
    pub unit_type: String,
    #[serde(rename = "확장금액", default, deserialize_with = "lenient::won")]
    pub price: u64,
    #[serde(rename = "계약금", default, deserialize_with = "lenient::won")]
    pub contract: u64,
    #[serde(rename = "잔금", default, deserialize_with = "lenient::won")]
    pub balance: u64,
}

/// Dated milestone (청약, 당첨자 발표, 계약 ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    #[serde(rename = "단지명", default)]
    pub complex_name: String,
    #[serde(rename = "일정명", default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "시작일", default, deserialize_with = "lenient::string")]
    pub start: String,
    #[serde(rename = "종료일", default, deserialize_with = "lenient::string")]
    pub end: String,
}

/// Supply summary for one housing type (주택형).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyInfo {
    #[serde(
        rename = "주택형",
        alias = "타입",
        default,
        deserialize_with = "lenient::string"
    )]
    pub housing_type: String,
    #[serde(rename = "약식표기", default, deserialize_with = "lenient::string")]
    pub short_name: String,
    #[serde(
        rename = "공급세대수",
        alias = "총공급세대수",
        default,
        deserialize_with = "lenient::optional_u32"
    )]
    pub households: Option<u32>,
    #[serde(rename = "전용면적", default, deserialize_with = "lenient::string")]
    pub exclusive_area: String,
    #[serde(rename = "공급면적", default, deserialize_with = "lenient::string")]
    pub supply_area: String,
    #[serde(rename = "대지지분", default, deserialize_with = "lenient::string")]
    pub land_share: String,
}

/// Lines covered by a layout entry: `1`, `[1, 2, 3]`, `"1~4호"` or `"1,3"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LineSpec {
    One(u32),
    Many(Vec<u32>),
    Text(String),
}

impl LineSpec {
    /// Expand to concrete line numbers, `None` when the text is unreadable.
    #[must_use]
    pub fn lines(&self) -> Option<Vec<u32>> {
        match self {
            Self::One(line) => Some(vec![*line]),
            Self::Many(lines) => Some(lines.clone()),
            Self::Text(text) => parse_line_text(text),
        }
    }
}

fn parse_line_text(text: &str) -> Option<Vec<u32>> {
    let text = text.replace("라인", "").replace('호', "");
    let text = text.trim();

    if let Some((start, end)) = text.split_once('~').or_else(|| text.split_once('-')) {
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;
        if start > end || end > MAX_LINE_NUMBER {
            warn!(text, "line range out of bounds");
            return None;
        }
        return Some((start..=end).collect());
    }

    text.split(',')
        .map(|part| part.trim().parse().ok())
        .collect()
}

/// A `배치정보` record: one building, its lines, type and top floor.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "동", default, deserialize_with = "lenient::string")]
    pub building_id: String,
    #[serde(rename = "라인")]
    pub lines: LineSpec,
    #[serde(rename = "타입", default, deserialize_with = "lenient::string")]
    pub unit_type: String,
    #[serde(rename = "최고층", default, deserialize_with = "lenient::optional_u32")]
    pub floor_max: Option<u32>,
    #[serde(rename = "최하층", default, deserialize_with = "lenient::optional_u32")]
    pub floor_min: Option<u32>,
    #[serde(rename = "제외층", alias = "필로티", default)]
    pub excluded_floors: Vec<u32>,
}

impl LayoutEntry {
    /// One rule per line; `None` when the line spec cannot be read.
    #[must_use]
    pub fn to_rules(&self) -> Option<Vec<LayoutRule>> {
        let lines = self.lines.lines()?;
        let floor_max = self.floor_max.unwrap_or(1);
        let floor_min = self.floor_min.unwrap_or(1);
        Some(
            lines
                .into_iter()
                .map(|line| {
                    LayoutRule::new(
                        self.building_id.clone(),
                        line,
                        super::normalize_unit_type(&self.unit_type),
                        floor_max,
                    )
                    .starting_at(floor_min)
                    .excluding(self.excluded_floors.iter().copied())
                })
                .collect(),
        )
    }
}
