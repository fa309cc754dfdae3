//! Price tier tables on disk: an extraction reply saved as JSON, or a
//! `*_분양가표.csv` written by an earlier run.

use super::strip_code_fence;
use crate::error::LoadError;
use crate::model::{PriceTier, RawPriceTier};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

const PRICING_KEY: &str = "분양가";

/// Read price tiers from `path`, choosing the format by extension.
pub fn read_price_tiers<P: AsRef<Path>>(path: P) -> Result<Vec<PriceTier>, LoadError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let items = if is_json {
        json_items(path)?
    } else {
        csv_items(path)?
    };

    let total = items.len();
    let tiers: Vec<PriceTier> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<RawPriceTier>(item) {
            Ok(raw) => Some(PriceTier::from(raw)),
            Err(e) => {
                warn!(file = %path.display(), index, error = %e, "dropping unreadable tier");
                None
            }
        })
        .collect();

    info!(file = %path.display(), total, tiers = tiers.len(), "loaded price tiers");
    Ok(tiers)
}

fn json_items(path: &Path) -> Result<Vec<Value>, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let body = strip_code_fence(text.trim_start_matches('\u{feff}'));
    let payload: Value = serde_json::from_str(body)?;

    let items = match payload {
        Value::Object(mut map) => map.remove(PRICING_KEY),
        array @ Value::Array(_) => Some(array),
        _ => None,
    };
    match items {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(LoadError::InvalidPriceTable {
            path: path.to_path_buf(),
            message: format!("no '{PRICING_KEY}' array"),
        }),
    }
}

/// Each row becomes a JSON object keyed by header; blank cells are left out
/// so optional installments stay absent.
fn csv_items(path: &Path) -> Result<Vec<Value>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let object: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(header, cell)| (header.clone(), Value::String(cell.trim().to_string())))
            .collect();
        items.push(Value::Object(object));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_csv;
    use crate::model::TierScope;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_saved_extraction_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(
            &path,
            r#"{"분양가": [
                {"타입": "84A", "층구분": "2~5층", "분양가": "500,000,000원"},
                {"타입": "84A", "층구분": "6층 이상", "동": "101", "라인": 1, "분양가": 520000000},
                "garbage"
            ]}"#,
        )
        .unwrap();

        let tiers = read_price_tiers(&path).unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].total_price, 500_000_000);
        assert_eq!(
            tiers[1].scope,
            TierScope::Line {
                building_id: "101".to_string(),
                line_number: 1
            }
        );
    }

    #[test]
    fn json_without_price_array_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, r#"{"옵션": []}"#).unwrap();

        assert!(matches!(
            read_price_tiers(&path),
            Err(LoadError::InvalidPriceTable { .. })
        ));
    }

    #[test]
    fn exported_price_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prices.json");
        fs::write(
            &source,
            r#"[{"타입": "59", "층구분": "3층", "분양가": 300000000,
                 "계약금": 30000000, "중도금1회": 30000000, "잔금": 240000000}]"#,
        )
        .unwrap();
        let tiers = read_price_tiers(&source).unwrap();

        let table = dir.path().join("단지_분양가표.csv");
        export_csv(&tiers, &table).unwrap();

        assert_eq!(read_price_tiers(&table).unwrap(), tiers);
    }
}
