//! Parcel number (PNU) helpers.
//!
//! A PNU is 19 digits: 시군구(5) 법정동(5) 산 구분(1) 본번(4) 부번(4).

use crate::error::LedgerError;
use crate::model::CodeParts;
use serde_json::Value;

pub const PNU_LEN: usize = 19;

fn text_at<'v>(value: &'v Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull the PNU out of a VWorld `getcoord` response.
///
/// Tries the refined `level4LC` code first, then the structured address
/// parts, then the first feature's `full_nm`.
pub fn extract_pnu(payload: &Value) -> Result<String, LedgerError> {
    let response = payload.get("response").unwrap_or(&Value::Null);

    if let Some(code) = text_at(response, "/refined/structure/level4LC") {
        if code.chars().count() >= PNU_LEN {
            return Ok(code);
        }
    }

    let structure = response.pointer("/result/structure").unwrap_or(&Value::Null);
    let level0 = text_at(structure, "/level0").unwrap_or_default();
    if !level0.is_empty() && level0.chars().all(|c| c.is_ascii_digit()) {
        let combined: String = ["level0", "level1", "level2", "level4A", "level4L", "detail"]
            .iter()
            .filter_map(|key| text_at(structure, &format!("/{key}")))
            .collect();
        if combined.chars().count() >= PNU_LEN {
            return Ok(combined);
        }
    }

    if let Some(full) = text_at(response, "/result/featureCollection/features/0/properties/full_nm")
    {
        if full.chars().count() >= PNU_LEN {
            return Ok(full);
        }
    }

    Err(LedgerError::UnexpectedResponse(
        "unable to extract PNU from VWorld response".to_string(),
    ))
}

/// Split a PNU into Building HUB query codes. 산 parcels (flag `2`) use
/// plat code `1`, everything else `0`.
pub fn split_pnu(pnu: &str) -> Result<CodeParts, LedgerError> {
    if !pnu.is_ascii() || pnu.len() < PNU_LEN {
        return Err(LedgerError::InvalidInput(format!(
            "PNU must be at least {PNU_LEN} ASCII characters: {pnu}"
        )));
    }

    let plat_code = if &pnu[10..11] == "2" { "1" } else { "0" };
    Ok(CodeParts {
        sigungu_code: pnu[0..5].to_string(),
        bdong_code: pnu[5..10].to_string(),
        plat_code: plat_code.to_string(),
        bun: pnu[11..15].to_string(),
        ji: pnu[15..19].to_string(),
    })
}

/// data.go.kr hands out keys both raw and percent-encoded; decode the
/// latter so the query string is not encoded twice.
#[must_use]
pub fn normalize_service_key(key: &str) -> String {
    let cleaned = key.trim();
    if cleaned.contains('%') {
        urlencoding::decode(cleaned).map_or_else(|_| cleaned.to_string(), |k| k.into_owned())
    } else {
        cleaned.to_string()
    }
}
