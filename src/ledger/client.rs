//! VWorld geocoder and Building HUB (건축HUB) title-info clients.

use super::pnu::{extract_pnu, normalize_service_key, PNU_LEN};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::model::CodeParts;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const VWORLD_URL: &str = "https://api.vworld.kr/req/address";
const BUILDING_HUB_URL: &str = "https://apis.data.go.kr/1613000/BldRgstHubService/getBrTitleInfo";

/// Retry policy shared by both APIs.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            attempts: config.retry_count.max(1),
            backoff: config.retry_backoff(),
        }
    }

    /// Run `op` until it succeeds, sleeping `backoff * attempt` between tries.
    pub fn run<T, F>(&self, name: &'static str, mut op: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Result<T, String>,
    {
        let attempts = self.attempts.max(1);
        let mut last = String::new();
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    last = e;
                    if attempt == attempts {
                        break;
                    }
                    let delay = self.backoff * attempt;
                    warn!(name, attempt, error = %last, "request failed, retrying");
                    thread::sleep(delay);
                }
            }
        }
        Err(LedgerError::Request {
            name,
            attempts,
            last,
        })
    }
}

/// GET `url` and decode the JSON body, retrying on any failure.
fn get_json_with_retry(
    client: &Client,
    policy: RetryPolicy,
    name: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Value, LedgerError> {
    policy.run(name, || {
        debug!(name, url, "sending request");
        client
            .get(url)
            .query(query)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<Value>)
            .map_err(|e| e.to_string())
    })
}

fn build_client(config: &LedgerConfig) -> Result<Client, LedgerError> {
    Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| LedgerError::UnexpectedResponse(format!("failed to build HTTP client: {e}")))
}

/// Geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocoded {
    pub pnu: String,
    pub road_address: String,
    pub raw: Value,
}

/// Address → PNU.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Geocoded, LedgerError>;
}

/// PNU codes → raw title-info item.
pub trait TitleInfoSource {
    fn title_info(&self, codes: &CodeParts) -> Result<Map<String, Value>, LedgerError>;
}

pub struct VworldClient {
    client: Client,
    api_key: String,
    policy: RetryPolicy,
}

impl VworldClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            client: build_client(config)?,
            api_key: config.vworld_api_key.clone(),
            policy: RetryPolicy::from_config(config),
        })
    }
}

/// Interpret a `getcoord` response.
pub fn parse_geocode(payload: Value, address: &str) -> Result<Geocoded, LedgerError> {
    let status = payload
        .pointer("/response/status")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if status != "OK" {
        return Err(LedgerError::UnexpectedResponse(format!(
            "VWorld status not OK: {status}"
        )));
    }

    let pnu = extract_pnu(&payload)?;
    if pnu.chars().count() < PNU_LEN {
        return Err(LedgerError::UnexpectedResponse(format!("invalid PNU extracted: {pnu}")));
    }

    let road_address = ["/response/refined/text", "/response/result/text"]
        .iter()
        .filter_map(|p| payload.pointer(p).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or(address)
        .to_string();

    Ok(Geocoded {
        pnu,
        road_address,
        raw: payload,
    })
}

impl Geocoder for VworldClient {
    fn geocode(&self, address: &str) -> Result<Geocoded, LedgerError> {
        let query = [
            ("service", "address"),
            ("request", "getcoord"),
            ("version", "2.0"),
            ("crs", "epsg:4326"),
            ("address", address),
            ("refine", "true"),
            ("simple", "false"),
            ("format", "json"),
            ("type", "parcel"),
            ("key", self.api_key.as_str()),
        ];
        let payload = get_json_with_retry(&self.client, self.policy, "vworld", VWORLD_URL, &query)?;
        parse_geocode(payload, address)
    }
}

pub struct BuildingHubClient {
    client: Client,
    service_key: String,
    policy: RetryPolicy,
}

impl BuildingHubClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            client: build_client(config)?,
            service_key: normalize_service_key(&config.data_go_kr_service_key),
            policy: RetryPolicy::from_config(config),
        })
    }
}

/// First item of a `getBrTitleInfo` response; `item` may be a list or a
/// single object.
pub fn first_title_item(payload: &Value) -> Result<Map<String, Value>, LedgerError> {
    let item = match payload.pointer("/response/body/items/item") {
        Some(Value::Array(items)) => items.first(),
        Some(item @ Value::Object(_)) => Some(item),
        _ => None,
    };
    item.and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| LedgerError::UnexpectedResponse("Building HUB returned no item".to_string()))
}

impl TitleInfoSource for BuildingHubClient {
    fn title_info(&self, codes: &CodeParts) -> Result<Map<String, Value>, LedgerError> {
        let query = [
            ("serviceKey", self.service_key.as_str()),
            ("sigungu_code", codes.sigungu_code.as_str()),
            ("bdong_code", codes.bdong_code.as_str()),
            ("plat_code", codes.plat_code.as_str()),
            ("bun", codes.bun.as_str()),
            ("ji", codes.ji.as_str()),
            ("numOfRows", "1"),
            ("pageNo", "1"),
            ("_type", "json"),
        ];
        let payload = get_json_with_retry(
            &self.client,
            self.policy,
            "building_hub",
            BUILDING_HUB_URL,
            &query,
        )?;
        first_title_item(&payload)
    }
}
