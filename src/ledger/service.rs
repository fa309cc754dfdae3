use super::cache::LedgerCache;
use super::client::{BuildingHubClient, Geocoder, TitleInfoSource, VworldClient};
use super::pnu::split_pnu;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::model::{BuildingLedgerData, LedgerLookup};
use serde_json::Value;
use tracing::info;

/// Address → building ledger title info, cached by PNU.
pub struct LedgerService<G, T> {
    geocoder: G,
    titles: T,
    cache: LedgerCache,
    ttl_days: i64,
}

impl LedgerService<VworldClient, BuildingHubClient> {
    /// Service backed by the live APIs and the configured cache file.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(
            VworldClient::new(config)?,
            BuildingHubClient::new(config)?,
            LedgerCache::open(&config.cache_db_path)?,
            config.cache_ttl_days,
        ))
    }
}

impl<G: Geocoder, T: TitleInfoSource> LedgerService<G, T> {
    pub fn new(geocoder: G, titles: T, cache: LedgerCache, ttl_days: i64) -> Self {
        Self {
            geocoder,
            titles,
            cache,
            ttl_days,
        }
    }

    /// Look up `address`. A fresh cache entry is returned as-is (with
    /// `from_cache` set) unless `force_refresh` is given.
    pub fn lookup(&self, address: &str, force_refresh: bool) -> Result<LedgerLookup, LedgerError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LedgerError::InvalidInput("address is empty".to_string()));
        }

        let geocoded = self.geocoder.geocode(address)?;
        let codes = split_pnu(&geocoded.pnu)?;

        if !force_refresh {
            if let Some(mut cached) = self.cache.get(&geocoded.pnu, self.ttl_days)? {
                info!(pnu = %geocoded.pnu, "ledger cache hit");
                cached.from_cache = true;
                return Ok(cached);
            }
        }

        let item = self.titles.title_info(&codes)?;
        let result = LedgerLookup {
            success: true,
            input_address: address.to_string(),
            road_address: geocoded.road_address.clone(),
            pnu: geocoded.pnu.clone(),
            codes,
            from_cache: false,
            data: BuildingLedgerData::from_item(&item, &geocoded.road_address),
            raw_item: Value::Object(item),
        };

        self.cache.set(&geocoded.pnu, &result)?;
        info!(pnu = %result.pnu, "fetched ledger title info");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::client::Geocoded;
    use crate::model::CodeParts;
    use serde_json::{json, Map};
    use std::cell::Cell;

    struct FixedGeocoder;

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, _address: &str) -> Result<Geocoded, LedgerError> {
            Ok(Geocoded {
                pnu: "4420025031100010000".to_string(),
                road_address: "충청남도 아산시 탕정면 명암리 1".to_string(),
                raw: Value::Null,
            })
        }
    }

    struct CountingTitles {
        calls: Cell<u32>,
    }

    impl TitleInfoSource for CountingTitles {
        fn title_info(&self, codes: &CodeParts) -> Result<Map<String, Value>, LedgerError> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(codes.bdong_code, "25031");
            Ok(json!({"platArea": "1200.5", "useAprDay": "20240105"})
                .as_object()
                .cloned()
                .unwrap_or_default())
        }
    }

    fn service() -> LedgerService<FixedGeocoder, CountingTitles> {
        LedgerService::new(
            FixedGeocoder,
            CountingTitles {
                calls: Cell::new(0),
            },
            LedgerCache::open_in_memory().unwrap(),
            30,
        )
    }

    #[test]
    fn second_lookup_is_served_from_cache() {
        let service = service();

        let first = service.lookup("탕정면 명암리 1", false).unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.data.plat_area, Some(1200.5));
        assert_eq!(
            first.data.road_address.as_deref(),
            Some("충청남도 아산시 탕정면 명암리 1")
        );

        let second = service.lookup("탕정면 명암리 1", false).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.data, first.data);
        assert_eq!(service.titles.calls.get(), 1);
    }

    #[test]
    fn force_refresh_skips_the_cache() {
        let service = service();
        service.lookup("탕정면 명암리 1", false).unwrap();
        let refreshed = service.lookup("탕정면 명암리 1", true).unwrap();

        assert!(!refreshed.from_cache);
        assert_eq!(service.titles.calls.get(), 2);
    }

    #[test]
    fn empty_address_is_rejected() {
        let err = service().lookup("  ", false).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }
}
