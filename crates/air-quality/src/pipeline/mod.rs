//! Acquisition pipeline for orchestrating air-quality sources.
//!
//! The pipeline owns the whole path from coordinate to reading:
//! - Cache lookup, which short-circuits every outbound call on a hit
//! - Live adapters tried in priority order, each under one timeout window
//! - Reverse geocoding, run concurrently with the adapter chain
//! - The simulated fallback when every live adapter failed
//! - Cache write of whatever was produced
//!
//! No step can fail the request. Adapter errors move on to the next adapter;
//! geocoding and cache errors are logged and ignored.

mod diagnostics;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::cache::{CacheStore, SharedCache};
use crate::config::AirQualityConfig;
use crate::errors::AirQualityError;
use crate::forecast::{ForecastPoint, ForecastProjector};
use crate::geocode::{GeocodeEnricher, NominatimGeocoder};
use crate::models::{Address, Coordinate, Location, NormalizedReading, ProviderId, Provenance};
use crate::provider::openaq::OpenAqProvider;
use crate::provider::simulated::{self, SimulatedSource};
use crate::provider::waqi::WaqiProvider;
use crate::provider::SourceAdapter;

pub use diagnostics::{AcquisitionDiagnostics, AttemptOutcome, SourceAttempt, CACHE_SOURCE};

/// Orchestrates cache, live adapters, enrichment and the simulated fallback.
pub struct AcquisitionPipeline {
    /// Sorted by ascending priority.
    adapters: Vec<Arc<dyn SourceAdapter>>,
    geocoder: Arc<dyn GeocodeEnricher>,
    cache: SharedCache,
    simulated: SimulatedSource,
    projector: ForecastProjector,
    request_timeout: Duration,
}

impl AcquisitionPipeline {
    /// Create a pipeline from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `adapters` - Live sources; tried in ascending `priority()` order,
    ///   ties keep the given order
    /// * `geocoder` - Reverse geocoder for address enrichment and search
    /// * `cache` - Reading cache shared by every request
    /// * `request_timeout` - Timeout window for each adapter attempt and
    ///   for enrichment
    pub fn new(
        mut adapters: Vec<Arc<dyn SourceAdapter>>,
        geocoder: Arc<dyn GeocodeEnricher>,
        cache: SharedCache,
        request_timeout: Duration,
    ) -> Self {
        adapters.sort_by_key(|adapter| adapter.priority());
        Self {
            adapters,
            geocoder,
            cache,
            simulated: SimulatedSource::new(),
            projector: ForecastProjector::new(),
            request_timeout,
        }
    }

    /// Create the production pipeline: WAQI, then OpenAQ, enriched by
    /// Nominatim, over an in-memory [`CacheStore`].
    pub fn from_config(config: &AirQualityConfig) -> Self {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(WaqiProvider::new(config)),
            Arc::new(OpenAqProvider::new(config)),
        ];
        Self::new(
            adapters,
            Arc::new(NominatimGeocoder::new(config)),
            Arc::new(CacheStore::with_ttl(config.cache_ttl)),
            config.request_timeout,
        )
    }

    /// Adapter ids in the order they are tried.
    pub fn adapter_ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.id()).collect()
    }

    /// Best-effort reading for a coordinate. Never fails.
    pub async fn get_reading(&self, lat: f64, lon: f64) -> NormalizedReading {
        self.get_reading_with_diagnostics(lat, lon).await.0
    }

    /// Same as [`get_reading`](Self::get_reading), plus the trail of what
    /// was tried.
    pub async fn get_reading_with_diagnostics(
        &self,
        lat: f64,
        lon: f64,
    ) -> (NormalizedReading, AcquisitionDiagnostics) {
        let coordinate = Coordinate::new(lat, lon);
        let mut diagnostics = AcquisitionDiagnostics::new();

        match self.cache.lookup(&coordinate) {
            Ok(Some(reading)) => {
                diagnostics.record_cache_hit();
                return (reading, diagnostics);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Cache lookup failed for {:?}: {}", coordinate, e);
                diagnostics.record_error(Cow::Borrowed(CACHE_SOURCE), e.to_string());
            }
        }

        let (live, address) = tokio::join!(
            self.fetch_live(&coordinate, &mut diagnostics),
            self.enrich(&coordinate),
        );

        let reading = match live {
            Some(reading) => reading,
            None => {
                warn!(
                    "All sources failed for {:?}, using simulated reading",
                    coordinate
                );
                diagnostics.record_simulated(Cow::Borrowed(simulated::PROVIDER_ID));
                self.simulated.reading(&coordinate)
            }
        };

        let reading = match address {
            Ok(address) => reading.with_address(address),
            Err(e) => {
                warn!(
                    "Enrichment via '{}' failed for {:?}: {}",
                    self.geocoder.id(),
                    coordinate,
                    e
                );
                diagnostics.record_error(Cow::Borrowed(self.geocoder.id()), e.to_string());
                reading
            }
        };

        if let Err(e) = self.cache.store(&coordinate, &reading) {
            warn!("Cache write failed for {:?}: {}", coordinate, e);
            diagnostics.record_error(Cow::Borrowed(CACHE_SOURCE), e.to_string());
        }

        info!(
            "Reading for {:?}: index {} via {} [{}]",
            coordinate,
            reading.index(),
            reading.source(),
            diagnostics.summary()
        );
        (reading, diagnostics)
    }

    /// 12-hour projection from a base index.
    pub fn get_forecast(&self, base_index: i32) -> Vec<ForecastPoint> {
        self.projector.project(base_index)
    }

    /// Best match for a free-text place name, or `None` if nothing matched
    /// or the geocoder could not be reached.
    pub async fn search_location(&self, query: &str) -> Option<Location> {
        let result = tokio::time::timeout(self.request_timeout, self.geocoder.search(query))
            .await
            .unwrap_or_else(|_| {
                Err(AirQualityError::Timeout {
                    provider: self.geocoder.id().to_string(),
                })
            });

        match result {
            Ok(location) => location,
            Err(e) => {
                warn!(
                    "Location search via '{}' failed for '{}': {}",
                    self.geocoder.id(),
                    query,
                    e
                );
                None
            }
        }
    }

    /// Try each adapter in order; first success wins.
    async fn fetch_live(
        &self,
        coordinate: &Coordinate,
        diagnostics: &mut AcquisitionDiagnostics,
    ) -> Option<NormalizedReading> {
        for (position, adapter) in self.adapters.iter().enumerate() {
            let provider_id: ProviderId = Cow::Borrowed(adapter.id());
            debug!("Fetching reading from '{}' for {:?}", provider_id, coordinate);

            let attempt = tokio::time::timeout(
                self.request_timeout,
                adapter.fetch(coordinate, self.request_timeout),
            )
            .await;

            match attempt {
                Ok(Ok(reading)) => {
                    diagnostics.record_success(provider_id);
                    let provenance = if position == 0 {
                        Provenance::Live
                    } else {
                        Provenance::Fallback
                    };
                    return Some(reading.with_provenance(provenance));
                }
                Ok(Err(AirQualityError::Timeout { .. })) | Err(_) => {
                    warn!(
                        "Provider '{}' timed out after {:?}, trying next",
                        provider_id, self.request_timeout
                    );
                    diagnostics.record_timeout(provider_id);
                }
                Ok(Err(e)) => {
                    warn!("Provider '{}' failed: {}, trying next", provider_id, e);
                    diagnostics.record_error(provider_id, e.to_string());
                }
            }
        }
        None
    }

    async fn enrich(&self, coordinate: &Coordinate) -> Result<Address, AirQualityError> {
        match tokio::time::timeout(self.request_timeout, self.geocoder.reverse(coordinate)).await {
            Ok(result) => result,
            Err(_) => Err(AirQualityError::EnrichmentFailed(format!(
                "'{}' timed out",
                self.geocoder.id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReadingCache;
    use crate::models::PollutantSet;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HINT_CITY: &str = "Station Hint";
    const TIMEOUT: Duration = Duration::from_millis(50);

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed(u16),
        Fail,
        Hang,
    }

    struct MockAdapter {
        id: &'static str,
        priority: u8,
        behaviour: Behaviour,
        call_count: AtomicUsize,
    }

    impl MockAdapter {
        fn new(id: &'static str, priority: u8, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                id,
                priority,
                behaviour,
                call_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn fetch(
            &self,
            coordinate: &Coordinate,
            _timeout: Duration,
        ) -> Result<NormalizedReading, AirQualityError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            match self.behaviour {
                Behaviour::Succeed(index) => Ok(NormalizedReading::new(
                    index,
                    PollutantSet::backfill_from_index(index, None, None, None, None, None, None),
                    Location::new(*coordinate, Address::city_only(HINT_CITY)),
                    Utc::now(),
                    Provenance::Live,
                    self.id,
                )),
                Behaviour::Fail => Err(AirQualityError::unavailable(self.id, "Mock failure")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(AirQualityError::unavailable(self.id, "unreachable"))
                }
            }
        }
    }

    struct MockGeocoder {
        fail: bool,
        call_count: AtomicUsize,
    }

    impl MockGeocoder {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                call_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeocodeEnricher for MockGeocoder {
        fn id(&self) -> &'static str {
            "MOCK_GEO"
        }

        async fn reverse(&self, _coordinate: &Coordinate) -> Result<Address, AirQualityError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AirQualityError::EnrichmentFailed("Mock failure".to_string()));
            }
            Ok(Address {
                road: Some("MG Road".to_string()),
                suburb: Some("Ashok Nagar".to_string()),
                neighbourhood: None,
                city: "Bengaluru".to_string(),
                house_number: None,
            })
        }

        async fn search(&self, query: &str) -> Result<Option<Location>, AirQualityError> {
            if self.fail {
                return Err(AirQualityError::unavailable("MOCK_GEO", "Mock failure"));
            }
            Ok((query == "Bengaluru").then(|| {
                Location::new(
                    Coordinate::new(12.97, 77.59),
                    Address::city_only("Bengaluru"),
                )
            }))
        }
    }

    struct BrokenCache;

    impl ReadingCache for BrokenCache {
        fn lookup(
            &self,
            _coordinate: &Coordinate,
        ) -> Result<Option<NormalizedReading>, AirQualityError> {
            Err(AirQualityError::CacheUnavailable("storage offline".to_string()))
        }

        fn store(
            &self,
            _coordinate: &Coordinate,
            _reading: &NormalizedReading,
        ) -> Result<(), AirQualityError> {
            Err(AirQualityError::CacheUnavailable("storage offline".to_string()))
        }
    }

    fn adapters(mocks: &[&Arc<MockAdapter>]) -> Vec<Arc<dyn SourceAdapter>> {
        mocks
            .iter()
            .map(|mock| Arc::clone(mock) as Arc<dyn SourceAdapter>)
            .collect()
    }

    fn pipeline(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        geocoder: Arc<MockGeocoder>,
        cache: SharedCache,
    ) -> AcquisitionPipeline {
        AcquisitionPipeline::new(adapters, geocoder, cache, TIMEOUT)
    }

    #[tokio::test]
    async fn test_cache_hit_issues_no_outbound_calls() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let secondary = MockAdapter::new("SECONDARY", 2, Behaviour::Succeed(42));
        let geocoder = MockGeocoder::new(false);
        let pipeline = pipeline(
            adapters(&[&primary, &secondary]),
            geocoder.clone(),
            Arc::new(CacheStore::new()),
        );

        let first = pipeline.get_reading(12.97, 77.59).await;
        let (second, diagnostics) = pipeline.get_reading_with_diagnostics(12.97, 77.59).await;

        assert_eq!(first, second);
        assert_eq!(first.retrieved_at(), second.retrieved_at());
        assert!(diagnostics.is_cache_hit());
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_nearby_coordinates_share_a_cache_slot() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let pipeline = pipeline(
            adapters(&[&primary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        pipeline.get_reading(12.97, 77.59).await;
        pipeline.get_reading(12.971, 77.589).await;

        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let pipeline = pipeline(
            adapters(&[&primary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::with_ttl(Duration::from_millis(20))),
        );

        pipeline.get_reading(12.97, 77.59).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        let (_, diagnostics) = pipeline.get_reading_with_diagnostics(12.97, 77.59).await;

        assert!(!diagnostics.is_cache_hit());
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_primary_success_is_live_and_enriched() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let pipeline = pipeline(
            adapters(&[&primary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let reading = pipeline.get_reading(12.97, 77.59).await;

        assert_eq!(reading.index(), 87);
        assert_eq!(reading.category_label(), "Moderate");
        assert_eq!(reading.provenance(), Provenance::Live);
        assert_eq!(reading.source(), "PRIMARY");
        assert_eq!(reading.location().address.city, "Bengaluru");
        assert_eq!(reading.location().address.road.as_deref(), Some("MG Road"));
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Fail);
        let secondary = MockAdapter::new("SECONDARY", 2, Behaviour::Succeed(42));
        let pipeline = pipeline(
            adapters(&[&primary, &secondary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let (reading, diagnostics) = pipeline.get_reading_with_diagnostics(51.5, -0.12).await;

        assert_eq!(reading.index(), 42);
        assert_eq!(reading.provenance(), Provenance::Fallback);
        assert_eq!(reading.source(), "SECONDARY");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert!(diagnostics.summary().starts_with("PRIMARY: ERROR"));
    }

    #[tokio::test]
    async fn test_adapters_are_tried_in_priority_order() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let secondary = MockAdapter::new("SECONDARY", 2, Behaviour::Succeed(42));
        let pipeline = pipeline(
            adapters(&[&secondary, &primary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        assert_eq!(pipeline.adapter_ids(), vec!["PRIMARY", "SECONDARY"]);
        let reading = pipeline.get_reading(51.5, -0.12).await;
        assert_eq!(reading.source(), "PRIMARY");
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_simulated_reading() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Fail);
        let secondary = MockAdapter::new("SECONDARY", 2, Behaviour::Fail);
        let pipeline = pipeline(
            adapters(&[&primary, &secondary]),
            MockGeocoder::new(true),
            Arc::new(CacheStore::new()),
        );

        let (reading, diagnostics) = pipeline.get_reading_with_diagnostics(48.86, 2.35).await;

        assert!((15..=235).contains(&reading.index()));
        assert_eq!(reading.provenance(), Provenance::Simulated);
        assert_eq!(reading.source(), simulated::PROVIDER_ID);
        assert_eq!(reading.location().address.city, crate::models::REMOTE_CITY);
        assert!(diagnostics.is_simulated());

        // Cached like a live result.
        let again = pipeline.get_reading(48.86, 2.35).await;
        assert_eq!(again, reading);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_adapters_still_returns_a_reading() {
        let pipeline = pipeline(
            Vec::new(),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let reading = pipeline.get_reading(-33.87, 151.21).await;
        assert_eq!(reading.provenance(), Provenance::Simulated);
        assert_eq!(reading.location().address.city, "Bengaluru");
    }

    #[tokio::test]
    async fn test_hanging_adapter_times_out() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Hang);
        let secondary = MockAdapter::new("SECONDARY", 2, Behaviour::Succeed(42));
        let pipeline = pipeline(
            adapters(&[&primary, &secondary]),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let started = std::time::Instant::now();
        let (reading, diagnostics) = pipeline.get_reading_with_diagnostics(40.71, -74.0).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(reading.source(), "SECONDARY");
        assert_eq!(diagnostics.attempts[0].outcome, AttemptOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_enrichment_failure_keeps_station_hint() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(120));
        let pipeline = pipeline(
            adapters(&[&primary]),
            MockGeocoder::new(true),
            Arc::new(CacheStore::new()),
        );

        let (reading, diagnostics) = pipeline.get_reading_with_diagnostics(12.97, 77.59).await;

        assert_eq!(reading.index(), 120);
        assert_eq!(reading.location().address.city, HINT_CITY);
        assert_eq!(diagnostics.failures().len(), 1);
        assert_eq!(diagnostics.failures()[0].as_ref(), "MOCK_GEO");
    }

    #[tokio::test]
    async fn test_broken_cache_is_not_fatal() {
        let primary = MockAdapter::new("PRIMARY", 1, Behaviour::Succeed(87));
        let pipeline = pipeline(
            adapters(&[&primary]),
            MockGeocoder::new(false),
            Arc::new(BrokenCache),
        );

        let first = pipeline.get_reading(12.97, 77.59).await;
        let second = pipeline.get_reading(12.97, 77.59).await;

        assert_eq!(first.index(), 87);
        assert_eq!(second.index(), 87);
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_search_location() {
        let pipeline = pipeline(
            Vec::new(),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let found = pipeline.search_location("Bengaluru").await.expect("found");
        assert_eq!(found.address.city, "Bengaluru");
        assert!(pipeline.search_location("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_search_location_failure_is_not_found() {
        let pipeline = pipeline(
            Vec::new(),
            MockGeocoder::new(true),
            Arc::new(CacheStore::new()),
        );

        assert!(pipeline.search_location("Bengaluru").await.is_none());
    }

    #[test]
    fn test_forecast_has_twelve_points() {
        let pipeline = pipeline(
            Vec::new(),
            MockGeocoder::new(false),
            Arc::new(CacheStore::new()),
        );

        let points = pipeline.get_forecast(100);
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.projected_index >= 10));
    }
}
