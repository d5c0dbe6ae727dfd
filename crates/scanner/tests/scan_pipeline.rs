//! End-to-end scan pipeline behavior with in-memory catalog and archive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Notify;
use granule_search::{CatalogClient, Circle, DataType, SearchResult, Sensor};
use matchup::{Grid2, Layout, SatelliteDataset};
use scanner::{
    DatasetProvider, InRange, ProviderError, RateLimitConfig, ScanConfig, ScanError,
};
use test_utils::{gridded_chl_dataset, init_test_logging, single_waypoint_track};

/// Catalog stub answering every query with the same granule names.
struct FixedCatalog {
    names: Vec<String>,
}

impl FixedCatalog {
    fn new(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            names: names.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl CatalogClient for FixedCatalog {
    async fn granules(
        &self,
        _short_name: &str,
        _provider: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _circle: Circle,
    ) -> SearchResult<Vec<String>> {
        Ok(self.names.clone())
    }
}

/// Archive stub serving preloaded datasets and counting fetches.
struct FakeArchive {
    datasets: HashMap<String, SatelliteDataset>,
    fetches: AtomicUsize,
}

impl FakeArchive {
    fn new(datasets: Vec<SatelliteDataset>) -> Arc<Self> {
        let datasets = datasets
            .into_iter()
            .map(|ds| {
                let name = ds.product_name().unwrap_or_default().to_string();
                (name, ds)
            })
            .collect();
        Arc::new(Self {
            datasets,
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DatasetProvider for FakeArchive {
    async fn get(&self, granule: &str) -> Result<SatelliteDataset, ProviderError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.datasets
            .get(granule)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(granule.to_string()))
    }
}

/// A small composite far from the test track, named `name`.
fn distant_composite(name: &str) -> SatelliteDataset {
    let lat = vec![50.05, 50.0];
    let lon = vec![-126.0, -125.95];
    let mut ds = SatelliteDataset::new(
        Some(name.to_string()),
        "2017-01-12T00:00:00.000Z",
        "2017-01-12T23:59:59.000Z",
        Layout::Gridded {
            lat: lat.clone(),
            lon: lon.clone(),
        },
    )
    .unwrap();
    ds.insert_variable("chlor_a", Grid2::from_fn(2, 2, |r, c| (r + c) as f64));
    ds
}

fn fast_config(npes: usize) -> ScanConfig {
    ScanConfig {
        npes,
        rate_limit: RateLimitConfig {
            min_delay: StdDuration::ZERO,
            max_jitter: StdDuration::ZERO,
        },
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_yields_tables_then_ends() {
    init_test_logging();
    let catalog = FixedCatalog::new(&["A2017012.L3m_DAY_CHL_chlor_a_4km.nc"]);
    let archive = FakeArchive::new(vec![gridded_chl_dataset()]);
    let in_range = InRange::new(fast_config(3), catalog, archive);

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));

    let table = handle.next().await.unwrap().unwrap();
    assert_eq!(table.len(), 7);
    assert_eq!(
        table.product_name(),
        Some("A2017012.L3m_DAY_CHL_chlor_a_4km.nc")
    );
    assert!(handle.next().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn granules_without_matchups_are_silently_skipped() {
    init_test_logging();
    let catalog = FixedCatalog::new(&[
        "T2017012.L3m_DAY_CHL_chlor_a_4km.nc",
        "A2017012.L3m_DAY_CHL_chlor_a_4km.nc",
    ]);
    let archive = FakeArchive::new(vec![
        distant_composite("T2017012.L3m_DAY_CHL_chlor_a_4km.nc"),
        gridded_chl_dataset(),
    ]);
    let in_range = InRange::new(fast_config(1), catalog, archive.clone());

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));

    // Both granules are fetched, only one produces a table.
    let table = handle.next().await.unwrap().unwrap();
    assert_eq!(
        table.product_name(),
        Some("A2017012.L3m_DAY_CHL_chlor_a_4km.nc")
    );
    assert!(handle.next().await.is_none());
    assert_eq!(archive.fetch_count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_extraction_trips_the_reap_deadline() {
    init_test_logging();
    let name = "A2017012.L3m_DAY_CHL_chlor_a_4km.nc";
    // A composite dense enough that extraction outlasts a 1 ms deadline:
    // every row sits inside the latitude band, ~360k distance evaluations.
    let lat: Vec<f64> = (0..1200).map(|i| 33.90 + i as f64 * 1.0e-4).collect();
    let lon: Vec<f64> = (0..300).map(|j| -126.30 + j as f64 * 2.0e-3).collect();
    let mut ds = SatelliteDataset::new(
        Some(name.to_string()),
        "2017-01-12T00:00:00.000Z",
        "2017-01-12T23:59:59.000Z",
        Layout::Gridded {
            lat: lat.clone(),
            lon: lon.clone(),
        },
    )
    .unwrap();
    ds.insert_variable(
        "chlor_a",
        Grid2::from_fn(lat.len(), lon.len(), |r, c| 0.1 + (r + c) as f64),
    );

    let catalog = FixedCatalog::new(&[name]);
    let archive = FakeArchive::new(vec![ds]);
    let config = ScanConfig {
        matchup_timeout: StdDuration::from_millis(1),
        ..fast_config(3)
    };
    let in_range = InRange::new(config, catalog, archive);

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));

    let err = handle.next().await.unwrap().unwrap_err();
    assert!(matches!(err, ScanError::Timeout(_)));
    assert!(handle.next().await.is_none());
}

/// Archive stub that delays one granule and holds another until released.
struct GatedArchive {
    datasets: HashMap<String, SatelliteDataset>,
    slow: &'static str,
    gated: &'static str,
    gate: Notify,
}

#[async_trait]
impl DatasetProvider for GatedArchive {
    async fn get(&self, granule: &str) -> Result<SatelliteDataset, ProviderError> {
        if granule == self.slow {
            tokio::time::sleep(StdDuration::from_millis(100)).await;
        }
        if granule == self.gated {
            self.gate.notified().await;
        }
        self.datasets
            .get(granule)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(granule.to_string()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn finished_tables_stream_before_the_scan_ends() {
    init_test_logging();
    let near = "A2017012.L3m_DAY_CHL_chlor_a_4km.nc";
    let slow = "A2017010.L3m_DAY_CHL_chlor_a_4km.nc";
    let gated = "A2017011.L3m_DAY_CHL_chlor_a_4km.nc";

    let catalog = FixedCatalog::new(&[near, slow, gated]);
    let archive = Arc::new(GatedArchive {
        datasets: [
            (near.to_string(), gridded_chl_dataset()),
            (slow.to_string(), distant_composite(slow)),
            (gated.to_string(), distant_composite(gated)),
        ]
        .into(),
        slow,
        gated,
        gate: Notify::new(),
    });
    let in_range = InRange::new(fast_config(3), catalog, archive.clone());

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));

    // With three workers the pool never fills, yet the first table arrives
    // while the last fetch is still held back.
    let table = tokio::time::timeout(StdDuration::from_secs(10), handle.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(table.product_name(), Some(near));

    archive.gate.notify_one();
    let end = tokio::time::timeout(StdDuration::from_secs(10), handle.next())
        .await
        .unwrap();
    assert!(end.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_granule_ends_the_scan_with_an_error() {
    init_test_logging();
    let catalog = FixedCatalog::new(&["A2017012.L3m_DAY_CHL_chlor_a_4km.nc"]);
    let archive = FakeArchive::new(vec![]);
    let in_range = InRange::new(fast_config(3), catalog, archive);

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));

    let err = handle.next().await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        ScanError::Provider(ProviderError::NotFound(_))
    ));
    assert!(handle.next().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_handle_stops_the_scan() {
    init_test_logging();
    // Many copies of the same granule under distinct names, all matching.
    let names: Vec<String> = (1..=30)
        .map(|day| format!("A2017{day:03}.L3m_DAY_CHL_chlor_a_4km.nc"))
        .collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let catalog = FixedCatalog::new(&name_refs);

    let template = gridded_chl_dataset();
    let datasets = names
        .iter()
        .map(|name| {
            let mut ds = SatelliteDataset::new(
                Some(name.clone()),
                "2017-01-12T00:00:00.000Z",
                "2017-01-12T23:59:59.000Z",
                template.layout().clone(),
            )
            .unwrap();
            ds.insert_variable("chlor_a", Grid2::from_fn(7, 5, |r, c| 0.1 + (r + c) as f64));
            ds
        })
        .collect();
    let archive = FakeArchive::new(datasets);
    let in_range = InRange::new(fast_config(1), catalog, archive.clone());

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(
        track.clone(),
        vec![Sensor::Aqua],
        DataType::L3m,
        12e3,
        Duration::hours(6),
    );

    // Take one table, then walk away.
    assert!(handle.next().await.unwrap().is_ok());
    drop(handle);

    // The scan notices the closed queue and stops well short of the full
    // candidate list.
    tokio::time::sleep(StdDuration::from_millis(200)).await;
    assert!(archive.fetch_count() < 30);

    // The same InRange can serve a fresh scan afterwards.
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));
    let drained = tokio::time::timeout(StdDuration::from_secs(30), async {
        let mut tables = 0;
        while let Some(result) = handle.next().await {
            result.unwrap();
            tables += 1;
        }
        tables
    })
    .await
    .unwrap();
    assert_eq!(drained, 30);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_candidate_list_ends_immediately() {
    init_test_logging();
    let catalog = FixedCatalog::new(&[]);
    let archive = FakeArchive::new(vec![]);
    let in_range = InRange::new(fast_config(3), catalog, archive);

    let track = single_waypoint_track("2017-01-12 20:00:00", 34.0, -126.0);
    let mut handle = in_range.search(track, vec![Sensor::Aqua], DataType::L3m, 12e3, Duration::hours(6));
    assert!(handle.next().await.is_none());
}
