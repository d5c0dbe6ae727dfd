//! The scan pipeline: catalog narrowing, paced fetches, and a bounded pool
//! of extraction workers feeding a result queue.
//!
//! One scan is a background task that walks the candidate granules in
//! catalog order, fetches each through the [`DatasetProvider`], and hands
//! the loaded dataset to a blocking extraction worker. At most `npes`
//! workers run at once; finished tables flow to the consumer through a
//! bounded queue, so a slow consumer stalls the scan instead of growing
//! memory without bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use granule_search::{bloom_filter, CatalogClient, DataType, Sensor};
use matchup::{matchup, MatchupTable};
use matchup_common::Track;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::provider::DatasetProvider;
use crate::rate_limit::RateLimiter;

/// Entry point for matchup scans.
pub struct InRange {
    config: ScanConfig,
    catalog: Arc<dyn CatalogClient>,
    provider: Arc<dyn DatasetProvider>,
    limiter: Arc<RateLimiter>,
}

impl InRange {
    pub fn new(
        config: ScanConfig,
        catalog: Arc<dyn CatalogClient>,
        provider: Arc<dyn DatasetProvider>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        Self {
            config,
            catalog,
            provider,
            limiter,
        }
    }

    /// Start a scan in the background and return a handle to its results.
    ///
    /// Must be called from within a tokio runtime. Dropping the handle
    /// cancels the scan.
    pub fn search(
        &self,
        track: Track,
        sensors: Vec<Sensor>,
        dtype: DataType,
        dl_tol: f64,
        dt_tol: Duration,
    ) -> ScanHandle {
        let (tx, rx) = mpsc::channel(self.config.queue_capacity());
        let cancel = Arc::new(AtomicBool::new(false));

        let scanner = Scanner {
            config: self.config.clone(),
            catalog: Arc::clone(&self.catalog),
            provider: Arc::clone(&self.provider),
            limiter: Arc::clone(&self.limiter),
            tx,
            cancel: Arc::clone(&cancel),
        };
        tokio::spawn(scanner.run(track, sensors, dtype, dl_tol, dt_tol));

        ScanHandle { rx, cancel }
    }
}

/// Messages flowing from the scan task to the consumer.
enum ScanMessage {
    Table(MatchupTable),
    Failed(ScanError),
    Done,
}

/// Consumer side of a running scan.
pub struct ScanHandle {
    rx: mpsc::Receiver<ScanMessage>,
    cancel: Arc<AtomicBool>,
}

impl ScanHandle {
    /// Next non-empty matchup table, or the error that ended the scan.
    ///
    /// `None` means the scan is over; after an `Err` no further items
    /// follow.
    pub async fn next(&mut self) -> Option<ScanResult<MatchupTable>> {
        match self.rx.recv().await {
            Some(ScanMessage::Table(table)) => Some(Ok(table)),
            Some(ScanMessage::Failed(error)) => Some(Err(error)),
            Some(ScanMessage::Done) | None => None,
        }
    }

    /// Ask the scan to stop after the granule currently in flight.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.rx.close();
    }
}

/// How one reap step left the pipeline.
enum Progress {
    Continue,
    ReceiverGone,
}

struct Scanner {
    config: ScanConfig,
    catalog: Arc<dyn CatalogClient>,
    provider: Arc<dyn DatasetProvider>,
    limiter: Arc<RateLimiter>,
    tx: mpsc::Sender<ScanMessage>,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    #[instrument(skip_all, fields(waypoints = track.len(), sensors = sensors.len()))]
    async fn run(
        self,
        track: Track,
        sensors: Vec<Sensor>,
        dtype: DataType,
        dl_tol: f64,
        dt_tol: Duration,
    ) {
        match self.scan(track, sensors, dtype, dl_tol, dt_tol).await {
            Ok(true) => {
                let _ = self.tx.send(ScanMessage::Done).await;
                info!("Scan complete");
            }
            Ok(false) => {
                debug!("Scan stopped early");
            }
            Err(error) => {
                warn!(%error, "Scan failed");
                let _ = self.tx.send(ScanMessage::Failed(error)).await;
            }
        }
    }

    /// Walk the candidates, keeping at most `npes` extractions in flight.
    ///
    /// `Ok(true)` means the scan ran to completion; `Ok(false)` that it was
    /// cancelled or the consumer went away.
    async fn scan(
        &self,
        track: Track,
        sensors: Vec<Sensor>,
        dtype: DataType,
        dl_tol: f64,
        dt_tol: Duration,
    ) -> ScanResult<bool> {
        let candidates = bloom_filter(
            &track,
            &sensors,
            dtype,
            dl_tol,
            dt_tol,
            self.catalog.as_ref(),
        )
        .await?;
        info!(candidates = candidates.len(), "Catalog narrowing complete");

        let npes = self.config.npes.max(1);
        let mut pool: JoinSet<ScanResult<MatchupTable>> = JoinSet::new();

        for granule in candidates {
            if self.cancel.load(Ordering::Relaxed) {
                debug!("Scan cancelled");
                return Ok(false);
            }
            // Forward whatever already finished so tables stream out even
            // while the pool has spare capacity.
            while let Some(joined) = pool.try_join_next() {
                if let Progress::ReceiverGone = self.forward(joined).await? {
                    return Ok(false);
                }
            }
            while pool.len() >= npes {
                if let Progress::ReceiverGone = self.reap_one(&mut pool).await? {
                    return Ok(false);
                }
            }

            self.limiter.acquire().await;
            debug!(granule = %granule, "Fetching candidate granule");
            let ds = self.provider.get(&granule).await?;

            let track = track.clone();
            pool.spawn_blocking(move || matchup(&track, &ds, dl_tol, dt_tol).map_err(ScanError::from));
        }

        while !pool.is_empty() {
            if self.cancel.load(Ordering::Relaxed) {
                debug!("Scan cancelled during drain");
                return Ok(false);
            }
            if let Progress::ReceiverGone = self.reap_one(&mut pool).await? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Wait for one worker to finish, forwarding its table if non-empty.
    async fn reap_one(&self, pool: &mut JoinSet<ScanResult<MatchupTable>>) -> ScanResult<Progress> {
        let joined = timeout(self.config.matchup_timeout, pool.join_next())
            .await
            .map_err(|_| ScanError::Timeout(self.config.matchup_timeout))?;

        match joined {
            None => Ok(Progress::Continue),
            Some(joined) => self.forward(joined).await,
        }
    }

    /// Forward one worker outcome to the consumer.
    ///
    /// Empty tables are dropped here; the consumer only ever sees granules
    /// that actually produced matchups.
    async fn forward(
        &self,
        joined: Result<ScanResult<MatchupTable>, tokio::task::JoinError>,
    ) -> ScanResult<Progress> {
        match joined {
            Err(join_error) => Err(ScanError::Worker(join_error.to_string())),
            Ok(Err(error)) => Err(error),
            Ok(Ok(table)) => {
                if table.is_empty() {
                    debug!(product = ?table.product_name(), "No matchups in granule");
                    return Ok(Progress::Continue);
                }
                debug!(
                    product = ?table.product_name(),
                    rows = table.len(),
                    "Forwarding matchup table"
                );
                match self.tx.send(ScanMessage::Table(table)).await {
                    Ok(()) => Ok(Progress::Continue),
                    Err(_) => Ok(Progress::ReceiverGone),
                }
            }
        }
    }
}
