//! Paginated client for the CMR granule catalog.
//!
//! The catalog answers UMM-JSON pages of granule metadata; this client walks
//! the pages with an offset cursor and extracts the producer granule names,
//! which are the identifiers the rest of the pipeline works with.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{SearchError, SearchResult};

/// A spatial circle filter, degrees for the center and meters for the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub lon: f64,
    pub lat: f64,
    pub radius_m: f64,
}

impl Circle {
    /// Render as the catalog's `lon,lat,radius` query value.
    pub fn as_query_value(&self) -> String {
        format!("{},{},{}", self.lon, self.lat, self.radius_m)
    }
}

/// A granule catalog that can be narrowed by collection, time and circle.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Names of all granules of `short_name`/`provider` that intersect the
    /// time window and the circle, in catalog order.
    async fn granules(
        &self,
        short_name: &str,
        provider: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        circle: Circle,
    ) -> SearchResult<Vec<String>>;
}

/// Configuration for the CMR client.
#[derive(Debug, Clone)]
pub struct CmrConfig {
    /// Granule search endpoint
    pub endpoint: String,
    /// Granules per page
    pub page_size: usize,
    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for CmrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cmr.earthdata.nasa.gov/search/granules.umm_json".to_string(),
            page_size: 25,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client against the CMR granule search endpoint.
pub struct CmrClient {
    client: Client,
    config: CmrConfig,
}

impl CmrClient {
    /// Create a new catalog client with the given configuration.
    pub fn new(config: CmrConfig) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch one page at `offset`, returning the page's granule names and the
    /// total number of hits the catalog reports for the query.
    async fn fetch_page(
        &self,
        short_name: &str,
        provider: &str,
        temporal: &str,
        circle: &str,
        offset: usize,
    ) -> SearchResult<(Vec<String>, usize)> {
        let page_size = self.config.page_size.to_string();
        let offset_s = offset.to_string();
        let params = [
            ("short_name", short_name),
            ("provider", provider),
            ("temporal", temporal),
            ("circle", circle),
            ("page_size", page_size.as_str()),
            ("offset", offset_s.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body: serde_json::Value = response.json().await?;
        let hits = body
            .get("hits")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| SearchError::MalformedResponse("missing hits field".to_string()))?
            as usize;

        let items = body
            .get("items")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SearchError::MalformedResponse("missing items array".to_string()))?;

        let mut names = Vec::with_capacity(items.len());
        for item in items {
            names.push(producer_granule_id(item)?);
        }
        Ok((names, hits))
    }
}

#[async_trait]
impl CatalogClient for CmrClient {
    #[instrument(skip(self), fields(short_name = %short_name))]
    async fn granules(
        &self,
        short_name: &str,
        provider: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        circle: Circle,
    ) -> SearchResult<Vec<String>> {
        let temporal = format!(
            "{},{}",
            start.format("%Y-%m-%dT%H:%M:%SZ"),
            end.format("%Y-%m-%dT%H:%M:%SZ")
        );
        let circle = circle.as_query_value();

        walk_pages(|offset| self.fetch_page(short_name, provider, &temporal, &circle, offset))
            .await
    }
}

/// Drive the offset cursor until the reported hit count is exhausted.
///
/// An empty page before `hits` is reached also terminates the walk, so a
/// catalog that over-reports can never loop us forever.
async fn walk_pages<F, Fut>(mut fetch_page: F) -> SearchResult<Vec<String>>
where
    F: FnMut(usize) -> Fut,
    Fut: std::future::Future<Output = SearchResult<(Vec<String>, usize)>>,
{
    let mut names = Vec::new();
    let mut offset = 0;
    loop {
        let (page, hits) = fetch_page(offset).await?;

        let page_len = page.len();
        names.extend(page);
        offset += page_len;

        debug!(offset, hits, "Walked catalog page");
        if offset >= hits || page_len == 0 {
            return Ok(names);
        }
    }
}

/// Pull the producer granule name out of one UMM-JSON item.
fn producer_granule_id(item: &serde_json::Value) -> SearchResult<String> {
    let identifiers = item
        .pointer("/umm/DataGranule/Identifiers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            SearchError::MalformedResponse("item without DataGranule identifiers".to_string())
        })?;

    identifiers
        .iter()
        .find(|id| {
            id.get("IdentifierType").and_then(|v| v.as_str()) == Some("ProducerGranuleId")
        })
        .and_then(|id| id.get("Identifier").and_then(|v| v.as_str()))
        .map(str::to_string)
        .ok_or_else(|| {
            SearchError::MalformedResponse("item without ProducerGranuleId".to_string())
        })
}
