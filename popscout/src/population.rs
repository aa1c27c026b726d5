//! Country population aggregation.
//!
//! The remote service is reached through the [`PopulationSource`] trait so
//! the pipeline can be driven by the HTTP client in production and by an
//! in-memory fake in tests. [`load_countries`] fetches the country list once
//! (a failure there fails the whole load), then fetches each country's
//! population through the bounded-concurrency mapper, where a failure only
//! turns that one country into an error sentinel.
//!
//! [`CountryTable`] is the display view: filter, sort, top-N and a status
//! line.
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::errors::{ScoutError, ScoutResult};
use crate::filters::exclude_aggregates;
use crate::mapper::map_with_concurrency;
use crate::rank::{top_n, Metric, SortOrder};
use crate::results::{BatchSummary, ResultRecord};
use crate::search::{filter, Labeled};

/// Public population.io endpoint
pub const DEFAULT_BASE_URL: &str = "https://d6wn6bmjj722w.population.io/1.0";

/// Rows shown when no limit is given
pub const DEFAULT_TOP_N: usize = 10;

/// Today's population of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPopulation {
    pub country: String,
    pub population: u64,
}

impl Labeled for CountryPopulation {
    fn label(&self) -> &str {
        &self.country
    }
}

impl Metric for CountryPopulation {
    fn metric(&self) -> Option<f64> {
        Some(self.population as f64)
    }
}

/// One loaded country: a population or an error sentinel holding the name
pub type CountryRecord = ResultRecord<String, CountryPopulation>;

impl Labeled for CountryRecord {
    fn label(&self) -> &str {
        match self {
            ResultRecord::Success { value } => &value.country,
            ResultRecord::Failure { input, .. } => input,
        }
    }
}

impl Metric for CountryRecord {
    fn metric(&self) -> Option<f64> {
        self.value().and_then(Metric::metric)
    }
}

/// Where country names and populations come from
#[async_trait]
pub trait PopulationSource: Send + Sync {
    /// All names the source knows, aggregates included
    async fn countries(&self) -> ScoutResult<Vec<String>>;

    /// Today's population for a single country
    async fn today_population(&self, country: &str) -> ScoutResult<CountryPopulation>;
}

/// [`PopulationSource`] backed by the population.io REST API
#[derive(Debug, Clone)]
pub struct HttpPopulationSource {
    client: Client,
    base_url: Url,
}

impl HttpPopulationSource {
    /// Creates a source rooted at `base_url`; every request gets `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> ScoutResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ScoutError::config_error(format!("Invalid base URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScoutError::config_error(format!(
                "Base URL cannot hold a path: {}",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Creates a source from the configured base URL and timeout
    pub fn from_config(config: &ScoutConfig) -> ScoutResult<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Appends percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_json(&self, url: Url) -> ScoutResult<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::bad_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body,
                url.as_str(),
            ));
        }
        let bytes = response.bytes().await?;
        decode_payload(&bytes)
    }
}

#[async_trait]
impl PopulationSource for HttpPopulationSource {
    async fn countries(&self) -> ScoutResult<Vec<String>> {
        let payload = self.fetch_json(self.endpoint(&["countries"])).await?;
        Ok(parse_country_list(&payload))
    }

    async fn today_population(&self, country: &str) -> ScoutResult<CountryPopulation> {
        // Trailing empty segment keeps the service's trailing slash
        let url = self.endpoint(&["population", country, "today-and-tomorrow", ""]);
        let payload = self.fetch_json(url).await?;
        Ok(CountryPopulation {
            country: country.to_string(),
            population: parse_population(&payload),
        })
    }
}

/// Decodes a response body as JSON
fn decode_payload(bytes: &[u8]) -> ScoutResult<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads `{"countries": [...]}`. Anything else yields an empty list, and
/// non-string entries are skipped.
pub fn parse_country_list(payload: &Value) -> Vec<String> {
    match payload.get("countries") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Reads today's population from a `today-and-tomorrow` payload.
///
/// `total_population` is either a list whose first entry carries the value
/// or a single object. Missing or non-numeric values read as 0 rather than
/// failing the country.
pub fn parse_population(payload: &Value) -> u64 {
    let total = &payload["total_population"];
    let raw = match total {
        Value::Array(entries) => entries.first().map(|entry| &entry["population"]),
        Value::Object(fields) => fields.get("population"),
        _ => None,
    };
    raw.map(numeric_or_zero).unwrap_or(0)
}

fn numeric_or_zero(value: &Value) -> u64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    }
}

/// Everything a successful load produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountryDataset {
    /// One record per country, in list order
    pub records: Vec<CountryRecord>,
    pub summary: BatchSummary,
}

impl CountryDataset {
    pub fn new(records: Vec<CountryRecord>) -> Self {
        let summary = BatchSummary::from_records(&records);
        Self { records, summary }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads every country's population.
///
/// Fails as a whole only when the country list cannot be obtained or is
/// empty after aggregates are dropped. Individual country failures end up as
/// sentinels inside the dataset.
pub async fn load_countries<S>(source: &S, config: &ScoutConfig) -> ScoutResult<CountryDataset>
where
    S: PopulationSource + ?Sized,
{
    info!("Loading country list");
    let mut names = source.countries().await?;
    if config.exclude_aggregates {
        names = exclude_aggregates(names);
    }
    if names.is_empty() {
        return Err(ScoutError::EmptyCountryList);
    }

    let records = map_with_concurrency(
        &names,
        |country, _| async move { source.today_population(&country).await },
        config.concurrency,
    )
    .await;

    let dataset = CountryDataset::new(records);
    if dataset.summary.is_partial() {
        warn!(
            "{} of {} countries failed to load",
            dataset.summary.failed, dataset.summary.total
        );
    } else if dataset.summary.failed > 0 {
        warn!("Every one of {} countries failed to load", dataset.summary.total);
    }
    info!("Loaded {} countries", dataset.len());
    Ok(dataset)
}

/// A numbered table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRow {
    /// 1-based position in the table
    pub rank: usize,
    pub country: String,
    /// 0 for a country that failed to load
    pub population: u64,
    pub error: Option<String>,
}

impl CountryRow {
    /// Population with thousands separators, e.g. `5,421,241`
    pub fn population_display(&self) -> String {
        format_thousands(self.population)
    }
}

/// The rows to display plus the status line under them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryTable {
    pub rows: Vec<CountryRow>,
    pub status: String,
}

impl CountryTable {
    /// Filters by `query`, sorts by `order` and keeps `limit` rows.
    pub fn render(dataset: &CountryDataset, query: &str, order: SortOrder, limit: usize) -> Self {
        let query = query.trim();
        let view = filter(&dataset.records, query);
        let top = top_n(&view, order.key, order.direction, limit);

        let rows: Vec<CountryRow> = top
            .into_iter()
            .enumerate()
            .map(|(i, record)| CountryRow {
                rank: i + 1,
                country: record.label().to_string(),
                population: record.value().map_or(0, |v| v.population),
                error: record.error().map(str::to_string),
            })
            .collect();

        let filtered = if query.is_empty() { "" } else { " (filtered)" };
        let mut status = format!(
            "Showing {} of {} countries{}.",
            rows.len(),
            dataset.len(),
            filtered
        );
        if dataset.summary.failed > 0 {
            status.push_str(&format!(" {} failed to load.", dataset.summary.failed));
        }

        Self { rows, status }
    }

    /// The empty table shown when nothing could be loaded
    pub fn failed(err: &ScoutError) -> Self {
        Self {
            rows: Vec::new(),
            status: format!("Failed to load: {}", err),
        }
    }
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
