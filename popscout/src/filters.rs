/// Filtering of the upstream country list.
///
/// The population service lists regions, income groups and continents next
/// to real countries. Those aggregates would dominate any population ranking,
/// so they are dropped before any per-country request is made.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Name fragments that mark an aggregate rather than a country
pub const AGGREGATE_KEYWORDS: &[&str] = &[
    "world",
    "region",
    "income",
    "countries",
    "areas",
    "sub-saharan",
    "latin america",
    "caribbean",
    "oceania",
    "europe",
    "africa",
    "asia",
    "northern america",
    "eastern asia",
    "western asia",
    "southern asia",
    "western europe",
    "eastern europe",
    "northern europe",
    "southern europe",
    "melanesia",
    "micronesia",
    "polynesia",
];

// Keywords are escaped, so building only fails if the regex size limit is hit
static AGGREGATE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    let alternation = AGGREGATE_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&format!("(?i)({})", alternation)) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!("Aggregate filter disabled: {}", e);
            None
        }
    }
});

/// Checks if a name denotes a region, income group or other aggregate
pub fn is_aggregate(name: &str) -> bool {
    AGGREGATE_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

/// Drops aggregates from `names`, keeping the order of the rest
pub fn exclude_aggregates(names: Vec<String>) -> Vec<String> {
    let before = names.len();
    let kept: Vec<String> = names.into_iter().filter(|n| !is_aggregate(n)).collect();
    debug!("Excluded {} aggregate entries", before - kept.len());
    kept
}
