//! Sorting and top-N selection for display.
//!
//! Ordering is applied to a copy at selection time; stored collections are
//! never reordered. Labels compare the way a reader expects in a table:
//! case and diacritics are folded first (`"Åland"` sits next to `"Aland"`,
//! not after `"Zambia"`), and the raw text only breaks ties.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::errors::ScoutError;
use crate::search::Labeled;

/// A record exposing one numeric metric (e.g. population).
///
/// `None` means the value is missing or was not numeric; ranking treats it
/// as zero.
pub trait Metric {
    fn metric(&self) -> Option<f64>;
}

/// What to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// The record's label, compared lexicographically
    Label,
    /// The record's numeric metric
    Metric,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A key paired with a direction, written as `"key:dir"`.
///
/// Accepted keys are `country`, `label` and `name` for [`SortKey::Label`],
/// `population` and `metric` for [`SortKey::Metric`]. Directions are `asc`
/// and `desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortKey::Metric, SortDirection::Descending)
    }
}

impl FromStr for SortOrder {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ScoutError::invalid_sort_order(s))?;

        let key = match key.to_ascii_lowercase().as_str() {
            "country" | "label" | "name" => SortKey::Label,
            "population" | "metric" => SortKey::Metric,
            _ => return Err(ScoutError::invalid_sort_order(s)),
        };
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            _ => return Err(ScoutError::invalid_sort_order(s)),
        };

        Ok(Self::new(key, direction))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            SortKey::Label => "country",
            SortKey::Metric => "population",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", key, direction)
    }
}

/// Sorts a copy of `collection` and keeps the first `n` records.
///
/// Equal keys may come out in any order.
pub fn top_n<R>(collection: &[R], key: SortKey, direction: SortDirection, n: usize) -> Vec<R>
where
    R: Labeled + Metric + Clone,
{
    let mut sorted = collection.to_vec();
    sorted.sort_unstable_by(|a, b| {
        let ordering = match key {
            SortKey::Label => compare_labels(a.label(), b.label()),
            SortKey::Metric => metric_or_zero(a).total_cmp(&metric_or_zero(b)),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted.truncate(n);
    sorted
}

/// The metric used for ranking: missing and NaN count as zero.
pub fn metric_or_zero<R: Metric + ?Sized>(record: &R) -> f64 {
    match record.metric() {
        Some(value) if !value.is_nan() => value,
        _ => 0.0,
    }
}

/// Compares two labels on their folded form, then on the raw text.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        country: String,
        population: Option<f64>,
    }

    impl Labeled for Row {
        fn label(&self) -> &str {
            &self.country
        }
    }

    impl Metric for Row {
        fn metric(&self) -> Option<f64> {
            self.population
        }
    }

    fn row(country: &str, population: Option<f64>) -> Row {
        Row {
            country: country.to_string(),
            population,
        }
    }

    fn fifteen_rows() -> Vec<Row> {
        [
            ("Norway", 5.4e6),
            ("Sweden", 10.4e6),
            ("Denmark", 5.9e6),
            ("Finland", 5.5e6),
            ("Iceland", 0.37e6),
            ("Germany", 83.2e6),
            ("France", 67.8e6),
            ("Spain", 47.4e6),
            ("Italy", 59.0e6),
            ("Poland", 37.7e6),
            ("Chad", 17.7e6),
            ("Brazil", 214.0e6),
            ("India", 1408.0e6),
            ("Japan", 125.7e6),
            ("Kenya", 53.0e6),
        ]
        .iter()
        .map(|(name, pop)| row(name, Some(*pop)))
        .collect()
    }

    #[test]
    fn test_top_ten_by_population_descending() {
        let rows = fifteen_rows();
        let top = top_n(&rows, SortKey::Metric, SortDirection::Descending, 10);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].country, "India");
        for pair in top.windows(2) {
            assert!(pair[0].population >= pair[1].population);
        }
        // Smallest five are cut off
        assert!(!top.iter().any(|r| r.country == "Iceland"));
        // Input untouched
        assert_eq!(rows, fifteen_rows());
    }

    #[test]
    fn test_ascending_population() {
        let top = top_n(&fifteen_rows(), SortKey::Metric, SortDirection::Ascending, 3);
        let names: Vec<_> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Iceland", "Norway", "Finland"]);
    }

    #[test]
    fn test_missing_metric_counts_as_zero() {
        let rows = vec![
            row("A", Some(10.0)),
            row("B", None),
            row("C", Some(f64::NAN)),
            row("D", Some(-1.0)),
        ];
        let top = top_n(&rows, SortKey::Metric, SortDirection::Ascending, 4);
        assert_eq!(top[0].country, "D");
        assert_eq!(top[3].country, "A");
        assert_eq!(metric_or_zero(&rows[1]), 0.0);
        assert_eq!(metric_or_zero(&rows[2]), 0.0);
    }

    #[test]
    fn test_label_order_folds_case_and_accents() {
        let rows = vec![
            row("zambia", None),
            row("Åland Islands", None),
            row("Albania", None),
            row("Afghanistan", None),
        ];
        let top = top_n(&rows, SortKey::Label, SortDirection::Ascending, 10);
        let names: Vec<_> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(
            names,
            vec!["Afghanistan", "Åland Islands", "Albania", "zambia"]
        );

        let top = top_n(&rows, SortKey::Label, SortDirection::Descending, 1);
        assert_eq!(top[0].country, "zambia");
    }

    #[test]
    fn test_n_larger_than_collection() {
        let top = top_n(&fifteen_rows(), SortKey::Label, SortDirection::Ascending, 100);
        assert_eq!(top.len(), 15);
        let empty: Vec<Row> = Vec::new();
        assert!(top_n(&empty, SortKey::Label, SortDirection::Ascending, 10).is_empty());
        assert!(top_n(&fifteen_rows(), SortKey::Metric, SortDirection::Descending, 0).is_empty());
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(
            "population:desc".parse::<SortOrder>().unwrap(),
            SortOrder::new(SortKey::Metric, SortDirection::Descending)
        );
        assert_eq!(
            "country:asc".parse::<SortOrder>().unwrap(),
            SortOrder::new(SortKey::Label, SortDirection::Ascending)
        );
        assert_eq!(
            " Name:ASC ".parse::<SortOrder>().unwrap(),
            SortOrder::new(SortKey::Label, SortDirection::Ascending)
        );
        assert!("population".parse::<SortOrder>().is_err());
        assert!("height:desc".parse::<SortOrder>().is_err());
        assert!("population:up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_display_round_trips() {
        let order = SortOrder::default();
        assert_eq!(order.to_string(), "population:desc");
        assert_eq!(order.to_string().parse::<SortOrder>().unwrap(), order);
    }
}
