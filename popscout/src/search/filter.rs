use super::matcher::PatternMatcher;

/// A record with a designated searchable label.
///
/// The label is what [`filter`] matches against and what
/// [`top_n`](crate::rank::top_n) sorts by when ordering by name.
pub trait Labeled {
    fn label(&self) -> &str;
}

impl Labeled for String {
    fn label(&self) -> &str {
        self
    }
}

impl Labeled for &str {
    fn label(&self) -> &str {
        self
    }
}

/// Returns the records whose label contains `query`, ignoring case.
///
/// A blank query returns a copy of the whole collection. Order is always
/// the original order and the input is never touched. The query's failure
/// table is built once and reused for every record.
pub fn filter<R: Labeled + Clone>(collection: &[R], query: &str) -> Vec<R> {
    if query.trim().is_empty() {
        return collection.to_vec();
    }

    let matcher = PatternMatcher::new(query);
    collection
        .iter()
        .filter(|record| matcher.is_match(record.label()))
        .cloned()
        .collect()
}
