//! Exact, case-insensitive substring search using a prefix-function
//! (failure table), so a scan never re-reads text it has already matched.
//!
//! Positions are `char` indices into the caller's text. Lowercasing can
//! expand one char into several (`'İ'` becomes `"i̇"`), so the scan keeps a
//! map from each lowercased char back to the char it came from.

/// Builds the failure table for `pattern`.
///
/// `table[i]` is the length of the longest proper prefix of
/// `pattern[..=i]` that is also a suffix of it. `table[0]` is always 0 and
/// the table has exactly one entry per pattern element.
pub fn build_failure_function<T: PartialEq>(pattern: &[T]) -> Vec<usize> {
    let mut table = vec![0; pattern.len()];
    let mut len = 0;

    for i in 1..pattern.len() {
        while len > 0 && pattern[i] != pattern[len] {
            len = table[len - 1];
        }
        if pattern[i] == pattern[len] {
            len += 1;
        }
        table[i] = len;
    }

    table
}

/// Returns the first position of `pattern` in `text`, ignoring case.
///
/// An empty pattern matches at 0 for any text, including an empty one.
/// A pattern longer than the text never matches.
pub fn index_of(text: &str, pattern: &str) -> Option<usize> {
    PatternMatcher::new(pattern).find(text)
}

/// A normalized pattern together with its failure table.
///
/// Building one is O(pattern length); after that it can be run against any
/// number of texts, which is what [`filter`](super::filter::filter) does for
/// every record of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatcher {
    pattern: Vec<char>,
    table: Vec<usize>,
}

impl PatternMatcher {
    /// Creates a matcher for `pattern`. The pattern is lowercased here, once.
    pub fn new(pattern: &str) -> Self {
        let pattern = normalize(pattern);
        let table = build_failure_function(&pattern);
        Self { pattern, table }
    }

    /// Number of chars in the normalized pattern
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// The failure table computed for the normalized pattern
    pub fn table(&self) -> &[usize] {
        &self.table
    }

    /// Finds the first match in `text`, lowercasing the text once up front.
    pub fn find(&self, text: &str) -> Option<usize> {
        if self.pattern.is_empty() {
            return Some(0);
        }
        let (chars, origins) = normalize_with_origins(text);
        self.find_normalized(&chars).map(|start| origins[start])
    }

    /// Whether `text` contains the pattern anywhere
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    fn find_normalized(&self, text: &[char]) -> Option<usize> {
        let m = self.pattern.len();
        let mut matched = 0;

        for (i, c) in text.iter().enumerate() {
            while matched > 0 && *c != self.pattern[matched] {
                matched = self.table[matched - 1];
            }
            if *c == self.pattern[matched] {
                matched += 1;
                if matched == m {
                    return Some(i + 1 - m);
                }
            }
        }

        None
    }
}

fn normalize(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Lowercased chars plus, for each, the index of the input char it came from
fn normalize_with_origins(s: &str) -> (Vec<char>, Vec<usize>) {
    let mut chars = Vec::with_capacity(s.len());
    let mut origins = Vec::with_capacity(s.len());
    for (index, c) in s.chars().enumerate() {
        for lower in c.to_lowercase() {
            chars.push(lower);
            origins.push(index);
        }
    }
    (chars, origins)
}
