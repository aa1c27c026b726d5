/// Per-item outcomes of a mapped batch and the counts a caller needs to
/// describe it.
///
/// A batch always yields exactly one [`ResultRecord`] per input, in input
/// order. A failed item is still present: it becomes a
/// [`ResultRecord::Failure`] carrying the input it was produced from and the
/// failure message, so a renderer can show a fallback row instead of a gap.
use serde::Serialize;

/// Outcome of mapping a single input item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultRecord<T, R> {
    /// The mapping call produced a value
    Success { value: R },
    /// The mapping call failed; the input is kept for display
    Failure { input: T, error: String },
}

impl<T, R> ResultRecord<T, R> {
    pub fn success(value: R) -> Self {
        Self::Success { value }
    }

    pub fn failure(input: T, error: impl Into<String>) -> Self {
        Self::Failure {
            input,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The produced value, if any
    pub fn value(&self) -> Option<&R> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

/// Counts over a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Total number of records, one per input
    pub total: usize,
    /// Records holding a value
    pub succeeded: usize,
    /// Error sentinels
    pub failed: usize,
}

impl BatchSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Counts one more record
    pub fn add<T, R>(&mut self, record: &ResultRecord<T, R>) {
        self.total += 1;
        if record.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Summarizes a whole record slice
    pub fn from_records<T, R>(records: &[ResultRecord<T, R>]) -> Self {
        let mut summary = Self::new();
        for record in records {
            summary.add(record);
        }
        summary
    }

    /// True when some, but not all, items failed
    pub fn is_partial(&self) -> bool {
        self.failed > 0 && self.succeeded > 0
    }
}
