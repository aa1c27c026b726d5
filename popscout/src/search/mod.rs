//! Exact substring search over labeled collections.
//!
//! [`matcher`] holds the linear-time search itself; [`filter`] applies one
//! compiled pattern to every label of a collection.
pub mod filter;
pub mod matcher;

pub use filter::{filter, Labeled};
pub use matcher::{build_failure_function, index_of, PatternMatcher};
