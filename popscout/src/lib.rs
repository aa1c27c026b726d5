pub mod config;
pub mod errors;
pub mod filters;
pub mod mapper;
pub mod metrics;
pub mod population;
pub mod rank;
pub mod results;
pub mod search;
pub mod store;

pub use config::{CliOverrides, ScoutConfig};
pub use errors::{ScoutError, ScoutResult};
pub use mapper::{map_with_concurrency, DEFAULT_CONCURRENCY};
pub use population::{
    load_countries, CountryDataset, CountryPopulation, CountryTable, HttpPopulationSource,
    PopulationSource,
};
pub use rank::{top_n, Metric, SortDirection, SortKey, SortOrder};
pub use results::{BatchSummary, ResultRecord};
pub use search::{filter, index_of, Labeled, PatternMatcher};
pub use store::LabelStore;
