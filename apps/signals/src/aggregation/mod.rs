pub mod aggregator;
pub mod trend;

pub use aggregator::{AggregationEngine, AggregationSettings};
