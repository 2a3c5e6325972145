//! Price conversion core and shared abstractions

pub mod adjust;
pub mod broadcast;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod rate;
pub mod resolver;
pub mod series;

// Re-export main types for cleaner imports
pub use adjust::adjust_price;
pub use broadcast::{ConversionDefaults, DateArg, Evaluated, PriceArg, evaluate};
pub use error::AdjustError;
pub use resolver::resolve_index;
pub use series::{InflationTable, SeriesProvider, TableCell, TimeSeriesPoint};
