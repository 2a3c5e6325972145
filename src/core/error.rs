//! Errors raised while converting prices against an index table

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdjustError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid inflation table: {0}")]
    InvalidTable(String),

    #[error("cannot resolve an index for {date}: no table row to anchor against")]
    InvalidRange { date: NaiveDate },

    #[error("invalid growth rate {0}: must be at least -1")]
    InvalidGrowthRate(f64),
}

pub type Result<T, E = AdjustError> = std::result::Result<T, E>;
