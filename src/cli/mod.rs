//! Command implementations and terminal rendering

pub mod adjust;
pub mod rate;
pub mod series;
pub mod setup;
pub mod ui;
