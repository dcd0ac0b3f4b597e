//! radar-sig - commit significance classification for benchmark histories
//!
//! Given a history of commits with benchmark measurements, this library
//! decides which consecutive commit pairs changed their metrics enough to
//! deserve attention. Each metric's change is classified by a per-repository
//! pipeline of checks and reducers, and the pair verdict aggregates those
//! classifications with cumulative alarm thresholds.

pub mod analysis;
pub mod cli;
pub mod commit;
pub mod metric;
pub mod report;
pub mod significance;
