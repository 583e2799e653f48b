//! MLB Lean Dashboard
//!
//! Daily pitcher-matchup dashboard with threshold-based lean calls.
//!
//! This library provides:
//! - `lean`: the lean classifier (ERA/WHIP differences to a lean call)
//! - `source`: dated dashboard CSV discovery and loading
//! - `report`: team filter, Full Game / F5 views, formatting and export
//! - `config`: persisted settings in `~/.lean-dashboard.conf`
//!
//! Binaries:
//! - `lean-csv`: command-line reports and exports
//! - `lean-ui`: desktop dashboard

pub mod config;
pub mod lean;
pub mod report;
pub mod source;

pub use lean::{classify, Classification, LeanCall, LeanThresholds};
pub use report::{build_report, Report, ReportView};
pub use source::MatchupTable;
