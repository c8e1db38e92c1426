//! Reliability-index aggregation over normalized outage records.
//!
//! This module groups records by feeder and time bucket, computes
//! SAIFI/SAIDI/CAIDI per group, summarizes outage durations by fault
//! category, and selects the table slice matching a requested period.

pub mod aggregate;
pub mod fault;
pub mod period;
pub mod trend;
pub mod types;
pub mod utility;
