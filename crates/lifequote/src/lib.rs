//! Life-insurance quoting with health-condition underwriting eligibility.
//!
//! The [`quoting`] module holds the pipeline: per-condition decision trees
//! ([`quoting::eligibility`]) resolve to per-carrier verdicts, a
//! decline-dominant aggregation reconciles them across every selected
//! condition, and [`quoting::quotes`] merges the result with the priced
//! quote list and the agency's carrier preferences.

pub mod config;
pub mod error;
pub mod quoting;
pub mod telemetry;
