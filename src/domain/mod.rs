//! Core domain types and logic.

pub mod error;
pub mod config;
pub mod series;
pub mod universe;
pub mod stats;
pub mod cointegration;
pub mod signal;
pub mod sizing;
pub mod simulation;
pub mod metrics;
pub mod report;
pub mod selector;
