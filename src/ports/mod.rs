//! Port traits between the domain and the adapters.

pub mod config_port;
pub mod data_port;
pub mod progress_port;
pub mod report_port;
