//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod console_progress_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod html_report_adapter;
