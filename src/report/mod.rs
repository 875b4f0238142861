//! Dashboard snapshots and their rendering.

pub mod generator;
pub mod snapshot;

pub use generator::{generate_json_report, generate_markdown_report, EMPTY_STATE};
pub use snapshot::{Breakdown, DashboardReport, DashboardSnapshot};
