//! SurveyPulse - survey response aggregation engine.
//!
//! Turns a respondent's raw survey answers into positive-response
//! percentages at module, section, category and driver level, keeps them
//! reconciled with the backend's authoritative scores, and renders
//! dashboard reports.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod live;
pub mod models;
pub mod report;
pub mod scale;
pub mod source;
