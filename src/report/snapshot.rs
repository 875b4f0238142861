//! Point-in-time dashboard data for rendering.

use crate::analysis::{
    aggregate_by, distributions_by_scale, overall_score, rank_drivers, summarize, ScaleDistribution,
};
use crate::config::ReportConfig;
use crate::live::{DataOrigin, ModuleView, ReconciledScore};
use crate::models::{DriverResult, GroupBy, ModuleSummary, RealtimeStats, ResponseSet, SurveyModule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Driver results for one grouping dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub group_by: GroupBy,
    pub results: Vec<DriverResult>,
}

/// Everything shown for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub module: SurveyModule,
    pub generated_at: DateTime<Utc>,
    pub data_origin: DataOrigin,
    pub summary: ModuleSummary,
    pub score: ReconciledScore,
    pub breakdowns: Vec<Breakdown>,
    pub top_drivers: Vec<DriverResult>,
    pub bottom_drivers: Vec<DriverResult>,
    pub distributions: Vec<ScaleDistribution>,
}

impl DashboardSnapshot {
    /// Aggregate `response_set` into a snapshot.
    pub fn build(
        response_set: &ResponseSet,
        origin: DataOrigin,
        score: ReconciledScore,
        options: &ReportConfig,
    ) -> Self {
        let summary = summarize(&response_set.questions, &response_set.answers);
        Self::with_summary(response_set, origin, summary, score, options)
    }

    /// Snapshot of a monitor's current view.
    pub fn from_view(view: &ModuleView, options: &ReportConfig) -> Self {
        Self::with_summary(
            &view.response_set,
            view.origin,
            view.summary.clone(),
            view.score.clone(),
            options,
        )
    }

    fn with_summary(
        response_set: &ResponseSet,
        origin: DataOrigin,
        summary: ModuleSummary,
        score: ReconciledScore,
        options: &ReportConfig,
    ) -> Self {
        let questions = &response_set.questions;
        let answers = &response_set.answers;

        let breakdowns = options
            .group_by
            .iter()
            .map(|&group_by| Breakdown {
                group_by,
                results: aggregate_by(questions, answers, group_by),
            })
            .collect();

        let drivers = aggregate_by(questions, answers, GroupBy::Driver);
        let (top_drivers, bottom_drivers) = rank_drivers(&drivers, options.top_drivers);

        Self {
            module: score.module,
            generated_at: Utc::now(),
            data_origin: origin,
            summary,
            score,
            breakdowns,
            top_drivers,
            bottom_drivers,
            distributions: distributions_by_scale(questions, answers, options.bucket_order),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }
}

/// Report covering one or more modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    /// Mean of the displayed module scores.
    pub overall_score: u8,
    pub modules: Vec<DashboardSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime: Option<RealtimeStats>,
}

impl DashboardReport {
    pub fn new(modules: Vec<DashboardSnapshot>, realtime: Option<RealtimeStats>) -> Self {
        let scores: Vec<(SurveyModule, u8)> =
            modules.iter().map(|s| (s.module, s.score.value)).collect();
        let available: Vec<SurveyModule> = modules.iter().map(|s| s.module).collect();

        Self {
            generated_at: Utc::now(),
            overall_score: overall_score(&scores, &available),
            modules,
            realtime,
        }
    }
}
