//! Markdown and JSON report generation.

use crate::analysis::ScaleDistribution;
use crate::live::{DataOrigin, ReconcileState};
use crate::models::{DriverResult, GroupBy, RealtimeStats};
use crate::report::snapshot::{Breakdown, DashboardReport, DashboardSnapshot};
use anyhow::Result;

/// Shown in place of module details when nothing has been answered.
pub const EMPTY_STATE: &str = "No responses recorded yet.";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# SurveyPulse Report\n\n");
    output.push_str(&generate_overview_section(report));

    if let Some(ref stats) = report.realtime {
        output.push_str(&generate_realtime_section(stats));
    }

    for snapshot in &report.modules {
        output.push_str(&generate_module_section(snapshot));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn state_label(state: ReconcileState) -> &'static str {
    match state {
        ReconcileState::LocalOnly => "local estimate",
        ReconcileState::Authoritative => "authoritative",
        ReconcileState::StaleFallback => "local estimate, analytics unavailable",
    }
}

fn origin_label(origin: DataOrigin) -> &'static str {
    match origin {
        DataOrigin::Source => "Survey API",
        DataOrigin::Fallback => "Sample data",
    }
}

fn group_heading(group_by: GroupBy) -> &'static str {
    match group_by {
        GroupBy::Section => "Results by Section",
        GroupBy::Category => "Results by Category",
        GroupBy::Driver => "Results by Driver",
    }
}

/// Generate the overview section.
fn generate_overview_section(report: &DashboardReport) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Overall Score:** {}%\n\n", report.overall_score));

    section.push_str("| Module | Score | Status | Responses | Data |\n");
    section.push_str("|:---|:---:|:---|:---:|:---|\n");
    for snapshot in &report.modules {
        section.push_str(&format!(
            "| {} | {}% | {} | {} | {} |\n",
            snapshot.module,
            snapshot.score.value,
            state_label(snapshot.score.state),
            snapshot.summary.total_responses,
            origin_label(snapshot.data_origin),
        ));
    }
    section.push('\n');

    section
}

/// Generate the realtime statistics section.
fn generate_realtime_section(stats: &RealtimeStats) -> String {
    let mut section = String::new();

    section.push_str("## Live Activity\n\n");
    section.push_str(&format!("- **Active Responses:** {}\n", stats.active_responses));
    section.push_str(&format!("- **Today:** {}\n", stats.today_responses));
    section.push_str(&format!(
        "- **Average Completion Time:** {:.1} min\n",
        stats.average_completion_time
    ));
    section.push_str(&format!("- **Completion Rate:** {:.1}%\n\n", stats.completion_rate));

    section
}

/// Generate the section for one module.
fn generate_module_section(snapshot: &DashboardSnapshot) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", snapshot.module));

    if snapshot.is_empty() {
        section.push_str(EMPTY_STATE);
        section.push_str("\n\n");
        return section;
    }

    let score = &snapshot.score;
    section.push_str(&format!(
        "**Positive Responses:** {}% ({})\n\n",
        score.value,
        state_label(score.state)
    ));
    section.push_str(&format!(
        "*{} of {} answers positive | local estimate {}%*\n\n",
        snapshot.summary.positive_responses, snapshot.summary.total_responses, score.local
    ));
    if score.consecutive_failures > 0 {
        section.push_str(&format!(
            "> Analytics polling has failed {} time(s) in a row.\n\n",
            score.consecutive_failures
        ));
    }

    for breakdown in &snapshot.breakdowns {
        section.push_str(&generate_breakdown_block(breakdown));
    }

    section.push_str(&generate_drivers_block(
        "Top Performing Drivers",
        &snapshot.top_drivers,
    ));
    section.push_str(&generate_drivers_block(
        "Areas for Improvement",
        &snapshot.bottom_drivers,
    ));

    for distribution in &snapshot.distributions {
        section.push_str(&generate_distribution_block(distribution));
    }

    section.push_str(&generate_answers_block(snapshot));

    section
}

fn generate_breakdown_block(breakdown: &Breakdown) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", group_heading(breakdown.group_by)));
    block.push_str("| Group | Positive | Total | % |\n");
    block.push_str("|:---|:---:|:---:|:---:|\n");
    for result in &breakdown.results {
        block.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            result.driver, result.positive_count, result.total_count, result.positive_percentage
        ));
    }
    block.push('\n');

    block
}

fn generate_drivers_block(title: &str, drivers: &[DriverResult]) -> String {
    if drivers.is_empty() {
        return String::new();
    }

    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", title));
    for (i, driver) in drivers.iter().enumerate() {
        block.push_str(&format!(
            "{}. {} - {:.1}%\n",
            i + 1,
            driver.driver,
            driver.positive_percentage
        ));
    }
    block.push('\n');

    block
}

fn generate_distribution_block(distribution: &ScaleDistribution) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### Score Distribution ({} scale)\n\n",
        distribution.scale.tag()
    ));
    block.push_str("| Score | Count | Positive |\n");
    block.push_str("|:---:|:---:|:---:|\n");
    for bucket in &distribution.buckets {
        block.push_str(&format!(
            "| {} | {} | {} |\n",
            bucket.score,
            bucket.count,
            if bucket.is_positive { "yes" } else { "no" }
        ));
    }
    block.push('\n');

    block
}

/// Answered questions grouped by section.
fn generate_answers_block(snapshot: &DashboardSnapshot) -> String {
    let mut block = String::new();

    block.push_str("### Answers\n\n");
    for group in &snapshot.summary.grouped_by_section {
        block.push_str(&format!("#### {}\n\n", group.section));
        block.push_str("| Question | Answer | Positive |\n");
        block.push_str("|:---|:---|:---:|\n");
        for question in &group.questions {
            block.push_str(&format!(
                "| {} | {} | {} |\n",
                question.text.replace('|', "\\|"),
                question.label,
                if question.is_positive { "yes" } else { "" }
            ));
        }
        block.push('\n');
    }

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by SurveyPulse v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}
