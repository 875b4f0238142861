//! Data models for survey aggregation.
//!
//! This module contains the core data structures shared by the
//! aggregator, the live pollers and the report generator.

use crate::scale::Scale;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Group name used when a question has no value for a dimension.
pub const GENERAL_GROUP: &str = "General";

/// One of the three survey instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurveyModule {
    AiReadiness,
    Leadership,
    EmployeeExperience,
}

impl SurveyModule {
    pub const ALL: [SurveyModule; 3] = [
        SurveyModule::AiReadiness,
        SurveyModule::Leadership,
        SurveyModule::EmployeeExperience,
    ];

    /// URL slug used by the backend API.
    pub fn slug(&self) -> &'static str {
        match self {
            SurveyModule::AiReadiness => "ai-readiness",
            SurveyModule::Leadership => "leadership",
            SurveyModule::EmployeeExperience => "employee-experience",
        }
    }
}

impl fmt::Display for SurveyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyModule::AiReadiness => write!(f, "AI Readiness"),
            SurveyModule::Leadership => write!(f, "Leadership"),
            SurveyModule::EmployeeExperience => write!(f, "Employee Experience"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown survey module '{0}' (expected ai-readiness, leadership or employee-experience)")]
pub struct UnknownModule(pub String);

impl FromStr for SurveyModule {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        SurveyModule::ALL
            .into_iter()
            .find(|m| m.slug() == normalized)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Dimension used to group questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Section,
    Category,
    Driver,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Section => write!(f, "Section"),
            GroupBy::Category => write!(f, "Category"),
            GroupBy::Driver => write!(f, "Driver"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown grouping '{0}' (expected section, category or driver)")]
pub struct UnknownGroupBy(pub String);

impl FromStr for GroupBy {
    type Err = UnknownGroupBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "section" | "lens" => Ok(GroupBy::Section),
            "category" => Ok(GroupBy::Category),
            "driver" => Ok(GroupBy::Driver),
            other => Err(UnknownGroupBy(other.to_string())),
        }
    }
}

/// A survey question from a module's question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default, alias = "question")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default)]
    pub scale: Scale,
}

impl Question {
    /// Creates a question with only a section.
    pub fn new(id: &str, text: &str, section: &str, scale: Scale) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            section: Some(section.to_string()),
            category: None,
            driver: None,
            scale,
        }
    }

    /// Sets the category and driver.
    pub fn with_driver(mut self, category: &str, driver: &str) -> Self {
        self.category = Some(category.to_string());
        self.driver = Some(driver.to_string());
        self
    }

    /// The group key for a dimension, `"General"` when missing or blank.
    pub fn group_key(&self, group_by: GroupBy) -> &str {
        let value = match group_by {
            GroupBy::Section => self.section.as_deref(),
            GroupBy::Category => self.category.as_deref(),
            GroupBy::Driver => self.driver.as_deref(),
        };

        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => GENERAL_GROUP,
        }
    }
}

/// A single answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub raw_value: String,
}

impl Answer {
    pub fn new(question_id: &str, raw_value: impl ToString) -> Self {
        Self {
            question_id: question_id.to_string(),
            raw_value: raw_value.to_string(),
        }
    }
}

/// Answers keyed by question id. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Answers(HashMap<String, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: impl Into<String>, raw_value: impl Into<String>) {
        self.0.insert(question_id.into(), raw_value.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Answer> for Answers {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut answers = Answers::new();
        for answer in iter {
            answers.insert(answer.question_id, answer.raw_value);
        }
        answers
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Answers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut answers = Answers::new();
        for (k, v) in iter {
            answers.insert(k, v);
        }
        answers
    }
}

/// The backend sends answers as strings or bare numbers; nulls are dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, Option<WireValue>> = HashMap::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, value)| {
                let value = match value? {
                    WireValue::Text(s) => s,
                    WireValue::Number(n) => n.to_string(),
                };
                Some((id, value))
            })
            .collect())
    }
}

/// Questions plus one respondent's answers for a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSet {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, rename = "responses", alias = "answers")]
    pub answers: Answers,
}

impl ResponseSet {
    pub fn new(questions: Vec<Question>, answers: Answers) -> Self {
        Self { questions, answers }
    }

    /// True when there is nothing to aggregate.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() || self.answers.is_empty()
    }
}

/// Positive-response breakdown for one group value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverResult {
    pub driver: String,
    pub positive_count: usize,
    pub total_count: usize,
    /// Percentage rounded to one decimal place.
    pub positive_percentage: f64,
}

/// A question with its answer, as listed in a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub text: String,
    pub scale: Scale,
    pub raw_value: String,
    pub label: String,
    pub is_positive: bool,
}

/// Answered questions of one section, in question-bank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionGroup {
    pub section: String,
    pub questions: Vec<AnsweredQuestion>,
}

/// Module-level summary of one respondent's answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub total_responses: usize,
    pub positive_responses: usize,
    /// Percentage rounded to the nearest integer.
    pub positive_percentage: u8,
    pub grouped_by_section: Vec<SectionGroup>,
}

impl ModuleSummary {
    pub fn is_empty(&self) -> bool {
        self.total_responses == 0
    }
}

/// Server-side analytics for a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleAnalytics {
    /// Kept as raw JSON: only a finite number counts as a score.
    #[serde(default, rename = "positiveScore", skip_serializing_if = "Option::is_none")]
    pub positive_score: Option<serde_json::Value>,
}

impl ModuleAnalytics {
    pub fn with_score(score: f64) -> Self {
        Self {
            positive_score: Some(serde_json::json!(score)),
        }
    }

    /// The authoritative score, if present and numeric.
    pub fn score(&self) -> Option<f64> {
        self.positive_score
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

/// Auxiliary realtime counters shown next to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeStats {
    pub active_responses: u64,
    pub today_responses: u64,
    /// Average completion time in minutes.
    pub average_completion_time: f64,
    /// Completion rate as a percentage.
    pub completion_rate: f64,
}
