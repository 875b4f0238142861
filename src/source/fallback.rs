//! Built-in question banks and sample answers.
//!
//! Used when the backend cannot be reached so the dashboard still has a
//! complete, plausible answer set to aggregate, and by `--offline` runs.

use crate::models::{
    Answers, ModuleAnalytics, Question, RealtimeStats, ResponseSet, SurveyModule,
};
use crate::scale::Scale;
use crate::source::{SourceError, SurveySource};
use async_trait::async_trait;
use tracing::debug;

const EE_DRIVERS: [(&str, &str); 4] = [
    ("Work Environment", "Physical Workspace"),
    ("Career Growth", "Development Opportunities"),
    ("Recognition & Rewards", "Compensation"),
    ("Work-Life Balance", "Flexibility"),
];

/// The built-in question bank for a module.
pub fn question_bank(module: SurveyModule) -> Vec<Question> {
    match module {
        SurveyModule::AiReadiness => vec![
            Question::new(
                "ai-q-1",
                "Leadership has a clear vision for how AI supports our strategy.",
                "Strategy & Leadership",
                Scale::Likert5,
            ),
            Question::new(
                "ai-q-2",
                "AI initiatives have dedicated budget and executive sponsorship.",
                "Strategy & Leadership",
                Scale::Likert5,
            ),
            Question::new(
                "ai-q-3",
                "Our infrastructure can support AI workloads in production.",
                "Infrastructure & Skills",
                Scale::Likert5,
            ),
            Question::new(
                "ai-q-4",
                "Teams have access to training on AI tools.",
                "Infrastructure & Skills",
                Scale::Likert5,
            ),
            Question::new(
                "ai-q-5",
                "Our data is accessible, well governed and of good quality.",
                "Data & Culture",
                Scale::Likert5,
            ),
            Question::new(
                "ai-q-6",
                "People are encouraged to experiment with new technology.",
                "Data & Culture",
                Scale::Likert5,
            ),
        ],
        SurveyModule::Leadership => [
            (
                "l-q-1",
                "My leader communicates a clear direction.",
                "Strategic Vision",
                "Centralized",
                "Vision Clarity",
            ),
            (
                "l-q-2",
                "I understand how my work connects to our goals.",
                "Strategic Vision",
                "Centralized",
                "Vision Clarity",
            ),
            (
                "l-q-3",
                "My leader helps me develop new skills.",
                "Team Development",
                "Decentralized",
                "Coaching",
            ),
            (
                "l-q-4",
                "I receive regular, useful feedback.",
                "Team Development",
                "Decentralized",
                "Coaching",
            ),
            (
                "l-q-5",
                "My leader listens to concerns before deciding.",
                "Communication Excellence",
                "Centralized",
                "Listening",
            ),
            (
                "l-q-6",
                "Decisions are made in a timely manner.",
                "Decision Making",
                "Centralized",
                "Accountability",
            ),
            (
                "l-q-7",
                "Leaders take ownership of outcomes.",
                "Decision Making",
                "Centralized",
                "Accountability",
            ),
            (
                "l-q-8",
                "Information is shared openly across the team.",
                "Communication Excellence",
                "Decentralized",
                "Transparency",
            ),
        ]
        .into_iter()
        .map(|(id, text, lens, configuration, driver)| {
            Question::new(id, text, lens, Scale::Likert5).with_driver(configuration, driver)
        })
        .collect(),
        SurveyModule::EmployeeExperience => (0..16)
            .map(|i| {
                let (category, driver) = EE_DRIVERS[i % EE_DRIVERS.len()];
                Question::new(
                    &format!("ee-q-{}", i + 1),
                    &format!(
                        "How likely are you to recommend our {}? ({})",
                        driver.to_lowercase(),
                        i + 1
                    ),
                    category,
                    Scale::Nps0To10,
                )
                .with_driver(category, driver)
            })
            .collect(),
    }
}

/// Sample answers keyed by question id.
fn sample_answers(module: SurveyModule) -> Answers {
    match module {
        SurveyModule::AiReadiness => [4, 3, 5, 4, 2, 4]
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("ai-q-{}", i + 1), v.to_string()))
            .collect(),
        SurveyModule::Leadership => [4, 3, 5, 4, 4, 2, 3, 5]
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("l-q-{}", i + 1), v.to_string()))
            .collect(),
        SurveyModule::EmployeeExperience => (0..16)
            .map(|i| (format!("ee-q-{}", i + 1), (6 + i % 5).to_string()))
            .collect(),
    }
}

/// Predictable answers for every question.
///
/// Likert questions cycle 1 to 5; ten-point questions cycle 7 to 10.
pub fn simulated_answers(questions: &[Question]) -> Answers {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let value = match q.scale {
                Scale::Likert5 => (i % 5) + 1,
                Scale::Nps0To10 | Scale::Banded1To10 => 7 + (i % 4),
            };
            (q.id.clone(), value.to_string())
        })
        .collect()
}

/// Sample answers restricted to the given questions, or simulated ones
/// when no sample answer matches.
pub fn fallback_answers(module: SurveyModule, questions: &[Question]) -> Answers {
    let samples = sample_answers(module);
    let matched: Answers = questions
        .iter()
        .filter_map(|q| samples.get(&q.id).map(|v| (q.id.clone(), v.to_string())))
        .collect();

    if matched.is_empty() {
        debug!("No sample answers match {} questions, simulating", module);
        simulated_answers(questions)
    } else {
        matched
    }
}

/// The complete fallback response set for a module.
pub fn synthetic_response_set(module: SurveyModule) -> ResponseSet {
    let questions = question_bank(module);
    let answers = fallback_answers(module, &questions);
    ResponseSet::new(questions, answers)
}

/// [`SurveySource`] that serves the built-in sample data.
///
/// Analytics carry no authoritative score, so the local estimate stays
/// on display.
#[derive(Debug, Clone, Default)]
pub struct OfflineSource;

#[async_trait]
impl SurveySource for OfflineSource {
    async fn fetch_response_set(
        &self,
        module: SurveyModule,
        _user_id: &str,
    ) -> Result<ResponseSet, SourceError> {
        Ok(synthetic_response_set(module))
    }

    async fn fetch_module_analytics(
        &self,
        _module: SurveyModule,
    ) -> Result<ModuleAnalytics, SourceError> {
        Ok(ModuleAnalytics::default())
    }

    async fn fetch_realtime_stats(
        &self,
        _survey_id: Option<&str>,
    ) -> Result<RealtimeStats, SourceError> {
        Ok(RealtimeStats {
            active_responses: 98,
            today_responses: 24,
            average_completion_time: 12.5,
            completion_rate: 74.8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate_by, summarize};
    use crate::models::GroupBy;

    #[test]
    fn test_every_bank_question_has_a_fallback_answer() {
        for module in SurveyModule::ALL {
            let set = synthetic_response_set(module);
            assert!(!set.questions.is_empty());
            for q in &set.questions {
                assert!(set.answers.contains(&q.id), "{} missing answer", q.id);
            }
        }
    }

    #[test]
    fn test_sample_percentages() {
        let ai = synthetic_response_set(SurveyModule::AiReadiness);
        assert_eq!(summarize(&ai.questions, &ai.answers).positive_percentage, 67);

        let leadership = synthetic_response_set(SurveyModule::Leadership);
        assert_eq!(summarize(&leadership.questions, &leadership.answers).positive_percentage, 63);

        // Answers cycle 6..=10, so only the four 6s are not positive.
        let ee = synthetic_response_set(SurveyModule::EmployeeExperience);
        let summary = summarize(&ee.questions, &ee.answers);
        assert_eq!(summary.total_responses, 16);
        assert_eq!(summary.positive_responses, 12);
        assert_eq!(summary.positive_percentage, 75);
    }

    #[test]
    fn test_employee_experience_categories() {
        let ee = synthetic_response_set(SurveyModule::EmployeeExperience);
        let categories = aggregate_by(&ee.questions, &ee.answers, GroupBy::Category);
        let names: Vec<_> = categories.iter().map(|c| c.driver.as_str()).collect();
        assert_eq!(
            names,
            vec!["Work Environment", "Career Growth", "Recognition & Rewards", "Work-Life Balance"]
        );
    }

    #[test]
    fn test_simulated_answers_alternate() {
        let questions = vec![
            Question::new("x1", "", "S", Scale::Likert5),
            Question::new("x2", "", "S", Scale::Likert5),
            Question::new("x3", "", "S", Scale::Nps0To10),
            Question::new("x4", "", "S", Scale::Likert5),
        ];

        let answers = fallback_answers(SurveyModule::AiReadiness, &questions);
        assert_eq!(answers.get("x1"), Some("1"));
        assert_eq!(answers.get("x2"), Some("2"));
        assert_eq!(answers.get("x3"), Some("9"));
        assert_eq!(answers.get("x4"), Some("4"));
    }

    #[tokio::test]
    async fn test_offline_source_has_no_authoritative_score() {
        let analytics = OfflineSource
            .fetch_module_analytics(SurveyModule::Leadership)
            .await
            .unwrap();
        assert_eq!(analytics.score(), None);
    }
}
