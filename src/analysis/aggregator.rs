//! Response aggregation and statistics.
//!
//! This module turns a question bank and one respondent's answers into
//! module summaries and per-group breakdowns. Everything here is a pure
//! function of its inputs.

use crate::models::{
    AnsweredQuestion, Answers, DriverResult, GroupBy, ModuleSummary, Question, SectionGroup,
    SurveyModule,
};
use crate::scale::Classification;
use std::collections::{HashMap, HashSet};

/// Percentage rounded to the nearest integer, 0 for an empty denominator.
pub fn whole_percentage(positive: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (positive.min(total) as f64 / total as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Percentage rounded to one decimal place, 0.0 for an empty denominator.
pub fn decimal_percentage(positive: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = (positive.min(total) as f64 / total as f64) * 100.0;
    ((pct * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Iterate answered questions in bank order with their classification.
///
/// Duplicate question ids are visited once. Answers that do not parse as
/// a number are skipped.
pub fn answered_questions<'a>(
    questions: &'a [Question],
    answers: &'a Answers,
) -> impl Iterator<Item = (&'a Question, &'a str, Classification)> + 'a {
    let mut seen = HashSet::new();
    questions.iter().filter_map(move |question| {
        if !seen.insert(question.id.as_str()) {
            return None;
        }
        let raw = answers.get(&question.id)?;
        let classification = question.scale.classify_raw(raw)?;
        Some((question, raw, classification))
    })
}

/// Compute the module summary for a set of answers.
pub fn summarize(questions: &[Question], answers: &Answers) -> ModuleSummary {
    let mut total = 0;
    let mut positive = 0;
    let mut sections: Vec<SectionGroup> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();

    for (question, raw, classification) in answered_questions(questions, answers) {
        total += 1;
        if classification.is_positive {
            positive += 1;
        }

        let section = question.group_key(GroupBy::Section);
        let idx = *section_index.entry(section.to_string()).or_insert_with(|| {
            sections.push(SectionGroup {
                section: section.to_string(),
                questions: Vec::new(),
            });
            sections.len() - 1
        });

        sections[idx].questions.push(AnsweredQuestion {
            question_id: question.id.clone(),
            text: question.text.clone(),
            scale: question.scale,
            raw_value: raw.to_string(),
            label: classification.label,
            is_positive: classification.is_positive,
        });
    }

    ModuleSummary {
        total_responses: total,
        positive_responses: positive,
        positive_percentage: whole_percentage(positive, total),
        grouped_by_section: sections,
    }
}

/// Group answered questions by a dimension.
///
/// One result per distinct group value, in first-seen order of the
/// question list. Groups whose questions are all unanswered are omitted.
pub fn aggregate_by(
    questions: &[Question],
    answers: &Answers,
    group_by: GroupBy,
) -> Vec<DriverResult> {
    let mut groups: Vec<(String, usize, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (question, _, classification) in answered_questions(questions, answers) {
        let key = question.group_key(group_by);
        let idx = *index.entry(key.to_string()).or_insert_with(|| {
            groups.push((key.to_string(), 0, 0));
            groups.len() - 1
        });

        let entry = &mut groups[idx];
        entry.2 += 1;
        if classification.is_positive {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(driver, positive_count, total_count)| DriverResult {
            driver,
            positive_count,
            total_count,
            positive_percentage: decimal_percentage(positive_count, total_count),
        })
        .collect()
}

/// Split driver results into top performers and areas for improvement.
///
/// Both lists hold at most `n` entries. The first is ordered by
/// percentage descending; the second starts with the lowest percentage.
pub fn rank_drivers(results: &[DriverResult], n: usize) -> (Vec<DriverResult>, Vec<DriverResult>) {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| {
        b.positive_percentage
            .partial_cmp(&a.positive_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top: Vec<DriverResult> = sorted.iter().take(n).cloned().collect();
    let bottom: Vec<DriverResult> = sorted.iter().rev().take(n).cloned().collect();

    (top, bottom)
}

/// Average of the available modules' percentages, rounded.
///
/// Modules missing from `scores` count as 0. Returns 0 when no module is
/// available.
pub fn overall_score(scores: &[(SurveyModule, u8)], available: &[SurveyModule]) -> u8 {
    if available.is_empty() {
        return 0;
    }

    let sum: u32 = available
        .iter()
        .map(|module| {
            scores
                .iter()
                .find(|(m, _)| m == module)
                .map(|(_, score)| u32::from(*score))
                .unwrap_or(0)
        })
        .sum();

    (sum as f64 / available.len() as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scale;

    fn likert_questions(n: usize) -> Vec<Question> {
        (1..=n)
            .map(|i| Question::new(&format!("q{}", i), "Question", "Strategy", Scale::Likert5))
            .collect()
    }

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_summary_sixty_percent() {
        let questions = likert_questions(5);
        let answers = answers(&[("q1", "4"), ("q2", "3"), ("q3", "5"), ("q4", "2"), ("q5", "4")]);

        let summary = summarize(&questions, &answers);
        assert_eq!(summary.total_responses, 5);
        assert_eq!(summary.positive_responses, 3);
        assert_eq!(summary.positive_percentage, 60);
    }

    #[test]
    fn test_summary_without_answers_is_zeroed() {
        let questions = likert_questions(3);
        let summary = summarize(&questions, &Answers::new());

        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.positive_responses, 0);
        assert_eq!(summary.positive_percentage, 0);
        assert!(summary.grouped_by_section.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_unknown_and_invalid_answers_are_ignored() {
        let questions = likert_questions(2);
        let answers = answers(&[("q1", "5"), ("q2", "n/a"), ("ghost", "5")]);

        let summary = summarize(&questions, &answers);
        assert_eq!(summary.total_responses, 1);
        assert_eq!(summary.positive_responses, 1);
        assert_eq!(summary.positive_percentage, 100);
    }

    #[test]
    fn test_duplicate_question_ids_count_once() {
        let mut questions = likert_questions(1);
        questions.push(questions[0].clone());
        let answers = answers(&[("q1", "4")]);

        assert_eq!(summarize(&questions, &answers).total_responses, 1);
        assert_eq!(aggregate_by(&questions, &answers, GroupBy::Section)[0].total_count, 1);
    }

    #[test]
    fn test_extreme_numeric_answers() {
        let questions = vec![
            Question::new("q1", "A", "Strategy", Scale::Likert5),
            Question::new("q2", "B", "Strategy", Scale::Likert5),
            Question::new("q3", "C", "Strategy", Scale::Likert5),
            Question::new("q4", "D", "Strategy", Scale::Banded1To10),
        ];
        let answers = answers(&[
            ("q1", "-1e300"),
            ("q2", "-9223372036854775808"),
            ("q3", "1e300"),
            ("q4", "-1e300"),
        ]);

        let summary = summarize(&questions, &answers);
        assert_eq!(summary.total_responses, 4);
        assert_eq!(summary.positive_responses, 1);
        assert_eq!(summary.positive_percentage, 25);

        let labels: Vec<&str> = summary.grouped_by_section[0]
            .questions
            .iter()
            .map(|q| q.label.as_str())
            .collect();
        assert_eq!(labels[0], i64::MIN.to_string());
        assert_eq!(labels[1], i64::MIN.to_string());
        assert_eq!(labels[2], i64::MAX.to_string());
        assert_eq!(aggregate_by(&questions, &answers, GroupBy::Section)[0].total_count, 4);
    }

    #[test]
    fn test_mixed_scales() {
        let questions = vec![
            Question::new("a", "A", "One", Scale::Likert5),
            Question::new("b", "B", "One", Scale::Nps0To10),
            Question::new("c", "C", "Two", Scale::Banded1To10),
        ];
        let answers = answers(&[("a", "4"), ("b", "6"), ("c", "7")]);

        let summary = summarize(&questions, &answers);
        assert_eq!(summary.positive_responses, 2);
        assert_eq!(summary.positive_percentage, 67);
        assert_eq!(summary.grouped_by_section[1].questions[0].label, "7 - High");
    }

    #[test]
    fn test_sections_keep_first_seen_order() {
        let questions = vec![
            Question::new("q1", "A", "Zeta", Scale::Likert5),
            Question::new("q2", "B", "Alpha", Scale::Likert5),
            Question::new("q3", "C", "Zeta", Scale::Likert5),
        ];
        let answers = answers(&[("q1", "1"), ("q2", "5"), ("q3", "4")]);

        let summary = summarize(&questions, &answers);
        let names: Vec<_> = summary
            .grouped_by_section
            .iter()
            .map(|s| s.section.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(summary.grouped_by_section[0].questions.len(), 2);
        assert_eq!(summary.grouped_by_section[0].questions[0].label, "Strongly Disagree");
    }

    #[test]
    fn test_aggregate_by_driver_with_general_bucket() {
        let questions = vec![
            Question::new("q1", "A", "S", Scale::Nps0To10).with_driver("Growth", "Coaching"),
            Question::new("q2", "B", "S", Scale::Nps0To10),
            Question::new("q3", "C", "S", Scale::Nps0To10).with_driver("Growth", "Coaching"),
            Question::new("q4", "D", "S", Scale::Nps0To10).with_driver("Pay", "Bonus"),
        ];
        let answers = answers(&[("q1", "9"), ("q2", "7"), ("q3", "3")]);

        let results = aggregate_by(&questions, &answers, GroupBy::Driver);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].driver, "Coaching");
        assert_eq!(results[0].positive_count, 1);
        assert_eq!(results[0].total_count, 2);
        assert_eq!(results[0].positive_percentage, 50.0);
        assert_eq!(results[1].driver, "General");
        assert_eq!(results[1].positive_percentage, 100.0);
    }

    #[test]
    fn test_group_percentage_has_one_decimal() {
        let questions: Vec<Question> = (1..=3)
            .map(|i| Question::new(&format!("q{}", i), "", "S", Scale::Likert5))
            .collect();
        let answers = answers(&[("q1", "5"), ("q2", "1"), ("q3", "1")]);

        let results = aggregate_by(&questions, &answers, GroupBy::Section);
        assert_eq!(results[0].positive_percentage, 33.3);
        assert_eq!(summarize(&questions, &answers).positive_percentage, 33);
    }

    #[test]
    fn test_group_totals_sum_to_module_totals() {
        let questions = vec![
            Question::new("q1", "", "A", Scale::Likert5),
            Question::new("q2", "", "B", Scale::Likert5),
            Question::new("q3", "", "A", Scale::Nps0To10),
            Question::new("q4", "", "C", Scale::Nps0To10),
        ];
        let answers = answers(&[("q1", "4"), ("q2", "2"), ("q3", "8"), ("q4", "")]);

        let summary = summarize(&questions, &answers);
        let groups = aggregate_by(&questions, &answers, GroupBy::Section);

        let total: usize = groups.iter().map(|g| g.total_count).sum();
        let positive: usize = groups.iter().map(|g| g.positive_count).sum();
        assert_eq!(total, summary.total_responses);
        assert_eq!(positive, summary.positive_responses);
        for group in &groups {
            assert!(group.total_count >= group.positive_count);
            assert!((0.0..=100.0).contains(&group.positive_percentage));
        }
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let questions = likert_questions(4);
        let answers = answers(&[("q1", "4"), ("q2", "1"), ("q4", "5")]);

        assert_eq!(summarize(&questions, &answers), summarize(&questions, &answers));
        assert_eq!(
            aggregate_by(&questions, &answers, GroupBy::Section),
            aggregate_by(&questions, &answers, GroupBy::Section)
        );
    }

    #[test]
    fn test_percentage_helpers() {
        assert_eq!(whole_percentage(0, 0), 0);
        assert_eq!(whole_percentage(1, 2), 50);
        assert_eq!(whole_percentage(2, 3), 67);
        assert_eq!(decimal_percentage(0, 0), 0.0);
        assert_eq!(decimal_percentage(2, 3), 66.7);
    }

    #[test]
    fn test_rank_drivers() {
        let make = |name: &str, pct: f64| DriverResult {
            driver: name.to_string(),
            positive_count: 0,
            total_count: 0,
            positive_percentage: pct,
        };
        let results = vec![make("a", 40.0), make("b", 90.0), make("c", 10.0), make("d", 65.5)];

        let (top, bottom) = rank_drivers(&results, 2);
        assert_eq!(top.iter().map(|d| d.driver.as_str()).collect::<Vec<_>>(), vec!["b", "d"]);
        assert_eq!(bottom.iter().map(|d| d.driver.as_str()).collect::<Vec<_>>(), vec!["c", "a"]);
    }

    #[test]
    fn test_overall_score() {
        let scores = [
            (SurveyModule::AiReadiness, 70),
            (SurveyModule::Leadership, 81),
            (SurveyModule::EmployeeExperience, 60),
        ];

        assert_eq!(overall_score(&scores, &SurveyModule::ALL), 70);
        assert_eq!(
            overall_score(&scores, &[SurveyModule::AiReadiness, SurveyModule::Leadership]),
            76
        );
        assert_eq!(overall_score(&scores, &[]), 0);
    }
}
