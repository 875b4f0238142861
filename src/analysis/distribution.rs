//! Score distributions for histogram display.

use crate::analysis::aggregator::answered_questions;
use crate::models::{Answers, Question};
use crate::scale::{parse_value, Scale};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordering of buckets in a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketOrder {
    /// Order in which each score first appears in the input.
    #[default]
    FirstSeen,
    /// Numeric ascending order.
    Ascending,
}

/// Frequency of one score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub score: i64,
    pub count: usize,
    pub is_positive: bool,
}

/// Distribution of scores for a single scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDistribution {
    pub scale: Scale,
    pub buckets: Vec<DistributionBucket>,
}

impl ScaleDistribution {
    /// Total number of responses counted.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Build the frequency table for a list of scores on one scale.
///
/// Only scores that occur are listed.
pub fn build_distribution<I>(scale: Scale, scores: I, order: BucketOrder) -> Vec<DistributionBucket>
where
    I: IntoIterator<Item = i64>,
{
    let mut buckets: Vec<DistributionBucket> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for score in scores {
        match index.get(&score) {
            Some(&idx) => buckets[idx].count += 1,
            None => {
                index.insert(score, buckets.len());
                buckets.push(DistributionBucket {
                    score,
                    count: 1,
                    is_positive: scale.is_positive(score),
                });
            }
        }
    }

    if order == BucketOrder::Ascending {
        buckets.sort_by_key(|b| b.score);
    }

    buckets
}

/// Build the frequency table from raw answer strings, skipping invalid ones.
pub fn build_distribution_from_raw<'a, I>(
    scale: Scale,
    raw: I,
    order: BucketOrder,
) -> Vec<DistributionBucket>
where
    I: IntoIterator<Item = &'a str>,
{
    build_distribution(scale, raw.into_iter().filter_map(parse_value), order)
}

/// One distribution per scale present among the answered questions.
///
/// Scales appear in first-seen order of the question list.
pub fn distributions_by_scale(
    questions: &[Question],
    answers: &Answers,
    order: BucketOrder,
) -> Vec<ScaleDistribution> {
    let mut grouped: Vec<(Scale, Vec<&str>)> = Vec::new();

    for (question, raw, _) in answered_questions(questions, answers) {
        match grouped.iter_mut().find(|(scale, _)| *scale == question.scale) {
            Some((_, values)) => values.push(raw),
            None => grouped.push((question.scale, vec![raw])),
        }
    }

    grouped
        .into_iter()
        .map(|(scale, values)| ScaleDistribution {
            scale,
            buckets: build_distribution_from_raw(scale, values, order),
        })
        .collect()
}
