//! Scale policy: positivity thresholds and response labels.
//!
//! Every question carries one of three scale tags. The tag decides
//! whether a numeric answer counts as positive and how it is labelled
//! on the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Labels for the five-point agreement scale, indexed by `value - 1`.
const AGREEMENT_LABELS: [&str; 5] = [
    "Strongly Disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly Agree",
];

/// Scale type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scale {
    /// Likert agreement scale, 1 to 5.
    #[default]
    #[serde(rename = "1-5")]
    Likert5,
    /// NPS-style scale, 0 to 10.
    #[serde(rename = "0-10")]
    Nps0To10,
    /// 1 to 10 scale reported in low/medium/high bands.
    #[serde(rename = "1-10")]
    Banded1To10,
}

/// Outcome of classifying a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_positive: bool,
    pub label: String,
}

impl Scale {
    /// All known scales.
    pub const ALL: [Scale; 3] = [Scale::Likert5, Scale::Nps0To10, Scale::Banded1To10];

    /// The wire tag for this scale (`"1-5"`, `"0-10"`, `"1-10"`).
    pub fn tag(&self) -> &'static str {
        match self {
            Scale::Likert5 => "1-5",
            Scale::Nps0To10 => "0-10",
            Scale::Banded1To10 => "1-10",
        }
    }

    /// Lowest value considered positive on this scale.
    pub fn positive_threshold(&self) -> i64 {
        match self {
            Scale::Likert5 => 4,
            Scale::Nps0To10 | Scale::Banded1To10 => 7,
        }
    }

    /// Whether a parsed value is positive.
    pub fn is_positive(&self, value: i64) -> bool {
        value >= self.positive_threshold()
    }

    /// Human-readable label for a parsed value.
    pub fn label(&self, value: i64) -> String {
        match self {
            Scale::Likert5 => value
                .checked_sub(1)
                .and_then(|idx| usize::try_from(idx).ok())
                .and_then(|idx| AGREEMENT_LABELS.get(idx))
                .map(|label| label.to_string())
                .unwrap_or_else(|| value.to_string()),
            Scale::Nps0To10 => value.to_string(),
            Scale::Banded1To10 => {
                let band = if value <= 3 {
                    "Low"
                } else if value <= 6 {
                    "Medium"
                } else {
                    "High"
                };
                format!("{} - {}", value, band)
            }
        }
    }

    /// Classify a parsed value.
    pub fn classify(&self, value: i64) -> Classification {
        Classification {
            is_positive: self.is_positive(value),
            label: self.label(value),
        }
    }

    /// Classify a raw answer string.
    ///
    /// Returns `None` for blank or non-numeric input; such answers are
    /// neither positive nor counted.
    pub fn classify_raw(&self, raw: &str) -> Option<Classification> {
        parse_value(raw).map(|value| self.classify(value))
    }
}

/// Parse a raw answer into a score.
///
/// Accepts integers and decimals (truncated toward zero) after trimming.
pub fn parse_value(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Error for unknown scale tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scale '{0}' (expected 1-5, 0-10 or 1-10)")]
pub struct UnknownScale(pub String);

impl FromStr for Scale {
    type Err = UnknownScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scale::ALL
            .into_iter()
            .find(|scale| scale.tag() == s.trim())
            .ok_or_else(|| UnknownScale(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likert_threshold() {
        for v in 1..=5 {
            assert_eq!(Scale::Likert5.is_positive(v), v >= 4, "value {}", v);
        }
    }

    #[test]
    fn test_ten_point_thresholds() {
        for v in 0..=10 {
            assert_eq!(Scale::Nps0To10.is_positive(v), v >= 7, "value {}", v);
            assert_eq!(Scale::Banded1To10.is_positive(v), v >= 7, "value {}", v);
        }
    }

    #[test]
    fn test_labels_at_integer_bounds() {
        assert_eq!(Scale::Likert5.label(i64::MIN), i64::MIN.to_string());
        assert_eq!(Scale::Likert5.label(i64::MAX), i64::MAX.to_string());
        assert_eq!(parse_value("-1e300"), Some(i64::MIN));
        assert!(!Scale::Likert5.classify_raw("-1e300").unwrap().is_positive);
    }

    #[test]
    fn test_likert_labels() {
        assert_eq!(Scale::Likert5.label(1), "Strongly Disagree");
        assert_eq!(Scale::Likert5.label(3), "Neutral");
        assert_eq!(Scale::Likert5.label(5), "Strongly Agree");
        assert_eq!(Scale::Likert5.label(0), "0");
        assert_eq!(Scale::Likert5.label(9), "9");
    }

    #[test]
    fn test_banded_labels() {
        assert_eq!(Scale::Banded1To10.label(3), "3 - Low");
        assert_eq!(Scale::Banded1To10.label(4), "4 - Medium");
        assert_eq!(Scale::Banded1To10.label(6), "6 - Medium");
        assert_eq!(Scale::Banded1To10.label(7), "7 - High");
        assert_eq!(Scale::Nps0To10.label(7), "7");
    }

    #[test]
    fn test_invalid_raw_is_not_classified() {
        assert_eq!(Scale::Likert5.classify_raw(""), None);
        assert_eq!(Scale::Likert5.classify_raw("   "), None);
        assert_eq!(Scale::Nps0To10.classify_raw("great"), None);
        assert_eq!(Scale::Nps0To10.classify_raw("NaN"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 4 "), Some(4));
        assert_eq!(parse_value("7.9"), Some(7));
        assert_eq!(parse_value("-2"), Some(-2));
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("4abc"), None);
        assert_eq!(parse_value("7/10"), None);
    }

    #[test]
    fn test_scale_tags_round_trip_through_from_str() {
        assert_eq!("1-5".parse::<Scale>(), Ok(Scale::Likert5));
        assert_eq!("0-10".parse::<Scale>(), Ok(Scale::Nps0To10));
        assert_eq!("1-10".parse::<Scale>(), Ok(Scale::Banded1To10));
        assert!("1-7".parse::<Scale>().is_err());
    }

    #[test]
    fn test_scale_serde_tag() {
        let json = serde_json::to_string(&Scale::Nps0To10).unwrap();
        assert_eq!(json, "\"0-10\"");
        let scale: Scale = serde_json::from_str("\"1-10\"").unwrap();
        assert_eq!(scale, Scale::Banded1To10);
    }
}
