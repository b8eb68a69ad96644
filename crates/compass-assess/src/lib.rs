//! Psychometric scoring for Compass
//!
//! This crate scores Likert-scale interest inventories against the six RIASEC
//! dimensions and derives the student's Holland code. It performs no I/O: the
//! API layer loads questions and answers and hands them over as
//! [`ScoredAnswer`]s.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest value on the answer scale ("strongly disagree").
pub const LIKERT_MIN: u8 = 1;
/// Highest value on the answer scale ("strongly agree").
pub const LIKERT_MAX: u8 = 5;

/// A RIASEC interest dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Realistic,
    Investigative,
    Artistic,
    Social,
    Enterprising,
    Conventional,
}

impl Dimension {
    /// All dimensions in canonical RIASEC order.
    pub const ALL: [Self; 6] = [
        Self::Realistic,
        Self::Investigative,
        Self::Artistic,
        Self::Social,
        Self::Enterprising,
        Self::Conventional,
    ];

    /// Single-letter code used in Holland codes.
    pub const fn letter(self) -> char {
        match self {
            Self::Realistic => 'R',
            Self::Investigative => 'I',
            Self::Artistic => 'A',
            Self::Social => 'S',
            Self::Enterprising => 'E',
            Self::Conventional => 'C',
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Investigative => "investigative",
            Self::Artistic => "artistic",
            Self::Social => "social",
            Self::Enterprising => "enterprising",
            Self::Conventional => "conventional",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ScoreError;

    /// Accepts either the letter (`"S"`) or the full name (`"social"`), in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let letter = match trimmed.chars().collect::<Vec<_>>().as_slice() {
            [c] => Some(c.to_ascii_uppercase()),
            _ => None,
        };

        Self::ALL
            .into_iter()
            .find(|d| trimmed.eq_ignore_ascii_case(d.as_str()) || letter == Some(d.letter()))
            .ok_or_else(|| ScoreError::UnknownDimension(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("No answers to score")]
    Empty,
    #[error("Answer value {0} is outside the {LIKERT_MIN}-{LIKERT_MAX} scale")]
    OutOfRange(u8),
    #[error("Unknown dimension: '{0}'")]
    UnknownDimension(String),
}

/// One answered question, already joined with its scoring key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub dimension: Dimension,
    pub reverse_scored: bool,
    pub value: u8,
}

/// Aggregated score for a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Number of questions that measured this dimension
    pub items: u32,
    /// Sum of item contributions
    pub raw: u32,
    /// Highest attainable raw score (`items * LIKERT_MAX`)
    pub max: u32,
    /// Position between the lowest and highest attainable score, 0-100
    pub percent: f64,
    /// False when no question measured this dimension
    pub assessed: bool,
}

/// Full scored profile for one test submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// One entry per dimension, in canonical RIASEC order
    pub scores: Vec<DimensionScore>,
    /// Letters of the (up to) three strongest assessed dimensions
    pub holland_code: String,
}

impl Profile {
    pub fn score_for(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.scores.iter().find(|s| s.dimension == dimension)
    }
}

/// Contribution of a single answer, applying reverse scoring.
///
/// A reverse-scored item turns agreement into disagreement: `5 -> 1`, `4 -> 2`, ...
pub fn contribution(value: u8, reverse_scored: bool) -> Result<u32, ScoreError> {
    if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
        return Err(ScoreError::OutOfRange(value));
    }

    let value = if reverse_scored {
        LIKERT_MAX + LIKERT_MIN - value
    } else {
        value
    };

    Ok(u32::from(value))
}

/// Score a complete set of answers.
///
/// # Algorithm
///
/// For every dimension with `n` items:
///
/// * `raw` is the sum of contributions
/// * `max` is `n * 5`
/// * `percent` is `(raw - n) / (max - n) * 100`, rounded to one decimal, so an
///   all-"1" answer sheet scores 0 and an all-"5" sheet scores 100
///
/// Dimensions that no question measured are reported with `assessed = false`
/// and never appear in the Holland code.
pub fn score(answers: &[ScoredAnswer]) -> Result<Profile, ScoreError> {
    if answers.is_empty() {
        return Err(ScoreError::Empty);
    }

    let mut scores: Vec<DimensionScore> = Dimension::ALL
        .into_iter()
        .map(|dimension| DimensionScore {
            dimension,
            items: 0,
            raw: 0,
            max: 0,
            percent: 0.0,
            assessed: false,
        })
        .collect();

    for answer in answers {
        let points = contribution(answer.value, answer.reverse_scored)?;
        // ALL is in declaration order, so the discriminant is the index
        let entry = &mut scores[answer.dimension as usize];
        entry.items += 1;
        entry.raw += points;
    }

    for entry in &mut scores {
        if entry.items == 0 {
            continue;
        }
        entry.assessed = true;
        entry.max = entry.items * u32::from(LIKERT_MAX);
        let floor = entry.items * u32::from(LIKERT_MIN);
        let span = f64::from(entry.max - floor);
        let percent = f64::from(entry.raw - floor) / span * 100.0;
        entry.percent = (percent * 10.0).round() / 10.0;
    }

    let holland_code = holland_code(&scores);

    Ok(Profile {
        scores,
        holland_code,
    })
}

/// Derive the Holland code from dimension scores.
///
/// Ties keep canonical RIASEC order.
pub fn holland_code(scores: &[DimensionScore]) -> String {
    let mut ranked: Vec<&DimensionScore> = scores.iter().filter(|s| s.assessed).collect();
    ranked.sort_by_key(|s| s.dimension);
    // Stable sort: equal percentages stay in RIASEC order
    ranked.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    ranked
        .into_iter()
        .take(3)
        .map(|s| s.dimension.letter())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(dimension: Dimension, value: u8) -> ScoredAnswer {
        ScoredAnswer {
            dimension,
            reverse_scored: false,
            value,
        }
    }

    #[test]
    fn test_contribution_reverse_scoring() {
        assert_eq!(contribution(5, false), Ok(5));
        assert_eq!(contribution(5, true), Ok(1));
        assert_eq!(contribution(4, true), Ok(2));
        assert_eq!(contribution(3, true), Ok(3));
        assert_eq!(contribution(1, true), Ok(5));
    }

    #[test]
    fn test_contribution_out_of_range() {
        assert_eq!(contribution(0, false), Err(ScoreError::OutOfRange(0)));
        assert_eq!(contribution(6, true), Err(ScoreError::OutOfRange(6)));
    }

    #[test]
    fn test_score_empty() {
        assert_eq!(score(&[]), Err(ScoreError::Empty));
    }

    #[test]
    fn test_score_percent_bounds() {
        let profile = score(&[
            answer(Dimension::Realistic, 1),
            answer(Dimension::Realistic, 1),
            answer(Dimension::Social, 5),
            answer(Dimension::Social, 5),
        ])
        .unwrap();

        let realistic = profile.score_for(Dimension::Realistic).unwrap();
        assert_eq!(realistic.items, 2);
        assert_eq!(realistic.raw, 2);
        assert_eq!(realistic.max, 10);
        assert_eq!(realistic.percent, 0.0);

        let social = profile.score_for(Dimension::Social).unwrap();
        assert_eq!(social.percent, 100.0);
        assert!(social.assessed);
    }

    #[test]
    fn test_score_midpoint_and_rounding() {
        // raw 7 over items 2: (7 - 2) / (10 - 2) = 62.5%
        let profile = score(&[
            answer(Dimension::Artistic, 3),
            answer(Dimension::Artistic, 4),
        ])
        .unwrap();
        assert_eq!(profile.score_for(Dimension::Artistic).unwrap().percent, 62.5);

        // raw 8 over items 3: (8 - 3) / (15 - 3) = 41.666..%
        let profile = score(&[
            answer(Dimension::Artistic, 2),
            answer(Dimension::Artistic, 3),
            answer(Dimension::Artistic, 3),
        ])
        .unwrap();
        assert_eq!(profile.score_for(Dimension::Artistic).unwrap().percent, 41.7);
    }

    #[test]
    fn test_unassessed_dimensions() {
        let profile = score(&[answer(Dimension::Enterprising, 4)]).unwrap();

        assert_eq!(profile.scores.len(), 6);
        let realistic = profile.score_for(Dimension::Realistic).unwrap();
        assert!(!realistic.assessed);
        assert_eq!(realistic.max, 0);
        assert_eq!(realistic.percent, 0.0);

        // Only one dimension measured, so the code has one letter
        assert_eq!(profile.holland_code, "E");
    }

    #[test]
    fn test_holland_code_ordering() {
        let profile = score(&[
            answer(Dimension::Realistic, 2),
            answer(Dimension::Investigative, 5),
            answer(Dimension::Artistic, 3),
            answer(Dimension::Social, 4),
            answer(Dimension::Enterprising, 1),
            answer(Dimension::Conventional, 2),
        ])
        .unwrap();

        assert_eq!(profile.holland_code, "ISA");
    }

    #[test]
    fn test_holland_code_ties_keep_riasec_order() {
        let profile = score(&[
            answer(Dimension::Conventional, 4),
            answer(Dimension::Social, 4),
            answer(Dimension::Artistic, 4),
            answer(Dimension::Realistic, 4),
        ])
        .unwrap();

        assert_eq!(profile.holland_code, "RAS");
    }

    #[test]
    fn test_reverse_scored_items_in_profile() {
        let profile = score(&[
            ScoredAnswer {
                dimension: Dimension::Conventional,
                reverse_scored: true,
                value: 1,
            },
            answer(Dimension::Conventional, 5),
        ])
        .unwrap();

        assert_eq!(profile.score_for(Dimension::Conventional).unwrap().percent, 100.0);
    }

    #[test]
    fn test_score_rejects_any_out_of_range_answer() {
        let result = score(&[answer(Dimension::Social, 3), answer(Dimension::Social, 9)]);
        assert_eq!(result, Err(ScoreError::OutOfRange(9)));
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("S".parse::<Dimension>(), Ok(Dimension::Social));
        assert_eq!("i".parse::<Dimension>(), Ok(Dimension::Investigative));
        assert_eq!("Conventional".parse::<Dimension>(), Ok(Dimension::Conventional));
        assert_eq!(" artistic ".parse::<Dimension>(), Ok(Dimension::Artistic));
        assert!("x".parse::<Dimension>().is_err());
        assert!("socialite".parse::<Dimension>().is_err());
        assert!("".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_profile_serialization() {
        let profile = score(&[answer(Dimension::Social, 5)]).unwrap();
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["holland_code"], "S");
        assert_eq!(json["scores"][3]["dimension"], "social");
        assert_eq!(json["scores"][3]["percent"], 100.0);
    }
}
