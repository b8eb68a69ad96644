use std::collections::HashMap;

use compass_assess::{Dimension, ScoredAnswer};
use compass_db::models::TestQuestion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub value: u8,
}

/// Pair each submitted answer with its question's scoring key.
///
/// Every question must be answered exactly once with a value on the 1-5 scale.
/// The returned answers follow question order, and so does the second element,
/// which is the answer sheet as stored.
pub fn match_answers(
    questions: &[TestQuestion],
    answers: &[AnswerInput],
) -> Result<(Vec<ScoredAnswer>, Vec<AnswerInput>), ApiError> {
    let mut by_question: HashMap<Uuid, u8> = HashMap::with_capacity(answers.len());

    for answer in answers {
        if !(compass_assess::LIKERT_MIN..=compass_assess::LIKERT_MAX).contains(&answer.value) {
            return Err(ApiError::Validation(format!(
                "Answer values must be between {} and {}",
                compass_assess::LIKERT_MIN,
                compass_assess::LIKERT_MAX
            )));
        }
        if by_question.insert(answer.question_id, answer.value).is_some() {
            return Err(ApiError::Validation(format!(
                "Question {} answered more than once",
                answer.question_id
            )));
        }
    }

    if let Some(unknown) = answers
        .iter()
        .find(|a| !questions.iter().any(|q| q.id == a.question_id))
    {
        return Err(ApiError::Validation(format!(
            "Question {} does not belong to this test",
            unknown.question_id
        )));
    }

    let mut scored = Vec::with_capacity(questions.len());
    let mut sheet = Vec::with_capacity(questions.len());

    for question in questions {
        let value = *by_question.get(&question.id).ok_or_else(|| {
            ApiError::Validation(format!(
                "Question {} was not answered",
                question.position
            ))
        })?;

        let dimension: Dimension = question.dimension.parse().map_err(|e| {
            ApiError::Internal(format!("Question {} has a bad dimension: {e}", question.id))
        })?;

        scored.push(ScoredAnswer {
            dimension,
            reverse_scored: question.reverse_scored,
            value,
        });
        sheet.push(AnswerInput {
            question_id: question.id,
            value,
        });
    }

    Ok((scored, sheet))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(position: i32, dimension: &str, reverse_scored: bool) -> TestQuestion {
        TestQuestion {
            id: Uuid::new_v4(),
            position,
            prompt: format!("Question {position}"),
            dimension: dimension.to_string(),
            reverse_scored,
        }
    }

    fn answer(question: &TestQuestion, value: u8) -> AnswerInput {
        AnswerInput {
            question_id: question.id,
            value,
        }
    }

    #[test]
    fn test_answers_follow_question_order() {
        let questions = vec![question(1, "R", false), question(2, "S", true)];
        let answers = vec![answer(&questions[1], 2), answer(&questions[0], 5)];

        let (scored, sheet) = match_answers(&questions, &answers).unwrap();

        assert_eq!(scored[0].dimension, Dimension::Realistic);
        assert_eq!(scored[0].value, 5);
        assert_eq!(scored[1].dimension, Dimension::Social);
        assert!(scored[1].reverse_scored);
        assert_eq!(sheet[0].question_id, questions[0].id);
        assert_eq!(sheet[1].value, 2);
    }

    #[test]
    fn test_missing_answer_is_rejected() {
        let questions = vec![question(1, "R", false), question(2, "I", false)];
        let answers = vec![answer(&questions[0], 3)];

        assert!(matches!(
            match_answers(&questions, &answers),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_answer_is_rejected() {
        let questions = vec![question(1, "R", false)];
        let answers = vec![answer(&questions[0], 3), answer(&questions[0], 4)];

        assert!(match_answers(&questions, &answers).is_err());
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let questions = vec![question(1, "R", false)];
        let stray = question(9, "C", false);
        let answers = vec![answer(&questions[0], 3), answer(&stray, 3)];

        assert!(matches!(
            match_answers(&questions, &answers),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_out_of_scale_value_is_rejected() {
        let questions = vec![question(1, "A", false)];
        for value in [0, 6] {
            assert!(match_answers(&questions, &[answer(&questions[0], value)]).is_err());
        }
    }
}
