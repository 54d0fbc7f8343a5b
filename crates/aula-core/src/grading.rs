//! Quiz auto-grading.
//!
//! A submission is scored in a single pass over the quiz's questions. Every
//! question contributes its point value to the available total, whether or
//! not it was answered. Option-backed questions earn their full value or
//! nothing; free-text questions are never scored here and stay at zero until
//! a teacher grades them by hand.

use std::collections::{BTreeSet, HashMap};

/// A submitted answer for one question, as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// A single selected option id.
    Selected(i32),
    /// Several selected option ids (checkbox-style questions).
    SelectedMany(Vec<i32>),
    /// Free text; not auto-gradable.
    Text(String),
}

/// What the grader needs to know about one question.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub id: i32,
    pub points: i32,
    /// Ids of the options marked correct. Empty for free-text questions.
    pub correct: BTreeSet<i32>,
    /// False for short-answer/essay questions, which are graded manually.
    pub auto_graded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedQuiz {
    /// Percentage in `[0, 100]`, `0.0` when the quiz is worth no points.
    pub score: f64,
    /// Points earned.
    pub points: i32,
    /// Points available across all questions.
    pub total_points: i32,
}

/// Scores a submission against the authoritative correct-option sets.
///
/// A multi-valued answer must match the correct set exactly. A single-valued
/// answer earns the points if it names any correct option, even when the
/// question has several correct options — this mirrors the long-standing
/// grading behavior clients rely on.
pub fn grade(questions: &[QuestionSpec], answers: &HashMap<i32, Answer>) -> GradedQuiz {
    let mut earned = 0;
    let mut total = 0;

    for question in questions {
        total += question.points;

        if !question.auto_graded {
            continue;
        }
        let Some(answer) = answers.get(&question.id) else {
            continue;
        };

        let correct = match answer {
            Answer::Selected(id) => question.correct.contains(id),
            Answer::SelectedMany(ids) => {
                let chosen: BTreeSet<i32> = ids.iter().copied().collect();
                chosen == question.correct
            }
            Answer::Text(_) => false,
        };
        if correct {
            earned += question.points;
        }
    }

    let score = if total > 0 {
        f64::from(earned) / f64::from(total) * 100.0
    } else {
        0.0
    };

    GradedQuiz {
        score,
        points: earned,
        total_points: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i32, points: i32, correct: &[i32]) -> QuestionSpec {
        QuestionSpec {
            id,
            points,
            correct: correct.iter().copied().collect(),
            auto_graded: true,
        }
    }

    #[test]
    fn partial_credit_is_never_awarded() {
        let questions = vec![question(1, 1, &[10]), question(2, 2, &[20, 21])];
        let answers = HashMap::from([
            (1, Answer::Selected(10)),
            (2, Answer::SelectedMany(vec![20])),
        ]);

        let graded = grade(&questions, &answers);
        assert_eq!(graded.points, 1);
        assert_eq!(graded.total_points, 3);
        assert!((graded.score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn multi_answer_requires_exact_set_equality() {
        let questions = vec![question(1, 5, &[1, 2])];

        let exact = HashMap::from([(1, Answer::SelectedMany(vec![2, 1]))]);
        assert_eq!(grade(&questions, &exact).points, 5);

        let superset = HashMap::from([(1, Answer::SelectedMany(vec![1, 2, 3]))]);
        assert_eq!(grade(&questions, &superset).points, 0);

        let subset = HashMap::from([(1, Answer::SelectedMany(vec![1]))]);
        assert_eq!(grade(&questions, &subset).points, 0);
    }

    #[test]
    fn single_answer_uses_membership() {
        // A lone answer naming one of several correct options still scores.
        let questions = vec![question(1, 2, &[1, 2])];
        let answers = HashMap::from([(1, Answer::Selected(2))]);
        assert_eq!(grade(&questions, &answers).points, 2);

        let wrong = HashMap::from([(1, Answer::Selected(9))]);
        assert_eq!(grade(&questions, &wrong).points, 0);
    }

    #[test]
    fn unanswered_questions_still_count_toward_total() {
        let questions = vec![question(1, 1, &[10]), question(2, 4, &[20])];
        let answers = HashMap::from([(1, Answer::Selected(10))]);

        let graded = grade(&questions, &answers);
        assert_eq!(graded.points, 1);
        assert_eq!(graded.total_points, 5);
        assert!((graded.score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn free_text_questions_earn_zero() {
        let essay = QuestionSpec {
            id: 1,
            points: 10,
            correct: BTreeSet::new(),
            auto_graded: false,
        };
        let answers = HashMap::from([(1, Answer::Text("a thoughtful essay".to_owned()))]);

        let graded = grade(&[essay], &answers);
        assert_eq!(graded.points, 0);
        assert_eq!(graded.total_points, 10);
        assert_eq!(graded.score, 0.0);
    }

    #[test]
    fn empty_quiz_scores_zero_not_nan() {
        let graded = grade(&[], &HashMap::new());
        assert_eq!(graded.score, 0.0);
        assert_eq!(graded.total_points, 0);
    }

    #[test]
    fn regrading_is_idempotent() {
        let questions = vec![question(1, 3, &[7]), question(2, 3, &[8, 9])];
        let answers = HashMap::from([
            (1, Answer::Selected(7)),
            (2, Answer::SelectedMany(vec![9, 8])),
        ]);

        let first = grade(&questions, &answers);
        let second = grade(&questions, &answers);
        assert_eq!(first, second);
        assert_eq!(first.score, 100.0);
    }
}
