mod common;

use crate::common::fixtures::{create_course, create_student, create_teacher};
use crate::common::setup_schema;
use aula_core::grading::{self, Answer, QuestionSpec};
use aula_db::quiz::question::mutation::{NewOption, NewQuestion};
use aula_db::quiz::quiz::mutation::NewQuiz;
use aula_entity::quiz::question::QuestionType;
use aula_entity::quiz::quiz::QuizType;
use sea_orm::{Database, DbConn, EntityTrait, PaginatorTrait};
use std::collections::HashMap;
use test_log::test;

async fn quiz_fixture(db: &DbConn) -> (i32, i32) {
    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = create_course(db, teacher.id, "Algebra").await;
    let quiz = aula_db::quiz::quiz::Mutation::create(
        db,
        course.id,
        NewQuiz {
            title: "Checkpoint".to_owned(),
            description: None,
            quiz_type: QuizType::Graded,
            time_limit: 30,
            passing_score: 60,
            is_published: true,
        },
    )
    .await
    .unwrap();
    (course.id, quiz.id)
}

async fn add_question(db: &DbConn, quiz_id: i32, points: i32, options: Vec<NewOption>) -> i32 {
    aula_db::quiz::question::Mutation::create_with_options(
        db,
        quiz_id,
        NewQuestion {
            question: format!("worth {points}"),
            question_type: QuestionType::MultipleChoice,
            points,
            explanation: None,
            order_index: 0,
        },
        options,
    )
    .await
    .unwrap()
    .id
}

#[test(tokio::test)]
async fn question_creation_stores_its_options() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (_, quiz_id) = quiz_fixture(db).await;

    add_question(
        db,
        quiz_id,
        1,
        vec![
            NewOption { text: "right".to_owned(), is_correct: true },
            NewOption { text: "wrong".to_owned(), is_correct: false },
        ],
    )
    .await;

    let questions = aula_db::quiz::question::Query::list_by_quiz_with_options(db, quiz_id)
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].1.len(), 2);
}

#[test(tokio::test)]
async fn the_grading_key_only_contains_correct_options() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (_, quiz_id) = quiz_fixture(db).await;

    let q1 = add_question(
        db,
        quiz_id,
        1,
        vec![
            NewOption { text: "a".to_owned(), is_correct: true },
            NewOption { text: "b".to_owned(), is_correct: false },
        ],
    )
    .await;
    let q2 = add_question(
        db,
        quiz_id,
        2,
        vec![
            NewOption { text: "c".to_owned(), is_correct: true },
            NewOption { text: "d".to_owned(), is_correct: true },
        ],
    )
    .await;

    let key = aula_db::quiz::question::Query::correct_sets_by_quiz(db, quiz_id)
        .await
        .unwrap();
    assert_eq!(key.len(), 2);
    assert_eq!(key[&q1].len(), 1);
    assert_eq!(key[&q2].len(), 2);
}

/// Two questions worth 1 and 2 points, first answered right, second wrong,
/// scores 100 * 1/3.
#[test(tokio::test)]
async fn grading_a_stored_quiz_matches_the_expected_percentage() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (_, quiz_id) = quiz_fixture(db).await;

    let q1 = add_question(
        db,
        quiz_id,
        1,
        vec![
            NewOption { text: "yes".to_owned(), is_correct: true },
            NewOption { text: "no".to_owned(), is_correct: false },
        ],
    )
    .await;
    let q2 = add_question(
        db,
        quiz_id,
        2,
        vec![
            NewOption { text: "yes".to_owned(), is_correct: true },
            NewOption { text: "no".to_owned(), is_correct: false },
        ],
    )
    .await;

    let questions = aula_db::quiz::question::Query::list_by_quiz(db, quiz_id).await.unwrap();
    let key = aula_db::quiz::question::Query::correct_sets_by_quiz(db, quiz_id)
        .await
        .unwrap();
    let specs: Vec<QuestionSpec> = questions
        .iter()
        .map(|q| QuestionSpec {
            id: q.id,
            points: q.points,
            correct: key.get(&q.id).cloned().unwrap_or_default(),
            auto_graded: q.question_type.auto_graded(),
        })
        .collect();

    let right = key[&q1].iter().next().copied().unwrap();
    let wrong_option = aula_entity::quiz::option::Entity::find()
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.question_id == q2 && !o.is_correct)
        .unwrap();

    let answers = HashMap::from([
        (q1, Answer::Selected(right)),
        (q2, Answer::Selected(wrong_option.id)),
    ]);

    let graded = grading::grade(&specs, &answers);
    assert_eq!(graded.points, 1);
    assert_eq!(graded.total_points, 3);
    assert!((graded.score - 100.0 / 3.0).abs() < 1e-9);

    // Persist and read back the attempt.
    let stored = aula_db::quiz::submission::Mutation::create(
        db,
        {
            let (_, student) = create_student(db, "s@example.com", "CARD-1").await;
            student.id
        },
        quiz_id,
        serde_json::to_string(&HashMap::from([(q1, right)])).unwrap(),
        graded.score,
        45,
    )
    .await
    .unwrap();
    assert!((stored.score - graded.score).abs() < 1e-9);
}

#[test(tokio::test)]
async fn deleting_a_question_takes_its_options_along() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (_, quiz_id) = quiz_fixture(db).await;

    let question_id = add_question(
        db,
        quiz_id,
        1,
        vec![NewOption { text: "only".to_owned(), is_correct: true }],
    )
    .await;

    aula_db::quiz::question::Mutation::delete_with_options(db, question_id)
        .await
        .unwrap();
    assert_eq!(aula_entity::quiz::question::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::option::Entity::find().count(db).await.unwrap(), 0);
}

#[test(tokio::test)]
async fn average_quiz_score_covers_all_attempts() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (_, quiz_id) = quiz_fixture(db).await;
    let (_, student) = create_student(db, "s@example.com", "CARD-1").await;

    aula_db::quiz::submission::Mutation::create(db, student.id, quiz_id, "{}".to_owned(), 40.0, 10)
        .await
        .unwrap();
    aula_db::quiz::submission::Mutation::create(db, student.id, quiz_id, "{}".to_owned(), 60.0, 10)
        .await
        .unwrap();

    let average = aula_db::quiz::submission::Query::average_score_for_student(db, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!((average - 50.0).abs() < 1e-9);

    let (_, other) = create_student(db, "o@example.com", "CARD-2").await;
    assert!(
        aula_db::quiz::submission::Query::average_score_for_student(db, other.id)
            .await
            .unwrap()
            .is_none()
    );
}
