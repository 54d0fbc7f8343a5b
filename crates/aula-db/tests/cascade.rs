mod common;

use crate::common::fixtures::{create_course, create_student, create_teacher};
use crate::common::setup_schema;
use aula_db::assignment::mutation::NewAssignment;
use aula_db::material::mutation::NewMaterial;
use aula_db::quiz::question::mutation::{NewOption, NewQuestion};
use aula_db::quiz::quiz::mutation::NewQuiz;
use aula_db::{cascade, enrollment, submission};
use aula_entity::quiz::question::QuestionType;
use aula_entity::quiz::quiz::QuizType;
use sea_orm::{Database, DbConn, EntityTrait, PaginatorTrait, TransactionTrait};
use test_log::test;

/// A course with one of everything hanging off it.
async fn populated_course(db: &DbConn, teacher_id: i32, student_id: i32, user_id: i32) -> i32 {
    let course = create_course(db, teacher_id, "Doomed course").await;

    let assignment = aula_db::assignment::Mutation::create(
        db,
        course.id,
        NewAssignment {
            title: "HW".to_owned(),
            description: None,
            due_date: None,
            max_points: 10,
            allow_late_submission: true,
            is_published: true,
        },
    )
    .await
    .unwrap();
    submission::Mutation::upsert(db, student_id, assignment.id, Some("answer".to_owned()), None, false)
        .await
        .unwrap();
    aula_db::assignment::Mutation::add_file(db, assignment.id, teacher_id, "brief.pdf", "uploads/brief.pdf", 42)
        .await
        .unwrap();

    let quiz = aula_db::quiz::quiz::Mutation::create(
        db,
        course.id,
        NewQuiz {
            title: "Quiz".to_owned(),
            description: None,
            quiz_type: QuizType::Practice,
            time_limit: 0,
            passing_score: 60,
            is_published: true,
        },
    )
    .await
    .unwrap();
    aula_db::quiz::question::Mutation::create_with_options(
        db,
        quiz.id,
        NewQuestion {
            question: "2+2?".to_owned(),
            question_type: QuestionType::MultipleChoice,
            points: 1,
            explanation: None,
            order_index: 0,
        },
        vec![
            NewOption { text: "4".to_owned(), is_correct: true },
            NewOption { text: "5".to_owned(), is_correct: false },
        ],
    )
    .await
    .unwrap();
    aula_db::quiz::submission::Mutation::create(db, student_id, quiz.id, "{}".to_owned(), 0.0, 10)
        .await
        .unwrap();

    let material = aula_db::material::Mutation::create(
        db,
        course.id,
        NewMaterial {
            title: "Slides".to_owned(),
            description: None,
            file_type: Some("pdf".to_owned()),
            file_path: "uploads/slides.pdf".to_owned(),
            file_size: 7,
            order_index: 0,
            is_published: true,
        },
    )
    .await
    .unwrap();
    aula_db::material::Mutation::mark_completed(db, student_id, material.id)
        .await
        .unwrap();

    let topic = aula_db::forum::topic::Mutation::create(db, course.id, user_id, "Welcome", "hello")
        .await
        .unwrap();
    let post = aula_db::forum::post::Mutation::create(db, topic.id, user_id, "first", None)
        .await
        .unwrap();
    aula_db::forum::post::Mutation::like(db, post.id, user_id).await.unwrap();

    enrollment::Mutation::create_active(db, student_id, course.id, None)
        .await
        .unwrap();

    course.id
}

async fn assert_no_orphans(db: &DbConn) {
    assert_eq!(aula_entity::assignment::submission::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::assignment::file::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::assignment::assignment::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::option::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::question::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::submission::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::quiz::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::completed_resource::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::course_material::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::forum::like::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::forum::post::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::forum::topic::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::enrollment::Entity::find().count(db).await.unwrap(), 0);
}

#[test(tokio::test)]
async fn deleting_a_course_leaves_no_dependent_rows() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let (student_user, student) = create_student(db, "s@example.com", "CARD-1").await;
    let course_id = populated_course(db, teacher.id, student.id, student_user.id).await;

    let txn = db.begin().await.unwrap();
    cascade::delete_course(&txn, course_id).await.unwrap();
    txn.commit().await.unwrap();

    assert_no_orphans(db).await;
    assert_eq!(aula_entity::course::Entity::find().count(db).await.unwrap(), 0);
    // The owning teacher and the student survive a course deletion.
    assert_eq!(aula_entity::teacher::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(aula_entity::student::Entity::find().count(db).await.unwrap(), 1);
}

#[test(tokio::test)]
async fn deleting_a_teacher_removes_every_owned_course_and_the_user() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (teacher_user, teacher) = create_teacher(db, "t@example.com").await;
    let (student_user, student) = create_student(db, "s@example.com", "CARD-1").await;
    populated_course(db, teacher.id, student.id, student_user.id).await;
    create_course(db, teacher.id, "Second course").await;

    let txn = db.begin().await.unwrap();
    let removed = cascade::delete_teacher(&txn, teacher.id, teacher_user.id).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(aula_entity::course::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::teacher::Entity::find().count(db).await.unwrap(), 0);
    let users = aula_entity::user::Entity::find().all(db).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, student_user.id);
}

#[test(tokio::test)]
async fn deleting_a_student_removes_its_work_but_not_the_course() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let (student_user, student) = create_student(db, "s@example.com", "CARD-1").await;
    let course_id = populated_course(db, teacher.id, student.id, student_user.id).await;

    let txn = db.begin().await.unwrap();
    cascade::delete_student(&txn, student.id, student_user.id).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(aula_entity::student::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::assignment::submission::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::quiz::submission::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::enrollment::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(aula_entity::forum::post::Entity::find().count(db).await.unwrap(), 0);
    // Course content outlives its students.
    assert_eq!(
        aula_entity::course::Entity::find_by_id(course_id).one(db).await.unwrap().is_some(),
        true
    );
    assert_eq!(aula_entity::quiz::quiz::Entity::find().count(db).await.unwrap(), 1);
}

#[test(tokio::test)]
async fn a_failed_cascade_rolls_back_cleanly() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let (student_user, student) = create_student(db, "s@example.com", "CARD-1").await;
    let course_id = populated_course(db, teacher.id, student.id, student_user.id).await;

    let before = aula_entity::forum::post::Entity::find().count(db).await.unwrap();

    // Abandon the transaction midway; nothing may stick.
    let txn = db.begin().await.unwrap();
    cascade::delete_course(&txn, course_id).await.unwrap();
    txn.rollback().await.unwrap();

    assert_eq!(aula_entity::course::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(aula_entity::forum::post::Entity::find().count(db).await.unwrap(), before);
}
