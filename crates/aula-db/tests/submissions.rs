mod common;

use crate::common::fixtures::{create_course, create_student, create_teacher};
use crate::common::setup_schema;
use aula_db::assignment::mutation::NewAssignment;
use aula_db::submission;
use aula_entity::assignment::submission::Status;
use sea_orm::{Database, EntityTrait};
use test_log::test;

async fn assignment_fixture(db: &sea_orm::DbConn) -> (i32, i32) {
    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = create_course(db, teacher.id, "Algebra").await;
    let assignment = aula_db::assignment::Mutation::create(
        db,
        course.id,
        NewAssignment {
            title: "Homework 1".to_owned(),
            description: None,
            due_date: None,
            max_points: 100,
            allow_late_submission: true,
            is_published: true,
        },
    )
    .await
    .unwrap();
    let (_, student) = create_student(db, "s@example.com", "CARD-1").await;
    (student.id, assignment.id)
}

#[test(tokio::test)]
async fn resubmission_overwrites_in_place() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (student_id, assignment_id) = assignment_fixture(db).await;

    let first = submission::Mutation::upsert(
        db,
        student_id,
        assignment_id,
        Some("first draft".to_owned()),
        None,
        false,
    )
    .await
    .unwrap();

    let second = submission::Mutation::upsert(
        db,
        student_id,
        assignment_id,
        Some("final version".to_owned()),
        Some("uploads/final.pdf".to_owned()),
        false,
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.submission_text.as_deref(), Some("final version"));
    assert_eq!(second.file_path.as_deref(), Some("uploads/final.pdf"));
    assert!(second.submitted_at >= first.submitted_at);

    let rows = aula_entity::assignment::submission::Entity::find().all(db).await.unwrap();
    assert_eq!(rows.len(), 1, "the pair owns exactly one row");
}

#[test(tokio::test)]
async fn resubmission_without_file_keeps_the_old_one() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (student_id, assignment_id) = assignment_fixture(db).await;

    submission::Mutation::upsert(
        db,
        student_id,
        assignment_id,
        Some("with file".to_owned()),
        Some("uploads/v1.pdf".to_owned()),
        false,
    )
    .await
    .unwrap();

    let updated = submission::Mutation::upsert(
        db,
        student_id,
        assignment_id,
        Some("text only".to_owned()),
        None,
        false,
    )
    .await
    .unwrap();
    assert_eq!(updated.file_path.as_deref(), Some("uploads/v1.pdf"));
}

#[test(tokio::test)]
async fn grading_sets_status_and_timestamp() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (student_id, assignment_id) = assignment_fixture(db).await;

    let row = submission::Mutation::upsert(db, student_id, assignment_id, Some("done".to_owned()), None, true)
        .await
        .unwrap();
    assert_eq!(row.status, Status::Submitted);
    assert!(row.is_late);

    let graded = submission::Mutation::set_grade(db, row.id, 87.5).await.unwrap();
    assert_eq!(graded.status, Status::Graded);
    assert_eq!(graded.grade, Some(87.5));
    assert!(graded.graded_at.is_some());
}

#[test(tokio::test)]
async fn resubmitting_after_a_grade_reopens_the_submission() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();
    let (student_id, assignment_id) = assignment_fixture(db).await;

    let row = submission::Mutation::upsert(db, student_id, assignment_id, Some("v1".to_owned()), None, false)
        .await
        .unwrap();
    submission::Mutation::set_grade(db, row.id, 40.0).await.unwrap();

    let reopened = submission::Mutation::upsert(db, student_id, assignment_id, Some("v2".to_owned()), None, false)
        .await
        .unwrap();
    assert_eq!(reopened.status, Status::Submitted);
    // The old grade value survives until the teacher regrades.
    assert_eq!(reopened.grade, Some(40.0));
}
