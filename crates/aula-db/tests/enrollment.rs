mod common;

use crate::common::fixtures::{create_course, create_student, create_teacher};
use crate::common::setup_schema;
use aula_core::admission::{AdmissionDenied, CourseGate};
use aula_db::course::mutation::NewCourse;
use aula_db::enrollment;
use sea_orm::{Database, EntityTrait};
use test_log::test;

fn gate_of(course: &aula_entity::course::Model) -> CourseGate {
    CourseGate {
        requires_key: course.requires_key,
        enrollment_key: course.enrollment_key.clone(),
        max_enrollments: course.max_enrollments,
    }
}

/// Runs the same admission sequence the enroll handler uses.
async fn try_enroll(
    db: &sea_orm::DbConn,
    student_id: i32,
    course: &aula_entity::course::Model,
    key: Option<&str>,
) -> Result<(), AdmissionDenied> {
    let active = enrollment::Query::count_active_for_course(db, course.id).await.unwrap();
    let already = enrollment::Query::is_enrolled(db, student_id, course.id).await.unwrap();
    gate_of(course).admit(key, active, already)?;
    enrollment::Mutation::create_active(db, student_id, course.id, key.map(str::to_owned))
        .await
        .unwrap();
    Ok(())
}

#[test(tokio::test)]
async fn second_enrollment_for_same_pair_is_rejected() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = create_course(db, teacher.id, "Algebra").await;
    let (_, student) = create_student(db, "s@example.com", "CARD-1").await;

    assert_eq!(try_enroll(db, student.id, &course, None).await, Ok(()));
    assert_eq!(
        try_enroll(db, student.id, &course, None).await,
        Err(AdmissionDenied::AlreadyEnrolled)
    );

    let rows = aula_entity::enrollment::Entity::find().all(db).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[test(tokio::test)]
async fn duplicate_insert_is_blocked_by_the_unique_index() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = create_course(db, teacher.id, "Algebra").await;
    let (_, student) = create_student(db, "s@example.com", "CARD-1").await;

    enrollment::Mutation::create_active(db, student.id, course.id, None)
        .await
        .unwrap();
    // Even without the admission check the store refuses a second row.
    let res = enrollment::Mutation::create_active(db, student.id, course.id, None).await;
    assert!(res.is_err());
}

#[test(tokio::test)]
async fn capacity_admits_exactly_max_enrollments() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = aula_db::course::Mutation::create(
        db,
        teacher.id,
        NewCourse {
            title: "Tiny seminar".to_owned(),
            description: None,
            category: None,
            is_public: true,
            requires_key: false,
            enrollment_key: None,
            max_enrollments: 2,
        },
    )
    .await
    .unwrap();

    for i in 0..2 {
        let (_, student) = create_student(db, &format!("s{i}@example.com"), &format!("CARD-{i}")).await;
        assert_eq!(try_enroll(db, student.id, &course, None).await, Ok(()));
    }

    let (_, third) = create_student(db, "s2@example.com", "CARD-2").await;
    assert_eq!(
        try_enroll(db, third.id, &course, None).await,
        Err(AdmissionDenied::CourseFull)
    );
    assert_eq!(
        enrollment::Query::count_active_for_course(db, course.id).await.unwrap(),
        2
    );
}

#[test(tokio::test)]
async fn keyed_course_needs_the_exact_key() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = aula_db::course::Mutation::create(
        db,
        teacher.id,
        NewCourse {
            title: "Restricted".to_owned(),
            description: None,
            category: None,
            is_public: true,
            requires_key: true,
            enrollment_key: Some("sesame".to_owned()),
            max_enrollments: 0,
        },
    )
    .await
    .unwrap();
    let (_, student) = create_student(db, "s@example.com", "CARD-1").await;

    assert_eq!(
        try_enroll(db, student.id, &course, None).await,
        Err(AdmissionDenied::KeyRequired)
    );
    assert_eq!(
        try_enroll(db, student.id, &course, Some("wrong")).await,
        Err(AdmissionDenied::KeyMismatch)
    );
    assert_eq!(try_enroll(db, student.id, &course, Some("sesame")).await, Ok(()));

    let row = enrollment::Query::find_for_pair(db, student.id, course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.enrollment_key_used.as_deref(), Some("sesame"));
    assert_eq!(row.status, aula_entity::enrollment::Status::Active);
}
