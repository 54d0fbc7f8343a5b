mod common;

use crate::common::fixtures::{create_course, create_student, create_teacher};
use crate::common::setup_schema;
use aula_db::course::query::CatalogFilter;
use aula_db::course::{self, mutation::NewCourse};
use aula_db::enrollment;
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn pagination_splits_fifteen_rows_into_ten_and_five() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    for i in 0..15 {
        create_course(db, teacher.id, &format!("Course {i}")).await;
    }

    let filter = CatalogFilter::default();
    let (page1, total) = course::Query::catalog_page(db, &filter, 1, 10).await.unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(total, 15);

    let (page2, total) = course::Query::catalog_page(db, &filter, 2, 10).await.unwrap();
    assert_eq!(page2.len(), 5);
    assert_eq!(total, 15);
    assert_eq!(total.div_ceil(10), 2);
}

#[test(tokio::test)]
async fn private_courses_never_appear_in_the_catalog() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    create_course(db, teacher.id, "Public one").await;
    course::Mutation::create(
        db,
        teacher.id,
        NewCourse {
            title: "Hidden one".to_owned(),
            description: None,
            category: None,
            is_public: false,
            requires_key: false,
            enrollment_key: None,
            max_enrollments: 0,
        },
    )
    .await
    .unwrap();

    let (rows, total) = course::Query::catalog_page(db, &CatalogFilter::default(), 1, 10)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].title, "Public one");
}

#[test(tokio::test)]
async fn category_and_teacher_filters_compose() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, first) = create_teacher(db, "first@example.com").await;
    let (_, second) = create_teacher(db, "second@example.com").await;
    create_course(db, first.id, "Science A").await; // category "science"
    create_course(db, second.id, "Science B").await;

    let filter = CatalogFilter {
        category: Some("science".to_owned()),
        search: None,
        teacher_id: Some(second.id),
    };
    let (rows, total) = course::Query::catalog_page(db, &filter, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].title, "Science B");

    let none = CatalogFilter {
        category: Some("arts".to_owned()),
        ..Default::default()
    };
    let (_, total) = course::Query::catalog_page(db, &none, 1, 10).await.unwrap();
    assert_eq!(total, 0);
}

#[test(tokio::test)]
async fn search_matches_the_teacher_name_too() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    create_course(db, teacher.id, "Linear algebra").await;

    // Fixture teachers are named "Tea Cher".
    let by_name = course::Query::search(db, "Cher", None).await.unwrap();
    assert_eq!(by_name.len(), 1);

    let by_title = course::Query::search(db, "Linear", None).await.unwrap();
    assert_eq!(by_title.len(), 1);

    let nothing = course::Query::search(db, "no such thing", None).await.unwrap();
    assert!(nothing.is_empty());
}

#[test(tokio::test)]
async fn catalog_rows_carry_active_enrollment_counts() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (_, teacher) = create_teacher(db, "t@example.com").await;
    let course = create_course(db, teacher.id, "Busy course").await;
    for i in 0..3 {
        let (_, student) = create_student(db, &format!("s{i}@example.com"), &format!("CARD-{i}")).await;
        enrollment::Mutation::create_active(db, student.id, course.id, None)
            .await
            .unwrap();
    }

    let (rows, _) = course::Query::catalog_page(db, &CatalogFilter::default(), 1, 10)
        .await
        .unwrap();
    assert_eq!(rows[0].enrollment_count, 3);
    assert_eq!(rows[0].teacher_first_name, "Tea");
}
