#![allow(dead_code)]

use aula_db::course::mutation::NewCourse;
use aula_entity::user::Role;
use aula_entity::{course, student, teacher, user};
use sea_orm::DbConn;

pub async fn create_student(db: &DbConn, email: &str, card: &str) -> (user::Model, student::Model) {
    let user = aula_db::user::Mutation::create(db, email, "hash", Role::Student, "Stu", "Dent")
        .await
        .unwrap();
    let student = aula_db::student::Mutation::create(db, user.id, card, 1).await.unwrap();
    (user, student)
}

pub async fn create_teacher(db: &DbConn, email: &str) -> (user::Model, teacher::Model) {
    let user = aula_db::user::Mutation::create(db, email, "hash", Role::Teacher, "Tea", "Cher")
        .await
        .unwrap();
    let teacher = aula_db::teacher::Mutation::create(db, user.id, "mathematics", None, None, None)
        .await
        .unwrap();
    (user, teacher)
}

pub async fn create_course(db: &DbConn, teacher_id: i32, title: &str) -> course::Model {
    aula_db::course::Mutation::create(
        db,
        teacher_id,
        NewCourse {
            title: title.to_owned(),
            description: Some("a course".to_owned()),
            category: Some("science".to_owned()),
            is_public: true,
            requires_key: false,
            enrollment_key: None,
            max_enrollments: 0,
        },
    )
    .await
    .unwrap()
}
