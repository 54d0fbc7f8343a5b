use aula_entity::enrollment::{ActiveModel, Entity, Model, Status};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create_active<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        course_id: i32,
        enrollment_key_used: Option<String>,
    ) -> Result<Model, DbErr> {
        let enrollment = ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            enrollment_key_used: Set(enrollment_key_used),
            status: Set(Status::Active),
            enrollment_date: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(enrollment).exec_with_returning(conn).await
    }
}
