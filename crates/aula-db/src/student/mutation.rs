use aula_entity::student::{ActiveModel, Entity, Model};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        student_card: &str,
        year: i32,
    ) -> Result<Model, DbErr> {
        let student = ActiveModel {
            user_id: Set(user_id),
            student_card: Set(student_card.to_owned()),
            year: Set(year),
            enrollment_date: Set(Utc::now().date_naive()),
            ..Default::default()
        };
        Entity::insert(student).exec_with_returning(conn).await
    }
}
