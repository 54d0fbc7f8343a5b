use aula_entity::forum::topic::{ActiveModel, Entity, Model};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        course_id: i32,
        user_id: i32,
        title: &str,
        content: &str,
    ) -> Result<Model, DbErr> {
        let topic = ActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
            title: Set(title.to_owned()),
            content: Set(content.to_owned()),
            is_pinned: Set(false),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(topic).exec_with_returning(conn).await
    }
}
