use aula_entity::forum::like;
use aula_entity::forum::post::{ActiveModel, Entity, Model};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        topic_id: i32,
        user_id: i32,
        content: &str,
        parent_id: Option<i32>,
    ) -> Result<Model, DbErr> {
        let post = ActiveModel {
            topic_id: Set(topic_id),
            user_id: Set(user_id),
            content: Set(content.to_owned()),
            parent_id: Set(parent_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(post).exec_with_returning(conn).await
    }

    /// Records a like; the caller rejects duplicates beforehand and the
    /// unique index backs that check up.
    pub async fn like<C: ConnectionTrait>(conn: &C, post_id: i32, user_id: i32) -> Result<like::Model, DbErr> {
        let record = like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            ..Default::default()
        };
        like::Entity::insert(record).exec_with_returning(conn).await
    }
}
