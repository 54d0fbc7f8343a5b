use aula_entity::user::{ActiveModel, Entity, Model, Role};
use chrono::Utc;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        email: &str,
        password_hash: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> Result<Model, DbErr> {
        let user = ActiveModel {
            email: Set(email.to_owned()),
            password: Set(password_hash.to_owned()),
            role: Set(role),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            is_active: Set(true),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Entity::insert(user).exec_with_returning(conn).await
    }

    pub async fn set_active<C: ConnectionTrait>(conn: &C, user_id: i32, is_active: bool) -> Result<Model, DbErr> {
        let user = ActiveModel {
            id: Unchanged(user_id),
            is_active: Set(is_active),
            ..Default::default()
        };
        user.update(conn).await
    }
}
