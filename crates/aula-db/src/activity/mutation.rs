use aula_entity::activity_log::{ActiveModel, Entity, Kind};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;

pub struct Mutation;

impl Mutation {
    /// Appends to the audit trail. Failures are logged and swallowed — an
    /// audit miss must never fail the request it describes.
    pub async fn log<C: ConnectionTrait>(conn: &C, user_id: i32, kind: Kind, description: &str) {
        let entry = ActiveModel {
            user_id: Set(user_id),
            kind: Set(kind),
            description: Set(description.to_owned()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        if let Err(error) = Entity::insert(entry).exec(conn).await {
            tracing::warn!(error = &error as &dyn Error, %user_id, "failed to append activity log");
        }
    }
}
