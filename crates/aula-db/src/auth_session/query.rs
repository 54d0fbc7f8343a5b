use aula_entity::auth_session::{Column, Entity};
use aula_entity::user;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

pub struct Query;

impl Query {
    /// Resolves a bearer token to its user. Expired sessions and deactivated
    /// accounts resolve to nothing.
    pub async fn find_user_by_token<C: ConnectionTrait>(
        conn: &C,
        token: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        let now = Utc::now().naive_utc();
        let pair = Entity::find()
            .filter(Column::Token.eq(token))
            .filter(Column::ExpiresAt.gt(now))
            .find_also_related(user::Entity)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn std::error::Error, "error resolving session token");
            })?;
        Ok(pair.and_then(|(_, user)| user).filter(|user| user.is_active))
    }
}
