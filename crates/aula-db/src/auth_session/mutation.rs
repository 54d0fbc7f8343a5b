use aula_entity::auth_session::{ActiveModel, Column, Entity, Model};
use base64::Engine;
use chrono::{Duration, Utc};
use ring::rand::{self, SecureRandom};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

pub struct Mutation;

fn generate_token() -> String {
    let rng = rand::SystemRandom::new();
    let mut bytes = [0u8; 48];
    // getentropy is the only failure path and it does not fail on a modern
    // system.
    rng.fill(&mut bytes).expect("failed to generate random bytes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl Mutation {
    /// Issues a fresh session token for the user.
    pub async fn create<C: ConnectionTrait>(conn: &C, user_id: i32, ttl_seconds: i64) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let session = ActiveModel {
            user_id: Set(user_id),
            token: Set(generate_token()),
            created_at: Set(now),
            expires_at: Set(now + Duration::seconds(ttl_seconds)),
            ..Default::default()
        };
        Entity::insert(session).exec_with_returning(conn).await
    }

    pub async fn delete_by_token<C: ConnectionTrait>(conn: &C, token: &str) -> Result<(), DbErr> {
        Entity::delete_many().filter(Column::Token.eq(token)).exec(conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_long_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(&a).unwrap();
        assert_eq!(decoded.len(), 48);
    }
}
