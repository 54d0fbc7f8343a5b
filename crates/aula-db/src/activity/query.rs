use aula_entity::activity_log::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

pub struct Query;

impl Query {
    pub async fn recent_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(conn)
            .await
    }
}
