use aula_entity::forum::like;
use aula_entity::forum::post::{Column, Entity, Model};
use aula_entity::user;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;
use std::collections::HashMap;

pub struct Query;

/// A post with its author's name and like count, oldest first.
#[derive(Debug, FromQueryResult, Serialize)]
pub struct PostRow {
    pub id: i32,
    pub topic_id: i32,
    pub user_id: i32,
    pub content: String,
    pub parent_id: Option<i32>,
    pub created_at: chrono::NaiveDateTime,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(skip)]
    pub like_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct LikeCount {
    post_id: i32,
    count: i64,
}

fn post_select() -> sea_orm::Select<Entity> {
    Entity::find()
        .join(JoinType::InnerJoin, aula_entity::forum::post::Relation::User.def())
        .select_only()
        .columns([
            Column::Id,
            Column::TopicId,
            Column::UserId,
            Column::Content,
            Column::ParentId,
            Column::CreatedAt,
        ])
        .columns([user::Column::FirstName, user::Column::LastName])
}

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn list_for_topic<C: ConnectionTrait>(conn: &C, topic_id: i32) -> Result<Vec<PostRow>, DbErr> {
        let mut rows = post_select()
            .filter(Column::TopicId.eq(topic_id))
            .order_by_asc(Column::CreatedAt)
            .into_model::<PostRow>()
            .all(conn)
            .await?;
        Self::merge_like_counts(conn, &mut rows).await?;
        Ok(rows)
    }

    /// Direct replies to a post.
    pub async fn list_replies<C: ConnectionTrait>(conn: &C, post_id: i32) -> Result<Vec<PostRow>, DbErr> {
        let mut rows = post_select()
            .filter(Column::ParentId.eq(post_id))
            .order_by_asc(Column::CreatedAt)
            .into_model::<PostRow>()
            .all(conn)
            .await?;
        Self::merge_like_counts(conn, &mut rows).await?;
        Ok(rows)
    }

    pub async fn has_liked<C: ConnectionTrait>(conn: &C, post_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let found = like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }

    async fn merge_like_counts<C: ConnectionTrait>(conn: &C, rows: &mut [PostRow]) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let counts: HashMap<i32, i64> = like::Entity::find()
            .select_only()
            .column(like::Column::PostId)
            .column_as(Expr::col(like::Column::Id).count(), "count")
            .filter(like::Column::PostId.is_in(ids))
            .group_by(like::Column::PostId)
            .into_model::<LikeCount>()
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.post_id, row.count))
            .collect();
        for row in rows {
            row.like_count = counts.get(&row.id).copied().unwrap_or_default();
        }
        Ok(())
    }
}
