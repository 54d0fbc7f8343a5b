use aula_entity::forum::post;
use aula_entity::forum::topic::{Column, Entity, Model};
use aula_entity::user;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;
use std::collections::HashMap;

pub struct Query;

/// A topic with its author's name and reply count, pinned rows first.
#[derive(Debug, FromQueryResult, Serialize)]
pub struct TopicRow {
    pub id: i32,
    pub course_id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: chrono::NaiveDateTime,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(skip)]
    pub post_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct PostCount {
    topic_id: i32,
    count: i64,
}

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn list<C: ConnectionTrait>(conn: &C, course_id: Option<i32>) -> Result<Vec<TopicRow>, DbErr> {
        let mut select = Entity::find()
            .join(JoinType::InnerJoin, aula_entity::forum::topic::Relation::User.def())
            .select_only()
            .columns([
                Column::Id,
                Column::CourseId,
                Column::UserId,
                Column::Title,
                Column::Content,
                Column::IsPinned,
                Column::CreatedAt,
            ])
            .columns([user::Column::FirstName, user::Column::LastName]);
        if let Some(course_id) = course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        let mut rows = select
            .order_by_desc(Column::IsPinned)
            .order_by_desc(Column::CreatedAt)
            .into_model::<TopicRow>()
            .all(conn)
            .await?;

        if rows.is_empty() {
            return Ok(rows);
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let counts: HashMap<i32, i64> = post::Entity::find()
            .select_only()
            .column(post::Column::TopicId)
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .filter(post::Column::TopicId.is_in(ids))
            .group_by(post::Column::TopicId)
            .into_model::<PostCount>()
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.topic_id, row.count))
            .collect();
        for row in &mut rows {
            row.post_count = counts.get(&row.id).copied().unwrap_or_default();
        }
        Ok(rows)
    }
}
