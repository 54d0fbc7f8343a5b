use aula_entity::student::{Column, Entity, Model};
use aula_entity::user;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;

pub struct Query;

/// A student joined with its identity row, for admin listings.
#[derive(Debug, FromQueryResult, Serialize)]
pub struct StudentRow {
    pub id: i32,
    pub user_id: i32,
    pub student_card: String,
    pub year: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl Query {
    pub async fn find_by_user_id<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::UserId.eq(user_id)).one(conn).await
    }

    pub async fn find_by_card<C: ConnectionTrait>(conn: &C, student_card: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::StudentCard.eq(student_card)).one(conn).await
    }

    pub async fn find_with_user<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<(Model, user::Model)>, DbErr> {
        let pair = Entity::find_by_id(id).find_also_related(user::Entity).one(conn).await?;
        Ok(pair.and_then(|(student, user)| user.map(|user| (student, user))))
    }

    pub async fn list_with_identity<C: ConnectionTrait>(conn: &C) -> Result<Vec<StudentRow>, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, aula_entity::student::Relation::User.def())
            .select_only()
            .columns([Column::Id, Column::UserId, Column::StudentCard, Column::Year])
            .columns([
                user::Column::Email,
                user::Column::FirstName,
                user::Column::LastName,
                user::Column::IsActive,
            ])
            .order_by_asc(user::Column::LastName)
            .into_model::<StudentRow>()
            .all(conn)
            .await
    }
}
