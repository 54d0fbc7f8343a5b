use aula_entity::teacher::{Column, Entity, Model};
use aula_entity::user;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;

pub struct Query;

#[derive(Debug, FromQueryResult, Serialize)]
pub struct TeacherRow {
    pub id: i32,
    pub user_id: i32,
    pub specialty: String,
    pub grade: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl Query {
    pub async fn find_by_user_id<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::UserId.eq(user_id)).one(conn).await
    }

    pub async fn find_with_user<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<(Model, user::Model)>, DbErr> {
        let pair = Entity::find_by_id(id).find_also_related(user::Entity).one(conn).await?;
        Ok(pair.and_then(|(teacher, user)| user.map(|user| (teacher, user))))
    }

    pub async fn list_with_identity<C: ConnectionTrait>(conn: &C) -> Result<Vec<TeacherRow>, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, aula_entity::teacher::Relation::User.def())
            .select_only()
            .columns([Column::Id, Column::UserId, Column::Specialty, Column::Grade])
            .columns([
                user::Column::Email,
                user::Column::FirstName,
                user::Column::LastName,
                user::Column::IsActive,
            ])
            .order_by_asc(user::Column::LastName)
            .into_model::<TeacherRow>()
            .all(conn)
            .await
    }
}
