use aula_entity::completed_resource;
use aula_entity::course_material::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn list_by_course<C: ConnectionTrait>(
        conn: &C,
        course_id: i32,
        published_only: bool,
    ) -> Result<Vec<Model>, DbErr> {
        let mut select = Entity::find().filter(Column::CourseId.eq(course_id));
        if published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }
        select.order_by_asc(Column::OrderIndex).all(conn).await
    }

    pub async fn is_completed<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        material_id: i32,
    ) -> Result<bool, DbErr> {
        let found = completed_resource::Entity::find()
            .filter(completed_resource::Column::StudentId.eq(student_id))
            .filter(completed_resource::Column::MaterialId.eq(material_id))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }
}
