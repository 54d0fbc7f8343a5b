use aula_entity::assignment::assignment::{Column, Entity, Model};
use aula_entity::assignment::file;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

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
        select.order_by_asc(Column::DueDate).all(conn).await
    }

    pub async fn count_published_in_courses<C: ConnectionTrait>(
        conn: &C,
        course_ids: &[i32],
    ) -> Result<u64, DbErr> {
        if course_ids.is_empty() {
            return Ok(0);
        }
        Entity::find()
            .filter(Column::CourseId.is_in(course_ids.to_vec()))
            .filter(Column::IsPublished.eq(true))
            .count(conn)
            .await
    }

    pub async fn list_files<C: ConnectionTrait>(conn: &C, assignment_id: i32) -> Result<Vec<file::Model>, DbErr> {
        file::Entity::find()
            .filter(file::Column::AssignmentId.eq(assignment_id))
            .all(conn)
            .await
    }
}
