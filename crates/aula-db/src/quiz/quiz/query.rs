use aula_entity::course;
use aula_entity::quiz::quiz::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait};

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    /// The quiz only if its course belongs to the given teacher.
    pub async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        quiz_id: i32,
        teacher_id: i32,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(quiz_id)
            .join(JoinType::InnerJoin, aula_entity::quiz::quiz::Relation::Course.def())
            .filter(course::Column::TeacherId.eq(teacher_id))
            .one(conn)
            .await
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
        select.order_by_desc(Column::CreatedAt).all(conn).await
    }
}
