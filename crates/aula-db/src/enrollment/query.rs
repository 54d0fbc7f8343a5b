use aula_entity::course;
use aula_entity::enrollment::{Column, Entity, Model, Status};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

pub struct Query;

impl Query {
    pub async fn find_for_pair<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        course_id: i32,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(conn)
            .await
    }

    pub async fn count_active_for_course<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(Status::Active))
            .count(conn)
            .await
    }

    /// The student's enrollments together with the course rows.
    pub async fn list_for_student<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Vec<(Model, Option<course::Model>)>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .find_also_related(course::Entity)
            .order_by_desc(Column::EnrollmentDate)
            .all(conn)
            .await
    }

    pub async fn active_course_ids_for_student<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Vec<i32>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(Status::Active))
            .select_only()
            .column(Column::CourseId)
            .into_tuple()
            .all(conn)
            .await
    }

    /// True if any enrollment row exists for the pair, whatever its status.
    pub async fn is_enrolled<C: ConnectionTrait>(conn: &C, student_id: i32, course_id: i32) -> Result<bool, DbErr> {
        Ok(Self::find_for_pair(conn, student_id, course_id).await?.is_some())
    }
}
