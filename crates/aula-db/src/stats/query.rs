use aula_entity::user::Role;
use aula_entity::{course, enrollment, user};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait,
};
use serde::Serialize;

pub struct Query;

/// Site-wide counts for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct SiteCounts {
    pub students: u64,
    pub teachers: u64,
    pub admins: u64,
    pub courses: u64,
    pub active_enrollments: u64,
}

impl Query {
    pub async fn site_counts<C: ConnectionTrait>(conn: &C) -> Result<SiteCounts, DbErr> {
        let students = user::Entity::find()
            .filter(user::Column::Role.eq(Role::Student))
            .count(conn)
            .await?;
        let teachers = user::Entity::find()
            .filter(user::Column::Role.eq(Role::Teacher))
            .count(conn)
            .await?;
        let admins = user::Entity::find()
            .filter(user::Column::Role.eq(Role::Admin))
            .count(conn)
            .await?;
        let courses = course::Entity::find().count(conn).await?;
        let active_enrollments = enrollment::Entity::find()
            .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
            .count(conn)
            .await?;
        Ok(SiteCounts {
            students,
            teachers,
            admins,
            courses,
            active_enrollments,
        })
    }

    /// Distinct students actively enrolled across the teacher's courses.
    pub async fn distinct_students_of_teacher<C: ConnectionTrait>(conn: &C, teacher_id: i32) -> Result<u64, DbErr> {
        let ids: Vec<i32> = enrollment::Entity::find()
            .join(JoinType::InnerJoin, enrollment::Relation::Course.def())
            .filter(course::Column::TeacherId.eq(teacher_id))
            .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
            .select_only()
            .column(enrollment::Column::StudentId)
            .distinct()
            .into_tuple()
            .all(conn)
            .await?;
        Ok(ids.len() as u64)
    }

    pub async fn course_count_of_teacher<C: ConnectionTrait>(conn: &C, teacher_id: i32) -> Result<u64, DbErr> {
        course::Entity::find()
            .filter(course::Column::TeacherId.eq(teacher_id))
            .count(conn)
            .await
    }
}
