use aula_entity::assignment::assignment::{ActiveModel, Entity, Model};
use aula_entity::assignment::file;
use chrono::{NaiveDateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub max_points: i32,
    pub allow_late_submission: bool,
    pub is_published: bool,
}

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, course_id: i32, new: NewAssignment) -> Result<Model, DbErr> {
        let assignment = ActiveModel {
            course_id: Set(course_id),
            title: Set(new.title),
            description: Set(new.description),
            due_date: Set(new.due_date),
            max_points: Set(new.max_points),
            allow_late_submission: Set(new.allow_late_submission),
            is_published: Set(new.is_published),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(assignment).exec_with_returning(conn).await
    }

    /// Records a teacher-supplied attachment; the bytes live in the blob
    /// store, only the path is kept here.
    pub async fn add_file<C: ConnectionTrait>(
        conn: &C,
        assignment_id: i32,
        teacher_id: i32,
        file_name: &str,
        file_path: &str,
        file_size: i64,
    ) -> Result<file::Model, DbErr> {
        let record = file::ActiveModel {
            assignment_id: Set(assignment_id),
            file_name: Set(file_name.to_owned()),
            file_path: Set(file_path.to_owned()),
            file_size: Set(file_size),
            uploaded_by: Set(teacher_id),
            ..Default::default()
        };
        file::Entity::insert(record).exec_with_returning(conn).await
    }
}
