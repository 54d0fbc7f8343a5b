use aula_entity::assignment::submission::{ActiveModel, Column, Entity, Model, Status};
use chrono::Utc;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

pub struct Mutation;

impl Mutation {
    /// Upsert for the (student, assignment) pair: a re-submission overwrites
    /// the existing row in place and refreshes `submitted_at`.
    pub async fn upsert<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        assignment_id: i32,
        submission_text: Option<String>,
        file_path: Option<String>,
        is_late: bool,
    ) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let existing = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(conn)
            .await?;

        match existing {
            Some(row) => {
                // A prior grade survives the overwrite; only the status
                // drops back to submitted.
                let update = ActiveModel {
                    id: Unchanged(row.id),
                    submission_text: Set(submission_text),
                    file_path: Set(file_path.or(row.file_path)),
                    status: Set(Status::Submitted),
                    submitted_at: Set(now),
                    is_late: Set(is_late),
                    ..Default::default()
                };
                update.update(conn).await
            }
            None => {
                let insert = ActiveModel {
                    student_id: Set(student_id),
                    assignment_id: Set(assignment_id),
                    submission_text: Set(submission_text),
                    file_path: Set(file_path),
                    status: Set(Status::Submitted),
                    submitted_at: Set(now),
                    is_late: Set(is_late),
                    ..Default::default()
                };
                Entity::insert(insert).exec_with_returning(conn).await
            }
        }
    }

    pub async fn set_grade<C: ConnectionTrait>(conn: &C, submission_id: i32, grade: f64) -> Result<Model, DbErr> {
        let update = ActiveModel {
            id: Unchanged(submission_id),
            grade: Set(Some(grade)),
            status: Set(Status::Graded),
            graded_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };
        update.update(conn).await
    }
}
