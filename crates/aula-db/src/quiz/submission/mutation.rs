use aula_entity::quiz::submission::{ActiveModel, Entity, Model, Status};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    /// Persists a graded attempt. `answers` is the submitted map serialized
    /// verbatim so a regrade can replay it.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        quiz_id: i32,
        answers: String,
        score: f64,
        time_taken: i32,
    ) -> Result<Model, DbErr> {
        let submission = ActiveModel {
            student_id: Set(student_id),
            quiz_id: Set(quiz_id),
            answers: Set(answers),
            score: Set(score),
            time_taken: Set(time_taken),
            status: Set(Status::Submitted),
            submitted_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(submission).exec_with_returning(conn).await
    }
}
