use aula_entity::quiz::quiz::{ActiveModel, Entity, Model, QuizType};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub quiz_type: QuizType,
    pub time_limit: i32,
    pub passing_score: i32,
    pub is_published: bool,
}

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, course_id: i32, new: NewQuiz) -> Result<Model, DbErr> {
        let quiz = ActiveModel {
            course_id: Set(course_id),
            title: Set(new.title),
            description: Set(new.description),
            quiz_type: Set(new.quiz_type),
            time_limit: Set(new.time_limit),
            passing_score: Set(new.passing_score),
            is_published: Set(new.is_published),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(quiz).exec_with_returning(conn).await
    }
}
