use aula_entity::quiz::option;
use aula_entity::quiz::question::{ActiveModel, Entity, Model, QuestionType};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub explanation: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

impl Mutation {
    /// Inserts a question and its options. The caller supplies a
    /// transaction; a failure on any option must roll back the question row.
    pub async fn create_with_options<C: ConnectionTrait>(
        conn: &C,
        quiz_id: i32,
        new: NewQuestion,
        options: Vec<NewOption>,
    ) -> Result<Model, DbErr> {
        let question = ActiveModel {
            quiz_id: Set(quiz_id),
            question: Set(new.question),
            question_type: Set(new.question_type),
            points: Set(new.points),
            explanation: Set(new.explanation),
            order_index: Set(new.order_index),
            ..Default::default()
        };
        let question = Entity::insert(question).exec_with_returning(conn).await?;

        for opt in options {
            let record = option::ActiveModel {
                question_id: Set(question.id),
                option_text: Set(opt.text),
                is_correct: Set(opt.is_correct),
                ..Default::default()
            };
            option::Entity::insert(record).exec(conn).await?;
        }

        Ok(question)
    }

    /// Removes a question together with its options.
    pub async fn delete_with_options<C: ConnectionTrait>(conn: &C, question_id: i32) -> Result<(), DbErr> {
        option::Entity::delete_many()
            .filter(option::Column::QuestionId.eq(question_id))
            .exec(conn)
            .await?;
        Entity::delete_by_id(question_id).exec(conn).await?;
        Ok(())
    }
}
