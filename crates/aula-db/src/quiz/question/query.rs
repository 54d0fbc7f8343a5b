use aula_entity::quiz::option;
use aula_entity::quiz::question::{Column, Entity, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::collections::{BTreeSet, HashMap};

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn list_by_quiz<C: ConnectionTrait>(conn: &C, quiz_id: i32) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::QuizId.eq(quiz_id))
            .order_by_asc(Column::OrderIndex)
            .all(conn)
            .await
    }

    /// Questions with their options, in display order.
    pub async fn list_by_quiz_with_options<C: ConnectionTrait>(
        conn: &C,
        quiz_id: i32,
    ) -> Result<Vec<(Model, Vec<option::Model>)>, DbErr> {
        Entity::find()
            .filter(Column::QuizId.eq(quiz_id))
            .order_by_asc(Column::OrderIndex)
            .find_with_related(option::Entity)
            .all(conn)
            .await
    }

    /// The authoritative grading key: per question, the set of option ids
    /// marked correct.
    pub async fn correct_sets_by_quiz<C: ConnectionTrait>(
        conn: &C,
        quiz_id: i32,
    ) -> Result<HashMap<i32, BTreeSet<i32>>, DbErr> {
        let questions = Self::list_by_quiz(conn, quiz_id).await?;
        let question_ids: Vec<i32> = questions.iter().map(|q| q.id).collect();

        let mut sets: HashMap<i32, BTreeSet<i32>> =
            question_ids.iter().map(|id| (*id, BTreeSet::new())).collect();
        if question_ids.is_empty() {
            return Ok(sets);
        }

        let correct = option::Entity::find()
            .filter(option::Column::QuestionId.is_in(question_ids))
            .filter(option::Column::IsCorrect.eq(true))
            .all(conn)
            .await?;
        for row in correct {
            sets.entry(row.question_id).or_default().insert(row.id);
        }
        Ok(sets)
    }
}
