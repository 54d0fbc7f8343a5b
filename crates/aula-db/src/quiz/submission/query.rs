use aula_entity::quiz::submission::{Column, Entity, Model};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect};

pub struct Query;

#[derive(Debug, FromQueryResult)]
struct AverageScore {
    average: Option<f64>,
}

impl Query {
    pub async fn list_for_student<C: ConnectionTrait>(conn: &C, student_id: i32) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .all(conn)
            .await
    }

    pub async fn average_score_for_student<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Option<f64>, DbErr> {
        let row = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .select_only()
            .column_as(SimpleExpr::from(Func::avg(Expr::col(Column::Score))), "average")
            .into_model::<AverageScore>()
            .one(conn)
            .await?;
        Ok(row.and_then(|r| r.average))
    }
}
