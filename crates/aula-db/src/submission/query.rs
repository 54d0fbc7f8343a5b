use aula_entity::assignment::assignment;
use aula_entity::assignment::submission::{Column, Entity, Model, Status};
use aula_entity::{course, student, user};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;

pub struct Query;

/// A submission with the submitting student's identity, for teacher review.
#[derive(Debug, FromQueryResult, Serialize)]
pub struct SubmissionRow {
    pub id: i32,
    pub student_id: i32,
    pub assignment_id: i32,
    pub submission_text: Option<String>,
    pub file_path: Option<String>,
    pub status: Status,
    pub grade: Option<f64>,
    pub submitted_at: chrono::NaiveDateTime,
    pub is_late: bool,
    pub student_card: String,
    pub first_name: String,
    pub last_name: String,
}

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(conn).await
    }

    pub async fn find_for_pair<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        assignment_id: i32,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(conn)
            .await
    }

    /// The student's submissions across a set of assignments, for
    /// annotating assignment listings.
    pub async fn list_for_student_in<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        assignment_ids: &[i32],
    ) -> Result<Vec<Model>, DbErr> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .all(conn)
            .await
    }

    pub async fn list_for_assignment<C: ConnectionTrait>(
        conn: &C,
        assignment_id: i32,
    ) -> Result<Vec<SubmissionRow>, DbErr> {
        Entity::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .join(
                JoinType::InnerJoin,
                aula_entity::assignment::submission::Relation::Student.def(),
            )
            .join(JoinType::InnerJoin, student::Relation::User.def())
            .select_only()
            .columns([
                Column::Id,
                Column::StudentId,
                Column::AssignmentId,
                Column::SubmissionText,
                Column::FilePath,
                Column::Status,
                Column::Grade,
                Column::SubmittedAt,
                Column::IsLate,
            ])
            .column(student::Column::StudentCard)
            .columns([user::Column::FirstName, user::Column::LastName])
            .order_by_desc(Column::SubmittedAt)
            .into_model::<SubmissionRow>()
            .all(conn)
            .await
    }

    pub async fn count_submitted_in_courses<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        course_ids: &[i32],
    ) -> Result<u64, DbErr> {
        if course_ids.is_empty() {
            return Ok(0);
        }
        Entity::find()
            .join(
                JoinType::InnerJoin,
                aula_entity::assignment::submission::Relation::Assignment.def(),
            )
            .filter(Column::StudentId.eq(student_id))
            .filter(assignment::Column::CourseId.is_in(course_ids.to_vec()))
            .count(conn)
            .await
    }

    /// Submissions still waiting for a grade across the teacher's courses.
    pub async fn count_ungraded_for_teacher<C: ConnectionTrait>(conn: &C, teacher_id: i32) -> Result<u64, DbErr> {
        Entity::find()
            .join(
                JoinType::InnerJoin,
                aula_entity::assignment::submission::Relation::Assignment.def(),
            )
            .join(
                JoinType::InnerJoin,
                aula_entity::assignment::assignment::Relation::Course.def(),
            )
            .filter(course::Column::TeacherId.eq(teacher_id))
            .filter(Column::Status.eq(Status::Submitted))
            .count(conn)
            .await
    }
}
