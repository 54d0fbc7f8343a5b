use crate::permissions::Permission;
use crate::principal::{ExtractStudent, ExtractTeacher};
use crate::routes::envelope;
use aula_db::{activity, assignment, enrollment, quiz, stats, submission};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::json;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/student", get(student_dashboard))
        .route("/teacher", get(teacher_dashboard))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum DashboardError {
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let DashboardError::Db(error) = &self;
        tracing::error!(error = error as &dyn std::error::Error, "database error in dashboard route");
        envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

#[protect("Permission::Learn", ty = "Permission")]
async fn student_dashboard(
    ExtractStudent { user, student }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, DashboardError> {
    let course_ids = enrollment::Query::active_course_ids_for_student(&conn, student.id).await?;
    let published = assignment::Query::count_published_in_courses(&conn, &course_ids).await?;
    let submitted = submission::Query::count_submitted_in_courses(&conn, student.id, &course_ids).await?;
    let average = quiz::submission::Query::average_score_for_student(&conn, student.id).await?;
    let recent = activity::Query::recent_for_user(&conn, user.id, 10).await?;

    Ok(envelope::success(json!({
        "enrolled_courses": course_ids.len(),
        "pending_assignments": published.saturating_sub(submitted),
        "average_quiz_score": average,
        "recent_activity": recent,
    })))
}

#[protect("Permission::Teach", ty = "Permission")]
async fn teacher_dashboard(
    ExtractTeacher { user, teacher }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, DashboardError> {
    let courses = stats::Query::course_count_of_teacher(&conn, teacher.id).await?;
    let students = stats::Query::distinct_students_of_teacher(&conn, teacher.id).await?;
    let ungraded = submission::Query::count_ungraded_for_teacher(&conn, teacher.id).await?;
    let recent = activity::Query::recent_for_user(&conn, user.id, 10).await?;

    Ok(envelope::success(json!({
        "courses": courses,
        "students": students,
        "ungraded_submissions": ungraded,
        "recent_activity": recent,
    })))
}
