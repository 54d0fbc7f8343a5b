use crate::permissions::Permission;
use crate::principal::ExtractAdmin;
use crate::routes::envelope;
use aula_db::util::FlattenTransactionResultExt;
use aula_db::{cascade, course, stats, student, teacher, user};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use serde_derive::Deserialize;
use serde_json::json;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/students", get(list_students))
        .route("/teachers", get(list_teachers))
        .route("/courses", get(list_courses))
        .route("/dashboard", get(dashboard))
        .route("/toggle-user", post(toggle_user))
        .route("/students/{student_id}", delete(delete_student))
        .route("/teachers/{teacher_id}", delete(delete_teacher))
        .route("/courses/{course_id}", delete(delete_course))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum AdminError {
    #[error("user not found")]
    UserNotFound,

    #[error("student not found")]
    StudentNotFound,

    #[error("teacher not found")]
    TeacherNotFound,

    #[error("course not found")]
    CourseNotFound,

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::UserNotFound
            | AdminError::StudentNotFound
            | AdminError::TeacherNotFound
            | AdminError::CourseNotFound => StatusCode::NOT_FOUND,
            AdminError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            AdminError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let AdminError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in admin route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

#[protect("Permission::Admin", ty = "Permission")]
async fn list_students(
    ExtractAdmin(_): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, AdminError> {
    let rows = student::Query::list_with_identity(&conn).await?;
    Ok(envelope::success(rows))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn list_teachers(
    ExtractAdmin(_): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, AdminError> {
    let rows = teacher::Query::list_with_identity(&conn).await?;
    Ok(envelope::success(rows))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn list_courses(
    ExtractAdmin(_): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, AdminError> {
    let rows = course::Query::list_all_with_teacher(&conn).await?;
    Ok(envelope::success(rows))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn dashboard(
    ExtractAdmin(_): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, AdminError> {
    let counts = stats::Query::site_counts(&conn).await?;
    Ok(envelope::success(counts))
}

#[derive(Debug, Deserialize)]
struct TogglePayload {
    user_id: i32,
    action: String,
}

#[protect("Permission::Admin", ty = "Permission")]
async fn toggle_user(
    ExtractAdmin(_): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<TogglePayload>,
) -> Result<Response, AdminError> {
    let activate = match payload.action.as_str() {
        "activate" => true,
        "deactivate" => false,
        other => return Err(AdminError::InvalidAction(other.to_owned())),
    };

    let account = user::Query::find_by_id(&conn, payload.user_id)
        .await?
        .ok_or(AdminError::UserNotFound)?;

    // Idempotent on purpose: toggling to the current state still succeeds.
    let updated = user::Mutation::set_active(&conn, account.id, activate).await?;
    let verb = if activate { "activated" } else { "deactivated" };

    Ok(envelope::success_with(
        format!("user \"{} {}\" {verb}", account.first_name, account.last_name),
        json!({ "is_active": updated.is_active }),
    ))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn delete_student(
    ExtractAdmin(admin): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
    Path(student_id): Path<i32>,
) -> Result<Response, AdminError> {
    let (_, account) = student::Query::find_with_user(&conn, student_id)
        .await?
        .ok_or(AdminError::StudentNotFound)?;

    let user_id = account.id;
    conn.transaction::<_, _, AdminError>(|txn| {
        Box::pin(async move {
            cascade::delete_student(txn, student_id, user_id).await?;
            Ok(())
        })
    })
    .await
    .flatten_res()?;

    tracing::info!(admin_id = %admin.id, %student_id, "student deleted");
    Ok(envelope::success_message(format!(
        "student \"{} {}\" deleted",
        account.first_name, account.last_name
    )))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn delete_teacher(
    ExtractAdmin(admin): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
    Path(teacher_id): Path<i32>,
) -> Result<Response, AdminError> {
    let (_, account) = teacher::Query::find_with_user(&conn, teacher_id)
        .await?
        .ok_or(AdminError::TeacherNotFound)?;

    let user_id = account.id;
    let removed_courses = conn
        .transaction::<_, _, AdminError>(|txn| {
            Box::pin(async move {
                let removed = cascade::delete_teacher(txn, teacher_id, user_id).await?;
                Ok(removed)
            })
        })
        .await
        .flatten_res()?;

    tracing::info!(admin_id = %admin.id, %teacher_id, removed_courses, "teacher deleted");
    Ok(envelope::success_with(
        format!(
            "teacher \"{} {}\" and all their courses deleted",
            account.first_name, account.last_name
        ),
        json!({ "courses_deleted": removed_courses }),
    ))
}

#[protect("Permission::Admin", ty = "Permission")]
async fn delete_course(
    ExtractAdmin(admin): ExtractAdmin,
    Extension(conn): Extension<DatabaseConnection>,
    Path(course_id): Path<i32>,
) -> Result<Response, AdminError> {
    let course_row = course::Query::find_by_id(&conn, course_id)
        .await?
        .ok_or(AdminError::CourseNotFound)?;

    conn.transaction::<_, _, AdminError>(|txn| {
        Box::pin(async move {
            cascade::delete_course(txn, course_id).await?;
            Ok(())
        })
    })
    .await
    .flatten_res()?;

    tracing::info!(admin_id = %admin.id, %course_id, "course deleted");
    Ok(envelope::success_with(
        format!("course \"{}\" deleted", course_row.title),
        json!({ "course_id": course_id }),
    ))
}
