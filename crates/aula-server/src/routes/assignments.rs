use crate::permissions::Permission;
use crate::principal::{ExtractPrincipal, ExtractStudent, ExtractTeacher};
use crate::routes::envelope;
use aula_db::assignment::mutation::NewAssignment;
use aula_db::{activity, assignment, course, submission};
use aula_entity::activity_log::Kind;
use aula_entity::assignment::submission::Status;
use aula_entity::user::Role;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{NaiveDateTime, Utc};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route("/{assignment_id}/submit", post(submit))
        .route("/{assignment_id}/submissions", get(list_submissions))
        .route("/{assignment_id}/files", get(list_files).post(add_file))
        .route("/submissions/{submission_id}/grade", post(grade_submission))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum AssignmentError {
    #[error("course not found")]
    CourseNotFound,

    #[error("assignment not found")]
    AssignmentNotFound,

    #[error("submission not found")]
    SubmissionNotFound,

    #[error("course not found or access denied")]
    NotOwner,

    #[error("the due date has passed and late submissions are not allowed")]
    TooLate,

    #[error("the field {0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for AssignmentError {
    fn into_response(self) -> Response {
        let status = match &self {
            AssignmentError::CourseNotFound
            | AssignmentError::AssignmentNotFound
            | AssignmentError::SubmissionNotFound => StatusCode::NOT_FOUND,
            AssignmentError::NotOwner | AssignmentError::TooLate => StatusCode::FORBIDDEN,
            AssignmentError::MissingField(_) => StatusCode::BAD_REQUEST,
            AssignmentError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let AssignmentError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in assignment route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    course_id: i32,
}

/// What a student sees per assignment: the row plus their own progress.
#[derive(Debug, Serialize)]
struct AssignmentView {
    #[serde(flatten)]
    assignment: aula_entity::assignment::assignment::Model,
    submission_status: String,
    grade: Option<f64>,
    submitted_at: Option<NaiveDateTime>,
}

#[protect("Permission::Basic", ty = "Permission")]
async fn list_assignments(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<ListParams>,
) -> Result<Response, AssignmentError> {
    let course = course::Query::find_by_id(&conn, params.course_id)
        .await?
        .ok_or(AssignmentError::CourseNotFound)?;

    match user.role {
        Role::Teacher | Role::Admin => {
            if user.role == Role::Teacher {
                let teacher = aula_db::teacher::Query::find_by_user_id(&conn, user.id).await?;
                if !teacher.is_some_and(|t| t.id == course.teacher_id) {
                    return Err(AssignmentError::NotOwner);
                }
            }
            let rows = assignment::Query::list_by_course(&conn, course.id, false).await?;
            Ok(envelope::success(rows))
        }
        Role::Student => {
            let student = aula_db::student::Query::find_by_user_id(&conn, user.id)
                .await?
                .ok_or(AssignmentError::NotOwner)?;

            let rows = assignment::Query::list_by_course(&conn, course.id, true).await?;
            let ids: Vec<i32> = rows.iter().map(|a| a.id).collect();
            let own: HashMap<i32, _> = submission::Query::list_for_student_in(&conn, student.id, &ids)
                .await?
                .into_iter()
                .map(|s| (s.assignment_id, s))
                .collect();

            let views: Vec<AssignmentView> = rows
                .into_iter()
                .map(|assignment| {
                    let submission = own.get(&assignment.id);
                    AssignmentView {
                        submission_status: submission
                            .map(|s| match s.status {
                                Status::Submitted => "submitted".to_owned(),
                                Status::Graded => "graded".to_owned(),
                            })
                            .unwrap_or_else(|| "not_submitted".to_owned()),
                        grade: submission.and_then(|s| s.grade),
                        submitted_at: submission.map(|s| s.submitted_at),
                        assignment,
                    }
                })
                .collect();
            Ok(envelope::success(views))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    course_id: i32,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDateTime>,
    #[serde(default = "default_max_points")]
    max_points: i32,
    #[serde(default)]
    allow_late_submission: bool,
    #[serde(default)]
    is_published: bool,
}

fn default_max_points() -> i32 {
    100
}

#[protect("Permission::Teach", ty = "Permission")]
async fn create_assignment(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreatePayload>,
) -> Result<Response, AssignmentError> {
    course::Query::find_owned(&conn, payload.course_id, teacher.id)
        .await?
        .ok_or(AssignmentError::NotOwner)?;

    if payload.title.trim().is_empty() {
        return Err(AssignmentError::MissingField("title"));
    }

    let created = assignment::Mutation::create(
        &conn,
        payload.course_id,
        NewAssignment {
            title: payload.title,
            description: payload.description,
            due_date: payload.due_date,
            max_points: payload.max_points,
            allow_late_submission: payload.allow_late_submission,
            is_published: payload.is_published,
        },
    )
    .await?;

    Ok(envelope::success_with("assignment created", created))
}

#[derive(Debug, Deserialize)]
struct SubmitPayload {
    submission_text: Option<String>,
    file_path: Option<String>,
}

#[protect("Permission::Learn", ty = "Permission")]
async fn submit(
    ExtractStudent { user, student }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Response, AssignmentError> {
    let assignment = assignment::Query::find_by_id(&conn, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;

    // Late work is accepted only when the assignment says so; it is always
    // flagged.
    let is_late = assignment
        .due_date
        .is_some_and(|due| Utc::now().naive_utc() > due);
    if is_late && !assignment.allow_late_submission {
        return Err(AssignmentError::TooLate);
    }

    let row = submission::Mutation::upsert(
        &conn,
        student.id,
        assignment_id,
        payload.submission_text,
        payload.file_path,
        is_late,
    )
    .await?;

    activity::Mutation::log(
        &conn,
        user.id,
        Kind::Submission,
        &format!("submitted assignment \"{}\"", assignment.title),
    )
    .await;

    Ok(envelope::success_with("assignment submitted", row))
}

#[protect("Permission::Teach", ty = "Permission")]
async fn list_submissions(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(assignment_id): Path<i32>,
) -> Result<Response, AssignmentError> {
    let assignment = assignment::Query::find_by_id(&conn, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    course::Query::find_owned(&conn, assignment.course_id, teacher.id)
        .await?
        .ok_or(AssignmentError::NotOwner)?;

    let rows = submission::Query::list_for_assignment(&conn, assignment_id).await?;
    Ok(envelope::success(rows))
}

#[protect("Permission::Basic", ty = "Permission")]
async fn list_files(
    ExtractPrincipal(_): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Path(assignment_id): Path<i32>,
) -> Result<Response, AssignmentError> {
    assignment::Query::find_by_id(&conn, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    let rows = assignment::Query::list_files(&conn, assignment_id).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct AddFilePayload {
    file_name: String,
    file_path: String,
    #[serde(default)]
    file_size: i64,
}

/// Records a teacher attachment; the bytes themselves live in the blob
/// store.
#[protect("Permission::Teach", ty = "Permission")]
async fn add_file(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<AddFilePayload>,
) -> Result<Response, AssignmentError> {
    let assignment = assignment::Query::find_by_id(&conn, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    course::Query::find_owned(&conn, assignment.course_id, teacher.id)
        .await?
        .ok_or(AssignmentError::NotOwner)?;

    if payload.file_name.trim().is_empty() {
        return Err(AssignmentError::MissingField("file_name"));
    }
    if payload.file_path.trim().is_empty() {
        return Err(AssignmentError::MissingField("file_path"));
    }

    let record = assignment::Mutation::add_file(
        &conn,
        assignment_id,
        teacher.id,
        &payload.file_name,
        &payload.file_path,
        payload.file_size,
    )
    .await?;

    Ok(envelope::success_with("file attached", record))
}

#[derive(Debug, Deserialize)]
struct GradePayload {
    grade: f64,
}

#[protect("Permission::Teach", ty = "Permission")]
async fn grade_submission(
    ExtractTeacher { user, teacher }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(submission_id): Path<i32>,
    Json(payload): Json<GradePayload>,
) -> Result<Response, AssignmentError> {
    let row = submission::Query::find_by_id(&conn, submission_id)
        .await?
        .ok_or(AssignmentError::SubmissionNotFound)?;
    let assignment = assignment::Query::find_by_id(&conn, row.assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    course::Query::find_owned(&conn, assignment.course_id, teacher.id)
        .await?
        .ok_or(AssignmentError::NotOwner)?;

    let graded = submission::Mutation::set_grade(&conn, submission_id, payload.grade).await?;

    activity::Mutation::log(
        &conn,
        user.id,
        Kind::Grading,
        &format!("graded a submission for \"{}\"", assignment.title),
    )
    .await;

    Ok(envelope::success_with("grade recorded", graded))
}
