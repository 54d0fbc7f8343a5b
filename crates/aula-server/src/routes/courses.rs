use crate::permissions::Permission;
use crate::principal::{ExtractPrincipal, ExtractStudent, ExtractTeacher};
use crate::routes::envelope::{self, Pagination};
use aula_core::admission::{AdmissionDenied, CourseGate};
use aula_db::course::mutation::NewCourse;
use aula_db::course::query::CatalogFilter;
use aula_db::material::mutation::NewMaterial;
use aula_db::util::FlattenTransactionResultExt;
use aula_db::{activity, course, enrollment, material};
use aula_entity::activity_log::Kind;
use aula_entity::user::Role;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
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
        .route("/", get(list_catalog).post(create_course))
        .route("/search", get(search_catalog))
        .route("/enrolled", get(list_enrolled))
        .route("/teaching", get(list_teaching))
        .route("/{course_id}/enroll", post(enroll))
        .route("/{course_id}/materials", get(list_materials).post(add_material))
        .route("/materials/{material_id}/complete", post(complete_material))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum CourseError {
    #[error("course not found")]
    CourseNotFound,

    #[error("material not found")]
    MaterialNotFound,

    #[error("course not found or access denied")]
    NotOwner,

    #[error("an enrollment key is required when requires_key is set")]
    KeyInvariant,

    #[error("the field {0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Admission(#[from] AdmissionDenied),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for CourseError {
    fn into_response(self) -> Response {
        let status = match &self {
            CourseError::CourseNotFound | CourseError::MaterialNotFound => StatusCode::NOT_FOUND,
            CourseError::NotOwner => StatusCode::FORBIDDEN,
            CourseError::KeyInvariant | CourseError::MissingField(_) => StatusCode::BAD_REQUEST,
            CourseError::Admission(denied) => match denied {
                AdmissionDenied::KeyRequired => StatusCode::BAD_REQUEST,
                AdmissionDenied::KeyMismatch | AdmissionDenied::CourseFull => StatusCode::FORBIDDEN,
                AdmissionDenied::AlreadyEnrolled => StatusCode::CONFLICT,
            },
            CourseError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let CourseError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in course route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogParams {
    page: Option<u64>,
    limit: Option<u64>,
    category: Option<String>,
    search: Option<String>,
    teacher_id: Option<i32>,
}

/// Public catalog: published courses only, filtered and paginated.
async fn list_catalog(
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<CatalogParams>,
) -> Result<Response, CourseError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let filter = CatalogFilter {
        category: params.category,
        search: params.search,
        teacher_id: params.teacher_id,
    };

    let (rows, total) = course::Query::catalog_page(&conn, &filter, page, limit).await?;
    Ok(envelope::paginated(rows, Pagination::new(page, limit, total)))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    category: Option<String>,
}

async fn search_catalog(
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<SearchParams>,
) -> Result<Response, CourseError> {
    let query = params.q.unwrap_or_default();
    let rows = course::Query::search(&conn, &query, params.category.as_deref()).await?;
    let count = rows.len();
    Ok(envelope::success(json!({
        "courses": rows,
        "count": count,
    })))
}

/// The student's own enrollments, each with its course.
#[protect("Permission::Learn", ty = "Permission")]
async fn list_enrolled(
    ExtractStudent { student, .. }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, CourseError> {
    let rows = enrollment::Query::list_for_student(&conn, student.id).await?;
    let views: Vec<_> = rows
        .into_iter()
        .map(|(enrollment, course)| json!({ "enrollment": enrollment, "course": course }))
        .collect();
    Ok(envelope::success(views))
}

/// The teacher's own courses, drafts included.
#[protect("Permission::Teach", ty = "Permission")]
async fn list_teaching(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, CourseError> {
    let rows = course::Query::list_by_teacher(&conn, teacher.id).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct CreateCoursePayload {
    title: String,
    description: Option<String>,
    category: Option<String>,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    requires_key: bool,
    enrollment_key: Option<String>,
    #[serde(default)]
    max_enrollments: i32,
}

#[protect("Permission::Teach", ty = "Permission")]
async fn create_course(
    ExtractTeacher { user, teacher }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<Response, CourseError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(CourseError::MissingField("title"));
    }

    // requires_key demands a non-empty key; a key without the flag is
    // silently dropped so the invariant holds in both directions.
    let enrollment_key = payload
        .enrollment_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned);
    if payload.requires_key && enrollment_key.is_none() {
        return Err(CourseError::KeyInvariant);
    }

    let created = course::Mutation::create(
        &conn,
        teacher.id,
        NewCourse {
            title: title.to_owned(),
            description: payload.description,
            category: payload.category,
            is_public: payload.is_public,
            requires_key: payload.requires_key,
            enrollment_key: if payload.requires_key { enrollment_key } else { None },
            max_enrollments: payload.max_enrollments.max(0),
        },
    )
    .await?;

    activity::Mutation::log(&conn, user.id, Kind::Course, &format!("created course \"{}\"", created.title)).await;

    Ok(envelope::success_with("course created", created))
}

#[derive(Debug, Deserialize)]
struct EnrollPayload {
    enrollment_key: Option<String>,
}

#[protect("Permission::Learn", ty = "Permission")]
async fn enroll(
    ExtractStudent { user, student }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
    Path(course_id): Path<i32>,
    Json(payload): Json<EnrollPayload>,
) -> Result<Response, CourseError> {
    let student_id = student.id;
    let supplied_key = payload.enrollment_key.clone();

    // Admission checks and the insert share one transaction so a concurrent
    // enrollment cannot slip past the capacity count.
    let enrollment = conn
        .transaction::<_, _, CourseError>(|txn| {
            Box::pin(async move {
                let course = course::Query::find_by_id(txn, course_id)
                    .await?
                    .ok_or(CourseError::CourseNotFound)?;

                let gate = CourseGate {
                    requires_key: course.requires_key,
                    enrollment_key: course.enrollment_key.clone(),
                    max_enrollments: course.max_enrollments,
                };
                let active = enrollment::Query::count_active_for_course(txn, course_id).await?;
                let already = enrollment::Query::is_enrolled(txn, student_id, course_id).await?;
                gate.admit(supplied_key.as_deref(), active, already)?;

                let enrollment =
                    enrollment::Mutation::create_active(txn, student_id, course_id, supplied_key).await?;
                Ok(enrollment)
            })
        })
        .await
        .flatten_res()?;

    activity::Mutation::log(&conn, user.id, Kind::Enrollment, &format!("enrolled in course {course_id}")).await;

    Ok(envelope::success_with(
        "enrollment successful",
        json!({
            "enrollment_id": enrollment.id,
            "course_id": enrollment.course_id,
            "enrollment_date": enrollment.enrollment_date,
        }),
    ))
}

#[protect("Permission::Basic", ty = "Permission")]
async fn list_materials(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Path(course_id): Path<i32>,
) -> Result<Response, CourseError> {
    let course = course::Query::find_by_id(&conn, course_id)
        .await?
        .ok_or(CourseError::CourseNotFound)?;

    // The owning teacher sees drafts; everyone else only published rows.
    let owns = match user.role {
        Role::Teacher => aula_db::teacher::Query::find_by_user_id(&conn, user.id)
            .await?
            .is_some_and(|t| t.id == course.teacher_id),
        Role::Admin => true,
        Role::Student => false,
    };

    let rows = material::Query::list_by_course(&conn, course_id, !owns).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct AddMaterialPayload {
    title: String,
    description: Option<String>,
    file_type: Option<String>,
    file_path: String,
    #[serde(default)]
    file_size: i64,
    #[serde(default)]
    order_index: i32,
    #[serde(default = "default_true")]
    is_published: bool,
}

fn default_true() -> bool {
    true
}

#[protect("Permission::Teach", ty = "Permission")]
async fn add_material(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(course_id): Path<i32>,
    Json(payload): Json<AddMaterialPayload>,
) -> Result<Response, CourseError> {
    course::Query::find_owned(&conn, course_id, teacher.id)
        .await?
        .ok_or(CourseError::NotOwner)?;

    if payload.title.trim().is_empty() {
        return Err(CourseError::MissingField("title"));
    }
    if payload.file_path.trim().is_empty() {
        return Err(CourseError::MissingField("file_path"));
    }

    let created = material::Mutation::create(
        &conn,
        course_id,
        NewMaterial {
            title: payload.title,
            description: payload.description,
            file_type: payload.file_type,
            file_path: payload.file_path,
            file_size: payload.file_size,
            order_index: payload.order_index,
            is_published: payload.is_published,
        },
    )
    .await?;

    Ok(envelope::success_with("material added", created))
}

#[protect("Permission::Learn", ty = "Permission")]
async fn complete_material(
    ExtractStudent { student, .. }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
    Path(material_id): Path<i32>,
) -> Result<Response, CourseError> {
    material::Query::find_by_id(&conn, material_id)
        .await?
        .ok_or(CourseError::MaterialNotFound)?;

    material::Mutation::mark_completed(&conn, student.id, material_id).await?;
    Ok(envelope::success_message("material marked as completed"))
}
