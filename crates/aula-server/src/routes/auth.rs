use crate::AppConfig;
use crate::permissions::Permission;
use crate::principal::ExtractPrincipal;
use crate::routes::envelope;
use aula_db::util::FlattenTransactionResultExt;
use aula_db::{activity, auth_session, student, teacher, user};
use aula_entity::activity_log::Kind;
use aula_entity::user::Role;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use axum_auth::AuthBearer;
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum AuthError {
    #[error("the field {0} is required")]
    MissingField(&'static str),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("this email is already in use")]
    EmailTaken,

    #[error("this student card is already in use")]
    CardTaken,

    #[error("student card and year are required for students")]
    MissingStudentInfo,

    #[error("a specialty is required for teachers")]
    MissingSpecialty,

    #[error("user not found")]
    UnknownUser,

    #[error("incorrect password")]
    WrongPassword,

    #[error(transparent)]
    Password(#[from] crate::auth::PasswordError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingField(_)
            | AuthError::InvalidEmail
            | AuthError::InvalidRole(_)
            | AuthError::MissingStudentInfo
            | AuthError::MissingSpecialty => StatusCode::BAD_REQUEST,
            AuthError::EmailTaken | AuthError::CardTaken => StatusCode::CONFLICT,
            AuthError::UnknownUser => StatusCode::NOT_FOUND,
            AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::Password(_) | AuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let AuthError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in auth route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

/// The caller-facing account payload; role-specific fields appear only for
/// the matching role.
#[derive(Debug, Serialize)]
struct UserPayload {
    id: i32,
    email: String,
    role: Role,
    first_name: String,
    last_name: String,
    full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teacher_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grade: Option<String>,
}

impl UserPayload {
    fn new(
        user: &aula_entity::user::Model,
        student: Option<&aula_entity::student::Model>,
        teacher: Option<&aula_entity::teacher::Model>,
    ) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: format!("{} {}", user.first_name, user.last_name),
            student_id: student.map(|s| s.id),
            student_card: student.map(|s| s.student_card.clone()),
            year: student.map(|s| s.year),
            teacher_id: teacher.map(|t| t.id),
            specialty: teacher.map(|t| t.specialty.clone()),
            grade: teacher.and_then(|t| t.grade.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionPayload {
    token: String,
    user: UserPayload,
}

fn email_is_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(name));
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    role: String,
    student_card: Option<String>,
    year: Option<i32>,
    specialty: Option<String>,
    grade: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
}

async fn register(
    Extension(conn): Extension<DatabaseConnection>,
    Extension(config): Extension<AppConfig>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, AuthError> {
    let email = required(&payload.email, "email")?.to_owned();
    required(&payload.password, "password")?;
    let first_name = required(&payload.first_name, "first_name")?.to_owned();
    let last_name = required(&payload.last_name, "last_name")?.to_owned();
    let role = match required(&payload.role, "role")? {
        "student" => Role::Student,
        "teacher" => Role::Teacher,
        other => return Err(AuthError::InvalidRole(other.to_owned())),
    };
    if !email_is_valid(&email) {
        return Err(AuthError::InvalidEmail);
    }

    if user::Query::find_by_email(&conn, &email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = crate::auth::hash_password(&payload.password)?;
    let ttl = config.session_ttl_seconds();

    // The account, its role row and the first session are one atomic write.
    let (account, student_row, teacher_row, session) = conn
        .transaction::<_, _, AuthError>(|txn| {
            Box::pin(async move {
                let account =
                    user::Mutation::create(txn, &email, &password_hash, role, &first_name, &last_name).await?;

                let mut student_row = None;
                let mut teacher_row = None;
                match role {
                    Role::Student => {
                        let (Some(card), Some(year)) = (payload.student_card.as_deref(), payload.year) else {
                            return Err(AuthError::MissingStudentInfo);
                        };
                        let card = card.trim();
                        if card.is_empty() {
                            return Err(AuthError::MissingStudentInfo);
                        }
                        if student::Query::find_by_card(txn, card).await?.is_some() {
                            return Err(AuthError::CardTaken);
                        }
                        student_row = Some(student::Mutation::create(txn, account.id, card, year).await?);
                    }
                    Role::Teacher => {
                        let specialty = payload
                            .specialty
                            .as_deref()
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .ok_or(AuthError::MissingSpecialty)?;
                        teacher_row = Some(
                            teacher::Mutation::create(
                                txn,
                                account.id,
                                specialty,
                                payload.grade.clone(),
                                payload.phone.clone(),
                                payload.bio.clone(),
                            )
                            .await?,
                        );
                    }
                    Role::Admin => unreachable!("admin registration is rejected above"),
                }

                let session = auth_session::Mutation::create(txn, account.id, ttl).await?;
                Ok((account, student_row, teacher_row, session))
            })
        })
        .await
        .flatten_res()?;

    activity::Mutation::log(&conn, account.id, Kind::Auth, "registered an account").await;
    tracing::info!(user_id = %account.id, role = ?account.role, "new account registered");

    Ok(envelope::success_with(
        "registration successful",
        SessionPayload {
            token: session.token,
            user: UserPayload::new(&account, student_row.as_ref(), teacher_row.as_ref()),
        },
    ))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    Extension(conn): Extension<DatabaseConnection>,
    Extension(config): Extension<AppConfig>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AuthError> {
    let email = required(&payload.email, "email")?;
    required(&payload.password, "password")?;

    let account = user::Query::find_active_by_email(&conn, email)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    if !crate::auth::verify_password(&payload.password, &account.password) {
        return Err(AuthError::WrongPassword);
    }

    let student_row = student::Query::find_by_user_id(&conn, account.id).await?;
    let teacher_row = teacher::Query::find_by_user_id(&conn, account.id).await?;
    let session = auth_session::Mutation::create(&conn, account.id, config.session_ttl_seconds()).await?;

    activity::Mutation::log(&conn, account.id, Kind::Auth, "signed in").await;

    Ok(envelope::success_with(
        "login successful",
        SessionPayload {
            token: session.token,
            user: UserPayload::new(&account, student_row.as_ref(), teacher_row.as_ref()),
        },
    ))
}

#[protect("Permission::Basic", ty = "Permission")]
async fn logout(
    ExtractPrincipal(account): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    AuthBearer(token): AuthBearer,
) -> Result<Response, AuthError> {
    auth_session::Mutation::delete_by_token(&conn, &token).await?;
    tracing::debug!(user_id = %account.id, "session closed");
    Ok(envelope::success_message("logged out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(email_is_valid("user@example.com"));
        assert!(email_is_valid("first.last@sub.example.org"));
    }

    #[test]
    fn email_validation_rejects_junk() {
        assert!(!email_is_valid("no-at-sign"));
        assert!(!email_is_valid("@example.com"));
        assert!(!email_is_valid("user@nodot"));
        assert!(!email_is_valid("user@.com"));
        assert!(!email_is_valid("user name@example.com"));
    }

    #[test]
    fn required_trims_and_rejects_empty() {
        assert_eq!(required("  x ", "f").unwrap(), "x");
        assert!(matches!(required("   ", "f"), Err(AuthError::MissingField("f"))));
    }
}
