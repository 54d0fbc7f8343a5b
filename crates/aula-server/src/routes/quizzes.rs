use crate::permissions::Permission;
use crate::principal::{ExtractPrincipal, ExtractStudent, ExtractTeacher};
use crate::routes::envelope;
use aula_core::grading::{self, Answer, QuestionSpec};
use aula_db::quiz::question::mutation::{NewOption, NewQuestion};
use aula_db::quiz::quiz::mutation::NewQuiz;
use aula_db::util::FlattenTransactionResultExt;
use aula_db::{activity, course, quiz};
use aula_entity::activity_log::Kind;
use aula_entity::quiz::question::QuestionType;
use aula_entity::quiz::quiz::QuizType;
use aula_entity::user::Role;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/{quiz_id}/questions", get(list_questions).post(add_question))
        .route("/{quiz_id}/submit", post(submit_quiz))
        .route("/questions/{question_id}", delete(delete_question))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum QuizError {
    #[error("course not found")]
    CourseNotFound,

    #[error("quiz not found or access denied")]
    QuizNotFound,

    #[error("question not found or access denied")]
    QuestionNotFound,

    #[error("course not found or access denied")]
    NotOwner,

    #[error("the field {0} is required")]
    MissingField(&'static str),

    #[error("invalid quiz type: {0}")]
    InvalidQuizType(String),

    #[error("invalid question type: {0}")]
    InvalidQuestionType(String),

    #[error("malformed answers: {0}")]
    MalformedAnswers(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuizError::CourseNotFound | QuizError::QuizNotFound | QuizError::QuestionNotFound => {
                StatusCode::NOT_FOUND
            }
            QuizError::NotOwner => StatusCode::FORBIDDEN,
            QuizError::MissingField(_)
            | QuizError::InvalidQuizType(_)
            | QuizError::InvalidQuestionType(_)
            | QuizError::MalformedAnswers(_) => StatusCode::BAD_REQUEST,
            QuizError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let QuizError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in quiz route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    course_id: i32,
}

#[protect("Permission::Basic", ty = "Permission")]
async fn list_quizzes(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<ListParams>,
) -> Result<Response, QuizError> {
    let course = course::Query::find_by_id(&conn, params.course_id)
        .await?
        .ok_or(QuizError::CourseNotFound)?;

    let published_only = match user.role {
        Role::Student => true,
        Role::Admin => false,
        Role::Teacher => {
            let teacher = aula_db::teacher::Query::find_by_user_id(&conn, user.id).await?;
            !teacher.is_some_and(|t| t.id == course.teacher_id)
        }
    };

    let rows = quiz::quiz::Query::list_by_course(&conn, course.id, published_only).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct CreateQuizPayload {
    course_id: i32,
    title: String,
    description: Option<String>,
    quiz_type: Option<String>,
    #[serde(default)]
    time_limit: i32,
    #[serde(default = "default_passing_score")]
    passing_score: i32,
    #[serde(default)]
    is_published: bool,
}

fn default_passing_score() -> i32 {
    60
}

fn parse_quiz_type(value: Option<&str>) -> Result<QuizType, QuizError> {
    match value {
        None | Some("practice") => Ok(QuizType::Practice),
        Some("exam") => Ok(QuizType::Exam),
        Some("graded") => Ok(QuizType::Graded),
        Some(other) => Err(QuizError::InvalidQuizType(other.to_owned())),
    }
}

fn parse_question_type(value: Option<&str>) -> Result<QuestionType, QuizError> {
    match value {
        None | Some("multiple_choice") => Ok(QuestionType::MultipleChoice),
        Some("true_false") => Ok(QuestionType::TrueFalse),
        Some("short_answer") => Ok(QuestionType::ShortAnswer),
        Some("essay") => Ok(QuestionType::Essay),
        Some(other) => Err(QuizError::InvalidQuestionType(other.to_owned())),
    }
}

#[protect("Permission::Teach", ty = "Permission")]
async fn create_quiz(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<Response, QuizError> {
    course::Query::find_owned(&conn, payload.course_id, teacher.id)
        .await?
        .ok_or(QuizError::NotOwner)?;

    if payload.title.trim().is_empty() {
        return Err(QuizError::MissingField("title"));
    }
    let quiz_type = parse_quiz_type(payload.quiz_type.as_deref())?;

    let created = quiz::quiz::Mutation::create(
        &conn,
        payload.course_id,
        NewQuiz {
            title: payload.title,
            description: payload.description,
            quiz_type,
            time_limit: payload.time_limit.max(0),
            passing_score: payload.passing_score,
            is_published: payload.is_published,
        },
    )
    .await?;

    Ok(envelope::success_with("quiz created", created))
}

/// An option as students see it: the correct flag stays on the server.
#[derive(Debug, Serialize)]
struct PublicOption {
    id: i32,
    option_text: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum QuestionView {
    Full {
        #[serde(flatten)]
        question: aula_entity::quiz::question::Model,
        options: Vec<aula_entity::quiz::option::Model>,
    },
    Sanitized {
        #[serde(flatten)]
        question: aula_entity::quiz::question::Model,
        options: Vec<PublicOption>,
    },
}

#[protect("Permission::Basic", ty = "Permission")]
async fn list_questions(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Path(quiz_id): Path<i32>,
) -> Result<Response, QuizError> {
    let quiz = quiz::quiz::Query::find_by_id(&conn, quiz_id)
        .await?
        .ok_or(QuizError::QuizNotFound)?;

    let owns = match user.role {
        Role::Admin => true,
        Role::Teacher => {
            let teacher = aula_db::teacher::Query::find_by_user_id(&conn, user.id).await?;
            match teacher {
                Some(teacher) => course::Query::find_owned(&conn, quiz.course_id, teacher.id).await?.is_some(),
                None => false,
            }
        }
        Role::Student => false,
    };

    // Students only ever see published quizzes, and never the answer key.
    if !owns && !quiz.is_published {
        return Err(QuizError::QuizNotFound);
    }

    let rows = quiz::question::Query::list_by_quiz_with_options(&conn, quiz_id).await?;
    let views: Vec<QuestionView> = rows
        .into_iter()
        .map(|(question, options)| {
            if owns {
                QuestionView::Full { question, options }
            } else {
                QuestionView::Sanitized {
                    question,
                    options: options
                        .into_iter()
                        .map(|o| PublicOption {
                            id: o.id,
                            option_text: o.option_text,
                        })
                        .collect(),
                }
            }
        })
        .collect();

    Ok(envelope::success(views))
}

#[derive(Debug, Deserialize)]
struct OptionPayload {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
struct AddQuestionPayload {
    question: String,
    question_type: Option<String>,
    #[serde(default = "default_points")]
    points: i32,
    explanation: Option<String>,
    #[serde(default)]
    order_index: i32,
    options: Vec<OptionPayload>,
}

fn default_points() -> i32 {
    1
}

#[protect("Permission::Teach", ty = "Permission")]
async fn add_question(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(quiz_id): Path<i32>,
    Json(payload): Json<AddQuestionPayload>,
) -> Result<Response, QuizError> {
    quiz::quiz::Query::find_owned(&conn, quiz_id, teacher.id)
        .await?
        .ok_or(QuizError::QuizNotFound)?;

    if payload.question.trim().is_empty() {
        return Err(QuizError::MissingField("question"));
    }
    let question_type = parse_question_type(payload.question_type.as_deref())?;
    if question_type.auto_graded() && payload.options.is_empty() {
        return Err(QuizError::MissingField("options"));
    }

    let new = NewQuestion {
        question: payload.question,
        question_type,
        points: payload.points.max(0),
        explanation: payload.explanation,
        order_index: payload.order_index,
    };
    let options: Vec<NewOption> = payload
        .options
        .into_iter()
        .map(|o| NewOption {
            text: o.text,
            is_correct: o.is_correct,
        })
        .collect();

    // The question and its options land together or not at all.
    let question = conn
        .transaction::<_, _, QuizError>(|txn| {
            Box::pin(async move {
                let question = quiz::question::Mutation::create_with_options(txn, quiz_id, new, options).await?;
                Ok(question)
            })
        })
        .await
        .flatten_res()?;

    Ok(envelope::success_with("question added", question))
}

#[protect("Permission::Teach", ty = "Permission")]
async fn delete_question(
    ExtractTeacher { teacher, .. }: ExtractTeacher,
    Extension(conn): Extension<DatabaseConnection>,
    Path(question_id): Path<i32>,
) -> Result<Response, QuizError> {
    let question = quiz::question::Query::find_by_id(&conn, question_id)
        .await?
        .ok_or(QuizError::QuestionNotFound)?;
    quiz::quiz::Query::find_owned(&conn, question.quiz_id, teacher.id)
        .await?
        .ok_or(QuizError::QuestionNotFound)?;

    conn.transaction::<_, _, QuizError>(|txn| {
        Box::pin(async move {
            quiz::question::Mutation::delete_with_options(txn, question_id).await?;
            Ok(())
        })
    })
    .await
    .flatten_res()?;

    Ok(envelope::success_message("question deleted"))
}

#[derive(Debug, Deserialize)]
struct SubmitPayload {
    answers: Map<String, Value>,
    #[serde(default)]
    time_taken: i32,
}

/// Turns the wire answer map into typed answers. Keys must be question ids;
/// values are an option id, an array of option ids, or free text.
fn parse_answers(raw: &Map<String, Value>) -> Result<HashMap<i32, Answer>, QuizError> {
    let mut answers = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let question_id: i32 = key
            .parse()
            .map_err(|_| QuizError::MalformedAnswers(format!("bad question id {key:?}")))?;
        let answer = match value {
            Value::Number(n) => Answer::Selected(
                n.as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| QuizError::MalformedAnswers(format!("bad option id for question {key}")))?,
            ),
            Value::Array(items) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    let id = item
                        .as_i64()
                        .and_then(|v| i32::try_from(v).ok())
                        .ok_or_else(|| QuizError::MalformedAnswers(format!("bad option id for question {key}")))?;
                    ids.push(id);
                }
                Answer::SelectedMany(ids)
            }
            Value::String(text) => Answer::Text(text.clone()),
            other => {
                return Err(QuizError::MalformedAnswers(format!(
                    "unsupported answer value {other} for question {key}"
                )));
            }
        };
        answers.insert(question_id, answer);
    }
    Ok(answers)
}

#[protect("Permission::Learn", ty = "Permission")]
async fn submit_quiz(
    ExtractStudent { user, student }: ExtractStudent,
    Extension(conn): Extension<DatabaseConnection>,
    Path(quiz_id): Path<i32>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Response, QuizError> {
    let quiz = quiz::quiz::Query::find_by_id(&conn, quiz_id)
        .await?
        .ok_or(QuizError::QuizNotFound)?;
    if !quiz.is_published {
        return Err(QuizError::QuizNotFound);
    }

    let answers = parse_answers(&payload.answers)?;

    let questions = quiz::question::Query::list_by_quiz(&conn, quiz_id).await?;
    let key = quiz::question::Query::correct_sets_by_quiz(&conn, quiz_id).await?;
    let specs: Vec<QuestionSpec> = questions
        .iter()
        .map(|question| QuestionSpec {
            id: question.id,
            points: question.points,
            correct: key.get(&question.id).cloned().unwrap_or_default(),
            auto_graded: question.question_type.auto_graded(),
        })
        .collect();

    let graded = grading::grade(&specs, &answers);

    // The submitted map goes in verbatim so the attempt can be replayed.
    let serialized = serde_json::to_string(&payload.answers)
        .map_err(|err| QuizError::MalformedAnswers(err.to_string()))?;
    quiz::submission::Mutation::create(&conn, student.id, quiz_id, serialized, graded.score, payload.time_taken)
        .await?;

    activity::Mutation::log(
        &conn,
        user.id,
        Kind::Submission,
        &format!("submitted quiz \"{}\"", quiz.title),
    )
    .await;

    Ok(envelope::success_with(
        "quiz submitted",
        json!({
            "score": graded.score,
            "points": graded.points,
            "total_points": graded.total_points,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_parse_each_wire_shape() {
        let raw: Map<String, Value> = serde_json::from_str(
            r#"{"1": 10, "2": [11, 12], "3": "free text"}"#,
        )
        .unwrap();
        let parsed = parse_answers(&raw).unwrap();
        assert_eq!(parsed[&1], Answer::Selected(10));
        assert_eq!(parsed[&2], Answer::SelectedMany(vec![11, 12]));
        assert_eq!(parsed[&3], Answer::Text("free text".to_owned()));
    }

    #[test]
    fn malformed_answer_keys_are_rejected() {
        let raw: Map<String, Value> = serde_json::from_str(r#"{"not-a-number": 1}"#).unwrap();
        assert!(matches!(parse_answers(&raw), Err(QuizError::MalformedAnswers(_))));

        let raw: Map<String, Value> = serde_json::from_str(r#"{"1": {"nested": true}}"#).unwrap();
        assert!(matches!(parse_answers(&raw), Err(QuizError::MalformedAnswers(_))));

        let raw: Map<String, Value> = serde_json::from_str(r#"{"1": 1.5}"#).unwrap();
        assert!(matches!(parse_answers(&raw), Err(QuizError::MalformedAnswers(_))));
    }
}
