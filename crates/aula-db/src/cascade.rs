//! Ordered removal of an entity and everything that references it.
//!
//! The store does not cascade foreign keys on its own, so dependents are
//! deleted leaves-first. Callers run these inside a single transaction so a
//! mid-sequence failure cannot leave orphaned rows.

use aula_entity::assignment::{assignment, file as assignment_file, submission as assignment_submission};
use aula_entity::forum::{like, post, topic};
use aula_entity::quiz::{option as question_option, question, quiz, submission as quiz_submission};
use aula_entity::{completed_resource, course, course_material, enrollment};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

async fn assignment_ids<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<Vec<i32>, DbErr> {
    assignment::Entity::find()
        .filter(assignment::Column::CourseId.eq(course_id))
        .select_only()
        .column(assignment::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

async fn quiz_ids<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<Vec<i32>, DbErr> {
    quiz::Entity::find()
        .filter(quiz::Column::CourseId.eq(course_id))
        .select_only()
        .column(quiz::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

async fn question_ids<C: ConnectionTrait>(conn: &C, quiz_ids: &[i32]) -> Result<Vec<i32>, DbErr> {
    if quiz_ids.is_empty() {
        return Ok(Vec::new());
    }
    question::Entity::find()
        .filter(question::Column::QuizId.is_in(quiz_ids.to_vec()))
        .select_only()
        .column(question::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

async fn material_ids<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<Vec<i32>, DbErr> {
    course_material::Entity::find()
        .filter(course_material::Column::CourseId.eq(course_id))
        .select_only()
        .column(course_material::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

async fn topic_ids<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<Vec<i32>, DbErr> {
    topic::Entity::find()
        .filter(topic::Column::CourseId.eq(course_id))
        .select_only()
        .column(topic::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

async fn post_ids<C: ConnectionTrait>(conn: &C, topic_ids: &[i32]) -> Result<Vec<i32>, DbErr> {
    if topic_ids.is_empty() {
        return Ok(Vec::new());
    }
    post::Entity::find()
        .filter(post::Column::TopicId.is_in(topic_ids.to_vec()))
        .select_only()
        .column(post::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

/// Deletes a course and every dependent row, leaves first. Does not touch
/// the owning teacher.
pub async fn delete_course<C: ConnectionTrait>(conn: &C, course_id: i32) -> Result<(), DbErr> {
    let assignments = assignment_ids(conn, course_id).await?;
    if !assignments.is_empty() {
        assignment_submission::Entity::delete_many()
            .filter(assignment_submission::Column::AssignmentId.is_in(assignments.clone()))
            .exec(conn)
            .await?;
        assignment_file::Entity::delete_many()
            .filter(assignment_file::Column::AssignmentId.is_in(assignments))
            .exec(conn)
            .await?;
    }
    assignment::Entity::delete_many()
        .filter(assignment::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;

    let quizzes = quiz_ids(conn, course_id).await?;
    let questions = question_ids(conn, &quizzes).await?;
    if !questions.is_empty() {
        question_option::Entity::delete_many()
            .filter(question_option::Column::QuestionId.is_in(questions.clone()))
            .exec(conn)
            .await?;
        question::Entity::delete_many()
            .filter(question::Column::Id.is_in(questions))
            .exec(conn)
            .await?;
    }
    if !quizzes.is_empty() {
        quiz_submission::Entity::delete_many()
            .filter(quiz_submission::Column::QuizId.is_in(quizzes.clone()))
            .exec(conn)
            .await?;
        quiz::Entity::delete_many()
            .filter(quiz::Column::Id.is_in(quizzes))
            .exec(conn)
            .await?;
    }

    let materials = material_ids(conn, course_id).await?;
    if !materials.is_empty() {
        completed_resource::Entity::delete_many()
            .filter(completed_resource::Column::MaterialId.is_in(materials.clone()))
            .exec(conn)
            .await?;
        course_material::Entity::delete_many()
            .filter(course_material::Column::Id.is_in(materials))
            .exec(conn)
            .await?;
    }

    let topics = topic_ids(conn, course_id).await?;
    let posts = post_ids(conn, &topics).await?;
    if !posts.is_empty() {
        like::Entity::delete_many()
            .filter(like::Column::PostId.is_in(posts.clone()))
            .exec(conn)
            .await?;
        post::Entity::delete_many()
            .filter(post::Column::Id.is_in(posts))
            .exec(conn)
            .await?;
    }
    if !topics.is_empty() {
        topic::Entity::delete_many()
            .filter(topic::Column::Id.is_in(topics))
            .exec(conn)
            .await?;
    }

    enrollment::Entity::delete_many()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;

    course::Entity::delete_by_id(course_id).exec(conn).await?;

    tracing::debug!(%course_id, "course cascade complete");
    Ok(())
}

/// Deletes a teacher, every course the teacher owns, then the teacher and
/// its user row. Returns the number of courses removed.
pub async fn delete_teacher<C: ConnectionTrait>(conn: &C, teacher_id: i32, user_id: i32) -> Result<u64, DbErr> {
    let courses: Vec<i32> = course::Entity::find()
        .filter(course::Column::TeacherId.eq(teacher_id))
        .select_only()
        .column(course::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;
    let removed = courses.len() as u64;

    for course_id in courses {
        delete_course(conn, course_id).await?;
    }

    aula_entity::teacher::Entity::delete_by_id(teacher_id).exec(conn).await?;
    aula_entity::auth_session::Entity::delete_many()
        .filter(aula_entity::auth_session::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    aula_entity::user::Entity::delete_by_id(user_id).exec(conn).await?;

    tracing::debug!(%teacher_id, %user_id, removed, "teacher cascade complete");
    Ok(removed)
}

/// Deletes a student's work product, the student row, then its user row.
pub async fn delete_student<C: ConnectionTrait>(conn: &C, student_id: i32, user_id: i32) -> Result<(), DbErr> {
    assignment_submission::Entity::delete_many()
        .filter(assignment_submission::Column::StudentId.eq(student_id))
        .exec(conn)
        .await?;
    quiz_submission::Entity::delete_many()
        .filter(quiz_submission::Column::StudentId.eq(student_id))
        .exec(conn)
        .await?;
    completed_resource::Entity::delete_many()
        .filter(completed_resource::Column::StudentId.eq(student_id))
        .exec(conn)
        .await?;
    enrollment::Entity::delete_many()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .exec(conn)
        .await?;

    // Forum contributions hang off the user, not the student row.
    like::Entity::delete_many()
        .filter(like::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    post::Entity::delete_many()
        .filter(post::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    aula_entity::student::Entity::delete_by_id(student_id).exec(conn).await?;
    aula_entity::auth_session::Entity::delete_many()
        .filter(aula_entity::auth_session::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    aula_entity::user::Entity::delete_by_id(user_id).exec(conn).await?;

    tracing::debug!(%student_id, %user_id, "student cascade complete");
    Ok(())
}
