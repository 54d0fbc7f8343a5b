use aula_entity::course::{ActiveModel, Entity, Model};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

/// Everything a teacher supplies when opening a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    pub requires_key: bool,
    pub enrollment_key: Option<String>,
    pub max_enrollments: i32,
}

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, teacher_id: i32, new: NewCourse) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let course = ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            category: Set(new.category),
            teacher_id: Set(teacher_id),
            is_public: Set(new.is_public),
            requires_key: Set(new.requires_key),
            enrollment_key: Set(new.enrollment_key),
            max_enrollments: Set(new.max_enrollments),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Entity::insert(course).exec_with_returning(conn).await
    }
}
