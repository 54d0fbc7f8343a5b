use aula_entity::completed_resource;
use aula_entity::course_material::{ActiveModel, Entity, Model};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub description: Option<String>,
    pub file_type: Option<String>,
    pub file_path: String,
    pub file_size: i64,
    pub order_index: i32,
    pub is_published: bool,
}

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, course_id: i32, new: NewMaterial) -> Result<Model, DbErr> {
        let material = ActiveModel {
            course_id: Set(course_id),
            title: Set(new.title),
            description: Set(new.description),
            file_type: Set(new.file_type),
            file_path: Set(new.file_path),
            file_size: Set(new.file_size),
            order_index: Set(new.order_index),
            is_published: Set(new.is_published),
            upload_date: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        Entity::insert(material).exec_with_returning(conn).await
    }

    /// Marks a material consumed by a student. Re-marking is a no-op.
    pub async fn mark_completed<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        material_id: i32,
    ) -> Result<(), DbErr> {
        if super::Query::is_completed(conn, student_id, material_id).await? {
            return Ok(());
        }
        let record = completed_resource::ActiveModel {
            student_id: Set(student_id),
            material_id: Set(material_id),
            completed_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        completed_resource::Entity::insert(record).exec(conn).await?;
        Ok(())
    }
}
