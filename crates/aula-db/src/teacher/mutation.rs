use aula_entity::teacher::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        specialty: &str,
        grade: Option<String>,
        phone: Option<String>,
        bio: Option<String>,
    ) -> Result<Model, DbErr> {
        let teacher = ActiveModel {
            user_id: Set(user_id),
            specialty: Set(specialty.to_owned()),
            grade: Set(grade),
            phone: Set(phone),
            bio: Set(bio),
            ..Default::default()
        };
        Entity::insert(teacher).exec_with_returning(conn).await
    }
}
