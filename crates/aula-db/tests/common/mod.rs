pub mod fixtures;

use sea_orm::{ConnectionTrait, DbConn, DbErr};

pub async fn setup_schema(db: &DbConn) -> Result<(), DbErr> {
    let schema = match db.get_database_backend() {
        sea_orm::DatabaseBackend::Sqlite => include_str!("sqlite.sql"),
        #[allow(clippy::unimplemented)]
        _ => unimplemented!("tests run against sqlite"),
    };
    db.execute_unprepared(schema).await?;
    Ok(())
}
