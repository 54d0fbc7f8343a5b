use aula_db::user;
use aula_entity::user::Role;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};

/// Applies the embedded schema. Every statement is `IF NOT EXISTS`, so
/// reapplying on a populated store is a no-op.
pub(crate) async fn apply_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = match conn.get_database_backend() {
        #[cfg(feature = "sqlite")]
        sea_orm::DatabaseBackend::Sqlite => include_str!("db/sqlite.sql"),
        #[cfg(feature = "postgres")]
        sea_orm::DatabaseBackend::Postgres => include_str!("db/postgres.sql"),
        other => return Err(DbErr::Custom(format!("unsupported database backend {other:?}"))),
    };
    conn.execute_unprepared(schema).await?;
    tracing::debug!("schema applied");
    Ok(())
}

/// Creates the admin account once; subsequent starts with the same email
/// leave the existing row alone.
pub(crate) async fn provision_admin(conn: &DatabaseConnection, email: &str, password: &str) -> anyhow::Result<()> {
    if user::Query::find_by_email(conn, email).await?.is_some() {
        tracing::debug!(%email, "admin account already present");
        return Ok(());
    }

    let hash = crate::auth::hash_password(password)?;
    let admin = user::Mutation::create(conn, email, &hash, Role::Admin, "Site", "Admin").await?;
    tracing::info!(admin_id = %admin.id, %email, "provisioned admin account");
    Ok(())
}
