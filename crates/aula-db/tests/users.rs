mod common;

use crate::common::fixtures::create_student;
use crate::common::setup_schema;
use aula_db::{auth_session, user};
use sea_orm::Database;
use test_log::test;

#[test(tokio::test)]
async fn a_session_token_resolves_to_its_user() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (account, _) = create_student(db, "s@example.com", "CARD-1").await;
    let session = auth_session::Mutation::create(db, account.id, 3600).await.unwrap();

    let resolved = auth_session::Query::find_user_by_token(db, &session.token)
        .await
        .unwrap()
        .expect("token should resolve");
    assert_eq!(resolved.id, account.id);

    assert!(
        auth_session::Query::find_user_by_token(db, "not-a-token")
            .await
            .unwrap()
            .is_none()
    );
}

#[test(tokio::test)]
async fn expired_sessions_do_not_resolve() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (account, _) = create_student(db, "s@example.com", "CARD-1").await;
    let session = auth_session::Mutation::create(db, account.id, -1).await.unwrap();

    assert!(
        auth_session::Query::find_user_by_token(db, &session.token)
            .await
            .unwrap()
            .is_none()
    );
}

#[test(tokio::test)]
async fn deactivated_users_cannot_use_their_sessions() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (account, _) = create_student(db, "s@example.com", "CARD-1").await;
    let session = auth_session::Mutation::create(db, account.id, 3600).await.unwrap();

    user::Mutation::set_active(db, account.id, false).await.unwrap();
    assert!(
        auth_session::Query::find_user_by_token(db, &session.token)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        user::Query::find_active_by_email(db, "s@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[test(tokio::test)]
async fn logout_invalidates_only_the_presented_token() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (account, _) = create_student(db, "s@example.com", "CARD-1").await;
    let keep = auth_session::Mutation::create(db, account.id, 3600).await.unwrap();
    let drop = auth_session::Mutation::create(db, account.id, 3600).await.unwrap();

    auth_session::Mutation::delete_by_token(db, &drop.token).await.unwrap();

    assert!(auth_session::Query::find_user_by_token(db, &drop.token).await.unwrap().is_none());
    assert!(auth_session::Query::find_user_by_token(db, &keep.token).await.unwrap().is_some());
}

#[test(tokio::test)]
async fn toggling_active_state_is_idempotent() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    let (account, _) = create_student(db, "s@example.com", "CARD-1").await;

    let once = user::Mutation::set_active(db, account.id, false).await.unwrap();
    assert!(!once.is_active);
    // Deactivating an already-inactive user still succeeds.
    let twice = user::Mutation::set_active(db, account.id, false).await.unwrap();
    assert!(!twice.is_active);

    let back = user::Mutation::set_active(db, account.id, true).await.unwrap();
    assert!(back.is_active);
}

#[test(tokio::test)]
async fn emails_and_student_cards_are_unique() {
    let db = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(db).await.unwrap();

    create_student(db, "s@example.com", "CARD-1").await;

    let dup_email = user::Mutation::create(
        db,
        "s@example.com",
        "hash",
        aula_entity::user::Role::Student,
        "Other",
        "Person",
    )
    .await;
    assert!(dup_email.is_err());

    let other = user::Mutation::create(
        db,
        "other@example.com",
        "hash",
        aula_entity::user::Role::Student,
        "Other",
        "Person",
    )
    .await
    .unwrap();
    let dup_card = aula_db::student::Mutation::create(db, other.id, "CARD-1", 2).await;
    assert!(dup_card.is_err());
}
