use crate::principal::ExtractPrincipal;
use aula_entity::user::Role;
use axum::RequestExt;
use axum::extract::{FromRequestParts, Request};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Cached;
use http::StatusCode;
use http::request::Parts;
use serde_derive::Serialize;
use std::collections::HashSet;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize)]
pub(crate) enum Permission {
    Basic, // any signed-in user
    Learn, // student features
    Teach, // teacher features
    Admin, // site administration
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
struct Session {
    permissions: HashSet<Permission>,
}

#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub(crate) struct Permissions(HashSet<Permission>);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = <ExtractPrincipal as FromRequestParts<S>>::from_request_parts(parts, state).await;
        let Ok(ExtractPrincipal(user)) = principal else {
            // Anonymous callers carry no permissions; the protected handlers'
            // own extractors answer 401 with the full envelope.
            return Ok(Session::default());
        };
        let permissions: Permissions = user.role.into();
        Ok(Session {
            permissions: permissions.0,
        })
    }
}

impl From<Role> for Permissions {
    fn from(role: Role) -> Self {
        let role_permission = match role {
            Role::Student => Permission::Learn,
            Role::Teacher => Permission::Teach,
            Role::Admin => Permission::Admin,
        };
        Self(HashSet::from([Permission::Basic, role_permission]))
    }
}

impl<S> FromRequestParts<S> for Permissions
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.permissions))
    }
}

pub(crate) async fn extract(request: &mut Request) -> Result<HashSet<Permission>, Response> {
    request
        .extract_parts::<Permissions>()
        .await
        .map(|permissions| permissions.0)
        .map_err(IntoResponse::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_carries_basic() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            let Permissions(set) = role.into();
            assert!(set.contains(&Permission::Basic));
            assert_eq!(set.len(), 2);
        }
    }

    #[test]
    fn roles_do_not_overlap() {
        let Permissions(student) = Role::Student.into();
        assert!(student.contains(&Permission::Learn));
        assert!(!student.contains(&Permission::Teach));
        assert!(!student.contains(&Permission::Admin));
    }
}
