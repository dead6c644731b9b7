use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use quillboard_auth::{Actor, ActorRole, Claims, PermissionGrant, evaluator, verify_token};
use quillboard_core::AppError;
use quillboard_core::permissions::{
    BLOGS_CREATE, BLOGS_DELETE, BLOGS_EDIT, BLOGS_VIEW, PERMISSIONS_CREATE, PERMISSIONS_DELETE,
    PERMISSIONS_EDIT, PERMISSIONS_VIEW, ROLES_CREATE, ROLES_DELETE, ROLES_EDIT, ROLES_VIEW,
};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use crate::state::AppState;

/// One `(role, grant)` pair of a user. Roles without grants appear once with
/// no permission.
#[derive(Debug, Clone, FromRow)]
pub struct ActorRow {
    pub role_slug: String,
    pub permission_slug: Option<String>,
    pub permission_active: Option<bool>,
}

/// Groups rows sorted by role into the evaluator's actor shape.
pub fn build_actor(id: i64, rows: Vec<ActorRow>) -> Actor {
    let mut roles: Vec<ActorRole> = Vec::new();

    for row in rows {
        if roles.last().is_none_or(|r| r.slug != row.role_slug) {
            roles.push(ActorRole {
                slug: row.role_slug,
                permissions: Vec::new(),
            });
        }

        if let (Some(role), Some(slug)) = (roles.last_mut(), row.permission_slug) {
            role.permissions.push(PermissionGrant {
                slug,
                is_active: row.permission_active.unwrap_or(false),
            });
        }
    }

    Actor { id, roles }
}

/// Loads the user's current roles and grants. `None` when the user is gone.
#[instrument(skip(db))]
pub async fn load_actor(db: &PgPool, user_id: i64) -> Result<Option<Actor>, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    if !exists {
        return Ok(None);
    }

    let rows = sqlx::query_as::<_, ActorRow>(
        "SELECT r.slug AS role_slug, p.slug AS permission_slug, p.is_active AS permission_active
         FROM user_roles ur
         JOIN roles r ON r.id = ur.role_id
         LEFT JOIN role_permissions rp ON rp.role_id = r.id
         LEFT JOIN permissions p ON p.id = rp.permission_id
         WHERE ur.user_id = $1
         ORDER BY r.slug, p.slug",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(Some(build_actor(user_id, rows)))
}

/// The authenticated caller. The token only identifies the user; roles and
/// grants are read from the database for every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub actor: Actor,
}

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.actor.id
    }

    pub fn has_permission(&self, slug: &str) -> bool {
        evaluator::has_permission(&self.actor, slug)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;
        let actor = load_actor(&state.db, claims.user_id()?)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists".to_string()))?;

        Ok(AuthUser { claims, actor })
    }
}

/// Defines an extractor that admits only actors holding `$permission`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = quillboard_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    tracing::debug!(
                        user_id = auth_user.user_id(),
                        permission = $permission,
                        "Permission denied"
                    );
                    return Err(quillboard_core::AppError::forbidden(
                        "Access denied".to_string(),
                    ));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_permission!(RequireBlogsView, BLOGS_VIEW);
require_permission!(RequireBlogsCreate, BLOGS_CREATE);
require_permission!(RequireBlogsEdit, BLOGS_EDIT);
require_permission!(RequireBlogsDelete, BLOGS_DELETE);

require_permission!(RequireRolesView, ROLES_VIEW);
require_permission!(RequireRolesCreate, ROLES_CREATE);
require_permission!(RequireRolesEdit, ROLES_EDIT);
require_permission!(RequireRolesDelete, ROLES_DELETE);

require_permission!(RequirePermissionsView, PERMISSIONS_VIEW);
require_permission!(RequirePermissionsCreate, PERMISSIONS_CREATE);
require_permission!(RequirePermissionsEdit, PERMISSIONS_EDIT);
require_permission!(RequirePermissionsDelete, PERMISSIONS_DELETE);

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, permission: Option<(&str, bool)>) -> ActorRow {
        ActorRow {
            role_slug: role.to_string(),
            permission_slug: permission.map(|(s, _)| s.to_string()),
            permission_active: permission.map(|(_, a)| a),
        }
    }

    fn auth_user(rows: Vec<ActorRow>) -> AuthUser {
        AuthUser {
            claims: Claims {
                sub: "7".to_string(),
                email: "editor@example.com".to_string(),
                exp: 9_999_999_999,
                iat: 1_700_000_000,
            },
            actor: build_actor(7, rows),
        }
    }

    #[test]
    fn test_build_actor_groups_by_role() {
        let actor = build_actor(
            7,
            vec![
                row("editor", Some(("blogs.create", true))),
                row("editor", Some(("blogs.view", true))),
                row("viewer", None),
            ],
        );
        assert_eq!(actor.id, 7);
        assert_eq!(actor.roles.len(), 2);
        assert_eq!(actor.roles[0].permissions.len(), 2);
        assert!(actor.roles[1].permissions.is_empty());
    }

    #[test]
    fn test_build_actor_without_roles() {
        let actor = build_actor(3, vec![]);
        assert!(actor.roles.is_empty());
        assert!(!evaluator::has_permission(&actor, BLOGS_VIEW));
    }

    #[test]
    fn test_inactive_grant_is_denied() {
        let user = auth_user(vec![
            row("editor", Some(("blogs.edit", false))),
            row("editor", Some(("blogs.view", true))),
        ]);
        assert!(user.has_permission(BLOGS_VIEW));
        assert!(!user.has_permission(BLOGS_EDIT));
    }

    #[test]
    fn test_superadmin_bypasses_grants() {
        let user = auth_user(vec![row("superadmin", None)]);
        assert!(user.has_permission(ROLES_DELETE));
        assert!(user.has_permission("anything.at.all"));
    }

    #[test]
    fn test_user_id_comes_from_actor() {
        assert_eq!(auth_user(vec![]).user_id(), 7);
    }
}
