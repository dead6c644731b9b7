use anyhow::anyhow;
use quillboard_auth::{create_access_token, effective_permission_slugs};
use quillboard_config::JwtConfig;
use quillboard_core::{AppError, verify_password};
use quillboard_models::{CurrentUserResponse, LoginRequest, LoginResponse, User, UserCredentials};
use sqlx::PgPool;
use tracing::instrument;

use crate::metrics::track_login;
use crate::middleware::auth::AuthUser;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, name, email, password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            track_login(false);
            return Err(AppError::unauthorized("Invalid email or password".to_string()));
        };

        if !verify_password(&dto.password, &credentials.password)? {
            track_login(false);
            return Err(AppError::unauthorized("Invalid email or password".to_string()));
        }

        let access_token =
            create_access_token(credentials.id.get(), &credentials.email, jwt_config)?;
        track_login(true);

        Ok(LoginResponse {
            access_token,
            user: credentials.into(),
        })
    }

    /// The caller with the permission slugs the interface should expose.
    #[instrument(skip(db, auth_user), fields(user_id = auth_user.user_id()))]
    pub async fn current_user(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<CurrentUserResponse, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(auth_user.user_id())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let catalog: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM permissions ORDER BY slug")
                .fetch_all(db)
                .await?;

        let actor = &auth_user.actor;
        Ok(CurrentUserResponse {
            user,
            roles: actor.roles.iter().map(|r| r.slug.clone()).collect(),
            is_superadmin: actor.is_privileged(),
            effective_permission_slugs: effective_permission_slugs(actor, &catalog)
                .into_iter()
                .collect(),
        })
    }
}
