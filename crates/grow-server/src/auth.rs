//! Bearer-token extractors for user and admin routes.
//!
//! Tokens come from `POST /api/auth/login` and travel as
//! `Authorization: Bearer <token>`. Admin routes also accept the configured
//! `auth.admin_token`.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use grow_core::accounts::{self, User};
use grow_core::config::Config;
use grow_core::GrowError;

use crate::error::AppError;
use crate::state::AppState;

/// Pull the token out of an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// The signed-in caller.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, app: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or_else(AppError::unauthorized)?;
        let root = app.root.clone();
        let lookup = token.clone();
        let user = tokio::task::spawn_blocking(move || accounts::authenticate(&root, &lookup))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(CurrentUser { user, token })
    }
}

/// Public pages take the caller if there is one. A stale or unknown token
/// reads as anonymous rather than failing the request.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &AppState,
    ) -> Result<Option<Self>, AppError> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(None);
        }
        match <CurrentUser as FromRequestParts<AppState>>::from_request_parts(parts, app).await {
            Ok(me) => Ok(Some(me)),
            Err(AppError(e)) if matches!(e.downcast_ref::<GrowError>(), Some(GrowError::Unauthorized)) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// A caller allowed onto admin routes: either an `admin` user or the holder
/// of the configured admin token.
pub struct AdminAccess {
    /// `None` when access came from the shared admin token.
    pub user: Option<User>,
}

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, app: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or_else(AppError::unauthorized)?;
        let root = app.root.clone();
        let user = tokio::task::spawn_blocking(move || {
            let cfg = Config::load_or_default(&root)?;
            if cfg.auth.admin_token.as_deref() == Some(token.as_str()) {
                return Ok::<_, GrowError>(None);
            }
            accounts::authenticate(&root, &token).map(Some)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

        match user {
            None => Ok(AdminAccess { user: None }),
            Some(u) if u.is_admin() => Ok(AdminAccess { user: Some(u) }),
            Some(u) => {
                tracing::warn!(user = %u.email, "non-admin tried an admin route");
                Err(AppError::forbidden("admin role required"))
            }
        }
    }
}
