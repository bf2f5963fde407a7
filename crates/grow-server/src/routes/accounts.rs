use axum::{extract::State, Json};
use grow_core::accounts::{self, Role, UserSummary};
use grow_core::config::Config;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// POST /api/auth/register: always creates a `member`
pub async fn register(
    State(app): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || {
        accounts::register(&root, &body.email, &body.name, &body.password, Role::Member)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!(UserSummary::from(&user))))
}

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login: `{token, expires_at, user}`
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let ttl = Config::load_or_default(&root)?.auth.session_ttl_hours;
        let (user, session) = accounts::login(&root, &body.email, &body.password, ttl)?;
        Ok::<_, grow_core::GrowError>(serde_json::json!({
            "token": session.token,
            "expires_at": session.expires_at,
            "user": UserSummary::from(&user),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// POST /api/auth/logout
pub async fn logout(
    me: CurrentUser,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || accounts::logout(&root, &me.token))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "logged_out": true })))
}

/// GET /api/auth/me
pub async fn me(me: CurrentUser) -> Json<serde_json::Value> {
    Json(serde_json::json!(UserSummary::from(&me.user)))
}
