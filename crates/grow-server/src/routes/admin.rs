use axum::{
    extract::{Path, Query, State},
    Json,
};
use grow_core::leads::{self, LeadKind};
use grow_core::response::AssessmentResponse;
use grow_core::types::Audience;

use crate::auth::AdminAccess;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
pub struct LeadQuery {
    pub kind: Option<String>,
}

/// GET /api/admin/leads?kind=
pub async fn list_leads(
    _admin: AdminAccess,
    State(app): State<AppState>,
    Query(q): Query<LeadQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = q.kind.as_deref().map(str::parse::<LeadKind>).transpose()?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let list = leads::list(&root, kind)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&list)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// DELETE /api/admin/leads/:id
pub async fn delete_lead(
    admin: AdminAccess,
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let id_clone = id.clone();
    let deleted = tokio::task::spawn_blocking(move || leads::delete(&root, &id_clone))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if !deleted {
        return Err(AppError::not_found(format!("lead '{id}' not found")));
    }
    let by = admin.user.map(|u| u.email).unwrap_or_else(|| "admin token".to_string());
    tracing::info!(id = %id, by = %by, "lead deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
pub struct ResponseQuery {
    pub audience: Option<String>,
}

/// GET /api/admin/responses?audience=
pub async fn list_responses(
    _admin: AdminAccess,
    State(app): State<AppState>,
    Query(q): Query<ResponseQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let audience = q
        .audience
        .as_deref()
        .map(str::parse::<Audience>)
        .transpose()?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let list = AssessmentResponse::list(&root, audience)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&list)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}
