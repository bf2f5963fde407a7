use axum::{
    extract::{Path, State},
    Json,
};
use grow_core::catalog::Catalog;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/products
pub async fn list_products(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let catalog = Catalog::load(&root)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&catalog.products)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// GET /api/products/:slug
pub async fn get_product(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let catalog = Catalog::load(&root)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(catalog.product(&slug)?)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// GET /api/coaches
pub async fn list_coaches(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let catalog = Catalog::load(&root)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&catalog.coaches)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// GET /api/coaches/:slug: coach profile
pub async fn get_coach(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let catalog = Catalog::load(&root)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(catalog.coach(&slug)?)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}
