use axum::{
    extract::{Path, State},
    Json,
};
use grow_core::catalog;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/cart: the caller's cart, priced
pub async fn get_cart(
    me: CurrentUser,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let cart = catalog::view_cart(&root, &me.user.id)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&cart)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

fn one() -> u32 {
    1
}

#[derive(serde::Deserialize)]
pub struct AddBody {
    pub product: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

/// POST /api/cart: add a product
pub async fn add_item(
    me: CurrentUser,
    State(app): State<AppState>,
    Json(body): Json<AddBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let cart = catalog::add_to_cart(&root, &me.user.id, &body.product, body.quantity)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&cart)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// DELETE /api/cart/:slug: drop a product line
pub async fn remove_item(
    me: CurrentUser,
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let cart = catalog::remove_from_cart(&root, &me.user.id, &slug)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&cart)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// POST /api/cart/checkout: record the cart as a purchase
pub async fn checkout(
    me: CurrentUser,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let purchase = catalog::checkout(&root, &me.user.id)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&purchase)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// GET /api/user/products: everything the caller has bought
pub async fn user_products(
    me: CurrentUser,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let products = catalog::user_products(&root, &me.user.id)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&products)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}
