use axum::{
    extract::{Path, Query, State},
    Json,
};
use grow_core::community::{self, Author, NewPost, Post};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Public shape of a post: counts instead of the raw user ID lists, plus the
/// caller's own like/bookmark state when signed in.
fn post_to_json(p: &Post, viewer: Option<&str>) -> serde_json::Value {
    let mine = |set: &[String]| viewer.is_some_and(|v| set.iter().any(|u| u == v));
    serde_json::json!({
        "id": p.id,
        "author_id": p.author_id,
        "author_name": p.author_name,
        "title": p.title,
        "body": p.body,
        "tags": p.tags,
        "like_count": p.likes.len(),
        "liked": mine(p.likes.as_slice()),
        "bookmarked": mine(p.bookmarks.as_slice()),
        "comments": p.comments,
        "created_at": p.created_at,
    })
}

// ---------------------------------------------------------------------------
// List / show
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
}

/// GET /api/community/posts?q=&tag=
pub async fn list_posts(
    me: Option<CurrentUser>,
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let viewer = me.map(|m| m.user.id);
    let result = tokio::task::spawn_blocking(move || {
        let posts = community::list(&root, query.q.as_deref(), query.tag.as_deref())?;
        let list: Vec<serde_json::Value> = posts
            .iter()
            .map(|p| post_to_json(p, viewer.as_deref()))
            .collect();
        Ok::<_, grow_core::GrowError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// GET /api/community/posts/:id
pub async fn get_post(
    me: Option<CurrentUser>,
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let viewer = me.map(|m| m.user.id);
    let result = tokio::task::spawn_blocking(move || {
        let post = community::get(&root, id)?;
        Ok::<_, grow_core::GrowError>(post_to_json(&post, viewer.as_deref()))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// POST /api/community/posts
pub async fn create_post(
    me: CurrentUser,
    State(app): State<AppState>,
    Json(body): Json<NewPost>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let author = Author {
            id: &me.user.id,
            name: &me.user.name,
        };
        let post = community::create(&root, author, body)?;
        Ok::<_, grow_core::GrowError>(post_to_json(&post, Some(me.user.id.as_str())))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// DELETE /api/community/posts/:id: authors delete their own posts; admins any
pub async fn delete_post(
    me: CurrentUser,
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || {
        community::delete(&root, id, &me.user.id, me.user.is_admin())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct CommentBody {
    pub body: String,
}

/// POST /api/community/posts/:id/comments
pub async fn add_comment(
    me: CurrentUser,
    State(app): State<AppState>,
    Path(id): Path<u32>,
    Json(body): Json<CommentBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let author = Author {
            id: &me.user.id,
            name: &me.user.name,
        };
        let comment = community::add_comment(&root, id, author, &body.body)?;
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&comment)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

/// POST /api/community/posts/:id/like: toggle
pub async fn toggle_like(
    me: CurrentUser,
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let (liked, count) =
        tokio::task::spawn_blocking(move || community::toggle_like(&root, id, &me.user.id))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "liked": liked, "like_count": count })))
}

/// POST /api/community/posts/:id/bookmark: toggle
pub async fn toggle_bookmark(
    me: CurrentUser,
    State(app): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let marked =
        tokio::task::spawn_blocking(move || community::toggle_bookmark(&root, id, &me.user.id))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "bookmarked": marked })))
}

/// GET /api/community/bookmarks
pub async fn list_bookmarks(
    me: CurrentUser,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let posts = community::bookmarks_for(&root, &me.user.id)?;
        let list: Vec<serde_json::Value> = posts
            .iter()
            .map(|p| post_to_json(p, Some(me.user.id.as_str())))
            .collect();
        Ok::<_, grow_core::GrowError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}
