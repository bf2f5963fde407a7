use axum::{extract::State, Json};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/site: public site settings
pub async fn get_site(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let cfg = grow_core::config::Config::load_or_default(&root)?;
        Ok::<_, grow_core::GrowError>(serde_json::json!({
            "name": cfg.site.name,
            "tagline": cfg.site.tagline,
            "contact_email": cfg.site.contact_email,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uninitialized_root_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());
        let result = get_site(State(app)).await.unwrap();
        assert_eq!(result.0["name"], "grow");
    }

    #[tokio::test]
    async fn reads_configured_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = grow_core::config::Config::new("Grow Coaching");
        cfg.site.tagline = Some("Keep growing".to_string());
        cfg.save(dir.path()).unwrap();

        let app = AppState::new(dir.path().to_path_buf());
        let result = get_site(State(app)).await.unwrap();
        assert_eq!(result.0["name"], "Grow Coaching");
        assert_eq!(result.0["tagline"], "Keep growing");
    }
}
