use axum::{
    extract::{Path, State},
    Json,
};
use grow_core::bank::QuestionBank;
use grow_core::config::Config;
use grow_core::forms::Respondent;
use grow_core::response::AssessmentResponse;
use grow_core::scoring::Answers;
use grow_core::types::{AssessmentKind, Audience};
use grow_core::GrowError;

use crate::error::AppError;
use crate::state::AppState;

fn check_audience(kind: AssessmentKind, audience: Audience) -> Result<(), GrowError> {
    if kind.audience() != audience {
        return Err(GrowError::InvalidKind(format!(
            "{kind} is not an {audience} assessment"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct StartBody {
    pub kind: String,
    pub respondent: Respondent,
    /// Answers collected before the response was created, if any.
    #[serde(default)]
    pub answers: Answers,
}

/// POST /api/assessment/:audience: create an in-progress response
pub async fn start_response(
    State(app): State<AppState>,
    Path(audience): Path<String>,
    Json(body): Json<StartBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let audience: Audience = audience.parse()?;
    let kind: AssessmentKind = body.kind.parse()?;
    check_audience(kind, audience)?;

    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let bank = QuestionBank::load(&root, kind)?;
        let response = AssessmentResponse::start(&root, &bank, body.respondent, &body.answers)?;
        Ok::<_, GrowError>(serde_json::to_value(&response)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

/// GET /api/assessment/:audience/:id
pub async fn get_response(
    State(app): State<AppState>,
    Path((audience, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let audience: Audience = audience.parse()?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let response = AssessmentResponse::load(&root, audience, &id)?;
        Ok::<_, GrowError>(serde_json::to_value(&response)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct UpdateBody {
    #[serde(default)]
    pub answers: Answers,
    /// Score and close the response after saving the answers.
    #[serde(default)]
    pub complete: bool,
}

/// PATCH /api/assessment/:audience/:id: save answers, optionally complete.
/// The report is always recomputed here; a client-side score is never trusted.
pub async fn update_response(
    State(app): State<AppState>,
    Path((audience, id)): Path<(String, String)>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let audience: Audience = audience.parse()?;
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut response = AssessmentResponse::load(&root, audience, &id)?;
        let bank = QuestionBank::load(&root, response.kind)?;
        response.record_answers(&bank, &body.answers)?;
        if body.complete {
            let cfg = Config::load_or_default(&root)?;
            response.complete(&bank, &cfg.scoring)?;
        }
        response.save(&root)?;
        Ok::<_, GrowError>(serde_json::to_value(&response)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
