use axum::{
    extract::{Path, State},
    Json,
};
use grow_core::bank::QuestionBank;
use grow_core::config::Config;
use grow_core::insights;
use grow_core::scoring::Answers;
use grow_core::types::AssessmentKind;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/assessments: every assessment with its audience and size
pub async fn list_assessments(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut list = Vec::new();
        for &kind in AssessmentKind::all() {
            let bank = QuestionBank::load(&root, kind)?;
            list.push(serde_json::json!({
                "kind": kind,
                "audience": kind.audience(),
                "title": bank.title,
                "description": bank.description,
                "question_count": bank.len(),
                "categories": bank.category_order(),
            }));
        }
        Ok::<_, grow_core::GrowError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

/// GET /api/assessments/:kind: the full question bank
pub async fn get_assessment(
    State(app): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind: AssessmentKind = kind.parse()?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let bank = QuestionBank::load(&root, kind)?;
        let mut json = serde_json::to_value(&bank)?;
        json["audience"] = serde_json::json!(kind.audience());
        Ok::<_, grow_core::GrowError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct ScoreBody {
    #[serde(default)]
    pub answers: Answers,
}

/// POST /api/assessments/:kind/score: score an answer map without storing it
pub async fn score_assessment(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<ScoreBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind: AssessmentKind = kind.parse()?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let bank = QuestionBank::load(&root, kind)?;
        let cfg = Config::load_or_default(&root)?;
        let report = insights::build_report(&bank, &body.answers, &cfg.scoring);
        tracing::debug!(kind = %kind, overall = report.overall, "scored answers");
        Ok::<_, grow_core::GrowError>(serde_json::to_value(&report)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
