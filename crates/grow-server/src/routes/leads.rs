use axum::{extract::State, Json};
use grow_core::forms::{CoachApplication, ContactForm, DigitalTwinEnrollment, PlaybookRequest};
use grow_core::leads::{self, LeadForm};

use crate::error::AppError;
use crate::state::AppState;

/// Store one validated form and answer `{id, kind}` for the page's toast.
async fn submit(app: AppState, form: LeadForm) -> Result<Json<serde_json::Value>, AppError> {
    let _lock = app.lock_store().await;
    let root = app.root.clone();
    let lead = tokio::task::spawn_blocking(move || leads::submit(&root, form))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({
        "id": lead.id,
        "kind": lead.kind(),
        "created_at": lead.created_at,
    })))
}

/// POST /api/contact
pub async fn submit_contact(
    State(app): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    submit(app, LeadForm::Contact(form)).await
}

/// POST /api/leads/submit: "get the playbook"
pub async fn submit_playbook(
    State(app): State<AppState>,
    Json(form): Json<PlaybookRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    submit(app, LeadForm::Playbook(form)).await
}

/// POST /api/coaches/apply
pub async fn apply_as_coach(
    State(app): State<AppState>,
    Json(form): Json<CoachApplication>,
) -> Result<Json<serde_json::Value>, AppError> {
    submit(app, LeadForm::CoachApplication(form)).await
}

/// POST /api/digitaltwin/individual
pub async fn enroll_digital_twin(
    State(app): State<AppState>,
    Json(form): Json<DigitalTwinEnrollment>,
) -> Result<Json<serde_json::Value>, AppError> {
    submit(app, LeadForm::DigitalTwin(form)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn contact(message: &str) -> ContactForm {
        ContactForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            subject: None,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn contact_is_stored() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());
        let result = submit_contact(State(app), Json(contact("Please call me back.")))
            .await
            .unwrap();
        assert_eq!(result.0["id"], "L1");
        assert_eq!(result.0["kind"], "contact");
        assert_eq!(leads::list(dir.path(), None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn short_message_is_422() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());
        let err = submit_contact(State(app), Json(contact("hi")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn concurrent_submissions_keep_every_lead() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());
        let mut handles = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                submit_contact(State(app), Json(contact(&format!("Message number {i}"))))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let ids: Vec<String> = leads::list(dir.path(), None)
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains(&"L8".to_string()));
    }
}
