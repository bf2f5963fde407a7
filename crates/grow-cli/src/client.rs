//! Submitting finished assessments to a running grow server.
//!
//! A submission that cannot reach the server is parked under
//! `.grow/pending/{id}.json` and retried by `grow assess sync`. Once the
//! server has accepted the answers the file keeps the server's response ID,
//! so a retry only completes that response instead of creating another.

use anyhow::Context;
use chrono::{DateTime, Utc};
use grow_core::forms::Respondent;
use grow_core::scoring::Answers;
use grow_core::types::AssessmentKind;
use grow_core::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub id: String,
    pub kind: AssessmentKind,
    pub respondent: Respondent,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
    /// Response ID on the server, set once the create call has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl PendingSubmission {
    pub fn new(kind: AssessmentKind, respondent: Respondent, answers: Answers) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            respondent,
            answers,
            created_at: Utc::now(),
            server_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub struct ApiClient {
    agent: ureq::Agent,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Create the response on the server (unless an earlier attempt already
    /// did), then ask it to score and close it. Returns the server-assigned
    /// response ID. `sub.server_id` is set as soon as the create succeeds, so
    /// a failed completion can be retried without duplicating the response.
    pub fn submit(&self, sub: &mut PendingSubmission) -> anyhow::Result<String> {
        let id = match &sub.server_id {
            Some(id) => id.clone(),
            None => {
                let id = self.create(sub)?;
                sub.server_id = Some(id.clone());
                id
            }
        };
        self.complete(sub.kind, &id)?;
        Ok(id)
    }

    fn create(&self, sub: &PendingSubmission) -> anyhow::Result<String> {
        let url = format!("{}/api/assessment/{}", self.base, sub.kind.audience());
        let created: serde_json::Value = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({
                "kind": sub.kind,
                "respondent": sub.respondent,
                "answers": sub.answers,
            }))
            .with_context(|| format!("POST {url}"))?
            .into_json()?;
        Ok(created["id"]
            .as_str()
            .context("server response has no id")?
            .to_string())
    }

    fn complete(&self, kind: AssessmentKind, id: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/assessment/{}/{id}", self.base, kind.audience());
        self.agent
            .request("PATCH", &url)
            .send_json(serde_json::json!({ "complete": true }))
            .with_context(|| format!("PATCH {url}"))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pending queue
// ---------------------------------------------------------------------------

pub fn save_pending(root: &Path, sub: &PendingSubmission) -> anyhow::Result<PathBuf> {
    let path = paths::pending_path(root, &sub.id);
    let data = serde_json::to_vec_pretty(sub)?;
    io::atomic_write(&path, &data)?;
    Ok(path)
}

/// Pending submissions, oldest first. Unreadable files are skipped with a warning.
pub fn load_pending(root: &Path) -> anyhow::Result<Vec<(PathBuf, PendingSubmission)>> {
    let dir = paths::pending_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let data = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<PendingSubmission>(&data) {
            Ok(sub) => out.push((path, sub)),
            Err(e) => tracing::warn!(path = %path.display(), "skipping pending file: {e}"),
        }
    }
    out.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn submission() -> PendingSubmission {
        let respondent = Respondent {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            organization: None,
            role: None,
        };
        let mut answers = Answers::new();
        answers.insert(1, "c".to_string());
        PendingSubmission::new(AssessmentKind::DigitalTwin, respondent, answers)
    }

    #[test]
    fn submit_creates_then_completes() {
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/api/assessment/individual")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc-123","status":"in_progress"}"#)
            .create();
        let complete = server
            .mock("PATCH", "/api/assessment/individual/abc-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc-123","status":"completed"}"#)
            .create();

        let mut sub = submission();
        let id = ApiClient::new(&server.url()).submit(&mut sub).unwrap();
        assert_eq!(id, "abc-123");
        assert_eq!(sub.server_id.as_deref(), Some("abc-123"));
        create.assert();
        complete.assert();
    }

    #[test]
    fn server_error_is_an_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/api/assessment/individual")
            .with_status(500)
            .create();
        let mut sub = submission();
        assert!(ApiClient::new(&server.url()).submit(&mut sub).is_err());
        assert!(sub.server_id.is_none());
    }

    #[test]
    fn failed_completion_retries_without_creating_again() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/api/assessment/individual")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc-123","status":"in_progress"}"#)
            .expect(1)
            .create();
        let broken = server
            .mock("PATCH", "/api/assessment/individual/abc-123")
            .with_status(500)
            .create();

        let api = ApiClient::new(&server.url());
        let mut sub = submission();
        assert!(api.submit(&mut sub).is_err());
        assert_eq!(sub.server_id.as_deref(), Some("abc-123"));
        save_pending(dir.path(), &sub).unwrap();
        broken.assert();
        broken.remove();

        let complete = server
            .mock("PATCH", "/api/assessment/individual/abc-123")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({ "complete": true }),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc-123","status":"completed"}"#)
            .create();

        let (_, mut parked) = load_pending(dir.path()).unwrap().remove(0);
        assert_eq!(api.submit(&mut parked).unwrap(), "abc-123");
        complete.assert();
        create.assert();
    }

    #[test]
    fn pending_files_round_trip() {
        let dir = TempDir::new().unwrap();
        let sub = submission();
        let path = save_pending(dir.path(), &sub).unwrap();
        assert!(path.ends_with(format!("{}.json", sub.id)));

        let loaded = load_pending(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].1.id, sub.id);
        assert_eq!(loaded[0].1.answers.get(&1).map(String::as_str), Some("c"));
    }

    #[test]
    fn no_pending_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_pending(dir.path()).unwrap().is_empty());
    }
}
