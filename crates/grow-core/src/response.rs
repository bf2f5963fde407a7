//! Stored assessment responses.
//!
//! Layout:
//!   .grow/responses/{individual|organization}/{id}.yaml
//!
//! A response is created when the respondent finishes the identity step,
//! accumulates answers, and is closed by `complete`, which stores the score
//! report next to the answers.

use crate::bank::QuestionBank;
use crate::config::ScoringConfig;
use crate::error::{GrowError, Result};
use crate::forms::Respondent;
use crate::insights::{self, ScoreReport};
use crate::scoring::Answers;
use crate::types::{AssessmentKind, Audience};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub id: String,
    pub kind: AssessmentKind,
    pub audience: Audience,
    pub respondent: Respondent,
    #[serde(default)]
    pub answers: Answers,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssessmentResponse {
    pub fn new(kind: AssessmentKind, respondent: Respondent) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            audience: kind.audience(),
            respondent,
            answers: Answers::new(),
            status: ResponseStatus::InProgress,
            report: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Validate the respondent and persist a fresh in-progress response for
    /// `bank`, seeded with any answers given up front.
    pub fn start(
        root: &Path,
        bank: &QuestionBank,
        respondent: Respondent,
        answers: &Answers,
    ) -> Result<Self> {
        respondent.validate()?;
        let mut response = Self::new(bank.kind, respondent);
        response.record_answers(bank, answers)?;
        response.save(root)?;
        tracing::info!(id = %response.id, kind = %bank.kind, "assessment started");
        Ok(response)
    }

    pub fn load(root: &Path, audience: Audience, id: &str) -> Result<Self> {
        if !paths::validate_file_id(id) {
            return Err(GrowError::ResponseNotFound(id.to_string()));
        }
        let path = paths::response_path(root, audience, id);
        if !path.exists() {
            return Err(GrowError::ResponseNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Look a response up under either audience.
    pub fn find(root: &Path, id: &str) -> Result<Self> {
        for &audience in Audience::all() {
            match Self::load(root, audience, id) {
                Err(GrowError::ResponseNotFound(_)) => continue,
                other => return other,
            }
        }
        Err(GrowError::ResponseNotFound(id.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::response_path(root, self.audience, &self.id), self)
    }

    /// All stored responses, oldest first.
    pub fn list(root: &Path, audience: Option<Audience>) -> Result<Vec<Self>> {
        let audiences: Vec<Audience> = match audience {
            Some(a) => vec![a],
            None => Audience::all().to_vec(),
        };
        let mut out = Vec::new();
        for a in audiences {
            let dir = paths::responses_dir(root, a);
            if !dir.exists() {
                continue;
            }
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                    continue;
                }
                let data = std::fs::read_to_string(&path)?;
                out.push(serde_yaml::from_str::<Self>(&data)?);
            }
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    pub fn is_completed(&self) -> bool {
        self.status == ResponseStatus::Completed
    }

    /// Merge `answers` into the response after checking each against `bank`.
    pub fn record_answers(&mut self, bank: &QuestionBank, answers: &Answers) -> Result<()> {
        if self.is_completed() {
            return Err(GrowError::ResponseCompleted(self.id.clone()));
        }
        bank.check_answers(answers)?;
        self.answers
            .extend(answers.iter().map(|(k, v)| (*k, v.clone())));
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Score the recorded answers and close the response.
    pub fn complete(&mut self, bank: &QuestionBank, cfg: &ScoringConfig) -> Result<&ScoreReport> {
        if self.is_completed() {
            return Err(GrowError::ResponseCompleted(self.id.clone()));
        }
        let report = insights::build_report(bank, &self.answers, cfg);
        let now = Utc::now();
        self.status = ResponseStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        tracing::info!(id = %self.id, kind = %self.kind, overall = report.overall, "assessment completed");
        Ok(&*self.report.insert(report))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
