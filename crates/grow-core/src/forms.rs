//! Intake forms and their field validation.
//!
//! Every form collects *all* field problems before failing so the page can
//! highlight each one at once.

use crate::error::{FieldError, GrowError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const MAX_NAME: usize = 120;
const MAX_TEXT: usize = 5000;
const MIN_MESSAGE: usize = 10;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_re().is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_re().is_match(phone.trim())
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub(crate) fn required(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let v = value.trim();
        if v.is_empty() {
            self.errors.push(FieldError::new(field, "is required"));
        } else if v.chars().count() > max {
            self.errors
                .push(FieldError::new(field, format!("must be at most {max} characters")));
        }
        self
    }

    pub(crate) fn optional(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            if v.trim().chars().count() > max {
                self.errors
                    .push(FieldError::new(field, format!("must be at most {max} characters")));
            }
        }
        self
    }

    pub(crate) fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "is required"));
        } else if !is_valid_email(value) {
            self.errors
                .push(FieldError::new(field, "is not a valid email address"));
        }
        self
    }

    pub(crate) fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            if !is_valid_phone(v) {
                self.errors
                    .push(FieldError::new(field, "is not a valid phone number"));
            }
        }
        self
    }

    pub(crate) fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        let n = value.trim().chars().count();
        if n > 0 && n < min {
            self.errors
                .push(FieldError::new(field, format!("must be at least {min} characters")));
        }
        self
    }

    pub(crate) fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(GrowError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

// ---------------------------------------------------------------------------
// Respondent
// ---------------------------------------------------------------------------

/// Identity collected on the first step of every assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Respondent {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Respondent {
    pub fn validate(&self) -> Result<()> {
        Validator::default()
            .required("name", &self.name, MAX_NAME)
            .email("email", &self.email)
            .optional("organization", self.organization.as_deref(), MAX_NAME)
            .optional("role", self.role.as_deref(), MAX_NAME)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<()> {
        Validator::default()
            .required("name", &self.name, MAX_NAME)
            .email("email", &self.email)
            .phone("phone", self.phone.as_deref())
            .optional("subject", self.subject.as_deref(), 200)
            .required("message", &self.message, MAX_TEXT)
            .min_len("message", &self.message, MIN_MESSAGE)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Get the playbook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

impl PlaybookRequest {
    pub fn validate(&self) -> Result<()> {
        Validator::default()
            .required("name", &self.name, MAX_NAME)
            .email("email", &self.email)
            .optional("company", self.company.as_deref(), MAX_NAME)
            .optional("role", self.role.as_deref(), MAX_NAME)
            .check(self.consent, "consent", "must be accepted to receive the playbook")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Join as coach
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachApplication {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub years_experience: u32,
    pub bio: String,
}

impl CoachApplication {
    pub fn validate(&self) -> Result<()> {
        let linkedin_ok = self
            .linkedin
            .as_deref()
            .map(|l| l.trim().is_empty() || l.starts_with("https://"))
            .unwrap_or(true);
        Validator::default()
            .required("name", &self.name, MAX_NAME)
            .email("email", &self.email)
            .phone("phone", self.phone.as_deref())
            .check(linkedin_ok, "linkedin", "must be an https:// link")
            .check(
                !self.expertise.iter().all(|e| e.trim().is_empty()),
                "expertise",
                "select at least one area",
            )
            .check(self.years_experience <= 60, "years_experience", "is out of range")
            .required("bio", &self.bio, MAX_TEXT)
            .min_len("bio", &self.bio, 50)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Digital twin enrollment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalTwinEnrollment {
    pub name: String,
    pub email: String,
    pub career_stage: String,
    #[serde(default)]
    pub goals: Vec<String>,
    /// Response id of a completed digital twin assessment, if taken first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
}

pub const CAREER_STAGES: &[&str] = &["student", "early", "mid", "senior", "executive", "transition"];

impl DigitalTwinEnrollment {
    pub fn validate(&self) -> Result<()> {
        let goals_ok = self.goals.iter().any(|g| !g.trim().is_empty());
        Validator::default()
            .required("name", &self.name, MAX_NAME)
            .email("email", &self.email)
            .check(
                CAREER_STAGES.contains(&self.career_stage.as_str()),
                "career_stage",
                "must be one of student, early, mid, senior, executive, transition",
            )
            .check(goals_ok, "goals", "list at least one goal")
            .check(self.goals.len() <= 10, "goals", "list at most ten goals")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
