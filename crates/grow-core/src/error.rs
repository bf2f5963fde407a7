use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rejected form field, reported back to the page that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum GrowError {
    #[error("not initialized: run 'grow init'")]
    NotInitialized,

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("unknown assessment kind: {0}")]
    InvalidKind(String),

    #[error("unknown audience: {0} (expected individual or organization)")]
    InvalidAudience(String),

    #[error("invalid question bank: {0}")]
    InvalidBank(String),

    #[error("question not found: {0}")]
    QuestionNotFound(u32),

    #[error("question {question} has no option '{option}'")]
    InvalidOption { question: u32, option: String },

    #[error("invalid wizard step: {0}")]
    InvalidStep(String),

    #[error("assessment response not found: {0}")]
    ResponseNotFound(String),

    #[error("assessment response already completed: {0}")]
    ResponseCompleted(String),

    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("lead not found: {0}")]
    LeadNotFound(String),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("coach not found: {0}")]
    CoachNotFound(String),

    #[error("post not found: {0}")]
    PostNotFound(u32),

    #[error("cart is empty")]
    EmptyCart,

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GrowError {
    /// Shorthand for a validation failure on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        GrowError::Validation(vec![FieldError::new(field, message)])
    }
}

pub type Result<T> = std::result::Result<T, GrowError>;
