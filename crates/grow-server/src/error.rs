use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grow_core::error::GrowError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 Not Found errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain for
/// lookups that have no dedicated `GrowError` variant.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    pub fn unauthorized() -> Self {
        Self(GrowError::Unauthorized.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(GrowError::Forbidden(msg.into()).into())
    }
}

fn status_for(e: &GrowError) -> StatusCode {
    match e {
        GrowError::NotInitialized
        | GrowError::InvalidSlug(_)
        | GrowError::InvalidKind(_)
        | GrowError::InvalidAudience(_)
        | GrowError::QuestionNotFound(_)
        | GrowError::InvalidOption { .. }
        | GrowError::InvalidStep(_)
        | GrowError::EmptyCart => StatusCode::BAD_REQUEST,
        GrowError::InvalidCredentials | GrowError::Unauthorized => StatusCode::UNAUTHORIZED,
        GrowError::Forbidden(_) => StatusCode::FORBIDDEN,
        GrowError::ResponseNotFound(_)
        | GrowError::LeadNotFound(_)
        | GrowError::ProductNotFound(_)
        | GrowError::CoachNotFound(_)
        | GrowError::PostNotFound(_)
        | GrowError::UserNotFound(_) => StatusCode::NOT_FOUND,
        GrowError::ResponseCompleted(_) | GrowError::UserExists(_) => StatusCode::CONFLICT,
        GrowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GrowError::InvalidBank(_)
        | GrowError::Io(_)
        | GrowError::Yaml(_)
        | GrowError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": n.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }

        let Some(e) = self.0.downcast_ref::<GrowError>() else {
            tracing::error!(error = %self.0, "unhandled error");
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        let status = status_for(e);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %e, "request failed");
        }
        let body = match e {
            GrowError::Validation(fields) => serde_json::json!({
                "error": e.to_string(),
                "fields": fields,
            }),
            _ => serde_json::json!({ "error": e.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grow_core::FieldError;
    use http_body_util::BodyExt;

    fn status(e: GrowError) -> StatusCode {
        AppError(e.into()).into_response().status()
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(status(GrowError::LeadNotFound("L1".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(GrowError::PostNotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(GrowError::ResponseNotFound("abc".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn bad_input_maps_to_400() {
        assert_eq!(status(GrowError::InvalidKind("quiz".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(GrowError::InvalidOption {
                question: 1,
                option: "z".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(GrowError::EmptyCart), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(status(GrowError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GrowError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GrowError::Forbidden("no".into())), StatusCode::FORBIDDEN);
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(status(GrowError::UserExists("a@b.co".into())), StatusCode::CONFLICT);
        assert_eq!(
            status(GrowError::ResponseCompleted("x".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        assert_eq!(status(GrowError::Io(io_err)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_grow_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_constructor_maps_to_404() {
        let err = AppError::not_found("nothing here");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_body_lists_fields() {
        let err = AppError(
            GrowError::Validation(vec![
                FieldError::new("name", "is required"),
                FieldError::new("email", "is not a valid email address"),
            ])
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["fields"][0]["field"], "name");
        assert_eq!(json["fields"][1]["field"], "email");
        assert!(json["error"].as_str().unwrap().starts_with("validation failed"));
    }
}
