use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../site/"]
struct SiteAssets;

fn asset(path: &str) -> Option<Response> {
    let content = <SiteAssets as Embed>::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.to_vec(),
        )
            .into_response(),
    )
}

/// Serve the embedded marketing site.
///
/// `/about` resolves to `about.html`; any other unknown page falls back to
/// `index.html`. Unknown `/api/` paths get a JSON 404 instead.
pub async fn static_handler(uri: axum::http::Uri) -> Response {
    let path = uri.path().trim_start_matches('/').trim_end_matches('/');

    if path == "api" || path.starts_with("api/") {
        let body = serde_json::json!({ "error": format!("no route for /{path}") });
        return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
    }

    if !path.is_empty() {
        if let Some(resp) = asset(path) {
            return resp;
        }
        if !path.contains('.') {
            if let Some(resp) = asset(&format!("{path}.html")) {
                return resp;
            }
        }
    }

    asset("index.html").unwrap_or_else(|| (StatusCode::NOT_FOUND, "site not bundled").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn pretty_paths_resolve_to_html_pages() {
        let resp = static_handler("/about".parse().unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_of(resp).await.contains("About"));
    }

    #[tokio::test]
    async fn unknown_page_falls_back_to_index() {
        let resp = static_handler("/no/such/page".parse().unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
    }

    #[tokio::test]
    async fn unknown_api_path_is_json_404() {
        let resp = static_handler("/api/nothing".parse().unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
