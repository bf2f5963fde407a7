pub mod auth;
pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Site
        .route("/api/site", get(routes::site::get_site))
        // Assessments (banks + stateless scoring)
        .route("/api/assessments", get(routes::assessments::list_assessments))
        .route(
            "/api/assessments/{kind}",
            get(routes::assessments::get_assessment),
        )
        .route(
            "/api/assessments/{kind}/score",
            post(routes::assessments::score_assessment),
        )
        // Stored responses
        .route(
            "/api/assessment/{audience}",
            post(routes::responses::start_response),
        )
        .route(
            "/api/assessment/{audience}/{id}",
            get(routes::responses::get_response).patch(routes::responses::update_response),
        )
        // Lead forms
        .route(
            "/api/digitaltwin/individual",
            post(routes::leads::enroll_digital_twin),
        )
        .route("/api/contact", post(routes::leads::submit_contact))
        .route("/api/leads/submit", post(routes::leads::submit_playbook))
        .route("/api/coaches/apply", post(routes::leads::apply_as_coach))
        // Admin
        .route("/api/admin/leads", get(routes::admin::list_leads))
        .route(
            "/api/admin/leads/{id}",
            axum::routing::delete(routes::admin::delete_lead),
        )
        .route("/api/admin/responses", get(routes::admin::list_responses))
        // Catalog
        .route("/api/products", get(routes::catalog::list_products))
        .route("/api/products/{slug}", get(routes::catalog::get_product))
        .route("/api/coaches", get(routes::catalog::list_coaches))
        .route("/api/coaches/{slug}", get(routes::catalog::get_coach))
        // Cart
        .route(
            "/api/cart",
            get(routes::cart::get_cart).post(routes::cart::add_item),
        )
        .route("/api/cart/checkout", post(routes::cart::checkout))
        .route(
            "/api/cart/{slug}",
            axum::routing::delete(routes::cart::remove_item),
        )
        .route("/api/user/products", get(routes::cart::user_products))
        // Community
        .route(
            "/api/community/posts",
            get(routes::community::list_posts).post(routes::community::create_post),
        )
        .route(
            "/api/community/posts/{id}",
            get(routes::community::get_post).delete(routes::community::delete_post),
        )
        .route(
            "/api/community/posts/{id}/comments",
            post(routes::community::add_comment),
        )
        .route(
            "/api/community/posts/{id}/like",
            post(routes::community::toggle_like),
        )
        .route(
            "/api/community/posts/{id}/bookmark",
            post(routes::community::toggle_bookmark),
        )
        .route(
            "/api/community/bookmarks",
            get(routes::community::list_bookmarks),
        )
        // Accounts
        .route("/api/auth/register", post(routes::accounts::register))
        .route("/api/auth/login", post(routes::accounts::login))
        .route("/api/auth/logout", post(routes::accounts::logout))
        .route("/api/auth/me", get(routes::accounts::me))
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the grow server on a pre-bound listener.
///
/// Accepting a bound `TcpListener` lets the caller read the actual port
/// first (useful when `port = 0` and the OS picks a free one).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("grow server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
