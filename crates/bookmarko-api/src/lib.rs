//! # bookmarko-api
//!
//! axum HTTP server for bookmarko: bookmark CRUD with tags, account
//! sessions, metadata extraction, JSON import/export and the browser
//! extension bridge.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::http::{header, HeaderValue, Method, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use config::{parse_allowed_origins, ServerConfig, StorageBackend};
pub use error::ApiError;
pub use state::AppState;

use handlers::{bookmarks, extension, health, metadata, tags, transfer, users};

/// Request ID generator producing UUIDv7 values.
#[derive(Clone, Copy)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// CORS for the authenticated API: whitelisted origins with credentials.
fn api_cors(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// CORS for the public metadata endpoint, callable from any page.
fn public_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let public = Router::new()
        .route(
            "/api/extract-metadata",
            post(metadata::extract_metadata).options(metadata::preflight),
        )
        .layer(public_cors());

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Accounts
        .route("/api/register", post(users::register))
        .route("/api/login", post(users::login))
        .route("/api/logout", post(users::logout))
        .route("/api/user", get(users::current_user))
        // Bookmarks
        .route(
            "/api/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route(
            "/api/bookmarks/:id",
            get(bookmarks::get_bookmark)
                .put(bookmarks::update_bookmark)
                .delete(bookmarks::delete_bookmark),
        )
        .route(
            "/api/bookmarks/:id/tags",
            get(tags::get_bookmark_tags)
                .put(tags::set_bookmark_tags)
                .post(tags::add_bookmark_tags)
                .delete(tags::remove_bookmark_tags),
        )
        // Tags
        .route("/api/tags", get(tags::list_tags))
        .route("/api/tags/recent", get(tags::recent_tags))
        // Import / export
        .route("/api/export", get(transfer::export_bookmarks))
        .route("/api/import", post(transfer::import_bookmarks))
        // Browser extension
        .route("/api/extension/message", post(extension::handle_message))
        .layer(api_cors(config.allowed_origins.clone()));

    public
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .with_state(state)
}
