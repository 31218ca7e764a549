use axum::{routing::get, Router};

use crate::handlers;
use crate::AppState;

/// Create the server routes.
///
/// Static prefixes win over the catch-all, so `/api` and `/download`
/// stay reserved even when the served tree contains files of those names.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Startup snapshot
        .route("/api/server-info", get(handlers::server_info))
        // JSON browse API
        .route("/api/browse", get(handlers::api_browse))
        .route("/api/browse/", get(handlers::api_browse))
        .route("/api/browse/*path", get(handlers::api_browse))
        // Downloads
        .route("/download", get(handlers::download))
        .route("/download/", get(handlers::download))
        .route("/download/*path", get(handlers::download))
        // Browser-facing listing and inline files
        .route("/", get(handlers::browse_page))
        .route("/*path", get(handlers::browse_page))
}
