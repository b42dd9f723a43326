use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_bookmark_handler, delete_bookmark_handler, health_handler, list_bookmarks_handler,
    patch_bookmark_handler, preview_bookmark_handler,
};
use crate::state::AppState;

/// Prefixes the bookmark routes are served under.
pub const BOOKMARK_PREFIXES: [&str; 2] = ["/api/v1/bookmarks", "/bookmarks"];

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        BOOKMARK_PREFIXES
            .iter()
            .fold(Router::new(), |router, prefix| bookmark_routes(router, prefix))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

fn bookmark_routes(router: Router<AppState>, prefix: &str) -> Router<AppState> {
    router
        .route(
            prefix,
            get(list_bookmarks_handler).post(create_bookmark_handler),
        )
        .route(
            &format!("{prefix}/{{id}}"),
            get(preview_bookmark_handler)
                .patch(patch_bookmark_handler)
                .delete(delete_bookmark_handler),
        )
}
