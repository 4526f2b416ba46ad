pub mod admin;
pub mod checkin;
pub mod error;
pub mod state;
pub mod students;


use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tracing::error;

use aurora_db::Database;

use crate::error::ApiError;
use crate::state::AppState;

/// Registration payloads carry an embedded photo.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// All routes, nested under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(students::health))
        .route("/students", get(students::list_students))
        .route(
            "/student/{serial}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/register", post(students::register))
        .route("/search", get(students::search))
        .route("/export", get(students::export))
        .route("/stats", get(students::stats))
        .route("/checkin/{serial}", post(checkin::check_in))
        .route("/admin/login", post(admin::login))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    Router::new().nest("/api", api)
}

/// Run a blocking store call off the async runtime.
///
/// Failures are logged with the operation and the serial (or other subject)
/// involved, then surfaced as a generic storage error.
pub(crate) async fn run_db<F, T>(
    state: &AppState,
    op: &'static str,
    subject: &str,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))
        .and_then(|res| res)
        .map_err(|e| {
            error!(op, subject, "Storage failure: {:#}", e);
            ApiError::Storage(e)
        })
}
