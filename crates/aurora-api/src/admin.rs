use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};

use aurora_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::run_db;
use crate::state::AppState;

/// Credential check only. No session or token is issued; the dashboard keeps
/// its own logged-in flag.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.clone();
    let valid = run_db(&state, "admin_login", &email, move |db| {
        db.authenticate_admin(&req.email, &req.password)
    })
    .await?;

    if !valid {
        warn!("Rejected admin login for {}", email);
        return Err(ApiError::Unauthorized);
    }

    info!("Admin {} logged in", email);
    Ok(Json(LoginResponse { success: true }))
}
