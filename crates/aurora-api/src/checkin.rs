use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use aurora_types::api::{CheckInQuery, CheckInResponse};
use aurora_types::checkin::CheckInOutcome;

use crate::error::ApiError;
use crate::run_db;
use crate::state::AppState;

/// POST /checkin/{serial}?force=true
///
/// Pending verification comes back as a successful warning without checking
/// the student in; `force` is the staff override that admits them anyway.
pub async fn check_in(
    State(state): State<AppState>,
    Path(serial_id): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<CheckInQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let key = serial_id.clone();
    let force = query.force;
    let outcome = run_db(&state, "check_in", &serial_id, move |db| db.check_in(&key, force)).await?;

    let status = match outcome {
        CheckInOutcome::Rejected => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    Ok((status, Json(CheckInResponse::from(outcome))))
}
