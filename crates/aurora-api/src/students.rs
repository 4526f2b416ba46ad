use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use aurora_types::api::{DeleteStudentResponse, HealthResponse, RegisterRequest};
use aurora_types::filter::StudentFilter;
use aurora_types::models::{Student, StudentStats, StudentUpdate};

use crate::error::ApiError;
use crate::run_db;
use crate::state::AppState;

pub const EXPORT_FILENAME: &str = "aurora_registrations.csv";

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: chrono::Utc::now().timestamp_millis(),
    })
}

pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    let students = run_db(&state, "list_students", "*", |db| db.list_students()).await?;
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(serial_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let key = serial_id.clone();
    run_db(&state, "get_student", &serial_id, move |db| db.get_student(&key))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let student = run_db(&state, "register", "-", move |db| db.create_student(req)).await?;

    info!("Registered {}", student.serial_id);
    Ok((StatusCode::CREATED, Json(student)))
}

/// Unrecognised keys in the body are dropped during decoding.
pub async fn update_student(
    State(state): State<AppState>,
    Path(serial_id): Path<String>,
    WithRejection(Json(update), _): WithRejection<Json<StudentUpdate>, ApiError>,
) -> Result<Json<Student>, ApiError> {
    let key = serial_id.clone();
    run_db(&state, "update_student", &serial_id, move |db| db.update_student(&key, update))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(serial_id): Path<String>,
) -> Result<Json<DeleteStudentResponse>, ApiError> {
    let key = serial_id.clone();
    let student = run_db(&state, "delete_student", &serial_id, move |db| db.delete_student(&key))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(DeleteStudentResponse {
        success: true,
        student,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<StudentFilter>, ApiError>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let term = filter.term.clone();
    let students = run_db(&state, "search", &term, move |db| db.search_students(&filter)).await?;
    Ok(Json(students))
}

pub async fn export(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<StudentFilter>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let term = filter.term.clone();
    let csv = run_db(&state, "export", &term, move |db| db.export_csv(&filter)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StudentStats>, ApiError> {
    let stats = run_db(&state, "stats", "*", |db| db.student_stats()).await?;
    Ok(Json(stats))
}
