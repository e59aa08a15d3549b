//! Staff endpoints: writes and admin listings
//!
//! Role gating happens in the router; handlers here assume an authorized caller.

use crate::auth::CurrentAccount;
use crate::error::{ApiError, JsonBody};
use crate::models::{
    CaseUpdate, CaseView, HearingUpdate, HearingView, JudgeUpdate, JudgeView, NewCase, NewHearing,
    NewJudge,
};
use crate::store::{CaseStats, Database, JudgeStats};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

type Created<T> = (StatusCode, Json<T>);

// ===== Cases =====

pub async fn list_cases(State(db): State<Arc<Database>>) -> Result<Json<Vec<CaseView>>, ApiError> {
    Ok(Json(db.list_cases()?))
}

pub async fn create_case(
    State(db): State<Arc<Database>>,
    Extension(CurrentAccount(admin)): Extension<CurrentAccount>,
    JsonBody(input): JsonBody<NewCase>,
) -> Result<Created<CaseView>, ApiError> {
    let view = db.create_case(input)?;
    info!("👤 {} filed case {}", admin.email, view.record.case.case_number);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_case(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<CaseUpdate>,
) -> Result<Json<CaseView>, ApiError> {
    Ok(Json(db.update_case(&id, update)?))
}

pub async fn delete_case(
    State(db): State<Arc<Database>>,
    Extension(CurrentAccount(admin)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    db.delete_case(&id)?;
    info!("👤 {} deleted case {}", admin.email, id);
    Ok(Json(json!({ "message": "Case deleted" })))
}

pub async fn case_stats(State(db): State<Arc<Database>>) -> Result<Json<CaseStats>, ApiError> {
    Ok(Json(db.case_stats()?))
}

// ===== Judges =====

pub async fn list_judges(
    State(db): State<Arc<Database>>,
) -> Result<Json<Vec<JudgeView>>, ApiError> {
    Ok(Json(db.list_judges()?))
}

pub async fn create_judge(
    State(db): State<Arc<Database>>,
    JsonBody(input): JsonBody<NewJudge>,
) -> Result<Created<JudgeView>, ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_judge(input)?)))
}

pub async fn update_judge(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<JudgeUpdate>,
) -> Result<Json<JudgeView>, ApiError> {
    Ok(Json(db.update_judge(&id, update)?))
}

pub async fn delete_judge(
    State(db): State<Arc<Database>>,
    Extension(CurrentAccount(admin)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    db.delete_judge(&id)?;
    info!("👤 {} deleted judge {}", admin.email, id);
    Ok(Json(json!({ "message": "Judge deleted successfully" })))
}

pub async fn judge_stats(State(db): State<Arc<Database>>) -> Result<Json<JudgeStats>, ApiError> {
    Ok(Json(db.judge_stats()?))
}

// ===== Hearings =====

pub async fn list_hearings(
    State(db): State<Arc<Database>>,
) -> Result<Json<Vec<HearingView>>, ApiError> {
    Ok(Json(db.list_hearings()?))
}

pub async fn create_hearing(
    State(db): State<Arc<Database>>,
    JsonBody(input): JsonBody<NewHearing>,
) -> Result<Created<HearingView>, ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_hearing(input)?)))
}

pub async fn update_hearing(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<HearingUpdate>,
) -> Result<Json<HearingView>, ApiError> {
    Ok(Json(db.update_hearing(&id, update)?))
}

pub async fn delete_hearing(
    State(db): State<Arc<Database>>,
    Extension(CurrentAccount(admin)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    db.delete_hearing(&id)?;
    info!("👤 {} deleted hearing {}", admin.email, id);
    Ok(Json(json!({ "message": "Hearing deleted successfully" })))
}
