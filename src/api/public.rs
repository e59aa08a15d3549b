//! Public read endpoints (no authentication)

use crate::error::ApiError;
use crate::models::{CaseView, HearingView, JudgeView};
use crate::store::{CaseStats, Database, HearingStats, JudgeStats};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn list_cases(State(db): State<Arc<Database>>) -> Result<Json<Vec<CaseView>>, ApiError> {
    Ok(Json(db.list_cases()?))
}

/// GET /api/public/cases/search?q=
pub async fn search_cases(
    State(db): State<Arc<Database>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<CaseView>>, ApiError> {
    let query = params.q.unwrap_or_default();
    Ok(Json(db.search_cases(&query)?))
}

pub async fn get_case(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
) -> Result<Json<CaseView>, ApiError> {
    Ok(Json(db.get_case(&id)?))
}

pub async fn list_judges(
    State(db): State<Arc<Database>>,
) -> Result<Json<Vec<JudgeView>>, ApiError> {
    Ok(Json(db.list_judges()?))
}

pub async fn get_judge(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
) -> Result<Json<JudgeView>, ApiError> {
    Ok(Json(db.get_judge(&id)?))
}

/// GET /api/public/judges/search/:name, every judge whose name matches
pub async fn search_judges(
    State(db): State<Arc<Database>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<JudgeView>>, ApiError> {
    Ok(Json(db.search_judges(&name)?))
}

pub async fn list_hearings(
    State(db): State<Arc<Database>>,
) -> Result<Json<Vec<HearingView>>, ApiError> {
    Ok(Json(db.list_hearings()?))
}

pub async fn get_hearing(
    State(db): State<Arc<Database>>,
    Path(id): Path<String>,
) -> Result<Json<HearingView>, ApiError> {
    Ok(Json(db.get_hearing(&id)?))
}

pub async fn hearings_for_judge(
    State(db): State<Arc<Database>>,
    Path(judge_id): Path<String>,
) -> Result<Json<Vec<HearingView>>, ApiError> {
    Ok(Json(db.hearings_for_judge(&judge_id)?))
}

pub async fn hearings_for_case(
    State(db): State<Arc<Database>>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<HearingView>>, ApiError> {
    Ok(Json(db.hearings_for_case(&case_id)?))
}

pub async fn case_stats(State(db): State<Arc<Database>>) -> Result<Json<CaseStats>, ApiError> {
    Ok(Json(db.case_stats()?))
}

pub async fn judge_stats(State(db): State<Arc<Database>>) -> Result<Json<JudgeStats>, ApiError> {
    Ok(Json(db.judge_stats()?))
}

pub async fn hearing_stats(
    State(db): State<Arc<Database>>,
) -> Result<Json<HearingStats>, ApiError> {
    Ok(Json(db.hearing_stats()?))
}
