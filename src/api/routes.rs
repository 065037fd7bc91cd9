use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::candidates::{list_candidates, resolve_id};
use crate::db::get_connection;
use crate::error::Result as AppResult;
use crate::matcher;
use crate::models::{Candidate, ContractMatches, SearchResponse, VendorMatches};
use crate::reports;
use crate::search::{self, MISSING_QUERY};

const EXPORT_SUFFIX: &str = "_combined_contributions.csv";

#[derive(Clone)]
pub struct ApiState {
    pub db_path: Arc<PathBuf>,
}

impl ApiState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
        }
    }
}

/// Run `f` against a fresh connection on the blocking pool, with the path
/// identifier resolved to a registered candidate first.
async fn for_candidate<T, F>(state: &ApiState, candidate: String, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection, i64, &Candidate) -> AppResult<T> + Send + 'static,
{
    let db_path = state.db_path.clone();
    let value = tokio::task::spawn_blocking(move || {
        let conn = get_connection(&db_path)?;
        let (id, c) = resolve_id(&conn, &candidate)?;
        f(&conn, id, &c)
    })
    .await??;
    Ok(value)
}

async fn json_for<T, F>(state: &ApiState, candidate: String, f: F) -> Result<Json<T>, ApiError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Connection, i64, &Candidate) -> AppResult<T> + Send + 'static,
{
    Ok(Json(for_candidate(state, candidate, f).await?))
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn candidates_handler(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let db_path = state.db_path.clone();
    let list = tokio::task::spawn_blocking(move || -> AppResult<Vec<Candidate>> {
        list_candidates(&get_connection(&db_path)?)
    })
    .await??;
    Ok(Json(list))
}

pub async fn contributions_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::contributions_by_group(conn, id)).await
}

pub async fn top_donors_bar_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::top_donors_bar(conn, id)).await
}

pub async fn top_employers_bar_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::top_employers_bar(conn, id)).await
}

pub async fn top_donors_table_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::top_donors_table(conn, id)).await
}

pub async fn repeated_donors_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::repeated_donors(conn, id)).await
}

pub async fn repeat_donors_bar_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::repeated_donors_bar(conn, id)).await
}

pub async fn repeat_frequency_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::repeat_frequency(conn, id)).await
}

pub async fn donations_over_time_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| reports::donations_over_time(conn, id)).await
}

pub async fn total_donations_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, c| reports::total_donations(conn, id, &c.slug)).await
}

pub async fn vendors_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| {
        Ok(VendorMatches {
            vendor_matches: matcher::vendor_matches(conn, id)?,
        })
    })
    .await
}

pub async fn contracts_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    json_for(&state, candidate, |conn, id, _| {
        Ok(ContractMatches {
            contract_matches: matcher::contract_matches(conn, id)?,
        })
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

pub async fn search_donor_handler(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest(MISSING_QUERY.to_string()));
    }
    let found = for_candidate(&state, candidate, move |conn, id, _| {
        search::search_donor(conn, id, &query)
    })
    .await?;
    found
        .map(Json)
        .ok_or_else(|| ApiError::BadRequest(MISSING_QUERY.to_string()))
}

/// `/download/{Candidate}_combined_contributions.csv`
pub async fn download_handler(
    State(state): State<ApiState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(candidate) = file.strip_suffix(EXPORT_SUFFIX).map(str::to_string) else {
        return Err(ApiError::NotFound("File not found".to_string()));
    };
    let (name, body) = for_candidate(&state, candidate, |conn, id, c| {
        let mut buf = Vec::new();
        reports::write_combined_csv(conn, id, &mut buf)?;
        Ok((reports::export_filename(&c.slug), buf))
    })
    .await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        body,
    ))
}
