use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::papers::PaperService;
use crate::domain::papers::NewPaper;

use super::auth::require_user_id;
use super::error::ApiError;
use super::state::HttpState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

pub async fn upload_paper(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(body): Json<NewPaper>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user_id(&headers)?;
    let user = state.auth.require_user(user_id).await?;

    let record = state.papers.upload(user.id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "paper_id": record.id })),
    ))
}

pub async fn search_papers(
    State(state): State<HttpState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (sort_by, order) =
        PaperService::parse_search_params(query.sort_by.as_deref(), query.order.as_deref())?;

    let results = state.papers.search(&query.search, sort_by, order).await?;
    Ok(Json(json!({ "count": results.len(), "results": results })))
}

pub async fn paper_detail(
    State(state): State<HttpState>,
    Path(paper_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.papers.detail(paper_id).await?;
    Ok(Json(detail))
}
