use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use quoter_core::repository::{normalize_page, DEFAULT_PER_PAGE};
use quoter_shared::{CalculationPage, CalculationRecord, Category};

use crate::{error::AppError, state::AppState};

/// Query values arrive as text so malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<&CalculationPage> for Pagination {
    fn from(page: &CalculationPage) -> Self {
        Self {
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            pages: page.pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub calculations: Vec<CalculationRecord>,
    pub pagination: Pagination,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/calculations", get(list_calculations))
}

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// GET /calculations
async fn list_calculations(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let (page, per_page) = normalize_page(
        parse_or(query.page.as_deref(), 1),
        parse_or(query.per_page.as_deref(), DEFAULT_PER_PAGE as i64),
    );
    // Unknown categories are ignored rather than rejected
    let category = query.category.as_deref().and_then(|c| c.parse::<Category>().ok());

    let result = state
        .calculations
        .list(page, per_page, category)
        .await
        .map_err(|e| AppError::failed("Failed to retrieve history", e))?;

    let pagination = Pagination::from(&result);
    Ok(Json(HistoryResponse {
        success: true,
        calculations: result.records,
        pagination,
    }))
}
