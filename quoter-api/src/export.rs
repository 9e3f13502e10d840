use axum::{
    extract::rejection::JsonRejection,
    http::header,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

use quoter_export::{export_filename, to_csv, to_spreadsheet, CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use quoter_shared::PriceBreakdown;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CsvExportRequest {
    /// Any JSON value; written to the file as text
    #[serde(default = "unknown_category")]
    pub category: Value,
    #[serde(default)]
    pub results: PriceBreakdown,
}

fn unknown_category() -> Value {
    Value::String("N/A".to_string())
}

fn category_label(category: &Value) -> String {
    match category {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ExcelExportRequest {
    #[serde(default)]
    pub results: PriceBreakdown,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/csv", post(export_csv))
        .route("/export/excel", post(export_excel))
}

/// Non-empty JSON object body, decoded into `T`
fn export_request<T: serde::de::DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    match payload {
        Ok(Json(Value::Object(map))) if !map.is_empty() => serde_json::from_value(Value::Object(map))
            .map_err(|e| AppError::RejectedInput(e.to_string())),
        _ => Err(AppError::ValidationError("No data provided".to_string())),
    }
}

fn attachment(content_type: &'static str, filename: String, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
}

/// POST /export/csv
async fn export_csv(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req: CsvExportRequest = export_request(payload)?;
    let now = Utc::now();

    let body = to_csv(&category_label(&req.category), &req.results, now).map_err(|e| AppError::failed("Export failed", e))?;
    Ok(attachment(CSV_CONTENT_TYPE, export_filename(now, "csv"), body))
}

/// POST /export/excel
async fn export_excel(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req: ExcelExportRequest = export_request(payload)?;
    let now = Utc::now();

    let body = to_spreadsheet(&req.results, &req.inputs).map_err(|e| AppError::failed("Export failed", e))?;
    Ok(attachment(XLSX_CONTENT_TYPE, export_filename(now, "xlsx"), body))
}
