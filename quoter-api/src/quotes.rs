use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::Value;

use quoter_catalog::{quote_tagged, PricingError};
use quoter_shared::{Category, NewCalculation, PriceBreakdown};

use crate::{error::AppError, middleware::auth::optional_user_id, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/calculate", post(calculate))
}

fn failure_reason(err: &PricingError) -> &'static str {
    match err {
        PricingError::Validation(_) => "validation",
        PricingError::UnknownCategory(_) => "unknown_category",
        PricingError::NonFinite(_) => "non_finite",
    }
}

/// POST /calculate
///
/// The body is the flat field mapping plus an optional `category`
/// (`supplement` when absent). The priced breakdown is recorded together
/// with the raw body before it is returned.
async fn calculate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PriceBreakdown>, AppError> {
    let inputs = match payload {
        Ok(Json(Value::Object(map))) if !map.is_empty() => map,
        _ => {
            state.metrics.quote_failed("no_input");
            return Err(AppError::ValidationError("No input data provided".to_string()));
        }
    };

    let tag = match inputs.get("category") {
        None => Category::Supplement.as_str(),
        // A non-string category can never name a known one
        Some(value) => value.as_str().unwrap_or_default(),
    };

    let (category, results) = quote_tagged(tag, &inputs).map_err(|err| {
        tracing::debug!("Quote rejected: {}", err);
        state.metrics.quote_failed(failure_reason(&err));
        AppError::from_pricing(err)
    })?;

    let user_id = optional_user_id(&state, &headers).await;

    let record = state
        .calculations
        .record(NewCalculation {
            category,
            inputs: Value::Object(inputs),
            results,
            user_id,
        })
        .await
        .map_err(|e| {
            state.metrics.quote_failed("storage");
            AppError::failed("Calculation failed", e)
        })?;

    state.metrics.quote_recorded(category.as_str());
    tracing::info!(
        "Recorded {} quote {} at final price {}",
        category,
        record.id,
        results.final_price
    );

    Ok(Json(results))
}
