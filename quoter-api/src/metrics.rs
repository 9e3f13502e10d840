use axum::{extract::State, http::header, response::IntoResponse};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{error::AppError, state::AppState};

/// Quote counters, exposed on `/metrics`
pub struct Metrics {
    registry: Registry,
    quotes: IntCounterVec,
    quote_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let quotes = IntCounterVec::new(
            Opts::new("quoter_quotes_total", "Quotes priced and recorded"),
            &["category"],
        )?;
        let quote_failures = IntCounterVec::new(
            Opts::new("quoter_quote_failures_total", "Quote requests that did not produce a price"),
            &["reason"],
        )?;

        registry.register(Box::new(quotes.clone()))?;
        registry.register(Box::new(quote_failures.clone()))?;

        Ok(Self { registry, quotes, quote_failures })
    }

    pub fn quote_recorded(&self, category: &str) {
        self.quotes.with_label_values(&[category]).inc();
    }

    pub fn quote_failed(&self, reason: &str) {
        self.quote_failures.with_label_values(&[reason]).inc();
    }

    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
