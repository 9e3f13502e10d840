use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use quoter_store::{RateLimitRule, RateLimits};

use crate::{error::AppError, state::AppState};

/// Which request budget a route draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Calculate,
    Auth,
    History,
    Export,
    Default,
    /// Probes and scrapes are never limited
    Exempt,
}

impl Scope {
    pub fn for_request(method: &Method, path: &str) -> Self {
        if *method == Method::OPTIONS {
            return Scope::Exempt;
        }

        match path {
            "/health" | "/metrics" => Scope::Exempt,
            "/calculate" => Scope::Calculate,
            "/auth/register" | "/auth/login" => Scope::Auth,
            "/calculations" => Scope::History,
            p if p.starts_with("/export/") => Scope::Export,
            _ => Scope::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scope::Calculate => "calculate",
            Scope::Auth => "auth",
            Scope::History => "history",
            Scope::Export => "export",
            Scope::Default => "default",
            Scope::Exempt => "exempt",
        }
    }

    pub fn rules(&self, limits: &RateLimits) -> Vec<RateLimitRule> {
        match self {
            Scope::Calculate => vec![limits.calculate],
            Scope::Auth => vec![limits.auth],
            Scope::History => vec![limits.history],
            Scope::Export => vec![limits.export],
            Scope::Default => limits.default.clone(),
            Scope::Exempt => Vec::new(),
        }
    }
}

/// Fixed-window limit per client IP and scope. Limiter outages let the
/// request through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let scope = Scope::for_request(req.method(), req.uri().path());
    let ip = addr.ip().to_string();

    for rule in scope.rules(&state.rate_limits) {
        let key = format!("{}:{}:{}", ip, scope.name(), rule.window_seconds);

        match state.limiter.check(&key, rule.limit, rule.window_seconds).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Rate limit hit for {} on {}", ip, scope.name());
                return Err(AppError::RateLimited);
            }
            Err(e) => {
                tracing::warn!("Rate limiter unavailable, failing open: {}", e);
                break;
            }
        }
    }

    Ok(next.run(req).await)
}
