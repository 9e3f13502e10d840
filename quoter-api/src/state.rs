use std::sync::Arc;

use quoter_core::repository::{CalculationRepository, RateLimiter, UserRepository};
use quoter_store::{MemoryCalculationRepository, MemoryRateLimiter, MemoryUserRepository, RateLimits};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub bcrypt_cost: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub calculations: Arc<dyn CalculationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub limiter: Arc<dyn RateLimiter>,
    pub auth: AuthConfig,
    pub rate_limits: RateLimits,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State backed entirely by process-local stores
    pub fn in_memory(auth: AuthConfig, rate_limits: RateLimits) -> Result<Self, prometheus::Error> {
        Ok(Self {
            calculations: Arc::new(MemoryCalculationRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            limiter: Arc::new(MemoryRateLimiter::new()),
            auth,
            rate_limits,
            metrics: Arc::new(Metrics::new()?),
        })
    }
}
