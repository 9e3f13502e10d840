use async_trait::async_trait;
use uuid::Uuid;
use quoter_shared::{CalculationPage, CalculationRecord, Category, NewCalculation, NewUser, User};

use crate::BoxError;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

/// Clamp a requested page to something every backend can serve:
/// pages start at 1 and page sizes stay within `1..=MAX_PER_PAGE`.
pub fn normalize_page(page: i64, per_page: i64) -> (u64, u64) {
    let page = page.max(1) as u64;
    let per_page = per_page.clamp(1, MAX_PER_PAGE as i64) as u64;
    (page, per_page)
}

/// Rows to skip before `page`, saturating at `i64::MAX`.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(i64::MAX as u64)
}

/// Ledger of priced calculations
#[async_trait]
pub trait CalculationRepository: Send + Sync {
    async fn record(
        &self,
        calculation: NewCalculation,
    ) -> Result<CalculationRecord, BoxError>;

    /// Newest first. `page` and `per_page` are expected to be normalized.
    async fn list(
        &self,
        page: u64,
        per_page: u64,
        category: Option<Category>,
    ) -> Result<CalculationPage, BoxError>;

    /// Cheap connectivity probe for the health endpoint
    async fn ping(&self) -> Result<(), BoxError>;
}

/// Account storage for the identity endpoints
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        user: NewUser,
    ) -> Result<User, BoxError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, BoxError>;

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, BoxError>;

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<User>, BoxError>;
}

/// Fixed-window request counter
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one hit against `key`; returns false once `limit` hits have
    /// been seen inside the current window.
    async fn check(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, BoxError>;
}
