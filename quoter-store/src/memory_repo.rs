//! Process-local stores, used when no database or Redis is configured and
//! throughout the test suites.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use quoter_core::repository::{page_offset, CalculationRepository, RateLimiter, UserRepository};
use quoter_core::BoxError;
use quoter_shared::{CalculationPage, CalculationRecord, Category, NewCalculation, NewUser, User};

/// Append-only ledger kept in insertion order
#[derive(Default, Clone)]
pub struct MemoryCalculationRepository {
    records: Arc<RwLock<Vec<CalculationRecord>>>,
}

impl MemoryCalculationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalculationRepository for MemoryCalculationRepository {
    async fn record(
        &self,
        calculation: NewCalculation,
    ) -> Result<CalculationRecord, BoxError> {
        let record = CalculationRecord::from_new(calculation);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        page: u64,
        per_page: u64,
        category: Option<Category>,
    ) -> Result<CalculationPage, BoxError> {
        let records = self.records.read().await;

        // Newest first; insertion order breaks timestamp ties
        let matching: Vec<&CalculationRecord> = records
            .iter()
            .rev()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .collect();

        let skip = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
        let page_records = matching
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .map(|r| (*r).clone())
            .collect();

        Ok(CalculationPage {
            records: page_records,
            total: matching.len() as u64,
            page,
            per_page,
        })
    }

    async fn ping(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        user: NewUser,
    ) -> Result<User, BoxError> {
        let mut users = self.users.write().await;

        // Same uniqueness the users table enforces
        if users.values().any(|u| u.username == user.username) {
            return Err("Username already exists".into());
        }
        if users.values().any(|u| u.email == user.email) {
            return Err("Email already exists".into());
        }

        let user = User::from_new(user);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, BoxError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, BoxError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<User>, BoxError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

/// Expired windows are swept at most this often
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    length: Duration,
    hits: u64,
}

impl Window {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }
}

struct Windows {
    counters: HashMap<String, Window>,
    last_sweep: Instant,
}

impl Windows {
    fn sweep(&mut self, now: Instant) {
        let before = self.counters.len();
        self.counters.retain(|_, window| !window.expired(now));
        self.last_sweep = now;

        let removed = before - self.counters.len();
        if removed > 0 {
            tracing::debug!("Dropped {} expired rate limit windows", removed);
        }
    }
}

/// Fixed-window counters keyed by caller and scope
#[derive(Clone)]
pub struct MemoryRateLimiter {
    windows: Arc<RwLock<Windows>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(RwLock::new(Windows {
                counters: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Drop every window that has run out.
    pub async fn purge_expired(&self) {
        self.windows.write().await.sweep(Instant::now());
    }

    /// Number of keys currently holding a window
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.counters.len()
    }
}

impl Default for MemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, BoxError> {
        let now = Instant::now();
        let length = Duration::from_secs(window_seconds);
        let mut windows = self.windows.write().await;

        if now.duration_since(windows.last_sweep) >= SWEEP_INTERVAL {
            windows.sweep(now);
        }

        let window = windows.counters.entry(key.to_string()).or_insert(Window {
            started: now,
            length,
            hits: 0,
        });
        if window.expired(now) {
            *window = Window { started: now, length, hits: 0 };
        }
        window.hits += 1;

        Ok(window.hits <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoter_shared::PriceBreakdown;
    use serde_json::json;

    fn calculation(category: Category, final_price: f64) -> NewCalculation {
        NewCalculation {
            category,
            inputs: json!({"category": category.as_str()}),
            results: PriceBreakdown { final_price, ..Default::default() },
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pages() {
        let repo = MemoryCalculationRepository::new();
        for i in 0..25 {
            repo.record(calculation(Category::Supplement, i as f64)).await.unwrap();
        }

        let first = repo.list(1, 10, None).await.unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.records[0].results.final_price, 24.0);
        assert_eq!(first.pages(), 3);
        assert!(first.has_next());

        let last = repo.list(3, 10, None).await.unwrap();
        assert_eq!(last.records.len(), 5);
        assert_eq!(last.records[4].results.final_price, 0.0);
        assert!(!last.has_next());
        assert!(last.has_prev());

        let beyond = repo.list(9, 10, None).await.unwrap();
        assert!(beyond.records.is_empty());
        assert_eq!(beyond.total, 25);

        let far = repo.list(i64::MAX as u64, 100, None).await.unwrap();
        assert!(far.records.is_empty());
        assert!(far.has_prev());
        assert!(!far.has_next());
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let repo = MemoryCalculationRepository::new();
        repo.record(calculation(Category::Supplement, 1.0)).await.unwrap();
        repo.record(calculation(Category::Device, 2.0)).await.unwrap();
        repo.record(calculation(Category::Device, 3.0)).await.unwrap();

        let devices = repo.list(1, 10, Some(Category::Device)).await.unwrap();
        assert_eq!(devices.total, 2);
        assert!(devices.records.iter().all(|r| r.category == Category::Device));

        let all = repo.list(1, 10, None).await.unwrap();
        assert_eq!(all.total, 3);
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let repo = MemoryUserRepository::new();
        let new_user = |username: &str, email: &str| NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        };

        let created = repo.create_user(new_user("amira", "amira@example.com")).await.unwrap();
        assert!(repo.create_user(new_user("amira", "other@example.com")).await.is_err());
        assert!(repo.create_user(new_user("other", "amira@example.com")).await.is_err());

        let found = repo.find_by_username("amira").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_email("amira@example.com").await.unwrap().is_some());
        assert!(repo.get_user(created.id).await.unwrap().is_some());
        assert!(repo.get_user(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limiter_window() {
        let limiter = MemoryRateLimiter::new();

        assert!(limiter.check("1.2.3.4:calculate", 2, 60).await.unwrap());
        assert!(limiter.check("1.2.3.4:calculate", 2, 60).await.unwrap());
        assert!(!limiter.check("1.2.3.4:calculate", 2, 60).await.unwrap());

        // Separate key, separate budget
        assert!(limiter.check("5.6.7.8:calculate", 2, 60).await.unwrap());

        // A zero-length window resets on every hit
        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4:auth", 1, 0).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_drops_expired_windows() {
        let limiter = MemoryRateLimiter::new();
        limiter.check("1.2.3.4:auth:0", 1, 0).await.unwrap();
        limiter.check("5.6.7.8:auth:0", 1, 0).await.unwrap();
        limiter.check("1.2.3.4:history:3600", 5, 3600).await.unwrap();
        assert_eq!(limiter.tracked_keys().await, 3);

        limiter.purge_expired().await;
        assert_eq!(limiter.tracked_keys().await, 1);

        // The live window keeps its count
        for _ in 0..4 {
            assert!(limiter.check("1.2.3.4:history:3600", 5, 3600).await.unwrap());
        }
        assert!(!limiter.check("1.2.3.4:history:3600", 5, 3600).await.unwrap());
    }
}
