pub mod app_config;
pub mod calculation_repo;
pub mod database;
pub mod memory_repo;
pub mod redis_repo;
pub mod user_repo;

pub use app_config::{Config, RateLimitRule, RateLimits};
pub use calculation_repo::StoreCalculationRepository;
pub use database::DbClient;
pub use memory_repo::{MemoryCalculationRepository, MemoryRateLimiter, MemoryUserRepository};
pub use redis_repo::RedisClient;
pub use user_repo::StoreUserRepository;
