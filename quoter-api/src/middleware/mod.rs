pub mod auth;
pub mod rate_limit;

pub use auth::{require_auth, Claims, CurrentUser};
pub use rate_limit::{rate_limit_middleware, Scope};
