use crate::{CoreError, CoreResult};

/// bcrypt password hashing with a configurable work factor.
///
/// Hashing is CPU bound; async callers should run it on a blocking thread.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> CoreResult<String> {
        if password.is_empty() {
            return Err(CoreError::ValidationError("password must not be empty".to_string()));
        }

        bcrypt::hash(password, self.cost)
            .map_err(|e| CoreError::InternalError(format!("password hashing failed: {}", e)))
    }

    /// A malformed stored hash is reported as an identity error rather than
    /// a plain mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> CoreResult<bool> {
        bcrypt::verify(password, hash).map_err(|e| {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            CoreError::IdentityError("stored credentials are unreadable".to_string())
        })
    }
}
