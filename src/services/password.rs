/*
 * Responsibility
 * - パスワードの hash / verify (bcrypt)
 * - CPU を使うので spawn_blocking で runtime を塞がない
 */
use crate::services::users::UserServiceError;

// bcrypt accepts costs in this range.
pub const MIN_HASH_COST: u32 = 4;
pub const MAX_HASH_COST: u32 = 31;

pub async fn hash_password(password: String, cost: u32) -> Result<String, UserServiceError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| UserServiceError::Backend(format!("hash task failed: {e}")))?
        .map_err(|e| UserServiceError::Backend(format!("failed to hash password: {e}")))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, UserServiceError> {
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| UserServiceError::Backend(format!("verify task failed: {e}")))?;

    // A malformed stored hash can never match.
    Ok(result.unwrap_or(false))
}
