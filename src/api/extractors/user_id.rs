/*
 * Responsibility
 * - Path の `{user_id}` を UUID として受ける
 * - 失敗時は AppError::Validation (400) へ変換 (axum 既定の plain text rejection を返さない)
 */
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub Uuid);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::validation("invalid user id"))?;

        Uuid::parse_str(&raw)
            .map(UserIdPath)
            .map_err(|_| AppError::validation("invalid user id"))
    }
}
