/*!
 * Request extractors
 *
 * Public API:
 * - AuthIdentity: middleware が検証済みの Identity
 * - UserIdPath: `/users/{user_id}` の UUID
 * - Payload: JSON / urlencoded form body (rejection は AppError::Validation)
 */
mod identity;
mod payload;
mod user_id;

pub use identity::AuthIdentity;
pub use payload::Payload;
pub use user_id::UserIdPath;
