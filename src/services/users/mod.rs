/*
 * Responsibility
 * - user service (collaborator) の契約: authenticate / create / get_all / get_by_id / update / delete
 * - ストレージ実装は差し替え可能 (Postgres / in-memory)
 */
mod memory;
mod model;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryUserService;
pub use model::{Credentials, NewUser, Role, UserPatch, UserRecord};
pub use postgres::PgUserService;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

pub(crate) fn username_taken(username: &str) -> UserServiceError {
    UserServiceError::Conflict(format!("username \"{username}\" is already taken"))
}

#[async_trait]
pub trait UserService: Send + Sync + 'static {
    /// Returns the matching user when the username exists and the password verifies.
    /// Unknown usernames and wrong passwords are indistinguishable (`Ok(None)`).
    async fn authenticate(&self, credentials: Credentials) -> UserServiceResult<Option<UserRecord>>;

    async fn create(&self, candidate: NewUser) -> UserServiceResult<UserRecord>;

    async fn get_all(&self) -> UserServiceResult<Vec<UserRecord>>;

    async fn get_by_id(&self, id: Uuid) -> UserServiceResult<Option<UserRecord>>;

    /// Fails with `NotFound` when no user has `id`.
    async fn update(&self, id: Uuid, patch: UserPatch) -> UserServiceResult<UserRecord>;

    /// Fails with `NotFound` when no user has `id`.
    async fn delete(&self, id: Uuid) -> UserServiceResult<()>;
}
