//! PostgreSQL-backed user service built on `repos::user_repo`.
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::user_repo::{self, InsertUser, UpdateUser, UserRow};
use crate::services::password::{hash_password, verify_password};
use crate::services::users::{
    Credentials, NewUser, Role, UserPatch, UserRecord, UserService, UserServiceError,
    UserServiceResult, username_taken,
};

#[derive(Clone, Debug)]
pub struct PgUserService {
    db: PgPool,
    hash_cost: u32,
}

impl PgUserService {
    pub fn new(db: PgPool, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.user_name,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            // Unknown roles collapse to the least-privileged one.
            role: row.role.parse().unwrap_or(Role::User),
            created_at: row.created_at,
        }
    }
}

fn backend(e: RepoError) -> UserServiceError {
    UserServiceError::Backend(format!("{e}: {e:?}"))
}

#[async_trait]
impl UserService for PgUserService {
    async fn authenticate(&self, credentials: Credentials) -> UserServiceResult<Option<UserRecord>> {
        let Some(row) = user_repo::find_by_user_name(&self.db, &credentials.username)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let ok = verify_password(credentials.password, row.password_hash.clone()).await?;
        Ok(ok.then(|| row.into()))
    }

    async fn create(&self, candidate: NewUser) -> UserServiceResult<UserRecord> {
        if user_repo::find_by_user_name(&self.db, &candidate.username)
            .await
            .map_err(backend)?
            .is_some()
        {
            return Err(username_taken(&candidate.username));
        }

        let password_hash = hash_password(candidate.password, self.hash_cost).await?;

        let row = user_repo::create(
            &self.db,
            InsertUser {
                id: Uuid::new_v4(),
                user_name: &candidate.username,
                first_name: &candidate.first_name,
                last_name: &candidate.last_name,
                password_hash: &password_hash,
                role: Role::User.as_str(),
            },
        )
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration.
            RepoError::Conflict => username_taken(&candidate.username),
            other => backend(other),
        })?;

        Ok(row.into())
    }

    async fn get_all(&self) -> UserServiceResult<Vec<UserRecord>> {
        let rows = user_repo::list(&self.db).await.map_err(backend)?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> UserServiceResult<Option<UserRecord>> {
        let row = user_repo::get(&self.db, id).await.map_err(backend)?;
        Ok(row.map(UserRecord::from))
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> UserServiceResult<UserRecord> {
        let password_hash = match patch.password {
            Some(password) => Some(hash_password(password, self.hash_cost).await?),
            None => None,
        };

        let changes = UpdateUser {
            user_name: patch.username.as_deref(),
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
            password_hash: password_hash.as_deref(),
            role: patch.role.map(|r| r.as_str()),
        };

        let row = user_repo::update(&self.db, id, changes)
            .await
            .map_err(|e| match (e, patch.username.as_deref()) {
                (RepoError::Conflict, Some(username)) => username_taken(username),
                (other, _) => backend(other),
            })?
            .ok_or(UserServiceError::NotFound)?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> UserServiceResult<()> {
        let deleted = user_repo::delete(&self.db, id).await.map_err(backend)?;
        if deleted {
            Ok(())
        } else {
            Err(UserServiceError::NotFound)
        }
    }
}
