//! In-memory user store.
//!
//! Used when no `DATABASE_URL` is configured, and by the test suite.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::password::{hash_password, verify_password};
use crate::services::users::{
    Credentials, NewUser, Role, UserPatch, UserRecord, UserService, UserServiceError,
    UserServiceResult, username_taken,
};

#[derive(Clone)]
pub struct InMemoryUserService {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
    hash_cost: u32,
}

impl InMemoryUserService {
    pub fn new(hash_cost: u32) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            hash_cost,
        }
    }
}

fn find_by_username<'a>(
    users: &'a HashMap<Uuid, UserRecord>,
    username: &str,
) -> Option<&'a UserRecord> {
    users.values().find(|u| u.username == username)
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn authenticate(&self, credentials: Credentials) -> UserServiceResult<Option<UserRecord>> {
        let found = {
            let users = self.users.read().await;
            find_by_username(&users, &credentials.username).cloned()
        };

        let Some(user) = found else {
            return Ok(None);
        };

        let ok = verify_password(credentials.password, user.password_hash.clone()).await?;
        Ok(ok.then_some(user))
    }

    async fn create(&self, candidate: NewUser) -> UserServiceResult<UserRecord> {
        if find_by_username(&*self.users.read().await, &candidate.username).is_some() {
            return Err(username_taken(&candidate.username));
        }

        let password_hash = hash_password(candidate.password, self.hash_cost).await?;

        let mut users = self.users.write().await;
        // Another request may have taken the name while we were hashing.
        if find_by_username(&users, &candidate.username).is_some() {
            return Err(username_taken(&candidate.username));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: candidate.username,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            password_hash,
            role: Role::User,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get_all(&self) -> UserServiceResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(all)
    }

    async fn get_by_id(&self, id: Uuid) -> UserServiceResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> UserServiceResult<UserRecord> {
        let password_hash = match patch.password {
            Some(password) => Some(hash_password(password, self.hash_cost).await?),
            None => None,
        };

        let mut users = self.users.write().await;

        if !users.contains_key(&id) {
            return Err(UserServiceError::NotFound);
        }
        if let Some(username) = &patch.username
            && users
                .values()
                .any(|u| u.id != id && &u.username == username)
        {
            return Err(username_taken(username));
        }

        let user = users.get_mut(&id).ok_or(UserServiceError::NotFound)?;

        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> UserServiceResult<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(UserServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::password::MIN_HASH_COST;

    fn service() -> InMemoryUserService {
        InMemoryUserService::new(MIN_HASH_COST)
    }

    fn candidate(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "secret-pass".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_defaults_to_user_role() {
        let svc = service();
        let user = svc.create(candidate("alice")).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "secret-pass");
        assert!(svc.get_by_id(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let svc = service();
        svc.create(candidate("alice")).await.unwrap();

        let err = svc.create(candidate("alice")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn authenticate_distinguishes_nothing_on_failure() {
        let svc = service();
        svc.create(candidate("alice")).await.unwrap();

        let ok = svc
            .authenticate(Credentials {
                username: "alice".into(),
                password: "secret-pass".into(),
            })
            .await
            .unwrap();
        assert!(ok.is_some());

        for (username, password) in [("alice", "wrong"), ("nobody", "secret-pass")] {
            let res = svc
                .authenticate(Credentials {
                    username: username.into(),
                    password: password.into(),
                })
                .await
                .unwrap();
            assert!(res.is_none());
        }
    }

    #[tokio::test]
    async fn update_applies_patch_and_rejects_taken_username() {
        let svc = service();
        let alice = svc.create(candidate("alice")).await.unwrap();
        svc.create(candidate("bob")).await.unwrap();

        let updated = svc
            .update(
                alice.id,
                UserPatch {
                    first_name: Some("Alicia".into()),
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.username, "alice");

        let err = svc
            .update(
                alice.id,
                UserPatch {
                    username: Some("bob".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Conflict(_)));

        // Keeping one's own username is not a conflict.
        svc.update(
            alice.id,
            UserPatch {
                username: Some("alice".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_are_not_found() {
        let svc = service();
        let missing = Uuid::new_v4();

        assert!(matches!(
            svc.update(missing, UserPatch::default()).await,
            Err(UserServiceError::NotFound)
        ));
        assert!(matches!(
            svc.delete(missing).await,
            Err(UserServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_of_missing_user_to_taken_username_is_not_found() {
        let svc = service();
        svc.create(candidate("bob")).await.unwrap();

        let res = svc
            .update(
                Uuid::new_v4(),
                UserPatch {
                    username: Some("bob".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(res, Err(UserServiceError::NotFound)));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let svc = service();
        let alice = svc.create(candidate("alice")).await.unwrap();

        svc.delete(alice.id).await.unwrap();
        assert!(matches!(
            svc.delete(alice.id).await,
            Err(UserServiceError::NotFound)
        ));
    }
}
