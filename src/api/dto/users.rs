/*
 * Responsibility
 * - Users の request/response DTO (wire は camelCase)
 * - validation (形式チェック) 用の validate()
 * - response に password hash を載せない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::users::{Credentials, NewUser, Role, UserPatch, UserRecord};

const MAX_FIELD_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

impl AuthenticateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

impl From<AuthenticateRequest> for Credentials {
    fn from(req: AuthenticateRequest) -> Self {
        Self {
            username: req.username.trim().to_string(),
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > MAX_FIELD_LEN {
            return Err("username must be <= 256 chars");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.first_name.len() > MAX_FIELD_LEN || self.last_name.len() > MAX_FIELD_LEN {
            return Err("names must be <= 256 chars");
        }
        Ok(())
    }
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username.trim().to_string(),
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.username
            && (name.trim().is_empty() || name.len() > MAX_FIELD_LEN)
        {
            return Err("username cannot be empty or longer than 256 chars");
        }
        if let Some(password) = &self.password
            && password.is_empty()
        {
            return Err("password cannot be empty");
        }
        let too_long =
            |name: &Option<String>| name.as_ref().is_some_and(|n| n.len() > MAX_FIELD_LEN);
        if too_long(&self.first_name) || too_long(&self.last_name) {
            return Err("names must be <= 256 chars");
        }
        Ok(())
    }
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username.map(|u| u.trim().to_string()),
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub expires_in: u64,
}
