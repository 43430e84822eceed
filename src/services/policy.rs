//! Access policy for `/users` resources.
//!
//! Pure decision functions: no IO, no panics. Handlers call these after the
//! bearer middleware has produced an `Identity`, so a denial here is always
//! a 403 and never a 401.

use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListAll,
    ReadSelf,
    ReadOther,
    Update,
    Delete,
    Register,
}

impl Action {
    /// `GET /users/{id}` is a self read when the id is the caller's own.
    pub fn for_read(identity: &Identity, target: Uuid) -> Self {
        if identity.subject == target {
            Self::ReadSelf
        } else {
            Self::ReadOther
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotOwner,
    AdminRequired,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::NotOwner => "not allowed to access this user",
            DenialReason::AdminRequired => "admin role required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.allowed {
            return Ok(());
        }
        let reason = self.reason.unwrap_or(DenialReason::NotOwner);
        Err(AppError::forbidden(reason.message()))
    }
}

pub fn authorize(identity: &Identity, action: Action, target: Option<Uuid>) -> AccessDecision {
    let is_owner = target == Some(identity.subject);

    match action {
        Action::Register => AccessDecision::allow(),
        Action::ReadSelf => {
            if is_owner {
                AccessDecision::allow()
            } else {
                AccessDecision::deny(DenialReason::NotOwner)
            }
        }
        Action::ListAll | Action::ReadOther | Action::Update | Action::Delete => {
            if is_owner || identity.is_admin() {
                AccessDecision::allow()
            } else if target.is_none() {
                AccessDecision::deny(DenialReason::AdminRequired)
            } else {
                AccessDecision::deny(DenialReason::NotOwner)
            }
        }
    }
}

/// Changing a user's role is reserved for admins, including on one's own record.
pub fn authorize_role_change(identity: &Identity) -> AccessDecision {
    if identity.is_admin() {
        AccessDecision::allow()
    } else {
        AccessDecision::deny(DenialReason::AdminRequired)
    }
}
