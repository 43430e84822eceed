/*
 * Responsibility
 * - Token 検証に成功したリクエストにだけ付与される「認証済み主体」の型
 * - middleware が request extensions に格納し、handler は extractor 経由でのみ受け取る
 * - リクエスト単位で生成・破棄 (永続化もキャッシュもしない)
 */
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::users::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(subject: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject,
            role,
            expires_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
