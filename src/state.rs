/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - users: user service (collaborator), tokens: TokenService (署名鍵は起動時に一度だけ注入)
 * - Clone 前提で持つ (内部は Arc で Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::TokenService, users::UserService};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserService>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
