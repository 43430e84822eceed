/*
 * Responsibility
 * - URL 構造を定義
 * - /users/authenticate, /users/register は認証なし
 * - それ以外の /users 系は bearer middleware を route_layer で適用
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    health::health,
    users::{authenticate, delete_user, get_current, get_user, list_users, register, update_user},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/users/authenticate", post(authenticate))
        .route("/users/register", post(register));

    let protected = Router::new()
        .route("/users", get(list_users))
        .route("/users/current", get(get_current))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        );
    let protected = middleware::auth::access::apply(protected, state);

    public.merge(protected)
}
