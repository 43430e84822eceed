//! Bearer token 検証 → Identity を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を受け取り、TokenService で署名と exp を検証する
//! - ヘッダ欠落 / scheme 違い / 不正 token はすべて同じ 401 (理由はログにだけ残す)
//! - 認可 (Access Policy) は handler 側で Identity を使って行う

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// 保護対象の routes に認証を掛ける。
///
/// `route_layer` なので、マッチしなかったリクエスト (404/405) には掛からない。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// Extract the bearer token. The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        tracing::warn!("missing or malformed authorization header");
        return Err(AppError::invalid_token());
    };

    let identity = match state.tokens.verify(token) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::invalid_token());
        }
    };

    tracing::debug!(subject = %identity.subject, role = %identity.role, "authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
