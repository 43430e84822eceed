/*
 * Responsibility
 * - /users 系 handler (authenticate / register / list / current / get / update / delete)
 * - Identity を受け取り Access Policy で認可 → user service 呼び出し → response 整形
 * - 失敗は AppError で返すだけ (status code はここで決めない)
 */
use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    api::{
        dto::users::{
            AuthenticateRequest, AuthenticateResponse, RegisterRequest, UpdateUserRequest,
            UserResponse,
        },
        extractors::{AuthIdentity, Payload, UserIdPath},
    },
    error::AppError,
    services::policy::{Action, authorize, authorize_role_change},
    state::AppState,
};

fn empty() -> Json<Value> {
    Json(json!({}))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Payload(req): Payload<AuthenticateRequest>,
) -> Result<Json<AuthenticateResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;
    let username = req.username.clone();

    // Unknown username and wrong password look the same to the caller.
    let user = state.users.authenticate(req.into()).await?.ok_or_else(|| {
        tracing::info!(%username, "authentication failed");
        AppError::unauthenticated("username or password is incorrect")
    })?;

    let issued = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "user authenticated");

    Ok(Json(AuthenticateResponse {
        user: user.into(),
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let user = state.users.create(req.into()).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(empty())
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    authorize(&identity, Action::ListAll, None).into_result()?;

    let users = state.users.get_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_current(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&identity, Action::ReadSelf, Some(identity.subject)).into_result()?;

    let user = state
        .users
        .get_by_id(identity.subject)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(user.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<UserResponse>, AppError> {
    let action = Action::for_read(&identity, user_id);
    authorize(&identity, action, Some(user_id)).into_result()?;

    let user = state
        .users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    UserIdPath(user_id): UserIdPath,
    Payload(req): Payload<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    authorize(&identity, Action::Update, Some(user_id)).into_result()?;
    if req.role.is_some() {
        authorize_role_change(&identity).into_result()?;
    }
    req.validate().map_err(AppError::validation)?;

    state.users.update(user_id, req.into()).await?;
    tracing::info!(user_id = %user_id, by = %identity.subject, "user updated");

    Ok(empty())
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<Value>, AppError> {
    authorize(&identity, Action::Delete, Some(user_id)).into_result()?;

    state.users.delete(user_id).await?;
    tracing::info!(user_id = %user_id, by = %identity.subject, "user deleted");

    Ok(empty())
}
