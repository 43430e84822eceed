/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り CRUD を提供
 * - unique 制約違反は RepoError::Conflict として返す
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    pub role: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub struct InsertUser<'a> {
    pub id: Uuid,
    pub user_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

pub struct UpdateUser<'a> {
    pub user_name: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<UserRow>> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "firstName", "lastName", "passwordHash", role, "createdAt"
        FROM users
        ORDER BY "createdAt" ASC, "userName" ASC
        "#,
    )
    .fetch_all(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn create(db: &PgPool, user: InsertUser<'_>) -> RepoResult<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users ("userId", "userName", "firstName", "lastName", "passwordHash", role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING "userId", "userName", "firstName", "lastName", "passwordHash", role, "createdAt"
        "#,
    )
    .bind(user.id)
    .bind(user.user_name)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "firstName", "lastName", "passwordHash", role, "createdAt"
        FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn find_by_user_name(db: &PgPool, user_name: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "firstName", "lastName", "passwordHash", role, "createdAt"
        FROM users
        WHERE "userName" = $1
        "#,
    )
    .bind(user_name)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    changes: UpdateUser<'_>,
) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET
            "userName" = COALESCE($2, "userName"),
            "firstName" = COALESCE($3, "firstName"),
            "lastName" = COALESCE($4, "lastName"),
            "passwordHash" = COALESCE($5, "passwordHash"),
            role = COALESCE($6, role)
        WHERE "userId" = $1
        RETURNING "userId", "userName", "firstName", "lastName", "passwordHash", role, "createdAt"
        "#,
    )
    .bind(user_id)
    .bind(changes.user_name)
    .bind(changes.first_name)
    .bind(changes.last_name)
    .bind(changes.password_hash)
    .bind(changes.role)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}
