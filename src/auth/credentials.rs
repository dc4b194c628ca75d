/// Credential Store
///
/// Persists usernames with bcrypt password hashes and checks login attempts.
/// Callers pass the executor explicitly: a pool for one-shot reads, a
/// request-scoped transaction for writes.

use chrono::Utc;
use sqlx::postgres::PgExecutor;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AuthError, DatabaseError};

/// Create a user, returning its identifier
///
/// The caller commits the transaction.
///
/// # Errors
/// - `DuplicateUsername` if the username is taken, including when a
///   concurrent registration wins the race on the unique constraint
/// - validation errors from password hashing
pub async fn register_user(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    password: &str,
) -> Result<Uuid, AppError> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        return Err(AppError::Auth(AuthError::DuplicateUsername));
    }

    let password_hash = hash_password(password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(username)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
            AppError::Auth(AuthError::DuplicateUsername)
        }
        other => other,
    })?;

    Ok(user_id)
}

/// Check a username/password pair
///
/// Returns `None` both for unknown usernames and wrong passwords.
pub async fn authenticate<'e, E>(
    executor: E,
    username: &str,
    password: &str,
) -> Result<Option<Uuid>, AppError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, password_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(executor)
    .await?;

    let Some((user_id, password_hash)) = user else {
        return Ok(None);
    };

    if verify_password(password, &password_hash)? {
        Ok(Some(user_id))
    } else {
        Ok(None)
    }
}
