/// Revoked token bookkeeping
///
/// A revoked token is stored by its `jti` nonce together with its own expiry,
/// so rows can be pruned once the token would be rejected anyway.

use chrono::Utc;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::AppError;

/// Record a token's nonce as revoked
///
/// Idempotent: revoking an already revoked nonce leaves the original row
/// untouched. Concurrent revocations of the same nonce are serialized by the
/// unique constraint on `jti`.
///
/// # Returns
/// `true` if this call inserted the row, `false` if it was already revoked
pub async fn revoke<'e, E>(executor: E, claims: &Claims) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let nonce = claims.nonce()?;

    let result = sqlx::query(
        r#"
        INSERT INTO revoked_tokens (jti, revoked_at, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(nonce)
    .bind(Utc::now())
    .bind(claims.expires_at())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Whether a nonce has been revoked
pub async fn check_revoked<'e, E>(executor: E, nonce: Uuid) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let revoked = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)",
    )
    .bind(nonce)
    .fetch_one(executor)
    .await?;

    Ok(revoked)
}

/// Delete revocation records for tokens that have already expired
///
/// # Returns
/// Number of rows removed
pub async fn prune_expired<'e, E>(executor: E) -> Result<u64, AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
        .bind(Utc::now())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
