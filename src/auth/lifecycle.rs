/// Token Lifecycle Manager
///
/// Glue between token decoding and revocation state. A token is accepted only
/// if its signature and expiry check out, its type matches, and its nonce has
/// not been revoked, checked in that order.

use sqlx::PgPool;

use crate::auth::claims::{Claims, TokenType};
use crate::auth::jwt::{decode_token_of_type, generate_access_token};
use crate::auth::revocation::check_revoked;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Validate a token of the expected type and make sure it is not revoked
pub async fn validate_token(
    pool: &PgPool,
    token: &str,
    expected: TokenType,
    config: &JwtSettings,
) -> Result<Claims, AppError> {
    let claims = decode_token_of_type(token, expected, config)?;

    if check_revoked(pool, claims.nonce()?).await? {
        return Err(AppError::Auth(AuthError::TokenRevoked));
    }

    Ok(claims)
}

/// Per-request gate for protected endpoints
pub async fn authorize_access(
    pool: &PgPool,
    token: &str,
    config: &JwtSettings,
) -> Result<Claims, AppError> {
    validate_token(pool, token, TokenType::Access, config).await
}

/// Mint a new access token from a refresh token
///
/// # Errors
/// `InvalidToken`, `TokenExpired`, `WrongTokenType` or `TokenRevoked`
pub async fn refresh(
    pool: &PgPool,
    refresh_token: &str,
    config: &JwtSettings,
) -> Result<(Claims, String), AppError> {
    let claims = validate_token(pool, refresh_token, TokenType::Refresh, config).await?;
    let access_token = generate_access_token(&claims.user_id()?, config)?;

    Ok((claims, access_token))
}
