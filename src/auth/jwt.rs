/// JWT Token Generation and Validation
///
/// Access and refresh tokens are both HS256 JWTs signed with the configured
/// secret; they differ only by their `type` claim and lifetime.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenType};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Freshly issued access and refresh tokens for one login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign a set of claims
pub fn encode_claims(claims: &Claims, config: &JwtSettings) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Generate a new access token for a user
pub fn generate_access_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        TokenType::Access,
        config.access_token_expiry,
        config.issuer.clone(),
    );
    encode_claims(&claims, config)
}

/// Generate a new refresh token for a user
pub fn generate_refresh_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        TokenType::Refresh,
        config.refresh_token_expiry,
        config.issuer.clone(),
    );
    encode_claims(&claims, config)
}

/// Issue an access/refresh pair, each with its own nonce
pub fn issue_pair(user_id: &Uuid, config: &JwtSettings) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: generate_access_token(user_id, config)?,
        refresh_token: generate_refresh_token(user_id, config)?,
    })
}

/// Verify signature, issuer and expiry, returning the claims
///
/// # Errors
/// - `TokenExpired` if the signature is valid but `exp` has passed
/// - `InvalidToken` for anything else (tampered, malformed, wrong issuer)
pub fn decode_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
        _ => {
            tracing::warn!("JWT validation error: {}", e);
            AppError::Auth(AuthError::InvalidToken)
        }
    })
}

/// Decode a token and require the given type
pub fn decode_token_of_type(
    token: &str,
    expected: TokenType,
    config: &JwtSettings,
) -> Result<Claims, AppError> {
    let claims = decode_token(token, config)?;
    if claims.token_type != expected {
        return Err(AppError::Auth(AuthError::WrongTokenType));
    }
    Ok(claims)
}
