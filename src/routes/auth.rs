/// Authentication Routes
///
/// Registration, login, access token refresh and logout.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::middleware::bearer_token;
use crate::validators::is_valid_username;

/// Registration and login request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/register
///
/// # Errors
/// - 400: Username already exists, or empty/oversized fields
/// - 500: Internal server error
pub async fn register(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let username = is_valid_username(&form.username)?;

    let mut transaction = pool.begin().await?;
    let user_id = match auth::register_user(&mut transaction, &username, &form.password).await {
        Ok(user_id) => user_id,
        Err(e) => {
            context.log_error(&e);
            return Err(e);
        }
    };
    transaction.commit().await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User created successfully".to_string(),
        user_id,
    }))
}

/// POST /auth/login
///
/// Returns an access/refresh token pair.
///
/// # Errors
/// - 401: Unknown username or wrong password (same response for both)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user_id = auth::authenticate(pool.get_ref(), form.username.trim(), &form.password)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let tokens = auth::issue_pair(&user_id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /auth/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token itself
/// stays valid; only a new access token is issued.
///
/// # Errors
/// - 401: Missing, invalid, expired, revoked, or non-refresh token
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let token = bearer_token(
        req.headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    )?;

    let (claims, access_token) = auth::refresh(pool.get_ref(), token, jwt_config.get_ref()).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %claims.sub,
        "Access token refreshed"
    );

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /auth/logout
///
/// Revokes the access token used for this request. Runs behind the JWT
/// middleware, so the claims are already validated.
pub async fn logout(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_logout").with_user_id(claims.sub.clone());

    let mut transaction = pool.begin().await?;
    let inserted = auth::revoke(&mut transaction, &claims).await?;
    transaction.commit().await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %claims.sub,
        jti = %claims.jti,
        newly_revoked = inserted,
        "User logged out"
    );

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}
