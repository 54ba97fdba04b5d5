use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::info;

use smartcycle_db::Database;
use smartcycle_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use smartcycle_types::models::Claims;

use crate::error::{ApiError, blocking};

const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_LIFETIME_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();
    let location = req.location.trim().to_string();

    if name.is_empty() || email.is_empty() || location.is_empty() {
        return Err(ApiError::BadRequest("name, email and location are required".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password = req.password;
    let user_email = email.clone();
    let user_id = blocking(&state, move |db| {
        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        db.create_user(&name, &user_email, &password_hash, &location)?
            .ok_or_else(|| ApiError::Conflict("email already registered".into()))
    })
    .await?;

    info!("Registered user {} ({})", user_id, email);
    let token = create_token(&state.jwt_secret, user_id, &email)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_string();
    let password = req.password;

    let user = blocking(&state, move |db| {
        let user = db.get_user_by_email(&email)?.ok_or(ApiError::Unauthorized)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| ApiError::Internal(format!("stored hash for {} is invalid: {}", user.email, e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::Unauthorized)?;

        db.touch_last_login(&user.email)?;
        Ok(user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.email)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        name: user.name,
        email: user.email,
        location: user.location,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: i64, email: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_identity() {
        let token = create_token("secret", 7, "a@x.com").unwrap();
        let claims = verify_token("secret", &token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token("secret", 7, "a@x.com").unwrap();
        assert!(matches!(verify_token("another", &token), Err(ApiError::Unauthorized)));
    }
}
