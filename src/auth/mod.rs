use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::utils::error::AppError;

const TOKEN_TTL_SECS: i64 = 3600;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub role: String,
    pub exp: i64,
}

/// HS256 keys derived from the configured secret, shared via [`AppState`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a user, valid for one hour.
    pub fn issue(&self, user_id: i32, role: &str) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT verification failed: {}", e);
                AppError::AuthError("Invalid or expired token".to_string())
            })
    }
}

/// Authenticated principal, extracted from `Authorization: Bearer <token>`.
///
/// Use as a handler parameter to require a logged-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing or malformed token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::AuthError("Missing or malformed token".to_string()))?;

        let claims = state.jwt.verify(token)?;

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Authenticated admin. Rejects with 403 when the principal's role is not
/// `admin`.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != ROLE_ADMIN {
            return Err(AppError::Forbidden(
                "Access denied! Admins only.".to_string(),
            ));
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;

    fn test_state(secret: &str) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/ticketbox_test")
            .expect("lazy pool");
        AppState {
            pool,
            jwt: JwtKeys::new(secret),
        }
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/orders");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = JwtKeys::new("unit-test-secret");
        let token = keys.issue(42, ROLE_CUSTOMER).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, ROLE_CUSTOMER);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = JwtKeys::new("secret-a").issue(1, ROLE_CUSTOMER).unwrap();
        let result = JwtKeys::new("secret-b").verify(&token);

        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let keys = JwtKeys::new("unit-test-secret");
        let claims = Claims {
            sub: 1,
            role: ROLE_CUSTOMER.to_string(),
            exp: Utc::now().timestamp() - 120,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(matches!(keys.verify(&token), Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_extractor_accepts_bearer_token() {
        let state = test_state("unit-test-secret");
        let token = state.jwt.issue(7, ROLE_ADMIN).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, ROLE_ADMIN);
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_header() {
        let state = test_state("unit-test-secret");
        let mut parts = parts_with_auth(None);

        let result = AuthUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_extractor_rejects_non_bearer_scheme() {
        let state = test_state("unit-test-secret");
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));

        let result = AuthUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_customer() {
        let state = test_state("unit-test-secret");
        let token = state.jwt.issue(7, ROLE_CUSTOMER).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let result = RequireAdmin::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_admin_accepts_admin() {
        let state = test_state("unit-test-secret");
        let token = state.jwt.issue(9, ROLE_ADMIN).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));

        let admin = RequireAdmin::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(admin.0.user_id, 9);
    }
}
