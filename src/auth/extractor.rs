// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::{AuthError, AuthenticatedUser, TokenClaims};
use crate::state::RegistryState;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Cookie carrying the token when no Authorization header is sent.
pub const TOKEN_COOKIE: &str = "token";

/// HS256 verification settings for caller tokens.
pub struct AuthConfig {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthConfig {
    pub fn hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify signature and expiry, then resolve the user id.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            })?;

        let user_id = token_data
            .claims
            .resolved_user_id()
            .ok_or(AuthError::MalformedToken)?;

        Ok(AuthenticatedUser {
            user_id: user_id.to_string(),
        })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("algorithm", &"HS256")
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

/// Extractor for authenticated users.
///
/// Reads the token from `Authorization: Bearer <token>` or, failing that,
/// from the `token` cookie.
///
/// # Example
///
/// ```rust,ignore
/// async fn create_wallet(
///     Auth(user): Auth,
///     State(state): State<RegistryState>,
/// ) -> Result<Json<CreateWalletResponse>, ApiError> {
///     // user.user_id is the caller
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<RegistryState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &RegistryState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .or_else(|| cookie_token(parts))
            .ok_or(AuthError::MissingToken)?;

        let user = state.auth.verify(&token)?;
        Ok(Auth(user))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    Ok(Some(token.to_string()))
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::RegistryState;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub const TEST_SECRET: &[u8] = b"test-jwt-secret";

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// Sign a token the way the account service does.
    pub fn issue_token(user_id: &str) -> String {
        sign(json!({ "UserID": user_id, "exp": now() + 3600 }), TEST_SECRET)
    }

    fn sign(claims: serde_json::Value, secret: &[u8]) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn parts_with(header: Option<(&str, String)>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_token() {
        let state = RegistryState::for_tests();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_bearer() {
        let state = RegistryState::for_tests();
        let mut parts = parts_with(Some((
            "Authorization",
            format!("Bearer {}", issue_token("user_123")),
        )));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.user_id, "user_123");
    }

    #[tokio::test]
    async fn auth_extractor_reads_cookie() {
        let state = RegistryState::for_tests();
        let mut parts = parts_with(Some((
            "Cookie",
            format!("theme=dark; token={}", issue_token("user_456")),
        )));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.user_id, "user_456");
    }

    #[tokio::test]
    async fn rejects_non_bearer_header() {
        let state = RegistryState::for_tests();
        let mut parts = parts_with(Some(("Authorization", "Basic dXNlcjpwdw==".to_string())));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[test]
    fn rejects_wrong_secret() {
        let config = AuthConfig::hs256(TEST_SECRET);
        let token = sign(json!({ "UserID": "u", "exp": now() + 60 }), b"other-secret");
        assert_eq!(config.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn rejects_expired_token() {
        let config = AuthConfig::hs256(TEST_SECRET);
        let token = sign(json!({ "UserID": "u", "exp": now() - 3600 }), TEST_SECRET);
        assert_eq!(config.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn rejects_token_without_exp_or_user() {
        let config = AuthConfig::hs256(TEST_SECRET);

        let no_exp = sign(json!({ "UserID": "u" }), TEST_SECRET);
        assert_eq!(config.verify(&no_exp), Err(AuthError::MalformedToken));

        let no_user = sign(json!({ "exp": now() + 60 }), TEST_SECRET);
        assert_eq!(config.verify(&no_user), Err(AuthError::MalformedToken));
    }

    #[test]
    fn rejects_garbage() {
        let config = AuthConfig::hs256(TEST_SECRET);
        assert_eq!(config.verify("not.a.jwt"), Err(AuthError::MalformedToken));
    }
}
