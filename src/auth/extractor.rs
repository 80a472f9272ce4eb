// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! ## Verification Modes
//!
//! - `AUTH_JWKS_URL` set: signature checked against the JWKS (RS*/ES*)
//! - `AUTH_JWT_SECRET` set: HS256 with the shared secret
//! - neither: rejected, unless built with the `dev` feature (no signature check)

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::TokenClaims;
use super::{AuthError, AuthenticatedUser};
use crate::state::{AppState, AuthConfig};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor requiring a valid bearer token.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_jwt(token, &state.auth_config).await?;
        Ok(Auth(user))
    }
}

/// Verify a token with whichever key source is configured.
pub async fn verify_jwt(token: &str, config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    if let Some(jwks) = &config.jwks {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let (key, algorithm) = match &header.kid {
            Some(kid) => jwks.get_decoding_key(kid).await?,
            None => jwks.get_any_decoding_key().await?,
        };
        return verify_with_key(token, &key, algorithm, config);
    }

    if let Some(secret) = &config.jwt_secret {
        let key = DecodingKey::from_secret(secret.as_bytes());
        return verify_with_key(token, &key, Algorithm::HS256, config);
    }

    verify_unconfigured(token)
}

fn verify_with_key(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
    config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let data = decode::<TokenClaims>(token, key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    })?;

    Ok(AuthenticatedUser::from_claims(data.claims))
}

#[cfg(feature = "dev")]
fn verify_unconfigured(token: &str) -> Result<AuthenticatedUser, AuthError> {
    tracing::warn!("No token verification configured; decoding without signature check");
    let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;

    let now = chrono::Utc::now().timestamp();
    if data.claims.exp > 0 && data.claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }
    Ok(AuthenticatedUser::from_claims(data.claims))
}

#[cfg(not(feature = "dev"))]
fn verify_unconfigured(_token: &str) -> Result<AuthenticatedUser, AuthError> {
    Err(AuthError::NotConfigured)
}

/// Extractor requiring a staff (or superuser) account.
pub struct StaffOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for StaffOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_staff() {
            tracing::warn!(user_id = %user.user_id, role = %user.role, "Staff-only endpoint denied");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(StaffOnly(user))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` when no `Authorization` header is sent, so the access policy
/// can produce its own denial. A token that is present but fails verification
/// is rejected with its `AuthError`.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(AuthError::MissingAuthHeader) => Ok(OptionalAuth(None)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::claims::PublicMetadata;
    use crate::auth::PlatformRole;
    use crate::state::test_support::{test_state, TEST_SECRET};
    use axum::http::{Request, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};

    /// Mint an HS256 token signed with the test secret.
    pub(crate) fn mint(user_id: &str, role: Option<&str>, exp: i64) -> String {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: 1_609_459_200,
            exp,
            iss: "test".to_string(),
            sid: Some("sess_123".to_string()),
            aud: None,
            public_metadata: role.map(|r| PublicMetadata {
                role: Some(r.to_string()),
            }),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn parts_with_token(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_token(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic abc")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_accepts_signed_token() {
        let (state, _temp_dir) = test_state();
        let token = mint("user_123", Some("staff"), 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role, PlatformRole::Staff);
        assert_eq!(user.session_id.as_deref(), Some("sess_123"));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_wrong_secret() {
        let (state, _temp_dir) = test_state();
        let claims = TokenClaims {
            sub: "user_123".into(),
            iat: 0,
            exp: 9_999_999_999,
            iss: "test".into(),
            sid: None,
            aud: None,
            public_metadata: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();
        let mut parts = parts_with_token(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_expired_token() {
        let (state, _temp_dir) = test_state();
        let token = mint("user_123", None, 1_609_459_200);
        let mut parts = parts_with_token(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn auth_extractor_checks_issuer_when_configured() {
        let (state, _temp_dir) = test_state();
        let state = state.with_auth_config(AuthConfig {
            jwt_secret: Some(TEST_SECRET.to_string()),
            issuer: Some("https://issuer.example.org".to_string()),
            ..Default::default()
        });
        let token = mint("user_123", None, 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidIssuer)));
    }

    #[cfg(not(feature = "dev"))]
    #[tokio::test]
    async fn unconfigured_verification_rejects_tokens() {
        let (state, _temp_dir) = test_state();
        let state = state.with_auth_config(AuthConfig::default());
        let token = mint("user_123", None, 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::NotConfigured)));
    }

    #[tokio::test]
    async fn staff_only_rejects_regular_user() {
        let (state, _temp_dir) = test_state();
        let token = mint("user_123", Some("user"), 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let result = StaffOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn staff_only_accepts_superuser() {
        let (state, _temp_dir) = test_state();
        let token = mint("root", Some("superuser"), 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let StaffOnly(found) = StaffOnly::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(found.is_superuser());
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_token(None);

        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn optional_auth_rejects_expired_token_with_error_code() {
        let (state, _temp_dir) = test_state();
        let token = mint("user_123", None, 1_609_459_200);
        let mut parts = parts_with_token(Some(&token));

        let result = OptionalAuth::from_request_parts(&mut parts, &state).await;
        let err = result.err().unwrap();
        assert!(matches!(err, AuthError::TokenExpired));
        assert_eq!(err.error_code(), "token_expired");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn optional_auth_surfaces_jwks_outage_as_server_error() {
        let (state, _temp_dir) = test_state();
        let state = state.with_auth_config(AuthConfig {
            jwks: Some(crate::auth::JwksManager::new("http://127.0.0.1:9/jwks.json").unwrap()),
            ..Default::default()
        });
        let token = mint("user_123", None, 9_999_999_999);
        let mut parts = parts_with_token(Some(&token));

        let err = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::JwksFetchError(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
