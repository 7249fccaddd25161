//! Authentication middleware.
//!
//! Staff clients authenticate with `Authorization: Bearer <api_key>`. When
//! auth is disabled in config every request passes through.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hotelier_core::config::AuthConfig;

use crate::context::AppContext;
use crate::error::AppError;

/// Check raw header values against the auth config.
pub fn validate_auth_headers(auth_config: &AuthConfig, authorization: Option<&str>) -> bool {
    if !auth_config.enabled {
        return true;
    }

    // Auth enabled without a key locks everything; `Config::validate` warns.
    let Some(api_key) = auth_config.api_key.as_deref().filter(|k| !k.is_empty()) else {
        return false;
    };

    authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .is_some_and(|token| token == api_key)
}

/// Generate a random API key suitable for `auth.api_key`.
pub fn generate_api_key() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Authentication middleware. Applied to the `/api` routes.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if validate_auth_headers(&ctx.config.auth, authorization) {
        Ok(next.run(request).await)
    } else {
        Err(AppError::new(hotelier_core::Error::Unauthorized(
            "Authentication required".into(),
        ))
        .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(key: Option<&str>) -> AuthConfig {
        AuthConfig {
            enabled: true,
            api_key: key.map(String::from),
        }
    }

    #[test]
    fn disabled_allows_anything() {
        assert!(validate_auth_headers(&AuthConfig::default(), None));
    }

    #[test]
    fn bearer_must_match_key() {
        let cfg = enabled(Some("s3cret"));
        assert!(validate_auth_headers(&cfg, Some("Bearer s3cret")));
        assert!(!validate_auth_headers(&cfg, Some("Bearer wrong")));
        assert!(!validate_auth_headers(&cfg, Some("Basic s3cret")));
        assert!(!validate_auth_headers(&cfg, None));
    }

    #[test]
    fn generated_keys_are_distinct_and_url_safe() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn enabled_without_key_denies() {
        assert!(!validate_auth_headers(&enabled(None), Some("Bearer ")));
        assert!(!validate_auth_headers(&enabled(Some("")), Some("Bearer ")));
    }
}
