// src/spotify/oauth.rs
//! OAuth `state` handling shared by the link and sign-in callbacks

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::auth::models::OAuthCallbackQuery;
use crate::common::ApiError;

pub const STATE_COOKIE: &str = "spotify_oauth_state";

pub fn state_cookie(nonce: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, nonce))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn clear_state_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((STATE_COOKIE, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

/// The `state` echoed by Spotify must match the nonce set when the flow began
pub fn verify_state(jar: &CookieJar, returned: Option<&str>) -> Result<(), ApiError> {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    match (expected, returned) {
        (Some(expected), Some(returned)) if !expected.is_empty() && expected == returned => Ok(()),
        _ => {
            warn!("Spotify callback state mismatch");
            Err(ApiError::ValidationError(
                "state: does not match the authorization request".to_string(),
            ))
        }
    }
}

/// The authorization code, or the provider's error as a validation error
pub fn callback_code(query: &OAuthCallbackQuery) -> Result<String, ApiError> {
    if let Some(error) = &query.error {
        warn!(error = %error, "Spotify authorization was not granted");
        return Err(ApiError::ValidationError(format!(
            "Spotify authorization failed: {}",
            error
        )));
    }

    query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::ValidationError("code: is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(code: Option<&str>, error: Option<&str>) -> OAuthCallbackQuery {
        OAuthCallbackQuery {
            code: code.map(str::to_string),
            state: None,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_verify_state() {
        let jar = CookieJar::new().add(state_cookie("nonce".to_string(), false));

        assert!(verify_state(&jar, Some("nonce")).is_ok());
        assert!(verify_state(&jar, Some("other")).is_err());
        assert!(verify_state(&jar, None).is_err());
        assert!(verify_state(&CookieJar::new(), Some("nonce")).is_err());
    }

    #[test]
    fn test_callback_code() {
        assert_eq!(callback_code(&query(Some("abc"), None)).unwrap(), "abc");
        assert!(matches!(
            callback_code(&query(None, None)),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            callback_code(&query(Some("abc"), Some("access_denied"))),
            Err(ApiError::ValidationError(_))
        ));
    }
}
