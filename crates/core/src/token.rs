//! Bearer token storage

use crate::error::CoreResult;
use crate::session::{LOGIN_TIMESTAMP_KEY, cookie_expiry};
use crate::store::CookieJar;
use chrono::{DateTime, Utc};

/// Canonical cookie holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Keys older builds stored the token under, scanned in order
pub const TOKEN_CANDIDATE_KEYS: [&str; 5] = [
    AUTH_TOKEN_KEY,
    "token",
    "access_token",
    "Authorization",
    "authorization",
];

const BEARER_PREFIX: &str = "Bearer ";

/// Trim a raw token and give it exactly one `Bearer ` prefix.
///
/// An existing prefix is detected case-insensitively and rewritten in
/// canonical case. Returns `None` for blank input.
pub fn normalize_bearer(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(BEARER_PREFIX.trim_end()) {
        return None;
    }
    let body = match trimmed.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
            trimmed[BEARER_PREFIX.len()..].trim_start()
        }
        _ => trimmed,
    };

    if body.is_empty() {
        None
    } else {
        Some(format!("{BEARER_PREFIX}{body}"))
    }
}

/// Reads and writes the auth token in a cookie jar
#[derive(Debug, Clone)]
pub struct TokenStore<J> {
    jar: J,
}

impl<J: CookieJar> TokenStore<J> {
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    /// Store a token under the canonical key.
    ///
    /// The cookie expires 24 hours after the recorded login, or 7 days from
    /// `now` when no login has been recorded. Blank tokens are ignored and
    /// `Ok(None)` is returned.
    pub fn set(&self, raw: &str, now: DateTime<Utc>) -> CoreResult<Option<String>> {
        let Some(token) = normalize_bearer(raw) else {
            return Ok(None);
        };

        let login = self.jar.get(LOGIN_TIMESTAMP_KEY);
        let expires = cookie_expiry(login.as_deref(), now);
        self.jar.set(AUTH_TOKEN_KEY, &token, expires)?;
        tracing::debug!(%expires, "stored auth token");
        Ok(Some(token))
    }

    /// First non-blank token found under any candidate key, trimmed
    pub fn get(&self) -> Option<String> {
        TOKEN_CANDIDATE_KEYS.iter().find_map(|key| {
            self.jar
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    }

    /// Remove the token from every candidate key
    pub fn clear(&self) {
        for key in TOKEN_CANDIDATE_KEYS {
            self.jar.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCookieJar;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_variants() {
        assert_eq!(normalize_bearer("abc").as_deref(), Some("Bearer abc"));
        assert_eq!(normalize_bearer("  Bearer abc ").as_deref(), Some("Bearer abc"));
        assert_eq!(normalize_bearer("bearer abc").as_deref(), Some("Bearer abc"));
        assert_eq!(normalize_bearer("BEARER   abc").as_deref(), Some("Bearer abc"));
        assert_eq!(normalize_bearer("Bearerabc").as_deref(), Some("Bearer Bearerabc"));
        assert_eq!(normalize_bearer("   "), None);
        assert_eq!(normalize_bearer("Bearer "), None);
        assert_eq!(normalize_bearer("ñandú").as_deref(), Some("Bearer ñandú"));
    }

    #[test]
    fn test_set_then_get_returns_normalized() {
        for raw in ["tok", "Bearer tok", "bearer tok", " tok "] {
            let store = TokenStore::new(MemoryCookieJar::new());
            let written = store.set(raw, now()).unwrap();
            assert_eq!(store.get(), written);
            assert_eq!(store.get().as_deref(), normalize_bearer(raw).as_deref());
        }
    }

    #[test]
    fn test_set_ignores_blank() {
        let store = TokenStore::new(MemoryCookieJar::new());
        assert_eq!(store.set("  ", now()).unwrap(), None);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_expiry_follows_login_timestamp() {
        let jar = MemoryCookieJar::new();
        let login = now() - Duration::hours(2);
        jar.set(
            LOGIN_TIMESTAMP_KEY,
            &login.timestamp_millis().to_string(),
            now(),
        )
        .unwrap();

        let store = TokenStore::new(&jar);
        store.set("tok", now()).unwrap();
        assert_eq!(jar.expires(AUTH_TOKEN_KEY), Some(login + Duration::hours(24)));
    }

    #[test]
    fn test_expiry_defaults_to_seven_days() {
        let jar = MemoryCookieJar::new();
        TokenStore::new(&jar).set("tok", now()).unwrap();
        assert_eq!(jar.expires(AUTH_TOKEN_KEY), Some(now() + Duration::days(7)));
    }

    #[test]
    fn test_get_scans_legacy_aliases_in_order() {
        let jar = MemoryCookieJar::new();
        jar.set("authorization", "Bearer lower", now()).unwrap();
        jar.set("access_token", "   ", now()).unwrap();
        let store = TokenStore::new(&jar);
        assert_eq!(store.get().as_deref(), Some("Bearer lower"));

        jar.set("token", " Bearer legacy ", now()).unwrap();
        assert_eq!(store.get().as_deref(), Some("Bearer legacy"));

        store.clear();
        assert_eq!(store.get(), None);
        assert!(jar.is_empty());
    }
}
