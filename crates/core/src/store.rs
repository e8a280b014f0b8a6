//! Key/value storage seams
//!
//! The browser exposes three places to keep session material: cookies (the
//! source of truth), `localStorage` (the legacy scheme being migrated away
//! from) and `sessionStorage` (per-tab flags). The traits here abstract over
//! them so the session logic can run and be tested natively.

use crate::cookie::{find_cookie, set_cookie_header, split_pair};
use crate::error::CoreResult;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Plain string storage, shaped like the Web Storage API
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    fn remove(&self, key: &str);
}

/// Cookie storage with per-entry expiry
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> CoreResult<()>;

    fn remove(&self, name: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

impl<T: CookieJar + ?Sized> CookieJar for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> CoreResult<()> {
        (**self).set(name, value, expires)
    }

    fn remove(&self, name: &str) {
        (**self).remove(name)
    }
}

impl<T: CookieJar + ?Sized> CookieJar for Arc<T> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> CoreResult<()> {
        (**self).set(name, value, expires)
    }

    fn remove(&self, name: &str) {
        (**self).remove(name)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a map half-written
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    encoded: String,
    expires: DateTime<Utc>,
}

/// In-memory [`CookieJar`] that goes through the same header encoding the
/// browser jar uses.
///
/// Expiry is recorded but not enforced on reads; callers that care inspect
/// [`MemoryCookieJar::expires`].
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<(String, StoredCookie)>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the jar the way `document.cookie` reads
    pub fn header(&self) -> String {
        lock(&self.cookies)
            .iter()
            .map(|(name, cookie)| format!("{name}={}", cookie.encoded))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Expiry recorded for a cookie
    pub fn expires(&self, name: &str) -> Option<DateTime<Utc>> {
        lock(&self.cookies)
            .iter()
            .find(|(cookie_name, _)| cookie_name == name)
            .map(|(_, cookie)| cookie.expires)
    }

    pub fn len(&self) -> usize {
        lock(&self.cookies).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        find_cookie(&self.header(), name)
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> CoreResult<()> {
        let header = set_cookie_header(name, value, expires, false);
        let Some((name, encoded)) = split_pair(&header) else {
            return Err(crate::error::CoreError::storage(format!(
                "invalid cookie name: {name:?}"
            )));
        };
        let stored = StoredCookie {
            encoded: encoded.to_string(),
            expires,
        };

        let mut cookies = lock(&self.cookies);
        match cookies.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = stored,
            None => cookies.push((name.to_string(), stored)),
        }
        Ok(())
    }

    fn remove(&self, name: &str) {
        lock(&self.cookies).retain(|(existing, _)| existing != name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("user_id", "7").unwrap();
        assert_eq!(store.get("user_id").as_deref(), Some("7"));
        store.remove("user_id");
        assert_eq!(store.get("user_id"), None);
    }

    #[test]
    fn test_cookie_jar_overwrites_in_place() {
        let jar = MemoryCookieJar::new();
        jar.set("a", "1", expiry()).unwrap();
        jar.set("b", "2", expiry()).unwrap();
        jar.set("a", "3", expiry()).unwrap();
        assert_eq!(jar.header(), "a=3; b=2");
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_cookie_jar_encodes_values() {
        let jar = MemoryCookieJar::new();
        jar.set("api_config", r#"{"origin":"https://x; y=z"}"#, expiry())
            .unwrap();
        assert!(!jar.header().contains(';'));
        assert_eq!(
            jar.get("api_config").as_deref(),
            Some(r#"{"origin":"https://x; y=z"}"#)
        );
        assert_eq!(jar.expires("api_config"), Some(expiry()));
    }

    #[test]
    fn test_cookie_jar_rejects_empty_name() {
        let jar = MemoryCookieJar::new();
        assert!(jar.set("", "x", expiry()).is_err());
    }

    #[test]
    fn test_shared_references_delegate() {
        let jar = Arc::new(MemoryCookieJar::new());
        let by_ref: &dyn CookieJar = &*jar;
        by_ref.set("k", "v", expiry()).unwrap();
        assert_eq!(jar.get("k").as_deref(), Some("v"));
        jar.remove("k");
        assert!(jar.is_empty());
    }
}
