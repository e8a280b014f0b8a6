//! Browser-backed storage
//!
//! `document.cookie` holds the session, `localStorage` is only read to
//! migrate values written by older builds, and `sessionStorage` keeps the
//! per-tab migration flag.

use chrono::{DateTime, Utc};
use gloo::storage::{LocalStorage, SessionStorage, Storage};
use gloo::utils::{document, window};
use nanostore_core::cookie::{delete_cookie_header, find_cookie, set_cookie_header};
use nanostore_core::{CookieJar, CoreError, CoreResult, KeyValueStore, SessionStore, TokenStore};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Cookies of the current document
///
/// Holds no handle, so it can back the `Send + Sync` token source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCookies;

impl DocumentCookies {
    fn html_document() -> Option<HtmlDocument> {
        document().dyn_into::<HtmlDocument>().ok()
    }

    fn secure() -> bool {
        window()
            .location()
            .protocol()
            .is_ok_and(|protocol| protocol == "https:")
    }

    fn write(header: &str) -> CoreResult<()> {
        let doc = Self::html_document()
            .ok_or_else(|| CoreError::storage("document does not support cookies"))?;
        doc.set_cookie(header)
            .map_err(|err| CoreError::storage(format!("cookie write rejected: {err:?}")))
    }
}

impl CookieJar for DocumentCookies {
    fn get(&self, name: &str) -> Option<String> {
        let header = Self::html_document()?.cookie().ok()?;
        find_cookie(&header, name)
    }

    fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> CoreResult<()> {
        Self::write(&set_cookie_header(name, value, expires, Self::secure()))
    }

    fn remove(&self, name: &str) {
        if let Err(err) = Self::write(&delete_cookie_header(name)) {
            tracing::warn!(name, error = %err, "failed to delete cookie");
        }
    }
}

/// `localStorage`, as raw strings
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStorage;

impl KeyValueStore for LegacyStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| CoreError::storage(format!("localStorage write failed: {err:?}")))
    }

    fn remove(&self, key: &str) {
        let _ = LocalStorage::raw().remove_item(key);
    }
}

/// `sessionStorage`, as raw strings
#[derive(Debug, Clone, Copy, Default)]
pub struct TabStorage;

impl KeyValueStore for TabStorage {
    fn get(&self, key: &str) -> Option<String> {
        SessionStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        SessionStorage::raw()
            .set_item(key, value)
            .map_err(|err| CoreError::storage(format!("sessionStorage write failed: {err:?}")))
    }

    fn remove(&self, key: &str) {
        let _ = SessionStorage::raw().remove_item(key);
    }
}

pub type BrowserSession = SessionStore<DocumentCookies, LegacyStorage, TabStorage>;

pub fn session_store() -> BrowserSession {
    SessionStore::new(DocumentCookies, LegacyStorage, TabStorage)
}

pub fn token_store() -> TokenStore<DocumentCookies> {
    TokenStore::new(DocumentCookies)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use nanostore_core::session::USER_ID_KEY;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn token_lives_in_document_cookie() {
        let tokens = token_store();
        tokens.set("abc.def", Utc::now()).unwrap();
        assert_eq!(tokens.get().as_deref(), Some("Bearer abc.def"));

        tokens.clear();
        assert_eq!(tokens.get(), None);
    }

    #[wasm_bindgen_test]
    fn legacy_keys_move_into_cookies_once() {
        let session = session_store();
        session.clear();
        LegacyStorage.set(USER_ID_KEY, "op-7").unwrap();

        let report = session.migrate(Utc::now()).unwrap();
        assert_eq!(report.copied, vec![USER_ID_KEY]);
        assert_eq!(DocumentCookies.get(USER_ID_KEY).as_deref(), Some("op-7"));
        assert_eq!(LegacyStorage.get(USER_ID_KEY), None);

        assert!(session.migrate(Utc::now()).unwrap().already_done);
        session.clear();
    }
}
