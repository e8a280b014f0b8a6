//! Where the client reads its bearer token from

use nanostore_core::store::CookieJar;
use nanostore_core::token::{TokenStore, normalize_bearer};

/// Supplies the `Authorization` header value, read fresh for every request
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A token fixed at construction, for the CLI and tests
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(raw: &str) -> Self {
        Self(normalize_bearer(raw))
    }

    pub const fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<J> TokenSource for TokenStore<J>
where
    J: CookieJar + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nanostore_core::store::MemoryCookieJar;
    use std::sync::Arc;

    #[test]
    fn test_static_token_is_normalized() {
        assert_eq!(StaticToken::new("abc").token().as_deref(), Some("Bearer abc"));
        assert_eq!(StaticToken::new("  ").token(), None);
    }

    #[test]
    fn test_token_store_is_read_on_demand() {
        let jar = Arc::new(MemoryCookieJar::new());
        let source: Arc<dyn TokenSource> = Arc::new(TokenStore::new(Arc::clone(&jar)));
        assert_eq!(source.token(), None);

        TokenStore::new(&*jar).set("fresh", Utc::now()).unwrap();
        assert_eq!(source.token().as_deref(), Some("Bearer fresh"));
    }
}
