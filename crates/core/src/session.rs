//! Operator session record and its cookie-backed store

use crate::error::CoreResult;
use crate::store::{CookieJar, KeyValueStore};
use crate::token::{AUTH_TOKEN_KEY, TokenStore};
use crate::types::Robot;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const USER_ID_KEY: &str = "user_id";
pub const USER_NAME_KEY: &str = "user_name";
pub const LOGIN_TIMESTAMP_KEY: &str = "login_timestamp";

pub const ROBOT_NAME_KEY: &str = "robotname";
pub const ROBOT_ROWS_KEY: &str = "robot_num_rows";
pub const ROBOT_RACKS_KEY: &str = "robot_num_racks";
pub const ROBOT_SLOTS_KEY: &str = "robot_num_slots";
pub const ROBOT_DEPTHS_KEY: &str = "robot_num_depths";

/// Every key the dashboard owns; migrated and cleared as a set
pub const MANAGED_KEYS: [&str; 11] = [
    "api_config",
    AUTH_TOKEN_KEY,
    LOGIN_TIMESTAMP_KEY,
    ROBOT_DEPTHS_KEY,
    ROBOT_RACKS_KEY,
    ROBOT_ROWS_KEY,
    ROBOT_SLOTS_KEY,
    ROBOT_NAME_KEY,
    "selected_rack",
    USER_ID_KEY,
    USER_NAME_KEY,
];

/// Per-tab flag marking the legacy migration as done
pub const MIGRATION_FLAG: &str = "__cookie_migration_done__";

/// Maximum session age, in milliseconds
pub const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Cookie lifetime measured from login, in milliseconds
pub const COOKIE_TTL_FROM_LOGIN_MS: i64 = 24 * 60 * 60 * 1000;

pub fn session_ttl() -> Duration {
    Duration::milliseconds(SESSION_TTL_MS)
}

/// Parse a stored `login_timestamp` (milliseconds since the epoch)
pub fn parse_login_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Expiry applied to cookies written now.
///
/// 24 hours after the login when one is known, otherwise 7 days from `now`.
pub fn cookie_expiry(login_timestamp: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    match login_timestamp.and_then(parse_login_timestamp) {
        Some(login) => login + Duration::milliseconds(COOKIE_TTL_FROM_LOGIN_MS),
        None => now + session_ttl(),
    }
}

/// Who is logged in, and since when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub user_name: String,
    pub login_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.login_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.login_at + session_ttl()
    }

    /// Valid up to and including the moment the TTL runs out
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.age(now) <= session_ttl()
    }
}

/// Outcome of a legacy storage sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// The sweep already ran in this browser session
    pub already_done: bool,
    /// Keys copied into cookies
    pub copied: Vec<&'static str>,
    /// Keys dropped from legacy storage because a cookie already existed
    pub skipped: Vec<&'static str>,
}

/// Session material kept in cookies, with legacy storage being drained into
/// them and a per-tab store for one-shot flags.
#[derive(Debug, Clone)]
pub struct SessionStore<J, L, F> {
    cookies: J,
    legacy: L,
    flags: F,
}

impl<J, L, F> SessionStore<J, L, F>
where
    J: CookieJar,
    L: KeyValueStore,
    F: KeyValueStore,
{
    pub fn new(cookies: J, legacy: L, flags: F) -> Self {
        Self {
            cookies,
            legacy,
            flags,
        }
    }

    pub fn cookies(&self) -> &J {
        &self.cookies
    }

    pub fn tokens(&self) -> TokenStore<&J> {
        TokenStore::new(&self.cookies)
    }

    /// Record a fresh login and its token
    pub fn begin(
        &self,
        user_id: &str,
        user_name: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<SessionRecord> {
        let login_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let login_ms = login_at.timestamp_millis().to_string();
        let expires = cookie_expiry(Some(&login_ms), now);

        self.cookies.set(LOGIN_TIMESTAMP_KEY, &login_ms, expires)?;
        self.cookies.set(USER_ID_KEY, user_id.trim(), expires)?;
        self.cookies.set(USER_NAME_KEY, user_name.trim(), expires)?;
        self.tokens().set(token, now)?;

        tracing::info!(user_id = user_id.trim(), "session started");
        Ok(SessionRecord {
            user_id: user_id.trim().to_string(),
            user_name: user_name.trim().to_string(),
            login_at,
        })
    }

    /// Current session, if every field is present and parses
    pub fn record(&self) -> Option<SessionRecord> {
        let non_empty = |key| self.cookies.get(key).filter(|v| !v.trim().is_empty());
        let user_id = non_empty(USER_ID_KEY)?;
        let user_name = non_empty(USER_NAME_KEY)?;
        let login_at = parse_login_timestamp(&non_empty(LOGIN_TIMESTAMP_KEY)?)?;
        Some(SessionRecord {
            user_id,
            user_name,
            login_at,
        })
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.record().is_some_and(|record| record.is_valid_at(now))
    }

    /// Move legacy values into cookies, once per browser session.
    ///
    /// A legacy value is copied only when no cookie exists under the same
    /// key; either way the legacy copy is deleted.
    pub fn migrate(&self, now: DateTime<Utc>) -> CoreResult<MigrationReport> {
        if self.flags.get(MIGRATION_FLAG).is_some() {
            return Ok(MigrationReport {
                already_done: true,
                ..MigrationReport::default()
            });
        }

        let legacy_login = self.legacy.get(LOGIN_TIMESTAMP_KEY);
        let expires = cookie_expiry(legacy_login.as_deref(), now);
        let mut report = MigrationReport::default();

        for key in MANAGED_KEYS {
            let Some(value) = self.legacy.get(key) else {
                continue;
            };
            if self.cookies.get(key).is_none() {
                self.cookies.set(key, &value, expires)?;
                report.copied.push(key);
            } else {
                report.skipped.push(key);
            }
            self.legacy.remove(key);
        }

        self.flags.set(MIGRATION_FLAG, "true")?;
        if !report.copied.is_empty() {
            tracing::info!(copied = ?report.copied, "migrated legacy session keys to cookies");
        }
        Ok(report)
    }

    /// Forget everything; used on logout and on expiry
    pub fn clear(&self) {
        for key in MANAGED_KEYS {
            self.cookies.remove(key);
            self.legacy.remove(key);
        }
        self.tokens().clear();
        self.flags.remove(MIGRATION_FLAG);
        tracing::info!("session cleared");
    }

    /// Rewrite every managed cookie that exists with a new expiry
    pub fn refresh_expiry(&self, expires: DateTime<Utc>) -> CoreResult<usize> {
        let mut refreshed = 0;
        for key in MANAGED_KEYS {
            if let Some(value) = self.cookies.get(key) {
                self.cookies.set(key, &value, expires)?;
                refreshed += 1;
            }
        }
        Ok(refreshed)
    }

    /// Remember the robot layout so views can render before the first fetch
    pub fn cache_robot_config(&self, robot: &Robot, now: DateTime<Utc>) -> CoreResult<()> {
        let login = self.cookies.get(LOGIN_TIMESTAMP_KEY);
        let expires = cookie_expiry(login.as_deref(), now);
        self.cookies.set(ROBOT_NAME_KEY, &robot.robot_name, expires)?;
        self.cookies
            .set(ROBOT_ROWS_KEY, &robot.robot_num_rows.to_string(), expires)?;
        self.cookies
            .set(ROBOT_RACKS_KEY, &robot.robot_num_racks.to_string(), expires)?;
        self.cookies
            .set(ROBOT_SLOTS_KEY, &robot.robot_num_slots.to_string(), expires)?;
        self.cookies
            .set(ROBOT_DEPTHS_KEY, &robot.robot_num_depths.to_string(), expires)?;
        Ok(())
    }

    pub fn cached_robot_config(&self) -> Option<Robot> {
        let count = |key| {
            self.cookies
                .get(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0)
        };
        Some(Robot {
            robot_name: self.cookies.get(ROBOT_NAME_KEY)?,
            robot_num_rows: count(ROBOT_ROWS_KEY),
            robot_num_racks: count(ROBOT_RACKS_KEY),
            robot_num_slots: count(ROBOT_SLOTS_KEY),
            robot_num_depths: count(ROBOT_DEPTHS_KEY),
            updated_at: None,
        })
    }
}
