//! Session expiry monitor
//!
//! Planning is pure: [`SessionMonitor::arm`] turns a session record and the
//! current time into a [`MonitorPlan`], and the owner drives two one-shot
//! timers from it (gloo timeouts in the browser, tokio sleeps in the CLI).
//! Timer callbacks report back through [`SessionMonitor::on_warning`] and
//! [`SessionMonitor::on_expiry`]; once disarmed, late callbacks are ignored.

use crate::session::{SESSION_TTL_MS, SessionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long before expiry the warning is shown, in milliseconds
pub const WARNING_LEAD_MS: i64 = 5 * 60 * 1000;

const MINUTE_MS: i64 = 60 * 1000;

pub const WARNING_TITLE: &str = "Session Expiring Soon";
pub const EXPIRED_TITLE: &str = "Session Expired";
pub const EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorState {
    Active,
    Warned,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// A required session field is absent or the timestamp does not parse
    MissingSession,
    /// The session outlived its 7 day horizon
    Elapsed,
}

/// What the owner should do after arming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPlan {
    /// Clear the session and go to the login page now
    Expired { reason: ExpiryReason },
    /// Start a warning timer and an expiry timer
    Scheduled { warn_in: Duration, expire_in: Duration },
    /// Already inside the warning window: warn now, then start the expiry timer
    WarnNow { minutes_left: u32, expire_in: Duration },
}

impl MonitorPlan {
    pub fn for_session(record: Option<&SessionRecord>, now: DateTime<Utc>) -> Self {
        let Some(record) = record else {
            return Self::Expired {
                reason: ExpiryReason::MissingSession,
            };
        };

        // Zero remaining is still a valid session, matching `is_valid_at`
        let remaining_ms = SESSION_TTL_MS - record.age(now).num_milliseconds();
        if remaining_ms < 0 {
            return Self::Expired {
                reason: ExpiryReason::Elapsed,
            };
        }

        let expire_in = millis(remaining_ms);
        if remaining_ms > WARNING_LEAD_MS {
            Self::Scheduled {
                warn_in: millis(remaining_ms - WARNING_LEAD_MS),
                expire_in,
            }
        } else {
            let minutes = ((remaining_ms + MINUTE_MS - 1) / MINUTE_MS).max(1);
            Self::WarnNow {
                minutes_left: u32::try_from(minutes).unwrap_or(u32::MAX),
                expire_in,
            }
        }
    }

    pub fn expire_in(&self) -> Option<Duration> {
        match self {
            Self::Expired { .. } => None,
            Self::Scheduled { expire_in, .. } | Self::WarnNow { expire_in, .. } => {
                Some(*expire_in)
            }
        }
    }
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

/// Timer delay in the `u32` milliseconds browser timers take
pub fn timer_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

/// Notification shown before the session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWarning {
    pub title: &'static str,
    pub message: String,
    pub minutes_left: u32,
}

impl SessionWarning {
    pub fn new(minutes_left: u32) -> Self {
        let unit = if minutes_left > 1 { "minutes" } else { "minute" };
        Self {
            title: WARNING_TITLE,
            message: format!(
                "Your session will expire in {minutes_left} {unit}. Please save your work and log in again to continue."
            ),
            minutes_left,
        }
    }

    /// Warning raised by the scheduled timer
    pub fn scheduled() -> Self {
        let lead = u32::try_from(WARNING_LEAD_MS / MINUTE_MS).unwrap_or(5);
        Self::new(lead)
    }
}

/// ACTIVE -> WARNED -> EXPIRED, with teardown
#[derive(Debug, Clone)]
pub struct SessionMonitor {
    state: MonitorState,
    armed: bool,
    /// Set when arming found the session already gone
    expiry_due: bool,
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMonitor {
    pub const fn new() -> Self {
        Self {
            state: MonitorState::Active,
            armed: false,
            expiry_due: false,
        }
    }

    pub const fn state(&self) -> MonitorState {
        self.state
    }

    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Plan timers for a protected page mount.
    ///
    /// A `WarnNow` plan moves straight to WARNED; the caller shows
    /// [`SessionWarning::new`] with the plan's minutes. An `Expired` plan
    /// leaves one expiry pending, so the caller's first
    /// [`on_expiry`](Self::on_expiry) clears the session.
    pub fn arm(&mut self, record: Option<&SessionRecord>, now: DateTime<Utc>) -> MonitorPlan {
        let plan = MonitorPlan::for_session(record, now);
        self.expiry_due = false;
        match plan {
            MonitorPlan::Expired { reason } => {
                tracing::info!(?reason, "session expired on arm");
                self.state = MonitorState::Expired;
                self.armed = false;
                self.expiry_due = true;
            }
            MonitorPlan::Scheduled { warn_in, expire_in } => {
                tracing::debug!(?warn_in, ?expire_in, "session timers scheduled");
                self.state = MonitorState::Active;
                self.armed = true;
            }
            MonitorPlan::WarnNow { minutes_left, .. } => {
                tracing::debug!(minutes_left, "session inside warning window");
                self.state = MonitorState::Warned;
                self.armed = true;
            }
        }
        plan
    }

    /// Warning timer fired. Returns the notification to show, if any.
    pub fn on_warning(&mut self) -> Option<SessionWarning> {
        if !self.armed || self.state != MonitorState::Active {
            return None;
        }
        self.state = MonitorState::Warned;
        Some(SessionWarning::scheduled())
    }

    /// Expiry timer fired. Returns true when the owner must clear the
    /// session and redirect.
    pub fn on_expiry(&mut self) -> bool {
        if self.expiry_due {
            self.expiry_due = false;
            return true;
        }
        if !self.armed || self.state == MonitorState::Expired {
            return false;
        }
        self.state = MonitorState::Expired;
        self.armed = false;
        tracing::info!("session expired");
        true
    }

    /// Page teardown or explicit logout
    pub fn disarm(&mut self) {
        self.armed = false;
        self.expiry_due = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    fn record(login_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            user_id: "7".into(),
            user_name: "operator".into(),
            login_at,
        }
    }

    #[test]
    fn test_fresh_session_is_scheduled() {
        let plan = MonitorPlan::for_session(Some(&record(now())), now());
        assert_eq!(
            plan,
            MonitorPlan::Scheduled {
                warn_in: Duration::from_secs(7 * 24 * 3600 - 300),
                expire_in: Duration::from_secs(7 * 24 * 3600),
            }
        );
    }

    #[test]
    fn test_four_minutes_left_warns_immediately() {
        let login = now() - ChronoDuration::days(7) + ChronoDuration::minutes(4);
        let mut monitor = SessionMonitor::new();
        let plan = monitor.arm(Some(&record(login)), now());
        assert_eq!(
            plan,
            MonitorPlan::WarnNow {
                minutes_left: 4,
                expire_in: Duration::from_secs(240),
            }
        );
        assert_eq!(monitor.state(), MonitorState::Warned);
        assert!(SessionWarning::new(4).message.contains("expire in 4 minutes"));
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        let login = now() - ChronoDuration::days(7) + ChronoDuration::seconds(61);
        let plan = MonitorPlan::for_session(Some(&record(login)), now());
        assert!(matches!(plan, MonitorPlan::WarnNow { minutes_left: 2, .. }));

        let login = now() - ChronoDuration::days(7) + ChronoDuration::seconds(30);
        let plan = MonitorPlan::for_session(Some(&record(login)), now());
        assert!(matches!(plan, MonitorPlan::WarnNow { minutes_left: 1, .. }));
        assert!(SessionWarning::new(1).message.contains("in 1 minute."));
    }

    #[test]
    fn test_exactly_five_minutes_left_warns_now() {
        let login = now() - ChronoDuration::days(7) + ChronoDuration::minutes(5);
        let plan = MonitorPlan::for_session(Some(&record(login)), now());
        assert!(matches!(plan, MonitorPlan::WarnNow { minutes_left: 5, .. }));
    }

    #[test]
    fn test_missing_or_old_session_expires() {
        let mut monitor = SessionMonitor::new();
        assert_eq!(
            monitor.arm(None, now()),
            MonitorPlan::Expired {
                reason: ExpiryReason::MissingSession
            }
        );
        assert_eq!(monitor.state(), MonitorState::Expired);

        let old = record(now() - ChronoDuration::days(8));
        assert_eq!(
            MonitorPlan::for_session(Some(&old), now()),
            MonitorPlan::Expired {
                reason: ExpiryReason::Elapsed
            }
        );

        let past = record(now() - ChronoDuration::days(7) - ChronoDuration::milliseconds(1));
        assert!(MonitorPlan::for_session(Some(&past), now()).expire_in().is_none());
    }

    #[test]
    fn test_expired_on_arm_clears_session_once() {
        let mut monitor = SessionMonitor::new();
        let old = record(now() - ChronoDuration::days(8));
        assert!(matches!(
            monitor.arm(Some(&old), now()),
            MonitorPlan::Expired { .. }
        ));
        assert!(!monitor.is_armed());
        assert!(monitor.on_expiry());
        assert!(!monitor.on_expiry());
        assert_eq!(monitor.state(), MonitorState::Expired);

        monitor.arm(Some(&old), now());
        monitor.disarm();
        assert!(!monitor.on_expiry());
    }

    #[test]
    fn test_seven_day_boundary_agrees_with_validity() {
        let boundary = record(now() - ChronoDuration::days(7));
        assert!(boundary.is_valid_at(now()));
        assert_eq!(
            MonitorPlan::for_session(Some(&boundary), now()),
            MonitorPlan::WarnNow {
                minutes_left: 1,
                expire_in: Duration::ZERO,
            }
        );

        let past = record(now() - ChronoDuration::days(7) - ChronoDuration::milliseconds(1));
        assert!(!past.is_valid_at(now()));
        assert_eq!(
            MonitorPlan::for_session(Some(&past), now()),
            MonitorPlan::Expired {
                reason: ExpiryReason::Elapsed
            }
        );
    }

    #[test]
    fn test_timer_callbacks_walk_the_states() {
        let mut monitor = SessionMonitor::new();
        monitor.arm(Some(&record(now())), now());
        assert_eq!(monitor.state(), MonitorState::Active);

        let warning = monitor.on_warning().unwrap();
        assert_eq!(warning.title, WARNING_TITLE);
        assert!(warning.message.contains("expire in 5 minutes"));
        assert_eq!(monitor.state(), MonitorState::Warned);
        assert_eq!(monitor.on_warning(), None);

        assert!(monitor.on_expiry());
        assert_eq!(monitor.state(), MonitorState::Expired);
        assert!(!monitor.on_expiry());
    }

    #[test]
    fn test_disarmed_monitor_ignores_timers() {
        let mut monitor = SessionMonitor::new();
        monitor.arm(Some(&record(now())), now());
        monitor.disarm();
        assert_eq!(monitor.on_warning(), None);
        assert!(!monitor.on_expiry());
        assert_eq!(monitor.state(), MonitorState::Active);
    }

    #[test]
    fn test_timer_millis_saturates() {
        assert_eq!(timer_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timer_millis(Duration::from_secs(u64::MAX / 2)), u32::MAX);
    }
}
