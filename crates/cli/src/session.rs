//! Session expiry for long-running commands

use chrono::{DateTime, Utc};
use nanostore_core::monitor::{EXPIRED_MESSAGE, SessionWarning};
use nanostore_core::session::{SessionRecord, parse_login_timestamp};
use nanostore_core::{MonitorPlan, SessionMonitor};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Session described on the command line
pub fn session_from_flags(
    user_id: Option<String>,
    user_name: Option<String>,
    login_timestamp: Option<&str>,
) -> anyhow::Result<Option<SessionRecord>> {
    let Some(raw) = login_timestamp else {
        return Ok(None);
    };
    let login_at = parse_login_timestamp(raw)
        .ok_or_else(|| anyhow::anyhow!("login timestamp must be milliseconds since the epoch: {raw}"))?;
    let user_id = user_id.unwrap_or_else(|| "cli".to_string());
    let user_name = user_name.unwrap_or_else(|| user_id.clone());
    Ok(Some(SessionRecord {
        user_id,
        user_name,
        login_at,
    }))
}

/// Sleep until `delay` elapses. Returns false when shut down first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

/// Wait for the session to run out.
///
/// Logs the expiry warning when it comes due. Returns true once the session
/// has expired, false when `shutdown` fires first. Without a session this
/// only waits for shutdown.
pub async fn watch_session(
    record: Option<SessionRecord>,
    now: DateTime<Utc>,
    shutdown: CancellationToken,
) -> bool {
    let Some(record) = record else {
        shutdown.cancelled().await;
        return false;
    };

    let mut monitor = SessionMonitor::new();
    let remaining = match monitor.arm(Some(&record), now) {
        MonitorPlan::Expired { .. } => {
            warn!("{EXPIRED_MESSAGE}");
            return true;
        }
        MonitorPlan::Scheduled { warn_in, expire_in } => {
            info!(expires_at = %record.expires_at(), "session monitor armed");
            if !sleep_or_shutdown(warn_in, &shutdown).await {
                monitor.disarm();
                return false;
            }
            if let Some(warning) = monitor.on_warning() {
                warn!(minutes_left = warning.minutes_left, "{}", warning.message);
            }
            expire_in.saturating_sub(warn_in)
        }
        MonitorPlan::WarnNow {
            minutes_left,
            expire_in,
        } => {
            let warning = SessionWarning::new(minutes_left);
            warn!(minutes_left, "{}", warning.message);
            expire_in
        }
    };

    if !sleep_or_shutdown(remaining, &shutdown).await {
        monitor.disarm();
        return false;
    }
    let expired = monitor.on_expiry();
    if expired {
        warn!("{EXPIRED_MESSAGE}");
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nanostore_core::session::SESSION_TTL_MS;

    fn login() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
    }

    fn record() -> SessionRecord {
        SessionRecord {
            user_id: "op-7".to_string(),
            user_name: "Operator".to_string(),
            login_at: login(),
        }
    }

    #[test]
    fn test_session_from_flags() {
        assert_eq!(session_from_flags(None, None, None).unwrap(), None);

        let millis = login().timestamp_millis().to_string();
        let session = session_from_flags(Some("op-7".into()), None, Some(&millis))
            .unwrap()
            .unwrap();
        assert_eq!(session.user_name, "op-7");
        assert_eq!(session.login_at, login());

        assert!(session_from_flags(None, None, Some("yesterday")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_session_expires_immediately() {
        let now = login() + chrono::Duration::milliseconds(SESSION_TTL_MS + 1);
        assert!(watch_session(Some(record()), now, CancellationToken::new()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expires_after_remaining_time() {
        let now = login() + chrono::Duration::milliseconds(SESSION_TTL_MS - 10 * 60 * 1000);
        let started = tokio::time::Instant::now();
        assert!(watch_session(Some(record()), now, CancellationToken::new()).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10 * 60));
        assert!(elapsed < Duration::from_secs(10 * 60 + 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_warning_window_expires_after_remaining_time() {
        let now = login() + chrono::Duration::milliseconds(SESSION_TTL_MS - 90 * 1000);
        let started = tokio::time::Instant::now();
        assert!(watch_session(Some(record()), now, CancellationToken::new()).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(90));
        assert!(elapsed < Duration::from_secs(91));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_disarms() {
        let shutdown = CancellationToken::new();
        let watcher = tokio::spawn(watch_session(Some(record()), login(), shutdown.clone()));
        tokio::time::sleep(Duration::from_secs(60)).await;
        shutdown.cancel();
        assert!(!watcher.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_session_waits_for_shutdown() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        assert!(!watch_session(None, login(), shutdown).await);
    }
}
