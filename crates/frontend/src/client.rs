//! Client initialization and error reporting

use crate::auth::trigger_session_error;
use crate::components::toast::{Notify, ToastContext};
use crate::config::dashboard_config;
use crate::storage::token_store;
pub use nanostore_client::ClientError;
use nanostore_client::DashboardClient;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

/// Global client instance; it reads the token cookie on every request
static CLIENT: Lazy<Mutex<Option<DashboardClient>>> = Lazy::new(|| Mutex::new(None));

/// Get the shared client, creating it on first use
pub fn dashboard_client() -> Result<DashboardClient, ClientError> {
    let mut client_lock = CLIENT
        .lock()
        .map_err(|_| ClientError::Configuration("client lock poisoned".into()))?;

    if let Some(client) = client_lock.as_ref() {
        return Ok(client.clone());
    }

    let client = DashboardClient::from_config(dashboard_config(), Arc::new(token_store()))?;
    *client_lock = Some(client.clone());
    Ok(client)
}

/// Route a failed fetch: session problems end the session, everything
/// else becomes a toast
pub fn report_error(err: &ClientError, what: &str, toasts: Option<&ToastContext>) {
    if err.is_auth_expired() {
        tracing::warn!(error = %err, what, "session rejected by the server");
        trigger_session_error();
        return;
    }
    tracing::error!(error = %err, what, "fetch failed");
    if let Some(toasts) = toasts {
        toasts.error(&format!("Failed to load {what}"), &err.to_string());
    }
}
