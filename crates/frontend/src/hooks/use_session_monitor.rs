//! Session expiry timers for protected pages

use crate::auth::{SessionAction, use_session};
use crate::components::toast::{Notify, ToastLevel, use_toasts};
use crate::config::UiConfig;
use chrono::Utc;
use gloo::timers::callback::Timeout;
use nanostore_core::monitor::{EXPIRED_MESSAGE, EXPIRED_TITLE, timer_millis};
use nanostore_core::{MonitorPlan, SessionMonitor, SessionWarning};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

/// Arm the warning and expiry timers for the current session.
///
/// Re-armed whenever the session changes; timers are cancelled on unmount.
#[hook]
pub fn use_session_monitor() {
    let session = use_session();
    let toasts = use_toasts();
    let record = session.as_ref().and_then(|ctx| ctx.session.clone());

    use_effect_with(record, move |record| {
        let monitor = Rc::new(RefCell::new(SessionMonitor::new()));
        let plan = monitor.borrow_mut().arm(record.as_ref(), Utc::now());

        let warn = {
            let toasts = toasts.clone();
            move |warning: SessionWarning| {
                if let Some(toasts) = &toasts {
                    toasts.notify(
                        ToastLevel::Warning,
                        warning.title,
                        &warning.message,
                        UiConfig::WARNING_TOAST_TIMEOUT_MS,
                    );
                }
            }
        };

        let expire = {
            let monitor = Rc::clone(&monitor);
            move || {
                if !monitor.borrow_mut().on_expiry() {
                    return;
                }
                if let Some(toasts) = &toasts {
                    toasts.error(EXPIRED_TITLE, EXPIRED_MESSAGE);
                }
                if let Some(session) = &session {
                    session.dispatch(SessionAction::Expired);
                }
            }
        };

        let mut timers = Vec::with_capacity(2);
        match plan {
            MonitorPlan::Expired { .. } => {
                // The route guard redirects when there is no session at all
                if record.is_some() {
                    expire();
                }
            }
            MonitorPlan::Scheduled { warn_in, expire_in } => {
                let on_warning = {
                    let monitor = Rc::clone(&monitor);
                    move || {
                        let warning = monitor.borrow_mut().on_warning();
                        if let Some(warning) = warning {
                            warn(warning);
                        }
                    }
                };
                timers.push(Timeout::new(timer_millis(warn_in), on_warning));
                timers.push(Timeout::new(timer_millis(expire_in), expire));
            }
            MonitorPlan::WarnNow {
                minutes_left,
                expire_in,
            } => {
                warn(SessionWarning::new(minutes_left));
                timers.push(Timeout::new(timer_millis(expire_in), expire));
            }
        }

        move || {
            monitor.borrow_mut().disarm();
            drop(timers);
        }
    });
}
