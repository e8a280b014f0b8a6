//! Fetch-on-mount-then-every-interval hook

use crate::client::{ClientError, dashboard_client, report_error};
use crate::components::toast::use_toasts;
use gloo::timers::callback::Interval;
use nanostore_client::DashboardClient;
use nanostore_core::monitor::timer_millis;
use nanostore_core::{ApplyOutcome, PollState};
use serde::Serialize;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Poll `fetch` immediately and then every `interval`.
///
/// Returns the last value that differed from its predecessor. Failures keep
/// the previous value and are reported; the next tick retries. The loop
/// stops when the component unmounts and later completions are dropped.
#[hook]
pub fn use_polling<T, F, Fut>(what: &'static str, interval: Duration, fetch: F) -> Option<T>
where
    T: Serialize + Clone + PartialEq + 'static,
    F: Fn(DashboardClient) -> Fut + 'static,
    Fut: Future<Output = Result<T, ClientError>> + 'static,
{
    let value = use_state(|| None::<T>);
    let toasts = use_toasts();

    {
        let value = value.clone();
        use_effect_with(timer_millis(interval), move |&interval_ms| {
            let state = Rc::new(RefCell::new(PollState::<T>::new()));
            let fetch = Rc::new(fetch);

            let tick = {
                let state = Rc::clone(&state);
                Rc::new(move || {
                    let ticket = state.borrow_mut().begin();
                    let state = Rc::clone(&state);
                    let value = value.clone();
                    let toasts = toasts.clone();
                    let fetch = Rc::clone(&fetch);
                    spawn_local(async move {
                        let result = match dashboard_client() {
                            Ok(client) => fetch(client).await,
                            Err(err) => Err(err),
                        };
                        let mut state = state.borrow_mut();
                        match result {
                            Ok(fresh) => {
                                if state.apply(ticket, fresh) == ApplyOutcome::Updated {
                                    value.set(state.value().cloned());
                                }
                            }
                            Err(err) => {
                                if state.fail(ticket) == ApplyOutcome::Unchanged {
                                    report_error(&err, what, toasts.as_ref());
                                }
                            }
                        }
                    });
                })
            };

            tick();
            let interval = {
                let tick = Rc::clone(&tick);
                Interval::new(interval_ms, move || tick())
            };
            tracing::debug!(what, interval_ms, "polling started");

            move || {
                drop(interval);
                state.borrow_mut().close();
                tracing::debug!(what, "polling stopped");
            }
        });
    }

    (*value).clone()
}
