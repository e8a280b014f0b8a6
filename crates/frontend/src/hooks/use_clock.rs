use chrono::{DateTime, Local};
use gloo::timers::callback::Interval;
use nanostore_core::monitor::timer_millis;
use nanostore_core::poll::CLOCK_INTERVAL;
use yew::prelude::*;

/// Wall clock, refreshed every second
#[hook]
pub fn use_clock() -> DateTime<Local> {
    let now = use_state(Local::now);
    {
        let now = now.clone();
        use_effect_with((), move |()| {
            let interval = Interval::new(timer_millis(CLOCK_INTERVAL), move || {
                now.set(Local::now());
            });
            move || drop(interval)
        });
    }
    *now
}
