//! Global session error handler
//!
//! Fetch helpers report an expired or missing token here instead of every
//! view checking for it; the session provider registers the callback.

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static SESSION_ERROR_CALLBACK: RefCell<Option<Rc<dyn Fn()>>> = RefCell::new(None);
}

pub fn set_session_error_callback(callback: Rc<dyn Fn()>) {
    SESSION_ERROR_CALLBACK.with(|cb| {
        *cb.borrow_mut() = Some(callback);
    });
}

pub fn clear_session_error_callback() {
    SESSION_ERROR_CALLBACK.with(|cb| {
        *cb.borrow_mut() = None;
    });
}

/// Returns false when no provider is mounted
pub fn trigger_session_error() -> bool {
    // Clone out first so the callback may re-register
    let callback = SESSION_ERROR_CALLBACK.with(|cb| cb.borrow().clone());
    callback.map(|callback| callback()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_callback_fires_until_cleared() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        set_session_error_callback(Rc::new(move || counter.set(counter.get() + 1)));

        assert!(trigger_session_error());
        clear_session_error_callback();
        assert!(!trigger_session_error());
        assert_eq!(hits.get(), 1);
    }
}
