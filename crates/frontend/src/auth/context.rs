//! Global session context and provider

use super::error_handler::{clear_session_error_callback, set_session_error_callback};
use crate::storage::session_store;
use chrono::Utc;
use nanostore_core::SessionRecord;
use nanostore_core::monitor::EXPIRED_MESSAGE;
use std::rc::Rc;
use yew::prelude::*;

/// Session context data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContextData {
    pub session: Option<SessionRecord>,
    pub is_loading: bool,
    /// Why the operator was sent back to the login page
    pub error: Option<String>,
}

pub enum SessionAction {
    /// Result of reading cookies on startup
    Restore(Option<SessionRecord>),
    Login(SessionRecord),
    Logout,
    Expired,
}

pub type SessionContext = UseReducerHandle<SessionContextData>;

impl Default for SessionContextData {
    fn default() -> Self {
        Self {
            session: None,
            is_loading: true, // Cookies are read after mount
            error: None,
        }
    }
}

impl Reducible for SessionContextData {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            SessionAction::Restore(session) => Rc::new(Self {
                session,
                is_loading: false,
                error: None,
            }),
            SessionAction::Login(session) => Rc::new(Self {
                session: Some(session),
                is_loading: false,
                error: None,
            }),
            SessionAction::Logout => {
                session_store().clear();
                Rc::new(Self {
                    session: None,
                    is_loading: false,
                    error: None,
                })
            }
            SessionAction::Expired => {
                if self.session.is_none() && self.error.is_some() {
                    return self;
                }
                session_store().clear();
                Rc::new(Self {
                    session: None,
                    is_loading: false,
                    error: Some(EXPIRED_MESSAGE.to_string()),
                })
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub children: Children,
}

#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let session = use_reducer(SessionContextData::default);

    // Fetch helpers hitting a 401 or a missing token end the session
    {
        let session = session.clone();
        use_effect_with((), move |()| {
            set_session_error_callback(Rc::new(move || {
                session.dispatch(SessionAction::Expired);
            }));
            clear_session_error_callback
        });
    }

    // Drain legacy storage, then restore from cookies
    {
        let session = session.clone();
        use_effect_with((), move |()| {
            let store = session_store();
            let now = Utc::now();
            if let Err(err) = store.migrate(now) {
                tracing::warn!(error = %err, "legacy session migration failed");
            }
            let record = store.record().filter(|record| record.is_valid_at(now));
            if record.is_none() && store.record().is_some() {
                tracing::info!("stored session is older than its lifetime");
                store.clear();
            }
            session.dispatch(SessionAction::Restore(record));
        });
    }

    html! {
        <ContextProvider<SessionContext> context={session}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Session context; `None` outside a [`SessionProvider`]
#[hook]
pub fn use_session() -> Option<SessionContext> {
    use_context::<SessionContext>()
}
