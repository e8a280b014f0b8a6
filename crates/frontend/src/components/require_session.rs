//! Guard for pages that need a logged-in operator

use crate::app::Route;
use crate::auth::use_session;
use crate::components::Spinner;
use crate::hooks::use_session_monitor;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, PartialEq)]
pub struct RequireSessionProps {
    pub children: Children,
}

/// Renders children while the session is valid, else sends the operator to
/// the login page. Arms the expiry timers for as long as it is mounted.
#[function_component(RequireSession)]
pub fn require_session(props: &RequireSessionProps) -> Html {
    let session = use_session();
    use_session_monitor();

    let Some(session) = session else {
        return html! { <Redirect<Route> to={Route::Login} /> };
    };

    if session.is_loading {
        return html! { <Spinner text={"Checking session..."} /> };
    }

    if session.session.is_some() {
        html! { <>{ props.children.clone() }</> }
    } else {
        html! { <Redirect<Route> to={Route::Login} /> }
    }
}
