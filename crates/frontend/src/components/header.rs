//! Top bar: tabs, robot name, clock and logout

use crate::app::Route;
use crate::auth::{SessionAction, use_session};
use crate::hooks::use_clock;
use crate::storage::session_store;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(Header)]
pub fn header() -> Html {
    let session = use_session();
    let route = use_route::<Route>();
    let navigator = use_navigator();
    let now = use_clock();

    let user_name = session
        .as_ref()
        .and_then(|ctx| ctx.session.as_ref())
        .map(|record| record.user_name.clone())
        .unwrap_or_default();
    let robot_name = session_store()
        .cached_robot_config()
        .map(|robot| robot.robot_name)
        .unwrap_or_default();

    let on_logout = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(session) = &session {
                session.dispatch(SessionAction::Logout);
            }
            if let Some(navigator) = &navigator {
                navigator.push(&Route::Login);
            }
        })
    };

    html! {
        <header class="bg-white border-b border-gray-200 px-4 py-3 flex items-center justify-between">
            <div class="flex items-center gap-6">
                <div>
                    <h1 class="text-xl font-bold text-purple-900">{"Nanostore"}</h1>
                    if !robot_name.is_empty() {
                        <p class="text-xs text-gray-500">{robot_name}</p>
                    }
                </div>
                <nav class="flex gap-1">
                    { for Route::TABS.into_iter().map(|(tab, label)| {
                        let active = route.as_ref() == Some(&tab);
                        let class = if active {
                            "px-4 py-2 text-sm font-medium text-purple-900 border-b-2 border-purple-900"
                        } else {
                            "px-4 py-2 text-sm font-medium text-gray-600 hover:text-gray-900"
                        };
                        html! { <Link<Route> to={tab} classes={classes!(class)}>{label}</Link<Route>> }
                    }) }
                </nav>
            </div>
            <div class="flex items-center gap-4">
                <span class="text-sm text-gray-500 tabular-nums">
                    {now.format("%d-%m-%Y %H:%M:%S").to_string()}
                </span>
                if !user_name.is_empty() {
                    <span class="text-sm text-gray-700">{user_name}</span>
                }
                <button
                    onclick={on_logout}
                    class="px-4 py-2 text-sm font-medium text-gray-700 bg-gray-100 hover:bg-gray-200 rounded-lg transition-colors"
                >
                    {"Logout"}
                </button>
            </div>
        </header>
    }
}
