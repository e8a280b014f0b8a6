use crate::auth::SessionProvider;
use crate::components::{RequireSession, ToastProvider};
use crate::pages::{CameraPage, HomePage, LoginPage, LogsPage, ReportsPage, SlotsPage};
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Routable)]
pub enum Route {
    #[at("/")]
    Login,
    #[at("/home")]
    Home,
    #[at("/slots")]
    Slots,
    #[at("/logs")]
    Logs,
    #[at("/reports")]
    Reports,
    #[at("/camera/:task_id")]
    Camera { task_id: String },
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    /// Tabs shown in the header
    pub const TABS: [(Self, &'static str); 4] = [
        (Self::Home, "Robot"),
        (Self::Slots, "Slots"),
        (Self::Logs, "Logs"),
        (Self::Reports, "Reports"),
    ];
}

fn switch(route: Route) -> Html {
    let protected = |page: Html| html! { <RequireSession>{page}</RequireSession> };
    match route {
        Route::Login => html! { <LoginPage /> },
        Route::Home => protected(html! { <HomePage /> }),
        Route::Slots => protected(html! { <SlotsPage /> }),
        Route::Logs => protected(html! { <LogsPage /> }),
        Route::Reports => protected(html! { <ReportsPage /> }),
        Route::Camera { task_id } => protected(html! { <CameraPage {task_id} /> }),
        Route::NotFound => html! { <Redirect<Route> to={Route::Home} /> },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <ToastProvider>
                <SessionProvider>
                    <Switch<Route> render={switch} />
                </SessionProvider>
            </ToastProvider>
        </BrowserRouter>
    }
}
