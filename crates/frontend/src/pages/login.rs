//! Operator login

use crate::app::Route;
use crate::auth::{SessionAction, use_session};
use crate::storage::session_store;
use chrono::Utc;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Default, PartialEq)]
struct LoginForm {
    user_id: String,
    user_name: String,
    token: String,
}

impl LoginForm {
    fn missing_field(&self) -> Option<&'static str> {
        [
            (self.user_id.as_str(), "User ID"),
            (self.user_name.as_str(), "User name"),
            (self.token.as_str(), "Access token"),
        ]
        .into_iter()
        .find(|(value, _)| value.trim().is_empty())
        .map(|(_, label)| label)
    }
}

fn input_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let session = use_session();
    let form = use_state(LoginForm::default);
    let error = use_state(|| None::<String>);

    if session
        .as_ref()
        .is_some_and(|ctx| !ctx.is_loading && ctx.session.is_some())
    {
        return html! { <Redirect<Route> to={Route::Home} /> };
    }

    let on_field = |set: fn(&mut LoginForm, String)| {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*form).clone();
            set(&mut next, input_value(&e));
            form.set(next);
        })
    };

    let on_submit = {
        let form = form.clone();
        let error = error.clone();
        let session = session.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Some(label) = form.missing_field() {
                error.set(Some(format!("{label} is required")));
                return;
            }
            match session_store().begin(&form.user_id, &form.user_name, &form.token, Utc::now()) {
                Ok(record) => {
                    error.set(None);
                    if let Some(session) = &session {
                        session.dispatch(SessionAction::Login(record));
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "could not store session");
                    error.set(Some(err.to_string()));
                }
            }
        })
    };

    let expired = session.as_ref().and_then(|ctx| ctx.error.clone());
    let field = "w-full px-3 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-purple-700";

    html! {
        <div class="min-h-screen flex items-center justify-center bg-purple-50">
            <form onsubmit={on_submit} class="bg-white rounded-xl shadow-lg p-8 w-full max-w-sm space-y-4">
                <h1 class="text-2xl font-bold text-purple-900 text-center">{"Nanostore Dashboard"}</h1>
                if let Some(message) = expired {
                    <div class="p-3 bg-yellow-50 text-yellow-800 rounded text-sm">{message}</div>
                }
                if let Some(message) = &*error {
                    <div class="p-3 bg-red-50 text-red-700 rounded text-sm">{message}</div>
                }
                <label class="block text-sm text-gray-700">
                    {"User ID"}
                    <input class={field} value={form.user_id.clone()}
                        oninput={on_field(|form, value| form.user_id = value)} />
                </label>
                <label class="block text-sm text-gray-700">
                    {"User name"}
                    <input class={field} value={form.user_name.clone()}
                        oninput={on_field(|form, value| form.user_name = value)} />
                </label>
                <label class="block text-sm text-gray-700">
                    {"Access token"}
                    <input class={field} type="password" value={form.token.clone()}
                        oninput={on_field(|form, value| form.token = value)} />
                </label>
                <button type="submit" class="w-full bg-purple-900 hover:bg-purple-800 text-white font-medium py-2 rounded-lg">
                    {"Log in"}
                </button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_missing_field_is_reported() {
        let mut form = LoginForm {
            user_id: "42".into(),
            user_name: " ".into(),
            token: String::new(),
        };
        assert_eq!(form.missing_field(), Some("User name"));
        form.user_name = "Asha".into();
        assert_eq!(form.missing_field(), Some("Access token"));
        form.token = "abc".into();
        assert_eq!(form.missing_field(), None);
    }
}
