//! Toast notifications

use crate::config::UiConfig;
use gloo::timers::callback::Timeout;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    const fn classes(self) -> &'static str {
        match self {
            Self::Info => "bg-blue-50 border-blue-400 text-blue-800",
            Self::Warning => "bg-yellow-50 border-yellow-400 text-yellow-800",
            Self::Error => "bg-red-50 border-red-400 text-red-800",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub timeout_ms: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastList {
    next_id: u64,
    toasts: Vec<Toast>,
}

pub enum ToastAction {
    Push {
        level: ToastLevel,
        title: String,
        message: String,
        timeout_ms: u32,
    },
    Dismiss(u64),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ToastAction::Push {
                level,
                title,
                message,
                timeout_ms,
            } => {
                // Polling loops repeat the same failure every tick
                if next
                    .toasts
                    .iter()
                    .any(|toast| toast.title == title && toast.message == message)
                {
                    return self;
                }
                next.next_id += 1;
                next.toasts.push(Toast {
                    id: next.next_id,
                    level,
                    title,
                    message,
                    timeout_ms,
                });
            }
            ToastAction::Dismiss(id) => next.toasts.retain(|toast| toast.id != id),
        }
        Rc::new(next)
    }
}

pub type ToastContext = UseReducerHandle<ToastList>;

/// Push helpers on the context handle
pub trait Notify {
    fn notify(&self, level: ToastLevel, title: &str, message: &str, timeout_ms: u32);

    fn info(&self, title: &str, message: &str) {
        self.notify(ToastLevel::Info, title, message, UiConfig::TOAST_TIMEOUT_MS);
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(ToastLevel::Error, title, message, UiConfig::TOAST_TIMEOUT_MS);
    }
}

impl Notify for ToastContext {
    fn notify(&self, level: ToastLevel, title: &str, message: &str, timeout_ms: u32) {
        self.dispatch(ToastAction::Push {
            level,
            title: title.to_string(),
            message: message.to_string(),
            timeout_ms,
        });
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    pub children: Children,
}

#[function_component(ToastProvider)]
pub fn toast_provider(props: &ToastProviderProps) -> Html {
    let toasts = use_reducer(ToastList::default);

    html! {
        <ContextProvider<ToastContext> context={toasts.clone()}>
            {props.children.clone()}
            <div class="fixed top-4 right-4 z-50 flex flex-col gap-2 w-96">
                { for toasts.toasts.iter().map(|toast| html! {
                    <ToastItem key={toast.id} toast={toast.clone()} context={toasts.clone()} />
                }) }
            </div>
        </ContextProvider<ToastContext>>
    }
}

#[derive(Properties, PartialEq)]
struct ToastItemProps {
    toast: Toast,
    context: ToastContext,
}

#[function_component(ToastItem)]
fn toast_item(props: &ToastItemProps) -> Html {
    {
        let context = props.context.clone();
        let id = props.toast.id;
        let timeout_ms = props.toast.timeout_ms;
        use_effect_with(id, move |_| {
            let timeout = Timeout::new(timeout_ms, move || {
                context.dispatch(ToastAction::Dismiss(id));
            });
            move || drop(timeout)
        });
    }

    let on_close = {
        let context = props.context.clone();
        let id = props.toast.id;
        Callback::from(move |_| context.dispatch(ToastAction::Dismiss(id)))
    };

    html! {
        <div class={classes!("border-l-4", "rounded", "shadow", "p-3", props.toast.level.classes())}>
            <div class="flex justify-between items-start">
                <p class="font-semibold text-sm">{&props.toast.title}</p>
                <button class="text-xs opacity-60 hover:opacity-100" onclick={on_close}>{"✕"}</button>
            </div>
            <p class="text-sm mt-1">{&props.toast.message}</p>
        </div>
    }
}

#[hook]
pub fn use_toasts() -> Option<ToastContext> {
    use_context::<ToastContext>()
}
