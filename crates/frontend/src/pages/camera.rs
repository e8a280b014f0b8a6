//! Camera clips recorded for a task

use crate::app::Route;
use crate::client::{dashboard_client, report_error};
use crate::components::toast::use_toasts;
use crate::components::{Header, Spinner};
use nanostore_core::format::format_datetime;
use nanostore_core::types::CameraEvent;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CameraPageProps {
    pub task_id: String,
}

#[function_component(CameraPage)]
pub fn camera_page(props: &CameraPageProps) -> Html {
    let events = use_state(|| None::<Vec<CameraEvent>>);
    let selected = use_state(|| None::<CameraEvent>);
    let toasts = use_toasts();

    {
        let events = events.clone();
        let selected = selected.clone();
        use_effect_with(props.task_id.clone(), move |task_id| {
            let current = Rc::new(Cell::new(true));
            events.set(None);
            selected.set(None);
            {
                let current = Rc::clone(&current);
                let task_id = task_id.clone();
                spawn_local(async move {
                    let result = match dashboard_client() {
                        Ok(client) => client.camera_events(&task_id).await,
                        Err(err) => Err(err),
                    };
                    if !current.get() {
                        return;
                    }
                    match result {
                        Ok(found) => events.set(Some(found.records)),
                        Err(err) => {
                            report_error(&err, "camera events", toasts.as_ref());
                            events.set(Some(Vec::new()));
                        }
                    }
                });
            }
            move || current.set(false)
        });
    }

    let body = match &*events {
        None => html! { <Spinner text={"Loading camera events..."} /> },
        Some(events) if events.is_empty() => html! {
            <p class="text-center text-gray-500 py-10">{"No camera events found for this task"}</p>
        },
        Some(events) => html! {
            <table class="min-w-full text-sm bg-white border border-gray-200 rounded-lg">
                <thead class="bg-gray-50">
                    <tr>
                        { for ["Task ID", "Start Time", "Stop Time", "File Name", "Camera Name", "View", "Download"]
                            .into_iter()
                            .map(|header| html! { <th class="px-3 py-2 text-left font-semibold text-gray-700">{header}</th> }) }
                    </tr>
                </thead>
                <tbody>
                    { for events.iter().map(|event| {
                        let on_view = {
                            let selected = selected.clone();
                            let event = event.clone();
                            Callback::from(move |_: MouseEvent| selected.set(Some(event.clone())))
                        };
                        html! {
                            <tr class="border-t border-gray-100">
                                <td class="px-3 py-2">{event.task_id.clone()}</td>
                                <td class="px-3 py-2">{format_datetime(Some(&event.clip_start_time))}</td>
                                <td class="px-3 py-2">{format_datetime(Some(&event.clip_stop_time))}</td>
                                <td class="px-3 py-2">{event.clip_filename.clone()}</td>
                                <td class="px-3 py-2">{event.camera_device_id.clone()}</td>
                                <td class="px-3 py-2">
                                    <button onclick={on_view} class="text-purple-900 hover:underline">{"View"}</button>
                                </td>
                                <td class="px-3 py-2">
                                    <a href={event.clip_url.clone()} target="_blank" rel="noopener noreferrer"
                                        class="text-purple-900 hover:underline">{"Download"}</a>
                                </td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        },
    };

    let on_close = {
        let selected = selected.clone();
        Callback::from(move |_: MouseEvent| selected.set(None))
    };

    html! {
        <div class="min-h-screen bg-neutral-50">
            <Header />
            <main class="px-4 py-5 space-y-3">
                <div class="flex items-center gap-4">
                    <Link<Route> to={Route::Reports} classes={classes!("text-sm", "text-purple-900", "hover:underline")}>{"← Back"}</Link<Route>>
                    <h2 class="text-xl font-semibold text-purple-900">{format!("Camera events for task {}", props.task_id)}</h2>
                </div>
                { body }
                if let Some(event) = &*selected {
                    <div class="fixed inset-0 bg-black bg-opacity-50 flex items-center justify-center z-40">
                        <div class="bg-white rounded-lg p-4 max-w-3xl w-full mx-4 shadow-xl">
                            <div class="flex justify-between items-center mb-3">
                                <h3 class="font-semibold text-purple-900">{event.camera_device_id.clone()}</h3>
                                <button onclick={on_close} class="text-gray-500 hover:text-gray-900">{"✕"}</button>
                            </div>
                            <video src={event.clip_url.clone()} controls={true} autoplay={true} class="w-full rounded">
                                {"Your browser does not support the video tag."}
                            </video>
                            <p class="text-xs text-gray-500 mt-2">{event.clip_filename.clone()}</p>
                        </div>
                    </div>
                }
            </main>
        </div>
    }
}
