//! Paginated reports

use crate::client::{dashboard_client, report_error};
use crate::components::toast::use_toasts;
use crate::components::{DataTable, Header};
use crate::config::UiConfig;
use nanostore_core::{Page, ReportKind, ReportTable};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

fn first_page() -> Page {
    Page::first(UiConfig::REPORT_PAGE_SIZE)
}

#[function_component(ReportsPage)]
pub fn reports_page() -> Html {
    let kind = use_state(|| ReportKind::ProductStock);
    let page = use_state(first_page);
    let table = use_state(|| None::<ReportTable>);
    let loading = use_state(|| false);
    let toasts = use_toasts();

    {
        let table = table.clone();
        let loading = loading.clone();
        use_effect_with((*kind, *page), move |&(kind, page)| {
            // Responses for a selection the operator already left are dropped
            let current = Rc::new(Cell::new(true));
            loading.set(true);
            {
                let current = Rc::clone(&current);
                spawn_local(async move {
                    let result = match dashboard_client() {
                        Ok(client) => client.report(kind, page).await,
                        Err(err) => Err(err),
                    };
                    if !current.get() {
                        return;
                    }
                    match result {
                        Ok(fresh) => table.set(Some(fresh)),
                        Err(err) => {
                            report_error(&err, kind.label(), toasts.as_ref());
                            table.set(Some(ReportTable::empty(kind, page)));
                        }
                    }
                    loading.set(false);
                });
            }
            move || current.set(false)
        });
    }

    let on_kind = {
        let kind = kind.clone();
        let page = page.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse::<ReportKind>() {
                Ok(selected) => {
                    kind.set(selected);
                    page.set(first_page());
                }
                Err(err) => tracing::warn!(error = %err, "unknown report selected"),
            }
        })
    };

    let total = table.as_ref().map_or(0, |table| table.total);
    let (first, last) = page.showing(total);
    let total_pages = page.total_pages(total).max(1);

    let on_previous = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.set(page.previous()))
    };
    let on_next = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.set(page.next(total)))
    };

    let headers: Vec<AttrValue> = kind
        .columns()
        .iter()
        .map(|column| AttrValue::Static(column.header))
        .collect();
    let rows = table
        .as_ref()
        .filter(|table| table.kind == *kind)
        .map(ReportTable::cells)
        .unwrap_or_default();

    html! {
        <div class="min-h-screen bg-neutral-50">
            <Header />
            <main class="px-4 py-5 space-y-3">
                <div class="flex items-center gap-4">
                    <h2 class="text-xl font-semibold text-purple-900">{"Reports"}</h2>
                    <select onchange={on_kind} class="px-3 py-1.5 text-sm border border-gray-300 rounded">
                        { for ReportKind::ALL.into_iter().map(|option| html! {
                            <option value={option.as_str()} selected={option == *kind}>{option.label()}</option>
                        }) }
                    </select>
                </div>
                <DataTable {headers} {rows} loading={*loading} />
                <div class="flex items-center justify-between text-sm text-gray-600">
                    <span>{format!("Showing {first} to {last} of {total} entries")}</span>
                    <div class="flex items-center gap-2">
                        <button onclick={on_previous} disabled={page.number <= 1}
                            class="px-3 py-1 border rounded disabled:opacity-40">{"Previous"}</button>
                        <span>{format!("Page {} of {total_pages}", page.number)}</span>
                        <button onclick={on_next} disabled={u64::from(page.number) >= total_pages}
                            class="px-3 py-1 border rounded disabled:opacity-40">{"Next"}</button>
                    </div>
                </div>
            </main>
        </div>
    }
}
