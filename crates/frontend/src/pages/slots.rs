//! Slot inventory

use crate::components::{DataTable, Header};
use crate::config::dashboard_config;
use crate::hooks::use_polling;
use nanostore_client::DashboardClient;
use nanostore_core::format::{NOT_AVAILABLE, format_datetime, or_na};
use nanostore_core::types::Slot;
use yew::prelude::*;

const HEADERS: [&str; 7] = [
    "Slot ID",
    "Tray ID",
    "Friendly Name",
    "Tags",
    "Height (mm)",
    "Status",
    "Updated At",
];

fn slot_cells(slot: &Slot) -> Vec<String> {
    vec![
        or_na(Some(&slot.slot_id)),
        or_na(slot.tray_id.as_deref()),
        or_na(slot.slot_name.as_deref()),
        if slot.tags.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            slot.tags.join(", ")
        },
        slot.slot_height
            .map_or_else(|| NOT_AVAILABLE.to_string(), |height| height.to_string()),
        or_na(slot.status.as_deref()),
        format_datetime(slot.updated_at.as_deref()),
    ]
}

#[function_component(SlotsPage)]
pub fn slots_page() -> Html {
    let slots = use_polling(
        "slots",
        dashboard_config().aggregate_interval,
        |client: DashboardClient| async move { client.slots(None).await },
    );

    let loading = slots.is_none();
    let (rows, total) = slots.map_or_else(
        || (Vec::new(), 0),
        |slots| {
            let total = slots.total().max(slots.len() as u64);
            (slots.records.iter().map(slot_cells).collect(), total)
        },
    );

    html! {
        <div class="min-h-screen bg-neutral-50">
            <Header />
            <main class="px-4 py-5 space-y-3">
                <div class="flex items-baseline gap-3">
                    <h2 class="text-xl font-semibold text-purple-900">{"Slots"}</h2>
                    <span class="text-sm text-gray-500">{format!("Total: {total}")}</span>
                </div>
                <DataTable
                    headers={HEADERS.into_iter().map(AttrValue::Static).collect::<Vec<_>>()}
                    {rows}
                    {loading}
                    filterable={true}
                />
            </main>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_cells() {
        let slot: Slot = serde_json::from_value(json!({
            "slot_id": "R03-1-4",
            "tray_id": null,
            "tags": "cold, fragile",
            "slot_height": 120,
            "status": "active",
            "updated_at": "2025-06-01T08:30:05"
        }))
        .unwrap();
        assert_eq!(
            slot_cells(&slot),
            vec!["R03-1-4", "N/A", "N/A", "cold, fragile", "120", "active", "01-06-2025 08:30:05"]
        );
    }
}
