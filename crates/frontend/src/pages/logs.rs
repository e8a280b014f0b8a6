//! Pub/sub activity log

use crate::components::{DataTable, Header};
use crate::config::dashboard_config;
use crate::hooks::use_polling;
use nanostore_client::DashboardClient;
use nanostore_core::format::{format_datetime, log_message_preview, or_na};
use nanostore_core::types::LogRecord;
use yew::prelude::*;

const HEADERS: [&str; 7] = [
    "Created At",
    "Message",
    "Action",
    "Status",
    "Tray ID",
    "Slot ID",
    "State",
];

fn log_cells(record: &LogRecord) -> Vec<String> {
    vec![
        format_datetime(record.created_at.as_deref()),
        log_message_preview(record.message.as_ref()),
        or_na(record.metadata("station_slot_id").as_deref()),
        or_na(record.message_status().as_deref()),
        or_na(record.metadata("tray_id").as_deref()),
        or_na(record.metadata("slot_id").as_deref()),
        or_na(record.metadata("state").as_deref()),
    ]
}

#[function_component(LogsPage)]
pub fn logs_page() -> Html {
    let logs = use_polling(
        "logs",
        dashboard_config().aggregate_interval,
        |client: DashboardClient| async move {
            client.subscribe(&dashboard_config().pubsub_topic).await
        },
    );

    let loading = logs.is_none();
    let rows: Vec<Vec<String>> = logs
        .map(|logs| logs.records.iter().map(log_cells).collect())
        .unwrap_or_default();

    html! {
        <div class="min-h-screen bg-neutral-50">
            <Header />
            <main class="px-4 py-5 space-y-3">
                <h2 class="text-xl font-semibold text-purple-900">{"Logs"}</h2>
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
    fn test_log_cells_read_message_metadata() {
        let record: LogRecord = serde_json::from_value(json!({
            "created_at": "2025-06-01T10:00:00",
            "message": {
                "msg": "tray stored\\nretry=0",
                "status": "ok",
                "metadata": {"station_slot_id": "ST-2", "tray_id": "T-7", "slot_id": 31, "state": "done"}
            }
        }))
        .unwrap();
        assert_eq!(
            log_cells(&record),
            vec!["01-06-2025 10:00:00", "tray stored", "ST-2", "ok", "T-7", "31", "done"]
        );
    }

    #[test]
    fn test_plain_text_message() {
        let record: LogRecord =
            serde_json::from_value(json!({"message": "heartbeat"})).unwrap();
        let cells = log_cells(&record);
        assert_eq!(cells[0], "N/A");
        assert_eq!(cells[1], "heartbeat");
        assert_eq!(cells[2], "N/A");
    }
}
