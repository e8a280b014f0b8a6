//! Live rack map with the shuttle between the two rows

use crate::config::dashboard_config;
use crate::hooks::use_polling;
use chrono::{Local, Utc};
use nanostore_client::DashboardClient;
use nanostore_core::shuttle::{ShuttleFacing, ShuttleStatus};
use nanostore_core::types::Robot;
use nanostore_core::{ShuttleHistory, ShuttleState};
use yew::prelude::*;

const fn status_dot(status: ShuttleStatus) -> &'static str {
    match status {
        ShuttleStatus::Idle => "bg-gray-300 border-gray-400",
        ShuttleStatus::InProgress => "bg-yellow-300 border-yellow-500",
        ShuttleStatus::Completed => "bg-green-400 border-green-600",
    }
}

fn status_of(action: &str) -> ShuttleStatus {
    ShuttleState {
        shuttle_action: Some(action.to_string()),
        ..ShuttleState::default()
    }
    .status()
}

#[derive(Properties, PartialEq)]
pub struct ShuttleMapProps {
    pub robot: Robot,
}

#[function_component(ShuttleMap)]
pub fn shuttle_map(props: &ShuttleMapProps) -> Html {
    let state = use_polling(
        "shuttle position",
        dashboard_config().live_status_interval,
        |client: DashboardClient| async move {
            client.shuttle_state(&dashboard_config().pubsub_topic).await
        },
    )
    .flatten();
    let history = use_state(ShuttleHistory::new);

    {
        let history = history.clone();
        use_effect_with(state.clone(), move |state| {
            if let Some(state) = state {
                let mut next = (*history).clone();
                if next.record(state, Utc::now()) {
                    history.set(next);
                }
            }
        });
    }

    let state = state.unwrap_or_default();
    let racks = i64::from(props.robot.robot_num_racks);
    let depths = i64::from(props.robot.robot_num_depths);

    let row_grid = |row: i64| {
        html! {
            <div class="flex flex-col items-center">
                <div class="text-lg font-semibold text-purple-900 mb-2">{format!("Row {row}")}</div>
                <div class="flex gap-2">
                    { for (0..depths).map(|depth| html! {
                        <div class="flex flex-col gap-2">
                            { for (0..racks).map(|rack| {
                                let class = if state.targets(row, rack, depth) {
                                    "bg-green-200 border-2 border-green-500 shadow"
                                } else {
                                    "bg-purple-50 border border-purple-100"
                                };
                                html! {
                                    <div class={classes!("w-[60px]", "h-[24px]", "rounded", "text-xs", "flex", "items-center", "justify-center", "text-purple-900", class)}>
                                        {rack}
                                    </div>
                                }
                            }) }
                        </div>
                    }) }
                </div>
            </div>
        }
    };

    let status = state.status();
    let track = html! {
        <div class="flex flex-col gap-2 mx-4 mt-9 min-w-[75px]">
            { for (0..racks).map(|rack| {
                let marker = match state.facing_at_rack(rack) {
                    Some(ShuttleFacing::Right) => "▶",
                    Some(ShuttleFacing::Left) => "◀",
                    None => "",
                };
                let tooltip = format!(
                    "{} | Tray: {} | Slot {}",
                    state.shuttle_action.as_deref().unwrap_or("Idle"),
                    state.shuttle_move_tray.as_deref().unwrap_or("N/A"),
                    state.destination_name.as_deref().unwrap_or("N/A"),
                );
                html! {
                    <div class="h-[24px] flex items-center justify-center gap-1" title={tooltip}>
                        if !marker.is_empty() {
                            <span class={classes!("w-2", "h-2", "rounded-full", "border-2", status_dot(status))}></span>
                            <span class="text-purple-900">{marker}</span>
                        }
                    </div>
                }
            }) }
        </div>
    };

    html! {
        <div class="flex flex-col lg:flex-row gap-6">
            <div class="flex shrink-0">
                { row_grid(1) }
                { track }
                { row_grid(0) }
            </div>
            <div class="flex-1 p-3 bg-white rounded-lg border border-gray-200 h-fit">
                <h4 class="text-sm font-semibold text-purple-900 mb-2">{"Recent Actions"}</h4>
                if history.is_empty() {
                    <p class="text-xs text-gray-500">{"No actions recorded yet"}</p>
                } else {
                    <div class="space-y-1.5">
                        { for history.iter().map(|entry| html! {
                            <div class="flex items-center gap-2 text-xs">
                                <span class={classes!("w-2", "h-2", "rounded-full", "border-2", "shrink-0", status_dot(status_of(&entry.action)))}></span>
                                <span class="font-medium">{entry.action.clone()}</span>
                                <span class="text-gray-500">
                                    { entry.tray_id.as_ref().map(|tray| format!("Tray: {tray}")).unwrap_or_default() }
                                    { entry.slot.as_ref().map(|slot| format!(" → Slot {slot}")).unwrap_or_default() }
                                </span>
                                <span class="text-gray-400 ml-auto text-[10px]">
                                    { entry.at.with_timezone(&Local).format("%H:%M:%S").to_string() }
                                </span>
                            </div>
                        }) }
                    </div>
                }
            </div>
        </div>
    }
}
