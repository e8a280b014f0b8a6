//! Robot view: live rack map, recent actions and the dashboard cards

use crate::components::{Header, ShuttleMap, Spinner, SummaryCards};
use crate::config::dashboard_config;
use crate::hooks::use_polling;
use crate::storage::session_store;
use chrono::Utc;
use nanostore_client::DashboardClient;
use yew::prelude::*;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let summary = use_polling(
        "dashboard figures",
        dashboard_config().aggregate_interval,
        |client: DashboardClient| async move { client.summary().await },
    );

    // Keep the layout cached so the map renders before the next fetch
    {
        let robot = summary.as_ref().and_then(|summary| summary.robot.clone());
        use_effect_with(robot, |robot| {
            if let Some(robot) = robot {
                if let Err(err) = session_store().cache_robot_config(robot, Utc::now()) {
                    tracing::warn!(error = %err, "could not cache robot layout");
                }
            }
        });
    }

    let robot = summary
        .as_ref()
        .and_then(|summary| summary.robot.clone())
        .or_else(|| session_store().cached_robot_config());

    html! {
        <div class="min-h-screen bg-neutral-50">
            <Header />
            <main class="px-4 py-5 overflow-x-auto">
                <h2 class="text-xl font-semibold text-purple-900 mb-4">{"Robot Status Timeline"}</h2>
                if let Some(robot) = robot {
                    <ShuttleMap {robot} />
                } else {
                    <Spinner text={"Loading robot layout..."} />
                }
                <SummaryCards summary={summary} />
            </main>
        </div>
    }
}
