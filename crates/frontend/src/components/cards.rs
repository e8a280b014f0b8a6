//! Dashboard figure cards

use nanostore_client::DashboardSummary;
use nanostore_core::format::{format_datetime, percent};
use nanostore_core::{Occupancy, PowerInfo};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
struct StatCardProps {
    title: AttrValue,
    children: Children,
}

#[function_component(StatCard)]
fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="bg-white rounded-lg border border-gray-200 p-4 min-w-[180px]">
            <h3 class="text-sm font-semibold text-purple-900 mb-2">{props.title.clone()}</h3>
            <div class="space-y-1 text-sm text-gray-700">{props.children.clone()}</div>
        </div>
    }
}

fn line(label: &str, value: impl Into<Html>) -> Html {
    html! {
        <div class="flex justify-between gap-4">
            <span class="text-gray-500">{label.to_string()}</span>
            <span class="font-medium tabular-nums">{value.into()}</span>
        </div>
    }
}

fn occupancy_lines(occupancy: Option<&Occupancy>, unit: &str) -> Html {
    let Some(occupancy) = occupancy else {
        return html! { <span class="text-red-600">{"Unavailable"}</span> };
    };
    html! {
        <>
            { line(&format!("Total {unit}"), occupancy.total.to_string()) }
            { line("Occupied", occupancy.occupied.to_string()) }
            { line("Free", occupancy.free.to_string()) }
            { line("Occupancy", percent(occupancy.occupied_percent)) }
        </>
    }
}

fn power_lines(power: &PowerInfo) -> Html {
    html! {
        <>
            { line("Voltage", power.voltage.clone()) }
            { line("Current", power.current.clone()) }
            { line("Power", power.power.clone()) }
            { line("Energy", power.energy.clone()) }
            { line("Updated", format_datetime(power.updated_at.as_deref())) }
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct SummaryCardsProps {
    pub summary: Option<DashboardSummary>,
}

#[function_component(SummaryCards)]
pub fn summary_cards(props: &SummaryCardsProps) -> Html {
    let Some(summary) = &props.summary else {
        return html! {
            <div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mt-4 text-sm text-gray-500">
                {"Loading dashboard figures..."}
            </div>
        };
    };

    html! {
        <div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mt-4">
            <StatCard title="Slots">{ occupancy_lines(summary.slots.as_ref(), "slots") }</StatCard>
            <StatCard title="Trays">{ occupancy_lines(summary.trays.as_ref(), "trays") }</StatCard>
            <StatCard title="Power">{ power_lines(&summary.power) }</StatCard>
        </div>
    }
}
