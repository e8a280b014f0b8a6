//! CLI commands

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use nanostore_client::poller::{PollEvent, Poller};
use nanostore_client::{ClientError, DashboardClient, DashboardSummary, StaticToken};
use nanostore_core::format::{format_datetime, log_message_preview, or_na, percent};
use nanostore_core::monitor::EXPIRED_MESSAGE;
use nanostore_core::report::DEFAULT_PAGE_SIZE;
use nanostore_core::session::SessionRecord;
use nanostore_core::{
    CameraEvent, DashboardConfig, LogRecord, Occupancy, Page, Records, ReportKind, Row,
    ShuttleState,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config;
use crate::output::{print_json, print_rows, print_table};
use crate::session;

/// Resolved settings shared by every command
pub struct Context {
    config: DashboardConfig,
    token: Option<String>,
}

impl Context {
    pub fn new(config: DashboardConfig, token: Option<String>) -> Self {
        Self { config, token }
    }

    fn client(&self) -> Result<DashboardClient> {
        let Some(token) = self.token.as_deref().filter(|token| !token.trim().is_empty()) else {
            bail!("no access token: pass --token or set NANOSTORE_TOKEN");
        };
        let client = DashboardClient::from_config(&self.config, Arc::new(StaticToken::new(token)))?;
        Ok(client)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dashboard cards: slots, trays and power
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Poll until interrupted, printing every change
    Watch {
        /// What to follow
        #[arg(value_enum, default_value = "shuttle")]
        target: WatchTarget,

        /// Poll interval in milliseconds (defaults to the configured interval)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Login time in milliseconds since the epoch; stops the watch when
        /// the session expires
        #[arg(long, env = "NANOSTORE_LOGIN_TIMESTAMP")]
        login_timestamp: Option<String>,

        /// User the session belongs to
        #[arg(long, env = "NANOSTORE_USER_ID")]
        user_id: Option<String>,

        /// Display name for the session
        #[arg(long, env = "NANOSTORE_USER_NAME")]
        user_name: Option<String>,
    },

    /// List every storage slot
    Slots {
        #[arg(long)]
        json: bool,
    },

    /// Show the latest messages on the robot's topic
    Logs {
        /// Number of messages to print
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Fetch one page of a report
    Report {
        /// Report to fetch, e.g. product-stock or rack-transaction
        kind: ReportKind,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        #[arg(long)]
        json: bool,
    },

    /// List robot tasks
    Tasks {
        /// Only tasks in this status, e.g. failed or completed
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        #[arg(long)]
        json: bool,
    },

    /// Item usage history
    ItemsUsage {
        /// Sort by time, newest first by default
        #[arg(long, value_enum, default_value = "desc")]
        order: SortOrder,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        #[arg(long)]
        json: bool,
    },

    /// Per-rack occupancy summary
    Racks {
        #[arg(long)]
        json: bool,
    },

    /// List camera clips recorded for a task
    CameraEvents {
        task_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Configuration operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the default configuration file path
    Path,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WatchTarget {
    /// Shuttle position, at the live status interval
    Shuttle,
    /// Dashboard cards, at the aggregate interval
    Summary,
    /// Topic messages, at the aggregate interval
    Logs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_query(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl Commands {
    pub const fn is_long_running(&self) -> bool {
        matches!(self, Self::Watch { .. })
    }

    pub async fn execute(self, context: Context) -> Result<()> {
        match self {
            Commands::Status { json } => {
                let summary = context.client()?.summary().await?;
                if json {
                    print_json(&summary)?;
                } else {
                    print_summary(&summary);
                }
            }
            Commands::Watch {
                target,
                interval_ms,
                login_timestamp,
                user_id,
                user_name,
            } => {
                let session =
                    session::session_from_flags(user_id, user_name, login_timestamp.as_deref())?;
                watch(&context, target, interval_ms.map(Duration::from_millis), session).await?;
            }
            Commands::Slots { json } => {
                let slots = context.client()?.slots(None).await?;
                if json {
                    print_json(&slots.records)?;
                } else {
                    let rows: Vec<Vec<String>> = slots
                        .records
                        .iter()
                        .map(|slot| {
                            vec![
                                slot.slot_id.clone(),
                                or_na(slot.tray_id.as_deref()),
                                or_na(slot.rack_name.as_deref()),
                                or_na(slot.status.as_deref()),
                                slot.tags.join(","),
                                format_datetime(slot.updated_at.as_deref()),
                            ]
                        })
                        .collect();
                    print_table(&["Slot", "Tray", "Rack", "Status", "Tags", "Updated"], &rows);
                    println!("{} slots", slots.total().max(slots.len() as u64));
                }
            }
            Commands::Logs { limit, json } => {
                let topic = context.config.pubsub_topic.clone();
                let logs = context.client()?.subscribe(&topic).await?;
                let records: Vec<&LogRecord> = logs.records.iter().take(limit).collect();
                if json {
                    print_json(&records)?;
                } else {
                    print_logs(&records);
                }
            }
            Commands::Report {
                kind,
                page,
                page_size,
                json,
            } => {
                let page = Page::new(page, page_size);
                let table = context.client()?.report(kind, page).await?;
                if json {
                    print_json(&table)?;
                } else {
                    let headers: Vec<&str> =
                        kind.columns().iter().map(|column| column.header).collect();
                    print_table(&headers, &table.cells());
                    let (first, last) = page.showing(table.total);
                    println!(
                        "{}: showing {first} to {last} of {} entries (page {} of {})",
                        kind.label(),
                        table.total,
                        page.number,
                        page.total_pages(table.total).max(1)
                    );
                }
            }
            Commands::Tasks {
                status,
                page,
                page_size,
                json,
            } => {
                let tasks = context
                    .client()?
                    .tasks(status.as_deref(), Some(Page::new(page, page_size)))
                    .await?;
                print_records(&tasks, json)?;
            }
            Commands::ItemsUsage {
                order,
                page,
                page_size,
                json,
            } => {
                let usage = context
                    .client()?
                    .items_usage(order.as_query(), Some(Page::new(page, page_size)))
                    .await?;
                print_records(&usage, json)?;
            }
            Commands::Racks { json } => {
                let racks = context.client()?.racks_summary(None).await?;
                print_records(&racks, json)?;
            }
            Commands::CameraEvents { task_id, json } => {
                let events = context.client()?.camera_events(&task_id).await?;
                if json {
                    print_json(&events.records)?;
                } else if events.is_empty() {
                    println!("No camera events found for task {}", task_id.trim());
                } else {
                    print_camera_events(&events.records);
                }
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    context.config.validate()?;
                    print_json(&context.config)?;
                }
                ConfigCommands::Path => match config::default_config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => bail!("no configuration directory on this platform"),
                },
            },
        }
        Ok(())
    }
}

async fn watch(
    context: &Context,
    target: WatchTarget,
    interval: Option<Duration>,
    session: Option<SessionRecord>,
) -> Result<()> {
    let client = context.client()?;
    let topic = context.config.pubsub_topic.clone();

    match target {
        WatchTarget::Shuttle => {
            let interval = interval.unwrap_or(context.config.live_status_interval);
            poll_until_stopped(
                interval,
                session,
                || {
                    let client = client.clone();
                    let topic = topic.clone();
                    async move { client.shuttle_state(&topic).await }
                },
                |event| {
                    if let PollEvent::Updated(state) = event {
                        match state {
                            Some(state) => println!("{}", shuttle_line(state)),
                            None => println!("No shuttle activity reported"),
                        }
                    }
                },
            )
            .await
        }
        WatchTarget::Summary => {
            let interval = interval.unwrap_or(context.config.aggregate_interval);
            poll_until_stopped(
                interval,
                session,
                || {
                    let client = client.clone();
                    async move { client.summary().await }
                },
                |event| {
                    if let PollEvent::Updated(summary) = event {
                        println!("--- {}", Utc::now().format("%d-%m-%Y %H:%M:%S"));
                        print_summary(summary);
                    }
                },
            )
            .await
        }
        WatchTarget::Logs => {
            let interval = interval.unwrap_or(context.config.aggregate_interval);
            poll_until_stopped(
                interval,
                session,
                || {
                    let client = client.clone();
                    let topic = topic.clone();
                    async move { client.subscribe(&topic).await }
                },
                |event| {
                    if let PollEvent::Updated(logs) = event {
                        let records: Vec<&LogRecord> = logs.records.iter().collect();
                        print_logs(&records);
                    }
                },
            )
            .await
        }
    }
}

/// Run a poll loop until Ctrl-C, an expired session, or a rejected token
async fn poll_until_stopped<T, F, Fut, S>(
    interval: Duration,
    session: Option<SessionRecord>,
    fetch: F,
    sink: S,
) -> Result<()>
where
    T: Serialize,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    S: FnMut(PollEvent<'_, T>),
{
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping");
                shutdown.cancel();
            }
        });
    }

    let poller = Poller::with_token(interval, shutdown.clone());
    info!(?interval, "Polling, press Ctrl-C to stop");

    tokio::select! {
        biased;
        result = poller.run(fetch, sink) => {
            shutdown.cancel();
            let summary = result?;
            info!(ticks = summary.ticks, updates = summary.updates, failures = summary.failures, "Watch stopped");
            Ok(())
        }
        expired = session::watch_session(session, Utc::now(), shutdown.clone()) => {
            shutdown.cancel();
            if expired {
                bail!(EXPIRED_MESSAGE);
            }
            Ok(())
        }
    }
}

fn print_records(records: &Records<Row>, json: bool) -> Result<()> {
    if json {
        print_json(&records.records)?;
    } else if records.is_empty() {
        println!("No records found");
    } else {
        print_rows(&records.records);
        println!("{} of {} records", records.len(), records.total().max(records.len() as u64));
    }
    Ok(())
}

fn print_summary(summary: &DashboardSummary) {
    if let Some(robot) = &summary.robot {
        println!(
            "Robot   {} ({} rows, {} racks, {} slots, {} depths)",
            robot.robot_name,
            robot.robot_num_rows,
            robot.robot_num_racks,
            robot.robot_num_slots,
            robot.robot_num_depths
        );
    }
    let rows = vec![
        occupancy_row("Slots", summary.slots.as_ref()),
        occupancy_row("Trays", summary.trays.as_ref()),
    ];
    print_table(&["", "Total", "Occupied", "Free", "Occupied %"], &rows);

    let power = &summary.power;
    println!(
        "Power   {} | {} | {} | {} (updated {})",
        power.voltage,
        power.current,
        power.power,
        power.energy,
        format_datetime(power.updated_at.as_deref())
    );
}

fn occupancy_row(label: &str, occupancy: Option<&Occupancy>) -> Vec<String> {
    let mut row = vec![label.to_string()];
    match occupancy {
        Some(occupancy) => row.extend([
            occupancy.total.to_string(),
            occupancy.occupied.to_string(),
            occupancy.free.to_string(),
            percent(occupancy.occupied_percent),
        ]),
        None => row.push("unavailable".to_string()),
    }
    row
}

fn print_logs(records: &[&LogRecord]) {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                format_datetime(record.created_at.as_deref()),
                or_na(record.message_status().as_deref()),
                or_na(record.metadata("tray_id").as_deref()),
                or_na(record.metadata("slot_id").as_deref()),
                log_message_preview(record.message.as_ref()),
            ]
        })
        .collect();
    print_table(&["Time", "Status", "Tray", "Slot", "Message"], &rows);
}

fn print_camera_events(events: &[CameraEvent]) {
    let rows: Vec<Vec<String>> = events
        .iter()
        .map(|event| {
            vec![
                format_datetime(Some(&event.clip_start_time)),
                format_datetime(Some(&event.clip_stop_time)),
                event.camera_device_id.clone(),
                event.clip_url.clone(),
            ]
        })
        .collect();
    print_table(&["Start", "Stop", "Camera", "Clip"], &rows);
}

fn shuttle_line(state: &ShuttleState) -> String {
    let position = |value: Option<i64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "{}  row {} rack {} depth {}  tray {}  {}",
        Utc::now().format("%H:%M:%S"),
        position(state.store_row),
        position(state.store_rack),
        position(state.store_depth),
        or_na(state.shuttle_move_tray.as_deref()),
        or_na(state.shuttle_action.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_token() {
        let context = Context::new(DashboardConfig::default(), Some("  ".to_string()));
        assert!(context.client().is_err());

        let context = Context::new(DashboardConfig::default(), Some("abc".to_string()));
        assert!(context.client().is_ok());
    }

    #[test]
    fn test_shuttle_line_marks_missing_fields() {
        let state = ShuttleState {
            store_row: Some(1),
            store_rack: Some(4),
            store_depth: None,
            shuttle_action: Some("Retrieve".to_string()),
            shuttle_move_tray: None,
            destination_name: None,
        };
        let line = shuttle_line(&state);
        assert!(line.ends_with("row 1 rack 4 depth -  tray N/A  Retrieve"));
    }

    #[test]
    fn test_failed_card_row_reads_unavailable() {
        assert_eq!(occupancy_row("Slots", None), ["Slots", "unavailable"]);
        let trays = Occupancy::from_parts(3, 1);
        let row = occupancy_row("Trays", Some(&trays));
        assert_eq!(&row[..4], ["Trays", "4", "3", "1"]);
    }
}
