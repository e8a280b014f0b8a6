//! Nanostore dashboard core types and session logic

pub mod config;
pub mod cookie;
pub mod error;
pub mod format;
pub mod monitor;
pub mod poll;
pub mod report;
pub mod session;
pub mod shuttle;
pub mod store;
pub mod token;
pub mod types;

pub use config::DashboardConfig;
pub use error::{CoreError, CoreResult};
pub use monitor::{MonitorPlan, MonitorState, SessionMonitor, SessionWarning};
pub use poll::{ApplyOutcome, PollState, PollTicket};
pub use report::{Occupancy, Page, PowerInfo, ReportKind, ReportTable};
pub use session::{MigrationReport, SessionRecord, SessionStore};
pub use shuttle::{ShuttleHistory, ShuttleState};
pub use store::{CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore};
pub use token::{TokenStore, normalize_bearer};
pub use types::{CameraEvent, LogRecord, Records, Robot, Row, Slot};
