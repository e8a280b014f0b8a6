//! Live shuttle position decoded from the pub/sub topic

use crate::types::LogRecord;
use crate::types::lenient::scalar_to_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Number of completed actions kept for the timeline
pub const HISTORY_LEN: usize = 5;

/// Action reported while the shuttle is between steps
pub const ONGOING_ACTION: &str = "Ongoing";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuttleState {
    pub store_row: Option<i64>,
    pub store_rack: Option<i64>,
    pub store_depth: Option<i64>,
    pub shuttle_action: Option<String>,
    pub shuttle_move_tray: Option<String>,
    pub destination_name: Option<String>,
}

/// Colour class of the status marker next to the shuttle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuttleStatus {
    Idle,
    InProgress,
    Completed,
}

/// Side of the track the shuttle faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuttleFacing {
    /// Serving row 0
    Right,
    /// Serving row 1
    Left,
}

fn int_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(scalar_to_string)
        .filter(|text| !text.is_empty())
}

impl ShuttleState {
    /// Decode shuttle fields from a pub/sub record.
    ///
    /// The fields are looked up in the message object first and then in its
    /// `metadata`. Returns `None` when neither carries any of them.
    pub fn from_log(record: &LogRecord) -> Option<Self> {
        let message = record.message_object()?;
        let metadata = message
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let int = |key| int_field(&message, key).or_else(|| int_field(&metadata, key));
        let text = |key| text_field(&message, key).or_else(|| text_field(&metadata, key));

        let state = Self {
            store_row: int("store_row"),
            store_rack: int("store_rack"),
            store_depth: int("store_depth"),
            shuttle_action: text("shuttle_action"),
            shuttle_move_tray: text("shuttle_move_tray"),
            destination_name: text("destination_name"),
        };
        (state != Self::default()).then_some(state)
    }

    /// Travelling along the track rather than parked at a rack
    pub fn is_traversing(&self) -> bool {
        matches!(self.shuttle_action.as_deref(), Some("backward" | "forward"))
    }

    pub fn status(&self) -> ShuttleStatus {
        match self.shuttle_action.as_deref() {
            Some("Stored" | "Retrieved") => ShuttleStatus::Completed,
            Some("Storing" | "Retrieve") => ShuttleStatus::InProgress,
            _ => ShuttleStatus::Idle,
        }
    }

    /// Where the shuttle is drawn for a rack, if it is parked there
    pub fn facing_at_rack(&self, rack: i64) -> Option<ShuttleFacing> {
        if self.is_traversing() || self.store_rack != Some(rack) {
            return None;
        }
        match self.store_row {
            Some(0) => Some(ShuttleFacing::Right),
            Some(1) => Some(ShuttleFacing::Left),
            _ => None,
        }
    }

    /// Whether a slot is the target of the current operation
    pub fn targets(&self, row: i64, rack: i64, depth: i64) -> bool {
        self.shuttle_action.is_some()
            && !self.is_traversing()
            && self.store_row == Some(row)
            && self.store_rack == Some(rack)
            && self.store_depth == Some(depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuttleAction {
    pub action: String,
    pub at: DateTime<Utc>,
    pub tray_id: Option<String>,
    pub slot: Option<String>,
}

/// Most recent completed actions, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuttleHistory {
    entries: VecDeque<ShuttleAction>,
}

impl ShuttleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the action in `state`. Returns true when an entry was added.
    ///
    /// `Ongoing` and missing actions are ignored, as is a repeat of the
    /// newest entry's action on the same tray.
    pub fn record(&mut self, state: &ShuttleState, at: DateTime<Utc>) -> bool {
        let Some(action) = state
            .shuttle_action
            .as_deref()
            .filter(|action| *action != ONGOING_ACTION)
        else {
            return false;
        };

        if self.entries.front().is_some_and(|newest| {
            newest.action == action && newest.tray_id == state.shuttle_move_tray
        }) {
            return false;
        }

        self.entries.push_front(ShuttleAction {
            action: action.to_string(),
            at,
            tray_id: state.shuttle_move_tray.clone(),
            slot: state.destination_name.clone(),
        });
        self.entries.truncate(HISTORY_LEN);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShuttleAction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn parked(action: &str, tray: &str) -> ShuttleState {
        ShuttleState {
            store_row: Some(1),
            store_rack: Some(3),
            store_depth: Some(2),
            shuttle_action: Some(action.to_string()),
            shuttle_move_tray: Some(tray.to_string()),
            destination_name: Some("14".to_string()),
        }
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, second).unwrap()
    }

    #[test]
    fn test_from_log_reads_message_and_metadata() {
        let record = LogRecord {
            message: Some(json!({
                "store_row": "0",
                "store_rack": 5,
                "metadata": {"store_depth": 1, "shuttle_action": "Storing", "shuttle_move_tray": "TR-1"}
            })),
            ..LogRecord::default()
        };
        let state = ShuttleState::from_log(&record).unwrap();
        assert_eq!(state.store_row, Some(0));
        assert_eq!(state.store_rack, Some(5));
        assert_eq!(state.store_depth, Some(1));
        assert_eq!(state.status(), ShuttleStatus::InProgress);
        assert_eq!(state.facing_at_rack(5), Some(ShuttleFacing::Right));
        assert_eq!(state.facing_at_rack(4), None);
    }

    #[test]
    fn test_from_log_without_shuttle_fields() {
        let record = LogRecord {
            message: Some(json!("{\"msg\": \"heartbeat\"}")),
            ..LogRecord::default()
        };
        assert_eq!(ShuttleState::from_log(&record), None);
    }

    #[test]
    fn test_traversing_hides_shuttle_and_target() {
        let mut state = parked("forward", "TR-1");
        assert!(state.is_traversing());
        assert_eq!(state.facing_at_rack(3), None);
        assert!(!state.targets(1, 3, 2));

        state.shuttle_action = Some("Retrieve".into());
        assert!(state.targets(1, 3, 2));
        assert!(!state.targets(0, 3, 2));
        assert_eq!(state.facing_at_rack(3), Some(ShuttleFacing::Left));
    }

    #[test]
    fn test_history_skips_ongoing_and_repeats() {
        let mut history = ShuttleHistory::new();
        assert!(!history.record(&parked(ONGOING_ACTION, "TR-1"), at(0)));
        assert!(history.record(&parked("Storing", "TR-1"), at(1)));
        assert!(!history.record(&parked("Storing", "TR-1"), at(2)));
        assert!(history.record(&parked("Stored", "TR-1"), at(3)));
        assert!(history.record(&parked("Storing", "TR-1"), at(4)));
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().next().map(|a| a.at), Some(at(4)));
    }

    #[test]
    fn test_history_keeps_five_newest() {
        let mut history = ShuttleHistory::new();
        for n in 0..8 {
            history.record(&parked("Stored", &format!("TR-{n}")), at(n));
        }
        assert_eq!(history.len(), HISTORY_LEN);
        let trays: Vec<_> = history.iter().filter_map(|a| a.tray_id.clone()).collect();
        assert_eq!(trays, vec!["TR-7", "TR-6", "TR-5", "TR-4", "TR-3"]);
    }
}
