//! Records returned by the robot manager, nanostore, pub/sub and camera
//! manager services
//!
//! The services are loose about JSON types: counts arrive as numbers or
//! numeric strings, ids as strings or numbers, and `records` may be `null`.
//! Deserialization here accepts all of those.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Message the services send with a 404 when a query matched nothing
pub const NO_RECORDS_MESSAGE: &str = "no records found";

/// Standard response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Records<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub rowcount: Option<u64>,
    #[serde(default = "Vec::new", deserialize_with = "lenient::vec_or_null")]
    pub records: Vec<T>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Records<T> {
    pub const fn empty() -> Self {
        Self {
            status: None,
            message: None,
            count: None,
            total_count: None,
            rowcount: None,
            records: Vec::new(),
        }
    }

    /// Total reported by the server: `total_count`, then `count`, then
    /// `rowcount`, skipping zeros
    pub fn total(&self) -> u64 {
        [self.total_count, self.count, self.rowcount]
            .into_iter()
            .flatten()
            .find(|n| *n > 0)
            .unwrap_or(0)
    }

    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("success"))
    }

    pub fn is_no_records(&self) -> bool {
        self.message.as_ref().is_some_and(is_no_records_message)
    }

    pub fn first(&self) -> Option<&T> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Whether a `message` field carries the empty-result marker
pub fn is_no_records_message(message: &Value) -> bool {
    message
        .as_str()
        .is_some_and(|text| text.trim().eq_ignore_ascii_case(NO_RECORDS_MESSAGE))
}

/// Untyped row, used by reports
pub type Row = Map<String, Value>;

/// Robot layout from `/robotmanager/robots`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    #[serde(default, deserialize_with = "lenient::string")]
    pub robot_name: String,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub robot_num_rows: u32,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub robot_num_racks: u32,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub robot_num_slots: u32,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub robot_num_depths: u32,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default, deserialize_with = "lenient::string")]
    pub slot_id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tray_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub slot_name: Option<String>,
    #[serde(default, deserialize_with = "slot_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub slot_height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub rack_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        self.tray_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Slot tags arrive as an array or as one comma-separated string
fn slot_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| lenient::scalar_to_string(&item))
            .collect(),
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// `/robotmanager/slots_count` row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCount {
    #[serde(default, deserialize_with = "lenient::u64")]
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tray {
    #[serde(default, deserialize_with = "lenient::string")]
    pub tray_id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tray_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub tray_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

/// `/nanostore/occupied_trays` row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedTrayCount {
    #[serde(default, deserialize_with = "lenient::u64")]
    pub count: u64,
}

/// `/robotmanager/robot_power` row; readings are shown as sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    #[serde(default)]
    pub voltage: Option<Value>,
    #[serde(default)]
    pub current: Option<Value>,
    #[serde(default)]
    pub max_demand_active_power: Option<Value>,
    #[serde(default)]
    pub total_active_energy_kwh: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

/// `/pubsub/subscribe` row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub station_slot_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub station_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tray_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub slot_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
}

impl LogRecord {
    /// Message as an object, parsing it when it was sent as a JSON string
    pub fn message_object(&self) -> Option<Map<String, Value>> {
        match self.message.as_ref()? {
            Value::Object(map) => Some(map.clone()),
            Value::String(text) => match serde_json::from_str(text) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }

    /// `message.status`
    pub fn message_status(&self) -> Option<String> {
        self.message_object()
            .and_then(|map| map.get("status").and_then(lenient::scalar_to_string))
    }

    /// `message.metadata.<field>`
    pub fn metadata(&self, field: &str) -> Option<String> {
        self.message_object().and_then(|map| {
            map.get("metadata")
                .and_then(|metadata| metadata.get(field))
                .and_then(lenient::scalar_to_string)
        })
    }
}

/// `/cameramanager/camera_events` row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraEvent {
    #[serde(default, deserialize_with = "lenient::string")]
    pub task_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub clip_start_time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub clip_stop_time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub clip_filename: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub camera_device_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub clip_url: String,
}

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn scalar_to_string(value: &Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    pub fn scalar_to_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn scalar_to_u64(value: &Value) -> Option<u64> {
        match value {
            Value::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_to_string(&Value::deserialize(d)?))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_string(d)?.unwrap_or_default())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(scalar_to_f64(&Value::deserialize(d)?))
    }

    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(scalar_to_u64(&Value::deserialize(d)?))
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(opt_u64(d)?.unwrap_or(0))
    }

    pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(u32::try_from(u64(d)?).unwrap_or(u32::MAX))
    }

    pub fn vec_or_null<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }
}
