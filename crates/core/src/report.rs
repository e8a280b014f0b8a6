//! Report catalog, pagination and the derived occupancy figures shown on the
//! dashboard cards

use crate::error::{CoreError, CoreResult};
use crate::format::{
    NOT_AVAILABLE, format_date, format_datetime_short, percent, tray_weight_kg, value_text,
    yes_no,
};
use crate::types::{PowerReading, Row, Slot, lenient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Page size used when rebuilding the rack report from raw slots
pub const RACK_FALLBACK_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    ProductStock,
    OrderProductTransaction,
    OrderTrayTransaction,
    TrayTransaction,
    RackTransaction,
    OrderFailureTransaction,
}

/// What to do when a report endpoint answers 404
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFallback {
    /// Same paging against another endpoint
    Endpoint(&'static str),
    /// Fetch raw slots and aggregate them by rack
    AggregateSlots,
}

impl ReportKind {
    pub const ALL: [Self; 6] = [
        Self::ProductStock,
        Self::OrderProductTransaction,
        Self::OrderTrayTransaction,
        Self::TrayTransaction,
        Self::RackTransaction,
        Self::OrderFailureTransaction,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductStock => "product_stock",
            Self::OrderProductTransaction => "order_product_transaction",
            Self::OrderTrayTransaction => "order_tray_transaction",
            Self::TrayTransaction => "tray_transaction",
            Self::RackTransaction => "rack_transaction",
            Self::OrderFailureTransaction => "order_failure_transaction",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProductStock => "Product Stock Report",
            Self::OrderProductTransaction => "Order Product Transaction",
            Self::OrderTrayTransaction => "Order Tray Transaction",
            Self::TrayTransaction => "Tray Transaction",
            Self::RackTransaction => "Rack Transaction",
            Self::OrderFailureTransaction => "Order Failure Transaction",
        }
    }

    /// Endpoint path relative to the API origin
    pub const fn path(self) -> &'static str {
        match self {
            Self::ProductStock => "/nanostore/stock",
            Self::OrderProductTransaction => "/nanostore/items/usage",
            Self::OrderTrayTransaction | Self::OrderFailureTransaction => "/robotmanager/task",
            Self::TrayTransaction => "/robotmanager/trays",
            Self::RackTransaction => "/robotmanager/racks/summary",
        }
    }

    /// Fixed query parameters sent before the paging ones
    pub const fn fixed_query(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::OrderProductTransaction => &[("order_by", "DESC")],
            Self::OrderFailureTransaction => &[("task_status", "failed")],
            _ => &[],
        }
    }

    pub const fn fallback(self) -> Option<ReportFallback> {
        match self {
            Self::ProductStock => Some(ReportFallback::Endpoint("/nanostore/items")),
            Self::RackTransaction => Some(ReportFallback::AggregateSlots),
            _ => None,
        }
    }

    pub fn columns(self) -> &'static [Column] {
        use CellKind::{Count, Date, DateTime, Percent, Text, WeightKg, YesNo};
        match self {
            Self::ProductStock => const {
                &[
                    Column::new("updated_at", "Transaction Date", DateTime),
                    Column::new("created_at", "Receive Date", Date),
                    Column::new("item_id", "Item Id", Text),
                    Column::new("item_quantity", "Stock", Count),
                    Column::new("tray_id", "Tray ID", Text),
                    Column::new("tray_weight", "Tray Weight(Kg)", WeightKg),
                    Column::new("item_description", "Item Description", Text),
                ]
            },
            Self::OrderProductTransaction => const {
                &[
                    Column::new("updated_at", "Transaction Date", DateTime),
                    Column::new("transaction_type", "Activity Type", Text),
                    Column::new("order_id", "Order Id", Text),
                    Column::new("user_id", "User Id", Text),
                    Column::new("user_name", "User Name", Text),
                    Column::new("user_phone", "User Phone", Text),
                    Column::new("tray_id", "Tray ID", Text),
                    Column::new("item_id", "Item Id", Text),
                    Column::new("picked_count", "Item Processed Quantity", Count),
                ]
            },
            Self::OrderTrayTransaction => const {
                &[
                    Column::new("created_at", "Transaction Date", DateTime),
                    Column::new("order_id", "Order Id", Text),
                    Column::new("status", "Status", Text),
                    Column::new("tray_id", "Tray ID", Text),
                    Column::new("station_name", "Station", Text),
                    Column::new("item_id", "Item Id", Text),
                    Column::new("item_order_quantity", "Item Order Quantity", Count),
                    Column::new("order_ref_id", "Order Ref Id", Text),
                ]
            },
            Self::TrayTransaction => const {
                &[
                    Column::new("updated_at", "Transaction Date", DateTime),
                    Column::new("tray_id", "Tray Id", Text),
                    Column::new("tray_status", "Tray Status", Text),
                    Column::new("tray_divider", "Division", Count),
                    Column::new("tray_weight", "Tray Weight(Kg)", WeightKg),
                    Column::new("tray_height", "Tray Height", Text),
                    Column::new("number_of_items", "Number of Items", Count),
                    Column::new("total_available_quantity", "Total Available Quantity", Count),
                    Column::new("has_item", "Has Item", YesNo),
                ]
            },
            Self::RackTransaction => const {
                &[
                    Column::new("updated_at", "Transaction Date", DateTime),
                    Column::new("rack_name", "Rack", Text),
                    Column::new("occupied_slots", "Occupied Slots", Count),
                    Column::new("free_slots", "Free Slots", Count),
                    Column::new("rack_occupancy_percent", "Rack Occupancy In %", Percent),
                ]
            },
            Self::OrderFailureTransaction => const {
                &[
                    Column::new("created_at", "Transaction Date", DateTime),
                    Column::new("order_id", "Order Id", Text),
                    Column::new("activity", "Activity", Text),
                    Column::new("item_id", "Item ID", Text),
                    Column::new("movement_type", "Movement Type", Text),
                    Column::new("order_type", "Order Type", Text),
                    Column::new("item_order_quantity", "Item Order Quantity", Count),
                    Column::new("message", "Message", Text),
                ]
            },
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| CoreError::invalid_config(format!("unknown report kind: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Shown as sent, `N/A` when missing
    Text,
    /// Shown as sent, `0` when missing
    Count,
    DateTime,
    Date,
    WeightKg,
    Percent,
    YesNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
    pub kind: CellKind,
}

impl Column {
    pub const fn new(field: &'static str, header: &'static str, kind: CellKind) -> Self {
        Self {
            field,
            header,
            kind,
        }
    }

    pub fn render(&self, row: &Row) -> String {
        let value = row.get(self.field).filter(|value| !value.is_null());
        match self.kind {
            CellKind::Text => value_text(value),
            CellKind::Count => value.map_or_else(|| "0".to_string(), |v| value_text(Some(v))),
            CellKind::DateTime => format_datetime_short(value.and_then(Value::as_str)),
            CellKind::Date => format_date(value.and_then(Value::as_str)),
            CellKind::WeightKg => tray_weight_kg(value.and_then(lenient::scalar_to_f64)),
            CellKind::Percent => value
                .and_then(lenient::scalar_to_f64)
                .map_or_else(|| NOT_AVAILABLE.to_string(), percent),
            CellKind::YesNo => yes_no(value).to_string(),
        }
    }
}

/// One-based page of a paginated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

impl Page {
    pub fn first(size: u32) -> Self {
        Self {
            number: 1,
            size: size.max(1),
        }
    }

    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }

    /// One-based `(first, last)` record numbers shown, `(0, 0)` when empty
    pub fn showing(&self, total: u64) -> (u64, u64) {
        if total == 0 {
            return (0, 0);
        }
        let last = (u64::from(self.number) * u64::from(self.size)).min(total);
        (self.offset() + 1, last)
    }

    pub fn next(&self, total: u64) -> Self {
        let last = u32::try_from(self.total_pages(total)).unwrap_or(u32::MAX).max(1);
        Self::new((self.number + 1).min(last), self.size)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.number.saturating_sub(1), self.size)
    }

    /// Query parameters appended to a report request
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("num_records", self.size.to_string()),
            ("offset", self.offset().to_string()),
        ]
    }
}

/// One rack of the rack transaction report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackRow {
    pub rack_name: String,
    pub occupied_slots: u64,
    pub free_slots: u64,
    pub rack_occupancy_percent: f64,
    pub updated_at: Option<String>,
}

impl RackRow {
    pub fn into_row(self) -> Row {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Row::new(),
        }
    }
}

fn rack_of(slot: &Slot) -> String {
    slot.slot_id
        .split('-')
        .next()
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
        .or_else(|| slot.rack_name.clone().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Group slots by rack in first-seen order.
///
/// The rack is the `slot_id` prefix before the first `-`, then `rack_name`,
/// then `Unknown`. Each rack keeps the latest `updated_at` of its slots.
pub fn aggregate_slots_by_rack(slots: &[Slot]) -> Vec<RackRow> {
    struct Tally {
        name: String,
        total: u64,
        occupied: u64,
        updated_at: Option<String>,
    }

    let mut racks: Vec<Tally> = Vec::new();
    for slot in slots {
        let name = rack_of(slot);
        let index = match racks.iter().position(|tally| tally.name == name) {
            Some(index) => index,
            None => {
                racks.push(Tally {
                    name,
                    total: 0,
                    occupied: 0,
                    updated_at: slot.updated_at.clone(),
                });
                racks.len() - 1
            }
        };
        let tally = &mut racks[index];
        tally.total += 1;
        if slot.is_occupied() {
            tally.occupied += 1;
        }
        match (&slot.updated_at, &tally.updated_at) {
            (Some(updated), Some(latest)) if updated <= latest => {}
            (Some(updated), _) => tally.updated_at = Some(updated.clone()),
            (None, _) => {}
        }
    }

    racks
        .into_iter()
        .map(|tally| RackRow {
            rack_name: tally.name,
            occupied_slots: tally.occupied,
            free_slots: tally.total - tally.occupied,
            rack_occupancy_percent: ratio_percent(tally.occupied, tally.total),
            updated_at: tally.updated_at,
        })
        .collect()
}

/// Rows from the rack summary endpoint are raw slots when the first one
/// carries no `rack_name`
pub fn needs_rack_aggregation(rows: &[Row]) -> bool {
    rows.first().is_some_and(|first| {
        first
            .get("rack_name")
            .and_then(lenient::scalar_to_string)
            .is_none_or(|name| name.is_empty())
    })
}

/// Parse untyped rows as slots, skipping rows that are not objects
pub fn rows_as_slots(rows: &[Row]) -> Vec<Slot> {
    rows.iter()
        .filter_map(|row| serde_json::from_value(Value::Object(row.clone())).ok())
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn ratio_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Slot or tray occupancy card
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub total: u64,
    pub occupied: u64,
    pub free: u64,
    pub occupied_percent: f64,
}

impl Occupancy {
    /// Occupancy from a capacity and an occupied count.
    ///
    /// Free space never goes below zero when the counts disagree.
    pub fn from_total(total: u64, occupied: u64) -> Self {
        Self {
            total,
            occupied,
            free: total.saturating_sub(occupied),
            occupied_percent: ratio_percent(occupied, total),
        }
    }

    /// Occupancy from separate occupied and free counts
    pub fn from_parts(occupied: u64, free: u64) -> Self {
        let total = occupied + free;
        Self {
            total,
            occupied,
            free,
            occupied_percent: ratio_percent(occupied, total),
        }
    }
}

/// Power card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerInfo {
    pub voltage: String,
    pub current: String,
    pub power: String,
    pub energy: String,
    pub updated_at: Option<String>,
}

impl PowerInfo {
    pub fn unavailable() -> Self {
        Self {
            voltage: NOT_AVAILABLE.to_string(),
            current: NOT_AVAILABLE.to_string(),
            power: NOT_AVAILABLE.to_string(),
            energy: NOT_AVAILABLE.to_string(),
            updated_at: None,
        }
    }

    pub fn from_reading(reading: &PowerReading) -> Self {
        let with_unit = |value: Option<&Value>, unit: &str| {
            let text = match value {
                None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
            };
            format!("{text} {unit}")
        };
        Self {
            voltage: with_unit(reading.voltage.as_ref(), "V"),
            current: with_unit(reading.current.as_ref(), "A"),
            power: with_unit(reading.max_demand_active_power.as_ref(), "kW"),
            energy: with_unit(reading.total_active_energy_kwh.as_ref(), "kWh"),
            updated_at: reading.updated_at.clone().filter(|at| !at.is_empty()),
        }
    }
}

/// A fetched report page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub kind: ReportKind,
    pub page: Page,
    pub rows: Vec<Row>,
    pub total: u64,
}

impl ReportTable {
    pub fn empty(kind: ReportKind, page: Page) -> Self {
        Self {
            kind,
            page,
            rows: Vec::new(),
            total: 0,
        }
    }

    /// Rendered cells, one vector per row, in column order
    pub fn cells(&self) -> Vec<Vec<String>> {
        let columns = self.kind.columns();
        self.rows
            .iter()
            .map(|row| columns.iter().map(|column| column.render(row)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot(id: &str, tray: Option<&str>, updated: &str) -> Slot {
        Slot {
            slot_id: id.to_string(),
            tray_id: tray.map(str::to_string),
            updated_at: Some(updated.to_string()),
            ..Slot::default()
        }
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_kind_parsing_and_catalog() {
        assert_eq!(
            "rack-transaction".parse::<ReportKind>().unwrap(),
            ReportKind::RackTransaction
        );
        assert!("inventory".parse::<ReportKind>().is_err());
        for kind in ReportKind::ALL {
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), kind);
            assert!(!kind.columns().is_empty());
        }
        assert_eq!(
            ReportKind::OrderFailureTransaction.fixed_query(),
            &[("task_status", "failed")]
        );
    }

    #[test]
    fn test_column_catalog_outlives_the_call() {
        let catalog: Vec<&'static [Column]> = ReportKind::ALL.map(ReportKind::columns).to_vec();
        assert_eq!(catalog[0][0].field, "updated_at");
        assert!(catalog.iter().all(|columns| columns.iter().all(|c| !c.header.is_empty())));
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(3, 50);
        assert_eq!(page.offset(), 100);
        assert_eq!(page.showing(120), (101, 120));
        assert_eq!(page.total_pages(120), 3);
        assert_eq!(page.next(120), page);
        assert_eq!(Page::new(0, 0), Page::new(1, 1));
        assert_eq!(Page::default().showing(0), (0, 0));
        assert_eq!(Page::default().query()[1], ("offset", "0".to_string()));
    }

    #[test]
    fn test_aggregate_slots_by_rack() {
        let slots = vec![
            slot("R01-A-1", Some("TR-1"), "2025-01-01T10:00:00"),
            slot("R02-A-1", None, "2025-01-03T10:00:00"),
            slot("R01-A-2", None, "2025-01-02T10:00:00"),
            slot("R01-B-1", Some("TR-2"), "2024-12-31T10:00:00"),
            Slot {
                rack_name: Some("R09".into()),
                ..Slot::default()
            },
            Slot::default(),
        ];
        let racks = aggregate_slots_by_rack(&slots);
        let names: Vec<_> = racks.iter().map(|r| r.rack_name.as_str()).collect();
        assert_eq!(names, vec!["R01", "R02", "R09", "Unknown"]);

        let r01 = &racks[0];
        assert_eq!((r01.occupied_slots, r01.free_slots), (2, 1));
        assert!((r01.rack_occupancy_percent - 66.666).abs() < 0.01);
        assert_eq!(r01.updated_at.as_deref(), Some("2025-01-02T10:00:00"));
        assert_eq!(racks[1].rack_occupancy_percent, 0.0);
    }

    #[test]
    fn test_rack_summary_detection() {
        assert!(needs_rack_aggregation(&[row(json!({"slot_id": "R1-1"}))]));
        assert!(!needs_rack_aggregation(&[row(json!({"rack_name": "R1"}))]));
        assert!(!needs_rack_aggregation(&[]));
        let slots = rows_as_slots(&[row(json!({"slot_id": "R1-1", "tray_id": "T"}))]);
        assert!(slots[0].is_occupied());
    }

    #[test]
    fn test_occupancy() {
        let slots = Occupancy::from_total(200, 50);
        assert_eq!(slots.free, 150);
        assert_eq!(slots.occupied_percent, 25.0);
        assert_eq!(Occupancy::from_total(0, 3).free, 0);
        assert_eq!(Occupancy::from_total(0, 3).occupied_percent, 0.0);

        let trays = Occupancy::from_parts(30, 10);
        assert_eq!(trays.total, 40);
        assert_eq!(trays.occupied_percent, 75.0);
    }

    #[test]
    fn test_power_info() {
        let reading: PowerReading = serde_json::from_value(json!({
            "voltage": 231.4,
            "current": "4.2",
            "total_active_energy_kwh": null,
            "updated_at": "2025-04-01T08:00:00"
        }))
        .unwrap();
        let info = PowerInfo::from_reading(&reading);
        assert_eq!(info.voltage, "231.4 V");
        assert_eq!(info.current, "4.2 A");
        assert_eq!(info.power, "N/A kW");
        assert_eq!(info.energy, "N/A kWh");
        assert_eq!(PowerInfo::unavailable().voltage, "N/A");
    }

    #[test]
    fn test_cells_render_per_column() {
        let table = ReportTable {
            kind: ReportKind::TrayTransaction,
            page: Page::default(),
            rows: vec![row(json!({
                "updated_at": "2025-05-06T07:08:09",
                "tray_id": "TR-5",
                "tray_weight": 2500,
                "has_item": true
            }))],
            total: 1,
        };
        let cells = table.cells();
        assert_eq!(
            cells[0],
            vec![
                "06-05-2025 07:08",
                "TR-5",
                "N/A",
                "0",
                "2.50",
                "N/A",
                "0",
                "0",
                "Yes"
            ]
        );
    }
}
