//! Robot manager endpoints

use crate::{ClientError, DashboardClient};
use nanostore_core::report::Page;
use nanostore_core::types::{PowerReading, Records, Robot, Row, Slot, SlotCount, Tray};

const BASE: &str = "/robotmanager";

fn paged(page: Option<Page>) -> Vec<(&'static str, String)> {
    page.map(|page| page.query().to_vec()).unwrap_or_default()
}

impl DashboardClient {
    /// Robot layout; the first record describes the robot
    pub async fn robots(&self) -> Result<Records<Robot>, ClientError> {
        self.get_records(&format!("{BASE}/robots"), &[]).await
    }

    pub async fn slots(&self, page: Option<Page>) -> Result<Records<Slot>, ClientError> {
        self.get_records(&format!("{BASE}/slots"), &paged(page)).await
    }

    pub async fn slots_count(&self, slot_status: &str) -> Result<Records<SlotCount>, ClientError> {
        let query = [("slot_status", slot_status.to_string())];
        self.get_records(&format!("{BASE}/slots_count"), &query).await
    }

    pub async fn trays(&self, tray_status: Option<&str>) -> Result<Records<Tray>, ClientError> {
        let query = [("tray_status", tray_status.unwrap_or_default().to_string())];
        self.get_records(&format!("{BASE}/trays"), &query).await
    }

    /// Latest power readings, optionally restricted to today
    pub async fn robot_power(
        &self,
        today: bool,
        num_records: u32,
    ) -> Result<Records<PowerReading>, ClientError> {
        let query = [
            ("today", if today { "true".to_string() } else { String::new() }),
            ("num_records", num_records.to_string()),
        ];
        self.get_records(&format!("{BASE}/robot_power"), &query).await
    }

    pub async fn tasks(
        &self,
        task_status: Option<&str>,
        page: Option<Page>,
    ) -> Result<Records<Row>, ClientError> {
        let mut query = vec![("task_status", task_status.unwrap_or_default().to_string())];
        query.extend(paged(page));
        self.get_records(&format!("{BASE}/task"), &query).await
    }

    pub async fn racks_summary(&self, page: Option<Page>) -> Result<Records<Row>, ClientError> {
        self.get_records(&format!("{BASE}/racks/summary"), &paged(page))
            .await
    }
}
