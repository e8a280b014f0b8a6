//! Nanostore inventory endpoints

use crate::{ClientError, DashboardClient};
use nanostore_core::report::Page;
use nanostore_core::types::{OccupiedTrayCount, Records, Row};

const BASE: &str = "/nanostore";

impl DashboardClient {
    pub async fn items(&self, page: Option<Page>) -> Result<Records<Row>, ClientError> {
        let query = page.map(|page| page.query().to_vec()).unwrap_or_default();
        self.get_records(&format!("{BASE}/items"), &query).await
    }

    /// Item usage history, `order_by` is `ASC` or `DESC`
    pub async fn items_usage(
        &self,
        order_by: &str,
        page: Option<Page>,
    ) -> Result<Records<Row>, ClientError> {
        let mut query = vec![("order_by", order_by.to_string())];
        query.extend(page.map(|page| page.query().to_vec()).unwrap_or_default());
        self.get_records(&format!("{BASE}/items/usage"), &query).await
    }

    /// Number of trays holding (or not holding) items
    pub async fn occupied_trays(
        &self,
        occupied: bool,
    ) -> Result<Records<OccupiedTrayCount>, ClientError> {
        let query = [("occupied", occupied.to_string())];
        self.get_records(&format!("{BASE}/occupied_trays"), &query)
            .await
    }

    pub async fn stock(&self, page: Option<Page>) -> Result<Records<Row>, ClientError> {
        let query = page.map(|page| page.query().to_vec()).unwrap_or_default();
        self.get_records(&format!("{BASE}/stock"), &query).await
    }
}
