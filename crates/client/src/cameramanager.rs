//! Camera manager endpoints

use crate::{ClientError, DashboardClient};
use nanostore_core::types::{CameraEvent, Records};

impl DashboardClient {
    /// Clips recorded for a task that are ready to play
    pub async fn camera_events(&self, task_id: &str) -> Result<Records<CameraEvent>, ClientError> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(ClientError::BadRequest("task id is required".into()));
        }
        let query = [
            ("clip_status", "ready".to_string()),
            ("task_id", task_id.to_string()),
        ];
        self.get_records("/cameramanager/camera_events", &query)
            .await
    }
}
