//! Pub/sub topic reads

use crate::{ClientError, DashboardClient};
use nanostore_core::shuttle::ShuttleState;
use nanostore_core::types::{LogRecord, Records};

impl DashboardClient {
    /// Messages currently held for a topic
    pub async fn subscribe(&self, topic: &str) -> Result<Records<LogRecord>, ClientError> {
        let query = [("topic", topic.to_string())];
        self.get_records("/pubsub/subscribe", &query).await
    }

    /// Latest shuttle position published on a topic.
    ///
    /// Records are considered newest first by `created_at`; the first one
    /// carrying shuttle fields wins.
    pub async fn shuttle_state(&self, topic: &str) -> Result<Option<ShuttleState>, ClientError> {
        let mut records = self.subscribe(topic).await?.records;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records.iter().find_map(ShuttleState::from_log))
    }
}
