//! Dashboard card figures assembled from several endpoints

use crate::{ClientError, DashboardClient};
use futures::future::{join4, try_join};
use nanostore_core::report::{Occupancy, PowerInfo};
use nanostore_core::types::{OccupiedTrayCount, Records, Robot};
use serde::{Deserialize, Serialize};

/// Everything the home page cards show.
///
/// Each card loads on its own; `None` marks a card whose request failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub robot: Option<Robot>,
    pub slots: Option<Occupancy>,
    pub trays: Option<Occupancy>,
    pub power: PowerInfo,
}

impl DashboardClient {
    pub async fn robot(&self) -> Result<Option<Robot>, ClientError> {
        Ok(self.robots().await?.records.into_iter().next())
    }

    /// Slot capacity against the number of active trays
    pub async fn slot_info(&self) -> Result<Occupancy, ClientError> {
        let (counts, trays) =
            try_join(self.slots_count("active"), self.trays(Some("active"))).await?;
        let total = counts.first().map_or(0, |count| count.total_count);
        Ok(Occupancy::from_total(total, trays.len() as u64))
    }

    /// Trays holding items against empty trays
    pub async fn tray_info(&self) -> Result<Occupancy, ClientError> {
        let (occupied, free) =
            try_join(self.occupied_trays(true), self.occupied_trays(false)).await?;
        Ok(Occupancy::from_parts(first_count(&occupied), first_count(&free)))
    }

    /// Today's latest power reading, else the latest one overall.
    ///
    /// Failures other than an expired session show as unavailable readings.
    pub async fn power_info(&self) -> Result<PowerInfo, ClientError> {
        let readings = match self.robot_power(true, 1).await {
            Ok(today) if today.is_success() && !today.is_empty() => Ok(today),
            Ok(_) => self.robot_power(false, 1).await,
            Err(err) if err.is_auth_expired() => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "today's power readings failed, using latest");
                self.robot_power(false, 1).await
            }
        };

        match readings {
            Ok(readings) if readings.is_success() => Ok(readings
                .first()
                .map_or_else(PowerInfo::unavailable, PowerInfo::from_reading)),
            Ok(_) => Ok(PowerInfo::unavailable()),
            Err(err) if err.is_auth_expired() => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "power readings unavailable");
                Ok(PowerInfo::unavailable())
            }
        }
    }

    /// Load every card. Only an expired session fails the whole summary.
    pub async fn summary(&self) -> Result<DashboardSummary, ClientError> {
        let (robot, slots, trays, power) = join4(
            self.robot(),
            self.slot_info(),
            self.tray_info(),
            self.power_info(),
        )
        .await;
        Ok(DashboardSummary {
            robot: card("robot", robot)?.flatten(),
            slots: card("slots", slots)?,
            trays: card("trays", trays)?,
            power: power?,
        })
    }
}

fn card<T>(name: &'static str, result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_auth_expired() => Err(err),
        Err(err) => {
            tracing::warn!(card = name, error = %err, "dashboard card unavailable");
            Ok(None)
        }
    }
}

fn first_count(records: &Records<OccupiedTrayCount>) -> u64 {
    records.first().map_or(0, |row| row.count)
}
