//! Paginated reports

use crate::{ClientError, DashboardClient, Envelope};
use nanostore_core::report::{
    Page, RACK_FALLBACK_PAGE_SIZE, ReportFallback, ReportKind, ReportTable,
    aggregate_slots_by_rack, needs_rack_aggregation, rows_as_slots,
};
use nanostore_core::types::{Records, Row, Slot};

fn rack_table(kind: ReportKind, page: Page, slots: &[Slot]) -> ReportTable {
    let rows: Vec<Row> = aggregate_slots_by_rack(slots)
        .into_iter()
        .map(|rack| rack.into_row())
        .collect();
    ReportTable {
        kind,
        page,
        total: rows.len() as u64,
        rows,
    }
}

fn table(kind: ReportKind, page: Page, records: Records<Row>) -> ReportTable {
    ReportTable {
        kind,
        page,
        total: records.total(),
        rows: records.records,
    }
}

impl DashboardClient {
    /// Fetch one page of a report.
    ///
    /// A 404 from the primary endpoint switches to the report's fallback
    /// when it has one and otherwise yields an empty table. Any fallback
    /// failure other than an expired session also yields an empty table.
    pub async fn report(&self, kind: ReportKind, page: Page) -> Result<ReportTable, ClientError> {
        let mut query: Vec<(&str, String)> = kind
            .fixed_query()
            .iter()
            .map(|(key, value)| (*key, (*value).to_string()))
            .collect();
        query.extend(page.query());

        match self.fetch_envelope::<Row>(kind.path(), &query).await? {
            Envelope::Records(records) => {
                if kind == ReportKind::RackTransaction && needs_rack_aggregation(&records.records)
                {
                    Ok(rack_table(kind, page, &rows_as_slots(&records.records)))
                } else {
                    Ok(table(kind, page, records))
                }
            }
            Envelope::NotFound { .. } => self.report_fallback(kind, page).await,
        }
    }

    async fn report_fallback(
        &self,
        kind: ReportKind,
        page: Page,
    ) -> Result<ReportTable, ClientError> {
        match self.fetch_fallback(kind, page).await {
            Err(err) if !err.is_auth_expired() => {
                tracing::warn!(%kind, error = %err, "report fallback failed");
                Ok(ReportTable::empty(kind, page))
            }
            result => result,
        }
    }

    async fn fetch_fallback(
        &self,
        kind: ReportKind,
        page: Page,
    ) -> Result<ReportTable, ClientError> {
        match kind.fallback() {
            Some(ReportFallback::Endpoint(path)) => {
                tracing::debug!(%kind, path, "report endpoint missing, using fallback");
                match self.fetch_envelope::<Row>(path, &page.query()).await? {
                    Envelope::Records(records) => Ok(table(kind, page, records)),
                    Envelope::NotFound { .. } => Ok(ReportTable::empty(kind, page)),
                }
            }
            Some(ReportFallback::AggregateSlots) => {
                tracing::debug!(%kind, "rack summary missing, aggregating slots");
                let all = Page::first(RACK_FALLBACK_PAGE_SIZE);
                match self.fetch_envelope::<Slot>("/robotmanager/slots", &all.query()).await? {
                    Envelope::Records(records) => Ok(rack_table(kind, page, &records.records)),
                    Envelope::NotFound { .. } => Ok(ReportTable::empty(kind, page)),
                }
            }
            None => Ok(ReportTable::empty(kind, page)),
        }
    }
}
