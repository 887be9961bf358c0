//! Offline-first reconciliation: clients buffer daily records while
//! disconnected and replay them here once connectivity returns. Records are
//! merged independently, last-writer-wins on the client's `last_modified`
//! against the stored `updated_at`; the server wins ties.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakEntry, ClockInEvent, ClockOutEvent,
    DEFAULT_DAILY_HOURS, SyncStatus,
};
use crate::service::attendance::{AttendanceError, AttendanceService};

/// One client-recorded day, as buffered offline.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SyncRecordPayload {
    #[schema(example = "2026-08-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub clock_in: Option<ClockInEvent>,
    pub clock_out: Option<ClockOutEvent>,
    #[serde(default)]
    pub breaks: Vec<BreakEntry>,
    #[serde(default)]
    pub status: AttendanceStatus,
    /// Client-side modification timestamp, compared against the stored
    /// record's `updated_at`.
    #[schema(format = "date-time", value_type = String)]
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncActionKind {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncOutcome {
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    pub action: SyncActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncRecordError {
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncReport {
    pub sync_results: Vec<SyncOutcome>,
    pub errors: Vec<SyncRecordError>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
}

impl AttendanceService {
    /// Merge a batch of client records. Records are processed independently:
    /// a failure on one is reported and does not abort the rest.
    pub async fn sync_batch(
        &self,
        employee_id: u64,
        company_id: u64,
        records: Vec<SyncRecordPayload>,
    ) -> Result<SyncReport, AttendanceError> {
        if records.is_empty() {
            return Err(AttendanceError::EmptySyncBatch);
        }

        // One policy read per batch; missing tenants fall back to the
        // default threshold (identity was already verified upstream).
        let threshold = self
            .policies()
            .attendance_policy(company_id)
            .await?
            .map(|p| p.standard_daily_hours)
            .unwrap_or(DEFAULT_DAILY_HOURS);

        let total = records.len();
        let mut sync_results = Vec::new();
        let mut errors = Vec::new();

        for payload in records {
            let date = payload.date;
            match self
                .apply_sync_record(employee_id, company_id, payload, threshold)
                .await
            {
                Ok(outcome) => sync_results.push(outcome),
                Err(e) => {
                    warn!(employee_id, %date, error = %e, "sync record failed");
                    errors.push(SyncRecordError {
                        date,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(SyncReport {
            successful: sync_results.len(),
            failed: errors.len(),
            total_processed: total,
            sync_results,
            errors,
        })
    }

    async fn apply_sync_record(
        &self,
        employee_id: u64,
        company_id: u64,
        payload: SyncRecordPayload,
        threshold: f64,
    ) -> Result<SyncOutcome, AttendanceError> {
        let now = self.clock().now();

        match self.store().find_by_day(employee_id, payload.date).await? {
            Some(mut existing) => {
                // Strictly newer client data overwrites; the server wins ties.
                if payload.last_modified > existing.updated_at {
                    let expected = existing.updated_at;
                    existing.clock_in = payload.clock_in;
                    existing.clock_out = payload.clock_out;
                    existing.breaks = payload.breaks;
                    existing.status = payload.status;
                    existing.sync_status = SyncStatus::Synced;
                    existing.last_sync_at = Some(now);
                    existing.is_modified = true;
                    existing.updated_at = now;
                    self.store().update(&existing, expected).await?;
                    Ok(SyncOutcome {
                        date: payload.date,
                        action: SyncActionKind::Updated,
                        id: Some(existing.id),
                        reason: None,
                    })
                } else {
                    Ok(SyncOutcome {
                        date: payload.date,
                        action: SyncActionKind::Skipped,
                        id: None,
                        reason: Some("Server data is newer".to_string()),
                    })
                }
            }
            None => {
                let mut record =
                    AttendanceRecord::new(employee_id, company_id, payload.date, now);
                record.clock_in = payload.clock_in;
                record.clock_out = payload.clock_out;
                record.breaks = payload.breaks;
                record.status = payload.status;
                record.sync_status = SyncStatus::Synced;
                record.last_sync_at = Some(now);
                if record.clock_in.is_some() && record.clock_out.is_some() {
                    record.calculate_hours(threshold);
                }
                self.store().insert(&mut record).await?;
                Ok(SyncOutcome {
                    date: payload.date,
                    action: SyncActionKind::Created,
                    id: Some(record.id),
                    reason: None,
                })
            }
        }
    }
}
