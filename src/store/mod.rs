use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::policy::AttendancePolicy;

pub mod mysql;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A record already exists for this (employee, day) key.
    #[display(fmt = "attendance record already exists for this day")]
    Duplicate,
    /// The compare-and-swap on `updated_at` lost against a concurrent writer.
    #[display(fmt = "attendance record was modified concurrently")]
    Conflict,
    #[display(fmt = "database error: {}", _0)]
    Database(anyhow::Error),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
    pub limit: u64,
    pub offset: u64,
}

/// Persistence contract for daily attendance records.
///
/// Implementations must uphold the two guarantees the engine relies on:
/// `insert` is atomic on the unique (employee_id, date) key and surfaces
/// `StoreError::Duplicate` when the key is taken, and `update` only applies
/// when the stored `updated_at` still equals `expected_updated_at`
/// (surfacing `StoreError::Conflict` otherwise). Together these serialize
/// concurrent writers racing on the same day.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Persist a new record, assigning its id. Fails with `Duplicate` when a
    /// record for (employee_id, date) already exists.
    async fn insert(&self, record: &mut AttendanceRecord) -> StoreResult<()>;

    /// Persist changes to an existing record, guarded by compare-and-swap on
    /// `updated_at`.
    async fn update(
        &self,
        record: &AttendanceRecord,
        expected_updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn find_by_day(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Newest-first page of an employee's records.
    async fn list_for_employee(
        &self,
        employee_id: u64,
        query: &EmployeeRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>>;

    /// Newest-first page of a company's records.
    async fn list_for_company(
        &self,
        company_id: u64,
        query: &CompanyRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>>;

    /// Every record for a company inside an inclusive date range; feeds the
    /// reporting aggregator.
    async fn find_company_range(
        &self,
        company_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;
}

/// Read-only access to per-tenant attendance configuration. `Ok(None)` means
/// the company does not exist.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    async fn attendance_policy(&self, company_id: u64) -> StoreResult<Option<AttendancePolicy>>;
}
