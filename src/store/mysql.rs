use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use sqlx::types::Json;

use crate::model::attendance::{
    ApprovalStatus, AttendanceRecord, AttendanceStatus, BreakEntry, ClockInEvent, ClockOutEvent,
    Notes, Shift, SyncStatus, Violation,
};
use crate::model::policy::AttendancePolicy;
use crate::store::{
    AttendanceStore, CompanyRangeQuery, EmployeeRangeQuery, Page, PolicyProvider, StoreError,
    StoreResult,
};

const RECORD_COLUMNS: &str = "id, employee_id, company_id, date, clock_in, clock_out, breaks, \
     shift, hours_worked, regular_hours, overtime_hours, status, notes, approval_status, \
     approved_by, approved_at, sync_status, last_sync_at, is_modified, violations, \
     created_at, updated_at";

/// Row shape for the `attendance` table. Structured sub-documents live in
/// JSON columns; enums are stored as their snake_case text.
#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    company_id: u64,
    date: NaiveDate,
    clock_in: Option<Json<ClockInEvent>>,
    clock_out: Option<Json<ClockOutEvent>>,
    breaks: Json<Vec<BreakEntry>>,
    shift: Option<Json<Shift>>,
    hours_worked: f64,
    regular_hours: f64,
    overtime_hours: f64,
    status: String,
    notes: Option<Json<Notes>>,
    approval_status: String,
    approved_by: Option<u64>,
    approved_at: Option<DateTime<Utc>>,
    sync_status: String,
    last_sync_at: Option<DateTime<Utc>>,
    is_modified: bool,
    violations: Json<Vec<Violation>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            company_id: row.company_id,
            date: row.date,
            clock_in: row.clock_in.map(|j| j.0),
            clock_out: row.clock_out.map(|j| j.0),
            breaks: row.breaks.0,
            shift: row.shift.map(|j| j.0),
            hours_worked: row.hours_worked,
            regular_hours: row.regular_hours,
            overtime_hours: row.overtime_hours,
            status: AttendanceStatus::from_str(&row.status).unwrap_or_default(),
            notes: row.notes.map(|j| j.0).unwrap_or_default(),
            approval_status: ApprovalStatus::from_str(&row.approval_status).unwrap_or_default(),
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            sync_status: SyncStatus::from_str(&row.sync_status).unwrap_or_default(),
            last_sync_at: row.last_sync_at,
            is_modified: row.is_modified,
            violations: row.violations.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Typed values for dynamically built WHERE clauses.
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
    Str(String),
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.into())
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn insert(&self, record: &mut AttendanceRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_id, company_id, date, clock_in, clock_out, breaks, shift,
                 hours_worked, regular_hours, overtime_hours, status, notes,
                 approval_status, approved_by, approved_at, sync_status, last_sync_at,
                 is_modified, violations, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.company_id)
        .bind(record.date)
        .bind(record.clock_in.as_ref().map(Json))
        .bind(record.clock_out.as_ref().map(Json))
        .bind(Json(&record.breaks))
        .bind(record.shift.as_ref().map(Json))
        .bind(record.hours_worked)
        .bind(record.regular_hours)
        .bind(record.overtime_hours)
        .bind(record.status.as_ref())
        .bind(Json(&record.notes))
        .bind(record.approval_status.as_ref())
        .bind(record.approved_by)
        .bind(record.approved_at)
        .bind(record.sync_status.as_ref())
        .bind(record.last_sync_at)
        .bind(record.is_modified)
        .bind(Json(&record.violations))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                record.id = done.last_insert_id();
                Ok(())
            }
            Err(e) => {
                // Unique (employee_id, date) key: duplicate day surfaces as
                // SQLSTATE 23000.
                if let sqlx::Error::Database(inner) = &e {
                    if inner.code().as_deref() == Some("23000") {
                        return Err(StoreError::Duplicate);
                    }
                }
                Err(db_err(e))
            }
        }
    }

    async fn update(
        &self,
        record: &AttendanceRecord,
        expected_updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE attendance SET
                clock_in = ?, clock_out = ?, breaks = ?, shift = ?,
                hours_worked = ?, regular_hours = ?, overtime_hours = ?, status = ?,
                notes = ?, approval_status = ?, approved_by = ?, approved_at = ?,
                sync_status = ?, last_sync_at = ?, is_modified = ?, violations = ?,
                updated_at = ?
            WHERE id = ? AND updated_at = ?
            "#,
        )
        .bind(record.clock_in.as_ref().map(Json))
        .bind(record.clock_out.as_ref().map(Json))
        .bind(Json(&record.breaks))
        .bind(record.shift.as_ref().map(Json))
        .bind(record.hours_worked)
        .bind(record.regular_hours)
        .bind(record.overtime_hours)
        .bind(record.status.as_ref())
        .bind(Json(&record.notes))
        .bind(record.approval_status.as_ref())
        .bind(record.approved_by)
        .bind(record.approved_at)
        .bind(record.sync_status.as_ref())
        .bind(record.last_sync_at)
        .bind(record.is_modified)
        .bind(Json(&record.violations))
        .bind(record.updated_at)
        .bind(record.id)
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn find_by_day(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(AttendanceRecord::from))
    }

    async fn list_for_employee(
        &self,
        employee_id: u64,
        query: &EmployeeRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>> {
        let mut where_sql = String::from(" WHERE employee_id = ?");
        let mut args: Vec<FilterValue> = vec![FilterValue::U64(employee_id)];

        if let Some(start) = query.start_date {
            where_sql.push_str(" AND date >= ?");
            args.push(FilterValue::Date(start));
        }
        if let Some(end) = query.end_date {
            where_sql.push_str(" AND date <= ?");
            args.push(FilterValue::Date(end));
        }

        self.fetch_page(&where_sql, args, "date DESC", query.limit, query.offset)
            .await
    }

    async fn list_for_company(
        &self,
        company_id: u64,
        query: &CompanyRangeQuery,
    ) -> StoreResult<Page<AttendanceRecord>> {
        let mut where_sql = String::from(" WHERE company_id = ?");
        let mut args: Vec<FilterValue> = vec![FilterValue::U64(company_id)];

        if let Some(start) = query.start_date {
            where_sql.push_str(" AND date >= ?");
            args.push(FilterValue::Date(start));
        }
        if let Some(end) = query.end_date {
            where_sql.push_str(" AND date <= ?");
            args.push(FilterValue::Date(end));
        }
        if let Some(emp_id) = query.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(emp_id));
        }
        if let Some(status) = query.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref().to_string()));
        }

        self.fetch_page(&where_sql, args, "date DESC", query.limit, query.offset)
            .await
    }

    async fn find_company_range(
        &self,
        company_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE company_id = ? AND date >= ? AND date <= ? ORDER BY date ASC"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(company_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}

impl MySqlAttendanceStore {
    async fn fetch_page(
        &self,
        where_sql: &str,
        args: Vec<FilterValue>,
        order_by: &str,
        limit: u64,
        offset: u64,
    ) -> StoreResult<Page<AttendanceRecord>> {
        let count_sql = format!("SELECT COUNT(*) FROM attendance{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Date(d) => count_q.bind(*d),
                FilterValue::Str(s) => count_q.bind(s.clone()),
            };
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(db_err)?;

        let data_sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance{where_sql} ORDER BY {order_by} LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, AttendanceRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Date(d) => data_q.bind(d),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page {
            items: rows.into_iter().map(AttendanceRecord::from).collect(),
            total,
        })
    }
}

/// Company settings document, of which the attendance section is the only
/// part this service reads.
#[derive(Deserialize)]
struct CompanySettings {
    #[serde(default)]
    attendance: AttendancePolicy,
}

pub struct MySqlPolicyProvider {
    pool: MySqlPool,
}

impl MySqlPolicyProvider {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyProvider for MySqlPolicyProvider {
    async fn attendance_policy(&self, company_id: u64) -> StoreResult<Option<AttendancePolicy>> {
        let row = sqlx::query_as::<_, (Option<Json<CompanySettings>>,)>(
            "SELECT settings FROM companies WHERE id = ?",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|(settings,)| {
            settings
                .map(|j| j.0.attendance)
                .unwrap_or_default()
        }))
    }
}
