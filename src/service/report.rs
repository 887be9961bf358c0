//! Read-only rollups over stored attendance records. All arithmetic happens
//! here; the store only hands back the raw range.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::service::attendance::{AttendanceError, AttendanceService};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeSummary {
    pub employee_id: u64,
    pub total_days: i64,
    pub total_hours: f64,
    pub total_overtime_hours: f64,
    pub average_hours: f64,
    /// Days in the range carrying at least one violation.
    pub violation_days: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportPeriod {
    #[schema(format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryStats {
    pub total_records: usize,
    pub present_today: usize,
    pub currently_clocked: usize,
    pub report_period: ReportPeriod,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub summary: Vec<EmployeeSummary>,
    pub stats: SummaryStats,
}

/// First and last day of the month containing `day`; the default summary
/// window.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).expect("day 1 always valid");
    let next_month = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    }
    .expect("first of month always valid");
    (start, next_month.pred_opt().expect("not at MIN"))
}

impl AttendanceService {
    /// Per-employee aggregates plus presence counts for a company over an
    /// inclusive date range.
    pub async fn summary(
        &self,
        company_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let records = self.store().find_company_range(company_id, start, end).await?;
        let total_records = records.len();

        let mut grouped: BTreeMap<u64, EmployeeSummary> = BTreeMap::new();
        for record in &records {
            let entry = grouped
                .entry(record.employee_id)
                .or_insert_with(|| EmployeeSummary {
                    employee_id: record.employee_id,
                    total_days: 0,
                    total_hours: 0.0,
                    total_overtime_hours: 0.0,
                    average_hours: 0.0,
                    violation_days: 0,
                });
            entry.total_days += 1;
            entry.total_hours += record.hours_worked;
            entry.total_overtime_hours += record.overtime_hours;
            if !record.violations.is_empty() {
                entry.violation_days += 1;
            }
        }
        for entry in grouped.values_mut() {
            entry.average_hours = if entry.total_days > 0 {
                entry.total_hours / entry.total_days as f64
            } else {
                0.0
            };
        }

        let today = self.clock().now().date_naive();
        let todays = self.store().find_company_range(company_id, today, today).await?;
        let present_today = todays.iter().filter(|r| r.has_clock_in()).count();
        let currently_clocked = todays
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    AttendanceStatus::ClockedIn | AttendanceStatus::OnBreak
                )
            })
            .count();

        Ok(AttendanceSummary {
            summary: grouped.into_values().collect(),
            stats: SummaryStats {
                total_records,
                present_today,
                currently_clocked,
                report_period: ReportPeriod { start, end },
            },
        })
    }
}
