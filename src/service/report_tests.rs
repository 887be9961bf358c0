use chrono::NaiveDate;

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, ClockInEvent, ClockMethod, Violation, ViolationSeverity,
    ViolationType,
};
use crate::model::policy::AttendancePolicy;
use crate::service::attendance_tests::{at, harness};
use crate::service::report::month_bounds;
use crate::store::AttendanceStore;
use crate::store::memory::MemoryAttendanceStore;

async fn seeded(
    store: &MemoryAttendanceStore,
    employee_id: u64,
    date: NaiveDate,
    hours: f64,
    overtime: f64,
    violations: usize,
) -> AttendanceRecord {
    let mut rec = AttendanceRecord::new(employee_id, 1, date, at(9, 0));
    rec.clock_in = Some(ClockInEvent {
        time: date.and_hms_opt(9, 0, 0).unwrap().and_utc(),
        location: None,
        photo: None,
        method: ClockMethod::Manual,
        device_info: None,
    });
    rec.status = AttendanceStatus::ClockedOut;
    rec.hours_worked = hours;
    rec.regular_hours = hours.min(8.0);
    rec.overtime_hours = overtime;
    for _ in 0..violations {
        rec.violations.push(Violation {
            kind: ViolationType::LateArrival,
            description: "Arrived 20 minutes late".to_string(),
            severity: ViolationSeverity::Medium,
            detected_at: at(17, 0),
        });
    }
    store.insert(&mut rec).await.unwrap();
    rec
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[actix_web::test]
async fn summary_groups_per_employee() {
    let (service, store, _clock) = harness(Some(AttendancePolicy::default()));

    seeded(&store, 1000, d(1), 8.0, 0.0, 0).await;
    seeded(&store, 1000, d(3), 10.0, 2.0, 1).await;
    seeded(&store, 2000, d(1), 4.0, 0.0, 0).await;

    let summary = service.summary(1, d(1), d(31)).await.unwrap();

    assert_eq!(summary.stats.total_records, 3);
    assert_eq!(summary.summary.len(), 2);

    let emp = summary
        .summary
        .iter()
        .find(|s| s.employee_id == 1000)
        .unwrap();
    assert_eq!(emp.total_days, 2);
    assert!((emp.total_hours - 18.0).abs() < 1e-9);
    assert!((emp.total_overtime_hours - 2.0).abs() < 1e-9);
    assert!((emp.average_hours - 9.0).abs() < 1e-9);
    assert_eq!(emp.violation_days, 1);

    let other = summary
        .summary
        .iter()
        .find(|s| s.employee_id == 2000)
        .unwrap();
    assert_eq!(other.total_days, 1);
    assert!((other.average_hours - 4.0).abs() < 1e-9);
    assert_eq!(other.violation_days, 0);
}

#[actix_web::test]
async fn summary_counts_todays_presence() {
    let (service, store, _clock) = harness(Some(AttendancePolicy::default()));
    // harness clock: 2026-03-02 09:00
    let today = d(2);

    let mut present = seeded(&store, 1000, today, 0.0, 0.0, 0).await;
    present.status = AttendanceStatus::ClockedIn;
    let expected = present.updated_at;
    store.update(&present, expected).await.unwrap();

    let mut on_break = seeded(&store, 2000, today, 0.0, 0.0, 0).await;
    on_break.status = AttendanceStatus::OnBreak;
    let expected = on_break.updated_at;
    store.update(&on_break, expected).await.unwrap();

    // clocked out earlier today: present but no longer clocked
    seeded(&store, 3000, today, 8.0, 0.0, 0).await;

    let summary = service.summary(1, d(1), d(31)).await.unwrap();
    assert_eq!(summary.stats.present_today, 3);
    assert_eq!(summary.stats.currently_clocked, 2);
    assert_eq!(summary.stats.report_period.start, d(1));
    assert_eq!(summary.stats.report_period.end, d(31));
}

#[actix_web::test]
async fn empty_range_yields_empty_summary() {
    let (service, _store, _clock) = harness(Some(AttendancePolicy::default()));

    let summary = service.summary(1, d(1), d(31)).await.unwrap();
    assert!(summary.summary.is_empty());
    assert_eq!(summary.stats.total_records, 0);
    assert_eq!(summary.stats.present_today, 0);
    assert_eq!(summary.stats.currently_clocked, 0);
}

#[test]
fn month_bounds_mid_year_and_december() {
    let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
    assert_eq!(start, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());

    let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
    assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

    let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
}
