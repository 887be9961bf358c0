use chrono::{DateTime, NaiveDate, Utc};

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakEntry, BreakType, ClockInEvent, ClockMethod,
    ClockOutEvent, DEFAULT_DAILY_HOURS, Violation, ViolationSeverity, ViolationType,
};
use crate::model::policy::AttendancePolicy;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    day().and_hms_opt(hour, min, 0).unwrap().and_utc()
}

fn clock_in_at(hour: u32, min: u32) -> ClockInEvent {
    ClockInEvent {
        time: at(hour, min),
        location: None,
        photo: None,
        method: ClockMethod::Manual,
        device_info: None,
    }
}

fn clock_out_at(hour: u32, min: u32) -> ClockOutEvent {
    ClockOutEvent {
        time: at(hour, min),
        location: None,
        photo: None,
        method: ClockMethod::Manual,
    }
}

fn break_between(start: (u32, u32), end: Option<(u32, u32)>) -> BreakEntry {
    BreakEntry {
        start_time: at(start.0, start.1),
        end_time: end.map(|(h, m)| at(h, m)),
        duration_minutes: 0,
        kind: BreakType::Lunch,
        location: None,
    }
}

fn record() -> AttendanceRecord {
    AttendanceRecord::new(1000, 1, day(), at(8, 0))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn hours_without_breaks() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 30));
    rec.calculate_hours(DEFAULT_DAILY_HOURS);

    assert_close(rec.hours_worked, 8.5);
    assert_close(rec.regular_hours, 8.0);
    assert_close(rec.overtime_hours, 0.5);
}

#[test]
fn completed_break_reduces_hours_by_its_duration() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.calculate_hours(DEFAULT_DAILY_HOURS);
    let without_break = rec.hours_worked;

    rec.breaks.push(break_between((12, 0), Some((12, 45))));
    rec.calculate_hours(DEFAULT_DAILY_HOURS);

    assert_close(rec.hours_worked, without_break - 45.0 / 60.0);
}

#[test]
fn open_break_contributes_nothing() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.breaks.push(break_between((12, 0), None));
    rec.calculate_hours(DEFAULT_DAILY_HOURS);

    assert_close(rec.hours_worked, 8.0);
}

#[test]
fn hours_never_negative() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(9, 30));
    // Break longer than the whole span
    rec.breaks.push(break_between((9, 0), Some((11, 0))));
    rec.calculate_hours(DEFAULT_DAILY_HOURS);

    assert_close(rec.hours_worked, 0.0);
    assert_close(rec.regular_hours, 0.0);
    assert_close(rec.overtime_hours, 0.0);
}

#[test]
fn hours_untouched_until_both_clock_events_exist() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.hours_worked = 3.0;
    rec.calculate_hours(DEFAULT_DAILY_HOURS);

    assert_close(rec.hours_worked, 3.0);
}

#[test]
fn configurable_daily_threshold_splits_overtime() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.calculate_hours(7.0);

    assert_close(rec.hours_worked, 8.0);
    assert_close(rec.regular_hours, 7.0);
    assert_close(rec.overtime_hours, 1.0);
}

#[test]
fn late_arrival_past_grace_is_flagged() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 20));
    rec.status = AttendanceStatus::ClockedOut;
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.check_violations(&AttendancePolicy::default(), at(17, 0));

    assert_eq!(rec.violations.len(), 1);
    let v = &rec.violations[0];
    assert_eq!(v.kind, ViolationType::LateArrival);
    assert_eq!(v.severity, ViolationSeverity::Medium);
    assert_eq!(v.description, "Arrived 20 minutes late");
}

#[test]
fn arrival_within_grace_is_clean() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 15));
    rec.status = AttendanceStatus::ClockedOut;
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.check_violations(&AttendancePolicy::default(), at(17, 0));

    assert!(rec.violations.is_empty());
}

#[test]
fn missing_clock_out_on_stale_record() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.status = AttendanceStatus::ClockedOut; // closed without a clock-out event
    rec.check_violations(&AttendancePolicy::default(), at(23, 0));

    assert!(
        rec.violations
            .iter()
            .any(|v| v.kind == ViolationType::MissingClockOut
                && v.severity == ViolationSeverity::High)
    );
}

#[test]
fn no_missing_clock_out_while_day_is_live() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.status = AttendanceStatus::ClockedIn;
    rec.check_violations(&AttendancePolicy::default(), at(12, 0));

    assert!(rec.violations.is_empty());
}

#[test]
fn long_break_is_flagged_but_hour_break_is_not() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.status = AttendanceStatus::ClockedOut;
    rec.breaks.push(break_between((12, 0), Some((13, 0)))); // exactly 60
    rec.breaks.push(break_between((15, 0), Some((16, 5)))); // 65
    rec.check_violations(&AttendancePolicy::default(), at(17, 0));

    assert_eq!(rec.violations.len(), 1);
    let v = &rec.violations[0];
    assert_eq!(v.kind, ViolationType::LongBreak);
    assert_eq!(v.severity, ViolationSeverity::Low);
    assert_eq!(v.description, "Break lasted 65 minutes");
}

#[test]
fn violation_list_is_replaced_wholesale() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.status = AttendanceStatus::ClockedOut;
    rec.violations.push(Violation {
        kind: ViolationType::LocationViolation,
        description: "stale".to_string(),
        severity: ViolationSeverity::High,
        detected_at: at(9, 0),
    });
    rec.check_violations(&AttendancePolicy::default(), at(17, 0));

    assert!(rec.violations.is_empty());
}

#[test]
fn full_day_with_long_lunch() {
    // 09:00 in, 12:00-13:05 lunch, 17:00 out: 8h span minus the 65min break.
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(9, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.status = AttendanceStatus::ClockedOut;
    rec.breaks.push(break_between((12, 0), Some((13, 5))));

    rec.calculate_hours(DEFAULT_DAILY_HOURS);
    rec.check_violations(&AttendancePolicy::default(), at(17, 0));

    assert_close(rec.hours_worked, 6.0 + 55.0 / 60.0);
    assert_close(rec.regular_hours, 6.0 + 55.0 / 60.0);
    assert_close(rec.overtime_hours, 0.0);
    assert_eq!(rec.violations.len(), 1);
    assert_eq!(rec.violations[0].kind, ViolationType::LongBreak);
}

#[test]
fn unparseable_working_hours_skip_late_check() {
    let mut rec = record();
    rec.clock_in = Some(clock_in_at(11, 0));
    rec.clock_out = Some(clock_out_at(17, 0));
    rec.status = AttendanceStatus::ClockedOut;

    let mut policy = AttendancePolicy::default();
    policy.working_hours.start = "not-a-time".to_string();
    rec.check_violations(&policy, at(17, 0));

    assert!(rec.violations.is_empty());
}
