use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

use crate::model::policy::AttendancePolicy;

/// Fallback daily threshold (hours) when a tenant has no policy on file.
pub const DEFAULT_DAILY_HOURS: f64 = 8.0;

/// Minutes of grace before a late arrival counts as a violation.
const LATE_ARRIVAL_GRACE_MIN: i64 = 15;

/// Completed breaks longer than this (minutes) are flagged.
const LONG_BREAK_LIMIT_MIN: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClockMethod {
    #[default]
    Manual,
    Biometric,
    QrCode,
    Nfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BreakType {
    #[default]
    Lunch,
    Coffee,
    Personal,
    Meeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShiftType {
    #[default]
    Morning,
    Evening,
    Night,
    Flexible,
}

/// Daily lifecycle: not_started → clocked_in → (on_break ⇄ clocked_in)* →
/// clocked_out. `completed` is a reserved terminal value kept for wire
/// compatibility; no transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    NotStarted,
    ClockedIn,
    OnBreak,
    ClockedOut,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Synced,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    AutoApproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationType {
    LateArrival,
    EarlyDeparture,
    LongBreak,
    MissingClockOut,
    LocationViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceInfo {
    pub platform: Option<String>,
    pub version: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClockInEvent {
    #[schema(format = "date-time", value_type = String)]
    pub time: DateTime<Utc>,
    pub location: Option<GeoLocation>,
    /// Base64-encoded verification photo.
    pub photo: Option<String>,
    #[serde(default)]
    pub method: ClockMethod,
    pub device_info: Option<DeviceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClockOutEvent {
    #[schema(format = "date-time", value_type = String)]
    pub time: DateTime<Utc>,
    pub location: Option<GeoLocation>,
    pub photo: Option<String>,
    #[serde(default)]
    pub method: ClockMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BreakEntry {
    #[schema(format = "date-time", value_type = String)]
    pub start_time: DateTime<Utc>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub end_time: Option<DateTime<Utc>>,
    /// Rounded minutes, filled in when the break ends.
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(rename = "type", default)]
    pub kind: BreakType,
    pub location: Option<GeoLocation>,
}

impl BreakEntry {
    /// Wall-clock minutes between start and end; `None` while still open.
    pub fn elapsed_minutes(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 60_000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Shift {
    #[schema(format = "date-time", value_type = Option<String>)]
    pub scheduled_start: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub scheduled_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shift_type: ShiftType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notes {
    pub employee: Option<String>,
    pub manager: Option<String>,
    pub system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationType,
    pub description: String,
    pub severity: ViolationSeverity,
    #[schema(format = "date-time", value_type = String)]
    pub detected_at: DateTime<Utc>,
}

/// One attendance record per (employee, company, calendar day). The store
/// enforces the at-most-one-per-day rule; `updated_at` is the authority
/// timestamp for sync conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub company_id: u64,
    #[schema(example = "2026-08-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub clock_in: Option<ClockInEvent>,
    pub clock_out: Option<ClockOutEvent>,
    #[serde(default)]
    pub breaks: Vec<BreakEntry>,
    pub shift: Option<Shift>,
    #[serde(default)]
    pub hours_worked: f64,
    #[serde(default)]
    pub regular_hours: f64,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Notes,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_status: SyncStatus,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_modified: bool,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(employee_id: u64, company_id: u64, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            employee_id,
            company_id,
            date,
            clock_in: None,
            clock_out: None,
            breaks: Vec::new(),
            shift: None,
            hours_worked: 0.0,
            regular_hours: 0.0,
            overtime_hours: 0.0,
            status: AttendanceStatus::NotStarted,
            notes: Notes::default(),
            approval_status: ApprovalStatus::Pending,
            approved_by: None,
            approved_at: None,
            sync_status: SyncStatus::Synced,
            last_sync_at: None,
            is_modified: false,
            violations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_clock_in(&self) -> bool {
        self.clock_in.is_some()
    }

    pub fn has_clock_out(&self) -> bool {
        self.clock_out.is_some()
    }

    /// The single break without an end time, if any. The state machine keeps
    /// at most one break open at a time.
    pub fn active_break_mut(&mut self) -> Option<&mut BreakEntry> {
        self.breaks.iter_mut().find(|b| b.end_time.is_none())
    }

    /// Recompute hours_worked / regular_hours / overtime_hours from the clock
    /// pair and completed breaks. Open breaks contribute nothing. No-op while
    /// either clock event is missing.
    pub fn calculate_hours(&mut self, daily_threshold_hours: f64) {
        let (Some(clock_in), Some(clock_out)) = (&self.clock_in, &self.clock_out) else {
            return;
        };

        let mut total_ms = (clock_out.time - clock_in.time).num_milliseconds();

        let break_ms: i64 = self
            .breaks
            .iter()
            .filter_map(|b| b.end_time.map(|end| (end - b.start_time).num_milliseconds()))
            .sum();
        total_ms -= break_ms;

        let total_hours = (total_ms as f64 / 3_600_000.0).max(0.0);

        self.hours_worked = total_hours;
        self.regular_hours = total_hours.min(daily_threshold_hours);
        self.overtime_hours = (total_hours - daily_threshold_hours).max(0.0);
    }

    /// Re-derive the violation list against the tenant policy. Replaces the
    /// previous list wholesale. early_departure and location_violation are
    /// reserved values with no detection rule.
    pub fn check_violations(&mut self, policy: &AttendancePolicy, now: DateTime<Utc>) {
        let mut violations = Vec::new();

        // Late arrival: more than the grace period past the scheduled start.
        if let Some(clock_in) = &self.clock_in {
            if let Ok(start) = NaiveTime::parse_from_str(&policy.working_hours.start, "%H:%M") {
                let scheduled_start = self.date.and_time(start).and_utc();
                let grace = chrono::Duration::minutes(LATE_ARRIVAL_GRACE_MIN);
                if clock_in.time > scheduled_start + grace {
                    let minutes_late = ((clock_in.time - scheduled_start).num_milliseconds()
                        as f64
                        / 60_000.0)
                        .round() as i64;
                    violations.push(Violation {
                        kind: ViolationType::LateArrival,
                        description: format!("Arrived {minutes_late} minutes late"),
                        severity: ViolationSeverity::Medium,
                        detected_at: now,
                    });
                }
            }
        }

        // Clocked in, never clocked out, and the day is no longer live.
        if self.clock_in.is_some()
            && self.clock_out.is_none()
            && self.status != AttendanceStatus::ClockedIn
        {
            violations.push(Violation {
                kind: ViolationType::MissingClockOut,
                description: "Employee forgot to clock out".to_string(),
                severity: ViolationSeverity::High,
                detected_at: now,
            });
        }

        for b in &self.breaks {
            if let Some(minutes) = b.elapsed_minutes() {
                if minutes > LONG_BREAK_LIMIT_MIN {
                    violations.push(Violation {
                        kind: ViolationType::LongBreak,
                        description: format!("Break lasted {} minutes", minutes.round() as i64),
                        severity: ViolationSeverity::Low,
                        detected_at: now,
                    });
                }
            }
        }

        self.violations = violations;
    }
}
