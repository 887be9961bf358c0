use std::sync::Arc;

use derive_more::Display;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakEntry, BreakType, ClockInEvent, ClockMethod,
    ClockOutEvent, DEFAULT_DAILY_HOURS, DeviceInfo, GeoLocation, SyncStatus,
};
use crate::service::Clock;
use crate::store::{
    AttendanceStore, CompanyRangeQuery, EmployeeRangeQuery, Page, PolicyProvider, StoreError,
};
use crate::utils::geo;

/// Geofence summary returned alongside `OutsideGeofence`, radius resolved
/// against the tenant default.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllowedLocation {
    pub name: Option<String>,
    pub radius: f64,
}

#[derive(Debug, Display)]
pub enum AttendanceError {
    /// Today's record already carries a clock-in. Carries the existing record.
    #[display(fmt = "Already clocked in today")]
    AlreadyClockedIn(Box<AttendanceRecord>),
    #[display(fmt = "GPS location is required for clock-in")]
    LocationRequired,
    /// No configured geofence contains the reported position.
    #[display(fmt = "You are outside the allowed work area")]
    OutsideGeofence(Vec<AllowedLocation>),
    #[display(fmt = "Photo verification is required for clock-in")]
    PhotoRequired,
    #[display(fmt = "Company not found")]
    PolicyNotFound,
    #[display(fmt = "No clock-in record found for today")]
    NoClockIn,
    #[display(fmt = "Already clocked out today")]
    AlreadyClockedOut(Box<AttendanceRecord>),
    #[display(fmt = "Must clock in before taking a break")]
    NotClockedIn,
    #[display(fmt = "Already on break")]
    AlreadyOnBreak,
    #[display(fmt = "Not currently on break")]
    NotOnBreak,
    #[display(fmt = "No active break found")]
    NoActiveBreak,
    #[display(fmt = "Invalid attendance records provided")]
    EmptySyncBatch,
    /// A concurrent writer changed the record between read and write.
    #[display(fmt = "Attendance record was modified concurrently")]
    Conflict,
    #[display(fmt = "storage failure: {}", _0)]
    Store(StoreError),
}

impl std::error::Error for AttendanceError {}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AttendanceError::Conflict,
            other => AttendanceError::Store(other),
        }
    }
}

/// The attendance state machine. Validates transitions against the tenant
/// policy and the stored daily record, then persists through the injected
/// store. All time flows through the injected clock.
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    policies: Arc<dyn PolicyProvider>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        policies: Arc<dyn PolicyProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policies,
            clock,
        }
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn AttendanceStore {
        self.store.as_ref()
    }

    pub(crate) fn policies(&self) -> &dyn PolicyProvider {
        self.policies.as_ref()
    }

    /// Clock-in: creates or completes today's record after the policy checks
    /// pass. Record state is untouched when any check fails.
    pub async fn clock_in(
        &self,
        employee_id: u64,
        company_id: u64,
        location: Option<GeoLocation>,
        photo: Option<String>,
        method: ClockMethod,
        device_info: Option<DeviceInfo>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let existing = self.store.find_by_day(employee_id, today).await?;
        if let Some(record) = &existing {
            if record.has_clock_in() {
                return Err(AttendanceError::AlreadyClockedIn(Box::new(record.clone())));
            }
        }

        let policy = self
            .policies
            .attendance_policy(company_id)
            .await?
            .ok_or(AttendanceError::PolicyNotFound)?;

        if policy.gps_required && location.is_none() {
            return Err(AttendanceError::LocationRequired);
        }

        if policy.geofencing.enabled {
            if let Some(point) = &location {
                let contained = policy.geofencing.locations.iter().any(|fence| {
                    geo::is_within_radius(
                        point.latitude,
                        point.longitude,
                        fence.latitude,
                        fence.longitude,
                        fence.effective_radius(policy.geofencing.radius),
                    )
                });
                if !contained {
                    let allowed = policy
                        .geofencing
                        .locations
                        .iter()
                        .map(|fence| AllowedLocation {
                            name: fence.name.clone(),
                            radius: fence.effective_radius(policy.geofencing.radius),
                        })
                        .collect();
                    return Err(AttendanceError::OutsideGeofence(allowed));
                }
            }
        }

        if policy.photo_required && photo.is_none() {
            return Err(AttendanceError::PhotoRequired);
        }

        let event = ClockInEvent {
            time: now,
            location,
            photo,
            method,
            device_info,
        };

        match existing {
            Some(mut record) => {
                let expected = record.updated_at;
                record.clock_in = Some(event);
                record.status = AttendanceStatus::ClockedIn;
                record.sync_status = SyncStatus::Synced;
                record.last_sync_at = Some(now);
                record.updated_at = now;
                self.store.update(&record, expected).await?;
                Ok(record)
            }
            None => {
                let mut record = AttendanceRecord::new(employee_id, company_id, today, now);
                record.clock_in = Some(event);
                record.status = AttendanceStatus::ClockedIn;
                record.sync_status = SyncStatus::Synced;
                record.last_sync_at = Some(now);
                match self.store.insert(&mut record).await {
                    Ok(()) => Ok(record),
                    // Lost the race for today's record: re-read to decide
                    // whether the winner already clocked in.
                    Err(StoreError::Duplicate) => {
                        debug!(employee_id, %today, "clock-in lost insert race");
                        match self.store.find_by_day(employee_id, today).await? {
                            Some(winner) if winner.has_clock_in() => {
                                Err(AttendanceError::AlreadyClockedIn(Box::new(winner)))
                            }
                            _ => Err(AttendanceError::Conflict),
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Clock-out: closes today's record, recomputes hours against the policy
    /// threshold and re-derives violations.
    pub async fn clock_out(
        &self,
        employee_id: u64,
        location: Option<GeoLocation>,
        photo: Option<String>,
        method: ClockMethod,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let mut record = self
            .store
            .find_by_day(employee_id, today)
            .await?
            .filter(AttendanceRecord::has_clock_in)
            .ok_or(AttendanceError::NoClockIn)?;

        if record.has_clock_out() {
            return Err(AttendanceError::AlreadyClockedOut(Box::new(record)));
        }

        let policy = self.policies.attendance_policy(record.company_id).await?;

        let expected = record.updated_at;
        record.clock_out = Some(ClockOutEvent {
            time: now,
            location,
            photo,
            method,
        });
        record.status = AttendanceStatus::ClockedOut;
        record.sync_status = SyncStatus::Synced;
        record.last_sync_at = Some(now);

        let threshold = policy
            .as_ref()
            .map(|p| p.standard_daily_hours)
            .unwrap_or(DEFAULT_DAILY_HOURS);
        record.calculate_hours(threshold);
        if let Some(policy) = &policy {
            record.check_violations(policy, now);
        }

        record.updated_at = now;
        self.store.update(&record, expected).await?;
        Ok(record)
    }

    /// Opens a break on today's record. At most one break may be open.
    pub async fn start_break(
        &self,
        employee_id: u64,
        kind: BreakType,
        location: Option<GeoLocation>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let mut record = self
            .store
            .find_by_day(employee_id, today)
            .await?
            .filter(AttendanceRecord::has_clock_in)
            .ok_or(AttendanceError::NotClockedIn)?;

        if record.status == AttendanceStatus::OnBreak {
            return Err(AttendanceError::AlreadyOnBreak);
        }

        let expected = record.updated_at;
        record.breaks.push(BreakEntry {
            start_time: now,
            end_time: None,
            duration_minutes: 0,
            kind,
            location,
        });
        record.status = AttendanceStatus::OnBreak;
        record.sync_status = SyncStatus::Synced;
        record.last_sync_at = Some(now);
        record.updated_at = now;

        self.store.update(&record, expected).await?;
        Ok(record)
    }

    /// Closes the open break and returns the record plus the closed entry.
    pub async fn end_break(
        &self,
        employee_id: u64,
    ) -> Result<(AttendanceRecord, BreakEntry), AttendanceError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let mut record = self
            .store
            .find_by_day(employee_id, today)
            .await?
            .filter(|r| r.status == AttendanceStatus::OnBreak)
            .ok_or(AttendanceError::NotOnBreak)?;

        let expected = record.updated_at;
        let ended = {
            let active = record
                .active_break_mut()
                .ok_or(AttendanceError::NoActiveBreak)?;
            active.end_time = Some(now);
            active.duration_minutes = ((now - active.start_time).num_milliseconds() as f64
                / 60_000.0)
                .round() as i64;
            active.clone()
        };
        record.status = AttendanceStatus::ClockedIn;
        record.sync_status = SyncStatus::Synced;
        record.last_sync_at = Some(now);
        record.updated_at = now;

        self.store.update(&record, expected).await?;
        Ok((record, ended))
    }

    /// Today's record, if any.
    pub async fn today(
        &self,
        employee_id: u64,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        let today = self.clock.now().date_naive();
        Ok(self.store.find_by_day(employee_id, today).await?)
    }

    pub async fn list_for_employee(
        &self,
        employee_id: u64,
        query: &EmployeeRangeQuery,
    ) -> Result<Page<AttendanceRecord>, AttendanceError> {
        Ok(self.store.list_for_employee(employee_id, query).await?)
    }

    pub async fn list_for_company(
        &self,
        company_id: u64,
        query: &CompanyRangeQuery,
    ) -> Result<Page<AttendanceRecord>, AttendanceError> {
        Ok(self.store.list_for_company(company_id, query).await?)
    }
}
