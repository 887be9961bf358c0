use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::DEFAULT_DAILY_HOURS;

/// Per-tenant attendance rules, read from the company settings document.
/// Field defaults mirror what new companies are provisioned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AttendancePolicy {
    pub gps_required: bool,
    pub photo_required: bool,
    pub biometric_required: bool,
    pub geofencing: GeofencingPolicy,
    pub break_tracking: bool,
    pub overtime_calculation: bool,
    pub working_hours: WorkingHours,
    pub working_days: Vec<String>,
    /// Daily threshold splitting regular from overtime hours.
    pub standard_daily_hours: f64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            gps_required: true,
            photo_required: false,
            biometric_required: false,
            geofencing: GeofencingPolicy::default(),
            break_tracking: true,
            overtime_calculation: true,
            working_hours: WorkingHours::default(),
            working_days: [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
            ]
            .map(String::from)
            .to_vec(),
            standard_daily_hours: DEFAULT_DAILY_HOURS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GeofencingPolicy {
    pub enabled: bool,
    /// Tenant-wide default radius in meters; individual locations may
    /// override it.
    pub radius: f64,
    pub locations: Vec<GeofenceLocation>,
}

impl Default for GeofencingPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 100.0,
            locations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeofenceLocation {
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
}

impl GeofenceLocation {
    /// Effective radius after falling back to the tenant-wide default.
    pub fn effective_radius(&self, default_radius: f64) -> f64 {
        self.radius.unwrap_or(default_radius)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WorkingHours {
    /// "HH:MM", local to the tenant's schedule.
    pub start: String,
    pub end: String,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }
}
