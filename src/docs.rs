use crate::api::attendance::{
    AttendancePageResponse, BreakStartRequest, ClockInRequest, ClockOutRequest, Pagination,
    SyncRequest,
};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakEntry, BreakType, ClockInEvent, ClockMethod,
    ClockOutEvent, DeviceInfo, GeoLocation, Notes, Shift, ShiftType, Violation,
    ViolationSeverity, ViolationType,
};
use crate::service::attendance::AllowedLocation;
use crate::service::report::{AttendanceSummary, EmployeeSummary, ReportPeriod, SummaryStats};
use crate::service::sync::{
    SyncActionKind, SyncOutcome, SyncRecordError, SyncRecordPayload, SyncReport,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendly API",
        version = "1.0.0",
        description = r#"
## Multi-tenant Employee Attendance Tracker

This API powers the attendance backend consumed by the web and mobile apps.

### 🔹 Key Features
- **Daily Lifecycle**
  - Clock-in / clock-out with GPS, geofence and photo policy validation
- **Break Tracking**
  - Start/end breaks, automatic duration computation
- **Offline Sync**
  - Bulk reconciliation of client-buffered records (last writer wins)
- **Reporting**
  - Per-employee rollups, presence counts and violation analytics

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication** issued by the
identity service. Company-wide endpoints require **Manager** or
**Super Admin** roles.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::start_break,
        crate::api::attendance::end_break,
        crate::api::attendance::sync,
        crate::api::attendance::today,
        crate::api::attendance::my_attendance,
        crate::api::attendance::company_attendance,
        crate::api::attendance::summary,
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            ClockInEvent,
            ClockOutEvent,
            ClockMethod,
            BreakEntry,
            BreakType,
            Shift,
            ShiftType,
            Notes,
            GeoLocation,
            DeviceInfo,
            Violation,
            ViolationType,
            ViolationSeverity,
            AllowedLocation,
            ClockInRequest,
            ClockOutRequest,
            BreakStartRequest,
            SyncRequest,
            SyncRecordPayload,
            SyncReport,
            SyncOutcome,
            SyncActionKind,
            SyncRecordError,
            AttendancePageResponse,
            Pagination,
            AttendanceSummary,
            EmployeeSummary,
            SummaryStats,
            ReportPeriod,
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance lifecycle, sync and reporting APIs"),
    )
)]
pub struct ApiDoc;
