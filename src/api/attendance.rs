use crate::auth::auth::AuthUser;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BreakType, ClockMethod, DeviceInfo, GeoLocation,
};
use crate::service::attendance::{AttendanceError, AttendanceService};
use crate::service::report::month_bounds;
use crate::service::sync::SyncRecordPayload;
use crate::store::{CompanyRangeQuery, EmployeeRangeQuery};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct ClockInRequest {
    pub location: Option<GeoLocation>,
    /// Base64-encoded verification photo.
    pub photo: Option<String>,
    #[serde(default)]
    pub method: ClockMethod,
    pub device_info: Option<DeviceInfo>,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockOutRequest {
    pub location: Option<GeoLocation>,
    pub photo: Option<String>,
    #[serde(default)]
    pub method: ClockMethod,
}

#[derive(Deserialize, ToSchema)]
pub struct BreakStartRequest {
    #[serde(rename = "type", default)]
    pub kind: BreakType,
    pub location: Option<GeoLocation>,
}

#[derive(Deserialize, ToSchema)]
pub struct SyncRequest {
    pub attendance_records: Vec<SyncRecordPayload>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MyAttendanceQuery {
    #[param(example = "2026-08-01", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[param(example = "2026-08-31", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    /// Pagination page number (1-based)
    pub page: Option<u64>,
    /// Records per page
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CompanyAttendanceQuery {
    #[param(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[param(format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by record status
    pub status: Option<AttendanceStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    #[param(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[param(format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 2)]
    pub pages: i64,
    #[schema(example = 30)]
    pub limit: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendancePageResponse {
    pub attendance: Vec<AttendanceRecord>,
    pub pagination: Pagination,
}

/// Map an engine error to the HTTP response contract. Validation and
/// state-conflict rejections are 400s with a specific reason; policy lookup
/// misses are 404; CAS losses are 409; store failures are logged 500s.
fn error_response(err: AttendanceError, employee_id: u64, context: &str) -> HttpResponse {
    match err {
        AttendanceError::AlreadyClockedIn(record) => HttpResponse::BadRequest().json(json!({
            "error": "Already clocked in today",
            "attendance": record,
        })),
        AttendanceError::AlreadyClockedOut(record) => HttpResponse::BadRequest().json(json!({
            "error": "Already clocked out today",
            "attendance": record,
        })),
        AttendanceError::OutsideGeofence(allowed) => HttpResponse::BadRequest().json(json!({
            "error": "You are outside the allowed work area",
            "allowed_locations": allowed,
        })),
        AttendanceError::PolicyNotFound => HttpResponse::NotFound().json(json!({
            "error": "Company not found",
        })),
        AttendanceError::Conflict => HttpResponse::Conflict().json(json!({
            "error": err.to_string(),
        })),
        AttendanceError::Store(e) => {
            error!(error = %e, employee_id, context, "attendance operation failed");
            HttpResponse::InternalServerError().json(json!({
                "error": format!("Failed to {context}"),
            }))
        }
        other => HttpResponse::BadRequest().json(json!({
            "error": other.to_string(),
        })),
    }
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 200, description = "Clocked in successfully", body = Object, example = json!({
            "message": "Successfully clocked in"
        })),
        (status = 400, description = "Already clocked in / policy validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<ClockInRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let req = payload.into_inner();

    match service
        .clock_in(
            employee_id,
            auth.company_id,
            req.location,
            req.photo,
            req.method,
            req.device_info,
        )
        .await
    {
        Ok(record) => {
            let clock_in_time = record.clock_in.as_ref().map(|c| c.time);
            let location = record.clock_in.as_ref().and_then(|c| c.location.clone());
            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully clocked in",
                "attendance": record,
                "clock_in_time": clock_in_time,
                "location": location,
            })))
        }
        Err(e) => Ok(error_response(e, employee_id, "clock in")),
    }
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockOutRequest,
    responses(
        (status = 200, description = "Clocked out successfully", body = Object, example = json!({
            "message": "Successfully clocked out",
            "hours_worked": 7.97
        })),
        (status = 400, description = "No clock-in today or already clocked out"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<ClockOutRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let req = payload.into_inner();

    match service
        .clock_out(employee_id, req.location, req.photo, req.method)
        .await
    {
        Ok(record) => {
            let clock_out_time = record.clock_out.as_ref().map(|c| c.time);
            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully clocked out",
                "clock_out_time": clock_out_time,
                "hours_worked": record.hours_worked,
                "overtime_hours": record.overtime_hours,
                "attendance": record,
            })))
        }
        Err(e) => Ok(error_response(e, employee_id, "clock out")),
    }
}

/// Start-break endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/break/start",
    request_body = BreakStartRequest,
    responses(
        (status = 200, description = "Break started", body = Object, example = json!({
            "message": "Break started successfully",
            "status": "on_break"
        })),
        (status = 400, description = "Not clocked in or already on break"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn start_break(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<BreakStartRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let req = payload.into_inner();

    match service.start_break(employee_id, req.kind, req.location).await {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "message": "Break started successfully",
            "break_start_time": record.breaks.last().map(|b| b.start_time),
            "status": record.status,
        }))),
        Err(e) => Ok(error_response(e, employee_id, "start break")),
    }
}

/// End-break endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/break/end",
    responses(
        (status = 200, description = "Break ended", body = Object, example = json!({
            "message": "Break ended successfully",
            "break_duration": 35,
            "status": "clocked_in"
        })),
        (status = 400, description = "Not on break"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn end_break(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    match service.end_break(employee_id).await {
        Ok((record, ended)) => Ok(HttpResponse::Ok().json(json!({
            "message": "Break ended successfully",
            "break_end_time": ended.end_time,
            "break_duration": ended.duration_minutes,
            "status": record.status,
        }))),
        Err(e) => Ok(error_response(e, employee_id, "end break")),
    }
}

/// Bulk offline sync endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Sync completed", body = Object, example = json!({
            "message": "Sync completed",
            "total_processed": 3,
            "successful": 2,
            "failed": 1
        })),
        (status = 400, description = "Empty or invalid batch"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn sync(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<SyncRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let records = payload.into_inner().attendance_records;

    match service
        .sync_batch(employee_id, auth.company_id, records)
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "message": "Sync completed",
            "sync_results": report.sync_results,
            "errors": report.errors,
            "total_processed": report.total_processed,
            "successful": report.successful,
            "failed": report.failed,
        }))),
        Err(e) => Ok(error_response(e, employee_id, "sync attendance data")),
    }
}

/// Today's attendance endpoint
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Current day attendance", body = Object, example = json!({
            "attendance": null,
            "has_clock_in": false,
            "has_clock_out": false,
            "current_status": "not_started"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    match service.today(employee_id).await {
        Ok(record) => {
            let current_status = record
                .as_ref()
                .map(|r| r.status)
                .unwrap_or(AttendanceStatus::NotStarted);
            Ok(HttpResponse::Ok().json(json!({
                "has_clock_in": record.as_ref().is_some_and(|r| r.has_clock_in()),
                "has_clock_out": record.as_ref().is_some_and(|r| r.has_clock_out()),
                "current_status": current_status,
                "attendance": record,
            })))
        }
        Err(e) => Ok(error_response(e, employee_id, "fetch today's attendance")),
    }
}

/// Own attendance history endpoint
#[utoipa::path(
    get,
    path = "/api/v1/attendance/my-attendance",
    params(MyAttendanceQuery),
    responses(
        (status = 200, description = "Paged attendance records", body = AttendancePageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<MyAttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let limit = query.limit.unwrap_or(30).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let range = EmployeeRangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
        limit,
        offset: (page - 1) * limit,
    };

    match service.list_for_employee(employee_id, &range).await {
        Ok(result) => Ok(HttpResponse::Ok().json(AttendancePageResponse {
            attendance: result.items,
            pagination: Pagination {
                total: result.total,
                page,
                pages: (result.total + limit as i64 - 1) / limit as i64,
                limit,
            },
        })),
        Err(e) => Ok(error_response(e, employee_id, "fetch attendance records")),
    }
}

/// Company-wide attendance endpoint (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/company",
    params(CompanyAttendanceQuery),
    responses(
        (status = 200, description = "Paged company attendance", body = AttendancePageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn company_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<CompanyAttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let page = query.page.unwrap_or(1).max(1);

    let range = CompanyRangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
        employee_id: query.employee_id,
        status: query.status,
        limit,
        offset: (page - 1) * limit,
    };

    match service.list_for_company(auth.company_id, &range).await {
        Ok(result) => Ok(HttpResponse::Ok().json(AttendancePageResponse {
            attendance: result.items,
            pagination: Pagination {
                total: result.total,
                page,
                pages: (result.total + limit as i64 - 1) / limit as i64,
                limit,
            },
        })),
        Err(e) => Ok(error_response(e, auth.user_id, "fetch company attendance")),
    }
}

/// Attendance analytics endpoint (Manager/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-employee aggregates and presence stats", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    // Default to the current month, like the dashboards expect.
    let (month_start, month_end) = month_bounds(Utc::now().date_naive());
    let start = query.start_date.unwrap_or(month_start);
    let end = query.end_date.unwrap_or(month_end);

    match service.summary(auth.company_id, start, end).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e) => Ok(error_response(e, auth.user_id, "fetch attendance summary")),
    }
}
