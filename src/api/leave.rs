use crate::auth::auth::AuthUser;
use crate::leave::{LeaveQuery, NewLeaveRequest, SqlLeaveEngine};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-02-01", format = "date", value_type = String)]
    pub start_date: chrono::NaiveDate,
    #[schema(example = "2026-02-03", format = "date", value_type = String)]
    pub end_date: chrono::NaiveDate,
    #[schema(example = "ANNUAL")]
    pub leave_type: LeaveType,
    #[schema(example = "Family vacation", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = "APPROVED")]
    pub status: LeaveStatus,
    #[schema(example = "Approved for family vacation", nullable = true)]
    pub approver_comments: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "PENDING")]
    pub status: Option<LeaveStatus>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    /// Year (default: current year)
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

/// Submit a leave request for the calling user's employee profile.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates or overlapping request"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.require_employee_id()?;
    let payload = payload.into_inner();

    let created = engine
        .create(NewLeaveRequest {
            employee_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            leave_type: payload.leave_type,
            reason: payload.reason,
        })
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// List leave requests, newest first (Admin/HR/Manager).
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave requests, newest first", body = [LeaveRequest]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;

    let leaves = engine
        .list(&LeaveQuery {
            employee_id: query.employee_id,
            status: query.status,
        })
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/// Leave requests of one employee, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/leave/employee/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee leave requests", body = [LeaveRequest]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn employee_leaves(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = path.into_inner();

    // Employees may read their own history; approvers may read anyone's.
    if auth.employee_id != Some(employee_id) {
        auth.require_approver()?;
    }

    let leaves = engine.find_by_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Yearly leave balance for an employee.
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Employee leave balance"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = path.into_inner();

    if auth.employee_id != Some(employee_id) {
        auth.require_approver()?;
    }

    let balance = engine.leave_balance(employee_id, query.year).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// Fetch one leave request.
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    _auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let leave = engine.find_one(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Approve or reject a pending request (Admin/HR/Manager).
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/status",
    params(("leave_id" = u64, Path, description = "ID of the leave request to decide")),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Status updated", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;
    let payload = payload.into_inner();

    let updated = engine
        .update_status(
            path.into_inner(),
            payload.status,
            payload.approver_comments,
            auth.user_id,
        )
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Cancel one of your own leave requests.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "ID of the leave request to cancel")),
    responses(
        (status = 200, description = "Leave request cancelled", body = LeaveRequest),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Approved requests cannot be cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    engine: web::Data<SqlLeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.require_employee_id()?;

    let cancelled = engine.cancel(path.into_inner(), employee_id).await?;
    Ok(HttpResponse::Ok().json(cancelled))
}
