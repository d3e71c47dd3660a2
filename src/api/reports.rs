//! Aggregate reporting endpoints. All of them are read-only and
//! restricted to approver roles.
use crate::{auth::auth::AuthUser, error::ApiError, model::leave_request::LeaveStatus};
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Months, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct EmployeeSummaryQuery {
    pub department_id: Option<u64>,
    pub position_id: Option<u64>,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveSummaryQuery {
    /// Year (default: current year)
    pub year: Option<i32>,
    /// Month (1-12)
    pub month: Option<u32>,
    pub department_id: Option<u64>,
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: u64,
    full_name: String,
    email: String,
    department: Option<String>,
    position: Option<String>,
    hire_date: chrono::NaiveDate,
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: u64,
    employee: String,
    department: Option<String>,
    leave_type: String,
    status: String,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
}

async fn count_active(pool: &MySqlPool, table: &str) -> sqlx::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE is_active = 1");
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await
}

/// Dashboard overview counts.
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;
    let pool = pool.get_ref();

    let pending = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = ?",
    )
    .bind(LeaveStatus::Pending)
    .fetch_one(pool);

    let approved_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = ? AND start_date = CURDATE()",
    )
    .bind(LeaveStatus::Approved)
    .fetch_one(pool);

    let (employees, departments, positions, pending_leaves, approved_leaves_today) =
        futures::try_join!(
            count_active(pool, "employees"),
            count_active(pool, "departments"),
            count_active(pool, "positions"),
            pending,
            approved_today,
        )
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "overview": {
            "total_employees": employees,
            "total_departments": departments,
            "total_positions": positions,
            "pending_leaves": pending_leaves,
            "approved_leaves_today": approved_leaves_today,
        },
        "timestamp": Utc::now(),
    })))
}

/// Head-count breakdown by department and position, plus recent hires.
#[utoipa::path(
    get,
    path = "/api/v1/reports/employees/summary",
    params(EmployeeSummaryQuery),
    responses(
        (status = 200, description = "Employee summary report"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn employee_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeSummaryQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;

    let mut sql = String::from(
        r#"
        SELECT e.id, CONCAT(e.first_name, ' ', e.last_name) AS full_name, e.email,
               d.name AS department, p.title AS position, e.hire_date
        FROM employees e
        LEFT JOIN departments d ON d.id = e.department_id
        LEFT JOIN positions p ON p.id = e.position_id
        WHERE e.is_active = 1
        "#,
    );
    let mut ids: Vec<u64> = Vec::new();

    if let Some(department_id) = query.department_id {
        sql.push_str(" AND e.department_id = ?");
        ids.push(department_id);
    }
    if let Some(position_id) = query.position_id {
        sql.push_str(" AND e.position_id = ?");
        ids.push(position_id);
    }

    let mut q = sqlx::query_as::<_, EmployeeRow>(&sql);
    for id in ids {
        q = q.bind(id);
    }
    let employees = q.fetch_all(pool.get_ref()).await.map_err(ApiError::from)?;

    let mut by_department: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_position: BTreeMap<String, i64> = BTreeMap::new();
    for emp in &employees {
        let dept = emp.department.clone().unwrap_or_else(|| "Unassigned".into());
        *by_department.entry(dept).or_default() += 1;
        let pos = emp.position.clone().unwrap_or_else(|| "Unassigned".into());
        *by_position.entry(pos).or_default() += 1;
    }

    let three_months_ago = Utc::now().date_naive() - Months::new(3);
    let recent_hires = employees
        .iter()
        .filter(|e| e.hire_date >= three_months_ago)
        .count();

    Ok(HttpResponse::Ok().json(json!({
        "summary": {
            "total_employees": employees.len(),
            "by_department": by_department,
            "by_position": by_position,
            "recent_hires": recent_hires,
        },
        "employees": employees.iter().map(|e| json!({
            "id": e.id,
            "full_name": e.full_name,
            "email": e.email,
            "department": e.department,
            "position": e.position,
            "hire_date": e.hire_date,
        })).collect::<Vec<_>>(),
    })))
}

/// Leave activity for a period, grouped by status, type and department.
#[utoipa::path(
    get,
    path = "/api/v1/reports/leave/summary",
    params(LeaveSummaryQuery),
    responses(
        (status = 200, description = "Leave summary report"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn leave_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveSummaryQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;

    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let mut sql = String::from(
        r#"
        SELECT l.id, CONCAT(e.first_name, ' ', e.last_name) AS employee,
               d.name AS department, l.leave_type, l.status, l.start_date, l.end_date
        FROM leave_requests l
        JOIN employees e ON e.id = l.employee_id
        LEFT JOIN departments d ON d.id = e.department_id
        WHERE YEAR(l.start_date) = ?
        "#,
    );
    let mut ids: Vec<u64> = Vec::new();

    if let Some(month) = query.month {
        sql.push_str(" AND MONTH(l.start_date) = ?");
        ids.push(month as u64);
    }
    if let Some(department_id) = query.department_id {
        sql.push_str(" AND e.department_id = ?");
        ids.push(department_id);
    }
    sql.push_str(" ORDER BY l.created_at DESC");

    let mut q = sqlx::query_as::<_, LeaveRow>(&sql).bind(year);
    for id in ids {
        q = q.bind(id);
    }
    let leaves = q.fetch_all(pool.get_ref()).await.map_err(ApiError::from)?;

    let count_status = |wanted: &str| leaves.iter().filter(|l| l.status == wanted).count();

    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_department: BTreeMap<String, i64> = BTreeMap::new();
    let mut total_days: i64 = 0;
    for leave in &leaves {
        *by_type.entry(leave.leave_type.clone()).or_default() += 1;
        let dept = leave
            .department
            .clone()
            .unwrap_or_else(|| "Unassigned".into());
        *by_department.entry(dept).or_default() += 1;
        if leave.status == "APPROVED" {
            total_days +=
                crate::model::leave_request::inclusive_days(leave.start_date, leave.end_date);
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "period": { "year": year, "month": query.month },
        "summary": {
            "total_requests": leaves.len(),
            "by_status": {
                "pending": count_status("PENDING"),
                "approved": count_status("APPROVED"),
                "rejected": count_status("REJECTED"),
                "cancelled": count_status("CANCELLED"),
            },
            "by_type": by_type,
            "by_department": by_department,
            "total_days": total_days,
        },
        "recent_requests": leaves.iter().take(10).map(|l| json!({
            "id": l.id,
            "employee": l.employee,
            "department": l.department,
            "leave_type": l.leave_type,
            "start_date": l.start_date,
            "end_date": l.end_date,
            "number_of_days": crate::model::leave_request::inclusive_days(l.start_date, l.end_date),
            "status": l.status,
        })).collect::<Vec<_>>(),
    })))
}
