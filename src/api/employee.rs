use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::employee::Employee,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

const UPDATABLE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "department_id",
    "position_id",
    "hire_date",
    "is_active",
];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = 2, nullable = true)]
    pub position_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub position_id: Option<u64>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, phone, department_id, \
     position_id, hire_date, is_active, created_at";

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Employee with this email already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
    )
    .bind(&payload.email)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if exists {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Employee with this email already exists"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (first_name, last_name, email, phone, department_id, position_id, hire_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(payload.phone.as_deref())
    .bind(payload.department_id)
    .bind(payload.position_id)
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        ApiError::from(e)
    })?;

    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(employee))
}

/// Paginated list of active employees.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut where_sql = String::from(" WHERE is_active = 1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        where_sql.push_str(" AND department_id = ?");
        args.push(FilterValue::U64(department_id));
    }

    if let Some(position_id) = query.position_id {
        where_sql.push_str(" AND position_id = ?");
        args.push(FilterValue::U64(position_id));
    }

    if let Some(search) = &query.search {
        where_sql.push_str(" AND (first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like));
    }

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_query = match arg {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.clone()),
        };
    }

    let total = count_query
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count employees");
            ApiError::from(e)
        })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in args {
        data_query = match arg {
            FilterValue::U64(v) => data_query.bind(v),
            FilterValue::Str(s) => data_query.bind(s),
        };
    }

    let employees = data_query
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = path.into_inner();

    if auth.employee_id != Some(employee_id) {
        auth.require_approver()?;
    }

    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ? AND is_active = 1");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Employee with ID {} not found", employee_id))
        })?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Partial update. Email uniqueness is enforced by the database; a
/// duplicate surfaces as a conflict.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee with this email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", UPDATABLE_COLUMNS, &body, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.code() == Some("23000".into())) {
            ApiError::InvalidState("Employee with this email already exists".into())
        } else {
            error!(error = %e, employee_id, "Failed to update employee");
            ApiError::from(e)
        }
    })?;

    if affected == 0 {
        return Err(
            ApiError::NotFound(format!("Employee with ID {} not found", employee_id)).into(),
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Soft delete: flips `is_active` off; the row and its leave history stay.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let result = sqlx::query("UPDATE employees SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to deactivate employee");
            ApiError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(
            ApiError::NotFound(format!("Employee with ID {} not found", employee_id)).into(),
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deactivated"
    })))
}
