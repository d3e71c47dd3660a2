use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::department::Department,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["name", "description", "is_active"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Product engineering teams", nullable = true)]
    pub description: Option<String>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentMember {
    pub id: u64,
    #[schema(example = "John Doe")]
    pub full_name: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentStats {
    pub department: Department,
    #[schema(example = 12)]
    pub employee_count: i64,
    pub employees: Vec<DepartmentMember>,
}

/// Create a department.
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Department with this name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM departments WHERE name = ? LIMIT 1)",
    )
    .bind(&payload.name)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if exists {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Department with this name already exists"
        })));
    }

    let result = sqlx::query("INSERT INTO departments (name, description) VALUES (?, ?)")
        .bind(&payload.name)
        .bind(payload.description.as_deref())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create department");
            ApiError::from(e)
        })?;

    let department = sqlx::query_as::<_, Department>(
        "SELECT id, name, description, is_active FROM departments WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(department))
}

/// Active departments ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Active departments", body = [Department])
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<HttpResponse> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name, description, is_active FROM departments WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(departments))
}

async fn fetch_department(pool: &MySqlPool, id: u64) -> Result<Department, ApiError> {
    sqlx::query_as::<_, Department>(
        "SELECT id, name, description, is_active FROM departments WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Department with ID {} not found", id)))
}

/// Get a department by ID.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn get_department(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let department = fetch_department(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(department))
}

/// Department head count and member list.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}/stats",
    params(("department_id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department stats", body = DepartmentStats),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn department_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;
    let department = fetch_department(pool.get_ref(), path.into_inner()).await?;

    let employees = sqlx::query_as::<_, DepartmentMember>(
        r#"
        SELECT id, CONCAT(first_name, ' ', last_name) AS full_name, email
        FROM employees
        WHERE department_id = ? AND is_active = 1
        ORDER BY last_name, first_name
        "#,
    )
    .bind(department.id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(DepartmentStats {
        employee_count: employees.len() as i64,
        employees,
        department,
    }))
}

/// Partial update of a department.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department with this name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let department_id = path.into_inner();

    let update = build_update_sql("departments", UPDATABLE_COLUMNS, &body, "id", department_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.code() == Some("23000".into())) {
            ApiError::InvalidState("Department with this name already exists".into())
        } else {
            error!(error = %e, department_id, "Failed to update department");
            ApiError::from(e)
        }
    })?;

    if affected == 0 {
        return Err(
            ApiError::NotFound(format!("Department with ID {} not found", department_id)).into(),
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated successfully"
    })))
}

/// Soft delete. Refused while the department still has active employees.
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deactivated"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has employees")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let department = fetch_department(pool.get_ref(), path.into_inner()).await?;

    let members = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employees WHERE department_id = ? AND is_active = 1",
    )
    .bind(department.id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if members > 0 {
        return Err(ApiError::InvalidState(
            "Cannot delete department that has employees. Please reassign employees first.".into(),
        )
        .into());
    }

    sqlx::query("UPDATE departments SET is_active = 0 WHERE id = ?")
        .bind(department.id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deactivated"
    })))
}
