use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::position::Position,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["title", "description", "base_salary", "is_active"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreatePosition {
    #[schema(example = "Software Engineer")]
    pub title: String,
    #[schema(example = "Builds and maintains backend services", nullable = true)]
    pub description: Option<String>,
    #[schema(example = 85000.0, nullable = true)]
    pub base_salary: Option<f64>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PositionHolder {
    pub id: u64,
    #[schema(example = "John Doe")]
    pub full_name: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct PositionStats {
    pub position: Position,
    #[schema(example = 4)]
    pub employee_count: i64,
    pub employees: Vec<PositionHolder>,
}

/// Create a position.
#[utoipa::path(
    post,
    path = "/api/v1/positions",
    request_body = CreatePosition,
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 409, description = "Position with this title already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn create_position(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePosition>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM positions WHERE title = ? LIMIT 1)",
    )
    .bind(&payload.title)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if exists {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Position with this title already exists"
        })));
    }

    let result =
        sqlx::query("INSERT INTO positions (title, description, base_salary) VALUES (?, ?, ?)")
            .bind(&payload.title)
            .bind(payload.description.as_deref())
            .bind(payload.base_salary)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create position");
                ApiError::from(e)
            })?;

    let position = sqlx::query_as::<_, Position>(
        "SELECT id, title, description, base_salary, is_active FROM positions WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(position))
}

/// Active positions ordered by title.
#[utoipa::path(
    get,
    path = "/api/v1/positions",
    responses(
        (status = 200, description = "Active positions", body = [Position])
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn list_positions(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<HttpResponse> {
    let positions = sqlx::query_as::<_, Position>(
        "SELECT id, title, description, base_salary, is_active FROM positions \
         WHERE is_active = 1 ORDER BY title",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(positions))
}

async fn fetch_position(pool: &MySqlPool, id: u64) -> Result<Position, ApiError> {
    sqlx::query_as::<_, Position>(
        "SELECT id, title, description, base_salary, is_active FROM positions \
         WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Position with ID {} not found", id)))
}

/// Get a position by ID.
#[utoipa::path(
    get,
    path = "/api/v1/positions/{position_id}",
    params(("position_id" = u64, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position found", body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn get_position(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let position = fetch_position(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(position))
}

/// Position head count and holder list.
#[utoipa::path(
    get,
    path = "/api/v1/positions/{position_id}/stats",
    params(("position_id" = u64, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position stats", body = PositionStats),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn position_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_approver()?;
    let position = fetch_position(pool.get_ref(), path.into_inner()).await?;

    let employees = sqlx::query_as::<_, PositionHolder>(
        r#"
        SELECT id, CONCAT(first_name, ' ', last_name) AS full_name, email
        FROM employees
        WHERE position_id = ? AND is_active = 1
        ORDER BY last_name, first_name
        "#,
    )
    .bind(position.id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(PositionStats {
        employee_count: employees.len() as i64,
        employees,
        position,
    }))
}

/// Partial update of a position.
#[utoipa::path(
    put,
    path = "/api/v1/positions/{position_id}",
    params(("position_id" = u64, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position updated"),
        (status = 404, description = "Position not found"),
        (status = 409, description = "Position with this title already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn update_position(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let position_id = path.into_inner();

    let update = build_update_sql("positions", UPDATABLE_COLUMNS, &body, "id", position_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.code() == Some("23000".into())) {
            ApiError::InvalidState("Position with this title already exists".into())
        } else {
            error!(error = %e, position_id, "Failed to update position");
            ApiError::from(e)
        }
    })?;

    if affected == 0 {
        return Err(
            ApiError::NotFound(format!("Position with ID {} not found", position_id)).into(),
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Position updated successfully"
    })))
}

/// Soft delete. Refused while employees still hold the position.
#[utoipa::path(
    delete,
    path = "/api/v1/positions/{position_id}",
    params(("position_id" = u64, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position deactivated"),
        (status = 404, description = "Position not found"),
        (status = 409, description = "Position still has employees")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn delete_position(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;
    let position = fetch_position(pool.get_ref(), path.into_inner()).await?;

    let holders = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employees WHERE position_id = ? AND is_active = 1",
    )
    .bind(position.id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if holders > 0 {
        return Err(ApiError::InvalidState(
            "Cannot delete position that has employees. Please reassign employees first.".into(),
        )
        .into());
    }

    sqlx::query("UPDATE positions SET is_active = 0 WHERE id = ?")
        .bind(position.id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Position deactivated"
    })))
}
