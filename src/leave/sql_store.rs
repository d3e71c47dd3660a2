use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::error::{ApiError, ApiResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

use super::engine::LeaveEngine;
use super::entitlement::Entitlements;
use super::store::{EmployeeDirectory, EmployeeSummary, LeaveQuery, LeaveStore, NewLeaveRequest};

const LEAVE_COLUMNS: &str = "id, employee_id, start_date, end_date, leave_type, status, reason, \
     approver_comments, approved_by, approved_at, created_at";

/// Employee lookups backed by the `employees` table.
#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn find_active_by_id(&self, id: u64) -> ApiResult<Option<EmployeeSummary>> {
        let summary = sqlx::query_as::<_, EmployeeSummary>(
            r#"
            SELECT id, CONCAT(first_name, ' ', last_name) AS full_name, email
            FROM employees
            WHERE id = ? AND is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Leave-request persistence backed by the `leave_requests` table.
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn insert(&self, new: &NewLeaveRequest) -> ApiResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, start_date, end_date, leave_type, status, reason)
            VALUES (?, ?, ?, ?, 'PENDING', ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.leave_type)
        .bind(new.reason.as_deref())
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_id())
            .await?
            .ok_or(ApiError::Database(sqlx::Error::RowNotFound))
    }

    async fn save(&self, record: &LeaveRequest) -> ApiResult<LeaveRequest> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approver_comments = ?, approved_by = ?, approved_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.status)
        .bind(record.approver_comments.as_deref())
        .bind(record.approved_by)
        .bind(record.approved_at)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(record.id)
            .await?
            .ok_or(ApiError::Database(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: u64) -> ApiResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        let record = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_many(&self, filter: &LeaveQuery) -> ApiResult<Vec<LeaveRequest>> {
        let mut where_sql = String::from(" WHERE 1=1");
        if filter.employee_id.is_some() {
            where_sql.push_str(" AND employee_id = ?");
        }
        if filter.status.is_some() {
            where_sql.push_str(" AND status = ?");
        }

        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests{where_sql} ORDER BY created_at DESC, id DESC"
        );

        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql);
        if let Some(employee_id) = filter.employee_id {
            query = query.bind(employee_id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Option<LeaveRequest>> {
        if statuses.is_empty() {
            return Ok(None);
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE employee_id = ? AND status IN ({placeholders}) \
             AND start_date <= ? AND end_date >= ? \
             LIMIT 1"
        );

        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql).bind(employee_id);
        for status in statuses {
            query = query.bind(*status);
        }
        let record = query
            .bind(end)
            .bind(start)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_approved_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> ApiResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE employee_id = ? AND status = 'APPROVED' AND YEAR(start_date) = ?"
        );
        let records = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}

/// The engine wired to its production collaborators.
pub type SqlLeaveEngine = LeaveEngine<MySqlEmployeeDirectory, MySqlLeaveStore>;

impl SqlLeaveEngine {
    pub fn from_pool(pool: MySqlPool, entitlements: Entitlements) -> Self {
        LeaveEngine::new(
            MySqlEmployeeDirectory::new(pool.clone()),
            MySqlLeaveStore::new(pool),
            entitlements,
        )
    }
}
