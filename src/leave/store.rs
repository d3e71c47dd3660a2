use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiResult;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

/// Fields of a leave request before it has been persisted. The engine fills
/// in status (always PENDING) and the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

/// Filter for the read helpers. Results are always ordered by creation
/// time, newest first.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
}

/// The slice of an employee the leave engine needs: identity plus the fact
/// that the record was active when looked up.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1000)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
}

/// Employee existence/active-status checks. The engine does not own
/// employee data; it only validates references through this trait.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_active_by_id(&self, id: u64) -> ApiResult<Option<EmployeeSummary>>;
}

/// Durable storage for leave requests.
///
/// `find_overlapping` is a contract, not a query language: given an
/// employee, a set of statuses and an inclusive date range, return any
/// stored request satisfying `existing.start <= end && existing.end >=
/// start`. The engine relies on exactly that predicate.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert(&self, new: &NewLeaveRequest) -> ApiResult<LeaveRequest>;

    /// Persists the mutable fields (status and approval columns) of an
    /// existing record and returns the stored row.
    async fn save(&self, record: &LeaveRequest) -> ApiResult<LeaveRequest>;

    async fn find_by_id(&self, id: u64) -> ApiResult<Option<LeaveRequest>>;

    async fn find_many(&self, filter: &LeaveQuery) -> ApiResult<Vec<LeaveRequest>>;

    async fn find_overlapping(
        &self,
        employee_id: u64,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Option<LeaveRequest>>;

    /// Approved requests whose start date falls in the given calendar year.
    async fn find_approved_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> ApiResult<Vec<LeaveRequest>>;
}
