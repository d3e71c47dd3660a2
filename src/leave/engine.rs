use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

use super::entitlement::Entitlements;
use super::store::{EmployeeDirectory, EmployeeSummary, LeaveQuery, LeaveStore, NewLeaveRequest};

/// Per-type slice of a yearly balance.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TypeBalance {
    #[schema(example = 21)]
    pub entitled: i64,
    #[schema(example = 3)]
    pub used: i64,
    #[schema(example = 18)]
    pub remaining: i64,
}

/// Yearly leave balance for one employee, covering every entitlement key
/// whether or not any leave of that type was taken.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub employee: EmployeeSummary,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(value_type = Object)]
    pub balance: BTreeMap<LeaveType, TypeBalance>,
}

/// The leave-request lifecycle engine.
///
/// Validates creation against date and overlap rules, transitions request
/// status, and computes yearly balances. Collaborators are injected at
/// construction: an [`EmployeeDirectory`] for existence checks and a
/// [`LeaveStore`] for durable records. The engine never deletes records.
#[derive(Clone)]
pub struct LeaveEngine<D, S> {
    directory: D,
    store: S,
    entitlements: Entitlements,
}

impl<D: EmployeeDirectory, S: LeaveStore> LeaveEngine<D, S> {
    pub fn new(directory: D, store: S, entitlements: Entitlements) -> Self {
        Self {
            directory,
            store,
            entitlements,
        }
    }

    /// Validates and persists a new leave request in PENDING status.
    ///
    /// Validation order: employee exists and is active, date range is
    /// ordered, start date is not in the past, and no PENDING or APPROVED
    /// request of the same employee overlaps the range (inclusive bounds).
    /// The overlap check is read-then-write; the persistence layer's
    /// isolation is the only guard between two concurrent creates.
    pub async fn create(&self, new: NewLeaveRequest) -> ApiResult<LeaveRequest> {
        self.directory
            .find_active_by_id(new.employee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

        if new.start_date > new.end_date {
            return Err(ApiError::InvalidRequest(
                "Start date cannot be after end date".into(),
            ));
        }

        let today = Utc::now().date_naive();
        if new.start_date < today {
            return Err(ApiError::InvalidRequest(
                "Cannot request leave for past dates".into(),
            ));
        }

        let overlapping = self
            .store
            .find_overlapping(
                new.employee_id,
                &LeaveStatus::ACTIVE,
                new.start_date,
                new.end_date,
            )
            .await?;
        if overlapping.is_some() {
            return Err(ApiError::InvalidRequest(
                "Leave request overlaps with existing request".into(),
            ));
        }

        self.store.insert(&new).await
    }

    /// Decides a PENDING request. The target status is caller-supplied;
    /// only the *current* status is restricted.
    pub async fn update_status(
        &self,
        id: u64,
        new_status: LeaveStatus,
        comments: Option<String>,
        approver_id: u64,
    ) -> ApiResult<LeaveRequest> {
        let mut request = self.find_one(id).await?;

        if request.status != LeaveStatus::Pending {
            return Err(ApiError::InvalidState(
                "Can only update status of pending requests".into(),
            ));
        }

        request.status = new_status;
        request.approver_comments = Some(comments.unwrap_or_default());
        request.approved_by = Some(approver_id);
        request.approved_at = Some(Utc::now());

        self.store.save(&request).await
    }

    /// Self-service cancellation. Only the owning employee may cancel, and
    /// an APPROVED request can no longer be cancelled. Cancelling an
    /// already CANCELLED or REJECTED request succeeds and leaves the
    /// status at CANCELLED.
    pub async fn cancel(&self, id: u64, requesting_employee_id: u64) -> ApiResult<LeaveRequest> {
        let mut request = self.find_one(id).await?;

        if request.employee_id != requesting_employee_id {
            return Err(ApiError::Forbidden(
                "You can only cancel your own leave requests".into(),
            ));
        }

        if request.status == LeaveStatus::Approved {
            return Err(ApiError::InvalidState(
                "Cannot cancel approved leave request".into(),
            ));
        }

        request.status = LeaveStatus::Cancelled;
        self.store.save(&request).await
    }

    /// Yearly balance: entitlement minus the day counts of APPROVED
    /// requests whose start date falls in `year` (default: current year).
    /// Every entitlement key appears in the output, with `used = 0` when
    /// nothing of that type was approved.
    pub async fn leave_balance(
        &self,
        employee_id: u64,
        year: Option<i32>,
    ) -> ApiResult<LeaveBalance> {
        let employee = self
            .directory
            .find_active_by_id(employee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

        let year = year.unwrap_or_else(|| Utc::now().year());
        let approved = self.store.find_approved_in_year(employee_id, year).await?;

        let mut used: BTreeMap<LeaveType, i64> = BTreeMap::new();
        for request in &approved {
            *used.entry(request.leave_type).or_insert(0) += request.number_of_days();
        }

        let balance = self
            .entitlements
            .iter()
            .map(|(leave_type, entitled)| {
                let used = used.get(&leave_type).copied().unwrap_or(0);
                (
                    leave_type,
                    TypeBalance {
                        entitled,
                        used,
                        remaining: entitled - used,
                    },
                )
            })
            .collect();

        Ok(LeaveBalance {
            employee,
            year,
            balance,
        })
    }

    pub async fn list(&self, filter: &LeaveQuery) -> ApiResult<Vec<LeaveRequest>> {
        self.store.find_many(filter).await
    }

    pub async fn find_all(&self) -> ApiResult<Vec<LeaveRequest>> {
        self.list(&LeaveQuery::default()).await
    }

    pub async fn find_by_employee(&self, employee_id: u64) -> ApiResult<Vec<LeaveRequest>> {
        self.list(&LeaveQuery {
            employee_id: Some(employee_id),
            ..Default::default()
        })
        .await
    }

    pub async fn find_one(&self, id: u64) -> ApiResult<LeaveRequest> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Leave request with ID {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::memory::{MemoryDirectory, MemoryLeaveStore};
    use chrono::{Duration, NaiveDate};

    const ALICE: u64 = 1;
    const BOB: u64 = 2;
    const APPROVER: u64 = 77;

    fn engine() -> LeaveEngine<MemoryDirectory, MemoryLeaveStore> {
        let directory = MemoryDirectory::default();
        directory.insert(
            EmployeeSummary {
                id: ALICE,
                full_name: "Alice Rahman".into(),
                email: "alice@company.com".into(),
            },
            true,
        );
        directory.insert(
            EmployeeSummary {
                id: BOB,
                full_name: "Bob Karim".into(),
                email: "bob@company.com".into(),
            },
            true,
        );
        // Carol exists but has been deactivated.
        directory.insert(
            EmployeeSummary {
                id: 3,
                full_name: "Carol Das".into(),
                email: "carol@company.com".into(),
            },
            false,
        );
        LeaveEngine::new(directory, MemoryLeaveStore::default(), Entitlements::default())
    }

    fn in_days(n: i64) -> NaiveDate {
        Utc::now().date_naive() + Duration::days(n)
    }

    // Always in the future and never straddling a year boundary, which the
    // balance tests rely on.
    fn next_year_day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(Utc::now().year() + 1, 3, 1).unwrap() + Duration::days(n as i64)
    }

    fn new_request(employee_id: u64, start: NaiveDate, end: NaiveDate) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            start_date: start,
            end_date: end,
            leave_type: LeaveType::Annual,
            reason: None,
        }
    }

    #[actix_web::test]
    async fn create_persists_pending_request() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        assert_eq!(created.status, LeaveStatus::Pending);
        assert_eq!(created.employee_id, ALICE);
        assert_eq!(created.number_of_days(), 3);
        assert!(created.approver_comments.is_none());
        assert!(created.approved_by.is_none());
        assert!(created.approved_at.is_none());
    }

    #[actix_web::test]
    async fn create_rejects_unknown_employee() {
        let engine = engine();
        let err = engine
            .create(new_request(999, in_days(10), in_days(12)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn create_rejects_inactive_employee() {
        let engine = engine();
        let err = engine
            .create(new_request(3, in_days(10), in_days(12)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn create_rejects_reversed_date_range() {
        let engine = engine();
        let err = engine
            .create(new_request(ALICE, in_days(12), in_days(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[actix_web::test]
    async fn create_rejects_past_start_date() {
        let engine = engine();
        let err = engine
            .create(new_request(ALICE, in_days(-1), in_days(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[actix_web::test]
    async fn create_accepts_request_starting_today() {
        let engine = engine();
        assert!(engine
            .create(new_request(ALICE, in_days(0), in_days(1)))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn create_rejects_overlap_with_pending_request() {
        let engine = engine();
        engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();

        // Shares the boundary day with the existing request.
        let err = engine
            .create(new_request(ALICE, in_days(14), in_days(16)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[actix_web::test]
    async fn create_rejects_overlap_with_approved_request() {
        let engine = engine();
        let first = engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();
        engine
            .update_status(first.id, LeaveStatus::Approved, None, APPROVER)
            .await
            .unwrap();

        let err = engine
            .create(new_request(ALICE, in_days(12), in_days(13)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[actix_web::test]
    async fn adjacent_requests_do_not_overlap() {
        let engine = engine();
        engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();
        assert!(engine
            .create(new_request(ALICE, in_days(15), in_days(16)))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn rejected_and_cancelled_requests_do_not_block_overlap() {
        let engine = engine();
        let first = engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();
        engine
            .update_status(first.id, LeaveStatus::Rejected, None, APPROVER)
            .await
            .unwrap();

        let second = engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();
        engine.cancel(second.id, ALICE).await.unwrap();

        assert!(engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn overlap_is_scoped_per_employee() {
        let engine = engine();
        engine
            .create(new_request(ALICE, in_days(10), in_days(14)))
            .await
            .unwrap();
        assert!(engine
            .create(new_request(BOB, in_days(10), in_days(14)))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn update_status_approves_and_stamps_approval_fields() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        let approved = engine
            .update_status(
                created.id,
                LeaveStatus::Approved,
                Some("Enjoy".into()),
                APPROVER,
            )
            .await
            .unwrap();

        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approver_comments.as_deref(), Some("Enjoy"));
        assert_eq!(approved.approved_by, Some(APPROVER));
        assert!(approved.approved_at.is_some());
    }

    #[actix_web::test]
    async fn update_status_defaults_comments_to_empty_string() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        let rejected = engine
            .update_status(created.id, LeaveStatus::Rejected, None, APPROVER)
            .await
            .unwrap();
        assert_eq!(rejected.approver_comments.as_deref(), Some(""));
    }

    #[actix_web::test]
    async fn update_status_fails_on_missing_request() {
        let engine = engine();
        let err = engine
            .update_status(404, LeaveStatus::Approved, None, APPROVER)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn update_status_only_acts_on_pending_requests() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();
        engine
            .update_status(created.id, LeaveStatus::Approved, None, APPROVER)
            .await
            .unwrap();

        // A second decision must fail and leave the record unchanged.
        let err = engine
            .update_status(created.id, LeaveStatus::Rejected, Some("flip".into()), 88)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));

        let stored = engine.find_one(created.id).await.unwrap();
        assert_eq!(stored.status, LeaveStatus::Approved);
        assert_eq!(stored.approved_by, Some(APPROVER));
    }

    #[actix_web::test]
    async fn cancel_by_owner_cancels_pending_request() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        let cancelled = engine.cancel(created.id, ALICE).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    }

    #[actix_web::test]
    async fn cancel_by_non_owner_is_forbidden() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        let err = engine.cancel(created.id, BOB).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        // Ownership is checked before state, so the record is untouched.
        let stored = engine.find_one(created.id).await.unwrap();
        assert_eq!(stored.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn cancel_of_approved_request_is_rejected() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();
        engine
            .update_status(created.id, LeaveStatus::Approved, None, APPROVER)
            .await
            .unwrap();

        let err = engine.cancel(created.id, ALICE).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn repeated_cancel_is_idempotent() {
        let engine = engine();
        let created = engine
            .create(new_request(ALICE, in_days(10), in_days(12)))
            .await
            .unwrap();

        engine.cancel(created.id, ALICE).await.unwrap();
        let again = engine.cancel(created.id, ALICE).await.unwrap();
        assert_eq!(again.status, LeaveStatus::Cancelled);
    }

    #[actix_web::test]
    async fn cancel_of_missing_request_is_not_found() {
        let engine = engine();
        let err = engine.cancel(404, ALICE).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn balance_with_no_usage_returns_full_entitlements() {
        let engine = engine();
        let balance = engine.leave_balance(ALICE, Some(2026)).await.unwrap();

        assert_eq!(balance.year, 2026);
        assert_eq!(balance.employee.id, ALICE);
        assert_eq!(balance.balance.len(), 6);
        for (leave_type, slice) in &balance.balance {
            assert_eq!(slice.used, 0, "{leave_type} should be unused");
            assert_eq!(slice.remaining, slice.entitled);
        }
        assert_eq!(balance.balance[&LeaveType::Annual].entitled, 21);
        assert_eq!(balance.balance[&LeaveType::Maternity].entitled, 90);
    }

    #[actix_web::test]
    async fn balance_counts_only_approved_requests_in_year() {
        let engine = engine();
        let year = next_year_day(0).year();

        let approved = engine
            .create(new_request(ALICE, next_year_day(10), next_year_day(12)))
            .await
            .unwrap();
        engine
            .update_status(approved.id, LeaveStatus::Approved, None, APPROVER)
            .await
            .unwrap();

        // Still pending: must not count.
        engine
            .create(new_request(ALICE, next_year_day(20), next_year_day(21)))
            .await
            .unwrap();

        // Rejected: must not count.
        let rejected = engine
            .create(new_request(ALICE, next_year_day(30), next_year_day(33)))
            .await
            .unwrap();
        engine
            .update_status(rejected.id, LeaveStatus::Rejected, None, APPROVER)
            .await
            .unwrap();

        let balance = engine.leave_balance(ALICE, Some(year)).await.unwrap();
        let annual = &balance.balance[&LeaveType::Annual];
        assert_eq!(annual.used, 3);
        assert_eq!(annual.remaining, 18);

        // A different year sees no usage at all.
        let other = engine.leave_balance(ALICE, Some(year - 1)).await.unwrap();
        assert_eq!(other.balance[&LeaveType::Annual].used, 0);
    }

    #[actix_web::test]
    async fn balance_sums_multiple_types_independently() {
        let engine = engine();
        let year = next_year_day(0).year();

        for (start, end, leave_type) in [
            (10, 12, LeaveType::Annual),
            (20, 20, LeaveType::Sick),
            (30, 31, LeaveType::Sick),
        ] {
            let created = engine
                .create(NewLeaveRequest {
                    employee_id: ALICE,
                    start_date: next_year_day(start),
                    end_date: next_year_day(end),
                    leave_type,
                    reason: None,
                })
                .await
                .unwrap();
            engine
                .update_status(created.id, LeaveStatus::Approved, None, APPROVER)
                .await
                .unwrap();
        }

        let balance = engine.leave_balance(ALICE, Some(year)).await.unwrap();
        assert_eq!(balance.balance[&LeaveType::Annual].used, 3);
        assert_eq!(balance.balance[&LeaveType::Sick].used, 3);
        assert_eq!(balance.balance[&LeaveType::Sick].remaining, 7);
        assert_eq!(balance.balance[&LeaveType::Personal].used, 0);
    }

    #[actix_web::test]
    async fn balance_for_unknown_employee_is_not_found() {
        let engine = engine();
        let err = engine.leave_balance(999, None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn find_helpers_filter_and_order() {
        let engine = engine();
        let first = engine
            .create(new_request(ALICE, in_days(10), in_days(11)))
            .await
            .unwrap();
        let second = engine
            .create(new_request(ALICE, in_days(20), in_days(21)))
            .await
            .unwrap();
        engine
            .create(new_request(BOB, in_days(10), in_days(11)))
            .await
            .unwrap();

        let all = engine.find_all().await.unwrap();
        assert_eq!(all.len(), 3);

        let alices = engine.find_by_employee(ALICE).await.unwrap();
        assert_eq!(alices.len(), 2);
        // Newest first.
        assert_eq!(alices[0].id, second.id);
        assert_eq!(alices[1].id, first.id);

        let err = engine.find_one(404).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
