//! End-to-end lifecycle runs against the in-memory collaborators: the
//! same engine wiring the HTTP layer uses, minus the database.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use hrms::error::ApiError;
use hrms::leave::memory::{MemoryDirectory, MemoryLeaveStore};
use hrms::leave::{EmployeeSummary, Entitlements, LeaveEngine, LeaveQuery, NewLeaveRequest};
use hrms::model::leave_request::{LeaveStatus, LeaveType};

const EMPLOYEE: u64 = 1000;
const COWORKER: u64 = 1001;
const APPROVER_USER: u64 = 7;

fn engine() -> LeaveEngine<MemoryDirectory, MemoryLeaveStore> {
    let directory = MemoryDirectory::default();
    directory.insert(
        EmployeeSummary {
            id: EMPLOYEE,
            full_name: "Nadia Islam".into(),
            email: "nadia@company.com".into(),
        },
        true,
    );
    directory.insert(
        EmployeeSummary {
            id: COWORKER,
            full_name: "Rafiq Ahmed".into(),
            email: "rafiq@company.com".into(),
        },
        true,
    );
    LeaveEngine::new(directory, MemoryLeaveStore::default(), Entitlements::default())
}

// March of next year keeps every date in the future and inside one year.
fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(Utc::now().year() + 1, 3, 1).unwrap() + Duration::days(n as i64)
}

#[actix_web::test]
async fn request_approval_and_balance_flow() {
    let engine = engine();

    let request = engine
        .create(NewLeaveRequest {
            employee_id: EMPLOYEE,
            start_date: day(7),
            end_date: day(11),
            leave_type: LeaveType::Annual,
            reason: Some("Family trip".into()),
        })
        .await
        .unwrap();
    assert_eq!(request.status, LeaveStatus::Pending);
    assert_eq!(request.number_of_days(), 5);

    // While the request is open, the overlapping window is blocked.
    let err = engine
        .create(NewLeaveRequest {
            employee_id: EMPLOYEE,
            start_date: day(11),
            end_date: day(12),
            leave_type: LeaveType::Sick,
            reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));

    let approved = engine
        .update_status(
            request.id,
            LeaveStatus::Approved,
            Some("Have fun".into()),
            APPROVER_USER,
        )
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approved_by, Some(APPROVER_USER));

    // Approval consumes the annual allowance for that year.
    let balance = engine
        .leave_balance(EMPLOYEE, Some(day(0).year()))
        .await
        .unwrap();
    let annual = &balance.balance[&LeaveType::Annual];
    assert_eq!(annual.entitled, 21);
    assert_eq!(annual.used, 5);
    assert_eq!(annual.remaining, 16);

    // An approved request can no longer be cancelled by its owner.
    let err = engine.cancel(request.id, EMPLOYEE).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidState(_)));
}

#[actix_web::test]
async fn cancellation_frees_the_window_and_balance() {
    let engine = engine();

    let request = engine
        .create(NewLeaveRequest {
            employee_id: EMPLOYEE,
            start_date: day(3),
            end_date: day(5),
            leave_type: LeaveType::Personal,
            reason: None,
        })
        .await
        .unwrap();

    // A coworker cannot cancel it.
    let err = engine.cancel(request.id, COWORKER).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let cancelled = engine.cancel(request.id, EMPLOYEE).await.unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);

    // The window opens up again and the balance is untouched.
    assert!(
        engine
            .create(NewLeaveRequest {
                employee_id: EMPLOYEE,
                start_date: day(3),
                end_date: day(5),
                leave_type: LeaveType::Personal,
                reason: None,
            })
            .await
            .is_ok()
    );
    let balance = engine
        .leave_balance(EMPLOYEE, Some(day(0).year()))
        .await
        .unwrap();
    assert_eq!(balance.balance[&LeaveType::Personal].used, 0);
}

#[actix_web::test]
async fn listing_serves_both_the_owner_and_approver_views() {
    let engine = engine();

    for (employee_id, start, end) in [
        (EMPLOYEE, 1, 2),
        (EMPLOYEE, 10, 12),
        (COWORKER, 1, 2),
    ] {
        engine
            .create(NewLeaveRequest {
                employee_id,
                start_date: day(start),
                end_date: day(end),
                leave_type: LeaveType::Annual,
                reason: None,
            })
            .await
            .unwrap();
    }

    let everything = engine.find_all().await.unwrap();
    assert_eq!(everything.len(), 3);

    let own = engine.find_by_employee(EMPLOYEE).await.unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|r| r.employee_id == EMPLOYEE));

    let pending = engine
        .list(&LeaveQuery {
            employee_id: None,
            status: Some(LeaveStatus::Pending),
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);
}
