//! In-memory collaborators backing the engine test suites. They apply the
//! same predicates as the SQL store so lifecycle behavior can be exercised
//! without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};

use crate::error::ApiResult;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

use super::store::{EmployeeDirectory, EmployeeSummary, LeaveQuery, LeaveStore, NewLeaveRequest};

#[derive(Default)]
pub struct MemoryDirectory {
    employees: Mutex<HashMap<u64, (EmployeeSummary, bool)>>,
}

impl MemoryDirectory {
    pub fn insert(&self, employee: EmployeeSummary, active: bool) {
        self.employees
            .lock()
            .unwrap()
            .insert(employee.id, (employee, active));
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryDirectory {
    async fn find_active_by_id(&self, id: u64) -> ApiResult<Option<EmployeeSummary>> {
        let employees = self.employees.lock().unwrap();
        Ok(employees
            .get(&id)
            .filter(|(_, active)| *active)
            .map(|(summary, _)| summary.clone()))
    }
}

#[derive(Default)]
struct Records {
    next_id: u64,
    by_id: BTreeMap<u64, LeaveRequest>,
}

#[derive(Default)]
pub struct MemoryLeaveStore {
    records: Mutex<Records>,
}

impl MemoryLeaveStore {
    fn matches(record: &LeaveRequest, filter: &LeaveQuery) -> bool {
        filter
            .employee_id
            .is_none_or(|id| record.employee_id == id)
            && filter.status.is_none_or(|status| record.status == status)
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn insert(&self, new: &NewLeaveRequest) -> ApiResult<LeaveRequest> {
        let mut records = self.records.lock().unwrap();
        records.next_id += 1;
        let record = LeaveRequest {
            id: records.next_id,
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date,
            leave_type: new.leave_type,
            status: LeaveStatus::Pending,
            reason: new.reason.clone(),
            approver_comments: None,
            approved_by: None,
            approved_at: None,
            created_at: Some(Utc::now()),
        };
        records.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save(&self, record: &LeaveRequest) -> ApiResult<LeaveRequest> {
        let mut records = self.records.lock().unwrap();
        records.by_id.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: u64) -> ApiResult<Option<LeaveRequest>> {
        Ok(self.records.lock().unwrap().by_id.get(&id).cloned())
    }

    async fn find_many(&self, filter: &LeaveQuery) -> ApiResult<Vec<LeaveRequest>> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<LeaveRequest> = records
            .by_id
            .values()
            .filter(|r| Self::matches(r, filter))
            .cloned()
            .collect();
        // Newest first; ids break creation-time ties.
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(matching)
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Option<LeaveRequest>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .by_id
            .values()
            .find(|r| {
                r.employee_id == employee_id
                    && statuses.contains(&r.status)
                    && r.overlaps(start, end)
            })
            .cloned())
    }

    async fn find_approved_in_year(
        &self,
        employee_id: u64,
        year: i32,
    ) -> ApiResult<Vec<LeaveRequest>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .by_id
            .values()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.status == LeaveStatus::Approved
                    && r.start_date.year() == year
            })
            .cloned()
            .collect())
    }
}
