//! The leave-request lifecycle and balance engine, together with its
//! collaborator contracts and their MySQL and in-memory implementations.

pub mod engine;
pub mod entitlement;
pub mod memory;
pub mod sql_store;
pub mod store;

pub use engine::{LeaveBalance, LeaveEngine, TypeBalance};
pub use entitlement::Entitlements;
pub use sql_store::SqlLeaveEngine;
pub use store::{EmployeeDirectory, EmployeeSummary, LeaveQuery, LeaveStore, NewLeaveRequest};
