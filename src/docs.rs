use crate::api::department::{CreateDepartment, DepartmentMember, DepartmentStats};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::leave::{CreateLeave, LeaveFilter, UpdateLeaveStatus};
use crate::api::position::{CreatePosition, PositionHolder, PositionStats};
use crate::leave::{EmployeeSummary, LeaveBalance, TypeBalance};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::position::Position;
use crate::models::{LoginReq, RegisterReq};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

This API manages core HR operations within an organization.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Department & Position Management**
  - Organizational structure with head counts and stats
- **Leave Management**
  - Apply for leave, approve/reject requests, cancel your own, and view
    yearly balances per leave type
- **Reports**
  - Dashboard counts, employee summaries, and leave activity

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::department_stats,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::position::create_position,
        crate::api::position::list_positions,
        crate::api::position::get_position,
        crate::api::position::position_stats,
        crate::api::position::update_position,
        crate::api::position::delete_position,

        crate::api::leave::create_leave,
        crate::api::leave::leave_list,
        crate::api::leave::employee_leaves,
        crate::api::leave::leave_balance,
        crate::api::leave::get_leave,
        crate::api::leave::update_leave_status,
        crate::api::leave::cancel_leave,

        crate::api::reports::dashboard,
        crate::api::reports::employee_summary,
        crate::api::reports::leave_summary,
    ),
    components(
        schemas(
            RegisterReq,
            LoginReq,
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            DepartmentMember,
            DepartmentStats,
            Position,
            CreatePosition,
            PositionHolder,
            PositionStats,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            CreateLeave,
            UpdateLeaveStatus,
            LeaveFilter,
            EmployeeSummary,
            LeaveBalance,
            TypeBalance,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Position", description = "Position management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Reports", description = "Reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
