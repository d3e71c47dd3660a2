pub mod department;
pub mod employee;
pub mod leave_request;
pub mod position;
pub mod role;
pub mod user;
