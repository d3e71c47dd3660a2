pub mod department;
pub mod employee;
pub mod leave;
pub mod position;
pub mod reports;
