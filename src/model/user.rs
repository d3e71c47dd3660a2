use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    /// Present only if this user is linked to an employee record.
    pub employee_id: Option<u64>,
    pub is_active: bool,
}
