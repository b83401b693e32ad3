use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    pub id: u64,
    #[schema(example = "Annual Leave")]
    pub name: String,
    /// Days seeded into a balance when one is created implicitly.
    #[schema(example = 18.0)]
    pub default_days: f64,
    pub is_active: bool,
}
