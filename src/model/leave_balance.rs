use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Allotted vs. used leave days for one (employee, leave type, year).
///
/// Remaining = total_days - used_days. `used_days` is expected to stay within
/// `total_days` but no write path hard-enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 18.0)]
    pub total_days: f64,
    #[schema(example = 4.5)]
    pub used_days: f64,
}
