use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per (employee, year, month) recording how far the late-policy
/// deduction has progressed. `last_deducted_late_count` never decreases
/// within a month; the row is only written when a deduction actually lands.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LateDeductionLog {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 5)]
    pub last_deducted_late_count: i64,
    #[schema(example = 2.0)]
    pub total_deducted: f64,
    pub leave_type_id: u64,
}
