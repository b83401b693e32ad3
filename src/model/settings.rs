use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The singleton policy settings row. Handlers load it (through the moka
/// cache) and pass the values into the policy functions explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PolicySettings {
    pub id: u64,
    /// Late days per month not subject to deduction.
    #[schema(example = 3)]
    pub max_late_days: i64,
    /// Leave days deducted per late day above the allowance.
    #[schema(example = 1.0)]
    pub late_policy_deduction_per_day: f64,
    /// Leave type the deduction is charged against; unset disables the policy.
    pub late_policy_leave_type_id: Option<u64>,
    /// Time-of-day string: "19", "19:30" or "7:30 PM".
    #[schema(example = "7:30 PM")]
    pub auto_clock_out_time: Option<String>,
}
