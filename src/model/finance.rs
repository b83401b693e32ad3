use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FinanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = 50000.0)]
    pub amount: f64,
    #[schema(example = "salary", value_type = String)]
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub record_type: FinanceType,
    pub description: Option<String>,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "pending", value_type = String)]
    pub status: FinanceStatus,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub paid_at: Option<NaiveDateTime>,
    pub salary_slip_allocated: bool,
    pub created_by: Option<u64>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinanceType {
    Salary,
    Bonus,
    Deduction,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinanceStatus {
    Pending,
    Paid,
}
