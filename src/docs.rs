use crate::api::attendance::{AttendanceFilter, AttendanceListResponse};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::finance::{AllocateSlips, CreateFinanceRecord, FinanceListResponse, FinanceQuery};
use crate::api::late_policy::{ApplyLatePolicy, ApplyLatePolicyForAll, PolicyOutcome};
use crate::api::leave_balance::{AllotLeave, Allotment, BalanceFilter, BalanceListResponse};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::finance::{FinanceRecord, FinanceStatus, FinanceType};
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_type::LeaveType;
use crate::model::leave_request::{HalfDayPeriod, LeaveRequest, LeaveStatus};
use crate::model::settings::PolicySettings;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRPulse API",
        version = "1.0.0",
        description = r#"
## HRPulse — attendance & leave accounting

HR backend covering daily attendance, leave management with per-type
balances, a configurable late policy, and finance records.

### Key Features
- **Attendance**
  - Clock-in / clock-out tracking with computed total hours
  - Automatic clock-out of unclosed records after a configurable cutoff
- **Leave Management**
  - Requests with half-day support, balance validation, approval workflow
  - Balance allotment per employee, leave type and year
- **Late Policy**
  - Incremental leave deductions for late days above a monthly allowance
- **Finance**
  - Salary / bonus / deduction records with payment tracking

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Sensitive operations require the **Admin** or **HR** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::attendance_list,
        crate::api::attendance::auto_clock_out,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::leave_balance::leave_type_list,
        crate::api::leave_balance::balance_list,
        crate::api::leave_balance::allot_leave,

        crate::api::late_policy::apply,
        crate::api::late_policy::apply_all,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::finance::create_record,
        crate::api::finance::list_records,
        crate::api::finance::mark_paid,
        crate::api::finance::allocate_slips
    ),
    components(
        schemas(
            Attendance,
            AttendanceStatus,
            AttendanceFilter,
            AttendanceListResponse,
            CreateLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveStatus,
            HalfDayPeriod,
            LeaveListResponse,
            LeaveBalance,
            LeaveType,
            BalanceFilter,
            BalanceListResponse,
            AllotLeave,
            Allotment,
            ApplyLatePolicy,
            ApplyLatePolicyForAll,
            PolicyOutcome,
            PolicySettings,
            CreateEmployee,
            Employee,
            EmployeeListResponse,
            CreateFinanceRecord,
            FinanceQuery,
            FinanceRecord,
            FinanceType,
            FinanceStatus,
            FinanceListResponse,
            AllocateSlips
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Late policy", description = "Late policy deduction APIs"),
        (name = "Settings", description = "Policy settings APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Finance", description = "Finance record APIs"),
    )
)]
pub struct ApiDoc;

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
