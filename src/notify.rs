use chrono::NaiveDate;
use serde::Serialize;

use crate::model::leave_request::LeaveStatus;

/// Payload posted to the notification webhook. Delivery is best-effort: the
/// send runs on a detached task and a failure is only logged, so it can never
/// affect the operation that triggered it.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeaveNotification {
    StatusUpdate {
        employee_email: String,
        employee_name: String,
        leave_type_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: LeaveStatus,
    },
    NewRequest {
        employee_name: String,
        leave_type_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Fire-and-forget dispatch. Returns immediately.
pub fn dispatch(webhook_url: Option<String>, notification: LeaveNotification) {
    actix_web::rt::spawn(async move {
        let Some(url) = webhook_url else {
            tracing::debug!("Leave notification webhook not configured; dropping notification");
            return;
        };

        if let Err(e) = deliver(&url, &notification).await {
            tracing::warn!(error = %e, "Leave notification failed");
        }
    });
}

async fn deliver(url: &str, notification: &LeaveNotification) -> reqwest::Result<()> {
    reqwest::Client::new()
        .post(url)
        .json(notification)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
