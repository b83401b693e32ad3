use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::settings::PolicySettings;

/// The settings table holds a single row that almost every policy endpoint
/// reads. Cache it briefly so the sweep ticker and UI traffic do not hammer
/// the database; writes go through `invalidate`.
static SETTINGS_CACHE: Lazy<Cache<(), PolicySettings>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(30))
        .build()
});

const SETTINGS_SQL: &str = r#"
    SELECT id, max_late_days, late_policy_deduction_per_day,
           late_policy_leave_type_id, auto_clock_out_time
    FROM settings
    LIMIT 1
"#;

/// Current settings row, cached. `Ok(None)` means no settings row exists,
/// which callers treat as "not configured".
pub async fn get(pool: &MySqlPool) -> Result<Option<PolicySettings>, sqlx::Error> {
    if let Some(settings) = SETTINGS_CACHE.get(&()).await {
        return Ok(Some(settings));
    }

    let row = sqlx::query_as::<_, PolicySettings>(SETTINGS_SQL)
        .fetch_optional(pool)
        .await?;

    if let Some(ref settings) = row {
        SETTINGS_CACHE.insert((), settings.clone()).await;
    }
    Ok(row)
}

/// Drop the cached row after a settings update.
pub async fn invalidate() {
    SETTINGS_CACHE.invalidate(&()).await;
}

/// Prime the cache at startup so the first sweep tick does not pay the
/// database round-trip.
pub async fn warmup(pool: &MySqlPool) -> Result<()> {
    match get(pool).await? {
        Some(_) => log::info!("Settings cache warmup complete"),
        None => log::info!("Settings cache warmup: no settings row yet"),
    }
    Ok(())
}
