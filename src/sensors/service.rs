use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::api::dto::{ContainerDto, ReadingPoint, RecordReadingRequest};
use crate::api::errors::ApiError;
use crate::db::models::AlertSeverity;
use crate::validation::ValidContainer;

/// Fill level at or above which a `critical` alert is raised and the sensor
/// is shown as critical.
pub const CRITICAL_FILL_THRESHOLD: f64 = 95.0;
/// Fill level at or above which a `high` alert is raised (container needs
/// collection).
pub const HIGH_FILL_THRESHOLD: f64 = 85.0;

pub const DEFAULT_HISTORY_DAYS: i64 = 7;
pub const MAX_HISTORY_DAYS: i64 = 365;

/// The alerting rule: which alert, if any, a fill level triggers.
///
/// Every qualifying reading produces a fresh alert row — there is no
/// deduplication against already-open alerts for the same sensor.
pub fn alert_for_level(fill_level: f64) -> Option<(AlertSeverity, String)> {
    if fill_level >= CRITICAL_FILL_THRESHOLD {
        Some((
            AlertSeverity::Critical,
            format!("Container critical! Fill level: {fill_level}%"),
        ))
    } else if fill_level >= HIGH_FILL_THRESHOLD {
        Some((
            AlertSeverity::High,
            format!("Container needs collection. Fill level: {fill_level}%"),
        ))
    } else {
        None
    }
}

/// Inserts a reading and, when the fill level crosses a threshold, the
/// matching alert, in one transaction. Returns the new reading id.
pub async fn record_reading(pool: &PgPool, req: &RecordReadingRequest) -> Result<i64, ApiError> {
    if !(0.0..=100.0).contains(&req.fill_level) {
        return Err(ApiError::Validation(
            "fill_level must be between 0 and 100".into(),
        ));
    }

    let sensor: Option<i64> = sqlx::query_scalar("SELECT id FROM sensors WHERE id = $1")
        .bind(req.sensor_id)
        .fetch_optional(pool)
        .await?;
    if sensor.is_none() {
        return Err(ApiError::NotFound(format!(
            "sensor {} not found",
            req.sensor_id
        )));
    }

    let mut tx = pool.begin().await?;

    let reading_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sensor_readings
            (sensor_id, fill_level, temperature, humidity, battery_voltage, signal_strength)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(req.sensor_id)
    .bind(req.fill_level)
    .bind(req.temperature)
    .bind(req.humidity)
    .bind(req.battery_voltage)
    .bind(req.signal_strength)
    .fetch_one(&mut *tx)
    .await?;

    if let Some((severity, message)) = alert_for_level(req.fill_level) {
        sqlx::query(
            r#"
            INSERT INTO alerts (sensor_id, alert_type, severity, message)
            VALUES ($1, 'high_level', $2, $3)
            "#,
        )
        .bind(req.sensor_id)
        .bind(severity)
        .bind(&message)
        .execute(&mut *tx)
        .await?;
        info!(sensor_id = req.sensor_id, severity = ?severity, "alert raised");
    }

    tx.commit().await?;
    Ok(reading_id)
}

pub async fn create_container(pool: &PgPool, container: &ValidContainer<'_>) -> Result<i64, ApiError> {
    let condo: Option<i64> = sqlx::query_scalar("SELECT id FROM condominiums WHERE id = $1")
        .bind(container.condominium_id)
        .fetch_optional(pool)
        .await?;
    if condo.is_none() {
        return Err(ApiError::NotFound(format!(
            "condominium {} not found",
            container.condominium_id
        )));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sensors (sensor_code, condominium_id, location, waste_type)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(container.sensor_code)
    .bind(container.condominium_id)
    .bind(container.location)
    .bind(container.waste_type)
    .fetch_one(pool)
    .await?;
    info!(container_id = id, sensor_code = %container.sensor_code, "container created");
    Ok(id)
}

/// Every sensor joined with its current reading, ordered by location.
/// Sensors that have never reported are omitted.
pub async fn list_containers(pool: &PgPool) -> Result<Vec<ContainerDto>, ApiError> {
    let rows = sqlx::query_as::<_, ContainerDto>(
        r#"
        SELECT s.id,
               s.sensor_code,
               s.location,
               s.waste_type,
               s.installation_date,
               s.status,
               l.fill_level,
               l.battery_voltage,
               l.recorded_at
        FROM sensors s
        JOIN (
            SELECT DISTINCT ON (sensor_id)
                sensor_id, fill_level, battery_voltage, recorded_at
            FROM sensor_readings
            ORDER BY sensor_id, id DESC
        ) l ON l.sensor_id = s.id
        ORDER BY s.location
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Start of a `days`-long history window ending now. `days` comes straight
/// from a query parameter and must be bounded before it reaches
/// `Duration::days`, which panics on extreme values.
fn history_since(days: i64) -> Result<DateTime<Utc>, ApiError> {
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }
    Ok(Utc::now() - Duration::days(days))
}

/// Time-windowed reading history for one sensor, oldest first. The window is
/// computed here and passed as a bound timestamp.
pub async fn reading_history(
    pool: &PgPool,
    sensor_id: i64,
    days: i64,
) -> Result<Vec<ReadingPoint>, ApiError> {
    let since = history_since(days)?;
    let rows = sqlx::query_as::<_, ReadingPoint>(
        r#"
        SELECT fill_level, temperature, humidity, battery_voltage, recorded_at
        FROM sensor_readings
        WHERE sensor_id = $1
          AND recorded_at >= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(sensor_id)
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Marks an alert resolved. Re-resolving an already-resolved alert succeeds
/// and refreshes `resolved_at`; the resolved flag never flips back.
pub async fn resolve_alert(pool: &PgPool, alert_id: i64) -> Result<(), ApiError> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE alerts
        SET is_resolved = TRUE, resolved_at = now()
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(alert_id)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!("alert {alert_id} not found"))),
    }
}
