use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;

use crate::api::dto::{
    CollectionsSummary, CostComparison, DashboardResponse, DashboardStats, MonthlyReportResponse,
    OpenAlert, SensorSnapshot,
};
use crate::api::errors::ApiError;
use crate::sensors::{CRITICAL_FILL_THRESHOLD, HIGH_FILL_THRESHOLD};

/// Fill level at or above which a sensor is shown as needing attention on the
/// dashboard (no alert is raised at this tier).
pub const ATTENTION_FILL_THRESHOLD: f64 = 70.0;

/// How many open alerts the dashboard shows.
const OPEN_ALERT_LIMIT: i64 = 10;

// Fixed business display values for the monthly report. The comparison is a
// static placeholder, not derived from collection data.
pub const TRADITIONAL_METHOD_COST: f64 = 800.0;
pub const SMART_SYSTEM_COST: f64 = 200.0;

/// Display tier derived from a sensor's current fill level. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Critical,
    Warning,
    Attention,
    Normal,
}

impl SensorStatus {
    pub fn from_fill_level(fill_level: f64) -> Self {
        if fill_level >= CRITICAL_FILL_THRESHOLD {
            Self::Critical
        } else if fill_level >= HIGH_FILL_THRESHOLD {
            Self::Warning
        } else if fill_level >= ATTENTION_FILL_THRESHOLD {
            Self::Attention
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    id: i64,
    sensor_code: String,
    location: String,
    fill_level: f64,
    battery_voltage: Option<f64>,
    recorded_at: DateTime<Utc>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// UTC bounds of the calendar month containing `now`: first instant of the
/// month (inclusive) and first instant of the next month (exclusive).
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first day of month is a valid timestamp");
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("first day of month is a valid timestamp");
    (start, end)
}

/// Summary statistics over a condominium's sensor snapshot. `avg_fill_level`
/// is absent, not zero, when no sensor has a reading.
pub fn compute_stats(
    snapshot: &[SensorSnapshot],
    total_sensors: i64,
    collections_this_month: i64,
) -> DashboardStats {
    let avg_fill_level = if snapshot.is_empty() {
        None
    } else {
        let sum: f64 = snapshot.iter().map(|s| s.fill_level).sum();
        Some(round1(sum / snapshot.len() as f64))
    };
    DashboardStats {
        total_sensors,
        avg_fill_level,
        sensors_need_collection: snapshot
            .iter()
            .filter(|s| s.fill_level >= HIGH_FILL_THRESHOLD)
            .count() as i64,
        critical_sensors: snapshot
            .iter()
            .filter(|s| s.fill_level >= CRITICAL_FILL_THRESHOLD)
            .count() as i64,
        collections_this_month,
    }
}

async fn ensure_condominium(pool: &PgPool, condominium_id: i64) -> Result<(), ApiError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM condominiums WHERE id = $1")
        .bind(condominium_id)
        .fetch_optional(pool)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!(
            "condominium {condominium_id} not found"
        ))),
    }
}

/// The dashboard payload: per-sensor snapshot, summary statistics, and the
/// newest open alerts.
pub async fn dashboard(pool: &PgPool, condominium_id: i64) -> Result<DashboardResponse, ApiError> {
    ensure_condominium(pool, condominium_id).await?;

    // Active sensors joined with their current (max-id) reading. Sensors with
    // no reading yet drop out of the join and out of the snapshot.
    let rows = sqlx::query_as::<_, SnapshotRow>(
        r#"
        SELECT s.id, s.sensor_code, s.location,
               l.fill_level, l.battery_voltage, l.recorded_at
        FROM sensors s
        JOIN (
            SELECT DISTINCT ON (sensor_id)
                sensor_id, fill_level, battery_voltage, recorded_at
            FROM sensor_readings
            ORDER BY sensor_id, id DESC
        ) l ON l.sensor_id = s.id
        WHERE s.condominium_id = $1 AND s.status = 'active'
        ORDER BY l.fill_level DESC
        "#,
    )
    .bind(condominium_id)
    .fetch_all(pool)
    .await?;

    let sensors: Vec<SensorSnapshot> = rows
        .into_iter()
        .map(|r| SensorSnapshot {
            status: SensorStatus::from_fill_level(r.fill_level),
            id: r.id,
            sensor_code: r.sensor_code,
            location: r.location,
            fill_level: r.fill_level,
            battery_voltage: r.battery_voltage,
            recorded_at: r.recorded_at,
        })
        .collect();

    let total_sensors: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sensors WHERE condominium_id = $1 AND status = 'active'",
    )
    .bind(condominium_id)
    .fetch_one(pool)
    .await?;

    let (month_start, month_end) = month_bounds(Utc::now());
    let collections_this_month: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM collections c
        JOIN sensors s ON s.id = c.sensor_id
        WHERE s.condominium_id = $1
          AND c.status = 'completed'
          AND c.collection_date >= $2
          AND c.collection_date < $3
        "#,
    )
    .bind(condominium_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_one(pool)
    .await?;

    let alerts = sqlx::query_as::<_, OpenAlert>(
        r#"
        SELECT a.id, a.alert_type, a.severity, a.message, a.created_at, s.location
        FROM alerts a
        JOIN sensors s ON s.id = a.sensor_id
        WHERE s.condominium_id = $1 AND NOT a.is_resolved
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $2
        "#,
    )
    .bind(condominium_id)
    .bind(OPEN_ALERT_LIMIT)
    .fetch_all(pool)
    .await?;

    let stats = compute_stats(&sensors, total_sensors, collections_this_month);

    Ok(DashboardResponse {
        sensors,
        stats,
        alerts,
    })
}

/// Completed collections for the current calendar month plus the fixed cost
/// comparison.
pub async fn monthly_report(
    pool: &PgPool,
    condominium_id: i64,
) -> Result<MonthlyReportResponse, ApiError> {
    ensure_condominium(pool, condominium_id).await?;

    let (month_start, month_end) = month_bounds(Utc::now());
    let collections = sqlx::query_as::<_, CollectionsSummary>(
        r#"
        SELECT COUNT(*)              AS total_collections,
               AVG(c.fill_level_before) AS avg_fill_level,
               SUM(c.cost)           AS total_cost
        FROM collections c
        JOIN sensors s ON s.id = c.sensor_id
        WHERE s.condominium_id = $1
          AND c.status = 'completed'
          AND c.collection_date >= $2
          AND c.collection_date < $3
        "#,
    )
    .bind(condominium_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_one(pool)
    .await?;

    Ok(MonthlyReportResponse {
        collections,
        costs: cost_comparison(),
    })
}

pub fn cost_comparison() -> CostComparison {
    let savings = TRADITIONAL_METHOD_COST - SMART_SYSTEM_COST;
    CostComparison {
        traditional: TRADITIONAL_METHOD_COST,
        smart_system: SMART_SYSTEM_COST,
        savings,
        savings_percentage: round1(savings / TRADITIONAL_METHOD_COST * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(levels: &[f64]) -> Vec<SensorSnapshot> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &fill_level)| SensorSnapshot {
                id: i as i64 + 1,
                sensor_code: format!("ST{i:03}"),
                location: format!("Block {i}"),
                fill_level,
                battery_voltage: None,
                recorded_at: Utc::now(),
                status: SensorStatus::from_fill_level(fill_level),
            })
            .collect()
    }

    #[test]
    fn status_tiers() {
        assert_eq!(SensorStatus::from_fill_level(95.0), SensorStatus::Critical);
        assert_eq!(SensorStatus::from_fill_level(94.9), SensorStatus::Warning);
        assert_eq!(SensorStatus::from_fill_level(85.0), SensorStatus::Warning);
        assert_eq!(SensorStatus::from_fill_level(84.9), SensorStatus::Attention);
        assert_eq!(SensorStatus::from_fill_level(70.0), SensorStatus::Attention);
        assert_eq!(SensorStatus::from_fill_level(69.9), SensorStatus::Normal);
        assert_eq!(SensorStatus::from_fill_level(0.0), SensorStatus::Normal);
    }

    #[test]
    fn stats_avg_absent_when_no_readings() {
        let stats = compute_stats(&[], 3, 0);
        assert_eq!(stats.total_sensors, 3);
        assert_eq!(stats.avg_fill_level, None);
        assert_eq!(stats.sensors_need_collection, 0);
        assert_eq!(stats.critical_sensors, 0);
    }

    #[test]
    fn stats_for_spec_scenario() {
        // Readings 80 / 92 / 97: two need collection, one critical.
        let stats = compute_stats(&snapshot(&[80.0, 92.0, 97.0]), 3, 0);
        assert_eq!(stats.sensors_need_collection, 2);
        assert_eq!(stats.critical_sensors, 1);
        assert_eq!(stats.avg_fill_level, Some(89.7));
    }

    #[test]
    fn avg_rounds_to_one_decimal() {
        let stats = compute_stats(&snapshot(&[33.0, 33.0, 34.0]), 3, 0);
        assert_eq!(stats.avg_fill_level, Some(33.3));
    }

    #[test]
    fn month_bounds_mid_year() {
        let now = Utc.with_ymd_and_hms(2025, 8, 14, 12, 30, 0).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_december_rolls_over() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn cost_comparison_is_the_fixed_placeholder() {
        let costs = cost_comparison();
        assert_eq!(costs.traditional, 800.0);
        assert_eq!(costs.smart_system, 200.0);
        assert_eq!(costs.savings, 600.0);
        assert_eq!(costs.savings_percentage, 75.0);
    }
}
