//! Demo utility that fabricates plausible telemetry for every active sensor.
//! Kept outside the ingestion path: simulated rows are inserted directly and
//! do not run the alerting rule.

use rand::Rng;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::api::errors::ApiError;

#[derive(Debug, FromRow)]
struct ActiveSensor {
    id: i64,
    last_fill_level: Option<f64>,
}

/// Next synthetic fill level: drift from the previous value by −5..+10
/// percentage points, clamped to 0–100 and rounded; sensors with no history
/// start somewhere between 20 and 80.
pub fn next_fill_level<R: Rng>(previous: Option<f64>, rng: &mut R) -> f64 {
    match previous {
        Some(base) => {
            let drift: f64 = rng.gen_range(-5.0..=10.0);
            (base + drift).clamp(0.0, 100.0).round()
        }
        None => rng.gen_range(20..=80) as f64,
    }
}

/// Inserts one synthetic reading per active sensor. Returns how many were
/// generated.
pub async fn generate_for_active_sensors(pool: &PgPool) -> Result<u64, ApiError> {
    let sensors = sqlx::query_as::<_, ActiveSensor>(
        r#"
        SELECT s.id, l.fill_level AS last_fill_level
        FROM sensors s
        LEFT JOIN (
            SELECT DISTINCT ON (sensor_id) sensor_id, fill_level
            FROM sensor_readings
            ORDER BY sensor_id, id DESC
        ) l ON l.sensor_id = s.id
        WHERE s.status = 'active'
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut generated = 0u64;
    for sensor in sensors {
        // Draw everything up front; the RNG must not live across an await.
        let (fill_level, temperature, humidity, battery_voltage, signal_strength) = {
            let mut rng = rand::thread_rng();
            (
                next_fill_level(sensor.last_fill_level, &mut rng),
                (rng.gen_range(20.0..=30.0) * 10.0_f64).round() / 10.0,
                (rng.gen_range(50.0..=70.0) * 10.0_f64).round() / 10.0,
                (rng.gen_range(3.0..=4.2) * 100.0_f64).round() / 100.0,
                rng.gen_range(-80..=-30),
            )
        };

        sqlx::query(
            r#"
            INSERT INTO sensor_readings
                (sensor_id, fill_level, temperature, humidity, battery_voltage, signal_strength)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(sensor.id)
        .bind(fill_level)
        .bind(temperature)
        .bind(humidity)
        .bind(battery_voltage)
        .bind(signal_strength)
        .execute(pool)
        .await?;
        generated += 1;
    }

    info!(generated, "synthetic readings inserted");
    Ok(generated)
}
