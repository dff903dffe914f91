use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::dashboard::SensorStatus;
use crate::db::models::{ActiveStatus, AlertSeverity, UserRole};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Registration payload. Everything is optional at the type level so the
/// validation layer can report the first missing field with a 400 instead of
/// a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<String>,
    pub condominium_name: Option<String>,
    pub units_count: Option<i32>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condominium_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContainerRequest {
    pub sensor_code: Option<String>,
    pub location: Option<String>,
    pub condominium_id: Option<i64>,
    pub waste_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContainerCreatedResponse {
    pub container_id: i64,
}

/// A sensor joined with its current (max-id) reading. Sensors that have never
/// reported are not listed.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ContainerDto {
    pub id: i64,
    pub sensor_code: String,
    pub location: String,
    pub waste_type: String,
    pub installation_date: NaiveDate,
    pub status: ActiveStatus,
    pub fill_level: f64,
    pub battery_voltage: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordReadingRequest {
    pub sensor_id: i64,
    /// Fill percentage, 0–100.
    pub fill_level: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub signal_strength: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingCreatedResponse {
    pub reading_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReadingHistoryParams {
    /// Window size in days; defaults to 7, capped at 365.
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ReadingPoint {
    pub fill_level: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulateResponse {
    pub generated: u64,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct SensorSnapshot {
    pub id: i64,
    pub sensor_code: String,
    pub location: String,
    pub fill_level: f64,
    pub battery_voltage: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub status: SensorStatus,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_sensors: i64,
    /// Mean fill level over sensors that have a reading, rounded to one
    /// decimal. Absent when no sensor has reported yet.
    pub avg_fill_level: Option<f64>,
    pub sensors_need_collection: i64,
    pub critical_sensors: i64,
    pub collections_this_month: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct OpenAlert {
    pub id: i64,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub location: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub sensors: Vec<SensorSnapshot>,
    pub stats: DashboardStats,
    pub alerts: Vec<OpenAlert>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CollectionsSummary {
    pub total_collections: i64,
    pub avg_fill_level: Option<f64>,
    pub total_cost: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CostComparison {
    pub traditional: f64,
    pub smart_system: f64,
    pub savings: f64,
    pub savings_percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReportResponse {
    pub collections: CollectionsSummary,
    pub costs: CostComparison,
}

// ---------------------------------------------------------------------------
// Contact forms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct DemoRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub condominium_name: Option<String>,
    pub units_count: Option<i32>,
    pub collections_per_week: Option<i32>,
    pub main_challenges: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PartnershipRequest {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactRequestCreatedResponse {
    pub request_id: i64,
}
