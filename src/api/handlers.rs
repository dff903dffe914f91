use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use utoipa::OpenApi;

use super::dto::{
    AckResponse, ContactRequestCreatedResponse, ContainerCreatedResponse, ContainerDto,
    CreateContainerRequest, DashboardResponse, DemoRequest, LoginRequest, LoginResponse,
    MonthlyReportResponse, PartnershipRequest, PublicUser, ReadingCreatedResponse,
    ReadingHistoryParams, ReadingPoint, RecordReadingRequest, RegisterRequest, RegisterResponse,
    SimulateResponse,
};
use super::errors::ApiError;
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::models::{RequestKind, User};
use crate::state::AppState;
use crate::validation::{validate_container, validate_demo_request, validate_registration};
use crate::{dashboard, sensors, simulator};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Exchanges email + password for a signed bearer token. Only active accounts
/// may log in.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE email = $1 AND status = 'active'",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        warn!(email = %email, "login attempt for unknown or inactive account");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    let token = state.keys.sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Creates a user and, when condominium details are supplied, its condominium
/// in the same transaction. Partial failure leaves no user row behind.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Missing or invalid field, or duplicate email"),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let valid = validate_registration(&payload)?;
    let email = valid.email.trim().to_lowercase();

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation("email already registered".into()));
    }

    let password_hash = hash_password(valid.password)?;

    let mut tx = state.db.begin().await?;

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, password_hash, phone, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(valid.name)
    .bind(&email)
    .bind(&password_hash)
    .bind(valid.phone)
    .bind(valid.role)
    .fetch_one(&mut *tx)
    .await?;

    let condominium_id = match (&payload.condominium_name, payload.units_count) {
        (Some(condo_name), Some(units_count)) => {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO condominiums (name, address, units_count, manager_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(condo_name)
            .bind(payload.address.as_deref().unwrap_or(""))
            .bind(units_count)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            Some(id)
        }
        _ => None,
    };

    tx.commit().await?;

    info!(user_id, ?condominium_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            condominium_id,
        }),
    ))
}

/// Tokens are stateless, so there is nothing to revoke server-side; clients
/// drop the token. Kept for contract compatibility.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Logged out", body = AckResponse)),
    tag = "auth"
)]
pub async fn logout() -> Json<AckResponse> {
    Json(AckResponse { success: true })
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Lists every container with its current reading, ordered by location.
#[utoipa::path(
    get,
    path = "/containers",
    responses(
        (status = 200, description = "Containers with their latest reading", body = Vec<ContainerDto>),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "containers"
)]
pub async fn list_containers(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<ContainerDto>>, ApiError> {
    let containers = sensors::list_containers(&pool).await?;
    Ok(Json(containers))
}

#[utoipa::path(
    post,
    path = "/containers",
    request_body = CreateContainerRequest,
    responses(
        (status = 201, description = "Container created", body = ContainerCreatedResponse),
        (status = 400, description = "Missing field"),
        (status = 404, description = "Unknown condominium"),
    ),
    security(("bearer" = [])),
    tag = "containers"
)]
pub async fn create_container(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<CreateContainerRequest>,
) -> Result<(StatusCode, Json<ContainerCreatedResponse>), ApiError> {
    let valid = validate_container(&payload)?;
    let container_id = sensors::create_container(&pool, &valid).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContainerCreatedResponse { container_id }),
    ))
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Ingests one fill-level reading and applies the alerting rule.
#[utoipa::path(
    post,
    path = "/sensor-readings",
    request_body = RecordReadingRequest,
    responses(
        (status = 201, description = "Reading recorded", body = ReadingCreatedResponse),
        (status = 400, description = "Fill level out of range"),
        (status = 404, description = "Unknown sensor"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
pub async fn record_reading(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<RecordReadingRequest>,
) -> Result<(StatusCode, Json<ReadingCreatedResponse>), ApiError> {
    let reading_id = sensors::record_reading(&pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReadingCreatedResponse { reading_id }),
    ))
}

/// Reading history for one sensor over the last `days` days (default 7),
/// oldest first.
#[utoipa::path(
    get,
    path = "/sensor-readings/{sensor_id}",
    params(
        ("sensor_id" = i64, Path, description = "Sensor id"),
        ("days" = Option<i64>, Query, description = "Window size in days (default 7, max 365)"),
    ),
    responses(
        (status = 200, description = "Readings in the window", body = Vec<ReadingPoint>),
        (status = 400, description = "Days parameter out of range"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
pub async fn reading_history(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Path(sensor_id): Path<i64>,
    Query(params): Query<ReadingHistoryParams>,
) -> Result<Json<Vec<ReadingPoint>>, ApiError> {
    let days = params.days.unwrap_or(sensors::DEFAULT_HISTORY_DAYS);
    let readings = sensors::reading_history(&pool, sensor_id, days).await?;
    Ok(Json(readings))
}

/// Bulk-generates synthetic readings for all active sensors. Demo utility.
#[utoipa::path(
    post,
    path = "/simulate-sensor-data",
    responses(
        (status = 200, description = "Synthetic readings inserted", body = SimulateResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
pub async fn simulate_sensor_data(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<SimulateResponse>, ApiError> {
    let generated = simulator::generate_for_active_sensors(&pool).await?;
    Ok(Json(SimulateResponse { generated }))
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Marks an alert resolved. Resolving twice is not an error.
#[utoipa::path(
    post,
    path = "/alerts/{id}/resolve",
    params(("id" = i64, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert resolved", body = AckResponse),
        (status = 404, description = "Unknown alert"),
    ),
    security(("bearer" = [])),
    tag = "alerts"
)]
pub async fn resolve_alert(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Path(alert_id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    sensors::resolve_alert(&pool, alert_id).await?;
    Ok(Json(AckResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Dashboard & reports
// ---------------------------------------------------------------------------

/// Per-condominium snapshot: sensor statuses, summary statistics, and the ten
/// newest open alerts.
#[utoipa::path(
    get,
    path = "/dashboard/{condominium_id}",
    params(("condominium_id" = i64, Path, description = "Condominium id")),
    responses(
        (status = 200, description = "Dashboard payload", body = DashboardResponse),
        (status = 404, description = "Unknown condominium"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Path(condominium_id): Path<i64>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let payload = dashboard::dashboard(&pool, condominium_id).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/reports/monthly/{condominium_id}",
    params(("condominium_id" = i64, Path, description = "Condominium id")),
    responses(
        (status = 200, description = "Monthly collections report", body = MonthlyReportResponse),
        (status = 404, description = "Unknown condominium"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn monthly_report(
    State(pool): State<PgPool>,
    AuthUser(_user_id): AuthUser,
    Path(condominium_id): Path<i64>,
) -> Result<Json<MonthlyReportResponse>, ApiError> {
    let report = dashboard::monthly_report(&pool, condominium_id).await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Contact forms
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/demo-request",
    request_body = DemoRequest,
    responses(
        (status = 201, description = "Request stored", body = ContactRequestCreatedResponse),
        (status = 400, description = "Missing contact field"),
    ),
    tag = "contact"
)]
pub async fn demo_request(
    State(pool): State<PgPool>,
    Json(payload): Json<DemoRequest>,
) -> Result<(StatusCode, Json<ContactRequestCreatedResponse>), ApiError> {
    validate_demo_request(&payload)?;

    let request_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO contact_requests
            (request_type, name, email, phone, position, organization,
             units_count, collections_per_week, message)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(RequestKind::Demo)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.position)
    .bind(&payload.condominium_name)
    .bind(payload.units_count)
    .bind(payload.collections_per_week)
    .bind(&payload.main_challenges)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactRequestCreatedResponse { request_id }),
    ))
}

#[utoipa::path(
    post,
    path = "/partnership-request",
    request_body = PartnershipRequest,
    responses(
        (status = 201, description = "Request stored", body = ContactRequestCreatedResponse),
    ),
    tag = "contact"
)]
pub async fn partnership_request(
    State(pool): State<PgPool>,
    Json(payload): Json<PartnershipRequest>,
) -> Result<(StatusCode, Json<ContactRequestCreatedResponse>), ApiError> {
    let request_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO contact_requests
            (request_type, name, email, phone, position, organization, message)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(RequestKind::Partnership)
    .bind(&payload.contact_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.position)
    .bind(&payload.company)
    .bind(&payload.notes)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactRequestCreatedResponse { request_id }),
    ))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        login,
        register,
        logout,
        list_containers,
        create_container,
        record_reading,
        reading_history,
        simulate_sensor_data,
        resolve_alert,
        get_dashboard,
        monthly_report,
        demo_request,
        partnership_request,
        health,
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "containers", description = "Waste-container sensors"),
        (name = "readings", description = "Fill-level readings"),
        (name = "alerts", description = "Threshold alerts"),
        (name = "dashboard", description = "Aggregated statistics and reports"),
        (name = "contact", description = "Demo and partnership requests"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "Binsight API",
        version = "0.1.0",
        description = "Waste-container fill monitoring for condominium buildings"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
