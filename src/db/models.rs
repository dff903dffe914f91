use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Mirrors the `user_role` Postgres enum — the closed set of account types
/// that may register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    BuildingSuper,
    ManagementCompany,
    CollectionCompany,
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "manager" => Ok(Self::Manager),
            "building_super" => Ok(Self::BuildingSuper),
            "management_company" => Ok(Self::ManagementCompany),
            "collection_company" => Ok(Self::CollectionCompany),
            other => Err(anyhow::anyhow!("unknown user role: {other:?}")),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Manager => "manager",
            UserRole::BuildingSuper => "building_super",
            UserRole::ManagementCompany => "management_company",
            UserRole::CollectionCompany => "collection_company",
        };
        f.write_str(s)
    }
}

/// Mirrors the `active_status` Postgres enum, shared by users and sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "active_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    Active,
    Inactive,
}

/// Mirrors the `alert_severity` Postgres enum. The ingestion rule only ever
/// produces `Critical` and `High`; the lower tiers exist for manually raised
/// alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "alert_severity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// Mirrors the `request_kind` Postgres enum for contact-form rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Demo,
    Partnership,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    pub role: UserRole,
    pub status: ActiveStatus,
    pub created_at: DateTime<Utc>,
}
