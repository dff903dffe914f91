//! First-fail request validation. Each validator walks its declared field
//! list in order and reports only the first missing or invalid field.

use lazy_static::lazy_static;
use regex::Regex;

use crate::api::dto::{CreateContainerRequest, DemoRequest, RegisterRequest};
use crate::api::errors::ApiError;
use crate::db::models::UserRole;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn present<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

/// Validated registration fields, ready for insertion.
#[derive(Debug)]
pub struct ValidRegistration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
    pub role: UserRole,
}

/// Field order: name, email, password, phone, user_type.
pub fn validate_registration(req: &RegisterRequest) -> Result<ValidRegistration<'_>, ApiError> {
    let name = present(&req.name, "name")?;
    let email = present(&req.email, "email")?;
    if !is_valid_email(email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    let password = present(&req.password, "password")?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let phone = present(&req.phone, "phone")?;
    let role = present(&req.user_type, "user_type")?
        .parse::<UserRole>()
        .map_err(|_| ApiError::Validation("invalid user type".into()))?;
    Ok(ValidRegistration {
        name,
        email,
        password,
        phone,
        role,
    })
}

/// Validated container fields.
#[derive(Debug)]
pub struct ValidContainer<'a> {
    pub sensor_code: &'a str,
    pub location: &'a str,
    pub condominium_id: i64,
    pub waste_type: &'a str,
}

/// Field order: sensor_code, location, condominium_id.
pub fn validate_container(req: &CreateContainerRequest) -> Result<ValidContainer<'_>, ApiError> {
    let sensor_code = present(&req.sensor_code, "sensor_code")?;
    let location = present(&req.location, "location")?;
    let condominium_id = req
        .condominium_id
        .ok_or_else(|| ApiError::Validation("condominium_id is required".into()))?;
    Ok(ValidContainer {
        sensor_code,
        location,
        condominium_id,
        waste_type: req.waste_type.as_deref().unwrap_or("general"),
    })
}

/// Field order: name, email, phone. The remaining demo-request fields are
/// free-form and stored as given.
pub fn validate_demo_request(req: &DemoRequest) -> Result<(), ApiError> {
    present(&req.name, "name")?;
    present(&req.email, "email")?;
    present(&req.phone, "phone")?;
    Ok(())
}
