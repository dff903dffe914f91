use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// HMAC secret for signing bearer tokens.
    pub token_secret: String,
    /// Bearer token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            token_secret: required("TOKEN_SECRET")?,
            token_ttl_minutes: positive_minutes(
                optional("TOKEN_TTL_MINUTES", "480"),
                "TOKEN_TTL_MINUTES",
            )?,
        })
    }
}

fn positive_minutes(value: String, key: &str) -> Result<i64> {
    let minutes: i64 = value
        .parse()
        .with_context(|| format!("{key} must be a positive integer"))?;
    anyhow::ensure!(minutes > 0, "{key} must be a positive integer");
    Ok(minutes)
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
