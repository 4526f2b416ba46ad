use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Demo credential seeded when no admin is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@college.edu";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = var_or("AURORA_HOST", "0.0.0.0");
        let port: u16 = var_or("AURORA_PORT", "4000")
            .parse()
            .context("AURORA_PORT is not a valid port")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

        let admin_password = var_or("AURORA_ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD);
        if admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("AURORA_ADMIN_PASSWORD not set; seeding the demo admin password");
        }

        Ok(Self {
            addr,
            db_path: var_or("AURORA_DB_PATH", "aurora.db").into(),
            admin_email: var_or("AURORA_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            admin_password,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
