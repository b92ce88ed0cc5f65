use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Client for the prediction backend. Never retries.
    pub upstream: reqwest::Client,
    pub build: BuildStamp,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let upstream = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .context("failed building upstream http client")?;

        Ok(Self {
            config,
            upstream,
            build: BuildStamp::capture(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuildStamp {
    pub hash: String,
    pub timestamp: String,
    pub epoch: i64,
}

impl BuildStamp {
    pub fn capture() -> Self {
        let now = Local::now();
        let epoch = option_env!("BUILD_EPOCH")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or_else(|| now.timestamp());
        let built_at = Local.timestamp_opt(epoch, 0).single().unwrap_or(now);
        let hash = option_env!("BUILD_HASH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("unknown")
            .to_string();

        Self {
            hash,
            timestamp: built_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            epoch: built_at.timestamp(),
        }
    }
}
