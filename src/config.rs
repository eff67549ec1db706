use anyhow::{Context, Result};
use std::env;

/// Default USCIS field-office scheduler endpoint (zip code is appended per request).
pub const DEFAULT_SCHEDULER_BASE_URL: &str =
    "https://my.uscis.gov/appointmentscheduler-appointment/field-offices/zipcode";

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_refresh_token: String,
    pub oauth_user: String,
    pub email_to: String,
    pub ircc_num: String,
    pub scheduler_base_url: String,
    pub poll_interval_secs: u64,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            oauth_client_id: env::var("GCP_OAUTH_CLIENT_ID")
                .context("GCP_OAUTH_CLIENT_ID must be set")?,
            oauth_client_secret: env::var("GCP_OAUTH_CLIENT_SECRET")
                .context("GCP_OAUTH_CLIENT_SECRET must be set")?,
            oauth_refresh_token: env::var("GCP_OAUTH_REFRESH_TOKEN")
                .context("GCP_OAUTH_REFRESH_TOKEN must be set")?,
            oauth_user: env::var("GCP_OAUTH_USER").context("GCP_OAUTH_USER must be set")?,
            email_to: env::var("EMAIL_TO").context("EMAIL_TO must be set")?,
            ircc_num: env::var("IRCC_NUM").context("IRCC_NUM must be set")?,
            scheduler_base_url: env::var("SCHEDULER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_SCHEDULER_BASE_URL.to_string()),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("POLL_INTERVAL_SECS must be a valid number")?,
        })
    }
}
