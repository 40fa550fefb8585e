use cpg_common::Secret;
use log::*;

pub const DEFAULT_TOSS_API_URL: &str = "https://api.tosspayments.com";

#[derive(Debug, Clone, Default)]
pub struct TossConfig {
    /// Base URL of the Toss Payments API.
    pub api_url: String,
    /// The public client key handed to the front-end payment widget.
    pub client_key: String,
    /// The server-held secret key. Used as the Basic-auth username on API calls.
    pub secret_key: Secret<String>,
}

impl TossConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CPG_TOSS_API_URL").unwrap_or_else(|_| {
            info!("CPG_TOSS_API_URL not set, using {DEFAULT_TOSS_API_URL}");
            DEFAULT_TOSS_API_URL.to_string()
        });
        let client_key = std::env::var("CPG_TOSS_CLIENT_KEY").unwrap_or_else(|_| {
            warn!("CPG_TOSS_CLIENT_KEY not set. The payment widget cannot be initialised without it.");
            String::default()
        });
        let secret_key = Secret::new(std::env::var("CPG_TOSS_SECRET_KEY").unwrap_or_else(|_| {
            warn!("CPG_TOSS_SECRET_KEY not set. Payment confirmations will be rejected until it is configured.");
            String::default()
        }));
        Self { api_url, client_key, secret_key }
    }
}
