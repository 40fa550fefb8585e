use std::env;

use cpg_common::{parse_boolean_flag, Secret};
use log::*;
use toss_tools::TossConfig;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 3000;
const DEFAULT_ADMIN_USERNAME: &str = "admin";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub admin: AdminConfig,
    /// Toss Payments credentials and webhook settings.
    pub toss: TossGatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: String::default(),
            admin: AdminConfig::default(),
            toss: TossGatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = env::var("CPG_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ CPG_DATABASE_URL is not set. Using the default ledger database.");
            course_payment_engine::db_url()
        });
        let admin = AdminConfig::from_env_or_default();
        let toss = TossGatewayConfig::from_env_or_defaults();
        Self { host, port, database_url, admin, toss }
    }
}

//-----------------------------------------  TossGatewayConfig  --------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct TossGatewayConfig {
    /// API credentials for the Toss client.
    pub api: TossConfig,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Secret<String>,
    /// If false, webhook signature checks are skipped entirely. **DANGER**
    pub webhook_checks: bool,
}

impl TossGatewayConfig {
    pub fn from_env_or_defaults() -> Self {
        let api = TossConfig::new_from_env_or_default();
        if api.secret_key.is_unset() {
            error!("🪛️ CPG_TOSS_SECRET_KEY is not set. Payment confirmations will fail until it is configured.");
        }
        let webhook_secret = Secret::new(env::var("CPG_TOSS_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            warn!("🪛️ CPG_TOSS_WEBHOOK_SECRET is not set.");
            String::default()
        }));
        let webhook_checks = parse_boolean_flag(env::var("CPG_TOSS_WEBHOOK_CHECKS").ok(), true);
        let config = Self { api, webhook_secret, webhook_checks };
        if !config.verify_signatures() {
            warn!(
                "🚨️🚨️🚨️ Webhook signature verification is DISABLED. Anyone who can reach the webhook endpoint can \
                 forge payment events. Set CPG_TOSS_WEBHOOK_SECRET (and leave CPG_TOSS_WEBHOOK_CHECKS on) before \
                 running in production. 🚨️🚨️🚨️"
            );
        }
        config
    }

    /// True when incoming webhooks will actually be checked: a secret is configured and
    /// checks have not been explicitly disabled.
    pub fn verify_signatures(&self) -> bool {
        self.webhook_checks && !self.webhook_secret.is_unset()
    }
}

//-------------------------------------------  AdminConfig  -----------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub username: String,
    pub password: Secret<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { username: DEFAULT_ADMIN_USERNAME.to_string(), password: Secret::default() }
    }
}

impl AdminConfig {
    pub fn from_env_or_default() -> Self {
        let username = env::var("CPG_ADMIN_USERNAME").ok().unwrap_or_else(|| {
            info!("🪛️ CPG_ADMIN_USERNAME is not set. Using the default, {DEFAULT_ADMIN_USERNAME}.");
            DEFAULT_ADMIN_USERNAME.to_string()
        });
        let password = Secret::new(env::var("CPG_ADMIN_PASSWORD").ok().unwrap_or_else(|| {
            warn!("🚨️ CPG_ADMIN_PASSWORD is not set. Admin logins are disabled until it is configured.");
            String::default()
        }));
        Self { username, password }
    }

    /// A login only succeeds when a password has actually been configured.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        !self.password.reveal().is_empty() && self.username == username && self.password.reveal() == password
    }
}
