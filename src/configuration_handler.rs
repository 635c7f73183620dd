use crate::{configuration::Configuration, identity::AuthMode};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "delivery_booking", about = "Delivery slot booking service")]
pub struct ConfigurationHandler {
    #[arg(long, env = "PORT", default_value = "3000")]
    port: String,

    /// PostgreSQL connection URL. Without it bookings are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    database_pool_size: u32,

    #[arg(long, env = "AUTH_MODE", value_enum, default_value_t = AuthMode::Strict)]
    auth_mode: AuthMode,

    #[arg(long, env = "LINE_PROFILE_URL", default_value = "https://api.line.me/v2/profile")]
    line_profile_url: String,

    /// Token accepted without asking LINE. Only honoured with anonymous fallback.
    #[arg(long, env = "DEV_TOKEN")]
    dev_token: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone().filter(|url| !url.is_empty())
    }

    fn database_pool_size(&self) -> u32 {
        self.database_pool_size
    }

    fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    fn line_profile_url(&self) -> String {
        self.line_profile_url.clone()
    }

    fn dev_token(&self) -> Option<String> {
        self.dev_token.clone()
    }
}
