use std::time::Duration;

pub const MAX_CHAR_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 5;

pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

pub const BODY_SIZE_LIMIT: u64 = 1024 * 16;

pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const DB_RETRY_INTERVAL: Duration = Duration::from_secs(1);

pub const TOKEN_KEYWORD: &str = "Token";
