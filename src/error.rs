use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error("Missing name server: {0}")]
    MissingNameServer(String),

    #[error("Invalid abuse email: {0}")]
    InvalidAbuseEmail(String),

    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid SOA timer {name}: {value}")]
    InvalidTimer { name: &'static str, value: u32 },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
