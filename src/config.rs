use crate::error::{ConfigError, Result};
use crate::zone::constants::{
    DEFAULT_EXPIRE, DEFAULT_MINIMUM, DEFAULT_REFRESH, DEFAULT_RETRY, DEFAULT_TTL,
};
use crate::zone::record::{MAX_TTL, MIN_TTL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide DNS settings, read-only once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Host name written as the SOA primary name server
    pub primary_name_server: String,

    /// Name servers published as NS records, in order
    pub name_servers: Vec<String>,

    /// Address secondaries replicate from
    pub primary_name_server_ip: String,

    /// Addresses allowed to transfer zones from the primary
    pub secondary_name_server_ips: Vec<String>,

    /// Default abuse contact, `user@domain`
    pub abuse_email: String,

    /// `$TTL` written at the top of every zone file
    pub ttl: u32,

    pub time_to_refresh: u32,
    pub time_to_retry: u32,
    pub time_to_expire: u32,
    pub minimal_ttl: u32,

    /// Where zone files go, below the deployment root
    pub zone_dir: PathBuf,

    /// Where configuration stanzas go, below the deployment root
    pub config_dir: PathBuf,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            primary_name_server: String::new(),
            name_servers: vec![],
            primary_name_server_ip: String::new(),
            secondary_name_server_ips: vec![],
            abuse_email: String::new(),
            ttl: DEFAULT_TTL,
            time_to_refresh: DEFAULT_REFRESH,
            time_to_retry: DEFAULT_RETRY,
            time_to_expire: DEFAULT_EXPIRE,
            minimal_ttl: DEFAULT_MINIMUM,
            zone_dir: PathBuf::from("/var/named"),
            config_dir: PathBuf::from("/etc/named"),
        }
    }
}

impl DnsConfig {
    /// Parse a TOML document, missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load a TOML file, apply environment overrides and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Create a DnsConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `ZONEWRIGHT_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(primary) = std::env::var("ZONEWRIGHT_PRIMARY_NAME_SERVER") {
            self.primary_name_server = primary.trim().to_string();
        }

        if let Ok(name_servers) = std::env::var("ZONEWRIGHT_NAME_SERVERS") {
            self.name_servers = parse_list(&name_servers);
        }

        if let Ok(primary_ip) = std::env::var("ZONEWRIGHT_PRIMARY_NAME_SERVER_IP") {
            self.primary_name_server_ip = primary_ip.trim().to_string();
        }

        if let Ok(secondary_ips) = std::env::var("ZONEWRIGHT_SECONDARY_NAME_SERVER_IPS") {
            self.secondary_name_server_ips = parse_list(&secondary_ips);
        }

        if let Ok(abuse_email) = std::env::var("ZONEWRIGHT_ABUSE_EMAIL") {
            self.abuse_email = abuse_email.trim().to_string();
        }

        self.ttl = env_u32("ZONEWRIGHT_TTL", self.ttl)?;
        self.time_to_refresh = env_u32("ZONEWRIGHT_TIME_TO_REFRESH", self.time_to_refresh)?;
        self.time_to_retry = env_u32("ZONEWRIGHT_TIME_TO_RETRY", self.time_to_retry)?;
        self.time_to_expire = env_u32("ZONEWRIGHT_TIME_TO_EXPIRE", self.time_to_expire)?;
        self.minimal_ttl = env_u32("ZONEWRIGHT_MINIMAL_TTL", self.minimal_ttl)?;

        if let Ok(zone_dir) = std::env::var("ZONEWRIGHT_ZONE_DIR") {
            self.zone_dir = PathBuf::from(zone_dir.trim());
        }

        if let Ok(config_dir) = std::env::var("ZONEWRIGHT_CONFIG_DIR") {
            self.config_dir = PathBuf::from(config_dir.trim());
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.primary_name_server.is_empty() {
            return Err(ConfigError::MissingNameServer(
                "primary name server is not set".to_string(),
            ));
        }

        if self.name_servers.is_empty() {
            return Err(ConfigError::MissingNameServer(
                "at least one name server is required".to_string(),
            ));
        }

        if !self.abuse_email.contains('@') {
            return Err(ConfigError::InvalidAbuseEmail(self.abuse_email.clone()));
        }

        if !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(ConfigError::InvalidTtl(format!(
                "{} is outside {}..={}",
                self.ttl, MIN_TTL, MAX_TTL
            )));
        }

        for (name, value) in [
            ("refresh", self.time_to_refresh),
            ("retry", self.time_to_retry),
            ("expire", self.time_to_expire),
            ("minimum", self.minimal_ttl),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidTimer { name, value });
            }
        }

        Ok(())
    }

    /// Default abuse contact in SOA notation
    pub fn render_email(&self) -> String {
        self.abuse_email.replace('@', ".")
    }
}

fn env_u32(key: &str, current: u32) -> Result<u32> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::Parse(format!("Invalid {}: {}", key, value))),
        Err(_) => Ok(current),
    }
}

/// Split a comma separated list, dropping empty entries
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
