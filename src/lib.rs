pub mod config;
pub mod deploy;
pub mod error;
pub mod named_conf;
pub mod service;
pub mod zone;

pub use config::DnsConfig;
pub use zone::{Record, RecordType, Zone};
