pub mod errors;
pub mod record;
pub mod store;
#[allow(clippy::module_inception)]
pub mod zone;

pub use errors::{Result, ValidationError, ValidationErrors, ZoneError};
pub use record::{Record, RecordId, RecordType};
pub use store::{MemoryStore, ZoneGateway};
pub use zone::{Zone, ZoneId};

/// Zone constants
pub mod constants {
    /// Default TTL written as `$TTL` when nothing is configured (1 hour)
    pub const DEFAULT_TTL: u32 = 3600;

    /// Default SOA refresh interval
    pub const DEFAULT_REFRESH: u32 = 3600;

    /// Default SOA retry interval
    pub const DEFAULT_RETRY: u32 = 900;

    /// Default SOA expire interval (14 days)
    pub const DEFAULT_EXPIRE: u32 = 1_209_600;

    /// Default SOA minimum (negative caching) TTL
    pub const DEFAULT_MINIMUM: u32 = 3600;
}
