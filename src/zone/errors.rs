use std::fmt;
use thiserror::Error;

/// A single violated rule found while validating a record or a zone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Record value is not made of lowercase letters, digits, `.`, `@` or `-`
    #[error("{rtype} {name}: name of the record is not in valid format")]
    InvalidFormat { rtype: String, name: String },
    /// TTL outside of 60..=2592000
    #[error("{rtype} {name}: TTL has to be number between 60 and 2592000, got {ttl}")]
    InvalidTtl {
        rtype: String,
        name: String,
        ttl: u32,
    },
    #[error("{rtype} {name}: IP address of A record is not valid")]
    InvalidIpv4 { rtype: String, name: String },
    #[error("{rtype} {name}: IP address of AAAA record is not valid")]
    InvalidIpv6 { rtype: String, name: String },
    #[error("{rtype} {name}: CNAME has not a valid value")]
    InvalidCname { rtype: String, name: String },
    #[error("{rtype} {name}: characters \"' or ` are not allowed in TXT records")]
    ForbiddenTxtCharacter { rtype: String, name: String },
    #[error("{rtype} {name}: priority has to be bigger than 0 and at most 100, got {priority}")]
    InvalidPriority {
        rtype: String,
        name: String,
        priority: u16,
    },
    #[error("{rtype} {name}: unknown record type")]
    UnknownRecordType { rtype: String, name: String },
    #[error("domain {0} already exists")]
    DomainExists(String),
    #[error("domain name {0} has to be at least three characters long")]
    DomainTooShort(String),
    #[error("domain name {0} has to contain at least one dot")]
    DomainWithoutDot(String),
    /// A CNAME shares its name with another A/AAAA/CNAME record
    #[error("CNAME {0} is already used in another A/AAAA/CNAME record")]
    CnameConflict(String),
}

/// A non-empty list of validation errors carried inside a `Result`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

/// Zone-related errors that abort an operation
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Records can only be attached to a persisted zone
    #[error("zone is not saved")]
    ZoneNotSaved,
    /// Same-day serial whose sequence part is not a number
    #[error("malformed serial: {0}")]
    MalformedSerial(String),
    #[error("Zone not found: {0}")]
    ZoneNotFound(u64),
    #[error("Record not found: {0}")]
    RecordNotFound(u64),
    #[error("Zone {0} is deleted")]
    ZoneDeleted(String),
    #[error("Zone validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Deploy error: {0}")]
    Deploy(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Vec<ValidationError>> for ZoneError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(ValidationErrors(errors))
    }
}

pub type Result<T> = std::result::Result<T, ZoneError>;
