use super::ValidationError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::sync::LazyLock;

/// Identity assigned to a record by the persistence layer
pub type RecordId = u64;

/// Lowest accepted TTL (1 minute)
pub const MIN_TTL: u32 = 60;

/// Highest accepted TTL (30 days)
pub const MAX_TTL: u32 = 2_592_000;

/// Longest character-string a TXT record can hold in one piece
pub const TXT_CHUNK_SIZE: usize = 254;

static VALUE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z0-9@.\-]{1,254}").expect("Failed to compile record value regex")
});

/// Record types a zone may carry
///
/// Anything else is kept as `Unknown` so that validation can report it
/// instead of the record silently disappearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    TXT,
    SRV,
    MX,
    Unknown(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::TXT => "TXT",
            Self::SRV => "SRV",
            Self::MX => "MX",
            Self::Unknown(other) => other,
        }
    }

    /// Types that occupy a name exclusively with respect to CNAME
    pub fn is_address_or_alias(&self) -> bool {
        matches!(self, Self::A | Self::AAAA | Self::CNAME)
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "A" => Self::A,
            "AAAA" => Self::AAAA,
            "CNAME" => Self::CNAME,
            "TXT" => Self::TXT,
            "SRV" => Self::SRV,
            "MX" => Self::MX,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(rtype) => rtype,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RecordType> for String {
    fn from(rtype: RecordType) -> Self {
        rtype.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resource record owned by a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned on persistence, `None` before
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning zone
    #[serde(skip)]
    pub zone_id: u64,
    /// Label relative to the zone origin
    pub name: String,
    /// Time to live in seconds
    pub ttl: u32,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    /// Only meaningful for MX
    #[serde(default, rename = "prio")]
    pub priority: u16,
    pub value: String,
}

impl Record {
    /// Create a record bound to a zone
    pub fn new(
        zone_id: u64,
        name: impl Into<String>,
        ttl: u32,
        rtype: impl Into<RecordType>,
        priority: u16,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            zone_id,
            name: name.into(),
            ttl,
            rtype: rtype.into(),
            priority,
            value: value.into(),
        }
    }

    /// Check the record against every rule and report all violations
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let rtype = || self.rtype.to_string();
        let name = || self.name.clone();

        if !VALUE_CHARSET.is_match(&self.value) {
            errors.push(ValidationError::InvalidFormat {
                rtype: rtype(),
                name: name(),
            });
        }

        if !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            errors.push(ValidationError::InvalidTtl {
                rtype: rtype(),
                name: name(),
                ttl: self.ttl,
            });
        }

        match &self.rtype {
            RecordType::A => {
                if self.value.parse::<Ipv4Addr>().is_err() || !self.value.contains('.') {
                    errors.push(ValidationError::InvalidIpv4 {
                        rtype: rtype(),
                        name: name(),
                    });
                }
            }
            RecordType::AAAA => {
                if self.value.parse::<IpAddr>().is_err() || !self.value.contains(':') {
                    errors.push(ValidationError::InvalidIpv6 {
                        rtype: rtype(),
                        name: name(),
                    });
                }
            }
            RecordType::CNAME => {
                if !VALUE_CHARSET.is_match(&self.value) {
                    errors.push(ValidationError::InvalidCname {
                        rtype: rtype(),
                        name: name(),
                    });
                }
            }
            RecordType::TXT => {
                if self.value.contains(['"', '\'', '`']) {
                    errors.push(ValidationError::ForbiddenTxtCharacter {
                        rtype: rtype(),
                        name: name(),
                    });
                }
            }
            // SRV payload is taken as given
            RecordType::SRV => {}
            RecordType::MX => {
                if self.priority == 0 || self.priority > 100 {
                    errors.push(ValidationError::InvalidPriority {
                        rtype: rtype(),
                        name: name(),
                        priority: self.priority,
                    });
                }
            }
            RecordType::Unknown(_) => {
                errors.push(ValidationError::UnknownRecordType {
                    rtype: rtype(),
                    name: name(),
                });
            }
        }

        errors
    }

    /// Render the record as one master-file entry
    pub fn render(&self) -> String {
        let value = match self.rtype {
            RecordType::TXT => format!("(\"{}\")", txt_chunks(&self.value).join("\"\n        \"")),
            _ => self.value.clone(),
        };

        match self.rtype {
            RecordType::MX => format!(
                "{}    {}s    {}  {}    {}",
                self.name, self.ttl, self.rtype, self.priority, value
            ),
            _ => format!("{}    {}s    {}      {}", self.name, self.ttl, self.rtype, value),
        }
    }
}

/// Split a TXT payload into character-strings of at most 254 bytes
///
/// Boundaries fall every 254 bytes; a boundary inside a multi-byte
/// character is moved back to the start of that character.
pub fn txt_chunks(value: &str) -> Vec<&str> {
    let mut chunks = Vec::with_capacity(value.len().div_ceil(TXT_CHUNK_SIZE));
    let mut start = 0;

    while start < value.len() {
        let mut end = (start + TXT_CHUNK_SIZE).min(value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        chunks.push(&value[start..end]);
        start = end;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rtype: &str, priority: u16, value: &str) -> Record {
        Record::new(1, "www", 3600, rtype, priority, value)
    }

    #[test]
    fn test_valid_records() {
        assert!(record("A", 0, "192.0.2.1").validate().is_empty());
        assert!(record("AAAA", 0, "2001:db8::1").validate().is_empty());
        assert!(record("CNAME", 0, "web.example.com.").validate().is_empty());
        assert!(record("TXT", 0, "v=spf1 -all").validate().is_empty());
        assert!(record("SRV", 0, "10 5 5060 sip.example.com.").validate().is_empty());
        assert!(record("MX", 10, "mail.example.com.").validate().is_empty());
    }

    #[test]
    fn test_unknown_record_type() {
        let errors = record("PTR", 0, "host.example.com.").validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("unknown record type"));
    }

    #[test]
    fn test_ttl_boundaries() {
        for (ttl, ok) in [(59, false), (60, true), (2_592_000, true), (2_592_001, false)] {
            let mut r = record("A", 0, "192.0.2.1");
            r.ttl = ttl;
            let has_ttl_error = r
                .validate()
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidTtl { .. }));
            assert_eq!(has_ttl_error, !ok, "ttl {}", ttl);
        }
    }

    #[test]
    fn test_a_record_rejects_ipv6_and_mapped_forms() {
        assert!(!record("A", 0, "2001:db8::1").validate().is_empty());
        assert!(!record("A", 0, "::ffff:192.0.2.1").validate().is_empty());
        assert!(!record("A", 0, "192.0.2").validate().is_empty());
    }

    #[test]
    fn test_aaaa_record_requires_colon() {
        let errors = record("AAAA", 0, "192.0.2.1").validate();
        assert!(matches!(errors[..], [ValidationError::InvalidIpv6 { .. }]));
    }

    #[test]
    fn test_cname_follows_value_charset() {
        let errors = record("CNAME", 0, "ABC").validate();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidCname { .. }))
        );

        assert!(record("CNAME", 0, "_sip._tcp.example.com.").validate().is_empty());
        assert!(record("CNAME", 0, "Web.example.com.").validate().is_empty());
    }

    #[test]
    fn test_txt_forbidden_characters() {
        for value in ["say \"hi\"", "it's", "back`tick"] {
            let errors = record("TXT", 0, value).validate();
            assert!(
                errors
                    .iter()
                    .any(|e| matches!(e, ValidationError::ForbiddenTxtCharacter { .. })),
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_mx_priority_range() {
        assert!(!record("MX", 0, "mail.example.com.").validate().is_empty());
        assert!(record("MX", 1, "mail.example.com.").validate().is_empty());
        assert!(record("MX", 100, "mail.example.com.").validate().is_empty());
        assert!(!record("MX", 101, "mail.example.com.").validate().is_empty());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut r = record("A", 0, "");
        r.ttl = 10;
        let errors = r.validate();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_render_plain_and_mx() {
        assert_eq!(
            record("MX", 10, "mail.example.com.").render(),
            "www    3600s    MX  10    mail.example.com."
        );

        for (rtype, value) in [
            ("A", "192.0.2.1"),
            ("AAAA", "2001:db8::1"),
            ("CNAME", "web.example.com."),
            ("SRV", "10 5 5060 sip.example.com."),
        ] {
            assert_eq!(
                record(rtype, 42, value).render(),
                format!("www    3600s    {}      {}", rtype, value)
            );
        }
        assert_eq!(
            record("TXT", 42, "hello").render(),
            "www    3600s    TXT      (\"hello\")"
        );
    }

    #[test]
    fn test_txt_chunk_counts() {
        for len in [0usize, 1, 254, 255, 508] {
            let value = "a".repeat(len);
            let chunks = txt_chunks(&value);
            assert_eq!(chunks.len(), len.div_ceil(TXT_CHUNK_SIZE), "len {}", len);
            assert_eq!(chunks.concat(), value);
            assert!(chunks.iter().all(|c| c.len() <= TXT_CHUNK_SIZE));
        }
    }

    #[test]
    fn test_txt_render_splits_lines() {
        let value = format!("{}{}", "a".repeat(254), "b");
        let rendered = record("TXT", 0, &value).render();
        assert_eq!(
            rendered,
            format!("www    3600s    TXT      (\"{}\"\n        \"b\")", "a".repeat(254))
        );
        assert_eq!(record("TXT", 0, "").render(), "www    3600s    TXT      (\"\")");
    }

    #[test]
    fn test_txt_chunks_respect_char_boundaries() {
        let value = format!("{}é", "a".repeat(253));
        let chunks = txt_chunks(&value);
        assert_eq!(chunks, vec!["a".repeat(253).as_str(), "é"]);
    }

    #[test]
    fn test_record_type_round_trip_through_string() {
        assert_eq!(RecordType::from("MX"), RecordType::MX);
        assert_eq!(
            RecordType::from("NAPTR"),
            RecordType::Unknown("NAPTR".to_string())
        );
        assert_eq!(String::from(RecordType::AAAA), "AAAA");
    }
}
