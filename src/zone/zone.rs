use super::record::{Record, RecordType};
use super::store::ZoneGateway;
use super::{Result, ValidationError, ZoneError};
use crate::config::DnsConfig;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity assigned to a zone by the persistence layer
pub type ZoneId = u64;

/// Length of a `YYYYMMDDNN` serial
pub const SERIAL_LEN: usize = 10;

/// All records of one domain plus its authoritative metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Zone {
    /// Assigned on persistence, `None` before
    #[serde(default)]
    pub id: Option<ZoneId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete flag
    #[serde(default)]
    pub delete: bool,
    pub domain: String,
    /// `YYYYMMDD` in UTC followed by a two digit daily sequence
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub records: Vec<Record>,
    /// Comma separated tags
    #[serde(default)]
    pub tags: String,
    /// Overrides the process-wide abuse contact when set
    #[serde(default)]
    pub abuse_email: Option<String>,
}

impl Zone {
    /// Create a new, unsaved zone
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').filter(|t| !t.is_empty())
    }

    pub fn set_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.tags = tags
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(",");
    }

    /// Bump the serial for today's UTC date
    pub fn set_new_serial(&mut self) -> Result<()> {
        self.set_new_serial_on(Utc::now().date_naive())
    }

    /// Bump the serial as if today were `today`
    ///
    /// A serial from an earlier day (or an unusable one) restarts at
    /// `<today>01`, a serial from `today` gets its sequence incremented.
    /// More than 99 bumps in one day overflow the two digit sequence.
    pub fn set_new_serial_on(&mut self, today: NaiveDate) -> Result<()> {
        let today = today.format("%Y%m%d").to_string();

        if self.serial.len() != SERIAL_LEN || !self.serial.is_ascii() {
            self.serial = format!("{}01", today);
            return Ok(());
        }

        let (date, sequence) = self.serial.split_at(8);
        if date == today {
            let number: u32 = sequence
                .parse()
                .map_err(|_| ZoneError::MalformedSerial(self.serial.clone()))?;
            self.serial = format!("{}{:02}", today, number + 1);
        } else {
            self.serial = format!("{}01", today);
        }

        Ok(())
    }

    /// Abuse contact in SOA notation (`user.example.com`)
    pub fn render_abuse_email(&self, config: &DnsConfig) -> String {
        match self.abuse_email.as_deref() {
            Some(email) if !email.is_empty() => email.replace('@', "."),
            _ => config.render_email(),
        }
    }

    /// Attach a new record and validate the whole zone
    ///
    /// The record stays appended even when validation fails, so callers
    /// must drop this zone value when the returned list is non-empty.
    pub fn add_record<G: ZoneGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: &str,
        ttl: u32,
        rtype: impl Into<RecordType>,
        priority: u16,
        value: &str,
    ) -> Result<(Record, Vec<ValidationError>)> {
        let zone_id = self.id.ok_or(ZoneError::ZoneNotSaved)?;

        let record = Record::new(zone_id, name, ttl, rtype, priority, value);
        self.records.push(record.clone());

        let errors = self.validate(gateway)?;
        Ok((record, errors))
    }

    /// Check the zone and all its records, collecting every violation
    ///
    /// The outer error is reserved for a failing gateway.
    pub fn validate<G: ZoneGateway + ?Sized>(&self, gateway: &G) -> Result<Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Only a zone being created can collide with itself
        if self.id.is_none() && gateway.count_zones_by_domain(&self.domain, None)? > 0 {
            errors.push(ValidationError::DomainExists(self.domain.clone()));
        }

        for record in &self.records {
            errors.extend(record.validate());
        }

        if self.domain.len() < 3 {
            errors.push(ValidationError::DomainTooShort(self.domain.clone()));
        }

        if !self.domain.contains('.') {
            errors.push(ValidationError::DomainWithoutDot(self.domain.clone()));
        }

        errors.extend(self.cname_conflicts());

        Ok(errors)
    }

    /// CNAMEs whose name is also used by another A, AAAA or CNAME record
    fn cname_conflicts(&self) -> Vec<ValidationError> {
        let mut used: HashMap<&str, usize> = HashMap::new();
        for record in self.records.iter().filter(|r| r.rtype.is_address_or_alias()) {
            *used.entry(record.name.as_str()).or_default() += 1;
        }

        self.records
            .iter()
            .filter(|r| r.rtype == RecordType::CNAME)
            .filter(|r| used.get(r.name.as_str()).copied().unwrap_or(0) > 1)
            .map(|r| ValidationError::CnameConflict(r.name.clone()))
            .collect()
    }

    /// Render the complete master file
    pub fn render(&self, config: &DnsConfig) -> String {
        let mut zone = format!(
            "$TTL {}s\n\
             @       IN      SOA     {}. {}.  (\n\
             \t\t{}\n\
             \t\t{}\n\
             \t\t{}\n\
             \t\t{}\n\
             \t\t{}\n\
             )\n",
            config.ttl,
            config.primary_name_server,
            self.render_abuse_email(config),
            self.serial,
            config.time_to_refresh,
            config.time_to_retry,
            config.time_to_expire,
            config.minimal_ttl,
        );

        for nameserver in &config.name_servers {
            zone.push_str(&format!("@    IN    NS    {}.\n", nameserver));
        }

        for record in &self.records {
            zone.push_str(&record.render());
            zone.push('\n');
        }

        zone
    }

    pub(crate) fn record_mut(&mut self, id: u64) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == Some(id))
    }
}
