//! Zone and record mutations on top of a persistence gateway
//!
//! Every successful mutation bumps the zone serial before it is stored, so
//! the next rendering carries a serial the secondaries will pick up.

use crate::config::DnsConfig;
use crate::deploy::{Deployer, ZoneArtifacts};
use crate::named_conf::NamedConfRenderer;
use crate::zone::{
    Record, RecordId, RecordType, Result, ValidationError, Zone, ZoneError, ZoneGateway, ZoneId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Render the zone file and both configuration stanzas for a zone
pub fn render_artifacts(zone: &Zone, config: &DnsConfig) -> ZoneArtifacts {
    let renderer = NamedConfRenderer::new(config);
    ZoneArtifacts {
        domain: zone.domain.clone(),
        zone_file: zone.render(config),
        primary_conf: renderer.primary(zone),
        secondary_conf: renderer.secondary(zone),
    }
}

pub struct ZoneService<G: ZoneGateway> {
    gateway: G,
    config: Arc<DnsConfig>,
}

impl<G: ZoneGateway> ZoneService<G> {
    pub fn new(gateway: G, config: Arc<DnsConfig>) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &DnsConfig {
        &self.config
    }

    /// Create and persist a new zone
    pub fn new_zone(&self, domain: &str, tags: &[&str], abuse_email: &str) -> Result<Zone> {
        let mut zone = Zone::new(domain);
        zone.set_tags(tags);
        zone.abuse_email = non_empty(abuse_email);

        reject_invalid(&zone, zone.validate(&self.gateway)?)?;

        zone.set_new_serial()?;
        self.gateway.create_zone(&mut zone)?;

        info!("New zone {} with serial {}", zone.domain, zone.serial);
        Ok(zone)
    }

    /// Replace the tags and abuse contact of a zone
    pub fn update_zone(&self, id: ZoneId, tags: &[&str], abuse_email: &str) -> Result<Zone> {
        let mut zone = self.load_active(id)?;
        zone.set_tags(tags);
        zone.abuse_email = non_empty(abuse_email);

        reject_invalid(&zone, zone.validate(&self.gateway)?)?;

        self.bump_serial(zone)
    }

    /// Flag a zone as deleted; it stays stored but is no longer served
    pub fn delete_zone(&self, id: ZoneId) -> Result<()> {
        let zone = self.load_active(id)?;
        self.bump_serial(zone)?;
        self.gateway.soft_delete_zone(id)
    }

    /// Add a record to a stored zone
    pub fn new_record(
        &self,
        zone_id: ZoneId,
        name: &str,
        ttl: u32,
        rtype: impl Into<RecordType>,
        priority: u16,
        value: &str,
    ) -> Result<Record> {
        let mut zone = self.load_active(zone_id)?;

        let (mut record, errors) =
            zone.add_record(&self.gateway, name, ttl, rtype, priority, value)?;
        // The zone value now holds the rejected record and is dropped here
        reject_invalid(&zone, errors)?;

        self.gateway.create_record(&mut record)?;
        if let Some(id) = record.id {
            if let Some(stored) = zone.records.last_mut() {
                stored.id = Some(id);
            }
        }
        self.bump_serial(zone)?;

        Ok(record)
    }

    /// Change a record in place, its type stays as it is
    pub fn update_record(
        &self,
        id: RecordId,
        name: &str,
        ttl: u32,
        priority: u16,
        value: &str,
    ) -> Result<Record> {
        let record = self.gateway.load_record(id)?;
        let mut zone = self.load_active(record.zone_id)?;

        let mut updated = {
            let stored = zone.record_mut(id).ok_or(ZoneError::RecordNotFound(id))?;
            stored.name = name.to_string();
            stored.ttl = ttl;
            stored.priority = priority;
            stored.value = value.to_string();
            stored.clone()
        };

        reject_invalid(&zone, zone.validate(&self.gateway)?)?;

        self.gateway.update_record(&mut updated)?;
        self.bump_serial(zone)?;

        Ok(updated)
    }

    /// Remove a record for good
    pub fn delete_record(&self, id: RecordId) -> Result<()> {
        let record = self.gateway.load_record(id)?;
        let zone = self.load_active(record.zone_id)?;

        self.gateway.delete_record(id)?;
        self.bump_serial(zone)?;
        Ok(())
    }

    /// Render everything the name servers need for a zone
    pub fn render(&self, zone_id: ZoneId) -> Result<ZoneArtifacts> {
        let zone = self.load_active(zone_id)?;
        Ok(render_artifacts(&zone, &self.config))
    }

    /// Render a zone and hand it to the deployer
    pub fn commit<D: Deployer + ?Sized>(&self, zone_id: ZoneId, deployer: &D) -> Result<ZoneArtifacts> {
        let artifacts = self.render(zone_id)?;
        deployer.deploy(&artifacts)?;

        info!("Committed zone {}", artifacts.domain);
        Ok(artifacts)
    }

    fn load_active(&self, id: ZoneId) -> Result<Zone> {
        let zone = self.gateway.load_zone(id)?;
        if zone.delete {
            return Err(ZoneError::ZoneDeleted(zone.domain));
        }
        Ok(zone)
    }

    fn bump_serial(&self, mut zone: Zone) -> Result<Zone> {
        zone.set_new_serial()?;
        self.gateway.update_zone(&mut zone)?;

        debug!("Zone {} is now at serial {}", zone.domain, zone.serial);
        Ok(zone)
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn reject_invalid(zone: &Zone, errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    warn!(
        "Rejected change to zone {}: {} validation error(s)",
        zone.domain,
        errors.len()
    );
    Err(errors.into())
}
