use super::record::{Record, RecordId};
use super::zone::{Zone, ZoneId};
use super::{Result, ZoneError};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Persistence collaborator for zones and their records
///
/// Zones are soft-deleted, records are removed for good.
pub trait ZoneGateway {
    /// Number of non-deleted zones serving `domain`, ignoring `excluding`
    fn count_zones_by_domain(&self, domain: &str, excluding: Option<ZoneId>) -> Result<usize>;

    /// Persist a new zone (records are ignored) and return its identity
    fn create_zone(&self, zone: &mut Zone) -> Result<ZoneId>;

    /// Load a zone together with its records, ordered by record identity
    fn load_zone(&self, id: ZoneId) -> Result<Zone>;

    /// Store the zone attributes (records are persisted separately)
    fn update_zone(&self, zone: &mut Zone) -> Result<()>;

    fn soft_delete_zone(&self, id: ZoneId) -> Result<()>;

    fn create_record(&self, record: &mut Record) -> Result<RecordId>;

    fn load_record(&self, id: RecordId) -> Result<Record>;

    fn update_record(&self, record: &mut Record) -> Result<()>;

    fn delete_record(&self, id: RecordId) -> Result<()>;
}

#[derive(Default)]
struct Tables {
    next_zone_id: ZoneId,
    next_record_id: RecordId,
    zones: BTreeMap<ZoneId, Zone>,
    records: BTreeMap<RecordId, Record>,
}

/// In-memory gateway
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Number of stored zones, deleted ones included
    pub fn zone_count(&self) -> usize {
        self.tables.read().zones.len()
    }

    pub fn record_count(&self) -> usize {
        self.tables.read().records.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneGateway for MemoryStore {
    fn count_zones_by_domain(&self, domain: &str, excluding: Option<ZoneId>) -> Result<usize> {
        let tables = self.tables.read();
        let count = tables
            .zones
            .values()
            .filter(|z| !z.delete && z.domain == domain)
            .filter(|z| excluding.is_none() || z.id != excluding)
            .count();
        Ok(count)
    }

    fn create_zone(&self, zone: &mut Zone) -> Result<ZoneId> {
        let mut tables = self.tables.write();
        tables.next_zone_id += 1;
        let id = tables.next_zone_id;

        let now = Utc::now();
        zone.id = Some(id);
        zone.created_at = Some(now);
        zone.updated_at = Some(now);

        let mut row = zone.clone();
        row.records.clear();
        tables.zones.insert(id, row);

        info!("Created zone {} ({})", zone.domain, id);
        Ok(id)
    }

    fn load_zone(&self, id: ZoneId) -> Result<Zone> {
        let tables = self.tables.read();
        let mut zone = tables
            .zones
            .get(&id)
            .cloned()
            .ok_or(ZoneError::ZoneNotFound(id))?;

        zone.records = tables
            .records
            .values()
            .filter(|r| r.zone_id == id)
            .cloned()
            .collect();

        debug!("Loaded zone {} with {} records", zone.domain, zone.records.len());
        Ok(zone)
    }

    fn update_zone(&self, zone: &mut Zone) -> Result<()> {
        let id = zone.id.ok_or(ZoneError::ZoneNotSaved)?;
        let mut tables = self.tables.write();
        let row = tables
            .zones
            .get_mut(&id)
            .ok_or(ZoneError::ZoneNotFound(id))?;

        zone.updated_at = Some(Utc::now());
        let records = std::mem::take(&mut zone.records);
        *row = zone.clone();
        zone.records = records;

        debug!("Updated zone {} ({})", zone.domain, id);
        Ok(())
    }

    fn soft_delete_zone(&self, id: ZoneId) -> Result<()> {
        let mut tables = self.tables.write();
        let row = tables
            .zones
            .get_mut(&id)
            .ok_or(ZoneError::ZoneNotFound(id))?;

        row.delete = true;
        row.updated_at = Some(Utc::now());

        info!("Soft-deleted zone {} ({})", row.domain, id);
        Ok(())
    }

    fn create_record(&self, record: &mut Record) -> Result<RecordId> {
        let mut tables = self.tables.write();
        if !tables.zones.contains_key(&record.zone_id) {
            return Err(ZoneError::ZoneNotFound(record.zone_id));
        }

        tables.next_record_id += 1;
        let id = tables.next_record_id;

        let now = Utc::now();
        record.id = Some(id);
        record.created_at = Some(now);
        record.updated_at = Some(now);
        tables.records.insert(id, record.clone());

        debug!("Created {} record {} ({})", record.rtype, record.name, id);
        Ok(id)
    }

    fn load_record(&self, id: RecordId) -> Result<Record> {
        self.tables
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or(ZoneError::RecordNotFound(id))
    }

    fn update_record(&self, record: &mut Record) -> Result<()> {
        let id = record
            .id
            .ok_or_else(|| ZoneError::Store("record has no identity".to_string()))?;
        let mut tables = self.tables.write();
        let row = tables
            .records
            .get_mut(&id)
            .ok_or(ZoneError::RecordNotFound(id))?;

        record.updated_at = Some(Utc::now());
        *row = record.clone();

        debug!("Updated {} record {} ({})", record.rtype, record.name, id);
        Ok(())
    }

    fn delete_record(&self, id: RecordId) -> Result<()> {
        let removed = self
            .tables
            .write()
            .records
            .remove(&id)
            .ok_or(ZoneError::RecordNotFound(id))?;

        info!("Deleted {} record {} ({})", removed.rtype, removed.name, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_with_domain(store: &MemoryStore, domain: &str) -> Zone {
        let mut zone = Zone::new(domain);
        store.create_zone(&mut zone).unwrap();
        zone
    }

    #[test]
    fn test_ids_are_assigned() {
        let store = MemoryStore::new();
        let a = zone_with_domain(&store, "a.example");
        let b = zone_with_domain(&store, "b.example");
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert!(a.created_at.is_some());
    }

    #[test]
    fn test_count_ignores_deleted_and_excluded() {
        let store = MemoryStore::new();
        let zone = zone_with_domain(&store, "example.com");
        assert_eq!(store.count_zones_by_domain("example.com", None).unwrap(), 1);
        assert_eq!(
            store
                .count_zones_by_domain("example.com", zone.id)
                .unwrap(),
            0
        );

        store.soft_delete_zone(zone.id.unwrap()).unwrap();
        assert_eq!(store.count_zones_by_domain("example.com", None).unwrap(), 0);
        assert_eq!(store.zone_count(), 1);
    }

    #[test]
    fn test_records_load_with_zone() {
        let store = MemoryStore::new();
        let zone = zone_with_domain(&store, "example.com");
        let zone_id = zone.id.unwrap();

        let mut www = Record::new(zone_id, "www", 3600, "A", 0, "192.0.2.1");
        let mut mail = Record::new(zone_id, "mail", 3600, "A", 0, "192.0.2.2");
        store.create_record(&mut www).unwrap();
        store.create_record(&mut mail).unwrap();

        let loaded = store.load_zone(zone_id).unwrap();
        let names: Vec<_> = loaded.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["www", "mail"]);

        store.delete_record(www.id.unwrap()).unwrap();
        assert_eq!(store.load_zone(zone_id).unwrap().records.len(), 1);
        assert!(matches!(
            store.load_record(www.id.unwrap()),
            Err(ZoneError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_record_requires_existing_zone() {
        let store = MemoryStore::new();
        let mut record = Record::new(42, "www", 3600, "A", 0, "192.0.2.1");
        assert!(matches!(
            store.create_record(&mut record),
            Err(ZoneError::ZoneNotFound(42))
        ));
    }
}
