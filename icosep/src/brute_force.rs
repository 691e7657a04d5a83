use crate::config::Config;
use crate::entry::{Entry, EntryId, EntryTable, Location};
use crate::error::{validate_query_radius, validate_sphere, IndexResult};
use crate::index::SpatialIndex;
use common::shapes::Vec3;

/// Linear scan over every live entry. Keeps no structure beyond the entry table.
#[derive(Debug)]
pub struct BruteForceIndex {
    config: Config,
    entries: EntryTable,
}

impl BruteForceIndex {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            entries: EntryTable::default(),
        }
    }

    pub fn new_with_config(config: Config) -> IndexResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: EntryTable::default(),
        })
    }
}

impl Default for BruteForceIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for BruteForceIndex {
    fn config(&self) -> &Config {
        &self.config
    }

    fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId> {
        validate_sphere(&position, radius)?;
        Ok(self.entries.insert(position, radius, Location::Unplaced))
    }

    fn remove(&mut self, id: EntryId) -> IndexResult<()> {
        self.entries.remove(id).map(|_| ())
    }

    fn update_sphere(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()> {
        validate_sphere(&position, radius)?;
        let entry = self.entries.get_mut(id)?;
        entry.position = position;
        entry.radius = radius;
        Ok(())
    }

    // No gathering radius applies here: every entry is a candidate and the contact
    // threshold alone decides.
    fn query(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        validate_query_radius(radius)?;
        let threshold = self.config.contact_threshold_sq;
        Ok(self
            .entries
            .iter()
            .filter(|(_, entry)| entry.distance_sq_to(&center) < threshold)
            .map(|(id, _)| id)
            .collect())
    }

    fn get(&self, id: EntryId) -> IndexResult<Entry> {
        self.entries.get(id).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
