use crate::config::Config;
use crate::entry::{Entry, EntryId, EntryTable, Location};
use crate::error::{validate_query_radius, validate_sphere, IndexError, IndexResult};
use crate::index::SpatialIndex;
use common::shapes::{Aabb3, Vec3};
use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise floor of `position / cell_size`, saturating at the `i32` range.
    #[inline(always)]
    pub fn from_position(position: &Vec3, cell_size: f32) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i32,
            y: (position.y / cell_size).floor() as i32,
            z: (position.z / cell_size).floor() as i32,
        }
    }

    /// The 3x3x3 block of cells centered on this one, including itself. Keys past
    /// the `i32` range are skipped, so cells on the saturated edge have fewer neighbors.
    pub fn neighborhood(self) -> impl Iterator<Item = CellKey> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                (-1..=1).filter_map(move |dz| {
                    Some(CellKey::new(
                        self.x.checked_add(dx)?,
                        self.y.checked_add(dy)?,
                        self.z.checked_add(dz)?,
                    ))
                })
            })
        })
    }

    pub fn bounds(&self, cell_size: f32) -> Aabb3 {
        let min = Vec3::new(self.x as f32, self.y as f32, self.z as f32) * cell_size;
        Aabb3::new(min, min + Vec3::repeat(cell_size))
    }
}

/// Uniform hash grid. Queries scan one ring of cells around the query center, so entries
/// further than one cell away on any axis are never reported, even when they would
/// pass the contact threshold.
#[derive(Debug)]
pub struct UniformGridIndex {
    config: Config,
    entries: EntryTable,
    cells: FxHashMap<CellKey, Vec<EntryId>>,
}

impl UniformGridIndex {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            entries: EntryTable::default(),
            cells: FxHashMap::default(),
        }
    }

    pub fn new_with_config(config: Config) -> IndexResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: EntryTable::default(),
            cells: FxHashMap::default(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    pub fn key_for(&self, position: &Vec3) -> CellKey {
        CellKey::from_position(position, self.config.cell_size)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Keys of every populated cell, for drawing.
    pub fn cell_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells.keys().copied()
    }

    pub fn cell(&self, key: CellKey) -> &[EntryId] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn attach(&mut self, key: CellKey, id: EntryId) {
        self.cells.entry(key).or_default().push(id);
        self.entries.set_location(id, Location::Cell(key));
    }

    fn detach_from(&mut self, key: CellKey, id: EntryId) -> bool {
        let Some(bucket) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&other| other == id) else {
            return false;
        };
        bucket.remove(pos);
        if bucket.is_empty() {
            self.cells.remove(&key);
        }
        true
    }

    /// Detaches `id` from its recorded cell, falling back once to the cell its
    /// stored position maps to.
    fn detach(&mut self, id: EntryId, entry: &Entry) -> IndexResult<()> {
        let recorded = match entry.location {
            Location::Cell(key) => key,
            location => return Err(IndexError::InvariantViolation { id, location }),
        };
        if self.detach_from(recorded, id) {
            return Ok(());
        }
        let derived = self.key_for(&entry.position);
        log::warn!(
            "entry {:?} missing from recorded cell {:?}, retrying {:?}",
            id,
            recorded,
            derived
        );
        if derived != recorded && self.detach_from(derived, id) {
            return Ok(());
        }
        log::error!("entry {:?} not found in any grid cell", id);
        Err(IndexError::InvariantViolation {
            id,
            location: entry.location,
        })
    }
}

impl Default for UniformGridIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for UniformGridIndex {
    fn config(&self) -> &Config {
        &self.config
    }

    fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId> {
        validate_sphere(&position, radius)?;
        let id = self.entries.insert(position, radius, Location::Unplaced);
        let key = self.key_for(&position);
        self.attach(key, id);
        Ok(id)
    }

    fn remove(&mut self, id: EntryId) -> IndexResult<()> {
        let entry = *self.entries.get(id)?;
        self.detach(id, &entry)?;
        self.entries.remove(id)?;
        Ok(())
    }

    fn update_sphere(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()> {
        validate_sphere(&position, radius)?;
        let entry = *self.entries.get(id)?;
        let key = self.key_for(&position);
        if entry.location != Location::Cell(key) {
            self.detach(id, &entry)?;
            self.attach(key, id);
        }
        let stored = self.entries.get_mut(id)?;
        stored.position = position;
        stored.radius = radius;
        Ok(())
    }

    fn query(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        validate_query_radius(radius)?;
        if radius > self.config.cell_size {
            log::debug!(
                "grid query radius {} exceeds cell size {}; entries beyond one ring are skipped",
                radius,
                self.config.cell_size
            );
        }
        let threshold = self.config.contact_threshold_sq;
        let mut result = Vec::new();
        for key in self.key_for(&center).neighborhood() {
            let Some(bucket) = self.cells.get(&key) else {
                continue;
            };
            for &id in bucket {
                let entry = self.entries.get(id)?;
                if entry.distance_sq_to(&center) < threshold {
                    result.push(id);
                }
            }
        }
        Ok(result)
    }

    fn get(&self, id: EntryId) -> IndexResult<Entry> {
        self.entries.get(id).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
