use crate::error::{IndexError, IndexResult};
use crate::grid::CellKey;
use crate::icosep_tree::NodeId;
use common::shapes::{Aabb3, Sphere, Vec3};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational handle to an entry. A removed id never resolves again.
    pub struct EntryId;
}

/// Where an entry currently lives inside its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Unplaced,
    Node(NodeId),
    Cell(CellKey),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub position: Vec3,
    pub radius: f32,
    pub location: Location,
}

impl Entry {
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.position, self.radius)
    }

    pub fn bounding_box(&self) -> Aabb3 {
        self.sphere().bounding_box()
    }

    #[inline(always)]
    pub fn distance_sq_to(&self, point: &Vec3) -> f32 {
        (self.position - point).norm_squared()
    }
}

/// Flat arena of entries shared by every backend. Structures store ids, never entries.
#[derive(Debug, Default)]
pub(crate) struct EntryTable {
    entries: SlotMap<EntryId, Entry>,
}

impl EntryTable {
    pub(crate) fn insert(&mut self, position: Vec3, radius: f32, location: Location) -> EntryId {
        self.entries.insert(Entry {
            position,
            radius,
            location,
        })
    }

    pub(crate) fn get(&self, id: EntryId) -> IndexResult<&Entry> {
        self.entries.get(id).ok_or(IndexError::UnknownEntry { id })
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> IndexResult<&mut Entry> {
        self.entries.get_mut(id).ok_or(IndexError::UnknownEntry { id })
    }

    pub(crate) fn remove(&mut self, id: EntryId) -> IndexResult<Entry> {
        self.entries.remove(id).ok_or(IndexError::UnknownEntry { id })
    }

    pub(crate) fn set_location(&mut self, id: EntryId, location: Location) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.location = location;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> + '_ {
        self.entries.iter()
    }
}
