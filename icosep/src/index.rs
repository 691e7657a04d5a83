use crate::brute_force::BruteForceIndex;
use crate::config::Config;
use crate::entry::{Entry, EntryId};
use crate::error::{validate_query_radius, IndexResult};
use crate::grid::UniformGridIndex;
use crate::icosep_tree::IcosepTree;
use common::shapes::{Aabb3, Vec3};

/// Contract shared by every backend. The driver moves entries, calls `update`, then queries.
pub trait SpatialIndex {
    fn config(&self) -> &Config;

    fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId>;

    fn remove(&mut self, id: EntryId) -> IndexResult<()>;

    /// Moves an entry and changes its radius in one relocation.
    fn update_sphere(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()>;

    fn update(&mut self, id: EntryId, position: Vec3) -> IndexResult<()> {
        let radius = self.get(id)?.radius;
        self.update_sphere(id, position, radius)
    }

    /// Entries near `center`. Each call returns a fresh collection.
    ///
    /// Brute force and the grid already keep only entries within the contact
    /// threshold. The tree returns unfiltered candidates from every node whose box
    /// overlaps the query box, so it can include entries out of contact. Use
    /// [`SpatialIndex::contacts`] for the same result across backends.
    fn query(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>>;

    fn get(&self, id: EntryId) -> IndexResult<Entry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Box around everything indexed. Only the tree tracks one.
    fn bounds(&self) -> Option<Aabb3> {
        None
    }

    /// Entries whose squared distance to `center` is below the contact threshold.
    ///
    /// The gathering radius never drops below the contact reach, so a backend that
    /// returns exact candidates yields exact contacts for any `radius`.
    fn contacts(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        validate_query_radius(radius)?;
        let threshold = self.config().contact_threshold_sq;
        let gather = radius.max(self.config().contact_reach());
        let mut hits = self.query(center, gather)?;
        hits.retain(|&id| {
            self.get(id)
                .map(|entry| entry.distance_sq_to(&center) < threshold)
                .unwrap_or(false)
        });
        Ok(hits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    BruteForce,
    Grid,
    IcosepTree,
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [IndexKind::BruteForce, IndexKind::Grid, IndexKind::IcosepTree];

    pub fn name(self) -> &'static str {
        match self {
            IndexKind::BruteForce => "brute-force",
            IndexKind::Grid => "grid",
            IndexKind::IcosepTree => "icosep-tree",
        }
    }
}

/// An owned index of any kind, handed to the driver in place of a global.
#[derive(Debug)]
pub enum Index {
    BruteForce(BruteForceIndex),
    Grid(UniformGridIndex),
    IcosepTree(IcosepTree),
}

pub fn create_index(kind: IndexKind, config: Config) -> IndexResult<Index> {
    Ok(match kind {
        IndexKind::BruteForce => Index::BruteForce(BruteForceIndex::new_with_config(config)?),
        IndexKind::Grid => Index::Grid(UniformGridIndex::new_with_config(config)?),
        IndexKind::IcosepTree => Index::IcosepTree(IcosepTree::new_with_config(config)?),
    })
}

macro_rules! dispatch {
    ($self:expr, $backend:ident => $call:expr) => {
        match $self {
            Index::BruteForce($backend) => $call,
            Index::Grid($backend) => $call,
            Index::IcosepTree($backend) => $call,
        }
    };
}

impl Index {
    pub fn kind(&self) -> IndexKind {
        match self {
            Index::BruteForce(_) => IndexKind::BruteForce,
            Index::Grid(_) => IndexKind::Grid,
            Index::IcosepTree(_) => IndexKind::IcosepTree,
        }
    }

    pub fn as_tree(&self) -> Option<&IcosepTree> {
        match self {
            Index::IcosepTree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&UniformGridIndex> {
        match self {
            Index::Grid(grid) => Some(grid),
            _ => None,
        }
    }
}

impl SpatialIndex for Index {
    fn config(&self) -> &Config {
        dispatch!(self, backend => backend.config())
    }

    fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId> {
        dispatch!(self, backend => backend.insert(position, radius))
    }

    fn remove(&mut self, id: EntryId) -> IndexResult<()> {
        dispatch!(self, backend => backend.remove(id))
    }

    fn update_sphere(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()> {
        dispatch!(self, backend => backend.update_sphere(id, position, radius))
    }

    fn update(&mut self, id: EntryId, position: Vec3) -> IndexResult<()> {
        dispatch!(self, backend => backend.update(id, position))
    }

    fn query(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        dispatch!(self, backend => backend.query(center, radius))
    }

    fn get(&self, id: EntryId) -> IndexResult<Entry> {
        dispatch!(self, backend => backend.get(id))
    }

    fn len(&self) -> usize {
        dispatch!(self, backend => backend.len())
    }

    fn bounds(&self) -> Option<Aabb3> {
        dispatch!(self, backend => backend.bounds())
    }

    fn contacts(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        dispatch!(self, backend => backend.contacts(center, radius))
    }
}
