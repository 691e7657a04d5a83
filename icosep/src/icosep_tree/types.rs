use crate::entry::EntryId;
use common::shapes::{Aabb3, Vec3};

pub const CHILD_SLOTS: usize = 27;

/// Per-axis weight of the child selector: x counts ones, y threes, z nines.
pub(crate) const AXIS_WEIGHTS: [usize; 3] = [1, 3, 9];

/// Radius floor for the inverse-radius weighting of the split point.
pub(crate) const MIN_WEIGHT_RADIUS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) entries: Vec<EntryId>,
    pub(crate) children: [Option<NodeId>; CHILD_SLOTS],
    pub(crate) split: Option<Vec3>,
    pub(crate) bounds: Aabb3,
    pub(crate) extents_valid: bool,
    /// Set when a split found no separation; cleared once the local entries change.
    pub(crate) split_blocked: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) next_free: Option<NodeId>,
    pub(crate) alive: bool,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            entries: Vec::new(),
            children: [None; CHILD_SLOTS],
            split: None,
            bounds: Aabb3::EMPTY,
            extents_valid: false,
            split_blocked: false,
            parent,
            next_free: None,
            alive: true,
        }
    }

    pub(crate) fn reset(&mut self, parent: Option<NodeId>) {
        self.entries.clear();
        self.children = [None; CHILD_SLOTS];
        self.split = None;
        self.bounds = Aabb3::EMPTY;
        self.extents_valid = false;
        self.split_blocked = false;
        self.parent = parent;
        self.next_free = None;
        self.alive = true;
    }

    #[inline(always)]
    pub(crate) fn is_split(&self) -> bool {
        self.split.is_some()
    }

    #[inline(always)]
    pub(crate) fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.iter().filter(|child| child.is_some()).count()
    }

    /// Over-full leaf that a split may still help.
    #[inline(always)]
    pub(crate) fn wants_split(&self, threshold: usize) -> bool {
        !self.is_split() && !self.split_blocked && self.entries.len() > threshold
    }

    /// Nothing stored here or below: the node should not stay attached.
    #[inline(always)]
    pub(crate) fn is_prunable(&self) -> bool {
        self.entries.is_empty() && !self.has_children()
    }
}

/// Which side of `split` the interval `center ± radius` falls on: 1 below, 2 above,
/// `None` when it touches or crosses the plane.
#[inline(always)]
pub(crate) fn axis_side(center: f32, radius: f32, split: f32) -> Option<usize> {
    if center + radius < split {
        Some(1)
    } else if center - radius > split {
        Some(2)
    } else {
        None
    }
}

/// Child slot in `0..27` for a sphere, or `None` if it straddles any split plane.
/// Each axis is compared only against its own split coordinate.
#[inline(always)]
pub(crate) fn child_selector(position: &Vec3, radius: f32, split: &Vec3) -> Option<usize> {
    let mut selector = 0;
    for axis in 0..3 {
        selector += axis_side(position[axis], radius, split[axis])? * AXIS_WEIGHTS[axis];
    }
    Some(selector)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub splits: u32,
    /// Splits abandoned because every entry went to the same child.
    pub degenerate_splits: u32,
    pub unsplits: u32,
    pub pruned_nodes: u32,
    /// Removals that found the entry one level above its recorded node.
    pub remove_retries: u32,
    /// Levels climbed by coherent updates before descending again.
    pub update_climbs: u32,
    pub extent_recomputes: u32,
}

/// Read-only snapshot of one node, for visualizers and structural checks.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub entry_count: usize,
    pub child_count: usize,
    pub is_split: bool,
    pub split_point: Option<Vec3>,
    pub bounds: Aabb3,
}
