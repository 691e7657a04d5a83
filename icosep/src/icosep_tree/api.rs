use super::*;
use crate::entry::{Entry, EntryId};
use crate::error::{validate_query_radius, IndexResult};
use crate::index::SpatialIndex;
use common::shapes::{Aabb3, Vec3};

impl IcosepTree {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            inner: RefCell::new(TreeInner::new_with_config(Config::default())),
        }
    }

    pub fn new_with_config(config: Config) -> IndexResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            inner: RefCell::new(TreeInner::new_with_config(config)),
        })
    }

    /// Recomputes every stale box and performs every pending split.
    pub fn refresh(&self) {
        self.inner.borrow_mut().refresh();
    }

    /// One summary per live node, parents before children. Boxes are refreshed
    /// first but no split is performed.
    pub fn node_summaries(&self) -> Vec<NodeSummary> {
        let mut inner = self.inner.borrow_mut();
        let order = inner.reachable_nodes();
        for &id in &order {
            inner.ensure_extents(id, false);
        }
        order
            .into_iter()
            .map(|id| {
                let node = inner.node(id);
                NodeSummary {
                    id,
                    parent: node.parent,
                    depth: inner.depth_of(id),
                    entry_count: node.entries.len(),
                    child_count: node.child_count(),
                    is_split: node.is_split(),
                    split_point: node.split,
                    bounds: node.bounds,
                }
            })
            .collect()
    }

    pub fn node_bounds(&self) -> Vec<Aabb3> {
        self.node_summaries()
            .into_iter()
            .map(|summary| summary.bounds)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.inner.borrow().reachable_nodes().len()
    }

    pub fn max_depth(&self) -> usize {
        let inner = self.inner.borrow();
        inner
            .reachable_nodes()
            .into_iter()
            .map(|id| inner.depth_of(id))
            .max()
            .unwrap_or(0)
    }

    pub fn all_entries(&self) -> Vec<EntryId> {
        self.inner.borrow().entries.iter().map(|(id, _)| id).collect()
    }

    pub fn stats(&self) -> TreeStats {
        self.inner.borrow().stats
    }

    pub fn take_stats(&self) -> TreeStats {
        std::mem::take(&mut self.inner.borrow_mut().stats)
    }

    /// Candidates written into a caller-owned buffer, for hot loops that reuse it.
    pub fn query_into(&self, center: Vec3, radius: f32, out: &mut Vec<EntryId>) -> IndexResult<()> {
        validate_query_radius(radius)?;
        self.inner.borrow_mut().query_into(center, radius, out);
        Ok(())
    }
}

impl Default for IcosepTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for IcosepTree {
    fn config(&self) -> &Config {
        &self.config
    }

    fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId> {
        self.inner.get_mut().insert(position, radius)
    }

    fn remove(&mut self, id: EntryId) -> IndexResult<()> {
        self.inner.get_mut().remove(id)
    }

    fn update_sphere(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()> {
        self.inner.get_mut().relocate(id, position, radius)
    }

    fn query(&self, center: Vec3, radius: f32) -> IndexResult<Vec<EntryId>> {
        let mut result = Vec::new();
        self.query_into(center, radius, &mut result)?;
        Ok(result)
    }

    fn get(&self, id: EntryId) -> IndexResult<Entry> {
        self.inner.borrow().entries.get(id).copied()
    }

    fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    fn bounds(&self) -> Option<Aabb3> {
        self.inner.borrow_mut().root_bounds()
    }
}
