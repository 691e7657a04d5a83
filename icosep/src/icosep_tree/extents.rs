use super::*;
use common::shapes::Aabb3;

impl TreeInner {
    /// Widens every valid box from `start` to the root. Invalid boxes are left for
    /// the next recompute; valid ancestors above them still get widened.
    pub(crate) fn grow_extents(&mut self, start: NodeId, extent: &Aabb3) {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node_mut(id);
            if node.extents_valid {
                node.bounds.expand_to_include(extent);
            }
            current = node.parent;
        }
    }

    /// Invalidates every box from `start` up whose boundary `old_extent` touches.
    /// A box the removed extent did not touch is still exact.
    pub(crate) fn shrink_extents(&mut self, start: NodeId, old_extent: &Aabb3) {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node_mut(id);
            if node.extents_valid && node.bounds.touches_boundary(old_extent) {
                node.extents_valid = false;
            }
            current = node.parent;
        }
    }

    pub(crate) fn recompute_extents(&mut self, id: NodeId) {
        let mut bounds = Aabb3::EMPTY;
        for &entry in &self.node(id).entries {
            if let Ok(stored) = self.entries.get(entry) {
                bounds.expand_to_include(&stored.bounding_box());
            }
        }
        let children = self.node(id).children;
        for child in children.into_iter().flatten() {
            self.ensure_extents(child, false);
            bounds.expand_to_include(&self.node(child).bounds);
        }
        let node = self.node_mut(id);
        node.bounds = bounds;
        node.extents_valid = true;
        self.stats.extent_recomputes += 1;
    }

    /// Brings the node's box up to date and, when `allow_split` is set, splits an
    /// over-full leaf. A leaf whose last split found no separation is left alone
    /// until its entries change.
    pub(crate) fn ensure_extents(&mut self, id: NodeId, allow_split: bool) {
        if !self.node(id).extents_valid {
            self.recompute_extents(id);
        }
        if allow_split && self.node(id).wants_split(self.config.split_threshold) {
            self.split(id);
        }
    }

    /// Refreshes every box and performs every pending split, top-down, so children
    /// created by a split are visited in the same pass.
    pub(crate) fn refresh(&mut self) {
        let mut stack: smallvec::SmallVec<[NodeId; 64]> = smallvec::smallvec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            self.ensure_extents(id, true);
            stack.extend(self.node(id).children.iter().flatten().copied());
        }
    }

    pub(crate) fn root_bounds(&mut self) -> Option<Aabb3> {
        self.ensure_extents(NodeId::ROOT, false);
        let bounds = self.node(NodeId::ROOT).bounds;
        if bounds.is_empty() {
            None
        } else {
            Some(bounds)
        }
    }
}
