use super::*;
use crate::entry::EntryId;
use common::shapes::Vec3;

impl TreeInner {
    /// Inverse-radius weighted centroid of `position + radius` over the node's local
    /// entries. Small entries pull the split point toward themselves.
    pub(crate) fn split_point(&self, id: NodeId) -> Option<Vec3> {
        let mut weighted = Vec3::zeros();
        let mut total = 0.0;
        for &entry in &self.node(id).entries {
            let Ok(stored) = self.entries.get(entry) else {
                continue;
            };
            let weight = 1.0 / stored.radius.max(MIN_WEIGHT_RADIUS);
            weighted += (stored.position + Vec3::repeat(stored.radius)) * weight;
            total += weight;
        }
        (total > 0.0).then(|| weighted / total)
    }

    pub(crate) fn split(&mut self, id: NodeId) {
        if self.node(id).is_split() {
            log::warn!("node {:?} is already split", id);
            return;
        }
        if let Some(point) = self.split_point(id) {
            self.split_at(id, point);
        }
    }

    /// Splits a leaf around `point`. If every entry ends up in the same place the
    /// split is abandoned and the node stays a leaf, blocked from splitting again
    /// until an entry is added, removed or moved.
    pub(crate) fn split_at(&mut self, id: NodeId, point: Vec3) {
        self.node_mut(id).split = Some(point);
        let local = std::mem::take(&mut self.node_mut(id).entries);

        let mut kept: Vec<EntryId> = Vec::new();
        let mut moved: Vec<(usize, EntryId)> = Vec::with_capacity(local.len());
        for entry in local {
            let slot = match self.entries.get(entry) {
                Ok(stored) => self.which_child(id, &stored.position, stored.radius),
                Err(_) => None,
            };
            match slot {
                Some(slot) => moved.push((slot, entry)),
                None => kept.push(entry),
            }
        }

        let first_slot = moved.first().map(|&(slot, _)| slot);
        let single_child = moved.iter().all(|&(slot, _)| Some(slot) == first_slot);
        if moved.is_empty() || (kept.is_empty() && single_child) {
            kept.extend(moved.into_iter().map(|(_, entry)| entry));
            let node = self.node_mut(id);
            node.entries = kept;
            node.split = None;
            node.split_blocked = true;
            self.stats.degenerate_splits += 1;
            log::warn!(
                "degenerate split of node {:?} at {:?}: no separation, node stays a leaf",
                id,
                point
            );
            return;
        }

        self.node_mut(id).entries = kept;
        for (slot, entry) in moved {
            let child = self.child_or_create(id, slot);
            self.attach(child, entry);
        }
        let children = self.node(id).children;
        for child in children.into_iter().flatten() {
            self.recompute_extents(child);
        }
        self.stats.splits += 1;
        log::debug!(
            "split node {:?} at {:?} into {} children, {} entries kept",
            id,
            point,
            self.node(id).child_count(),
            self.node(id).entries.len()
        );
    }
}
