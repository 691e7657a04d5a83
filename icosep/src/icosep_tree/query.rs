use super::*;
use crate::entry::EntryId;
use common::shapes::{Aabb3, Vec3};
use smallvec::SmallVec;

impl TreeInner {
    /// Local entries of every node whose box overlaps the query box. Boxes are brought
    /// up to date (and over-full leaves split) on the way down.
    pub(crate) fn query_into(&mut self, center: Vec3, radius: f32, out: &mut Vec<EntryId>) {
        let query_box = Aabb3::from_center_radius(center, radius);
        self.ensure_extents(NodeId::ROOT, true);

        let mut stack: SmallVec<[NodeId; 64]> = SmallVec::new();
        stack.push(NodeId::ROOT);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            out.extend_from_slice(&node.entries);
            if !node.has_children() {
                continue;
            }
            let children = node.children;
            for child in children.into_iter().flatten() {
                self.ensure_extents(child, true);
                if self.node(child).bounds.overlaps(&query_box) {
                    stack.push(child);
                }
            }
        }
    }
}
