use super::*;
use crate::entry::{EntryId, Location};
use crate::error::{validate_sphere, IndexError, IndexResult};
use common::shapes::{Aabb3, Vec3};

impl TreeInner {
    /// Coherent relocation: climb from the entry's node until a box already holds the
    /// new sphere, then descend again from there.
    pub(crate) fn relocate(&mut self, id: EntryId, position: Vec3, radius: f32) -> IndexResult<()> {
        validate_sphere(&position, radius)?;
        let old = *self.entries.get(id)?;
        let source = match old.location {
            Location::Node(node) => node,
            location => return Err(IndexError::InvariantViolation { id, location }),
        };
        let old_box = old.bounding_box();
        let new_box = Aabb3::from_center_radius(position, radius);
        {
            let stored = self.entries.get_mut(id)?;
            stored.position = position;
            stored.radius = radius;
        }

        let mut start = source;
        loop {
            let node = self.node(start);
            let Some(parent) = node.parent else {
                break;
            };
            if node.extents_valid && node.bounds.contains(&new_box) {
                break;
            }
            start = parent;
            self.stats.update_climbs += 1;
        }
        log::trace!("relocating {:?} from {:?}, descending from {:?}", id, source, start);

        let destination = self.find_node(start, &position, radius);
        if destination == source {
            self.node_mut(source).split_blocked = false;
            self.grow_extents(source, &new_box);
            self.shrink_extents(source, &old_box);
            return Ok(());
        }
        self.attach(destination, id);
        self.grow_extents(destination, &new_box);
        self.remove_from(source, id, &old_box)
    }
}
