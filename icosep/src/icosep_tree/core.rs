use super::*;
use crate::entry::{EntryId, Location};
use crate::error::{validate_sphere, IndexError, IndexResult};
use common::shapes::{sphere_volume, Aabb3, Vec3};

impl TreeInner {
    pub(crate) fn new_with_config(config: Config) -> Self {
        Self {
            config,
            nodes: vec![Node::new(None)],
            free_node: None,
            entries: EntryTable::default(),
            stats: TreeStats::default(),
        }
    }

    #[inline(always)]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline(always)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc_node(&mut self, parent: NodeId) -> NodeId {
        if let Some(id) = self.free_node {
            let node = &mut self.nodes[id.index()];
            self.free_node = node.next_free;
            node.reset(Some(parent));
            return id;
        }
        self.nodes.push(Node::new(Some(parent)));
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub(crate) fn release_node(&mut self, id: NodeId) {
        debug_assert!(id != NodeId::ROOT, "root is never released");
        let free_head = self.free_node;
        let node = self.node_mut(id);
        node.reset(None);
        node.alive = false;
        node.next_free = free_head;
        self.free_node = Some(id);
    }

    /// Slot for a sphere under `id`, or `None` if it has to stay at `id`.
    pub(crate) fn which_child(&self, id: NodeId, position: &Vec3, radius: f32) -> Option<usize> {
        let node = self.node(id);
        let split = node.split?;
        // Oversized entries stay high up; only judged once the box is trustworthy.
        if node.extents_valid && sphere_volume(radius) > node.bounds.volume() / 8.0 {
            return None;
        }
        child_selector(position, radius, &split)
    }

    pub(crate) fn child_or_create(&mut self, id: NodeId, slot: usize) -> NodeId {
        if let Some(child) = self.node(id).children[slot] {
            return child;
        }
        let child = self.alloc_node(id);
        self.node_mut(id).children[slot] = Some(child);
        child
    }

    /// Descends from `start`, creating children along the way, to the node a sphere belongs in.
    pub(crate) fn find_node(&mut self, start: NodeId, position: &Vec3, radius: f32) -> NodeId {
        let mut current = start;
        while let Some(slot) = self.which_child(current, position, radius) {
            current = self.child_or_create(current, slot);
        }
        current
    }

    pub(crate) fn attach(&mut self, id: NodeId, entry: EntryId) {
        let node = self.node_mut(id);
        node.entries.push(entry);
        node.split_blocked = false;
        self.entries.set_location(entry, Location::Node(id));
    }

    pub(crate) fn insert(&mut self, position: Vec3, radius: f32) -> IndexResult<EntryId> {
        validate_sphere(&position, radius)?;
        let entry = self.entries.insert(position, radius, Location::Unplaced);
        let target = self.find_node(NodeId::ROOT, &position, radius);
        self.attach(target, entry);
        self.grow_extents(target, &Aabb3::from_center_radius(position, radius));
        Ok(entry)
    }

    pub(crate) fn remove(&mut self, entry: EntryId) -> IndexResult<()> {
        let stored = *self.entries.get(entry)?;
        let node = match stored.location {
            Location::Node(node) => node,
            location => return Err(IndexError::InvariantViolation { id: entry, location }),
        };
        self.remove_from(node, entry, &stored.bounding_box())?;
        self.entries.remove(entry)?;
        Ok(())
    }

    /// Detaches `entry` from `node`, invalidating boxes from `old_box`. If the entry
    /// is not there, tries the parent once before giving up.
    pub(crate) fn remove_from(
        &mut self,
        node: NodeId,
        entry: EntryId,
        old_box: &Aabb3,
    ) -> IndexResult<()> {
        if self.detach(node, entry, old_box) {
            return Ok(());
        }
        log::warn!(
            "entry {:?} missing from recorded node {:?}, retrying one level up",
            entry,
            node
        );
        self.stats.remove_retries += 1;
        if let Some(parent) = self.node(node).parent {
            if self.detach(parent, entry, old_box) {
                return Ok(());
            }
        }
        log::error!("entry {:?} not found near node {:?}", entry, node);
        Err(IndexError::InvariantViolation {
            id: entry,
            location: Location::Node(node),
        })
    }

    fn detach(&mut self, node: NodeId, entry: EntryId, old_box: &Aabb3) -> bool {
        self.shrink_extents(node, old_box);
        let target = self.node_mut(node);
        let Some(pos) = target.entries.iter().position(|&other| other == entry) else {
            return false;
        };
        target.entries.remove(pos);
        target.split_blocked = false;
        self.prune(node);
        true
    }

    /// Drops empty nodes bottom-up, unsplitting parents left without children.
    pub(crate) fn prune(&mut self, start: NodeId) {
        let mut current = start;
        loop {
            let node = self.node(current);
            let Some(parent) = node.parent else {
                return;
            };
            if !node.is_prunable() {
                return;
            }
            self.drop_child(parent, current);
            current = parent;
        }
    }

    fn drop_child(&mut self, parent: NodeId, child: NodeId) {
        let node = self.node_mut(parent);
        for slot in node.children.iter_mut() {
            if *slot == Some(child) {
                *slot = None;
            }
        }
        let now_empty = !node.has_children();
        self.release_node(child);
        self.stats.pruned_nodes += 1;
        if now_empty {
            self.unsplit(parent);
        }
    }

    pub(crate) fn unsplit(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.split = None;
        node.children = [None; CHILD_SLOTS];
        self.stats.unsplits += 1;
        log::debug!("node {:?} reverted to a leaf", id);
    }

    pub(crate) fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        depth
    }

    /// Every live node reachable from the root, parents before children.
    pub(crate) fn reachable_nodes(&self) -> Vec<NodeId> {
        let mut order = vec![NodeId::ROOT];
        let mut cursor = 0;
        while cursor < order.len() {
            let id = order[cursor];
            debug_assert!(self.node(id).alive, "released node {:?} still linked", id);
            order.extend(self.node(id).children.iter().flatten().copied());
            cursor += 1;
        }
        order
    }
}
