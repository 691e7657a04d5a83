use super::*;
use crate::entry::{EntryId, Location};
use crate::error::IndexError;
use crate::index::SpatialIndex;
use common::shapes::{Aabb3, Vec3};

const SLOT_ALL_BELOW: usize = 13;
const SLOT_ALL_ABOVE: usize = 26;

/// One small sphere in each corner of a 20-unit cube, split once around the origin.
fn corner_tree() -> (IcosepTree, Vec<EntryId>) {
    let mut tree = IcosepTree::new_with_config(Config::default().with_split_threshold(4)).unwrap();
    let mut ids = Vec::new();
    for &z in &[-10.0, 10.0] {
        for &y in &[-10.0, 10.0] {
            for &x in &[-10.0, 10.0] {
                ids.push(tree.insert(Vec3::new(x, y, z), 0.1).unwrap());
            }
        }
    }
    tree.refresh();
    (tree, ids)
}

fn child_at(tree: &IcosepTree, slot: usize) -> NodeId {
    tree.inner.borrow().node(NodeId::ROOT).children[slot].unwrap()
}

#[test]
fn test_selector_numbering() {
    let split = Vec3::new(5.0, 5.0, 5.0);
    assert_eq!(child_selector(&Vec3::zeros(), 0.5, &split), Some(SLOT_ALL_BELOW));
    assert_eq!(
        child_selector(&Vec3::new(9.0, 9.0, 9.0), 0.5, &split),
        Some(SLOT_ALL_ABOVE)
    );
    // x below, y above, z below
    assert_eq!(child_selector(&Vec3::new(1.0, 10.0, 1.0), 0.5, &split), Some(1 + 6 + 9));
}

#[test]
fn test_selector_straddle_and_own_axis() {
    let split = Vec3::new(5.0, 0.0, -5.0);
    assert_eq!(child_selector(&Vec3::new(5.2, 3.0, 3.0), 0.5, &split), None);
    assert_eq!(child_selector(&Vec3::new(1.0, 0.0, 3.0), 0.0, &split), None);
    // y is judged against split.y only, never against split.x.
    assert_eq!(child_selector(&Vec3::new(1.0, 3.0, 3.0), 0.5, &split), Some(1 + 6 + 18));
}

#[test]
fn test_oversized_entry_stays_local() {
    let mut inner = TreeInner::new_with_config(Config::default());
    let root = inner.node_mut(NodeId::ROOT);
    root.split = Some(Vec3::zeros());
    root.bounds = Aabb3::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));

    let far = Vec3::repeat(-5.0);
    assert_eq!(inner.which_child(NodeId::ROOT, &far, 1.0), Some(SLOT_ALL_BELOW));
    inner.node_mut(NodeId::ROOT).extents_valid = true;
    assert_eq!(inner.which_child(NodeId::ROOT, &far, 1.0), None);
    assert_eq!(inner.which_child(NodeId::ROOT, &far, 0.1), Some(SLOT_ALL_BELOW));
}

#[test]
fn test_split_separates_corners() {
    let (tree, ids) = corner_tree();
    let inner = tree.inner.borrow();
    let root = inner.node(NodeId::ROOT);
    assert!(root.is_split());
    assert!(root.entries.is_empty());
    assert_eq!(root.child_count(), 8);
    assert_eq!(inner.stats.splits, 1);
    for child in root.children.iter().flatten() {
        assert_eq!(inner.node(*child).entries.len(), 1);
        assert!(inner.node(*child).extents_valid);
    }
    assert_eq!(
        inner.entries.get(ids[0]).unwrap().location,
        Location::Node(root.children[SLOT_ALL_BELOW].unwrap())
    );
}

#[test]
fn test_query_performs_deferred_split() {
    let mut tree = IcosepTree::new_with_config(Config::default().with_split_threshold(4)).unwrap();
    let mut first = None;
    for &x in &[-10.0, 10.0] {
        for &y in &[-10.0, 10.0] {
            for &z in &[-10.0, 10.0] {
                let id = tree.insert(Vec3::new(x, y, z), 0.1).unwrap();
                first.get_or_insert(id);
            }
        }
    }
    assert_eq!(tree.stats().splits, 0);

    let hits = tree.query(Vec3::repeat(-10.0), 0.5).unwrap();
    assert_eq!(hits, vec![first.unwrap()]);
    assert_eq!(tree.stats().splits, 1);
    assert_eq!(tree.node_count(), 9);
}

#[test]
fn test_degenerate_split_reverts_to_leaf() {
    let mut tree = IcosepTree::new_with_config(Config::default().with_split_threshold(4)).unwrap();
    for i in 0..10 {
        tree.insert(Vec3::new(i as f32 * 0.1, 0.0, 0.0), 0.01).unwrap();
    }
    let mut inner = tree.inner.borrow_mut();
    inner.split_at(NodeId::ROOT, Vec3::repeat(100.0));

    let root = inner.node(NodeId::ROOT);
    assert!(!root.is_split());
    assert!(!root.has_children());
    assert_eq!(root.entries.len(), 10);
    assert_eq!(inner.stats.degenerate_splits, 1);
    assert_eq!(inner.stats.splits, 0);
    assert_eq!(inner.reachable_nodes().len(), 1);
}

/// Ten spheres stacked at one spot: the centroid split point touches all of them.
fn coincident_tree() -> (IcosepTree, Vec<EntryId>) {
    let mut tree = IcosepTree::new_with_config(Config::default().with_split_threshold(4)).unwrap();
    let ids = (0..10)
        .map(|_| tree.insert(Vec3::repeat(1.0), 0.5).unwrap())
        .collect();
    (tree, ids)
}

#[test]
fn test_degenerate_split_not_retried_until_entries_change() {
    let (mut tree, _) = coincident_tree();
    for _ in 0..10 {
        assert_eq!(tree.query(Vec3::repeat(1.0), 1.0).unwrap().len(), 10);
    }
    assert_eq!(tree.stats().degenerate_splits, 1);
    assert_eq!(tree.stats().splits, 0);

    let extra = tree.insert(Vec3::repeat(1.0), 0.5).unwrap();
    tree.query(Vec3::repeat(1.0), 1.0).unwrap();
    tree.query(Vec3::repeat(1.0), 1.0).unwrap();
    assert_eq!(tree.stats().degenerate_splits, 2);

    tree.remove(extra).unwrap();
    tree.refresh();
    tree.refresh();
    assert_eq!(tree.stats().degenerate_splits, 3);
    assert_eq!(tree.stats().splits, 0);
    assert!(tree.inner.borrow().node(NodeId::ROOT).split_blocked);
}

#[test]
fn test_moved_entry_unblocks_split() {
    let (mut tree, ids) = coincident_tree();
    tree.refresh();
    assert_eq!(tree.stats().degenerate_splits, 1);

    tree.update(ids[0], Vec3::repeat(10.0)).unwrap();
    assert!(!tree.inner.borrow().node(NodeId::ROOT).split_blocked);
    let hits = tree.query(Vec3::repeat(10.0), 0.5).unwrap();
    assert_eq!(hits, vec![ids[0]]);
    assert_eq!(tree.stats().splits, 1);
    assert_eq!(tree.stats().degenerate_splits, 1);
}

#[test]
fn test_remove_retries_one_level_up() {
    let (mut tree, ids) = corner_tree();
    let child = child_at(&tree, SLOT_ALL_BELOW);
    {
        let mut inner = tree.inner.borrow_mut();
        inner.node_mut(child).entries.retain(|&id| id != ids[0]);
        inner.node_mut(NodeId::ROOT).entries.push(ids[0]);
    }

    tree.remove(ids[0]).unwrap();
    assert_eq!(tree.stats().remove_retries, 1);
    assert_eq!(tree.len(), 7);
    assert!(tree.get(ids[0]).is_err());
}

#[test]
fn test_remove_surfaces_invariant_violation() {
    let (mut tree, ids) = corner_tree();
    let wrong = child_at(&tree, SLOT_ALL_ABOVE);
    tree.inner
        .borrow_mut()
        .entries
        .set_location(ids[0], Location::Node(wrong));

    assert_eq!(
        tree.remove(ids[0]),
        Err(IndexError::InvariantViolation {
            id: ids[0],
            location: Location::Node(wrong),
        })
    );
    assert_eq!(tree.len(), 8);
}

#[test]
fn test_remove_prunes_and_unsplits() {
    let (mut tree, ids) = corner_tree();
    tree.remove(ids[0]).unwrap();
    assert_eq!(tree.stats().pruned_nodes, 1);
    assert_eq!(tree.node_count(), 8);
    assert!(tree.inner.borrow().node(NodeId::ROOT).children[SLOT_ALL_BELOW].is_none());

    for &id in &ids[1..] {
        tree.remove(id).unwrap();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.stats().unsplits, 1);
    assert!(!tree.inner.borrow().node(NodeId::ROOT).is_split());
}

#[test]
fn test_released_nodes_are_reused() {
    let (mut tree, ids) = corner_tree();
    let arena = tree.inner.borrow().nodes.len();
    for &id in &ids {
        tree.remove(id).unwrap();
    }
    assert_eq!(tree.node_count(), 1);

    for &z in &[-10.0, 10.0] {
        for &y in &[-10.0, 10.0] {
            for &x in &[-10.0, 10.0] {
                tree.insert(Vec3::new(x, y, z), 0.1).unwrap();
            }
        }
    }
    tree.refresh();
    assert_eq!(tree.node_count(), 9);
    assert_eq!(tree.inner.borrow().nodes.len(), arena);
}

#[test]
fn test_update_climbs_then_descends() {
    let (mut tree, ids) = corner_tree();
    let target = child_at(&tree, 2 + 6 + 9);

    tree.update(ids[0], Vec3::new(9.5, 9.5, -9.5)).unwrap();
    assert_eq!(tree.stats().update_climbs, 1);
    assert_eq!(tree.get(ids[0]).unwrap().location, Location::Node(target));
    assert_eq!(tree.node_count(), 8);

    // Staying inside a valid leaf box needs no climb.
    tree.update(ids[7], Vec3::repeat(10.0)).unwrap();
    assert_eq!(tree.stats().update_climbs, 1);
    assert_eq!(
        tree.get(ids[7]).unwrap().location,
        Location::Node(child_at(&tree, SLOT_ALL_ABOVE))
    );
}

#[test]
fn test_extents_track_removal() {
    let (mut tree, ids) = corner_tree();
    assert_eq!(
        tree.bounds(),
        Some(Aabb3::new(Vec3::repeat(-10.1), Vec3::repeat(10.1)))
    );
    for &id in &ids[..7] {
        tree.remove(id).unwrap();
    }
    assert_eq!(
        tree.bounds(),
        Some(Aabb3::new(Vec3::repeat(9.9), Vec3::repeat(10.1)))
    );
    tree.remove(ids[7]).unwrap();
    assert_eq!(tree.bounds(), None);
}

#[test]
fn test_take_stats_resets_counters() {
    let (tree, _) = corner_tree();
    assert_eq!(tree.take_stats().splits, 1);
    assert_eq!(tree.stats(), TreeStats::default());
}
