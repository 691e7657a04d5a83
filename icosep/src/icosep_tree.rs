//! Adaptive 27-way spatial partition tree.
//!
//! Every node is either a leaf holding entries directly, or split around a point.
//! A split node keeps the entries that straddle its split planes (or are too large
//! for its box) and hands everything else to one of up to 27 children, numbered
//! by three per-axis trinary digits. Node boxes are maintained lazily: cheap
//! widening on insert, invalidation on removal, recomputation on the next query.
//!
//! Queries take `&self` and still restructure the tree (recomputing boxes and
//! performing deferred splits), so the state lives behind a `RefCell`.

mod api;
mod core;
mod extents;
mod query;
mod split;
mod types;
mod update;

pub use types::{NodeId, NodeSummary, TreeStats, CHILD_SLOTS};

use crate::config::Config;
use crate::entry::EntryTable;
use std::cell::RefCell;
use types::*;

#[derive(Debug)]
pub struct IcosepTree {
    /// Read-only copy kept outside the cell so `config()` can hand out a reference.
    config: Config,
    inner: RefCell<TreeInner>,
}

#[derive(Debug)]
pub(crate) struct TreeInner {
    pub(crate) config: Config,
    pub(crate) nodes: Vec<Node>,
    pub(crate) free_node: Option<NodeId>,
    pub(crate) entries: EntryTable,
    pub(crate) stats: TreeStats,
}

#[cfg(test)]
mod tests;
