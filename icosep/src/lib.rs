//! Proximity indexes for dynamic populations of moving spheres.
//!
//! Three interchangeable backends answer "which entries are near this point":
//! a brute-force scan, a uniform hash grid, and the adaptive Icosep tree, which
//! splits space into up to 27 children per node around a weighted split point.
//! All three implement [`SpatialIndex`]; [`create_index`] builds one by kind.

pub mod brute_force;
pub mod config;
pub mod entry;
pub mod error;
pub mod grid;
pub mod icosep_tree;
pub mod index;

pub use brute_force::BruteForceIndex;
pub use common::shapes::{Aabb3, Sphere, Vec3};
pub use config::Config;
pub use entry::{Entry, EntryId, Location};
pub use error::{IndexError, IndexResult};
pub use grid::{CellKey, UniformGridIndex};
pub use icosep_tree::{IcosepTree, NodeId, NodeSummary, TreeStats};
pub use index::{create_index, Index, IndexKind, SpatialIndex};
