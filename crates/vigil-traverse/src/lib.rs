//! Vigil cooperative traversal
//!
//! Breadth-first walks that yield control every `batch_size` node visits so a
//! host can drive a long scan from its own periodic tick.
//!
//! # Core Concepts
//!
//! - [`HierarchyWalk`]: one visit per unique container under a root set
//! - [`FieldWalk`]: one visit per unique field node of every component
//! - [`BatchSize`] / [`BatchingPriority`]: slice size and its named presets
//! - [`Step`]: result of a resume (suspended or complete)
//!
//! Walks borrow the graph only for the duration of one `resume`, so the host
//! may mutate it between slices; destroyed or stale nodes are skipped.
//!
//! # Example
//!
//! ```rust
//! use vigil_model::SceneGraph;
//! use vigil_traverse::{BatchSize, HierarchyWalk, Step};
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.add_root("level", "Main");
//! graph.add_child(root, "door").unwrap();
//!
//! let mut walk = HierarchyWalk::new(graph.roots().to_vec(), BatchSize::limited(1));
//! let mut names = Vec::new();
//! while walk.resume(&graph, |c| names.push(c.name().to_string())) == Step::Suspended {}
//! assert_eq!(names, ["level", "door"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod batch;
mod field;
mod hierarchy;

pub use batch::{BatchBudget, BatchSize, BatchingPriority, Step};
pub use field::{FieldVisit, FieldWalk};
pub use hierarchy::HierarchyWalk;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
