//! Core systems for Arbor.
//!
//! This crate provides the toolkit-independent pieces of hierarchical tree
//! filtering:
//!
//! - **Tree storage**: [`TreeNodes`] and the [`TreeSource`] capability trait
//! - **Predicates**: the [`Predicate`] trait and closure adapters
//! - **Acceptance cache**: per-node cached accept/reject decisions
//! - **Visibility resolver**: per-row show/hide queries with cascading invalidation
//! - **Signal/Slot System**: change notification used by model adapters
//!
//! # Example
//!
//! ```
//! use arbor_core::{EmptyGroupPolicy, TreeNodes, VisibilityResolver};
//!
//! let mut tree = TreeNodes::new();
//! let group = tree.add_root("shots".to_string());
//! let foo = tree.add_child(group, "foo".to_string()).unwrap();
//! let bar = tree.add_child(group, "bar".to_string()).unwrap();
//!
//! let mut resolver = VisibilityResolver::new(EmptyGroupPolicy::HideEmptyGroups);
//! resolver.set_filter_fn(|name: &String| name.contains("oo"));
//!
//! assert!(resolver.is_row_visible(&tree, foo).unwrap());
//! assert!(!resolver.is_row_visible(&tree, bar).unwrap());
//! assert!(resolver.is_row_visible(&tree, group).unwrap());
//! ```

pub mod cache;
mod error;
pub mod logging;
pub mod predicate;
pub mod resolver;
pub mod signal;
pub mod tree;

pub use cache::{Acceptance, AcceptanceCache, AcceptanceRecord, CacheStats, EmptyGroupPolicy};
pub use error::{Error, Result};
pub use logging::{PerfSpan, TreeDebug, TreeFormatOptions, TreeStyle};
pub use predicate::{AcceptAll, FnPredicate, Predicate, PredicateError, TryFnPredicate};
pub use resolver::{SharedResolver, VisibilityResolver};
pub use signal::{ConnectionId, Signal};
pub use tree::{NodeId, RemovedSubtree, TreeNodes, TreeSource};
