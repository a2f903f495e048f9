//! Tree models and filtered views.
//!
//! # Model Implementations
//!
//! - `TreeModel`: shared hierarchical storage that announces changes
//! - `FilteredTreeModel`: wraps a `TreeModel` and hides rows rejected by a filter
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::model::{FilteredTreeModel, TreeModel};
//! use arbor_core::EmptyGroupPolicy;
//!
//! let source = Arc::new(TreeModel::new());
//! let root = source.add_root("assets".to_string());
//! source.add_child(root, "chair".to_string()).unwrap();
//!
//! let view = FilteredTreeModel::new(source, EmptyGroupPolicy::ShowEmptyGroups);
//! view.set_filter(arbor_core::FnPredicate::new(|name: &String| name.starts_with('c')));
//! assert_eq!(view.row_count(Some(root)).unwrap(), 1);
//!
//! view.signals().layout_changed.connect(|_| {
//!     println!("visible rows changed");
//! });
//! ```

mod proxy_model;
mod tree_model;

pub use proxy_model::{CompareFn, FilterSignals, FilteredTreeModel, VisibleRow};
pub use tree_model::{TreeModel, TreeSignals};
