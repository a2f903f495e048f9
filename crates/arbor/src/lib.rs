//! Arbor - hierarchical filtering for tree models.
//!
//! This is the main crate. It re-exports the core filtering engine from
//! `arbor_core` and adds:
//!
//! - **Models**: a shared [`TreeModel`](model::TreeModel) and the
//!   [`FilteredTreeModel`](model::FilteredTreeModel) view over it
//! - **Filters**: text filters and composable field filters
//! - **Configuration**: [`FilterConfig`](config::FilterConfig) loaded from TOML or JSON
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor::prelude::*;
//!
//! let source = Arc::new(TreeModel::new());
//! let seq = source.add_root("sq010".to_string());
//! let shot = source.add_child(seq, "sh010_hero".to_string()).unwrap();
//! source.add_child(seq, "sh020".to_string()).unwrap();
//!
//! let view = FilteredTreeModel::new(source.clone(), EmptyGroupPolicy::HideEmptyGroups);
//! view.set_text_filter(TextFilter::fixed("hero"));
//!
//! assert_eq!(view.visible_children(Some(seq)).unwrap(), vec![shot]);
//! ```

pub use arbor_core::*;

pub mod config;
mod error;
pub mod filter;
pub mod model;
pub mod prelude;

pub use error::{Error, Result};
