//! Filters that can be installed on a filtered tree view.
//!
//! - [`TextFilter`]: matches node text as a fixed string, wildcard or regex
//! - [`FilterItem`] / [`FilterSet`]: composable field tests loaded from JSON
//! - [`DateBucket`]: the relative date ranges `date_time` field tests compare
//!
//! Both implement [`Predicate`](arbor_core::Predicate), so either can be
//! handed to a resolver or a [`FilteredTreeModel`](crate::model::FilteredTreeModel).

mod date;
mod item;
mod text;
mod value;

pub use date::DateBucket;
pub use item::{FilterItem, FilterOp, FilterSet, FilterType};
pub use text::{CaseSensitivity, FilterText, PatternSyntax, TextFilter};
pub use value::{FilterFields, FilterValue};
