//! Prelude module for Arbor.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use arbor::prelude::*;
//! ```

// ============================================================================
// Core filtering
// ============================================================================

pub use arbor_core::{
    Acceptance, EmptyGroupPolicy, FnPredicate, NodeId, Predicate, PredicateError,
    SharedResolver, TreeNodes, TreeSource, TryFnPredicate, VisibilityResolver,
};

// ============================================================================
// Models
// ============================================================================

pub use crate::model::{FilteredTreeModel, TreeModel, VisibleRow};

// ============================================================================
// Filters
// ============================================================================

pub use crate::filter::{
    CaseSensitivity, FilterFields, FilterItem, FilterOp, FilterSet, FilterText, FilterType,
    FilterValue, PatternSyntax, TextFilter,
};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use crate::config::FilterConfig;
pub use crate::{Error, Result};
