//! Filtered view over a [`TreeModel`].
//!
//! `FilteredTreeModel` answers "which rows are visible under this parent"
//! through a [`VisibilityResolver`], and keeps the resolver's cache in step
//! with the source by listening to its [`TreeSignals`](super::TreeSignals).
//!
//! Lock order is always: source storage, then resolver.

use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use arbor_core::logging::{span_names, targets};
use arbor_core::{
    ConnectionId, EmptyGroupPolicy, NodeId, PerfSpan, Predicate, SharedResolver, Signal,
    TreeNodes, TreeSource, VisibilityResolver,
};

use super::tree_model::TreeModel;
use crate::error::Result;
use crate::filter::{FilterText, TextFilter};

/// Type alias for a sibling comparator over node data.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A row of [`FilteredTreeModel::visible_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    /// The visible node.
    pub id: NodeId,
    /// Nesting depth, `0` for roots.
    pub depth: usize,
}

/// Signals emitted by a filtered view.
pub struct FilterSignals {
    /// Emitted after the set of visible rows may have changed.
    pub layout_changed: Signal<()>,
}

impl Default for FilterSignals {
    fn default() -> Self {
        Self {
            layout_changed: Signal::new(),
        }
    }
}

struct SourceConnections {
    rows_inserted: ConnectionId,
    rows_removed: ConnectionId,
    data_changed: ConnectionId,
    model_reset: ConnectionId,
}

/// A view of a [`TreeModel`] that hides rows rejected by the current filter.
///
/// Visibility follows the hierarchical rules of [`VisibilityResolver`]: a
/// group is shown while any descendant leaf matches, and optionally when it
/// matches itself ([`EmptyGroupPolicy::ShowEmptyGroups`]).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arbor::model::{FilteredTreeModel, TreeModel};
/// use arbor::filter::TextFilter;
/// use arbor_core::EmptyGroupPolicy;
///
/// let source = Arc::new(TreeModel::new());
/// let seq = source.add_root("sq010".to_string());
/// source.add_child(seq, "sh010".to_string()).unwrap();
/// source.add_child(seq, "sh020".to_string()).unwrap();
///
/// let view = FilteredTreeModel::new(source.clone(), EmptyGroupPolicy::HideEmptyGroups);
/// view.set_text_filter(TextFilter::fixed("020"));
///
/// assert_eq!(view.row_count(None).unwrap(), 1);
/// assert_eq!(view.row_count(Some(seq)).unwrap(), 1);
/// ```
pub struct FilteredTreeModel<T: Send + Sync + 'static> {
    source: Arc<TreeModel<T>>,
    resolver: SharedResolver<T>,
    compare: RwLock<Option<CompareFn<T>>>,
    signals: Arc<FilterSignals>,
    connections: SourceConnections,
}

impl<T: Send + Sync + 'static> FilteredTreeModel<T> {
    /// Creates a view with no filter (every row visible).
    pub fn new(source: Arc<TreeModel<T>>, policy: EmptyGroupPolicy) -> Self {
        Self::with_resolver(source, VisibilityResolver::new(policy).into_shared())
    }

    /// Creates a view driven by an existing, possibly shared, resolver.
    pub fn with_resolver(source: Arc<TreeModel<T>>, resolver: SharedResolver<T>) -> Self {
        let signals = Arc::new(FilterSignals::default());
        let connections = Self::connect_source(&source, &resolver, &signals);
        Self {
            source,
            resolver,
            compare: RwLock::new(None),
            signals,
            connections,
        }
    }

    fn connect_source(
        source: &Arc<TreeModel<T>>,
        resolver: &SharedResolver<T>,
        signals: &Arc<FilterSignals>,
    ) -> SourceConnections {
        let tree_signals = source.signals();

        let rows_inserted = {
            let (source, resolver, signals) = Self::slot_context(source, resolver, signals);
            tree_signals
                .rows_inserted
                .connect(move |(parent, _ids): &(Option<NodeId>, Vec<NodeId>)| {
                    let Some(source) = source.upgrade() else {
                        return;
                    };
                    let outcome = {
                        let tree = source.read();
                        let mut resolver = resolver.lock();
                        match parent {
                            Some(parent) => resolver.on_children_changed(&*tree, *parent),
                            None => Ok(()),
                        }
                    };
                    report("rows inserted", outcome);
                    signals.layout_changed.emit(());
                })
        };

        let rows_removed = {
            let (source, resolver, signals) = Self::slot_context(source, resolver, signals);
            tree_signals
                .rows_removed
                .connect(move |(parent, ids): &(Option<NodeId>, Vec<NodeId>)| {
                    let Some(source) = source.upgrade() else {
                        return;
                    };
                    let outcome = {
                        let tree = source.read();
                        resolver.lock().on_nodes_removed(&*tree, *parent, ids)
                    };
                    report("rows removed", outcome);
                    signals.layout_changed.emit(());
                })
        };

        let data_changed = {
            let (source, resolver, signals) = Self::slot_context(source, resolver, signals);
            tree_signals.data_changed.connect(move |&id: &NodeId| {
                let Some(source) = source.upgrade() else {
                    return;
                };
                let outcome = {
                    let tree = source.read();
                    resolver.lock().on_node_changed(&*tree, id)
                };
                report("data changed", outcome);
                signals.layout_changed.emit(());
            })
        };

        let model_reset = {
            let (_, resolver, signals) = Self::slot_context(source, resolver, signals);
            tree_signals.model_reset.connect(move |_: &()| {
                resolver.lock().reset();
                signals.layout_changed.emit(());
            })
        };

        SourceConnections {
            rows_inserted,
            rows_removed,
            data_changed,
            model_reset,
        }
    }

    /// Slots hold the source weakly: the source owns the slots.
    fn slot_context(
        source: &Arc<TreeModel<T>>,
        resolver: &SharedResolver<T>,
        signals: &Arc<FilterSignals>,
    ) -> (Weak<TreeModel<T>>, SharedResolver<T>, Arc<FilterSignals>) {
        (Arc::downgrade(source), resolver.clone(), signals.clone())
    }

    /// Returns the source model.
    pub fn source(&self) -> &Arc<TreeModel<T>> {
        &self.source
    }

    /// Returns the resolver driving this view.
    pub fn resolver(&self) -> &SharedResolver<T> {
        &self.resolver
    }

    /// Returns the view's signals.
    pub fn signals(&self) -> &FilterSignals {
        &self.signals
    }

    // =========================================================================
    // Filter and sort configuration
    // =========================================================================

    /// Replaces the filter. Every cached decision is discarded.
    pub fn set_filter<P>(&self, predicate: P)
    where
        P: Predicate<T> + 'static,
    {
        self.resolver.lock().set_filter(predicate);
        self.invalidate();
    }

    /// Replaces the filter with a shared predicate.
    pub fn set_shared_filter(&self, predicate: Arc<dyn Predicate<T>>) {
        self.resolver.lock().set_shared_filter(predicate);
        self.invalidate();
    }

    /// Filters rows by their text.
    pub fn set_text_filter(&self, filter: TextFilter)
    where
        T: FilterText,
    {
        tracing::debug!(target: targets::MODEL, pattern = filter.pattern(), "text filter set");
        self.set_filter(filter);
    }

    /// Removes the filter, showing every row.
    pub fn clear_filter(&self) {
        self.resolver.lock().clear_filter();
        self.invalidate();
    }

    /// Changes the empty-group policy.
    pub fn set_empty_group_policy(&self, policy: EmptyGroupPolicy) {
        self.resolver.lock().set_empty_group_policy(policy);
        self.invalidate();
    }

    /// Orders visible siblings with `compare`. Ties keep source order.
    pub fn set_sort<F>(&self, compare: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        *self.compare.write() = Some(Arc::new(compare));
        self.invalidate();
    }

    /// Restores source order.
    pub fn clear_sort(&self) {
        *self.compare.write() = None;
        self.invalidate();
    }

    /// Tells views that the visible rows may have changed.
    ///
    /// Call this after changing what an installed predicate matches through
    /// some side channel, together with the matching resolver invalidation.
    pub fn invalidate(&self) {
        self.signals.layout_changed.emit(());
    }

    /// Refreshes one node after its data changed outside the source's
    /// notifications.
    pub fn refresh_node(&self, id: NodeId) -> Result<()> {
        {
            let tree = self.source.read();
            self.resolver.lock().on_node_changed(&*tree, id)?;
        }
        self.invalidate();
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if `id` is shown.
    pub fn is_row_visible(&self, id: NodeId) -> Result<bool> {
        let tree = self.source.read();
        Ok(self.resolver.lock().is_row_visible(&*tree, id)?)
    }

    /// The visible children of `parent` (roots when `None`), in view order.
    pub fn visible_children(&self, parent: Option<NodeId>) -> Result<Vec<NodeId>> {
        let tree = self.source.read();
        self.visible_children_in(&tree, parent)
    }

    /// The number of visible children of `parent`.
    pub fn row_count(&self, parent: Option<NodeId>) -> Result<usize> {
        Ok(self.visible_children(parent)?.len())
    }

    /// The node shown at `row` under `parent`, if any.
    pub fn index(&self, parent: Option<NodeId>, row: usize) -> Result<Option<NodeId>> {
        Ok(self.visible_children(parent)?.get(row).copied())
    }

    /// The view row of `id` under its parent, or `None` if it is hidden.
    pub fn map_from_source(&self, id: NodeId) -> Result<Option<usize>> {
        let tree = self.source.read();
        if !tree.contains(id) {
            return Err(arbor_core::Error::UnknownNode(id).into());
        }
        let siblings = self.visible_children_in(&tree, tree.parent_of(id))?;
        Ok(siblings.iter().position(|&sibling| sibling == id))
    }

    /// All visible rows, depth first, in view order.
    ///
    /// Hidden nodes are not descended into: a hidden node never has a
    /// visible descendant.
    pub fn visible_rows(&self) -> Result<Vec<VisibleRow>> {
        let _span = PerfSpan::new(span_names::VISIBLE_ROWS);
        let tree = self.source.read();

        let mut rows = Vec::new();
        let mut stack: Vec<VisibleRow> = self
            .visible_children_in(&tree, None)?
            .into_iter()
            .rev()
            .map(|id| VisibleRow { id, depth: 0 })
            .collect();

        while let Some(row) = stack.pop() {
            rows.push(row);
            let children = self.visible_children_in(&tree, Some(row.id))?;
            stack.extend(children.into_iter().rev().map(|id| VisibleRow {
                id,
                depth: row.depth + 1,
            }));
        }

        tracing::debug!(target: targets::MODEL, rows = rows.len(), "visible rows collected");
        Ok(rows)
    }

    fn visible_children_in(
        &self,
        tree: &TreeNodes<T>,
        parent: Option<NodeId>,
    ) -> Result<Vec<NodeId>> {
        let children = match parent {
            None => tree.roots(),
            Some(id) => tree
                .children_of(id)
                .ok_or(arbor_core::Error::UnknownNode(id))?,
        };

        let mut visible = Vec::with_capacity(children.len());
        {
            let mut resolver = self.resolver.lock();
            for &child in children {
                if resolver.is_row_visible(tree, child)? {
                    visible.push(child);
                }
            }
        }

        if let Some(compare) = self.compare.read().as_ref() {
            visible.sort_by(|&a, &b| match (tree.data(a), tree.data(b)) {
                (Some(a), Some(b)) => compare(a, b),
                _ => Ordering::Equal,
            });
        }
        Ok(visible)
    }
}

impl<T: Send + Sync + 'static> Drop for FilteredTreeModel<T> {
    fn drop(&mut self) {
        let signals = self.source.signals();
        signals.rows_inserted.disconnect(self.connections.rows_inserted);
        signals.rows_removed.disconnect(self.connections.rows_removed);
        signals.data_changed.disconnect(self.connections.data_changed);
        signals.model_reset.disconnect(self.connections.model_reset);
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for FilteredTreeModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredTreeModel")
            .field("source", &self.source)
            .field("sorted", &self.compare.read().is_some())
            .finish_non_exhaustive()
    }
}

fn report(event: &str, outcome: arbor_core::Result<()>) {
    if let Err(err) = outcome {
        tracing::warn!(target: targets::MODEL, event, error = %err, "failed to update filter cache");
    }
}
