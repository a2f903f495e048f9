//! Shared hierarchical tree model.
//!
//! `TreeModel` wraps [`TreeNodes`] behind a lock and announces every change
//! through [`TreeSignals`], so filtered views can keep their caches in sync.

use parking_lot::{RwLock, RwLockReadGuard};

use arbor_core::logging::targets;
use arbor_core::{NodeId, Signal, TreeNodes, TreeSource};

use crate::error::{Error, Result};

/// Change notifications emitted by a [`TreeModel`].
///
/// Signals fire after the model's storage lock has been released, so slots
/// may read the model.
pub struct TreeSignals {
    /// Emitted after nodes were added.
    /// Args: (parent, new node ids)
    pub rows_inserted: Signal<(Option<NodeId>, Vec<NodeId>)>,

    /// Emitted after a subtree was removed.
    /// Args: (former parent, removed node and all its descendants)
    pub rows_removed: Signal<(Option<NodeId>, Vec<NodeId>)>,

    /// Emitted when a node's data was replaced or modified.
    pub data_changed: Signal<NodeId>,

    /// Emitted after the whole tree was cleared or replaced.
    pub model_reset: Signal<()>,
}

impl Default for TreeSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSignals {
    /// Creates a new set of tree signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
            model_reset: Signal::new(),
        }
    }
}

/// A hierarchical model for parent-child data.
///
/// # Example
///
/// ```
/// use arbor::model::TreeModel;
///
/// let model = TreeModel::new();
/// let seq = model.add_root("sq010".to_string());
/// let shot = model.add_child(seq, "sh010".to_string()).unwrap();
///
/// model.modify_node(shot, |name| name.push_str("_v2")).unwrap();
/// assert_eq!(model.with_node(shot, |name| name.clone()), Some("sh010_v2".to_string()));
/// ```
pub struct TreeModel<T> {
    storage: RwLock<TreeNodes<T>>,
    signals: TreeSignals,
}

impl<T: Send + Sync + 'static> TreeModel<T> {
    /// Creates a new empty tree model.
    pub fn new() -> Self {
        Self::from_nodes(TreeNodes::new())
    }

    /// Creates a model over existing storage.
    pub fn from_nodes(nodes: TreeNodes<T>) -> Self {
        Self {
            storage: RwLock::new(nodes),
            signals: TreeSignals::new(),
        }
    }

    /// Returns the change signals.
    pub fn signals(&self) -> &TreeSignals {
        &self.signals
    }

    /// Read access to the storage, usable as a [`TreeSource`].
    ///
    /// Mutating methods block while the guard is held.
    pub fn read(&self) -> RwLockReadGuard<'_, TreeNodes<T>> {
        self.storage.read()
    }

    /// Adds a root-level node and returns its ID.
    pub fn add_root(&self, data: T) -> NodeId {
        let id = self.storage.write().add_root(data);
        tracing::trace!(target: targets::MODEL, node = ?id, "root added");
        self.signals.rows_inserted.emit((None, vec![id]));
        id
    }

    /// Adds a child node to the specified parent and returns its ID.
    pub fn add_child(&self, parent: NodeId, data: T) -> Result<NodeId> {
        let id = self.storage.write().add_child(parent, data)?;
        tracing::trace!(target: targets::MODEL, node = ?id, parent = ?parent, "child added");
        self.signals.rows_inserted.emit((Some(parent), vec![id]));
        Ok(id)
    }

    /// Appends several children to `parent` with a single notification.
    pub fn add_children<I>(&self, parent: NodeId, data: I) -> Result<Vec<NodeId>>
    where
        I: IntoIterator<Item = T>,
    {
        let ids = {
            let mut storage = self.storage.write();
            if !storage.contains(parent) {
                return Err(Error::Core(arbor_core::Error::UnknownNode(parent)));
            }
            data.into_iter()
                .map(|item| storage.add_child(parent, item))
                .collect::<arbor_core::Result<Vec<_>>>()?
        };
        if !ids.is_empty() {
            self.signals.rows_inserted.emit((Some(parent), ids.clone()));
        }
        Ok(ids)
    }

    /// Removes a node and all its descendants, returning the node's data.
    pub fn remove(&self, id: NodeId) -> Result<T> {
        let removed = self.storage.write().remove(id)?;
        tracing::trace!(
            target: targets::MODEL,
            node = ?id,
            count = removed.ids.len(),
            "subtree removed"
        );
        self.signals
            .rows_removed
            .emit((removed.parent, removed.ids));
        Ok(removed.data)
    }

    /// Clears all nodes from the tree.
    pub fn clear(&self) {
        self.storage.write().clear();
        self.signals.model_reset.emit(());
    }

    /// Replaces the whole tree.
    pub fn reset(&self, nodes: TreeNodes<T>) {
        *self.storage.write() = nodes;
        self.signals.model_reset.emit(());
    }

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.storage.read().len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.read().is_empty()
    }

    /// Returns the number of root-level nodes.
    pub fn root_count(&self) -> usize {
        self.storage.read().roots().len()
    }

    /// Returns `true` if `id` is in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.storage.read().contains(id)
    }

    /// Provides read access to a node's data.
    pub fn with_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.storage.read().data(id).map(f)
    }

    /// Provides mutable access to a node's data.
    ///
    /// Emits `data_changed` after modification.
    pub fn modify_node<F, R>(&self, id: NodeId, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut storage = self.storage.write();
            let data = storage
                .data_mut(id)
                .ok_or(arbor_core::Error::UnknownNode(id))?;
            f(data)
        };
        self.signals.data_changed.emit(id);
        Ok(result)
    }

    /// Replaces a node's data, returning the previous value.
    pub fn set_data(&self, id: NodeId, data: T) -> Result<T> {
        self.modify_node(id, |slot| std::mem::replace(slot, data))
    }
}

impl<T: Send + Sync + 'static> Default for TreeModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TreeModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeModel")
            .field("nodes", &self.storage.read().len())
            .finish()
    }
}
