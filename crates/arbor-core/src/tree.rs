//! Hierarchical node storage.
//!
//! [`TreeNodes`] owns node identities, payloads and parent/child links. The
//! cache and resolver never touch it directly; they consume the minimal
//! [`TreeSource`] capability set instead, so any tree with stable node
//! identities can be filtered.

use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

new_key_type! {
    /// Stable identity of a node in a tree.
    ///
    /// Keys are generational: once a node is removed its `NodeId` is never
    /// handed out again, so stale identities are reported as
    /// [`Error::UnknownNode`] instead of silently aliasing a new node.
    pub struct NodeId;
}

/// The traversal capabilities the filtering core needs from a tree.
///
/// Implementors only have to answer structural questions; how the tree is
/// stored, locked or notified about changes is up to them.
pub trait TreeSource {
    /// The payload type carried by each node.
    type Data;

    /// Top-level nodes, in display order.
    fn roots(&self) -> &[NodeId];

    /// Ordered children of `id`, or `None` if the node is unknown.
    ///
    /// A known node with no children returns an empty slice.
    fn children_of(&self, id: NodeId) -> Option<&[NodeId]>;

    /// The payload of `id`, or `None` if the node is unknown.
    fn data_of(&self, id: NodeId) -> Option<&Self::Data>;

    /// The parent of `id`. Returns `None` for top-level and unknown nodes;
    /// use [`contains`](Self::contains) to tell them apart.
    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// Returns `true` if `id` is present in the tree.
    fn contains(&self, id: NodeId) -> bool {
        self.children_of(id).is_some()
    }
}

/// A node in the tree structure.
#[derive(Debug, Clone)]
struct TreeNode<T> {
    data: T,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// What was detached by [`TreeNodes::remove`].
#[derive(Debug, Clone)]
pub struct RemovedSubtree<T> {
    /// The former parent of the removed node (`None` for a top-level node).
    pub parent: Option<NodeId>,
    /// The removed node followed by all of its descendants.
    pub ids: Vec<NodeId>,
    /// The payload of the removed node itself.
    pub data: T,
}

/// Plain, single-owner tree storage.
///
/// # Example
///
/// ```
/// use arbor_core::{TreeNodes, TreeSource};
///
/// let mut tree = TreeNodes::new();
/// let root = tree.add_root("Documents");
/// let child = tree.add_child(root, "file.txt").unwrap();
///
/// assert_eq!(tree.parent_of(child), Some(root));
/// assert_eq!(tree.children_of(root), Some(&[child][..]));
/// ```
#[derive(Debug, Clone)]
pub struct TreeNodes<T> {
    nodes: SlotMap<NodeId, TreeNode<T>>,
    roots: Vec<NodeId>,
}

impl<T> TreeNodes<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    /// Adds a top-level node and returns its ID.
    pub fn add_root(&mut self, data: T) -> NodeId {
        let id = self.nodes.insert(TreeNode {
            data,
            children: Vec::new(),
            parent: None,
        });
        self.roots.push(id);
        id
    }

    /// Appends a child to `parent` and returns its ID.
    pub fn add_child(&mut self, parent: NodeId, data: T) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::UnknownNode(parent));
        }

        let id = self.nodes.insert(TreeNode {
            data,
            children: Vec::new(),
            parent: Some(parent),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    /// Removes a node and all of its descendants.
    pub fn remove(&mut self, id: NodeId) -> Result<RemovedSubtree<T>> {
        let parent = self.nodes.get(id).ok_or(Error::UnknownNode(id))?.parent;

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let ids = self.descendants_inclusive(id);
        let mut data = None;
        for &removed in &ids {
            if let Some(node) = self.nodes.remove(removed) {
                if removed == id {
                    data = Some(node.data);
                }
            }
        }

        let data = data.ok_or(Error::UnknownNode(id))?;
        Ok(RemovedSubtree { parent, ids, data })
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read access to a node's payload.
    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.data)
    }

    /// Mutable access to a node's payload.
    ///
    /// The caller is responsible for reporting the change to any resolver
    /// indexing this tree.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|node| &mut node.data)
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(id).map(|node| node.children.is_empty())
    }

    /// Position of `id` among its siblings.
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        let node = self.nodes.get(id)?;
        let siblings = match node.parent {
            Some(parent) => &self.nodes.get(parent)?.children,
            None => &self.roots,
        };
        siblings.iter().position(|&sibling| sibling == id)
    }

    /// Iterates the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_of(id), move |&current| self.parent_of(current))
    }

    /// All descendants of `id` in depth-first order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = self.descendants_inclusive(id);
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }

    /// Iterates every node ID in storage order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    fn descendants_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        if !self.nodes.contains_key(id) {
            return ids;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        ids
    }
}

impl<T> Default for TreeNodes<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeSource for TreeNodes<T> {
    type Data = T;

    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id).map(|node| node.children.as_slice())
    }

    fn data_of(&self, id: NodeId) -> Option<&T> {
        self.data(id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }
}
