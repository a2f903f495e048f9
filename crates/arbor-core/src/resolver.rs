//! Per-row visibility queries.
//!
//! [`VisibilityResolver`] owns the active predicate, the empty-group policy
//! and the [`AcceptanceCache`]. Presentation layers ask it one row at a
//! time; results are computed lazily and cached until something relevant
//! changes:
//!
//! - the predicate or policy changes: the whole cache is dropped
//! - a node's data or child set changes: the node and all of its ancestors
//!   are invalidated
//! - nodes are removed: their records are destroyed and the former parent's
//!   chain is invalidated
//!
//! The resolver never walks the tree eagerly and never pushes
//! notifications. It is not tied to a particular tree type; every query
//! takes the [`TreeSource`] it should be answered against, which must be the
//! same tree the cache was built from.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{Acceptance, AcceptanceCache, CacheStats, EmptyGroupPolicy};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::predicate::{AcceptAll, FnPredicate, Predicate};
use crate::tree::{NodeId, TreeSource};

/// A resolver shared between several views over the same tree.
///
/// Sharing one instance shares one cache, so work done for one view is
/// reused by the others. Access is expected from a single thread; the mutex
/// only enforces that discipline.
pub type SharedResolver<T> = Arc<Mutex<VisibilityResolver<T>>>;

/// Decides which rows of a tree are visible under the current filter.
pub struct VisibilityResolver<T> {
    cache: AcceptanceCache,
    predicate: Arc<dyn Predicate<T>>,
    policy: EmptyGroupPolicy,
    filtered: bool,
}

impl<T: 'static> VisibilityResolver<T> {
    /// Create a resolver with no filter (every node is accepted).
    pub fn new(policy: EmptyGroupPolicy) -> Self {
        Self {
            cache: AcceptanceCache::new(),
            predicate: Arc::new(AcceptAll),
            policy,
            filtered: false,
        }
    }

    /// Create a resolver with an initial predicate.
    pub fn with_predicate<P>(policy: EmptyGroupPolicy, predicate: P) -> Self
    where
        P: Predicate<T> + 'static,
    {
        let mut resolver = Self::new(policy);
        resolver.set_filter(predicate);
        resolver
    }

    /// Wrap this resolver for sharing between views.
    pub fn into_shared(self) -> SharedResolver<T> {
        Arc::new(Mutex::new(self))
    }

    /// The active empty-group policy.
    pub fn policy(&self) -> EmptyGroupPolicy {
        self.policy
    }

    /// Change the empty-group policy. Every cached result is dropped.
    pub fn set_empty_group_policy(&mut self, policy: EmptyGroupPolicy) {
        if self.policy != policy {
            self.policy = policy;
            self.cache.invalidate_all();
        }
    }

    /// Returns `true` if a filter other than the accept-everything default is set.
    pub fn has_filter(&self) -> bool {
        self.filtered
    }

    /// Replace the active predicate and invalidate the entire cache.
    pub fn set_filter<P>(&mut self, predicate: P)
    where
        P: Predicate<T> + 'static,
    {
        self.set_shared_filter(Arc::new(predicate));
    }

    /// Replace the active predicate with one that is shared elsewhere.
    pub fn set_shared_filter(&mut self, predicate: Arc<dyn Predicate<T>>) {
        tracing::debug!(target: targets::RESOLVER, "filter replaced");
        self.predicate = predicate;
        self.filtered = true;
        self.cache.invalidate_all();
    }

    /// Replace the active predicate with a closure.
    pub fn set_filter_fn<F>(&mut self, f: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.set_filter(FnPredicate::new(f));
    }

    /// Remove the filter so every node is accepted again.
    pub fn clear_filter(&mut self) {
        tracing::debug!(target: targets::RESOLVER, "filter cleared");
        self.predicate = Arc::new(AcceptAll);
        self.filtered = false;
        self.cache.invalidate_all();
    }

    /// Returns `true` if `id` should be shown.
    ///
    /// Computes (and caches) the node's acceptance on demand. Fails with
    /// [`Error::UnknownNode`] if `id` is not in `tree`, or with
    /// [`Error::Predicate`] if the predicate fails.
    pub fn is_row_visible<S>(&mut self, tree: &S, id: NodeId) -> Result<bool>
    where
        S: TreeSource<Data = T> + ?Sized,
    {
        let acceptance = self
            .cache
            .get_or_compute(tree, id, self.predicate.as_ref(), self.policy)?;
        Ok(acceptance.is_accepted())
    }

    /// The cached acceptance of `id`, without computing anything.
    pub fn acceptance(&self, id: NodeId) -> Acceptance {
        self.cache.acceptance(id)
    }

    /// Report that the data of `id` changed.
    ///
    /// Invalidates the node and walks its ancestors invalidating each, since
    /// their branch visibility may depend on this node.
    pub fn on_node_changed<S>(&mut self, tree: &S, id: NodeId) -> Result<()>
    where
        S: TreeSource + ?Sized,
    {
        if !tree.contains(id) {
            return Err(Error::UnknownNode(id));
        }

        self.cache.invalidate(id);
        let mut invalidated = 1usize;
        let mut current = tree.parent_of(id);
        while let Some(ancestor) = current {
            self.cache.invalidate(ancestor);
            invalidated += 1;
            current = tree.parent_of(ancestor);
        }

        tracing::debug!(
            target: targets::RESOLVER,
            node = ?id,
            invalidated,
            "node changed"
        );
        Ok(())
    }

    /// Report that the child set of `parent` changed (rows inserted, moved
    /// or reordered). Same cascade as [`on_node_changed`](Self::on_node_changed).
    pub fn on_children_changed<S>(&mut self, tree: &S, parent: NodeId) -> Result<()>
    where
        S: TreeSource + ?Sized,
    {
        self.on_node_changed(tree, parent)
    }

    /// Report that `removed` nodes left the tree, detached from `parent`.
    ///
    /// Destroys their records. If they hung under a parent that is still in
    /// the tree, that parent's chain is invalidated. `tree` is the tree after
    /// the removal.
    pub fn on_nodes_removed<S>(
        &mut self,
        tree: &S,
        parent: Option<NodeId>,
        removed: &[NodeId],
    ) -> Result<()>
    where
        S: TreeSource + ?Sized,
    {
        let destroyed = removed.iter().filter(|&&id| self.cache.remove(id)).count();
        tracing::debug!(
            target: targets::RESOLVER,
            removed = removed.len(),
            destroyed,
            "nodes removed"
        );

        match parent {
            Some(parent) if tree.contains(parent) => self.on_node_changed(tree, parent),
            _ => Ok(()),
        }
    }

    /// Drop every cached result, e.g. because the tree was replaced wholesale.
    pub fn reset(&mut self) {
        tracing::debug!(target: targets::RESOLVER, "resolver reset");
        self.cache.invalidate_all();
    }

    /// Enable or disable result caching. The cache is cleared either way.
    pub fn enable_caching(&mut self, enable: bool) {
        self.cache.set_enabled(enable);
    }

    /// Returns `true` if results are being cached.
    pub fn is_caching_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Drop records for nodes no longer present in `tree`.
    pub fn minimize<S>(&mut self, tree: &S)
    where
        S: TreeSource + ?Sized,
    {
        self.cache.minimize(tree);
    }

    /// Cache effectiveness counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Read access to the underlying cache.
    pub fn cache(&self) -> &AcceptanceCache {
        &self.cache
    }
}

impl<T> std::fmt::Debug for VisibilityResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityResolver")
            .field("policy", &self.policy)
            .field("filtered", &self.filtered)
            .field("cache", &self.cache.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNodes;
    use std::collections::HashMap;

    use super::EmptyGroupPolicy::{HideEmptyGroups, ShowEmptyGroups};

    /// Substring predicate that counts evaluations per node label.
    #[derive(Clone, Default)]
    struct Counting {
        needle: Arc<Mutex<String>>,
        calls: Arc<Mutex<HashMap<String, usize>>>,
    }

    impl Counting {
        fn new(needle: &str) -> Self {
            let counting = Self::default();
            *counting.needle.lock() = needle.to_string();
            counting
        }

        fn calls(&self, label: &str) -> usize {
            self.calls.lock().get(label).copied().unwrap_or(0)
        }
    }

    impl Predicate<String> for Counting {
        fn accepts(&self, data: &String) -> std::result::Result<bool, crate::PredicateError> {
            *self.calls.lock().entry(data.clone()).or_default() += 1;
            Ok(data.contains(self.needle.lock().as_str()))
        }
    }

    fn deep_tree() -> (TreeNodes<String>, HashMap<&'static str, NodeId>) {
        let mut tree = TreeNodes::new();
        let mut ids = HashMap::new();
        let root = tree.add_root("root".to_string());
        let left = tree.add_child(root, "left".to_string()).unwrap();
        let right = tree.add_child(root, "right".to_string()).unwrap();
        let l1 = tree.add_child(left, "apple".to_string()).unwrap();
        let l2 = tree.add_child(left, "apricot".to_string()).unwrap();
        let r1 = tree.add_child(right, "banana".to_string()).unwrap();
        ids.extend([
            ("root", root),
            ("left", left),
            ("right", right),
            ("apple", l1),
            ("apricot", l2),
            ("banana", r1),
        ]);
        (tree, ids)
    }

    #[test]
    fn test_no_filter_shows_everything() {
        let (tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        assert!(!resolver.has_filter());
        for &id in ids.values() {
            assert!(resolver.is_row_visible(&tree, id).unwrap());
        }
    }

    #[test]
    fn test_branch_visibility_follows_descendants() {
        let (tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        resolver.set_filter_fn(|s: &String| s.starts_with("ap"));

        assert!(resolver.is_row_visible(&tree, ids["root"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["left"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["apple"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["apricot"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["banana"]).unwrap());
    }

    #[test]
    fn test_show_empty_groups_policy() {
        let (tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        resolver.set_filter_fn(|s: &String| s == "right");

        assert!(!resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["root"]).unwrap());

        resolver.set_empty_group_policy(ShowEmptyGroups);
        assert!(resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["root"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["banana"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["left"]).unwrap());
    }

    #[test]
    fn test_directly_matching_nested_group_keeps_ancestors_visible() {
        let mut tree = TreeNodes::new();
        let root = tree.add_root("root".to_string());
        let group = tree.add_child(root, "match".to_string()).unwrap();
        let leaf = tree.add_child(group, "x".to_string()).unwrap();

        let mut resolver = VisibilityResolver::new(ShowEmptyGroups);
        resolver.set_filter_fn(|s: &String| s == "match");
        assert!(resolver.is_row_visible(&tree, root).unwrap());
        assert!(resolver.is_row_visible(&tree, group).unwrap());
        assert!(!resolver.is_row_visible(&tree, leaf).unwrap());

        resolver.set_empty_group_policy(HideEmptyGroups);
        for id in [root, group, leaf] {
            assert!(!resolver.is_row_visible(&tree, id).unwrap());
        }
    }

    #[test]
    fn test_deep_chain_change_reaches_the_root() {
        let mut tree = TreeNodes::new();
        let root = tree.add_root("level".to_string());
        let mut tip = root;
        for _ in 0..100_000 {
            tip = tree.add_child(tip, "level".to_string()).unwrap();
        }

        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        resolver.set_filter_fn(|s: &String| s == "found");
        assert!(!resolver.is_row_visible(&tree, root).unwrap());

        *tree.data_mut(tip).unwrap() = "found".to_string();
        resolver.on_node_changed(&tree, tip).unwrap();
        assert!(resolver.is_row_visible(&tree, root).unwrap());
    }

    #[test]
    fn test_on_node_changed_recomputes_only_the_ancestor_chain() {
        let (mut tree, ids) = deep_tree();
        let counting = Counting::new("an");
        let mut resolver = VisibilityResolver::with_predicate(ShowEmptyGroups, counting.clone());

        for &id in ids.values() {
            resolver.is_row_visible(&tree, id).unwrap();
        }
        for label in ["root", "left", "right", "apple", "apricot", "banana"] {
            assert_eq!(counting.calls(label), 1, "{label} evaluated once");
        }

        *tree.data_mut(ids["apricot"]).unwrap() = "mango".to_string();
        resolver.on_node_changed(&tree, ids["apricot"]).unwrap();

        assert_eq!(resolver.acceptance(ids["apricot"]), Acceptance::Unknown);
        assert_eq!(resolver.acceptance(ids["left"]), Acceptance::Unknown);
        assert_eq!(resolver.acceptance(ids["root"]), Acceptance::Unknown);
        assert!(resolver.acceptance(ids["apple"]).is_known());
        assert!(resolver.acceptance(ids["right"]).is_known());

        for &id in ids.values() {
            resolver.is_row_visible(&tree, id).unwrap();
        }

        assert_eq!(counting.calls("mango"), 1);
        assert_eq!(counting.calls("left"), 2);
        assert_eq!(counting.calls("root"), 2);
        assert_eq!(counting.calls("apple"), 1);
        assert_eq!(counting.calls("right"), 1);
        assert_eq!(counting.calls("banana"), 1);
        assert!(resolver.is_row_visible(&tree, ids["left"]).unwrap());
    }

    #[test]
    fn test_set_filter_never_serves_stale_results() {
        let (tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);

        resolver.set_filter_fn(|s: &String| s == "banana");
        assert!(resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["left"]).unwrap());

        resolver.set_filter_fn(|s: &String| s == "apple");
        assert!(!resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["left"]).unwrap());

        resolver.clear_filter();
        assert!(resolver.is_row_visible(&tree, ids["right"]).unwrap());
    }

    #[test]
    fn test_unknown_node_is_reported() {
        let (mut tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        tree.remove(ids["right"]).unwrap();

        assert!(matches!(
            resolver.is_row_visible(&tree, ids["banana"]),
            Err(Error::UnknownNode(_))
        ));
        assert!(matches!(
            resolver.on_node_changed(&tree, ids["banana"]),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn test_on_nodes_removed_destroys_records() {
        let (mut tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        resolver.set_filter_fn(|s: &String| s == "banana");

        for &id in ids.values() {
            resolver.is_row_visible(&tree, id).unwrap();
        }
        assert!(resolver.is_row_visible(&tree, ids["root"]).unwrap());

        let removed = tree.remove(ids["right"]).unwrap();
        resolver
            .on_nodes_removed(&tree, removed.parent, &removed.ids)
            .unwrap();

        assert!(resolver.cache().record(ids["right"]).is_none());
        assert!(resolver.cache().record(ids["banana"]).is_none());
        assert_eq!(resolver.acceptance(ids["root"]), Acceptance::Unknown);
        assert!(!resolver.is_row_visible(&tree, ids["root"]).unwrap());
    }

    #[test]
    fn test_on_children_changed_picks_up_new_rows() {
        let (mut tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        resolver.set_filter_fn(|s: &String| s.contains("cherry"));

        assert!(!resolver.is_row_visible(&tree, ids["root"]).unwrap());

        tree.add_child(ids["right"], "cherry".to_string()).unwrap();
        resolver.on_children_changed(&tree, ids["right"]).unwrap();

        assert!(resolver.is_row_visible(&tree, ids["right"]).unwrap());
        assert!(resolver.is_row_visible(&tree, ids["root"]).unwrap());
        assert!(!resolver.is_row_visible(&tree, ids["left"]).unwrap());
    }

    #[test]
    fn test_caching_can_be_disabled() {
        let (tree, ids) = deep_tree();
        let counting = Counting::new("apple");
        let mut resolver = VisibilityResolver::with_predicate(HideEmptyGroups, counting.clone());
        resolver.enable_caching(false);
        assert!(!resolver.is_caching_enabled());

        resolver.is_row_visible(&tree, ids["apple"]).unwrap();
        resolver.is_row_visible(&tree, ids["apple"]).unwrap();
        assert_eq!(counting.calls("apple"), 2);

        resolver.enable_caching(true);
        resolver.is_row_visible(&tree, ids["apple"]).unwrap();
        resolver.is_row_visible(&tree, ids["apple"]).unwrap();
        assert_eq!(counting.calls("apple"), 3);
        assert!(resolver.cache_stats().hits >= 1);
    }

    #[test]
    fn test_minimize_and_reset() {
        let (mut tree, ids) = deep_tree();
        let mut resolver = VisibilityResolver::new(HideEmptyGroups);
        for &id in ids.values() {
            resolver.is_row_visible(&tree, id).unwrap();
        }
        assert_eq!(resolver.cache_stats().size, 6);

        tree.remove(ids["left"]).unwrap();
        resolver.minimize(&tree);
        assert_eq!(resolver.cache_stats().size, 3);

        resolver.reset();
        assert_eq!(resolver.cache_stats().size, 0);
    }

    #[test]
    fn test_shared_resolver() {
        let (tree, ids) = deep_tree();
        let shared = VisibilityResolver::new(HideEmptyGroups).into_shared();
        shared.lock().set_filter_fn(|s: &String| s == "banana");

        let other_view = Arc::clone(&shared);
        assert!(shared.lock().is_row_visible(&tree, ids["banana"]).unwrap());
        assert_eq!(
            other_view.lock().acceptance(ids["banana"]),
            Acceptance::Accepted
        );
    }
}
