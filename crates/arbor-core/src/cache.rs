//! Per-node acceptance cache.
//!
//! [`AcceptanceCache`] remembers, for each node, whether the current filter
//! accepts it. Leaves are decided by the predicate alone; branches are
//! accepted when any child is accepted (through this same cache), or when
//! the branch matches directly and [`EmptyGroupPolicy::ShowEmptyGroups`] is
//! in force.
//!
//! [`invalidate`] touches exactly one node. Walking ancestors is the
//! resolver's job.
//!
//! [`invalidate`]: AcceptanceCache::invalidate

use slotmap::SecondaryMap;

use crate::error::{Error, Result};
use crate::logging::{span_names, targets, PerfSpan};
use crate::predicate::Predicate;
use crate::tree::{NodeId, TreeSource};

/// Cached filter outcome for one node.
///
/// Transitions: `Unknown -> Accepted | Rejected` on evaluation, and back to
/// `Unknown` on invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Acceptance {
    /// Not evaluated under the current filter generation.
    #[default]
    Unknown,
    /// The node is visible.
    Accepted,
    /// The node is hidden.
    Rejected,
}

impl Acceptance {
    /// Returns `true` for [`Acceptance::Accepted`].
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }

    /// Returns `true` unless the value is [`Acceptance::Unknown`].
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl From<bool> for Acceptance {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

/// How a branch that matches the filter directly, but has no accepted
/// descendant, is treated.
///
/// There is no default: callers pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmptyGroupPolicy {
    /// A directly matching branch is visible even if none of its
    /// descendants are.
    ShowEmptyGroups,
    /// A branch is visible only through an accepted descendant leaf.
    HideEmptyGroups,
}

/// A cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceRecord {
    /// The cached outcome.
    pub acceptance: Acceptance,
    /// The cache generation the outcome was computed under.
    pub generation: u64,
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required computation.
    pub misses: u64,
    /// Predicate invocations.
    pub evaluations: u64,
    /// Records currently held (including `Unknown` ones).
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, `0.0` when there were none.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Maps node identity to a cached accept/reject decision.
#[derive(Debug, Clone)]
pub struct AcceptanceCache {
    records: SecondaryMap<NodeId, AcceptanceRecord>,
    generation: u64,
    enabled: bool,
    hits: u64,
    misses: u64,
    evaluations: u64,
}

impl AcceptanceCache {
    /// Create an empty, enabled cache.
    pub fn new() -> Self {
        Self {
            records: SecondaryMap::new(),
            generation: 0,
            enabled: true,
            hits: 0,
            misses: 0,
            evaluations: 0,
        }
    }

    /// The current generation. It advances on every [`invalidate_all`](Self::invalidate_all).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if results are being stored.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable caching.
    ///
    /// Either way the existing records are dropped, so no result computed
    /// before the switch is ever served after it. While disabled every
    /// lookup recomputes and nothing is stored.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.invalidate_all();
        self.enabled = enabled;
    }

    /// The record held for `id`, if any.
    pub fn record(&self, id: NodeId) -> Option<AcceptanceRecord> {
        self.records.get(id).copied()
    }

    /// The cached outcome for `id`, `Unknown` if none.
    pub fn acceptance(&self, id: NodeId) -> Acceptance {
        self.records
            .get(id)
            .map(|record| record.acceptance)
            .unwrap_or_default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Marks a single node `Unknown`. Ancestors and descendants are untouched.
    ///
    /// Returns `true` if the node had a known outcome.
    pub fn invalidate(&mut self, id: NodeId) -> bool {
        match self.records.get_mut(id) {
            Some(record) if record.acceptance.is_known() => {
                tracing::trace!(target: targets::CACHE, node = ?id, "invalidated record");
                record.acceptance = Acceptance::Unknown;
                true
            }
            _ => false,
        }
    }

    /// Drops every record and starts a new generation.
    pub fn invalidate_all(&mut self) {
        tracing::debug!(
            target: targets::CACHE,
            generation = self.generation,
            dropped = self.records.len(),
            "invalidating all records"
        );
        self.records.clear();
        self.generation += 1;
    }

    /// Destroys the record for a node that left the tree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.records.remove(id).is_some()
    }

    /// Drops records for nodes that are no longer in `tree`.
    pub fn minimize<S: TreeSource + ?Sized>(&mut self, tree: &S) {
        let _span = PerfSpan::new(span_names::MINIMIZE);
        let before = self.records.len();
        self.records.retain(|id, _| tree.contains(id));
        tracing::debug!(
            target: targets::CACHE,
            dropped = before - self.records.len(),
            "minimized cache"
        );
    }

    /// Snapshot of the effectiveness counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evaluations: self.evaluations,
            size: self.records.len(),
        }
    }

    /// Resets the effectiveness counters without touching records.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evaluations = 0;
    }

    /// Returns the cached outcome for `id`, computing and storing it first
    /// if it is `Unknown`.
    ///
    /// Leaves are decided by `predicate`. Branches are accepted when any
    /// child is accepted, or (under [`EmptyGroupPolicy::ShowEmptyGroups`])
    /// when the branch itself matches. Children are resolved through this
    /// same cache, so only unknown nodes are evaluated, and the scan of a
    /// branch stops at its first accepted child.
    ///
    /// The walk keeps its own stack of pending branches, so tree depth is
    /// bounded by memory rather than by the thread's call stack.
    ///
    /// Fails with [`Error::UnknownNode`] if `id` is not in `tree` and with
    /// [`Error::Predicate`] if the predicate fails. Nothing is stored for a
    /// node whose evaluation failed, nor for any branch still waiting on it.
    pub fn get_or_compute<S, P>(
        &mut self,
        tree: &S,
        id: NodeId,
        predicate: &P,
        policy: EmptyGroupPolicy,
    ) -> Result<Acceptance>
    where
        S: TreeSource + ?Sized,
        P: Predicate<S::Data> + ?Sized,
    {
        let mut pending: Vec<Frame<'_>> = Vec::new();
        let mut step = self.start(tree, id, predicate, policy)?;

        loop {
            let accepted = match step {
                Step::Done(accepted) => accepted,
                Step::Descend(frame) => {
                    pending.push(frame);
                    false
                }
            };

            let Some(frame) = pending.last_mut() else {
                return Ok(Acceptance::from(accepted));
            };

            if accepted || frame.next == frame.children.len() {
                let finished = frame.id;
                pending.pop();
                self.store(finished, Acceptance::from(accepted));
                step = Step::Done(accepted);
                continue;
            }

            let child = frame.children[frame.next];
            frame.next += 1;
            step = self.start(tree, child, predicate, policy)?;
        }
    }

    /// Settles `id` from the cache or its own data, or hands back a frame
    /// whose children still have to be scanned.
    fn start<'t, S, P>(
        &mut self,
        tree: &'t S,
        id: NodeId,
        predicate: &P,
        policy: EmptyGroupPolicy,
    ) -> Result<Step<'t>>
    where
        S: TreeSource + ?Sized,
        P: Predicate<S::Data> + ?Sized,
    {
        let children = tree.children_of(id).ok_or(Error::UnknownNode(id))?;

        if let Some(cached) = self.lookup(id) {
            return Ok(Step::Done(cached.is_accepted()));
        }

        if children.is_empty() {
            let accepted = self.evaluate(tree, id, predicate)?;
            self.store(id, Acceptance::from(accepted));
            return Ok(Step::Done(accepted));
        }

        if policy == EmptyGroupPolicy::ShowEmptyGroups && self.evaluate(tree, id, predicate)? {
            self.store(id, Acceptance::Accepted);
            return Ok(Step::Done(true));
        }

        Ok(Step::Descend(Frame {
            id,
            children,
            next: 0,
        }))
    }

    fn evaluate<S, P>(&mut self, tree: &S, id: NodeId, predicate: &P) -> Result<bool>
    where
        S: TreeSource + ?Sized,
        P: Predicate<S::Data> + ?Sized,
    {
        let data = tree.data_of(id).ok_or(Error::UnknownNode(id))?;
        self.evaluations += 1;
        let accepted = predicate
            .accepts(data)
            .map_err(|source| Error::predicate(id, source))?;
        tracing::trace!(target: targets::CACHE, node = ?id, accepted, "evaluated predicate");
        Ok(accepted)
    }

    fn lookup(&mut self, id: NodeId) -> Option<Acceptance> {
        if !self.enabled {
            self.misses += 1;
            return None;
        }

        match self.records.get(id) {
            Some(record) if record.acceptance.is_known() => {
                self.hits += 1;
                Some(record.acceptance)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    fn store(&mut self, id: NodeId, acceptance: Acceptance) {
        if !self.enabled {
            return;
        }
        self.records.insert(
            id,
            AcceptanceRecord {
                acceptance,
                generation: self.generation,
            },
        );
    }
}

/// A branch whose children are being scanned.
struct Frame<'t> {
    id: NodeId,
    children: &'t [NodeId],
    next: usize,
}

enum Step<'t> {
    Done(bool),
    Descend(Frame<'t>),
}

impl Default for AcceptanceCache {
    fn default() -> Self {
        Self::new()
    }
}
