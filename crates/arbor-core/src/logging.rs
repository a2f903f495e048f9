//! Logging and debugging facilities for Arbor.
//!
//! This module provides:
//! - Target names for the `tracing` events emitted by the crates
//! - Debug visualization of a tree annotated with cached acceptance
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Arbor uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("arbor_core::cache=trace,arbor::model=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`TreeDebug`] to dump a tree together with what the cache currently
//! knows about each node:
//!
//! ```
//! use arbor_core::{AcceptanceCache, TreeDebug, TreeFormatOptions, TreeNodes, TreeStyle};
//!
//! let mut tree = TreeNodes::new();
//! let root = tree.add_root("Shots");
//! tree.add_child(root, "sh010").unwrap();
//!
//! let cache = AcceptanceCache::new();
//! let options = TreeFormatOptions { style: TreeStyle::Ascii, ..Default::default() };
//! let dump = TreeDebug::with_options(options)
//!     .display(&tree, &cache, |name: &&str| name.to_string())
//!     .to_string();
//! assert!(dump.contains("sh010 [?]"));
//! ```

use std::fmt;

use crate::cache::{Acceptance, AcceptanceCache};
use crate::tree::{NodeId, TreeSource};

/// Span names used throughout Arbor for tracing.
pub mod span_names {
    /// Visibility pass over a whole tree.
    pub const VISIBLE_ROWS: &str = "arbor::visible_rows";
    /// Sweep dropping records of removed nodes.
    pub const MINIMIZE: &str = "arbor::minimize";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Acceptance cache target.
    pub const CACHE: &str = "arbor_core::cache";
    /// Visibility resolver target.
    pub const RESOLVER: &str = "arbor_core::resolver";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "arbor_core::signal";
    /// Tree model and filtered view target.
    pub const MODEL: &str = "arbor::model";
    /// Filter construction target (text filters, filter items, config).
    pub const FILTER: &str = "arbor::filter";
    /// Performance spans.
    pub const PERF: &str = "arbor::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show the cached acceptance of each node.
    pub show_acceptance: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_acceptance: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_acceptance: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing a tree and its cached acceptance.
///
/// Acceptance is printed as `[+]` (accepted), `[-]` (rejected) or `[?]`
/// (unknown). Formatting only reads the cache; it never evaluates anything.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Returns a value whose `Display` renders the whole tree.
    pub fn display<'a, S, F>(
        &'a self,
        tree: &'a S,
        cache: &'a AcceptanceCache,
        label: F,
    ) -> impl fmt::Display + 'a
    where
        S: TreeSource + ?Sized,
        F: Fn(&S::Data) -> String + 'a,
    {
        DisplayTree {
            debug: self,
            tree,
            cache,
            label,
        }
    }

    fn write_subtree<S, F>(
        &self,
        f: &mut fmt::Formatter<'_>,
        tree: &S,
        cache: &AcceptanceCache,
        label: &F,
        id: NodeId,
        depth: usize,
        is_last: bool,
    ) -> fmt::Result
    where
        S: TreeSource + ?Sized,
        F: Fn(&S::Data) -> String,
    {
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return Ok(());
            }
        }

        f.write_str(&self.build_prefix(depth, is_last))?;
        match tree.data_of(id) {
            Some(data) => f.write_str(&label(data))?,
            None => f.write_str("(missing)")?,
        }

        if self.options.show_acceptance {
            let mark = match cache.acceptance(id) {
                Acceptance::Accepted => "+",
                Acceptance::Rejected => "-",
                Acceptance::Unknown => "?",
            };
            write!(f, " [{mark}]")?;
        }

        if self.options.show_ids {
            write!(f, " {id:?}")?;
        }
        writeln!(f)?;

        let children = tree.children_of(id).unwrap_or(&[]);
        let child_count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.write_subtree(f, tree, cache, label, child, depth + 1, i == child_count - 1)?;
        }
        Ok(())
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

struct DisplayTree<'a, S: ?Sized, F> {
    debug: &'a TreeDebug,
    tree: &'a S,
    cache: &'a AcceptanceCache,
    label: F,
}

impl<S, F> fmt::Display for DisplayTree<'_, S, F>
where
    S: TreeSource + ?Sized,
    F: Fn(&S::Data) -> String,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots = self.tree.roots();
        if roots.is_empty() {
            return writeln!(f, "(empty)");
        }
        let root_count = roots.len();
        for (i, &root) in roots.iter().enumerate() {
            self.debug.write_subtree(
                f,
                self.tree,
                self.cache,
                &self.label,
                root,
                0,
                i == root_count - 1,
            )?;
        }
        Ok(())
    }
}

/// A guard that emits a tracing span when dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
