//! Call graph nodes.
//!
//! A node is one call site of one function. Aggregate nodes produced by
//! reduction keep their retired members so they can still be listed.

use crate::symbols::Symbol;
use std::collections::BTreeSet;
use std::fmt;

/// Arena key of a node: the call site (return address) that created it
///
/// The root is keyed `0`. Aggregates reuse the key of a representative member.
pub type NodeKey = u64;

/// Variant of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// One real call site of one symbol
    Simple,

    /// Same-symbol nodes that converged on one successor
    Merged { members: Vec<CallGraphNode> },

    /// Pass-through nodes collapsed in chain order
    Linked { members: Vec<CallGraphNode> },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Merged { .. } => "merged",
            Self::Linked { .. } => "linked",
        }
    }
}

/// A node of the call graph
///
/// `incoming` and `outgoing` hold keys of neighbor nodes in the same
/// graph; `CallGraph` keeps the two sides symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGraphNode {
    /// Entry address of the owning symbol
    pub symbol: u64,
    pub call_site: NodeKey,
    pub(crate) incoming: BTreeSet<NodeKey>,
    pub(crate) outgoing: BTreeSet<NodeKey>,
    /// First-seen sequence number; the root is 1
    pub visit_order: u32,
    /// Nanoseconds, most recent invocation at this call site
    pub start_time: u64,
    pub end_time: u64,
    pub kind: NodeKind,
}

impl CallGraphNode {
    pub fn new(symbol: u64, call_site: NodeKey) -> Self {
        Self {
            symbol,
            call_site,
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
            visit_order: 0,
            start_time: 0,
            end_time: 0,
            kind: NodeKind::Simple,
        }
    }

    /// Fold `members` into a merged node; the first member is the representative
    pub(crate) fn merged(members: Vec<CallGraphNode>) -> Option<Self> {
        let mut node = Self::inherit(members.first()?);
        node.kind = NodeKind::Merged { members };
        Some(node)
    }

    /// Fold a chain, in order, into a linked node keyed by its head
    pub(crate) fn linked(members: Vec<CallGraphNode>) -> Option<Self> {
        let mut node = Self::inherit(members.first()?);
        node.kind = NodeKind::Linked { members };
        Some(node)
    }

    /// Identity and timing of `representative`, without edges
    fn inherit(representative: &CallGraphNode) -> Self {
        Self {
            symbol: representative.symbol,
            call_site: representative.call_site,
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
            visit_order: representative.visit_order,
            start_time: representative.start_time,
            end_time: representative.end_time,
            kind: NodeKind::Simple,
        }
    }

    /// Strip edges from a node that is being folded into an aggregate
    pub(crate) fn into_member(mut self) -> Self {
        self.incoming.clear();
        self.outgoing.clear();
        self
    }

    pub fn key(&self) -> NodeKey {
        self.call_site
    }

    pub fn is_root(&self) -> bool {
        self.call_site == 0
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.kind, NodeKind::Simple)
    }

    pub fn incoming(&self) -> &BTreeSet<NodeKey> {
        &self.incoming
    }

    pub fn outgoing(&self) -> &BTreeSet<NodeKey> {
        &self.outgoing
    }

    /// Exactly one predecessor and one successor
    pub fn is_pass_through(&self) -> bool {
        self.incoming.len() == 1 && self.outgoing.len() == 1
    }

    pub fn sole_successor(&self) -> Option<NodeKey> {
        sole(&self.outgoing)
    }

    pub fn sole_predecessor(&self) -> Option<NodeKey> {
        sole(&self.incoming)
    }

    /// Signed, since wall-clock nanosecond fields may wrap between events
    ///
    /// Saturates instead of overflowing on far-apart timestamps.
    pub fn elapsed(&self) -> i64 {
        (self.end_time as i64).saturating_sub(self.start_time as i64)
    }

    pub fn members(&self) -> &[CallGraphNode] {
        match &self.kind {
            NodeKind::Simple => &[],
            NodeKind::Merged { members } | NodeKind::Linked { members } => members,
        }
    }

    /// Display label: `prefix/name(count)#call_site`, `#Merged` or `#Linked`
    pub fn label(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}({})#{}",
            symbol.source_prefix,
            symbol.name,
            symbol.call_count,
            self.suffix()
        )
    }

    fn suffix(&self) -> String {
        match self.kind {
            NodeKind::Simple => self.call_site.to_string(),
            NodeKind::Merged { .. } => "Merged".to_string(),
            NodeKind::Linked { .. } => "Linked".to_string(),
        }
    }
}

impl fmt::Display for CallGraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}#{}", self.symbol, self.suffix())
    }
}

fn sole(keys: &BTreeSet<NodeKey>) -> Option<NodeKey> {
    let mut iter = keys.iter();
    match (iter.next(), iter.next()) {
        (Some(key), None) => Some(*key),
        _ => None,
    }
}
