//! Reading order tree.
//!
//! A reading order is a tree of groups with region references as leaves.
//! Ordered groups chain their direct children through predecessor/successor
//! links; unordered groups impose no order. Nodes live in an arena owned by
//! [`ReadingOrder`] and refer to each other through [`NodeId`] handles, so the
//! parent back-references never own anything.

mod ids;

pub use ids::IdAllocator;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Error, Result};

/// Indentation step used by the [`fmt::Display`] rendering.
const INDENT: usize = 4;

/// Handle of a node inside one [`ReadingOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Whether a group orders its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Children form a chain
    Ordered,
    /// Children carry no order
    Unordered,
}

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf referring to a page region with the same id
    RegionRef,
    /// Composite node
    Group(GroupKind),
}

#[derive(Debug, Clone)]
struct Node {
    id: String,
    kind: NodeKind,
    index: Option<usize>,
    parent: Option<NodeId>,
    predecessor: Option<NodeId>,
    successor: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Reading order tree with an arena of nodes.
#[derive(Debug, Clone)]
pub struct ReadingOrder {
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeId>,
    root: NodeId,
}

impl ReadingOrder {
    /// Create a tree with a root group of the given kind.
    pub fn new(root_id: impl Into<String>, kind: GroupKind) -> Self {
        let root_id = root_id.into();
        let root = Node {
            id: root_id.clone(),
            kind: NodeKind::Group(kind),
            index: None,
            parent: None,
            predecessor: None,
            successor: None,
            children: Vec::new(),
        };
        let mut by_id = HashMap::new();
        by_id.insert(root_id, NodeId(0));
        Self {
            nodes: vec![root],
            by_id,
            root: NodeId(0),
        }
    }

    /// Create a tree with an unordered root carrying a generated id.
    pub fn unordered(ids: &mut IdAllocator) -> Self {
        Self::new(ids.next_id("g"), GroupKind::Unordered)
    }

    /// Create an unordered root holding one empty ordered group.
    ///
    /// Both generated ids avoid the ones `taken` rejects, so region ids
    /// added later cannot collide with them.
    pub fn with_ordered_group<F>(ids: &mut IdAllocator, taken: F) -> Result<(Self, NodeId)>
    where
        F: Fn(&str) -> bool,
    {
        let mut order = Self::new(ids.next_free("g", &taken), GroupKind::Unordered);
        let root = order.root();
        let group_id = ids.next_free("g", |id| taken(id) || order.find(id).is_some());
        let group = order.add_group(root, GroupKind::Ordered, group_id)?;
        Ok((order, group))
    }

    /// Root group.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n.0]
    }

    /// Id of a node.
    pub fn id(&self, n: NodeId) -> &str {
        &self.node(n).id
    }

    /// Kind of a node.
    pub fn kind(&self, n: NodeId) -> NodeKind {
        self.node(n).kind
    }

    /// Whether the node is a group.
    pub fn is_group(&self, n: NodeId) -> bool {
        matches!(self.node(n).kind, NodeKind::Group(_))
    }

    /// Whether the node is an ordered group.
    pub fn is_ordered(&self, n: NodeId) -> bool {
        self.node(n).kind == NodeKind::Group(GroupKind::Ordered)
    }

    /// Whether the node is anything but an ordered group.
    pub fn is_unordered(&self, n: NodeId) -> bool {
        !self.is_ordered(n)
    }

    /// Position recorded by the source of the tree, if any.
    pub fn index(&self, n: NodeId) -> Option<usize> {
        self.node(n).index
    }

    /// Record the position of a node inside its parent.
    pub fn set_index(&mut self, n: NodeId, index: usize) {
        self.nodes[n.0].index = Some(index);
    }

    /// Enclosing group.
    pub fn parent(&self, n: NodeId) -> Option<NodeId> {
        self.node(n).parent
    }

    /// Previous node in the chain.
    pub fn predecessor(&self, n: NodeId) -> Option<NodeId> {
        self.node(n).predecessor
    }

    /// Next node in the chain.
    pub fn successor(&self, n: NodeId) -> Option<NodeId> {
        self.node(n).successor
    }

    /// Direct children in insertion order.
    pub fn children(&self, n: NodeId) -> &[NodeId] {
        &self.node(n).children
    }

    /// Any node (item or group) by id.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// Region reference by id; groups are not returned.
    pub fn item(&self, id: &str) -> Option<NodeId> {
        self.find(id)
            .filter(|n| self.kind(*n) == NodeKind::RegionRef)
    }

    fn insert(&mut self, parent: NodeId, id: String, kind: NodeKind) -> Result<NodeId> {
        if !self.is_group(parent) {
            return Err(Error::InvalidChainLink {
                predecessor: self.id(parent).to_string(),
                successor: id,
                reason: "parent is not a group".to_string(),
            });
        }
        if self.by_id.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }

        let n = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id: id.clone(),
            kind,
            index: None,
            parent: Some(parent),
            predecessor: None,
            successor: None,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(n);
        self.by_id.insert(id, n);
        Ok(n)
    }

    /// Attach an unlinked region reference to `parent`.
    pub fn add_item(&mut self, parent: NodeId, id: impl Into<String>) -> Result<NodeId> {
        self.insert(parent, id.into(), NodeKind::RegionRef)
    }

    /// Attach an unlinked group to `parent`.
    pub fn add_group(
        &mut self,
        parent: NodeId,
        kind: GroupKind,
        id: impl Into<String>,
    ) -> Result<NodeId> {
        self.insert(parent, id.into(), NodeKind::Group(kind))
    }

    /// Attach a new empty ordered group with a generated id.
    pub fn add_ordered_group(&mut self, parent: NodeId, ids: &mut IdAllocator) -> Result<NodeId> {
        let id = ids.next_free("g", |id| self.by_id.contains_key(id));
        self.add_group(parent, GroupKind::Ordered, id)
    }

    /// Append a region reference; in an ordered parent it is chained after
    /// the previously appended child.
    pub fn push_item(&mut self, parent: NodeId, id: impl Into<String>) -> Result<NodeId> {
        let tail = self.children(parent).last().copied();
        let n = self.add_item(parent, id)?;
        self.chain_after(parent, tail, n);
        Ok(n)
    }

    /// Append a group; in an ordered parent it is chained after the
    /// previously appended child.
    pub fn push_group(
        &mut self,
        parent: NodeId,
        kind: GroupKind,
        id: impl Into<String>,
    ) -> Result<NodeId> {
        let tail = self.children(parent).last().copied();
        let n = self.add_group(parent, kind, id)?;
        self.chain_after(parent, tail, n);
        Ok(n)
    }

    fn chain_after(&mut self, parent: NodeId, tail: Option<NodeId>, n: NodeId) {
        if let (true, Some(tail)) = (self.is_ordered(parent), tail) {
            self.nodes[tail.0].successor = Some(n);
            self.nodes[n.0].predecessor = Some(tail);
        }
    }

    /// Record that `successor` follows `source` inside `group`.
    ///
    /// Missing region references are created. When either side is already
    /// part of a chain, the last element of the source chain is linked to the
    /// first element of the successor chain. Linking an already linked pair
    /// is a no-op; linking two ends of the same chain is refused.
    pub fn add_candidates(&mut self, group: NodeId, source: &str, successor: &str) -> Result<()> {
        let source_node = self.item_in(group, source)?;
        let successor_node = self.item_in(group, successor)?;

        if self.successor(source_node) == Some(successor_node) {
            return Ok(());
        }

        let last = self.last(source_node);
        let first = self.first(successor_node);
        if self.first(last) == first {
            return Err(Error::InvalidChainLink {
                predecessor: source.to_string(),
                successor: successor.to_string(),
                reason: "both belong to the same chain".to_string(),
            });
        }

        self.nodes[last.0].successor = Some(first);
        self.nodes[first.0].predecessor = Some(last);
        Ok(())
    }

    fn item_in(&mut self, group: NodeId, id: &str) -> Result<NodeId> {
        match self.find(id) {
            Some(n) if self.parent(n) == Some(group) => Ok(n),
            Some(_) => Err(Error::DuplicateId(id.to_string())),
            None => self.add_item(group, id),
        }
    }

    /// First node of the chain containing `n`.
    pub fn first(&self, n: NodeId) -> NodeId {
        let mut current = n;
        while let Some(prev) = self.predecessor(current) {
            current = prev;
        }
        current
    }

    /// Last node of the chain containing `n`.
    pub fn last(&self, n: NodeId) -> NodeId {
        let mut current = n;
        while let Some(next) = self.successor(current) {
            current = next;
        }
        current
    }

    /// Ids along the chain starting at `n`.
    pub fn chain_from(&self, n: NodeId) -> Vec<String> {
        let mut ids = Vec::new();
        let mut current = Some(n);
        while let Some(c) = current {
            ids.push(self.id(c).to_string());
            current = self.successor(c);
        }
        ids
    }

    /// Children of `group` without a predecessor.
    pub fn beginnings(&self, group: NodeId) -> Vec<NodeId> {
        self.children(group)
            .iter()
            .copied()
            .filter(|c| self.predecessor(*c).is_none())
            .collect()
    }

    /// Number of ancestors of `n`.
    pub fn level(&self, n: NodeId) -> usize {
        let mut level = 0;
        let mut parent = self.parent(n);
        while let Some(p) = parent {
            level += 1;
            parent = self.parent(p);
        }
        level
    }

    /// Nodes from the root down to `n`, both included.
    pub fn path(&self, n: NodeId) -> Vec<NodeId> {
        let mut path = vec![n];
        let mut parent = self.parent(n);
        while let Some(p) = parent {
            path.push(p);
            parent = self.parent(p);
        }
        path.reverse();
        path
    }

    /// Region references below `group`, pre-order.
    pub fn flatten_items(&self, group: NodeId) -> Vec<NodeId> {
        let mut items = Vec::new();
        self.collect(group, &mut items, false);
        items
    }

    /// Groups below `group`, pre-order.
    pub fn flatten_groups(&self, group: NodeId) -> Vec<NodeId> {
        let mut groups = Vec::new();
        self.collect(group, &mut groups, true);
        groups
    }

    fn collect(&self, group: NodeId, out: &mut Vec<NodeId>, groups: bool) {
        for &child in self.children(group) {
            if self.is_group(child) {
                if groups {
                    out.push(child);
                }
                self.collect(child, out, groups);
            } else if !groups {
                out.push(child);
            }
        }
    }

    /// Every region reference in the tree, pre-order.
    pub fn all_items(&self) -> Vec<NodeId> {
        self.flatten_items(self.root)
    }

    /// Ids of every region reference, pre-order.
    pub fn item_ids(&self) -> Vec<String> {
        self.all_items()
            .into_iter()
            .map(|n| self.id(n).to_string())
            .collect()
    }

    /// Ordered groups, nested ones first and the root last if ordered.
    pub fn ordered_groups(&self) -> Vec<NodeId> {
        let mut groups: Vec<NodeId> = self
            .flatten_groups(self.root)
            .into_iter()
            .filter(|g| self.is_ordered(*g))
            .collect();
        if self.is_ordered(self.root) {
            groups.push(self.root);
        }
        groups
    }

    /// Adjacent `(predecessor, successor)` id pairs of every ordered group.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::reading_order::{GroupKind, ReadingOrder};
    ///
    /// let mut order = ReadingOrder::new("root", GroupKind::Ordered);
    /// let root = order.root();
    /// for id in ["r1", "r2", "r3"] {
    ///     order.push_item(root, id).unwrap();
    /// }
    /// assert_eq!(
    ///     order.chain_reduction(),
    ///     vec![("r1".to_string(), "r2".to_string()), ("r2".to_string(), "r3".to_string())]
    /// );
    /// ```
    pub fn chain_reduction(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for group in self.ordered_groups() {
            for start in self.beginnings(group) {
                let mut a = start;
                while let Some(b) = self.successor(a) {
                    pairs.push((self.id(a).to_string(), self.id(b).to_string()));
                    a = b;
                }
            }
        }
        pairs
    }

    /// Deepest group on both root paths.
    pub fn nearest_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let pa = self.path(a);
        let pb = self.path(b);
        pa.iter()
            .zip(pb.iter())
            .take_while(|(x, y)| x == y)
            .last()
            .map(|(x, _)| *x)
            .unwrap_or(self.root)
    }

    /// Whether a region reference with `id` lies below `group`.
    pub fn contains(&self, group: NodeId, id: &str) -> bool {
        self.flatten_items(group).iter().any(|n| self.id(*n) == id)
    }

    /// Direct child groups of `group`.
    pub fn child_groups(&self, group: NodeId) -> Vec<NodeId> {
        self.children(group)
            .iter()
            .copied()
            .filter(|c| self.is_group(*c))
            .collect()
    }

    /// Text of the chain starting at the first element of `n`'s chain.
    ///
    /// Member transcriptions are joined with single spaces; ids without a
    /// text region contribute nothing.
    pub fn chain_text(&self, n: NodeId, doc: &Document) -> String {
        self.chain_from(self.first(n))
            .iter()
            .filter_map(|id| doc.text(id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, n: NodeId, indent: usize) -> fmt::Result {
        let prefix = match self.index(n) {
            Some(i) => format!("({}) ", i + 1),
            None => String::new(),
        };
        match self.kind(n) {
            NodeKind::RegionRef => writeln!(f, "{}{}{}", " ".repeat(indent), prefix, self.id(n)),
            NodeKind::Group(kind) => {
                let symbol = match kind {
                    GroupKind::Ordered => '=',
                    GroupKind::Unordered => '*',
                };
                writeln!(
                    f,
                    "{}{}{} {} {}",
                    " ".repeat(indent),
                    prefix,
                    symbol,
                    self.id(n),
                    symbol
                )?;
                match kind {
                    GroupKind::Unordered => {
                        for &child in self.children(n) {
                            self.render(f, child, indent + INDENT)?;
                        }
                    },
                    GroupKind::Ordered => {
                        for start in self.beginnings(n) {
                            let mut current = Some(start);
                            while let Some(c) = current {
                                self.render(f, c, indent + INDENT)?;
                                current = self.successor(c);
                            }
                        }
                    },
                }
                Ok(())
            },
        }
    }
}

impl fmt::Display for ReadingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, self.root, 0)
    }
}

/// Build a tree holding one ordered group chained along `chain`.
///
/// The root is unordered, matching the "no information" default.
pub fn chain_to_reading_order(chain: &[String], ids: &mut IdAllocator) -> Result<ReadingOrder> {
    let (mut order, group) =
        ReadingOrder::with_ordered_group(ids, |id| chain.iter().any(|c| c == id))?;

    match chain {
        [] => {},
        [single] => {
            order.add_item(group, single.as_str())?;
        },
        _ => {
            for pair in chain.windows(2) {
                order.add_candidates(group, &pair[0], &pair[1])?;
            }
        },
    }
    Ok(order)
}
