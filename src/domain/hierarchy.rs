//! The topic hierarchy: a node table keyed by raw topic ID.
//!
//! The [`Hierarchy`] is built in a single pass from segmented blocks and is
//! read-only afterwards. Missing ancestors and small numbering gaps are filled
//! with synthetic placeholder nodes so that every node's ancestor chain is
//! present up to a single-segment root.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::domain::{Config, TopicBlock, TopicId, config::DuplicatePolicy, topic_id::Segment};

/// A node in the topic hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicNode {
    /// The topic ID. Unique within a hierarchy.
    pub id: TopicId,

    /// The parent's ID, `None` for roots.
    pub parent: Option<TopicId>,

    /// Child IDs in numeric-aware order.
    pub children: Vec<TopicId>,

    /// The content block. Always `None` for synthetic nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<TopicBlock>,

    /// Whether this node is a placeholder for a topic with no content.
    pub synthetic: bool,
}

impl TopicNode {
    fn real(id: TopicId, block: TopicBlock) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            block: Some(block),
            synthetic: false,
        }
    }

    const fn synthetic(id: TopicId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            block: None,
            synthetic: true,
        }
    }

    /// The title of the node's block, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.block.as_ref()?.title.as_deref()
    }
}

/// Options controlling how a [`Hierarchy`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Which block is kept when several share a topic ID.
    pub duplicates: DuplicatePolicy,

    /// Largest run of missing sibling numbers that is filled with
    /// placeholders. Zero disables sibling gap filling.
    pub max_sibling_gap: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Self {
            duplicates: config.duplicates,
            max_sibling_gap: config.max_sibling_gap,
        }
    }
}

/// The result of building a hierarchy.
#[derive(Debug)]
pub struct Build {
    /// The node table.
    pub hierarchy: Hierarchy,

    /// Blocks dropped by the duplicate policy, in document order.
    pub discarded: Vec<TopicBlock>,
}

/// Table of topic nodes keyed by raw topic ID.
///
/// Nodes are stored in insertion order: real nodes in document order, with
/// synthetic nodes appended as they are created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    nodes: Vec<TopicNode>,

    /// Raw ID to position in `nodes`.
    index: HashMap<String, usize>,
}

impl Hierarchy {
    /// Builds a hierarchy from segmented blocks.
    ///
    /// Blocks without a topic ID are ignored. This never fails: any gap in the
    /// ID space becomes a synthetic node. Building twice from the same blocks
    /// produces identical hierarchies.
    #[instrument(level = "debug", skip_all)]
    pub fn build(blocks: impl IntoIterator<Item = TopicBlock>, options: Options) -> Build {
        let mut hierarchy = Self::default();
        let mut discarded = Vec::new();

        for block in blocks {
            let Some(id) = block.topic_id.clone() else {
                trace!("ignoring block without a topic ID");
                continue;
            };

            let Some(&position) = hierarchy.index.get(id.raw()) else {
                hierarchy.insert(TopicNode::real(id, block));
                continue;
            };

            debug!(%id, policy = ?options.duplicates, "duplicate topic ID");
            match options.duplicates {
                DuplicatePolicy::FirstWins => discarded.push(block),
                DuplicatePolicy::LastWins => {
                    if let Some(previous) = hierarchy.nodes[position].block.replace(block) {
                        discarded.push(previous);
                    }
                }
            }
        }

        for position in 0..hierarchy.nodes.len() {
            hierarchy.link_ancestors(position);
        }

        if options.max_sibling_gap > 0 {
            hierarchy.fill_sibling_gaps(options.max_sibling_gap);
        }

        for node in &mut hierarchy.nodes {
            node.children.sort();
        }

        debug!(
            nodes = hierarchy.len(),
            synthetic = hierarchy.synthetic().count(),
            discarded = discarded.len(),
            "built topic hierarchy"
        );

        Build {
            hierarchy,
            discarded,
        }
    }

    /// Looks up a node by raw topic ID.
    #[must_use]
    pub fn get(&self, raw: &str) -> Option<&TopicNode> {
        self.index.get(raw).map(|&position| &self.nodes[position])
    }

    /// Returns `true` if a node (real or synthetic) exists for the raw ID.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.index.contains_key(raw)
    }

    /// Number of nodes, synthetic ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the hierarchy has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TopicNode> {
        self.nodes.iter()
    }

    /// Iterates over the synthetic nodes in insertion order.
    pub fn synthetic(&self) -> impl Iterator<Item = &TopicNode> {
        self.nodes.iter().filter(|node| node.synthetic)
    }

    /// The root nodes in numeric-aware order.
    #[must_use]
    pub fn roots(&self) -> Vec<&TopicNode> {
        let mut roots: Vec<_> = self
            .nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .collect();
        roots.sort_by(|a, b| a.id.cmp(&b.id));
        roots
    }

    /// The children of a node, in order.
    pub fn children<'a>(&'a self, node: &'a TopicNode) -> impl Iterator<Item = &'a TopicNode> + 'a {
        node.children.iter().filter_map(|id| self.get(id.raw()))
    }

    /// Depth-first, pre-order traversal from the roots, yielding each node
    /// with its depth (roots are at depth 0).
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &TopicNode)> {
        self.walk_from(self.roots())
    }

    /// Depth-first, pre-order traversal of the subtree rooted at `node`,
    /// which is at depth 0.
    #[must_use]
    pub fn subtree<'a>(&'a self, node: &'a TopicNode) -> Vec<(usize, &'a TopicNode)> {
        self.walk_from(vec![node])
    }

    fn walk_from<'a>(&'a self, starts: Vec<&'a TopicNode>) -> Vec<(usize, &'a TopicNode)> {
        let mut order = Vec::new();
        let mut stack: Vec<_> = starts.into_iter().rev().map(|node| (0, node)).collect();

        while let Some((depth, node)) = stack.pop() {
            order.push((depth, node));
            let children: Vec<_> = self.children(node).collect();
            stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
        }

        order
    }
}

impl Hierarchy {
    fn insert(&mut self, node: TopicNode) -> usize {
        let position = self.nodes.len();
        self.index.insert(node.id.raw().to_string(), position);
        self.nodes.push(node);
        position
    }

    /// Links a node to its parent, synthesizing missing ancestors on the way
    /// up.
    ///
    /// The walk stops at the first ancestor that already exists: its own
    /// chain is resolved by its own pass, or was resolved when it was
    /// synthesized.
    fn link_ancestors(&mut self, position: usize) {
        let mut child = position;

        while let Some(parent_id) = self.nodes[child].id.parent() {
            let (parent, existed) = match self.index.get(parent_id.raw()) {
                Some(&parent) => (parent, true),
                None => {
                    debug!(id = %parent_id, "synthesizing missing ancestor");
                    (self.insert(TopicNode::synthetic(parent_id)), false)
                }
            };

            self.link(child, parent);

            if existed {
                break;
            }
            child = parent;
        }
    }

    fn link(&mut self, child: usize, parent: usize) {
        let parent_id = self.nodes[parent].id.clone();
        let child_id = self.nodes[child].id.clone();

        self.nodes[child].parent = Some(parent_id);
        if !self.nodes[parent].children.contains(&child_id) {
            self.nodes[parent].children.push(child_id);
        }
    }

    /// Fills runs of missing numbers between numeric siblings, such as `18.2`
    /// between `18.1` and `18.3`.
    ///
    /// Only interior gaps of at most `max_gap` numbers are filled; the
    /// placeholders are leaves.
    fn fill_sibling_gaps(&mut self, max_gap: u64) {
        let mut groups: Vec<(Option<usize>, Vec<TopicId>)> = (0..self.nodes.len())
            .map(|position| (Some(position), self.nodes[position].children.clone()))
            .collect();
        groups.push((
            None,
            self.nodes
                .iter()
                .filter(|node| node.parent.is_none())
                .map(|node| node.id.clone())
                .collect(),
        ));

        for (parent, siblings) in groups {
            for id in missing_siblings(&siblings, max_gap) {
                if self.contains(id.raw()) {
                    continue;
                }
                debug!(%id, "synthesizing missing sibling");
                let position = self.insert(TopicNode::synthetic(id));
                if let Some(parent) = parent {
                    self.link(position, parent);
                }
            }
        }
    }
}

/// The IDs missing between consecutive numeric siblings.
fn missing_siblings(siblings: &[TopicId], max_gap: u64) -> Vec<TopicId> {
    let mut numbered: Vec<(u64, &TopicId)> = siblings
        .iter()
        .filter_map(|id| match id.segments().last() {
            Some(Segment::Number(digits)) => digits.parse().ok().map(|n| (n, id)),
            _ => None,
        })
        .collect();
    numbered.sort_by(|(a, a_id), (b, b_id)| a.cmp(b).then_with(|| a_id.cmp(b_id)));

    let mut missing = Vec::new();
    for pair in numbered.windows(2) {
        let [(low, low_id), (high, _)] = pair else {
            continue;
        };
        // Equal values (`2.1`, `2.01`) leave no gap.
        let gap = high.saturating_sub(*low).saturating_sub(1);
        if gap == 0 {
            continue;
        }
        if gap > max_gap {
            trace!(after = %low_id, gap, "sibling gap too large to fill");
            continue;
        }
        missing.extend((low + 1..*high).filter_map(|n| sibling_with_number(low_id, n)));
    }
    missing
}

/// Replaces the last segment of `id` with `n`, keeping any zero padding.
fn sibling_with_number(id: &TopicId, n: u64) -> Option<TopicId> {
    let mut parts: Vec<String> = id.parts().map(str::to_string).collect();
    let last = parts.last_mut()?;
    let width = if last.starts_with('0') { last.len() } else { 0 };
    *last = format!("{n:0width$}");
    TopicId::parse(&parts.join("."))
}
