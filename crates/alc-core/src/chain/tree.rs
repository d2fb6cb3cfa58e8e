//! The chain tree and its structural queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::node::{BranchRef, ChainNode, NodeId, SplitNode};

/// Structural problems found by [`Chain::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Two nodes share an identifier.
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    /// A split has fewer than two branches.
    #[error("split {id} has {branches} branch(es), at least 2 required")]
    TooFewBranches {
        /// The split.
        id: NodeId,
        /// Number of branches found.
        branches: usize,
    },
}

/// The root sequence of the signal chain.
///
/// Serializes as a plain JSON array of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain {
    nodes: Vec<ChainNode>,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain from root nodes.
    pub fn from_nodes(nodes: Vec<ChainNode>) -> Self {
        Self { nodes }
    }

    /// Root nodes.
    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    /// True when the root sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node to the root sequence.
    pub fn push(&mut self, node: impl Into<ChainNode>) {
        self.nodes.push(node.into());
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Finds a node anywhere in the tree.
    pub fn find(&self, id: NodeId) -> Option<&ChainNode> {
        find_in(&self.nodes, id)
    }

    /// Finds a node anywhere in the tree, mutably.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut ChainNode> {
        find_in_mut(&mut self.nodes, id)
    }

    /// Finds a split anywhere in the tree.
    pub fn find_split(&self, id: NodeId) -> Option<&SplitNode> {
        self.find(id).and_then(ChainNode::as_split)
    }

    /// Finds a split anywhere in the tree, mutably.
    pub fn find_split_mut(&mut self, id: NodeId) -> Option<&mut SplitNode> {
        self.find_mut(id).and_then(ChainNode::as_split_mut)
    }

    /// The nodes of one branch.
    pub fn branch(&self, at: BranchRef) -> Option<&[ChainNode]> {
        self.find_split(at.split)
            .and_then(|split| split.branches.get(at.branch))
            .map(Vec::as_slice)
    }

    /// The nodes of one branch, mutably.
    pub fn branch_mut(&mut self, at: BranchRef) -> Option<&mut Vec<ChainNode>> {
        self.find_split_mut(at.split)
            .and_then(|split| split.branches.get_mut(at.branch))
    }

    /// True when a node with this id exists anywhere in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Removes a node from wherever it occurs. Returns `true` if it was found.
    ///
    /// Splits stay in place even when a branch becomes empty.
    pub fn remove(&mut self, id: NodeId) -> bool {
        remove_from(&mut self.nodes, id)
    }

    /// Sets or clears a device node's nickname.
    pub fn rename(&mut self, id: NodeId, nickname: Option<String>) -> bool {
        match self.find_mut(id) {
            Some(ChainNode::Device(node)) => {
                node.nickname = nickname;
                true
            }
            _ => false,
        }
    }

    /// Inserts `node` right after `anchor` in whichever sequence holds it.
    ///
    /// Hands the node back when the anchor does not exist.
    pub fn insert_after(&mut self, anchor: NodeId, node: ChainNode) -> Result<(), ChainNode> {
        insert_into(&mut self.nodes, anchor, node)
    }

    /// Highest node id in the tree.
    pub fn max_id(&self) -> Option<NodeId> {
        let mut max = None;
        walk(&self.nodes, &mut |node| {
            max = max.max(Some(node.id()));
        });
        max
    }

    /// Number of nodes in the tree, splits included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        walk(&self.nodes, &mut |_| count += 1);
        count
    }

    /// Checks id uniqueness and the minimum branch count of every split.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        walk(&self.nodes, &mut |node| {
            if result.is_err() {
                return;
            }
            if !seen.insert(node.id()) {
                result = Err(IntegrityError::DuplicateId(node.id()));
            } else if let ChainNode::Split(split) = node
                && split.branches.len() < SplitNode::MIN_BRANCHES
            {
                result = Err(IntegrityError::TooFewBranches {
                    id: split.id,
                    branches: split.branches.len(),
                });
            }
        });
        result
    }
}

/// Pre-order traversal of every node.
fn walk<'a>(nodes: &'a [ChainNode], visit: &mut impl FnMut(&'a ChainNode)) {
    for node in nodes {
        visit(node);
        if let ChainNode::Split(split) = node {
            for branch in &split.branches {
                walk(branch, visit);
            }
        }
    }
}

fn find_in(nodes: &[ChainNode], id: NodeId) -> Option<&ChainNode> {
    nodes.iter().find_map(|node| {
        if node.id() == id {
            return Some(node);
        }
        node.as_split()?
            .branches
            .iter()
            .find_map(|branch| find_in(branch, id))
    })
}

fn find_in_mut(nodes: &mut [ChainNode], id: NodeId) -> Option<&mut ChainNode> {
    for node in nodes {
        if node.id() == id {
            return Some(node);
        }
        if let ChainNode::Split(split) = node {
            for branch in &mut split.branches {
                if let Some(found) = find_in_mut(branch, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn remove_from(nodes: &mut Vec<ChainNode>, id: NodeId) -> bool {
    let before = nodes.len();
    nodes.retain(|node| node.id() != id);
    let mut removed = nodes.len() != before;
    for node in nodes.iter_mut() {
        if let ChainNode::Split(split) = node {
            for branch in &mut split.branches {
                removed |= remove_from(branch, id);
            }
        }
    }
    removed
}

fn insert_into(
    nodes: &mut Vec<ChainNode>,
    anchor: NodeId,
    node: ChainNode,
) -> Result<(), ChainNode> {
    if let Some(position) = nodes.iter().position(|n| n.id() == anchor) {
        nodes.insert(position + 1, node);
        return Ok(());
    }
    let mut node = node;
    for candidate in nodes.iter_mut() {
        if let ChainNode::Split(split) = candidate {
            for branch in &mut split.branches {
                match insert_into(branch, anchor, node) {
                    Ok(()) => return Ok(()),
                    Err(returned) => node = returned,
                }
            }
        }
    }
    Err(node)
}
