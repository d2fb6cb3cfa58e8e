//! Chain node types.
//!
//! A chain is a sequence of [`ChainNode`]s. A node is either a device
//! ([`DeviceNode`]) or a split ([`SplitNode`]) that fans the signal out into
//! two or more named parallel branches. Branches are sequences of nodes
//! themselves, so splits nest to any depth.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::{DeviceDescriptor, Port};

/// Unique identifier for a node in the chain.
///
/// IDs are assigned by an [`IdGenerator`](super::IdGenerator) and never reused
/// within a session. They stay stable across every mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// Address of one branch of a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchRef {
    /// The split node.
    pub split: NodeId,
    /// Zero-based branch index.
    pub branch: usize,
}

impl BranchRef {
    /// Creates a branch reference.
    pub fn new(split: NodeId, branch: usize) -> Self {
        Self { split, branch }
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.split, self.branch)
    }
}

/// Error returned when parsing a [`BranchRef`] from `"SPLIT:INDEX"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid branch reference '{0}' (expected SPLIT:INDEX, e.g. 3:1)")]
pub struct ParseBranchRefError(String);

impl FromStr for BranchRef {
    type Err = ParseBranchRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseBranchRefError(s.to_string());
        let (split, branch) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            split: split.parse().map_err(|_| invalid())?,
            branch: branch.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Default display name for a branch: `"Path A"` through `"Path Z"`, then
/// `"Path 27"` and onwards.
pub fn default_branch_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Path {}", char::from(b'A' + i)),
        _ => format!("Path {}", index + 1),
    }
}

/// A device placed in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceNode {
    /// Node identifier.
    pub id: NodeId,
    /// Snapshot of the catalog device.
    pub device: DeviceDescriptor,
    /// User-assigned label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl DeviceNode {
    /// Wraps a device as a node.
    pub fn new(id: NodeId, device: DeviceDescriptor) -> Self {
        Self {
            id,
            device,
            nickname: None,
        }
    }

    /// The nickname if set, otherwise the device name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.device.name)
    }
}

/// A fan-out point with parallel branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    /// Node identifier.
    pub id: NodeId,
    /// Ordered branches; each is a sequence of nodes.
    pub branches: Vec<Vec<ChainNode>>,
    /// Branch index to display name. Missing entries use the default name.
    #[serde(default, with = "index_keys")]
    pub branch_names: BTreeMap<usize, String>,
    /// Branch index to selected output port of the device feeding the split.
    #[serde(default, with = "index_keys")]
    pub selected_ports: BTreeMap<usize, Port>,
}

impl SplitNode {
    /// Minimum number of branches a split keeps.
    pub const MIN_BRANCHES: usize = 2;

    /// Creates a split with two empty branches named "Path A" and "Path B".
    ///
    /// `default_port`, when given, becomes the selection of both branches.
    pub fn new(id: NodeId, default_port: Option<Port>) -> Self {
        let mut split = Self {
            id,
            branches: vec![Vec::new(), Vec::new()],
            branch_names: BTreeMap::new(),
            selected_ports: BTreeMap::new(),
        };
        for index in 0..Self::MIN_BRANCHES {
            split.branch_names.insert(index, default_branch_name(index));
            if let Some(port) = &default_port {
                split.selected_ports.insert(index, port.clone());
            }
        }
        split
    }

    /// Display name of a branch.
    pub fn branch_name(&self, index: usize) -> String {
        self.branch_names
            .get(&index)
            .cloned()
            .unwrap_or_else(|| default_branch_name(index))
    }

    /// Appends an empty branch and returns its index.
    ///
    /// The new branch is named with the next default name and inherits
    /// branch 0's port selection.
    pub fn push_branch(&mut self) -> usize {
        let index = self.branches.len();
        self.branches.push(Vec::new());
        self.branch_names.insert(index, default_branch_name(index));
        if let Some(port) = self.selected_ports.get(&0).cloned() {
            self.selected_ports.insert(index, port);
        }
        index
    }

    /// Removes a branch, shifting later branches down by one.
    ///
    /// Returns the removed nodes, or `None` when the index is out of range or
    /// only [`MIN_BRANCHES`](Self::MIN_BRANCHES) branches remain.
    pub fn remove_branch(&mut self, index: usize) -> Option<Vec<ChainNode>> {
        if self.branches.len() <= Self::MIN_BRANCHES || index >= self.branches.len() {
            return None;
        }
        let removed = self.branches.remove(index);
        shift_down(&mut self.branch_names, index);
        shift_down(&mut self.selected_ports, index);
        Some(removed)
    }

    /// Sets a branch name; `None` restores the default name.
    pub fn set_branch_name(&mut self, index: usize, name: Option<String>) -> bool {
        if index >= self.branches.len() {
            return false;
        }
        let name = name.unwrap_or_else(|| default_branch_name(index));
        self.branch_names.insert(index, name);
        true
    }
}

/// Drops `removed` from a per-branch map and moves every later key down by one.
fn shift_down<V>(map: &mut BTreeMap<usize, V>, removed: usize) {
    let tail = map.split_off(&removed);
    for (index, value) in tail {
        if index > removed {
            map.insert(index - 1, value);
        }
    }
}

/// A node in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainNode {
    /// A device.
    Device(DeviceNode),
    /// A split into parallel branches.
    Split(SplitNode),
}

impl ChainNode {
    /// The node identifier.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Device(node) => node.id,
            Self::Split(node) => node.id,
        }
    }

    /// The device node, if this is one.
    pub fn as_device(&self) -> Option<&DeviceNode> {
        match self {
            Self::Device(node) => Some(node),
            Self::Split(_) => None,
        }
    }

    /// The split node, if this is one.
    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Self::Split(node) => Some(node),
            Self::Device(_) => None,
        }
    }

    /// Mutable access to the split node, if this is one.
    pub fn as_split_mut(&mut self) -> Option<&mut SplitNode> {
        match self {
            Self::Split(node) => Some(node),
            Self::Device(_) => None,
        }
    }

    /// Ids of this node and everything nested under it.
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id()];
        if let Self::Split(split) = self {
            for node in split.branches.iter().flatten() {
                ids.extend(node.subtree_ids());
            }
        }
        ids
    }
}

impl From<DeviceNode> for ChainNode {
    fn from(node: DeviceNode) -> Self {
        Self::Device(node)
    }
}

impl From<SplitNode> for ChainNode {
    fn from(node: SplitNode) -> Self {
        Self::Split(node)
    }
}

/// Serializes `BTreeMap<usize, V>` with string keys.
///
/// Internally tagged enums buffer their content, and buffered map keys are
/// strings, so the keys are parsed back explicitly.
mod index_keys {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, V>(map: &BTreeMap<usize, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let keyed: BTreeMap<String, &V> = map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<usize, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let keyed = BTreeMap::<String, V>::deserialize(deserializer)?;
        keyed
            .into_iter()
            .map(|(key, value)| {
                key.parse::<usize>()
                    .map(|index| (index, value))
                    .map_err(|_| D::Error::custom(format!("invalid branch index '{key}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(protocol: &str, latency: f64) -> Port {
        Port {
            protocol: protocol.to_string(),
            sample_rate: Some("48kHz".to_string()),
            latency,
        }
    }

    #[test]
    fn default_names() {
        assert_eq!(default_branch_name(0), "Path A");
        assert_eq!(default_branch_name(2), "Path C");
        assert_eq!(default_branch_name(25), "Path Z");
        assert_eq!(default_branch_name(26), "Path 27");
    }

    #[test]
    fn new_split_shares_default_port() {
        let split = SplitNode::new(NodeId(1), Some(port("Dante", 0.5)));
        assert_eq!(split.branches.len(), 2);
        assert_eq!(split.branch_name(1), "Path B");
        assert_eq!(split.selected_ports.get(&0), split.selected_ports.get(&1));
    }

    #[test]
    fn push_branch_copies_first_selection() {
        let mut split = SplitNode::new(NodeId(1), None);
        split.selected_ports.insert(0, port("MADI", 1.0));
        let index = split.push_branch();
        assert_eq!(index, 2);
        assert_eq!(split.branch_name(2), "Path C");
        assert_eq!(split.selected_ports[&2].protocol, "MADI");
    }

    #[test]
    fn remove_branch_needs_three() {
        let mut split = SplitNode::new(NodeId(1), None);
        assert!(split.remove_branch(0).is_none());
        assert_eq!(split.branches.len(), 2);
    }

    #[test]
    fn remove_branch_renumbers_maps() {
        let mut split = SplitNode::new(NodeId(1), None);
        split.push_branch();
        split.push_branch();
        split.set_branch_name(2, Some("FOH".to_string()));
        split.set_branch_name(3, Some("Monitors".to_string()));
        split.selected_ports.insert(3, port("AES3", 2.0));

        assert!(split.remove_branch(1).is_some());
        assert_eq!(split.branches.len(), 3);
        assert_eq!(split.branch_name(0), "Path A");
        assert_eq!(split.branch_name(1), "FOH");
        assert_eq!(split.branch_name(2), "Monitors");
        assert_eq!(split.selected_ports[&2].protocol, "AES3");
        assert!(!split.branch_names.contains_key(&3));
        assert!(!split.selected_ports.contains_key(&3));
    }

    #[test]
    fn remove_branch_out_of_range() {
        let mut split = SplitNode::new(NodeId(1), None);
        split.push_branch();
        assert!(split.remove_branch(5).is_none());
        assert_eq!(split.branches.len(), 3);
    }

    #[test]
    fn branch_ref_parse() {
        let r: BranchRef = "12:1".parse().unwrap();
        assert_eq!(r, BranchRef::new(NodeId(12), 1));
        assert_eq!(r.to_string(), "12:1");
        assert!("12".parse::<BranchRef>().is_err());
        assert!("a:b".parse::<BranchRef>().is_err());
    }

    #[test]
    fn node_id_parse_accepts_hash_prefix() {
        assert_eq!("#7".parse::<NodeId>().unwrap(), NodeId(7));
        assert_eq!("7".parse::<NodeId>().unwrap(), NodeId(7));
    }

    #[test]
    fn split_serializes_with_type_tag() {
        let node = ChainNode::from(SplitNode::new(NodeId(3), Some(port("Dante", 0.25))));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "split");
        assert_eq!(json["branch_names"]["1"], "Path B");
        let back: ChainNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn display_name_falls_back_to_device() {
        let mut node = DeviceNode::new(NodeId(1), DeviceDescriptor::new(0, "Rio", 0.3));
        assert_eq!(node.display_name(), "Rio");
        node.nickname = Some("Stage left".to_string());
        assert_eq!(node.display_name(), "Stage left");
    }
}
