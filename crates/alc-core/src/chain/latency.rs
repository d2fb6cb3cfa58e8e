//! Latency aggregation over the chain tree.
//!
//! Parallel branches propagate simultaneously, so a split contributes the
//! latency of its slowest branch. The chain total is therefore the latency of
//! the longest root-to-leaf path, which [`all_path_totals`] enumerates
//! explicitly.

use super::node::{ChainNode, SplitNode};
use super::tree::Chain;

/// Default separator between branch names in a path label.
pub const PATH_SEPARATOR: &str = " > ";

/// Latency of one root-to-leaf path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTotal {
    /// Branch names along the path; empty when the chain has no splits.
    pub label: String,
    /// Path latency in milliseconds.
    pub latency: f64,
}

/// Total latency of the chain: the longest root-to-leaf path.
pub fn total_latency(chain: &Chain) -> f64 {
    sequence_latency(chain.nodes())
}

/// Latency of a node sequence.
pub fn sequence_latency(nodes: &[ChainNode]) -> f64 {
    nodes
        .iter()
        .map(|node| match node {
            ChainNode::Device(device) => device.device.latency,
            ChainNode::Split(split) => split_latency(split),
        })
        .sum()
}

/// Contribution of a split: the maximum over its branches.
pub fn split_latency(split: &SplitNode) -> f64 {
    (0..split.branches.len())
        .map(|index| branch_latency(split, index))
        .fold(0.0, f64::max)
}

/// Latency of one branch.
///
/// An empty branch costs its selected port's latency, so the path is
/// previewed before any device is added.
pub fn branch_latency(split: &SplitNode, index: usize) -> f64 {
    match split.branches.get(index) {
        Some(branch) if branch.is_empty() => empty_branch_latency(split, index),
        Some(branch) => sequence_latency(branch),
        None => 0.0,
    }
}

fn empty_branch_latency(split: &SplitNode, index: usize) -> f64 {
    split.selected_ports.get(&index).map_or(0.0, |port| port.latency)
}

/// One record per root-to-leaf path, labels joined with [`PATH_SEPARATOR`].
pub fn all_path_totals(chain: &Chain) -> Vec<PathTotal> {
    all_path_totals_with(chain, PATH_SEPARATOR)
}

/// One record per root-to-leaf path, labels joined with `separator`.
///
/// A chain without splits yields exactly one record with an empty label.
pub fn all_path_totals_with(chain: &Chain, separator: &str) -> Vec<PathTotal> {
    enumerate(chain.nodes())
        .into_iter()
        .map(|(names, latency)| PathTotal {
            label: names.join(separator),
            latency,
        })
        .collect()
}

type PartialPath = (Vec<String>, f64);

fn enumerate(nodes: &[ChainNode]) -> Vec<PartialPath> {
    let mut paths: Vec<PartialPath> = vec![(Vec::new(), 0.0)];
    for node in nodes {
        match node {
            ChainNode::Device(device) => {
                for (_, latency) in &mut paths {
                    *latency += device.device.latency;
                }
            }
            ChainNode::Split(split) if split.branches.is_empty() => {}
            ChainNode::Split(split) => {
                let mut extended = Vec::new();
                for (prefix, prefix_latency) in &paths {
                    for (index, branch) in split.branches.iter().enumerate() {
                        let tails = if branch.is_empty() {
                            vec![(Vec::new(), empty_branch_latency(split, index))]
                        } else {
                            enumerate(branch)
                        };
                        for (tail, tail_latency) in tails {
                            let mut names = prefix.clone();
                            names.push(split.branch_name(index));
                            names.extend(tail);
                            extended.push((names, prefix_latency + tail_latency));
                        }
                    }
                }
                paths = extended;
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::node::{DeviceNode, NodeId};
    use crate::device::{DeviceDescriptor, Port};

    fn device(id: u64, latency: f64) -> ChainNode {
        DeviceNode::new(NodeId(id), DeviceDescriptor::new(id, format!("dev{id}"), latency)).into()
    }

    #[test]
    fn linear_sum() {
        let chain = Chain::from_nodes(vec![device(1, 3.5), device(2, 10.0), device(3, 0.0)]);
        assert!((total_latency(&chain) - 13.5).abs() < 1e-9);
        let paths = all_path_totals(&chain);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].label, "");
        assert!((paths[0].latency - 13.5).abs() < 1e-9);
    }

    #[test]
    fn empty_chain() {
        let chain = Chain::new();
        assert_eq!(total_latency(&chain), 0.0);
        assert_eq!(
            all_path_totals(&chain),
            vec![PathTotal {
                label: String::new(),
                latency: 0.0
            }]
        );
    }

    #[test]
    fn split_contributes_slowest_branch() {
        let mut split = SplitNode::new(NodeId(10), None);
        split.branches[0].push(device(2, 5.0));
        split.branches[1].push(device(3, 8.2));
        let chain = Chain::from_nodes(vec![device(1, 1.0), split.into()]);
        assert!((total_latency(&chain) - 9.2).abs() < 1e-9);
    }

    #[test]
    fn empty_branches_yield_labelled_paths() {
        let split = SplitNode::new(NodeId(10), None);
        let chain = Chain::from_nodes(vec![device(1, 2.0), split.into()]);
        let paths = all_path_totals(&chain);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].label, "Path A");
        assert_eq!(paths[1].label, "Path B");
        assert!(paths.iter().all(|p| p.latency == 2.0));
    }

    #[test]
    fn empty_branch_counts_selected_port() {
        let port = Port {
            protocol: "Dante".to_string(),
            sample_rate: None,
            latency: 1.5,
        };
        let mut split = SplitNode::new(NodeId(10), Some(port));
        split.branches[0].push(device(2, 0.5));
        let chain = Chain::from_nodes(vec![split.into()]);
        assert_eq!(branch_latency(chain.nodes()[0].as_split().unwrap(), 0), 0.5);
        assert_eq!(branch_latency(chain.nodes()[0].as_split().unwrap(), 1), 1.5);
        assert_eq!(total_latency(&chain), 1.5);
    }

    #[test]
    fn nested_paths_and_custom_separator() {
        let mut inner = SplitNode::new(NodeId(20), None);
        inner.branches[0].push(device(4, 4.0));
        inner.branches[1].push(device(5, 1.0));
        let mut outer = SplitNode::new(NodeId(10), None);
        outer.branch_names.insert(0, "FOH".to_string());
        outer.branches[0].push(device(2, 1.0));
        outer.branches[0].push(inner.into());
        outer.branches[1].push(device(3, 2.0));
        let chain = Chain::from_nodes(vec![device(1, 1.0), outer.into(), device(6, 0.5)]);

        let paths = all_path_totals_with(&chain, " / ");
        let labels: Vec<&str> = paths.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["FOH / Path A", "FOH / Path B", "Path B"]);
        let latencies: Vec<f64> = paths.iter().map(|p| p.latency).collect();
        assert_eq!(latencies, vec![6.5, 3.5, 3.5]);
        assert_eq!(total_latency(&chain), 6.5);
    }
}
