//! Context resolution: which device feeds the next addition.
//!
//! The context device gates compatibility checks and determines which output
//! ports a split can select. At the root it is the last device of the root
//! sequence. Inside a focused branch it is the branch's last device, or, for
//! a branch without devices, the device feeding the split with its output
//! replaced by the branch's selected port.

use std::borrow::Cow;

use crate::device::DeviceDescriptor;

use super::node::{BranchRef, ChainNode, NodeId};
use super::tree::Chain;

/// Last device node of a sequence. Splits are skipped, not descended.
pub fn last_device(nodes: &[ChainNode]) -> Option<&DeviceDescriptor> {
    nodes
        .iter()
        .rev()
        .find_map(|node| node.as_device().map(|d| &d.device))
}

enum Search<'a> {
    Found(Option<&'a DeviceDescriptor>),
    Continue(Option<&'a DeviceDescriptor>),
}

fn search<'a>(
    nodes: &'a [ChainNode],
    mut context: Option<&'a DeviceDescriptor>,
    target: NodeId,
) -> Search<'a> {
    for node in nodes {
        if node.id() == target {
            return Search::Found(context);
        }
        match node {
            ChainNode::Device(device) => context = Some(&device.device),
            ChainNode::Split(split) => {
                // Every branch starts from the device that fed the split, and
                // the sequence after the split continues from it too.
                for branch in &split.branches {
                    if let Search::Found(found) = search(branch, context, target) {
                        return Search::Found(found);
                    }
                }
            }
        }
    }
    Search::Continue(context)
}

/// The device immediately preceding node `id`, searching the whole tree.
///
/// `None` when the node does not exist or nothing precedes it.
pub fn device_before(chain: &Chain, id: NodeId) -> Option<&DeviceDescriptor> {
    match search(chain.nodes(), None, id) {
        Search::Found(context) => context,
        Search::Continue(_) => None,
    }
}

/// The device new additions at `focus` would connect to.
///
/// `None` focus means the root. An unknown split or branch index yields
/// `None`.
pub fn context_device(
    chain: &Chain,
    focus: Option<BranchRef>,
) -> Option<Cow<'_, DeviceDescriptor>> {
    let Some(focus) = focus else {
        return last_device(chain.nodes()).map(Cow::Borrowed);
    };
    let split = chain.find_split(focus.split)?;
    let branch = split.branches.get(focus.branch)?;
    if let Some(device) = last_device(branch) {
        return Some(Cow::Borrowed(device));
    }
    let feeding = device_before(chain, split.id)?;
    Some(match split.selected_ports.get(&focus.branch) {
        Some(port) => Cow::Owned(feeding.clone().with_output_port(port)),
        None => Cow::Borrowed(feeding),
    })
}
