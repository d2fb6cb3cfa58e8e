//! Editing session: the chain, the active focus, and structural mutations.
//!
//! A [`Session`] owns everything an edit needs: the chain tree, the branch new
//! devices are appended to, the catalog used to resolve ports, and the id
//! generator. Every mutation runs to completion and then notifies registered
//! [`ChainObserver`]s. Observer failures are logged and never undo the edit.
//!
//! Lookups that miss (an unknown node id, a branch index out of range) are
//! silent no-ops reported as `false` or `None`. Appending an incompatible
//! device is the one explicit rejection and carries an [`Incompatible`] reason.
//!
//! # Example
//!
//! ```rust
//! use alc_core::{Catalog, DeviceDescriptor, Session};
//!
//! let stagebox = DeviceDescriptor::new(1, "Stagebox", 0.5).with_output("Dante", Some("48kHz"));
//! let console = DeviceDescriptor::new(2, "Console", 1.2).with_input("Dante", Some("48kHz"));
//! let amp = DeviceDescriptor::new(3, "Amp", 3.0).with_input("Analog", None);
//!
//! let mut session = Session::new(Catalog::new(vec![stagebox.clone(), console.clone()]));
//! session.append_device(&stagebox, None).unwrap();
//! session.append_device(&console, None).unwrap();
//! assert!(session.append_device(&amp, None).is_ok()); // console has no output protocol
//! assert!((session.total_latency() - 4.7).abs() < 1e-9);
//! ```

use std::borrow::Cow;
use std::error::Error;

use crate::catalog::{Catalog, LibraryEntry, LibraryQuery, rank_for_context};
use crate::chain::context::{context_device, device_before};
use crate::chain::latency::{self, PathTotal};
use crate::chain::{
    BranchRef, Chain, ChainNode, DeviceNode, IdGenerator, NodeId, SequentialIds, SplitNode,
};
use crate::compat::{Incompatible, is_compatible};
use crate::device::{DeviceDescriptor, Port};

/// Error type returned by observers.
pub type ObserverError = Box<dyn Error + Send + Sync>;

/// What a mutation changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeKind<'a> {
    /// A catalog device was appended.
    DeviceAdded {
        /// The new node.
        node: NodeId,
        /// The appended device.
        device: &'a DeviceDescriptor,
    },
    /// A node was removed.
    NodeRemoved(NodeId),
    /// A device node's nickname changed.
    NodeRenamed(NodeId),
    /// An externally built node was spliced in.
    NodeInserted(NodeId),
    /// A split was created.
    SplitCreated(NodeId),
    /// A branch was appended to a split.
    BranchAdded(BranchRef),
    /// A branch was removed from a split.
    BranchRemoved(BranchRef),
    /// A branch was renamed.
    BranchRenamed(BranchRef),
    /// A branch port selection changed.
    PortSelected(BranchRef),
    /// The chain was emptied.
    Cleared,
}

/// Notification delivered to observers after a mutation.
#[derive(Debug, Clone, Copy)]
pub struct ChainChange<'a> {
    /// What changed.
    pub kind: ChangeKind<'a>,
    /// The chain after the change.
    pub chain: &'a Chain,
}

/// Side channel notified after every successful mutation (persistence,
/// analytics).
pub trait ChainObserver {
    /// Name used in log messages.
    fn name(&self) -> &str {
        "observer"
    }

    /// Called after the chain changed.
    fn chain_changed(&mut self, change: &ChainChange<'_>) -> Result<(), ObserverError>;
}

/// An editing session over one chain.
pub struct Session {
    chain: Chain,
    focus: Option<BranchRef>,
    catalog: Catalog,
    ids: Box<dyn IdGenerator>,
    observers: Vec<Box<dyn ChainObserver>>,
}

impl Session {
    /// Starts a session with an empty chain.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_chain(catalog, Chain::new())
    }

    /// Starts a session over an existing chain.
    ///
    /// New ids continue above the highest id in `chain`.
    pub fn with_chain(catalog: Catalog, chain: Chain) -> Self {
        let ids = SequentialIds::after(chain.max_id());
        Self {
            chain,
            focus: None,
            catalog,
            ids: Box::new(ids),
            observers: Vec::new(),
        }
    }

    /// Replaces the id generator.
    ///
    /// The generator is told about the current maximum id first.
    pub fn with_id_generator(mut self, mut ids: Box<dyn IdGenerator>) -> Self {
        if let Some(max) = self.chain.max_id() {
            ids.observe(max);
        }
        self.ids = ids;
        self
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn ChainObserver>) {
        self.observers.push(observer);
    }

    /// The chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The branch new devices go to; `None` is the root.
    pub fn focus(&self) -> Option<BranchRef> {
        self.focus
    }

    /// Moves the focus. Returns `false` and leaves it unchanged when the
    /// branch does not exist.
    pub fn set_focus(&mut self, focus: Option<BranchRef>) -> bool {
        if let Some(at) = focus
            && self.chain.branch(at).is_none()
        {
            return false;
        }
        self.focus = focus;
        true
    }

    /// Moves the focus back to the root.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// The device the next addition at the focus connects to.
    pub fn context_device(&self) -> Option<Cow<'_, DeviceDescriptor>> {
        context_device(&self.chain, self.focus)
    }

    /// Library listing ranked against the current context device.
    pub fn library(&self, query: &LibraryQuery) -> Vec<LibraryEntry<'_>> {
        let context = self.context_device();
        rank_for_context(self.catalog.query(query), context.as_deref())
    }

    // --- Mutations ---

    /// Appends a catalog device at `target`, or at the focus when `target` is
    /// `None`.
    ///
    /// Returns `Ok(None)` when the addressed branch does not exist, and
    /// `Err` when the device cannot accept the context device's output. The
    /// chain is unchanged in both cases.
    pub fn append_device(
        &mut self,
        device: &DeviceDescriptor,
        target: Option<BranchRef>,
    ) -> Result<Option<NodeId>, Incompatible> {
        let target = target.or(self.focus);
        if let Some(at) = target
            && self.chain.branch(at).is_none()
        {
            return Ok(None);
        }
        if let Some(context) = context_device(&self.chain, target)
            && let Err(rejection) = is_compatible(&context, device)
        {
            tracing::debug!("chain_reject: {} ({})", device.name, rejection.reason);
            return Err(rejection);
        }

        let id = self.ids.next_id();
        let node = DeviceNode::new(id, device.clone());
        match target {
            None => self.chain.push(node),
            Some(at) => match self.chain.branch_mut(at) {
                Some(branch) => branch.push(node.into()),
                None => return Ok(None),
            },
        }
        tracing::debug!("chain_add: device node {id} ({})", device.name);
        self.notify(ChangeKind::DeviceAdded { node: id, device });
        Ok(Some(id))
    }

    /// Removes a node from wherever it occurs. Idempotent.
    ///
    /// Splits stay in place when a branch empties. If the focused branch
    /// disappears with the node, the focus returns to the root.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.chain.remove(id) {
            return false;
        }
        if let Some(focus) = self.focus
            && self.chain.branch(focus).is_none()
        {
            self.focus = None;
        }
        tracing::debug!("chain_remove: node {id}");
        self.notify(ChangeKind::NodeRemoved(id));
        true
    }

    /// Sets a device node's nickname. Blank input clears it.
    pub fn rename_node(&mut self, id: NodeId, label: &str) -> bool {
        if !self.chain.rename(id, non_blank(label)) {
            return false;
        }
        tracing::debug!("chain_rename: node {id}");
        self.notify(ChangeKind::NodeRenamed(id));
        true
    }

    /// Renames a branch. Blank input restores the default name.
    pub fn rename_branch(&mut self, split: NodeId, index: usize, label: &str) -> bool {
        let renamed = self
            .chain
            .find_split_mut(split)
            .is_some_and(|s| s.set_branch_name(index, non_blank(label)));
        if renamed {
            tracing::debug!("chain_rename: branch {split}:{index}");
            self.notify(ChangeKind::BranchRenamed(BranchRef::new(split, index)));
        }
        renamed
    }

    /// Splices `node` in right after `anchor`.
    ///
    /// Fails when the anchor is missing, when any id in `node` is already
    /// used by the chain, or when `node` itself repeats an id or holds a split
    /// with fewer than two branches.
    pub fn insert_after(&mut self, anchor: NodeId, node: ChainNode) -> bool {
        if let Err(err) = Chain::from_nodes(vec![node.clone()]).validate() {
            tracing::debug!("chain_insert: rejected node {} ({err})", node.id());
            return false;
        }
        let incoming = node.subtree_ids();
        if incoming.iter().any(|id| self.chain.contains(*id)) {
            return false;
        }
        let id = node.id();
        if self.chain.insert_after(anchor, node).is_err() {
            return false;
        }
        for incoming_id in incoming {
            self.ids.observe(incoming_id);
        }
        tracing::debug!("chain_insert: node {id} after {anchor}");
        self.notify(ChangeKind::NodeInserted(id));
        true
    }

    /// Splits the path right after `anchor` into "Path A" and "Path B".
    ///
    /// When the device feeding the new split offers more than one output
    /// port, both branches start with the first one selected. The focus moves
    /// to branch A.
    pub fn split_at(&mut self, anchor: NodeId) -> Option<NodeId> {
        let id = self.ids.next_id();
        if self
            .chain
            .insert_after(anchor, SplitNode::new(id, None).into())
            .is_err()
        {
            return None;
        }
        let ports = self.ports_for_split(id);
        if ports.len() > 1
            && let Some(split) = self.chain.find_split_mut(id)
        {
            for index in 0..split.branches.len() {
                split.selected_ports.insert(index, ports[0].clone());
            }
        }
        self.focus = Some(BranchRef::new(id, 0));
        tracing::debug!("chain_split: split node {id} after {anchor}");
        self.notify(ChangeKind::SplitCreated(id));
        Some(id)
    }

    /// Appends an empty branch to a split and focuses it.
    pub fn add_branch(&mut self, split: NodeId) -> Option<usize> {
        let index = self.chain.find_split_mut(split)?.push_branch();
        let at = BranchRef::new(split, index);
        self.focus = Some(at);
        tracing::debug!("chain_branch_add: {at}");
        self.notify(ChangeKind::BranchAdded(at));
        Some(index)
    }

    /// Removes a branch when the split has more than two.
    ///
    /// A focus on the removed branch returns to the root; a focus on a later
    /// branch follows it to its new index.
    pub fn remove_branch(&mut self, split: NodeId, index: usize) -> bool {
        let removed = self
            .chain
            .find_split_mut(split)
            .and_then(|s| s.remove_branch(index))
            .is_some();
        if !removed {
            return false;
        }
        self.focus = match self.focus {
            Some(focus) if focus.split == split && focus.branch == index => None,
            Some(focus) if focus.split == split && focus.branch > index => {
                Some(BranchRef::new(split, focus.branch - 1))
            }
            Some(focus) if self.chain.branch(focus).is_none() => None,
            other => other,
        };
        let at = BranchRef::new(split, index);
        tracing::debug!("chain_branch_remove: {at}");
        self.notify(ChangeKind::BranchRemoved(at));
        true
    }

    /// Output ports the device feeding `split` offers.
    pub fn ports_for_split(&self, split: NodeId) -> Vec<Port> {
        if self.chain.find_split(split).is_none() {
            return Vec::new();
        }
        self.catalog
            .unique_outputs(device_before(&self.chain, split))
    }

    /// Selects the port with key `key` for one branch.
    ///
    /// Only meaningful when the feeding device offers several ports; an
    /// unknown key changes nothing.
    pub fn select_port(&mut self, split: NodeId, index: usize, key: &str) -> bool {
        let ports = self.ports_for_split(split);
        if ports.len() < 2 {
            return false;
        }
        let Some(port) = ports.into_iter().find(|p| p.key() == key) else {
            return false;
        };
        let Some(node) = self.chain.find_split_mut(split) else {
            return false;
        };
        if index >= node.branches.len() {
            return false;
        }
        node.selected_ports.insert(index, port);
        let at = BranchRef::new(split, index);
        tracing::debug!("chain_port: {at} -> {key}");
        self.notify(ChangeKind::PortSelected(at));
        true
    }

    /// Empties the chain and returns the focus to the root.
    ///
    /// Ids handed out before stay retired.
    pub fn clear(&mut self) {
        self.chain.clear();
        self.focus = None;
        tracing::debug!("chain_clear");
        self.notify(ChangeKind::Cleared);
    }

    // --- Latency ---

    /// Longest root-to-leaf latency in milliseconds.
    pub fn total_latency(&self) -> f64 {
        latency::total_latency(&self.chain)
    }

    /// Latency of every root-to-leaf path.
    pub fn all_path_totals(&self) -> Vec<PathTotal> {
        latency::all_path_totals(&self.chain)
    }

    fn notify(&mut self, kind: ChangeKind<'_>) {
        let change = ChainChange {
            kind,
            chain: &self.chain,
        };
        for observer in &mut self.observers {
            if let Err(err) = observer.chain_changed(&change) {
                tracing::warn!("chain_notify: {} failed: {err}", observer.name());
            }
        }
    }
}

fn non_blank(label: &str) -> Option<String> {
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}
