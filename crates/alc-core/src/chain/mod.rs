//! The signal-chain tree.
//!
//! A [`Chain`] is an ordered sequence of [`ChainNode`]s. Device nodes carry a
//! snapshot of a catalog device; split nodes fan the signal out into named
//! parallel branches, each an independent sequence that may split again.
//!
//! # Structure
//!
//! ```text
//! Stagebox -> Console -> Split ┬ Path A: Processor -> Amp
//!                              └ Path B: Recorder
//! ```
//!
//! - Node ids are unique across the whole tree and come from an
//!   [`IdGenerator`].
//! - A split always keeps at least two branches. Branches may be empty.
//! - Each branch may carry a selected output [`Port`](crate::Port) of the
//!   device feeding the split.
//!
//! Queries over the tree live in [`context`] (which device feeds the next
//! addition) and [`latency`] (longest-path and per-path totals).

mod ids;
mod node;
mod tree;

pub mod context;
pub mod latency;

pub use ids::{IdGenerator, SequentialIds};
pub use node::{
    BranchRef, ChainNode, DeviceNode, NodeId, ParseBranchRefError, SplitNode, default_branch_name,
};
pub use tree::{Chain, IntegrityError};
