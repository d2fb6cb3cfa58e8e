//! ALC Core - signal-chain model for audio latency planning
//!
//! This crate models a chain of audio devices, each converting an input
//! protocol/sample rate into an output protocol/sample rate and adding
//! latency. Chains may split into named parallel branches, nested to any
//! depth.
//!
//! # Core Abstractions
//!
//! ## Devices and Catalog
//!
//! - [`DeviceDescriptor`] - One catalog row
//! - [`Port`] - One output configuration a device can be set to
//! - [`Catalog`] - Ordered device list with port resolution and library queries
//! - [`ProtocolFamily`] - Coarse grouping of protocol names
//!
//! ## Chain Tree
//!
//! - [`Chain`] - Root sequence of [`ChainNode`]s
//! - [`SplitNode`] - Fan-out into branches with per-branch names and ports
//! - [`IdGenerator`] - Source of unique node ids
//!
//! ## Rules
//!
//! - [`is_compatible`] - Can a device accept the previous device's output?
//! - [`context_device`] - Which device feeds the next addition
//! - [`total_latency`] / [`all_path_totals`] - Longest path and per-path totals
//!
//! ## Editing
//!
//! - [`Session`] - Owns chain, focus and catalog; every structural mutation
//! - [`ChainObserver`] - Persistence and analytics hooks
//! - [`PreviewService`] - Audio preview of a latency value
//!
//! # Example
//!
//! ```rust
//! use alc_core::{BranchRef, Catalog, DeviceDescriptor, Session};
//!
//! let catalog = Catalog::new(vec![
//!     DeviceDescriptor::new(1, "Stagebox", 0.3).with_input("Analog", None).with_output("Dante", Some("48kHz")),
//!     DeviceDescriptor::new(2, "Console", 1.1).with_input("Dante", Some("48kHz")).with_output("Analog", None),
//!     DeviceDescriptor::new(3, "Recorder", 0.2).with_input("Dante", Some("48kHz")),
//! ]);
//! let stagebox = catalog.get(1).cloned().unwrap();
//! let console = catalog.get(2).cloned().unwrap();
//! let recorder = catalog.get(3).cloned().unwrap();
//!
//! let mut session = Session::new(catalog);
//! let first = session.append_device(&stagebox, None).unwrap().unwrap();
//! let split = session.split_at(first).unwrap();
//! session.append_device(&console, Some(BranchRef::new(split, 0))).unwrap();
//! session.append_device(&recorder, Some(BranchRef::new(split, 1))).unwrap();
//!
//! for path in session.all_path_totals() {
//!     println!("{}: {:.2} ms", path.label, path.latency);
//! }
//! assert!((session.total_latency() - 1.4).abs() < 1e-9);
//! ```

pub mod catalog;
pub mod chain;
pub mod compat;
pub mod device;
pub mod preview;
pub mod protocol;
pub mod session;

pub use catalog::{
    Catalog, CatalogError, LibraryEntry, LibraryQuery, ParseSortOrderError, SortOrder,
    parse_device, parse_latency_ms, rank_for_context,
};
pub use chain::context::{context_device, device_before};
pub use chain::latency::{
    PATH_SEPARATOR, PathTotal, all_path_totals, all_path_totals_with, total_latency,
};
pub use chain::{
    BranchRef, Chain, ChainNode, DeviceNode, IdGenerator, IntegrityError, NodeId,
    ParseBranchRefError, SequentialIds, SplitNode, default_branch_name,
};
pub use compat::{Incompatible, is_compatible};
pub use device::{DeviceDescriptor, Port, UNKNOWN_BRAND, UNSPECIFIED};
pub use preview::{PreviewError, PreviewService, request_preview};
pub use protocol::ProtocolFamily;
pub use session::{ChainChange, ChainObserver, ChangeKind, ObserverError, Session};
