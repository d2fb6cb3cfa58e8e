//! Chain editing commands.
//!
//! Every command restores the saved chain, applies one change and lets the
//! session's store observer write the result back.

use alc_core::chain::latency::branch_latency;
use alc_core::{BranchRef, Chain, ChainNode, NodeId, Session, SplitNode, all_path_totals_with};
use clap::{Args, Subcommand};

use super::common::{Environment, GlobalOpts, ms, protocol_summary, resolve_device};

#[derive(Args)]
pub struct ChainArgs {
    #[command(subcommand)]
    command: Option<ChainCommand>,
}

#[derive(Subcommand)]
enum ChainCommand {
    /// Print the chain tree and per-path totals
    Show,

    /// Append a device by catalog id or exact name
    Add {
        /// Catalog id or device name
        device: String,

        /// Append to this branch (SPLIT:IDX) instead of the root
        #[arg(long, value_name = "SPLIT:IDX")]
        into: Option<BranchRef>,
    },

    /// Remove a node (and everything inside it)
    Remove {
        /// Node id
        id: NodeId,
    },

    /// Set a node's nickname; omit the label to clear it
    Rename {
        /// Node id
        id: NodeId,

        /// New nickname
        label: Option<String>,
    },

    /// Insert a split after a node
    Split {
        /// Node id to split after
        anchor: NodeId,
    },

    /// Manage split branches
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },

    /// List the output ports available to a split
    Ports {
        /// Split node id
        split: NodeId,
    },

    /// Select the output port of one branch
    Port {
        /// Split node id
        split: NodeId,

        /// Branch index
        index: usize,

        /// Port key as printed by 'alc chain ports', e.g. "Dante|48kHz"
        key: String,
    },

    /// Remove every node
    Clear,

    /// Print the total latency
    Latency {
        /// Print every path, not just the longest
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// Add an empty branch to a split
    Add {
        /// Split node id
        split: NodeId,
    },

    /// Remove a branch (a split keeps at least two)
    Remove {
        /// Split node id
        split: NodeId,

        /// Branch index
        index: usize,
    },

    /// Rename a branch; omit the label to restore the default name
    Rename {
        /// Split node id
        split: NodeId,

        /// Branch index
        index: usize,

        /// New name
        label: Option<String>,
    },
}

pub fn run(opts: &GlobalOpts, args: ChainArgs) -> anyhow::Result<()> {
    let env = Environment::new(opts);
    let command = args.command.unwrap_or(ChainCommand::Show);
    let catalog = match &command {
        ChainCommand::Add { .. } => env.catalog()?,
        _ => env.catalog_or_empty()?,
    };
    let mut session = env.open_session(catalog);
    let separator = env.settings.path_separator.as_str();

    match command {
        ChainCommand::Show => show(session.chain(), separator),
        ChainCommand::Add { device, into } => {
            let device = resolve_device(session.catalog(), &device)?;
            match session.append_device(&device, into)? {
                Some(id) => println!("Added {} as #{id}", device.name),
                None => anyhow::bail!("Branch {} not found in the chain.", describe(into)),
            }
        }
        ChainCommand::Remove { id } => {
            require(session.remove_node(id), || format!("Node #{id} not found."))?;
            println!("Removed #{id}");
        }
        ChainCommand::Rename { id, label } => {
            let label = label.unwrap_or_default();
            require(session.rename_node(id, &label), || format!("Node #{id} not found."))?;
            println!("Renamed #{id}");
        }
        ChainCommand::Split { anchor } => {
            let split = session
                .split_at(anchor)
                .ok_or_else(|| anyhow::anyhow!("Node #{anchor} not found."))?;
            println!("Created split #{split} with branches {split}:0 and {split}:1");
        }
        ChainCommand::Branch { command } => branch(&mut session, command)?,
        ChainCommand::Ports { split } => ports(&session, split)?,
        ChainCommand::Port { split, index, key } => {
            require(session.select_port(split, index, &key), || {
                format!(
                    "Cannot select port '{key}' for branch {split}:{index}. \
                     See 'alc chain ports {split}'."
                )
            })?;
            println!("Branch {split}:{index} now uses {key}");
        }
        ChainCommand::Clear => {
            session.clear();
            println!("Chain cleared.");
        }
        ChainCommand::Latency { all } => {
            if all {
                for path in all_path_totals_with(session.chain(), separator) {
                    let label = if path.label.is_empty() { "(chain)" } else { path.label.as_str() };
                    println!("{label:40} {:>10}", ms(path.latency));
                }
            } else {
                println!("{}", ms(session.total_latency()));
            }
        }
    }
    Ok(())
}

fn branch(session: &mut Session, command: BranchCommand) -> anyhow::Result<()> {
    match command {
        BranchCommand::Add { split } => {
            let index = session
                .add_branch(split)
                .ok_or_else(|| anyhow::anyhow!("Split #{split} not found."))?;
            println!("Added branch {split}:{index}");
        }
        BranchCommand::Remove { split, index } => {
            require(session.remove_branch(split, index), || {
                format!(
                    "Cannot remove branch {split}:{index} (a split keeps at least two branches)."
                )
            })?;
            println!("Removed branch {split}:{index}");
        }
        BranchCommand::Rename { split, index, label } => {
            let label = label.unwrap_or_default();
            require(session.rename_branch(split, index, &label), || {
                format!("Branch {split}:{index} not found.")
            })?;
            println!("Renamed branch {split}:{index}");
        }
    }
    Ok(())
}

fn ports(session: &Session, split: NodeId) -> anyhow::Result<()> {
    let node = session
        .chain()
        .find_split(split)
        .ok_or_else(|| anyhow::anyhow!("Split #{split} not found."))?;
    let ports = session.ports_for_split(split);
    if ports.len() < 2 {
        println!("The device feeding #{split} has a single output configuration.");
        return Ok(());
    }
    for port in &ports {
        let users: Vec<String> = node
            .selected_ports
            .iter()
            .filter(|(_, selected)| selected.key() == port.key())
            .map(|(index, _)| node.branch_name(*index))
            .collect();
        let used = if users.is_empty() {
            String::new()
        } else {
            format!("  <- {}", users.join(", "))
        };
        println!("  {:24} {:>10}{used}", port.key(), ms(port.latency));
    }
    Ok(())
}

fn require(done: bool, message: impl FnOnce() -> String) -> anyhow::Result<()> {
    if done { Ok(()) } else { Err(anyhow::anyhow!(message())) }
}

fn describe(at: Option<BranchRef>) -> String {
    at.map_or_else(|| "(focus)".to_string(), |at| at.to_string())
}

fn show(chain: &Chain, separator: &str) {
    if chain.is_empty() {
        println!("Chain is empty. Add a device with: alc chain add <device>");
        return;
    }
    println!("Signal Chain");
    println!("============");
    print_sequence(chain.nodes(), 1);
    println!();

    let paths = all_path_totals_with(chain, separator);
    if paths.len() > 1 {
        println!("Paths:");
        for path in &paths {
            println!("  {:38} {:>10}", path.label, ms(path.latency));
        }
        println!();
    }
    let total = paths.iter().map(|p| p.latency).fold(0.0, f64::max);
    println!("Total latency: {}", ms(total));
}

fn print_sequence(nodes: &[ChainNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            ChainNode::Device(node) => {
                let nickname = node
                    .nickname
                    .as_ref()
                    .map_or(String::new(), |_| format!(" ({})", node.device.name));
                println!(
                    "{indent}#{} {}{nickname}  {}  {}",
                    node.id,
                    node.display_name(),
                    protocol_summary(&node.device),
                    ms(node.device.latency)
                );
            }
            ChainNode::Split(split) => print_split(split, depth),
        }
    }
}

fn print_split(split: &SplitNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}#{} split", split.id);
    for (index, branch) in split.branches.iter().enumerate() {
        let port = split
            .selected_ports
            .get(&index)
            .map_or(String::new(), |port| format!(" via {}", port.key()));
        println!(
            "{indent}  [{}:{index}] {}{port}  {}",
            split.id,
            split.branch_name(index),
            ms(branch_latency(split, index))
        );
        if branch.is_empty() {
            println!("{indent}      (empty)");
        } else {
            print_sequence(branch, depth + 2);
        }
    }
}
