//! Catalog browsing commands.

use alc_core::{BranchRef, LibraryQuery, SortOrder};
use clap::Args;

use super::common::{Environment, GlobalOpts, ms, protocol_summary};

#[derive(Args)]
pub struct DevicesArgs {
    /// Match against name and protocols (case-insensitive)
    #[arg(short, long, default_value = "")]
    search: String,

    /// Only show devices of this brand
    #[arg(short, long)]
    brand: Option<String>,

    /// popularity, name-asc, name-desc, latency-asc or latency-desc
    #[arg(long, default_value = "popularity")]
    sort: SortOrder,

    /// Rank against the end of this branch (SPLIT:IDX) instead of the root
    #[arg(long, value_name = "SPLIT:IDX")]
    into: Option<BranchRef>,

    /// Show documentation links
    #[arg(long)]
    sources: bool,
}

pub fn run(opts: &GlobalOpts, args: DevicesArgs) -> anyhow::Result<()> {
    let env = Environment::new(opts);
    let mut session = env.open_session(env.catalog()?);
    if let Some(at) = args.into
        && !session.set_focus(Some(at))
    {
        anyhow::bail!("Branch {at} not found in the chain.");
    }
    let sources = if args.sources { Some(env.sources()) } else { None };

    let query = LibraryQuery {
        search: args.search,
        brand: args.brand,
        sort: args.sort,
    };
    let entries = session.library(&query);
    if entries.is_empty() {
        println!("No matching devices.");
        return Ok(());
    }

    match session.context_device() {
        Some(context) => println!(
            "Ranked against: {} ({})\n",
            context.name,
            protocol_summary(&context)
        ),
        None => println!("Devices\n=======\n"),
    }

    for entry in &entries {
        let device = entry.device;
        let marker = match &entry.compatibility {
            Ok(()) => String::new(),
            Err(rejection) => format!("  [incompatible: {}]", rejection.reason),
        };
        println!(
            "  {:>4}  {:30} {:12} {:28} {:>9}{}",
            device.id,
            device.name,
            device.brand,
            protocol_summary(device),
            ms(device.latency),
            marker
        );
        if let Some(sources) = &sources
            && let Some(url) = sources.url_for(device.source.as_deref())
        {
            println!("        source: {url}");
        }
    }

    let compatible = entries.iter().filter(|e| e.is_compatible()).count();
    println!();
    println!("Total: {} device(s), {} compatible", entries.len(), compatible);
    Ok(())
}

pub fn brands(opts: &GlobalOpts) -> anyhow::Result<()> {
    let env = Environment::new(opts);
    let catalog = env.catalog()?;
    let brands = catalog.brands();
    if brands.is_empty() {
        println!("No brands in catalog.");
        return Ok(());
    }
    for brand in brands {
        println!("{brand}");
    }
    Ok(())
}
