//! Analytics consent command.

use alc_config::{ConsentStatus, Storage, USER_ID_KEY, consent_status, set_consent};
use clap::{Args, Subcommand};

use super::common::{Environment, GlobalOpts};

#[derive(Args)]
pub struct ConsentArgs {
    #[command(subcommand)]
    command: Option<ConsentCommand>,
}

#[derive(Subcommand)]
enum ConsentCommand {
    /// Show the current answer
    Status,

    /// Allow anonymous usage events
    Accept,

    /// Refuse anonymous usage events
    Decline,

    /// Forget the answer so it is asked again
    Reset,
}

pub fn run(opts: &GlobalOpts, args: ConsentArgs) -> anyhow::Result<()> {
    let env = Environment::new(opts);
    let mut storage = env.storage();

    let status = match args.command.unwrap_or(ConsentCommand::Status) {
        ConsentCommand::Status => {
            let status = consent_status(&storage)?;
            println!("Analytics consent: {status}");
            if let Some(id) = storage.get(USER_ID_KEY)? {
                println!("Anonymous id: {}", id.trim());
            }
            if status == ConsentStatus::Unset {
                println!("Answer with: alc consent accept | alc consent decline");
            }
            return Ok(());
        }
        ConsentCommand::Accept => ConsentStatus::Accepted,
        ConsentCommand::Decline => ConsentStatus::Declined,
        ConsentCommand::Reset => ConsentStatus::Unset,
    };
    set_consent(&mut storage, status)?;
    tracing::debug!("consent_set: {status}");
    println!("Analytics consent: {status}");
    Ok(())
}
