use std::error::Error;

use clap::Parser;
use tracing::{error, info};

mod cmdline;
mod setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing::register();

    let settings = cmdline::Cli::parse().into_settings();

    if let Err(e) = redrive_core::run(&settings).await {
        error!("{e:?}");
        return Err(e.into());
    }
    info!("Exiting...");

    Ok(())
}
