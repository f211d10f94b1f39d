//! `stationery` binary.

use anyhow::Result;
use clap::Parser;
use stationery_cli::{CliArgs, StationeryCli};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let cli = StationeryCli::from_args("stationery", &args)?;
    cli.run(args).await?;
    Ok(())
}
