use anyhow::Context;
use aq_dashboard::cli::{run, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("aq-dashboard failed")
}
