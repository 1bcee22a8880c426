//! repowiki - Entry Point
//!
//! Binary entry point. Command handling lives in the `repowiki` library
//! crate so it can be exercised from tests.

use clap::Parser;
use repowiki::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
