use anyhow::Result;
use clap::Parser;
use sms_spam_pipeline::cli::Cli;

/// Returning Err from main prints the error chain and exits with status 1
fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
