mod args;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailprobe_lib::Verifier;

use crate::args::{Cli, Commands};
use crate::output::{OutputRow, any_not_valid, check_format, write_reports};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    check_format(&cli.format)?;

    let emails = if cli.stdin {
        read_stdin()?
    } else if let Some(Commands::Verify { email }) = &cli.cmd {
        vec![email.clone()]
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    let config = cli.verifier_config()?;
    let verifier =
        Verifier::from_system_conf(config).context("initialisation du résolveur DNS")?;
    let options = cli.options();

    let mut rows = Vec::with_capacity(emails.len());
    for email in emails {
        let result = verifier.verify(&email, &options).await;
        rows.push(OutputRow::new(email, result));
    }

    write_reports(&rows, &cli)?;

    // codes de sortie : 0 tout valide, 2 au moins un verdict non valide, 1 fatal
    if any_not_valid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn read_stdin() -> Result<Vec<String>> {
    let mut emails = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            emails.push(trimmed.to_string());
        }
    }
    Ok(emails)
}

#[cfg(feature = "with-tracing")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose { "mailprobe_lib=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // un subscriber déjà installé n'est pas une erreur fatale
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(not(feature = "with-tracing"))]
fn init_tracing(_verbose: bool) {}
