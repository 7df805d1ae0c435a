use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

mod address_book;
mod assemble;
mod chain;
mod cli;
mod config_source;
mod features;
mod format;
mod generator;
mod imports;
mod naming;
mod prompts;
mod run;
mod templates;
mod types;
mod util;

use address_book::AddressBook;
use chain::RpcChainReader;
use cli::{RootArgs, LOG_ENV};
use features::Collaborators;
use format::Formatter;
use generator::report_writes;
use prompts::TerminalPrompter;
use run::RunSettings;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_logging(args.verbose);

    let book = AddressBook::resolve(args.address_book.as_deref())?;
    let formatter = Formatter::resolve(args.formatter.as_deref())?;
    let chain = RpcChainReader::new(args.rpc_urls.iter().cloned().collect::<BTreeMap<_, _>>());
    let mut prompter = TerminalPrompter;
    let mut io = Collaborators {
        prompter: &mut prompter,
        chain: &chain,
        book: &book,
    };

    let settings = RunSettings {
        force: args.force,
        config_file: args.config_file,
        title: args.title,
        out_dir: args.out_dir,
    };
    let outcome = run::run(&settings, &mut io, &formatter)?;
    match &outcome.writes {
        Some(statuses) => report_writes(statuses, std::env::current_dir().ok().as_deref()),
        None => println!("Left the existing proposal untouched"),
    }
    tracing::debug!(
        pool = %outcome.context.options.pool,
        source_bytes = outcome.source.len(),
        "generation finished"
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
