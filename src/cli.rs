//! CLI argument parsing.
//!
//! Without `--config-file` the generator prompts for everything; with it, the
//! stored config is replayed and no prompt or chain call is made unless an
//! existing file needs an overwrite confirmation.
use crate::types::Chain;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_OUT_DIR: &str = "tests";
pub const LOG_ENV: &str = "LMGEN_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "lmgen",
    version,
    about = "Generate liquidity-mining governance test contracts",
    after_help = "Environment:\n  LMGEN_RPC_<CHAIN>     RPC endpoint per chain (e.g. LMGEN_RPC_ETHEREUM)\n  LMGEN_ADDRESS_BOOK    Address book JSON used instead of the bundled one\n  LMGEN_FORMATTER       Formatter command (default: forge fmt --raw -; 'none' disables)\n  LMGEN_LOG             Log filter (default: warn)\n\nExamples:\n  lmgen\n  lmgen --title 'wstETH rewards' --rpc-url ethereum=http://localhost:8545\n  lmgen --config-file tests/20231023_LMSetupAaveV3EthereumLido_Test/config.ts --force"
)]
pub struct RootArgs {
    /// Overwrite existing files without asking
    #[arg(short, long)]
    pub force: bool,

    /// Replay a previously written config.ts (or JSON config) instead of prompting
    #[arg(short = 'c', long, alias = "configFile", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Program title; skips the title prompt
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// RPC endpoint override for one chain (repeatable)
    #[arg(long = "rpc-url", value_name = "CHAIN=URL", value_parser = parse_rpc_override)]
    pub rpc_urls: Vec<(Chain, String)>,

    /// Address book JSON file
    #[arg(long, value_name = "PATH")]
    pub address_book: Option<PathBuf>,

    /// Formatter command reading stdin and writing stdout ('none' disables)
    #[arg(long, value_name = "CMD")]
    pub formatter: Option<String>,

    /// Directory receiving the generated proposal folder
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Log debug events to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_rpc_override(raw: &str) -> Result<(Chain, String), String> {
    let (chain, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CHAIN=URL, got {raw:?}"))?;
    let chain: Chain = chain.trim().parse().map_err(|err| format!("{err}"))?;
    let url = url.trim();
    if url.is_empty() {
        return Err(format!("empty RPC url for {chain}"));
    }
    Ok((chain, url.to_string()))
}
