//! Generated file contents and the confirm-before-overwrite write flow.
use crate::assemble::render_contract;
use crate::config_source;
use crate::format::Formatter;
use crate::naming::{contract_name, folder_name};
use crate::prompts::Prompter;
use crate::types::{ConfigFile, LookupError, PoolConfigs, PoolId, RunOptions};
use crate::util::display_path;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.ts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub pool: PoolId,
    pub contract_name: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub config_source: String,
    pub payload: Payload,
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
    Declined,
}

pub fn generate_files(
    options: &RunOptions,
    pools: &PoolConfigs,
    formatter: &Formatter,
) -> Result<GeneratedFiles> {
    let config_source = config_source::render(&ConfigFile::from_pools(options, pools))?;

    let pool = options.pool;
    let pool_config = pools
        .get(&pool)
        .ok_or_else(|| LookupError::MissingPool(pool.to_string()))?;
    let rendered = render_contract(options, pool_config, pool)?;
    let source = formatter.format(&rendered)?;

    Ok(GeneratedFiles {
        config_source,
        payload: Payload {
            pool,
            contract_name: contract_name(options, Some(pool)),
            source,
        },
    })
}

/// Folder a run writes into.
pub fn output_folder(options: &RunOptions, out_dir: &Path) -> PathBuf {
    out_dir.join(folder_name(options))
}

/// Write the config and the payload test into the run folder.
///
/// The two writes are gated independently; declining one does not undo the other.
/// Returns `None` when the user declined to reuse an existing folder.
pub fn write_files(
    options: &RunOptions,
    files: &GeneratedFiles,
    out_dir: &Path,
    prompter: &mut dyn Prompter,
) -> Result<Option<Vec<(PathBuf, WriteStatus)>>> {
    let folder = output_folder(options, out_dir);
    if folder.exists() {
        if !options.force
            && !prompter.confirm(
                "A proposal already exists at that location, do you want to continue?",
                false,
            )?
        {
            tracing::info!(folder = %folder.display(), "kept existing folder untouched");
            return Ok(None);
        }
    } else {
        fs::create_dir_all(&folder).with_context(|| format!("create {}", folder.display()))?;
    }

    let config_path = folder.join(CONFIG_FILE_NAME);
    let payload_path = folder.join(format!("{}.t.sol", files.payload.contract_name));
    let statuses = vec![
        (
            config_path.clone(),
            ask_before_write(options.force, &config_path, &files.config_source, prompter)?,
        ),
        (
            payload_path.clone(),
            ask_before_write(options.force, &payload_path, &files.payload.source, prompter)?,
        ),
    ];
    Ok(Some(statuses))
}

fn ask_before_write(
    force: bool,
    path: &Path,
    content: &str,
    prompter: &mut dyn Prompter,
) -> Result<WriteStatus> {
    if path.exists() {
        let current =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        if current == content {
            return Ok(WriteStatus::Unchanged);
        }
        if !force {
            let message = format!(
                "A file already exists at {} do you want to overwrite",
                path.display()
            );
            if !prompter.confirm(&message, false)? {
                return Ok(WriteStatus::Declined);
            }
        }
    }
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(WriteStatus::Written)
}

/// Print one line per output file, relative to `base` when possible.
pub fn report_writes(statuses: &[(PathBuf, WriteStatus)], base: Option<&Path>) {
    for (path, status) in statuses {
        let label = match status {
            WriteStatus::Written => "wrote",
            WriteStatus::Unchanged => "unchanged",
            WriteStatus::Declined => "skipped",
        };
        println!("{label}: {}", display_path(path, base));
    }
}
