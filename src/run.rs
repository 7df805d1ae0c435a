//! Run orchestration: resolve options, collect or replay configs, build, write.
//!
//! One [`RunContext`] is threaded through every stage. It is the only mutable
//! state of a run; feature modules receive copies of what they need and never
//! see it.
use crate::address_book::AddressBook;
use crate::config_source;
use crate::features::{Collaborators, FeatureModule, SetupLiquidityMining, UpdateLiquidityMining};
use crate::format::Formatter;
use crate::generator::{generate_files, write_files, WriteStatus};
use crate::naming::{date_stamp, is_date_stamp, short_name, validate_title};
use crate::prompts::Prompter;
use crate::types::{ConfigFile, Feature, LookupError, PoolCache, PoolConfig, PoolConfigs, RunOptions};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-invocation settings that never come from a persisted config.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub force: bool,
    pub config_file: Option<PathBuf>,
    pub title: Option<String>,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub options: RunOptions,
    #[serde(rename = "poolConfigs")]
    pub pools: PoolConfigs,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub context: RunContext,
    pub source: String,
    /// `None` when the user declined to reuse an existing output folder.
    pub writes: Option<Vec<(PathBuf, WriteStatus)>>,
}

pub fn run(
    settings: &RunSettings,
    io: &mut Collaborators<'_>,
    formatter: &Formatter,
) -> Result<RunOutcome> {
    let mut context = match &settings.config_file {
        Some(path) => replay_context(load_config_file(path)?, settings)
            .with_context(|| format!("replay config file {}", path.display()))?,
        None => RunContext {
            options: prompt_options(&mut *io.prompter, settings, io.book)?,
            pools: PoolConfigs::new(),
        },
    };
    tracing::info!(
        feature = %context.options.feature,
        pool = %context.options.pool,
        replay = settings.config_file.is_some(),
        "resolved run options"
    );

    match drive(&mut context, settings, io, formatter) {
        Ok((source, writes)) => Ok(RunOutcome {
            context,
            source,
            writes,
        }),
        Err(err) => Err(with_state_dump(err, dump_state(&context))),
    }
}

fn drive(
    context: &mut RunContext,
    settings: &RunSettings,
    io: &mut Collaborators<'_>,
    formatter: &Formatter,
) -> Result<(String, Option<Vec<(PathBuf, WriteStatus)>>)> {
    if settings.config_file.is_none() {
        snapshot_cache(context, io)?;
        collect_feature(context, io)?;
    }
    build_feature(context)?;

    let files = generate_files(&context.options, &context.pools, formatter)?;
    let writes = write_files(&context.options, &files, &settings.out_dir, &mut *io.prompter)?;
    Ok((files.payload.source, writes))
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let config = config_source::parse(&text)
        .with_context(|| format!("parse config file {}", path.display()))?;
    if !is_date_stamp(&config.root_options.date) {
        return Err(anyhow!(
            "config file {} has date {:?}, expected YYYYMMDD",
            path.display(),
            config.root_options.date
        ));
    }
    Ok(config)
}

/// Replay state: stored options and configs, CLI run flags, no artifacts yet.
///
/// The stored title must still pass title validation, and the short name is
/// always re-derived from it.
pub fn replay_context(config: ConfigFile, settings: &RunSettings) -> Result<RunContext> {
    let stored = config.root_options;
    validate_title(&stored.title)
        .map_err(|reason| anyhow!("stored title {:?}: {reason}", stored.title))?;
    let derived = short_name(&stored.title);
    if derived != stored.short_name {
        tracing::warn!(
            stored = %stored.short_name,
            derived = %derived,
            "stored shortName does not match its title, using the derived one"
        );
    }
    let options = RunOptions {
        force: settings.force,
        config_file: settings.config_file.clone(),
        short_name: derived,
        ..stored
    };
    let pools = config
        .pool_options
        .into_iter()
        .map(|(pool, persisted)| {
            (
                pool,
                PoolConfig {
                    configs: persisted.configs,
                    artifacts: Vec::new(),
                    cache: persisted.cache,
                },
            )
        })
        .collect();
    Ok(RunContext { options, pools })
}

/// Ask for feature, pool, and title. Only pools the address book lists are offered.
pub fn prompt_options(
    prompter: &mut dyn Prompter,
    settings: &RunSettings,
    book: &AddressBook,
) -> Result<RunOptions> {
    let features: Vec<String> = Feature::ALL
        .iter()
        .map(|feature| feature.description().to_string())
        .collect();
    let feature = Feature::ALL[prompter.select(
        "Do you wish to setup a new liquidity mining or update an existing one?",
        &features,
    )?];

    let offered = book.pools();
    if offered.is_empty() {
        return Err(anyhow!("the address book lists none of the supported pools"));
    }
    let pools: Vec<String> = offered.iter().map(|pool| pool.to_string()).collect();
    let pool = offered[prompter.select("Select the Aave Pool:", &pools)?];

    let title = match &settings.title {
        Some(title) => {
            validate_title(title).map_err(|reason| anyhow!("invalid --title: {reason}"))?;
            title.clone()
        }
        None => prompter.input(
            "Short title of the liquidity mining program",
            &validate_title,
        )?,
    };

    Ok(RunOptions {
        feature,
        pool,
        short_name: short_name(&title),
        title,
        date: date_stamp(),
        force: settings.force,
        config_file: None,
    })
}

/// Pin the fork block for the selected pool.
pub fn snapshot_cache(context: &mut RunContext, io: &Collaborators<'_>) -> Result<()> {
    let pool = context.options.pool;
    let chain = pool.chain()?;
    let block_number = io
        .chain
        .block_number(chain)
        .with_context(|| format!("fetch block number for {chain}"))?;
    tracing::debug!(%pool, block_number, "pinned fork block");
    context
        .pools
        .insert(pool, PoolConfig::new(PoolCache { block_number }));
    Ok(())
}

fn pool_entry(context: &mut RunContext) -> Result<(&RunOptions, &mut PoolConfig), LookupError> {
    let pool = context.options.pool;
    let entry = context
        .pools
        .get_mut(&pool)
        .ok_or_else(|| LookupError::MissingPool(pool.to_string()))?;
    Ok((&context.options, entry))
}

pub fn collect_feature(context: &mut RunContext, io: &mut Collaborators<'_>) -> Result<()> {
    let (options, entry) = pool_entry(context)?;
    let pool = options.pool;
    match options.feature {
        Feature::SetupLm => {
            let cfg = SetupLiquidityMining.collect(io, pool, options, &entry.cache)?;
            entry.configs.setup = Some(cfg);
        }
        Feature::UpdateLm => {
            let cfg = UpdateLiquidityMining.collect(io, pool, options, &entry.cache)?;
            entry.configs.update = Some(cfg);
        }
    }
    Ok(())
}

/// Rebuild the selected feature's artifact from its stored config.
pub fn build_feature(context: &mut RunContext) -> Result<()> {
    let (options, entry) = pool_entry(context)?;
    let pool = options.pool;
    let missing = || LookupError::MissingFeatureConfig {
        pool: pool.to_string(),
        feature: options.feature,
    };
    let artifact = match options.feature {
        Feature::SetupLm => {
            let cfg = entry.configs.setup.as_ref().ok_or_else(missing)?;
            SetupLiquidityMining.build(pool, options, &entry.cache, cfg)?
        }
        Feature::UpdateLm => {
            let cfg = entry.configs.update.as_ref().ok_or_else(missing)?;
            UpdateLiquidityMining.build(pool, options, &entry.cache, cfg)?
        }
    };
    entry.artifacts = vec![artifact];
    Ok(())
}

pub fn dump_state(context: &RunContext) -> Result<String> {
    serde_json::to_string_pretty(context).context("serialize run state")
}

/// Print the state dump for a failed run; the run's own error is always the one returned.
fn with_state_dump(err: anyhow::Error, dump: Result<String>) -> anyhow::Error {
    match dump {
        Ok(state) => println!("{state}"),
        Err(dump_err) => tracing::error!(error = %format!("{dump_err:#}"), "could not dump run state"),
    }
    err
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
