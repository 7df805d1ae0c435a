//! Feature modules: one per supported governance operation.
//!
//! Each module has two halves. `collect` talks to the user and the chain and
//! returns a typed config; `build` turns that config into a [`CodeArtifact`]
//! and must stay pure, because replay depends on rebuilding byte-identical
//! code from a stored config.
pub mod assets;
mod setup;
mod update;

#[cfg(test)]
pub(crate) mod mocks;

pub use setup::{SetupConfig, SetupLiquidityMining};
pub use update::{UpdateConfig, UpdateLiquidityMining};

use crate::address_book::AddressBook;
use crate::chain::ChainReader;
use crate::prompts::Prompter;
use crate::types::{Chain, CodeArtifact, PoolCache, PoolId, RunOptions};
use crate::util::whale_share;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A config that cannot be rendered into consistent code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("at least one asset is required")]
    NoAssets,
    #[error(
        "per-asset lists are misaligned: {assets} assets, {amounts} amounts, {whales} whales, {expected} expected rewards"
    )]
    MisalignedAssets {
        assets: usize,
        amounts: usize,
        whales: usize,
        expected: usize,
    },
    #[error("total reward {total} does not equal the sum of per-asset amounts {sum}")]
    TotalMismatch { total: Decimal, sum: Decimal },
}

/// Capabilities handed to `collect`. Feature modules never see the run state.
pub struct Collaborators<'a> {
    pub prompter: &'a mut dyn Prompter,
    pub chain: &'a dyn ChainReader,
    pub book: &'a AddressBook,
}

pub trait FeatureModule {
    type Config;

    fn collect(
        &self,
        io: &mut Collaborators<'_>,
        pool: PoolId,
        options: &RunOptions,
        cache: &PoolCache,
    ) -> Result<Self::Config>;

    fn build(
        &self,
        pool: PoolId,
        options: &RunOptions,
        cache: &PoolCache,
        cfg: &Self::Config,
    ) -> Result<CodeArtifact, BuildError>;
}

/// Day counts may be stored as numbers or as numeric strings.
fn deserialize_days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Days {
        Number(u32),
        Text(String),
    }
    match Days::deserialize(deserializer)? {
        Days::Number(days) => Ok(days),
        Days::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("{text:?} is not a day count"))),
    }
}

const CUSTOM_ADDRESS_CHOICE: &str = "Custom Address (Enter Manually)";

/// Reward token as chosen in the prompt.
enum RewardChoice {
    Custom,
    Listed(String),
}

/// Offer a custom address, every underlying, and every supply token as reward.
fn reward_token_prompt(
    io: &mut Collaborators<'_>,
    pool: PoolId,
    message: &str,
) -> Result<RewardChoice> {
    let mut items = vec![CUSTOM_ADDRESS_CHOICE.to_string()];
    items.extend(io.book.assets(pool)?);
    items.extend(assets::supply_assets(io.book, pool)?);
    let picked = io.prompter.select(message, &items)?;
    Ok(if picked == 0 {
        RewardChoice::Custom
    } else {
        RewardChoice::Listed(items[picked].clone())
    })
}

/// Ask for a whale holding `asset`, pointing the user at the holder list.
fn whale_prompt(
    io: &mut Collaborators<'_>,
    chain: Chain,
    asset: &str,
    asset_address: &str,
) -> Result<String> {
    let message = format!(
        "Enter the whale address to test rewards for {asset} from {} ",
        chain.token_holders_link(asset_address)
    );
    crate::prompts::address_prompt(&mut *io.prompter, &message)
}

/// Advisory share of `reward_amount` the whale would receive; test data only.
pub fn expected_whale_reward(
    reader: &dyn ChainReader,
    chain: Chain,
    whale: &str,
    asset_address: &str,
    reward_amount: Decimal,
) -> Result<Decimal> {
    let total_supply = reader.total_supply(chain, asset_address)?;
    let balance = reader.balance_of(chain, asset_address, whale)?;
    let share = whale_share(balance, total_supply, reward_amount);
    tracing::debug!(
        %chain,
        whale,
        asset = asset_address,
        balance = %balance,
        total_supply = %total_supply,
        %share,
        "computed expected whale reward"
    );
    Ok(share)
}
