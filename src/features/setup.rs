//! SETUP_LM: configure a brand new incentive program on a set of reserve tokens.
use super::assets::{
    asset_address, asset_lib_symbol, oracle_lib_symbol, split_asset, supply_borrow_assets,
    whale_constant,
};
use super::{
    expected_whale_reward, reward_token_prompt, whale_prompt, BuildError, Collaborators,
    FeatureModule, RewardChoice,
};
use crate::prompts::{address_prompt, amount_prompt, days_prompt, flag_as_required};
use crate::templates;
use crate::types::{CodeArtifact, PoolCache, PoolId, RunOptions};
use crate::util::sum_amounts;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything needed to render a SETUP test.
///
/// `assets`, `reward_amounts`, `whale_addresses`, and `whale_expected_rewards`
/// are index-aligned, and `total_reward` is the sum of `reward_amounts`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    pub emissions_admin: String,
    /// Either a raw `0x` address or an address-book symbol.
    pub reward_token: String,
    pub reward_token_decimals: u8,
    pub reward_oracle: String,
    pub assets: Vec<String>,
    /// Distribution length in days.
    #[serde(deserialize_with = "super::deserialize_days")]
    pub distribution_end: u32,
    pub transfer_strategy: String,
    pub reward_amounts: Vec<Decimal>,
    pub total_reward: Decimal,
    pub whale_addresses: Vec<String>,
    pub whale_expected_rewards: Vec<Decimal>,
}

impl SetupConfig {
    /// Check the per-asset lists line up and the total matches their sum.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.assets.is_empty() {
            return Err(BuildError::NoAssets);
        }
        let assets = self.assets.len();
        if self.reward_amounts.len() != assets
            || self.whale_addresses.len() != assets
            || self.whale_expected_rewards.len() != assets
        {
            return Err(BuildError::MisalignedAssets {
                assets,
                amounts: self.reward_amounts.len(),
                whales: self.whale_addresses.len(),
                expected: self.whale_expected_rewards.len(),
            });
        }
        let sum = sum_amounts(&self.reward_amounts);
        if sum != self.total_reward {
            return Err(BuildError::TotalMismatch {
                total: self.total_reward,
                sum,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SetupLiquidityMining;

impl FeatureModule for SetupLiquidityMining {
    type Config = SetupConfig;

    fn collect(
        &self,
        io: &mut Collaborators<'_>,
        pool: PoolId,
        _options: &RunOptions,
        _cache: &PoolCache,
    ) -> Result<SetupConfig> {
        println!("Fetching information for setting new liquidity mining on {pool}");
        let chain = pool.chain()?;

        let (reward_token, reward_oracle, reward_token_address) = match reward_token_prompt(
            io,
            pool,
            &flag_as_required("Select the reward asset for the LM:", true),
        )? {
            RewardChoice::Custom => {
                let token = address_prompt(&mut *io.prompter, "Enter the address of the reward asset:")?;
                let oracle =
                    address_prompt(&mut *io.prompter, "Enter the address of the reward oracle:")?;
                (token.clone(), oracle, token)
            }
            RewardChoice::Listed(asset) => {
                let (underlying, _) = split_asset(&asset);
                let oracle = if io.book.asset(pool, underlying)?.oracle.is_some() {
                    oracle_lib_symbol(&asset, pool)
                } else {
                    tracing::warn!(%pool, underlying, "address book has no oracle for reward asset");
                    address_prompt(&mut *io.prompter, "Enter the address of the reward oracle:")?
                };
                (
                    asset_lib_symbol(&asset, pool),
                    oracle,
                    asset_address(io.book, pool, &asset)?,
                )
            }
        };

        let emissions_admin =
            address_prompt(&mut *io.prompter, "Enter the address of the emissionsAdmin:")?;
        let distribution_end = days_prompt(
            &mut *io.prompter,
            "Enter the total distribution time for the LM in days:",
        )?;
        let transfer_strategy = address_prompt(
            &mut *io.prompter,
            "Enter the address of the transfer strategy contract deployed:",
        )?;

        let choices = supply_borrow_assets(io.book, pool)?;
        let picked = io.prompter.multi_select(
            &flag_as_required("Enter the assets for which the LM should be configured:", true),
            &choices,
        )?;
        let assets: Vec<String> = picked.into_iter().map(|ix| choices[ix].clone()).collect();

        let reward_token_decimals = io.chain.decimals(chain, &reward_token_address)?;

        let mut reward_amounts = Vec::with_capacity(assets.len());
        let mut whale_addresses = Vec::with_capacity(assets.len());
        let mut whale_expected_rewards = Vec::with_capacity(assets.len());
        for asset in &assets {
            let reward_amount = amount_prompt(
                &mut *io.prompter,
                &format!(
                    "Enter the reward amount (in token units) for the reward token to be distributed for {asset}"
                ),
            )?;
            let token_address = asset_address(io.book, pool, asset)?;
            let whale = whale_prompt(io, chain, asset, &token_address)?;
            let expected =
                expected_whale_reward(io.chain, chain, &whale, &token_address, reward_amount)?;
            reward_amounts.push(reward_amount);
            whale_addresses.push(whale);
            whale_expected_rewards.push(expected);
        }

        let total_reward = sum_amounts(&reward_amounts);
        tracing::info!(%pool, assets = assets.len(), %total_reward, "collected setup config");
        Ok(SetupConfig {
            emissions_admin,
            reward_token,
            reward_token_decimals,
            reward_oracle,
            assets,
            distribution_end,
            transfer_strategy,
            reward_amounts,
            total_reward,
            whale_addresses,
            whale_expected_rewards,
        })
    }

    fn build(
        &self,
        pool: PoolId,
        _options: &RunOptions,
        _cache: &PoolCache,
        cfg: &SetupConfig,
    ) -> Result<CodeArtifact, BuildError> {
        cfg.validate()?;
        let decimals = cfg.reward_token_decimals;

        let mut constants = vec![
            format!(
                "address public constant override REWARD_ASSET = {};",
                cfg.reward_token
            ),
            format!(
                "uint88 constant DURATION_DISTRIBUTION = {} days;",
                cfg.distribution_end
            ),
            format!(
                "uint256 public constant override TOTAL_DISTRIBUTION = {} * 10 ** {decimals};",
                cfg.total_reward
            ),
            format!("address constant EMISSION_ADMIN = {};\n", cfg.emissions_admin),
            format!(
                "address public constant override DEFAULT_INCENTIVES_CONTROLLER = {pool}.DEFAULT_INCENTIVES_CONTROLLER;\n"
            ),
            format!(
                "ITransferStrategyBase public constant override TRANSFER_STRATEGY = ITransferStrategyBase({});\n",
                cfg.transfer_strategy
            ),
            format!(
                "IEACAggregatorProxy public constant override REWARD_ORACLE = IEACAggregatorProxy({});\n",
                cfg.reward_oracle
            ),
        ];
        constants.extend(cfg.assets.iter().zip(&cfg.whale_addresses).map(|(asset, whale)| {
            format!("address constant {} = {whale};", whale_constant(asset))
        }));

        let whale_claims = cfg
            .assets
            .iter()
            .zip(&cfg.whale_expected_rewards)
            .map(|(asset, expected)| {
                format!(
                    "\n  _testClaimRewardsForWhale(\n    {},\n    {},\n    DURATION_DISTRIBUTION,\n    {expected} * 10 ** {decimals}\n  );",
                    whale_constant(asset),
                    asset_lib_symbol(asset, pool),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let emissions = cfg
            .assets
            .iter()
            .zip(&cfg.reward_amounts)
            .enumerate()
            .map(|(ix, (asset, amount))| {
                format!(
                    "\n  emissionsPerAsset[{ix}] = EmissionPerAsset({{\n    asset: {},\n    emission: {amount} * 10 ** {decimals}\n  }});",
                    asset_lib_symbol(asset, pool),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let function = templates::SETUP_FUNCTIONS_SOL
            .replace("{pool}", pool.as_str())
            .replace("{asset_count}", &cfg.assets.len().to_string())
            .replace("{whale_claims}", &whale_claims)
            .replace("{emissions}", &emissions);

        Ok(CodeArtifact {
            constants,
            functions: vec![function],
        })
    }
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
