//! UPDATE_LM: change emissions and distribution end of an existing program.
use super::assets::{asset_address, asset_lib_symbol, supply_borrow_assets, whale_constant};
use super::{
    expected_whale_reward, reward_token_prompt, whale_prompt, BuildError, Collaborators,
    FeatureModule, RewardChoice,
};
use crate::prompts::{address_prompt, amount_prompt, days_prompt, flag_as_required};
use crate::templates;
use crate::types::{CodeArtifact, PoolCache, PoolId, RunOptions};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfig {
    /// Read from the emission manager, not prompted.
    pub emissions_admin: String,
    pub reward_token: String,
    pub reward_token_decimals: u8,
    pub reward_amount: Decimal,
    pub asset: String,
    /// New distribution end, in days from the fork timestamp.
    #[serde(deserialize_with = "super::deserialize_days")]
    pub distribution_end: u32,
    pub whale_address: String,
    pub whale_expected_reward: Decimal,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateLiquidityMining;

impl FeatureModule for UpdateLiquidityMining {
    type Config = UpdateConfig;

    fn collect(
        &self,
        io: &mut Collaborators<'_>,
        pool: PoolId,
        _options: &RunOptions,
        _cache: &PoolCache,
    ) -> Result<UpdateConfig> {
        println!("Fetching information for updating liquidity mining on {pool}");
        let chain = pool.chain()?;

        let (reward_token, reward_token_address) = match reward_token_prompt(
            io,
            pool,
            &flag_as_required("Select the reward asset for the LM:", true),
        )? {
            RewardChoice::Custom => {
                let token = address_prompt(
                    &mut *io.prompter,
                    "Enter the address of the reward asset for which LM should be updated:",
                )?;
                (token.clone(), token)
            }
            RewardChoice::Listed(asset) => (
                asset_lib_symbol(&asset, pool),
                asset_address(io.book, pool, &asset)?,
            ),
        };

        let choices = supply_borrow_assets(io.book, pool)?;
        let picked = io.prompter.select(
            &flag_as_required("Enter the asset for which the LM should be updated:", true),
            &choices,
        )?;
        let asset = choices[picked].clone();

        let distribution_end = days_prompt(
            &mut *io.prompter,
            "Enter the new distribution time in days from the current timestamp:",
        )?;
        let reward_amount = amount_prompt(
            &mut *io.prompter,
            "Enter the new updated reward amount (in token units) for the reward token to be distributed",
        )?;
        let token_address = asset_address(io.book, pool, &asset)?;
        let whale_address = whale_prompt(io, chain, &asset, &token_address)?;
        let whale_expected_reward =
            expected_whale_reward(io.chain, chain, &whale_address, &token_address, reward_amount)?;
        let reward_token_decimals = io.chain.decimals(chain, &reward_token_address)?;

        let emission_manager = io.book.pool(pool)?.emission_manager.clone();
        let emissions_admin =
            io.chain
                .emission_admin(chain, &emission_manager, &reward_token_address)?;
        tracing::info!(%pool, %asset, %emissions_admin, "collected update config");

        Ok(UpdateConfig {
            emissions_admin,
            reward_token,
            reward_token_decimals,
            reward_amount,
            asset,
            distribution_end,
            whale_address,
            whale_expected_reward,
        })
    }

    fn build(
        &self,
        pool: PoolId,
        _options: &RunOptions,
        _cache: &PoolCache,
        cfg: &UpdateConfig,
    ) -> Result<CodeArtifact, BuildError> {
        let decimals = cfg.reward_token_decimals;
        let whale = whale_constant(&cfg.asset);
        let asset = asset_lib_symbol(&cfg.asset, pool);

        let constants = vec![
            format!(
                "address public constant override REWARD_ASSET = {};",
                cfg.reward_token
            ),
            format!(
                "uint256 public constant override NEW_TOTAL_DISTRIBUTION = {} * 10 ** {decimals};",
                cfg.reward_amount
            ),
            format!(
                "address public constant override EMISSION_ADMIN = {};",
                cfg.emissions_admin
            ),
            format!("address public constant override EMISSION_MANAGER = {pool}.EMISSION_MANAGER;"),
            format!(
                "uint256 public constant NEW_DURATION_DISTRIBUTION_END = {} days;",
                cfg.distribution_end
            ),
            format!(
                "address public constant {whale} = {};\n",
                cfg.whale_address
            ),
            format!(
                "address public constant override DEFAULT_INCENTIVES_CONTROLLER = {pool}.DEFAULT_INCENTIVES_CONTROLLER;\n"
            ),
        ];

        let function = templates::UPDATE_FUNCTIONS_SOL
            .replace("{pool}", pool.as_str())
            .replace("{whale}", &whale)
            .replace("{asset}", &asset)
            .replace(
                "{expected_reward}",
                &format!("{} * 10 ** {decimals}", cfg.whale_expected_reward),
            );

        Ok(CodeArtifact {
            constants,
            functions: vec![function],
        })
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
