//! Fixtures shared by feature, template, and orchestrator tests.
use super::{SetupConfig, UpdateConfig};
use crate::chain::ChainReader;
use crate::types::{Chain, Feature, PoolCache, PoolId, RunOptions};
use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::str::FromStr;

pub const POOL: PoolId = PoolId::AaveV3EthereumLido;
pub const CACHE: PoolCache = PoolCache { block_number: 42 };
pub const WHALE: &str = "0x07833EAdF87CD3079da281395f2fBA24b61F90f7";
pub const ADMIN: &str = "0xac140648435d03f784879cd789130F22Ef588Fcd";
pub const TRANSFER_STRATEGY: &str = "0x0605a898535E9116Ff820347c536E3442F216Eb8";

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

pub fn options(feature: Feature) -> RunOptions {
    RunOptions {
        feature,
        pool: POOL,
        title: "test".to_string(),
        short_name: "Test".to_string(),
        date: "20231023".to_string(),
        force: false,
        config_file: None,
    }
}

pub fn setup_config() -> SetupConfig {
    SetupConfig {
        emissions_admin: ADMIN.to_string(),
        reward_token: "AaveV3EthereumLidoAssets.wstETH_A_TOKEN".to_string(),
        reward_token_decimals: 18,
        reward_oracle: "AaveV3EthereumLidoAssets.wstETH_ORACLE".to_string(),
        assets: vec!["wstETH_aToken".to_string()],
        distribution_end: 14,
        transfer_strategy: TRANSFER_STRATEGY.to_string(),
        reward_amounts: vec![dec("100")],
        total_reward: dec("100"),
        whale_addresses: vec![WHALE.to_string()],
        whale_expected_rewards: vec![dec("21.6")],
    }
}

pub fn update_config() -> UpdateConfig {
    UpdateConfig {
        emissions_admin: ADMIN.to_string(),
        reward_token: "AaveV3EthereumLidoAssets.wstETH_A_TOKEN".to_string(),
        reward_token_decimals: 18,
        asset: "wstETH_aToken".to_string(),
        distribution_end: 20,
        reward_amount: dec("150"),
        whale_address: WHALE.to_string(),
        whale_expected_reward: dec("32.4"),
    }
}

/// Chain reader answering from fixed values and recording every call.
#[derive(Debug)]
pub struct FakeChain {
    pub block_number: u64,
    pub decimals: u8,
    pub total_supply: U256,
    pub balance: U256,
    pub emission_admin: String,
    pub calls: RefCell<Vec<String>>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self {
            block_number: CACHE.block_number,
            decimals: 18,
            total_supply: U256::from(1_000u64),
            balance: U256::from(216u64),
            emission_admin: ADMIN.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeChain {
    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl ChainReader for FakeChain {
    fn block_number(&self, chain: Chain) -> Result<u64> {
        self.record(format!("block_number:{chain}"));
        Ok(self.block_number)
    }

    fn decimals(&self, _chain: Chain, token: &str) -> Result<u8> {
        self.record(format!("decimals:{token}"));
        Ok(self.decimals)
    }

    fn total_supply(&self, _chain: Chain, token: &str) -> Result<U256> {
        self.record(format!("total_supply:{token}"));
        Ok(self.total_supply)
    }

    fn balance_of(&self, _chain: Chain, token: &str, holder: &str) -> Result<U256> {
        self.record(format!("balance_of:{token}:{holder}"));
        Ok(self.balance)
    }

    fn emission_admin(&self, _chain: Chain, emission_manager: &str, reward: &str) -> Result<String> {
        self.record(format!("emission_admin:{emission_manager}:{reward}"));
        Ok(self.emission_admin.clone())
    }
}

/// Chain reader whose every call fails, to prove a code path stays offline.
#[derive(Debug, Default)]
pub struct OfflineChain;

impl ChainReader for OfflineChain {
    fn block_number(&self, chain: Chain) -> Result<u64> {
        Err(anyhow!("offline: block_number on {chain}"))
    }

    fn decimals(&self, _chain: Chain, token: &str) -> Result<u8> {
        Err(anyhow!("offline: decimals of {token}"))
    }

    fn total_supply(&self, _chain: Chain, token: &str) -> Result<U256> {
        Err(anyhow!("offline: totalSupply of {token}"))
    }

    fn balance_of(&self, _chain: Chain, token: &str, _holder: &str) -> Result<U256> {
        Err(anyhow!("offline: balanceOf on {token}"))
    }

    fn emission_admin(&self, _chain: Chain, emission_manager: &str, _reward: &str) -> Result<String> {
        Err(anyhow!("offline: getEmissionAdmin on {emission_manager}"))
    }
}
