//! Run-scoped data model shared by every pipeline stage.
//!
//! Everything here is plain data: feature modules read it, the orchestrator
//! owns it, and the persisted config is a projection of it.
use crate::features::{SetupConfig, UpdateConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Failures resolving an identifier against static data (pools, chains, address book).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown pool {0}")]
    UnknownPool(String),
    #[error("cannot find chain for pool {0}")]
    UnknownChain(String),
    #[error("pool {0} is missing from the address book")]
    PoolNotInAddressBook(String),
    #[error("asset {asset} is not listed for pool {pool}")]
    UnknownAsset { pool: String, asset: String },
    #[error("no {feature} config stored for pool {pool}")]
    MissingFeatureConfig { pool: String, feature: Feature },
    #[error("no pool entry stored for {0}")]
    MissingPool(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    #[serde(rename = "SETUP_LM")]
    SetupLm,
    #[serde(rename = "UPDATE_LM")]
    UpdateLm,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::SetupLm, Feature::UpdateLm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::SetupLm => "SETUP_LM",
            Feature::UpdateLm => "UPDATE_LM",
        }
    }

    /// Human label shown in the feature selection prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Feature::SetupLm => "Setup new liquidity mining",
            Feature::UpdateLm => "Updating existing liquidity mining",
        }
    }

    /// Infix used by contract and folder names.
    pub fn name_tag(&self) -> &'static str {
        match self {
            Feature::SetupLm => "LMSetup",
            Feature::UpdateLm => "LMUpdate",
        }
    }

    /// Base test contract the generated contract inherits from.
    pub fn base_test(&self) -> &'static str {
        match self {
            Feature::SetupLm => "LMSetupBaseTest",
            Feature::UpdateLm => "LMUpdateBaseTest",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolId {
    AaveV3Ethereum,
    AaveV3EthereumLido,
    AaveV3EthereumEtherFi,
    AaveV3Polygon,
    AaveV3Avalanche,
    AaveV3Optimism,
    AaveV3Arbitrum,
    AaveV3Metis,
    AaveV3Base,
    AaveV3Gnosis,
    AaveV3Scroll,
    AaveV3BNB,
    AaveV3ZkSync,
}

impl PoolId {
    pub const ALL: [PoolId; 13] = [
        PoolId::AaveV3Ethereum,
        PoolId::AaveV3EthereumLido,
        PoolId::AaveV3EthereumEtherFi,
        PoolId::AaveV3Polygon,
        PoolId::AaveV3Avalanche,
        PoolId::AaveV3Optimism,
        PoolId::AaveV3Arbitrum,
        PoolId::AaveV3Metis,
        PoolId::AaveV3Base,
        PoolId::AaveV3Gnosis,
        PoolId::AaveV3Scroll,
        PoolId::AaveV3BNB,
        PoolId::AaveV3ZkSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolId::AaveV3Ethereum => "AaveV3Ethereum",
            PoolId::AaveV3EthereumLido => "AaveV3EthereumLido",
            PoolId::AaveV3EthereumEtherFi => "AaveV3EthereumEtherFi",
            PoolId::AaveV3Polygon => "AaveV3Polygon",
            PoolId::AaveV3Avalanche => "AaveV3Avalanche",
            PoolId::AaveV3Optimism => "AaveV3Optimism",
            PoolId::AaveV3Arbitrum => "AaveV3Arbitrum",
            PoolId::AaveV3Metis => "AaveV3Metis",
            PoolId::AaveV3Base => "AaveV3Base",
            PoolId::AaveV3Gnosis => "AaveV3Gnosis",
            PoolId::AaveV3Scroll => "AaveV3Scroll",
            PoolId::AaveV3BNB => "AaveV3BNB",
            PoolId::AaveV3ZkSync => "AaveV3ZkSync",
        }
    }

    /// Resolve the chain a pool is deployed on from the chain name embedded in its identifier.
    pub fn chain(&self) -> Result<Chain, LookupError> {
        let name = self.as_str();
        Chain::ALL
            .into_iter()
            .find(|chain| name.contains(chain.as_str()))
            .ok_or_else(|| LookupError::UnknownChain(name.to_string()))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolId {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolId::ALL
            .into_iter()
            .find(|pool| pool.as_str() == s)
            .ok_or_else(|| LookupError::UnknownPool(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    Ethereum,
    Optimism,
    Arbitrum,
    Polygon,
    Avalanche,
    Metis,
    Base,
    Bnb,
    Gnosis,
    Scroll,
    ZkSync,
}

impl Chain {
    /// Match order matters: the first chain name contained in a pool identifier wins.
    pub const ALL: [Chain; 11] = [
        Chain::Ethereum,
        Chain::Optimism,
        Chain::Arbitrum,
        Chain::Polygon,
        Chain::Avalanche,
        Chain::Metis,
        Chain::Base,
        Chain::Bnb,
        Chain::Gnosis,
        Chain::Scroll,
        Chain::ZkSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Optimism => "Optimism",
            Chain::Arbitrum => "Arbitrum",
            Chain::Polygon => "Polygon",
            Chain::Avalanche => "Avalanche",
            Chain::Metis => "Metis",
            Chain::Base => "Base",
            Chain::Bnb => "BNB",
            Chain::Gnosis => "Gnosis",
            Chain::Scroll => "Scroll",
            Chain::ZkSync => "ZkSync",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Optimism => 10,
            Chain::Arbitrum => 42161,
            Chain::Polygon => 137,
            Chain::Avalanche => 43114,
            Chain::Metis => 1088,
            Chain::Base => 8453,
            Chain::Bnb => 56,
            Chain::Gnosis => 100,
            Chain::Scroll => 534352,
            Chain::ZkSync => 324,
        }
    }

    /// Foundry rpc alias used by `vm.rpcUrl`.
    pub fn fork_alias(&self) -> String {
        match self {
            Chain::Ethereum => "mainnet".to_string(),
            other => other.as_str().to_lowercase(),
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://etherscan.io",
            Chain::Optimism => "https://optimistic.etherscan.io",
            Chain::Arbitrum => "https://arbiscan.io",
            Chain::Polygon => "https://polygonscan.com",
            Chain::Avalanche => "https://snowtrace.io",
            Chain::Metis => "https://andromeda-explorer.metis.io",
            Chain::Base => "https://basescan.org",
            Chain::Bnb => "https://bscscan.com",
            Chain::Gnosis => "https://gnosisscan.io",
            Chain::Scroll => "https://scrollscan.com",
            Chain::ZkSync => "https://era.zksync.network",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://ethereum-rpc.publicnode.com",
            Chain::Optimism => "https://optimism-rpc.publicnode.com",
            Chain::Arbitrum => "https://arbitrum-one-rpc.publicnode.com",
            Chain::Polygon => "https://polygon-bor-rpc.publicnode.com",
            Chain::Avalanche => "https://avalanche-c-chain-rpc.publicnode.com",
            Chain::Metis => "https://andromeda.metis.io/?owner=1088",
            Chain::Base => "https://base-rpc.publicnode.com",
            Chain::Bnb => "https://bsc-rpc.publicnode.com",
            Chain::Gnosis => "https://gnosis-rpc.publicnode.com",
            Chain::Scroll => "https://scroll-rpc.publicnode.com",
            Chain::ZkSync => "https://mainnet.era.zksync.io",
        }
    }

    /// Link to the token holder list, used to help pick a whale.
    pub fn token_holders_link(&self, address: &str) -> String {
        let base = self.explorer_url().trim_end_matches('/');
        format!("{base}/token/{address}#balances")
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.as_str().eq_ignore_ascii_case(s) || chain.fork_alias() == s)
            .ok_or_else(|| LookupError::UnknownChain(s.to_string()))
    }
}

/// Settings that apply to the whole run.
///
/// `force` and `config_file` describe how this particular invocation behaves and
/// are never persisted, so a replayed config cannot silently force overwrites.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub feature: Feature,
    pub pool: PoolId,
    pub title: String,
    pub short_name: String,
    pub date: String,
    #[serde(skip)]
    pub force: bool,
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

/// Chain state captured once per pool per run; the fork anchor for replay.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoolCache {
    pub block_number: u64,
}

/// At most one config per feature kind.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeatureConfigs {
    #[serde(rename = "SETUP_LM", default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupConfig>,
    #[serde(rename = "UPDATE_LM", default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateConfig>,
}

/// Generated source units. Constants are placed before functions in the contract body.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CodeArtifact {
    pub constants: Vec<String>,
    #[serde(rename = "fn")]
    pub functions: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PoolConfig {
    pub configs: FeatureConfigs,
    pub artifacts: Vec<CodeArtifact>,
    pub cache: PoolCache,
}

impl PoolConfig {
    pub fn new(cache: PoolCache) -> Self {
        Self {
            configs: FeatureConfigs::default(),
            artifacts: Vec::new(),
            cache,
        }
    }
}

pub type PoolConfigs = BTreeMap<PoolId, PoolConfig>;

/// Persisted per-pool state. Artifacts are always rebuilt, never stored.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PersistedPool {
    pub configs: FeatureConfigs,
    pub cache: PoolCache,
}

/// The replayable snapshot written next to the generated test.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub root_options: RunOptions,
    pub pool_options: BTreeMap<PoolId, PersistedPool>,
}

impl ConfigFile {
    pub fn from_pools(options: &RunOptions, pools: &PoolConfigs) -> Self {
        let pool_options = pools
            .iter()
            .map(|(pool, config)| {
                (
                    *pool,
                    PersistedPool {
                        configs: config.configs.clone(),
                        cache: config.cache,
                    },
                )
            })
            .collect();
        Self {
            root_options: options.clone(),
            pool_options,
        }
    }
}
