//! Read-only address book mapping pools and assets to contract addresses.
//!
//! The book is a JSON document keyed by pool identifier. A bundled copy covers
//! the reference pool; `--address-book` or `LMGEN_ADDRESS_BOOK` point at a full one.
use crate::templates;
use crate::types::{LookupError, PoolId};
use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const ADDRESS_BOOK_ENV: &str = "LMGEN_ADDRESS_BOOK";

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AssetEntry {
    pub underlying: String,
    pub a_token: String,
    pub v_token: String,
    #[serde(default)]
    pub oracle: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PoolEntry {
    pub emission_manager: String,
    /// Listed assets in document order.
    #[serde(deserialize_with = "ordered_assets")]
    pub assets: Vec<(String, AssetEntry)>,
}

fn ordered_assets<'de, D>(deserializer: D) -> Result<Vec<(String, AssetEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(symbol, entry)| match serde_json::from_value(entry) {
            Ok(entry) => Ok((symbol, entry)),
            Err(err) => Err(D::Error::custom(format!("asset {symbol}: {err}"))),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AddressBook {
    pools: BTreeMap<PoolId, PoolEntry>,
}

impl AddressBook {
    /// Parse a book document. Entries for pools this tool does not support are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(text).context("parse address book JSON")?;
        let mut pools = BTreeMap::new();
        for (name, entry) in raw {
            let Ok(pool) = name.parse::<PoolId>() else {
                tracing::debug!(pool = %name, "skipping unsupported address book entry");
                continue;
            };
            let entry: PoolEntry = serde_json::from_value(entry)
                .with_context(|| format!("parse address book entry {name}"))?;
            pools.insert(pool, entry);
        }
        Ok(Self { pools })
    }

    pub fn bundled() -> Result<Self> {
        Self::parse(templates::ADDRESS_BOOK_JSON)
    }

    /// Resolve the book in priority order: explicit path, environment, bundled copy.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(ADDRESS_BOOK_ENV).map(std::path::PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("read address book {}", path.display()))?;
                tracing::debug!(path = %path.display(), "loaded address book");
                Self::parse(&text)
            }
            None => Self::bundled(),
        }
    }

    pub fn pool(&self, pool: PoolId) -> Result<&PoolEntry, LookupError> {
        self.pools
            .get(&pool)
            .ok_or_else(|| LookupError::PoolNotInAddressBook(pool.to_string()))
    }

    /// Pools the book has entries for, in selection order.
    pub fn pools(&self) -> Vec<PoolId> {
        PoolId::ALL
            .iter()
            .copied()
            .filter(|pool| self.pools.contains_key(pool))
            .collect()
    }

    /// Underlying asset symbols listed for a pool, in book order.
    pub fn assets(&self, pool: PoolId) -> Result<Vec<String>, LookupError> {
        Ok(self
            .pool(pool)?
            .assets
            .iter()
            .map(|(symbol, _)| symbol.clone())
            .collect())
    }

    pub fn asset(&self, pool: PoolId, symbol: &str) -> Result<&AssetEntry, LookupError> {
        self.pool(pool)?
            .assets
            .iter()
            .find_map(|(listed, entry)| (listed == symbol).then_some(entry))
            .ok_or_else(|| LookupError::UnknownAsset {
                pool: pool.to_string(),
                asset: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_book_lists_reference_pool_assets() {
        let book = AddressBook::bundled().expect("bundled book parses");
        let assets = book.assets(PoolId::AaveV3EthereumLido).expect("pool listed");
        assert!(assets.contains(&"wstETH".to_string()));
        let wsteth = book
            .asset(PoolId::AaveV3EthereumLido, "wstETH")
            .expect("wstETH listed");
        assert!(wsteth.a_token.starts_with("0x"));
    }

    #[test]
    fn unsupported_pools_are_skipped() {
        let book = AddressBook::parse(
            r#"{
  "AaveV2Ethereum": { "POOL": "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9" },
  "AaveV3Base": { "EMISSION_MANAGER": "0x0000000000000000000000000000000000000001", "ASSETS": {} }
}"#,
        )
        .expect("parse");
        assert_eq!(book.assets(PoolId::AaveV3Base), Ok(Vec::new()));
        assert!(AddressBook::parse(r#"{ "AaveV3Base": { "ASSETS": {} } }"#).is_err());
    }

    #[test]
    fn assets_keep_document_order() {
        let book = AddressBook::parse(
            r#"{
  "AaveV3Base": {
    "EMISSION_MANAGER": "0x0000000000000000000000000000000000000001",
    "ASSETS": {
      "wstETH": { "UNDERLYING": "0x1111111111111111111111111111111111111111", "A_TOKEN": "0x2222222222222222222222222222222222222222", "V_TOKEN": "0x3333333333333333333333333333333333333333" },
      "WETH": { "UNDERLYING": "0x1111111111111111111111111111111111111111", "A_TOKEN": "0x2222222222222222222222222222222222222222", "V_TOKEN": "0x3333333333333333333333333333333333333333" },
      "AAVE": { "UNDERLYING": "0x1111111111111111111111111111111111111111", "A_TOKEN": "0x2222222222222222222222222222222222222222", "V_TOKEN": "0x3333333333333333333333333333333333333333" }
    }
  }
}"#,
        )
        .expect("parse");
        assert_eq!(
            book.assets(PoolId::AaveV3Base).expect("listed"),
            vec!["wstETH", "WETH", "AAVE"]
        );
        assert_eq!(book.pools(), vec![PoolId::AaveV3Base]);
        assert!(book.asset(PoolId::AaveV3Base, "AAVE").is_ok());
    }

    #[test]
    fn unknown_pool_and_asset_are_lookup_errors() {
        let book = AddressBook::bundled().expect("bundled book parses");
        assert_eq!(
            book.assets(PoolId::AaveV3Metis).unwrap_err(),
            LookupError::PoolNotInAddressBook("AaveV3Metis".to_string())
        );
        assert!(matches!(
            book.asset(PoolId::AaveV3EthereumLido, "DOGE"),
            Err(LookupError::UnknownAsset { .. })
        ));
    }
}
