//! Asset-name translation shared by the feature modules.
//!
//! Prompts list reserve tokens as `<underlying>`, `<underlying>_aToken`, or
//! `<underlying>_variableDebtToken`. Generated code refers to the same tokens
//! through the address-book library (`<Pool>Assets.<underlying>_A_TOKEN`, ...)
//! and to their whales through `a<underlying>_WHALE` / `v<underlying>_WHALE`.
//! These rules must stay in lockstep or the generated contract will not resolve.
use crate::address_book::AddressBook;
use crate::types::{LookupError, PoolId};

pub const SUPPLY_SUFFIX: &str = "_aToken";
pub const BORROW_SUFFIX: &str = "_variableDebtToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Underlying,
    Supply,
    Borrow,
}

/// Split a prompt-level asset name into its underlying symbol and token kind.
pub fn split_asset(value: &str) -> (&str, AssetKind) {
    if let Some(underlying) = value.strip_suffix(BORROW_SUFFIX) {
        (underlying, AssetKind::Borrow)
    } else if let Some(underlying) = value.strip_suffix(SUPPLY_SUFFIX) {
        (underlying, AssetKind::Supply)
    } else {
        (value, AssetKind::Underlying)
    }
}

/// `<Pool>Assets.<underlying>_{UNDERLYING|A_TOKEN|V_TOKEN}`.
pub fn asset_lib_symbol(value: &str, pool: PoolId) -> String {
    let (underlying, kind) = split_asset(value);
    let suffix = match kind {
        AssetKind::Underlying => "UNDERLYING",
        AssetKind::Supply => "A_TOKEN",
        AssetKind::Borrow => "V_TOKEN",
    };
    format!("{pool}Assets.{underlying}_{suffix}")
}

/// `<Pool>Assets.<underlying>_ORACLE`; the oracle prices the underlying either way.
pub fn oracle_lib_symbol(value: &str, pool: PoolId) -> String {
    let (underlying, _) = split_asset(value);
    format!("{pool}Assets.{underlying}_ORACLE")
}

/// Whale constant name; anything that is not a debt token counts as supply.
pub fn whale_constant(value: &str) -> String {
    let (underlying, kind) = split_asset(value);
    match kind {
        AssetKind::Borrow => format!("v{underlying}_WHALE"),
        AssetKind::Supply | AssetKind::Underlying => format!("a{underlying}_WHALE"),
    }
}

pub fn supply_assets(book: &AddressBook, pool: PoolId) -> Result<Vec<String>, LookupError> {
    Ok(book
        .assets(pool)?
        .into_iter()
        .map(|underlying| format!("{underlying}{SUPPLY_SUFFIX}"))
        .collect())
}

pub fn supply_borrow_assets(book: &AddressBook, pool: PoolId) -> Result<Vec<String>, LookupError> {
    let mut assets = Vec::new();
    for underlying in book.assets(pool)? {
        assets.push(format!("{underlying}{BORROW_SUFFIX}"));
        assets.push(format!("{underlying}{SUPPLY_SUFFIX}"));
    }
    Ok(assets)
}

/// On-chain address of the token a prompt-level asset name refers to.
pub fn asset_address(book: &AddressBook, pool: PoolId, value: &str) -> Result<String, LookupError> {
    let (underlying, kind) = split_asset(value);
    let entry = book.asset(pool, underlying)?;
    Ok(match kind {
        AssetKind::Underlying => entry.underlying.clone(),
        AssetKind::Supply => entry.a_token.clone(),
        AssetKind::Borrow => entry.v_token.clone(),
    })
}
