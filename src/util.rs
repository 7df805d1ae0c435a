use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::Path;

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

/// Parse a token amount typed in whole-token units (e.g. `100` or `12.5`).
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let value: Decimal = input
        .trim()
        .parse()
        .map_err(|_| anyhow!("{input:?} is not a decimal number"))?;
    if value.is_sign_negative() {
        return Err(anyhow!("amount must not be negative"));
    }
    Ok(value.normalize())
}

pub fn sum_amounts(amounts: &[Decimal]) -> Decimal {
    amounts.iter().copied().sum::<Decimal>().normalize()
}

/// Bits a `Decimal` mantissa can hold.
const DECIMAL_MANTISSA_BITS: usize = 96;

fn mantissa(value: U256) -> Option<i128> {
    u128::try_from(value)
        .ok()
        .and_then(|value| i128::try_from(value).ok())
}

/// Portion of `reward_amount` a holder of `balance` out of `total_supply` would
/// earn, rounded half away from zero to two decimal places.
///
/// Raw balances span the full `uint256` range, so both operands are shifted
/// right by the same amount until they fit a decimal mantissa.
pub fn whale_share(balance: U256, total_supply: U256, reward_amount: Decimal) -> Decimal {
    let shift = balance
        .bit_len()
        .max(total_supply.bit_len())
        .saturating_sub(DECIMAL_MANTISSA_BITS);
    let (Some(balance), Some(total_supply)) =
        (mantissa(balance >> shift), mantissa(total_supply >> shift))
    else {
        return Decimal::ZERO;
    };
    if total_supply == 0 {
        return Decimal::ZERO;
    }
    let share = Decimal::from_i128_with_scale(balance, 0)
        .checked_div(Decimal::from_i128_with_scale(total_supply, 0))
        .and_then(|ratio| ratio.checked_mul(reward_amount))
        .unwrap_or(Decimal::ZERO);
    share
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
