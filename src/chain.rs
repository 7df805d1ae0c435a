//! Read-only chain access used while collecting feature configs.
//!
//! Only a handful of view calls are needed, so the reader speaks JSON-RPC
//! (`eth_blockNumber`, `eth_call`) over HTTP and leaves word and address
//! handling to `alloy-primitives`.
//! Endpoints resolve per chain in priority order:
//! 1. `--rpc-url <chain>=<url>`
//! 2. `LMGEN_RPC_<CHAIN>` (e.g. `LMGEN_RPC_ETHEREUM`)
//! 3. a public default endpoint
use crate::types::Chain;
use alloy_primitives::{keccak256, Address, B256, U256};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Instant;

/// Narrow read-only view of on-chain state.
pub trait ChainReader {
    fn block_number(&self, chain: Chain) -> Result<u64>;
    fn decimals(&self, chain: Chain, token: &str) -> Result<u8>;
    fn total_supply(&self, chain: Chain, token: &str) -> Result<U256>;
    fn balance_of(&self, chain: Chain, token: &str, holder: &str) -> Result<U256>;
    /// Emission admin registered for `reward` on the pool's emission manager.
    fn emission_admin(&self, chain: Chain, emission_manager: &str, reward: &str) -> Result<String>;
}

pub struct RpcChainReader {
    agent: ureq::Agent,
    endpoints: BTreeMap<Chain, String>,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcChainReader {
    pub fn new(overrides: BTreeMap<Chain, String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            endpoints: overrides,
        }
    }

    fn endpoint(&self, chain: Chain) -> String {
        if let Some(url) = self.endpoints.get(&chain) {
            return url.clone();
        }
        let env_key = format!("LMGEN_RPC_{}", chain.as_str().to_ascii_uppercase());
        std::env::var(&env_key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| chain.default_rpc_url().to_string())
    }

    fn request(&self, chain: Chain, method: &str, params: Value) -> Result<Value> {
        let url = self.endpoint(chain);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let start = Instant::now();
        let mut response = self
            .agent
            .post(&url)
            .send_json(&payload)
            .with_context(|| format!("{method} request to {chain} rpc"))?;
        let reply: RpcReply = response
            .body_mut()
            .read_json()
            .with_context(|| format!("decode {method} reply from {chain} rpc"))?;
        tracing::debug!(
            %chain,
            chain_id = chain.chain_id(),
            method,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rpc call complete"
        );
        if let Some(error) = reply.error {
            return Err(anyhow!(
                "{method} failed on {chain}: {} (code {})",
                error.message,
                error.code
            ));
        }
        reply
            .result
            .ok_or_else(|| anyhow!("{method} on {chain} returned no result"))
    }

    fn call(&self, chain: Chain, to: &str, data: String) -> Result<String> {
        let result = self.request(
            chain,
            "eth_call",
            json!([{ "to": to, "data": data }, "latest"]),
        )?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("eth_call to {to} returned a non-string result"))
    }
}

impl ChainReader for RpcChainReader {
    fn block_number(&self, chain: Chain) -> Result<u64> {
        let result = self.request(chain, "eth_blockNumber", json!([]))?;
        let hex = result
            .as_str()
            .ok_or_else(|| anyhow!("eth_blockNumber returned a non-string result"))?;
        let value = parse_quantity(hex)?;
        u64::try_from(value).map_err(|_| anyhow!("block number {value} does not fit in u64"))
    }

    fn decimals(&self, chain: Chain, token: &str) -> Result<u8> {
        let raw = self.call(chain, token, encode_call("decimals()", &[])?)?;
        let value = parse_quantity(&raw)?;
        u8::try_from(value).map_err(|_| anyhow!("decimals of {token} out of range: {value}"))
    }

    fn total_supply(&self, chain: Chain, token: &str) -> Result<U256> {
        let raw = self.call(chain, token, encode_call("totalSupply()", &[])?)?;
        parse_quantity(&raw)
    }

    fn balance_of(&self, chain: Chain, token: &str, holder: &str) -> Result<U256> {
        let raw = self.call(chain, token, encode_call("balanceOf(address)", &[holder])?)?;
        parse_quantity(&raw)
    }

    fn emission_admin(&self, chain: Chain, emission_manager: &str, reward: &str) -> Result<String> {
        let raw = self.call(
            chain,
            emission_manager,
            encode_call("getEmissionAdmin(address)", &[reward])?,
        )?;
        decode_address(&raw)
    }
}

/// First four bytes of the keccak hash of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// ABI-encode a call whose arguments are all addresses.
pub fn encode_call(signature: &str, addresses: &[&str]) -> Result<String> {
    let mut data = format!("0x{}", hex::encode(selector(signature)));
    for address in addresses {
        data.push_str(&hex::encode(parse_address(address)?.into_word()));
    }
    Ok(data)
}

/// Parse a hex quantity (`0x12`) or a 32-byte return word into a `U256`.
pub fn parse_quantity(raw: &str) -> Result<U256> {
    let digits = raw.trim().trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|err| anyhow!("parse hex quantity {raw}: {err}"))
}

fn decode_address(raw: &str) -> Result<String> {
    let bytes = hex::decode(raw.trim().trim_start_matches("0x"))
        .with_context(|| format!("decode return data {raw}"))?;
    if bytes.len() < 32 {
        return Err(anyhow!("return data {raw} is too short for an address"));
    }
    let word = B256::from_slice(&bytes[..32]);
    Ok(Address::from_word(word).to_checksum(None))
}

/// Parse a `0x`-prefixed address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(value: &str) -> Result<Address> {
    let Some(digits) = value.strip_prefix("0x") else {
        return Err(anyhow!("address {value} must start with 0x"));
    };
    let mixed_case = digits.bytes().any(|b| b.is_ascii_lowercase())
        && digits.bytes().any(|b| b.is_ascii_uppercase());
    let parsed = if mixed_case {
        Address::parse_checksummed(value, None).map_err(|err| anyhow!("{err}"))
    } else {
        Address::from_str(value).map_err(|err| anyhow!("{err}"))
    };
    parsed.with_context(|| format!("invalid address {value}"))
}

pub fn is_address(value: &str) -> bool {
    parse_address(value).is_ok()
}

/// EIP-55 mixed-case checksum encoding.
pub fn checksum_address(address: &str) -> Result<String> {
    Ok(parse_address(address)?.to_checksum(None))
}
