//! Compose a pool's artifacts into one contract source.
use crate::imports::{prefix_with_imports, prefix_with_pragma};
use crate::naming::contract_name;
use crate::templates;
use crate::types::{PoolConfig, PoolId, RunOptions};
use anyhow::Result;

/// Render the full contract for `pool`: pragma, inferred imports, then the body.
///
/// Constants of every artifact come before any function, each group kept in
/// artifact order.
pub fn render_contract(options: &RunOptions, pool_config: &PoolConfig, pool: PoolId) -> Result<String> {
    let chain = pool.chain()?;
    let constants = pool_config
        .artifacts
        .iter()
        .flat_map(|artifact| artifact.constants.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");
    let functions = pool_config
        .artifacts
        .iter()
        .flat_map(|artifact| artifact.functions.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    let contract = templates::CONTRACT_SOL
        .replace("{contract_name}", &contract_name(options, Some(pool)))
        .replace("{base_test}", options.feature.base_test())
        .replace("{fork_alias}", &chain.fork_alias())
        .replace("{block_number}", &pool_config.cache.block_number.to_string())
        .replace("{constants}", &constants)
        .replace("{functions}", &functions);

    Ok(prefix_with_pragma(&prefix_with_imports(&contract)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::mocks::{self, CACHE, POOL};
    use crate::features::{FeatureModule, SetupLiquidityMining, UpdateLiquidityMining};
    use crate::types::{CodeArtifact, Feature};

    fn artifact(constants: &[&str], functions: &[&str]) -> CodeArtifact {
        CodeArtifact {
            constants: constants.iter().map(|s| s.to_string()).collect(),
            functions: functions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn constants_precede_functions_across_artifacts() {
        let mut pool_config = PoolConfig::new(CACHE);
        pool_config.artifacts.push(artifact(&["uint256 A = 1;"], &["function a() public {}"]));
        pool_config.artifacts.push(artifact(&["uint256 B = 2;"], &["function b() public {}"]));
        let source = render_contract(&mocks::options(Feature::SetupLm), &pool_config, POOL)
            .expect("render");

        let a = source.find("uint256 A = 1;").expect("A");
        let b = source.find("uint256 B = 2;").expect("B");
        let fa = source.find("function a()").expect("fa");
        let fb = source.find("function b()").expect("fb");
        assert!(a < b && b < fa && fa < fb);
        assert!(source.contains("uint256 A = 1;\nuint256 B = 2;"));
    }

    #[test]
    fn setup_contract_has_header_imports_and_fork() {
        let mut pool_config = PoolConfig::new(CACHE);
        let cfg = mocks::setup_config();
        let options = mocks::options(Feature::SetupLm);
        pool_config.artifacts.push(
            SetupLiquidityMining
                .build(POOL, &options, &CACHE, &cfg)
                .expect("build"),
        );
        let source = render_contract(&options, &pool_config, POOL).expect("render");

        assert!(source.starts_with("// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\nimport {AaveV3EthereumLido, AaveV3EthereumLidoAssets} from 'aave-address-book/AaveV3EthereumLido.sol';\n"));
        assert!(source.contains("import {LMSetupBaseTest} from '../utils/LMSetupBaseTest.sol';"));
        assert!(source.contains("import {IEmissionManager, ITransferStrategyBase"));
        assert!(!source.contains("LMUpdateBaseTest"));
        assert!(source.contains(
            "contract AaveV3EthereumLido_LMSetupTest_20231023 is LMSetupBaseTest {"
        ));
        assert!(source.contains("vm.createSelectFork(vm.rpcUrl('mainnet'), 42);"));
        assert!(source.trim_end().ends_with('}'));
    }

    #[test]
    fn update_contract_uses_update_base() {
        let mut pool_config = PoolConfig::new(CACHE);
        let options = mocks::options(Feature::UpdateLm);
        pool_config.artifacts.push(
            UpdateLiquidityMining
                .build(POOL, &options, &CACHE, &mocks::update_config())
                .expect("build"),
        );
        let source = render_contract(&options, &pool_config, POOL).expect("render");
        assert!(source.contains(
            "contract AaveV3EthereumLido_LMUpdateTest_20231023 is LMUpdateBaseTest {"
        ));
        assert!(source.contains("import {LMUpdateBaseTest} from '../utils/LMUpdateBaseTest.sol';"));
        assert_eq!(source.matches("aave-address-book").count(), 1);
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut pool_config = PoolConfig::new(CACHE);
        let options = mocks::options(Feature::UpdateLm);
        pool_config.artifacts.push(
            UpdateLiquidityMining
                .build(POOL, &options, &CACHE, &mocks::update_config())
                .expect("build"),
        );
        assert_eq!(
            render_contract(&options, &pool_config, POOL).expect("first"),
            render_contract(&options, &pool_config, POOL).expect("second")
        );
    }
}
