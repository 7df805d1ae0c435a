//! Shared helpers for driving the `lmgen` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const FOLDER: &str = "20231023_LMSetupAaveV3EthereumLido_Test";
pub const CONTRACT: &str = "AaveV3EthereumLido_LMSetupTest_20231023";

/// Stored SETUP_LM run for the reference pool, as the `config.ts` export holds it.
pub fn setup_config_json() -> serde_json::Value {
    serde_json::json!({
        "rootOptions": {
            "feature": "SETUP_LM",
            "pool": "AaveV3EthereumLido",
            "title": "test",
            "shortName": "Test",
            "date": "20231023"
        },
        "poolOptions": {
            "AaveV3EthereumLido": {
                "configs": {
                    "SETUP_LM": {
                        "emissionsAdmin": "0xac140648435d03f784879cd789130F22Ef588Fcd",
                        "rewardToken": "AaveV3EthereumLidoAssets.wstETH_A_TOKEN",
                        "rewardTokenDecimals": 18,
                        "rewardOracle": "AaveV3EthereumLidoAssets.wstETH_ORACLE",
                        "assets": ["wstETH_aToken"],
                        "distributionEnd": 14,
                        "transferStrategy": "0x0605a898535E9116Ff820347c536E3442F216Eb8",
                        "rewardAmounts": ["100"],
                        "totalReward": "100",
                        "whaleAddresses": ["0x07833EAdF87CD3079da281395f2fBA24b61F90f7"],
                        "whaleExpectedRewards": ["21.6"]
                    }
                },
                "cache": { "blockNumber": 18413000 }
            }
        }
    })
}

pub fn write_config(dir: &Path, value: &serde_json::Value) -> PathBuf {
    let path = dir.join("input.json");
    fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize config"))
        .expect("write config");
    path
}

pub fn write_config_ts(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("config.ts");
    fs::write(&path, source).expect("write config.ts");
    path
}

/// The object exported by a written `config.ts`.
pub fn stored_config(path: &Path) -> serde_json::Value {
    let source = read(path);
    let body = source
        .strip_prefix(
            "import {ConfigFile} from '../../generator/types';\n\nexport const config: ConfigFile = ",
        )
        .and_then(|rest| rest.strip_suffix(";\n"))
        .unwrap_or_else(|| panic!("{} is not a typed config export", path.display()));
    serde_json::from_str(body).expect("stored config object")
}

/// Replay `config` into `out_dir` without prompting, formatting, or network access.
pub fn replay(config: &Path, out_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lmgen"))
        .arg("--config-file")
        .arg(config)
        .arg("--out-dir")
        .arg(out_dir)
        .args(["--formatter", "none", "--force"])
        .env_remove("LMGEN_FORMATTER")
        .env_remove("LMGEN_ADDRESS_BOOK")
        .env("LMGEN_LOG", "warn")
        .output()
        .expect("run lmgen")
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}
