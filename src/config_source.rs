//! `config.ts`: the persisted run, as a TypeScript module exporting a `ConfigFile`.
//!
//! Written files hold a pretty JSON object literal, which is valid TypeScript.
//! Files produced by the prettier-based generator use TS literal syntax instead
//! (bare keys, single quotes, trailing commas), so the loader normalizes the
//! literal to JSON before handing it to serde. A bare JSON document is accepted too.
use crate::types::ConfigFile;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::OnceLock;

pub const CONFIG_TYPE_IMPORT: &str = "import {ConfigFile} from '../../generator/types';";

fn export_regex() -> &'static Regex {
    static EXPORT: OnceLock<Regex> = OnceLock::new();
    EXPORT.get_or_init(|| {
        Regex::new(r"(?s)export\s+const\s+config\s*(?::\s*ConfigFile\s*)?=\s*(.*?);?\s*$")
            .expect("regex for config export")
    })
}

pub fn render(config: &ConfigFile) -> Result<String> {
    let body = serde_json::to_string_pretty(config).context("serialize config file")?;
    Ok(format!(
        "{CONFIG_TYPE_IMPORT}\n\nexport const config: ConfigFile = {body};\n"
    ))
}

pub fn parse(source: &str) -> Result<ConfigFile> {
    let trimmed = source.trim_start();
    let literal = if trimmed.starts_with('{') {
        trimmed
    } else {
        export_regex()
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|body| body.as_str())
            .ok_or_else(|| anyhow!("no `export const config` declaration found"))?
    };
    let json = literal_to_json(literal)?;
    serde_json::from_str(&json).context("decode ConfigFile literal")
}

/// Rewrite a TS object literal made of plain data into JSON.
pub fn literal_to_json(literal: &str) -> Result<String> {
    let chars: Vec<char> = literal.chars().collect();
    let mut out = String::with_capacity(literal.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            '"' | '\'' => idx = copy_string(&chars, idx, &mut out)?,
            '/' if chars.get(idx + 1) == Some(&'/') => {
                while idx < chars.len() && chars[idx] != '\n' {
                    idx += 1;
                }
            }
            '/' if chars.get(idx + 1) == Some(&'*') => {
                let rest: String = chars[idx + 2..].iter().collect();
                let end = rest
                    .find("*/")
                    .ok_or_else(|| anyhow!("unterminated block comment"))?;
                idx += 2 + rest[..end].chars().count() + 2;
            }
            ',' => {
                if !matches!(next_significant(&chars, idx + 1), Some('}' | ']')) {
                    out.push(',');
                }
                idx += 1;
            }
            _ if ch.is_ascii_digit() || ch == '-' => {
                while idx < chars.len()
                    && (chars[idx].is_ascii_alphanumeric() || matches!(chars[idx], '.' | '+' | '-' | '_'))
                {
                    if chars[idx] != '_' {
                        out.push(chars[idx]);
                    }
                    idx += 1;
                }
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' => {
                let start = idx;
                while idx < chars.len()
                    && (chars[idx].is_ascii_alphanumeric() || chars[idx] == '_' || chars[idx] == '$')
                {
                    idx += 1;
                }
                let word: String = chars[start..idx].iter().collect();
                if next_significant(&chars, idx) == Some(':') {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else if matches!(word.as_str(), "true" | "false" | "null") {
                    out.push_str(&word);
                } else {
                    return Err(anyhow!("unsupported expression {word:?} in config literal"));
                }
            }
            _ => {
                out.push(ch);
                idx += 1;
            }
        }
    }
    Ok(out)
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|ch| !ch.is_whitespace())
}

/// Copy a quoted string starting at `start` as a JSON string; returns the index after it.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> Result<usize> {
    let quote = chars[start];
    out.push('"');
    let mut idx = start + 1;
    while idx < chars.len() {
        match chars[idx] {
            '\\' => {
                let escaped = chars
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("dangling escape in string literal"))?;
                if *escaped == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(*escaped);
                }
                idx += 2;
            }
            '"' if quote == '\'' => {
                out.push_str("\\\"");
                idx += 1;
            }
            ch if ch == quote => {
                out.push('"');
                return Ok(idx + 1);
            }
            ch => {
                out.push(ch);
                idx += 1;
            }
        }
    }
    Err(anyhow!("unterminated string literal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::mocks::{self, CACHE, POOL};
    use crate::types::{Feature, FeatureConfigs, PersistedPool};
    use std::collections::BTreeMap;

    /// A SETUP_LM config as the prettier-based generator wrote it.
    const PRETTIER_CONFIG: &str = r#"import {ConfigFile} from '../../generator/types';
export const config: ConfigFile = {
  rootOptions: {
    pool: 'AaveV3EthereumLido',
    title: 'test',
    shortName: 'Test',
    date: '20231023',
    feature: 'SETUP_LM',
  },
  poolOptions: {
    AaveV3EthereumLido: {
      configs: {
        SETUP_LM: {
          emissionsAdmin: '0xac140648435d03f784879cd789130F22Ef588Fcd',
          rewardToken: 'AaveV3EthereumLidoAssets.wstETH_A_TOKEN',
          rewardTokenDecimals: 18,
          rewardOracle: 'AaveV3EthereumLidoAssets.wstETH_ORACLE',
          assets: ['wstETH_aToken'],
          distributionEnd: '14',
          transferStrategy: '0x0605a898535E9116Ff820347c536E3442F216Eb8',
          rewardAmounts: ['100'],
          totalReward: 100,
          whaleAddresses: ['0x07833EAdF87CD3079da281395f2fBA24b61F90f7'],
          whaleExpectedRewards: ['21.6'],
        },
      },
      cache: {blockNumber: 42},
    },
  },
};
"#;

    fn setup_config_file() -> ConfigFile {
        ConfigFile {
            root_options: mocks::options(Feature::SetupLm),
            pool_options: BTreeMap::from([(
                POOL,
                PersistedPool {
                    configs: FeatureConfigs {
                        setup: Some(mocks::setup_config()),
                        update: None,
                    },
                    cache: CACHE,
                },
            )]),
        }
    }

    #[test]
    fn prettier_written_config_loads() {
        let config = parse(PRETTIER_CONFIG).expect("parse prettier config");
        assert_eq!(config, setup_config_file());
    }

    #[test]
    fn rendered_config_is_a_typed_export_that_loads_back() {
        let rendered = render(&setup_config_file()).expect("render");
        assert!(rendered.starts_with(
            "import {ConfigFile} from '../../generator/types';\n\nexport const config: ConfigFile = {\n"
        ));
        assert!(rendered.ends_with("};\n"));
        assert_eq!(parse(&rendered).expect("parse"), setup_config_file());
    }

    #[test]
    fn bare_json_documents_are_accepted() {
        let json = serde_json::to_string(&setup_config_file()).expect("json");
        assert_eq!(parse(&json).expect("parse"), setup_config_file());
    }

    #[test]
    fn literal_rewrite_handles_quotes_comments_and_trailing_commas() {
        let json = literal_to_json(
            "{\n  // note\n  title: 'it\\'s \"quoted\"', /* inline */ list: [1, 2,],\n  flag: true,\n}",
        )
        .expect("rewrite");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["title"], "it's \"quoted\"");
        assert_eq!(value["list"], serde_json::json!([1, 2]));
        assert_eq!(value["flag"], true);
    }

    #[test]
    fn code_and_missing_exports_are_rejected() {
        assert!(parse("const other = {};").is_err());
        assert!(literal_to_json("{ feature: FEATURE.SETUP_LM }").is_err());
        assert!(literal_to_json("{ title: 'open }").is_err());
    }
}
