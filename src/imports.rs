//! Import inference for generated contracts.
//!
//! Generated code only ever names a small, closed vocabulary of symbols, so the
//! imports it needs are found by lexical rules instead of a symbol table. Add a
//! new convention as a new rule here, never as an ad hoc string check elsewhere.
//!
//! Existing `import` lines are never scanned, and a line already present in the
//! source is not emitted again, so resolving a resolved source is a no-op.
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("source references address-book libraries of two pools: {first} and {second}")]
    MixedRoots { first: String, second: String },
}

/// Address-book libraries a pool exposes, keyed by the suffix after the pool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LibraryRule {
    /// `<Pool>.MEMBER`, not an interface such as `IAaveV3…` and not a qualified library.
    Base,
    /// `<Pool>Assets.MEMBER`
    Assets,
    /// `<Pool>EModes.MEMBER`
    EModes,
}

const LIBRARY_RULES: [LibraryRule; 3] = [LibraryRule::Base, LibraryRule::Assets, LibraryRule::EModes];

impl LibraryRule {
    fn suffix(self) -> &'static str {
        match self {
            LibraryRule::Base => "",
            LibraryRule::Assets => "Assets",
            LibraryRule::EModes => "EModes",
        }
    }

    /// Pool names referenced through this library, in order of first use.
    fn roots(self, code: &str) -> Vec<String> {
        let mut roots: Vec<String> = Vec::new();
        for cap in library_regex().captures_iter(code) {
            let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let root = match self {
                LibraryRule::Base => {
                    if name.ends_with("Assets") || name.ends_with("EModes") {
                        continue;
                    }
                    Some(name)
                }
                LibraryRule::Assets | LibraryRule::EModes => name.strip_suffix(self.suffix()),
            };
            if let Some(root) = root.filter(|root| !root.is_empty()) {
                if !roots.iter().any(|seen| seen == root) {
                    roots.push(root.to_string());
                }
            }
        }
        roots
    }
}

/// Whole-word `AaveV2…`/`AaveV3…` identifier immediately followed by a member access.
fn library_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(AaveV[23][A-Za-z]+)\.").expect("regex for address-book references")
    })
}

struct SymbolRule {
    symbol: &'static str,
    line: &'static str,
}

const SYMBOL_RULES: [SymbolRule; 4] = [
    SymbolRule {
        symbol: "IEmissionManager",
        line: "import {IEmissionManager, ITransferStrategyBase, RewardsDataTypes, IEACAggregatorProxy} from '../../src/interfaces/IEmissionManager.sol';",
    },
    SymbolRule {
        symbol: "LMSetupBaseTest",
        line: "import {LMSetupBaseTest} from '../utils/LMSetupBaseTest.sol';",
    },
    SymbolRule {
        symbol: "LMUpdateBaseTest",
        line: "import {LMUpdateBaseTest} from '../utils/LMUpdateBaseTest.sol';",
    },
    SymbolRule {
        symbol: "IAaveIncentivesController",
        line: "import {IAaveIncentivesController} from '../src/interfaces/IAaveIncentivesController.sol';",
    },
];

pub const PRAGMA_HEADER: &str = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n";

/// Source without its existing import directives.
fn body(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn address_book_import(code: &str) -> Result<Option<String>, ImportError> {
    let mut root: Option<String> = None;
    let mut names = Vec::new();
    for rule in LIBRARY_RULES {
        let roots = rule.roots(code);
        let Some(first) = roots.first() else {
            continue;
        };
        for candidate in &roots {
            let expected = root.get_or_insert_with(|| first.clone());
            if candidate != &*expected {
                return Err(ImportError::MixedRoots {
                    first: expected.clone(),
                    second: candidate.clone(),
                });
            }
        }
        names.push(format!("{first}{}", rule.suffix()));
    }
    Ok(root.map(|root| {
        format!(
            "import {{{}}} from 'aave-address-book/{root}.sol';",
            names.join(", ")
        )
    }))
}

/// Import lines `source` needs and does not already carry, in rule order.
pub fn resolve_imports(source: &str) -> Result<Vec<String>, ImportError> {
    let code = body(source);
    let mut lines = Vec::new();
    if let Some(line) = address_book_import(&code)? {
        lines.push(line);
    }
    lines.extend(
        SYMBOL_RULES
            .iter()
            .filter(|rule| code.contains(rule.symbol))
            .map(|rule| rule.line.to_string()),
    );
    lines.retain(|line| !source.lines().any(|existing| existing.trim() == line));
    tracing::debug!(count = lines.len(), "resolved imports");
    Ok(lines)
}

pub fn prefix_with_imports(source: &str) -> Result<String, ImportError> {
    let mut out = String::new();
    for line in resolve_imports(source)? {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(source);
    Ok(out)
}

pub fn prefix_with_pragma(source: &str) -> String {
    format!("{PRAGMA_HEADER}{source}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIDO_LINE: &str =
        "import {AaveV3EthereumLido} from 'aave-address-book/AaveV3EthereumLido.sol';";

    #[test]
    fn pool_base_reference_yields_single_import() {
        let source = "address a = AaveV3EthereumLido.EMISSION_MANAGER;\naddress b = AaveV3EthereumLido.DEFAULT_INCENTIVES_CONTROLLER;";
        assert_eq!(resolve_imports(source).expect("resolve"), vec![LIDO_LINE]);
    }

    #[test]
    fn interfaces_are_not_pool_references() {
        let source = "IAaveV3ConfigEngine.Listing memory listing;";
        assert!(resolve_imports(source).expect("resolve").is_empty());
    }

    #[test]
    fn qualified_libraries_join_one_line() {
        let source = "x = AaveV3EthereumLidoAssets.wstETH_A_TOKEN;\ny = AaveV3EthereumLido.POOL;\nz = AaveV3EthereumLidoEModes.ETH_CORRELATED;";
        assert_eq!(
            resolve_imports(source).expect("resolve"),
            vec!["import {AaveV3EthereumLido, AaveV3EthereumLidoAssets, AaveV3EthereumLidoEModes} from 'aave-address-book/AaveV3EthereumLido.sol';"]
        );
    }

    #[test]
    fn assets_only_source_roots_at_pool() {
        let source = "x = AaveV3ArbitrumAssets.WETH_A_TOKEN;";
        assert_eq!(
            resolve_imports(source).expect("resolve"),
            vec!["import {AaveV3ArbitrumAssets} from 'aave-address-book/AaveV3Arbitrum.sol';"]
        );
    }

    #[test]
    fn fixed_symbols_emit_hardcoded_lines_once() {
        let source = "contract X is LMSetupBaseTest {\n  IEmissionManager(a).configureAssets(b);\n  IEmissionManager(a).configureAssets(c);\n}";
        let lines = resolve_imports(source).expect("resolve");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("import {IEmissionManager, ITransferStrategyBase"));
        assert_eq!(lines[1], "import {LMSetupBaseTest} from '../utils/LMSetupBaseTest.sol';");
    }

    #[test]
    fn mixed_pools_are_rejected() {
        let source = "a = AaveV3EthereumLido.POOL;\nb = AaveV3EthereumAssets.WETH_A_TOKEN;";
        assert_eq!(
            resolve_imports(source).expect_err("mixed"),
            ImportError::MixedRoots {
                first: "AaveV3EthereumLido".to_string(),
                second: "AaveV3Ethereum".to_string(),
            }
        );
        let same_rule = "a = AaveV3Polygon.POOL;\nb = AaveV3Base.POOL;";
        assert!(resolve_imports(same_rule).is_err());
    }

    #[test]
    fn resolving_twice_adds_nothing() {
        let source = "contract X is LMUpdateBaseTest {\n  address a = AaveV3EthereumLido.EMISSION_MANAGER;\n  address b = AaveV3EthereumLidoAssets.wstETH_A_TOKEN;\n  IEmissionManager(a);\n}";
        let once = prefix_with_imports(source).expect("first pass");
        let twice = prefix_with_imports(&once).expect("second pass");
        assert_eq!(once, twice);
        assert_eq!(once.matches("aave-address-book").count(), 1);
        assert!(once.ends_with(source));
    }

    #[test]
    fn pragma_goes_first() {
        let out = prefix_with_pragma("contract X {}");
        assert!(out.starts_with("// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n"));
        assert!(out.ends_with("contract X {}"));
    }
}
