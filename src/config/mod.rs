//! Game configuration
//!
//! The serde model for the one input format this core round-trips: an
//! ordered list of reels (symbol names plus window height) and an ordered
//! list of rule specifications. Building a [`Game`] and running a
//! standalone RTP computation from the same [`GameConfig`] is guaranteed
//! to agree on symbol and line semantics because both consume the
//! [`GameDefinition`] produced by [`GameConfig::build`].
//!
//! Every validation failure is an [`Error::InvalidConfiguration`] raised
//! here, before any spin or payback computation runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gaming::{
    Game, LeftPay, LinePay, LineWinPolicy, Reel, ScatterPay, Symbol, WinRule, WinWays, DEFAULT_WINDOW,
};
use crate::meters::CreditSink;
use crate::rng::StopSource;

/// A symbol definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub name: String,
    #[serde(default)]
    pub wild: bool,
    #[serde(default)]
    pub wild_excludes: Vec<String>,
}

/// A reel strip definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelSpec {
    pub symbols: Vec<String>,
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

/// Win-rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Scatter,
    Line,
    Ways,
    Left,
}

/// A win-rule definition. `pays` drives scatter/line/ways schedules;
/// left-pay rules take the exact count `n` and the scalar `pay` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub kind: RuleKind,
    pub symbol: String,
    #[serde(default)]
    pub pays: Vec<u64>,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub pay: Option<u64>,
    #[serde(default)]
    pub paylines: Vec<Vec<usize>>,
}

/// A complete game definition as configuration data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub symbols: Vec<SymbolSpec>,
    pub reels: Vec<ReelSpec>,
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub line_policy: LineWinPolicy,
}

/// The validated, constructed form of a [`GameConfig`].
#[derive(Debug, Clone)]
pub struct GameDefinition {
    pub reels: Vec<Reel>,
    pub rules: Vec<WinRule>,
    pub line_policy: LineWinPolicy,
}

impl GameDefinition {
    /// Bind the definition to RNG and meter collaborators.
    pub fn into_game<S: StopSource, M: CreditSink>(
        self,
        rng: S,
        meters: std::sync::Arc<M>,
    ) -> Result<Game<S, M>> {
        Game::new(self.reels, self.rules, self.line_policy, rng, meters)
    }
}

impl GameConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the configuration and construct reels and rules.
    pub fn build(&self) -> Result<GameDefinition> {
        let symbols = self.build_symbols()?;
        let reels = self.build_reels(&symbols)?;
        let rules = self.build_rules(&symbols)?;
        for rule in &rules {
            rule.validate_against(&reels)?;
        }
        Ok(GameDefinition {
            reels,
            rules,
            line_policy: self.line_policy,
        })
    }

    fn build_symbols(&self) -> Result<HashMap<String, Symbol>> {
        let mut symbols = HashMap::new();
        for spec in &self.symbols {
            if !spec.wild && !spec.wild_excludes.is_empty() {
                return Err(Error::configuration(
                    "symbols",
                    format!("{} is not wild but lists wild exclusions", spec.name),
                ));
            }
            let symbol = if spec.wild {
                Symbol::wild(spec.name.as_str(), spec.wild_excludes.iter().map(String::as_str))
            } else {
                Symbol::new(spec.name.as_str())
            };
            if symbols.insert(spec.name.clone(), symbol).is_some() {
                return Err(Error::configuration(
                    "symbols",
                    format!("duplicate symbol {}", spec.name),
                ));
            }
        }
        for spec in &self.symbols {
            for excluded in &spec.wild_excludes {
                if !symbols.contains_key(excluded) {
                    return Err(Error::configuration(
                        "symbols",
                        format!("{} excludes unknown symbol {}", spec.name, excluded),
                    ));
                }
            }
        }
        Ok(symbols)
    }

    fn build_reels(&self, symbols: &HashMap<String, Symbol>) -> Result<Vec<Reel>> {
        if self.reels.is_empty() {
            return Err(Error::configuration("reels", "at least one reel is required"));
        }
        self.reels
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let strip = spec
                    .symbols
                    .iter()
                    .map(|name| {
                        symbols.get(name).cloned().ok_or_else(|| {
                            Error::configuration("reels", format!("reel {} uses unknown symbol {}", i, name))
                        })
                    })
                    .collect::<Result<Vec<Symbol>>>()?;
                Reel::with_window(strip, spec.window)
            })
            .collect()
    }

    fn build_rules(&self, symbols: &HashMap<String, Symbol>) -> Result<Vec<WinRule>> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let symbol = symbols.get(&spec.symbol).cloned().ok_or_else(|| {
                    Error::configuration("rules", format!("rule {} targets unknown symbol {}", i, spec.symbol))
                })?;
                match spec.kind {
                    RuleKind::Scatter => {
                        reject_line_fields(i, spec)?;
                        Ok(WinRule::Scatter(ScatterPay::new(symbol, spec.pays.clone())?))
                    }
                    RuleKind::Ways => {
                        reject_line_fields(i, spec)?;
                        Ok(WinRule::Ways(WinWays::new(symbol, spec.pays.clone())?))
                    }
                    RuleKind::Line => {
                        reject_left_fields(i, spec)?;
                        Ok(WinRule::Line(LinePay::new(
                            symbol,
                            spec.pays.clone(),
                            spec.paylines.clone(),
                        )?))
                    }
                    RuleKind::Left => {
                        if !spec.pays.is_empty() {
                            return Err(Error::configuration(
                                "rules",
                                format!("rule {} is a left rule; use n and pay, not pays", i),
                            ));
                        }
                        let n = spec.n.ok_or_else(|| {
                            Error::configuration("rules", format!("rule {} is missing n", i))
                        })?;
                        let pay = spec.pay.ok_or_else(|| {
                            Error::configuration("rules", format!("rule {} is missing pay", i))
                        })?;
                        Ok(WinRule::Left(LeftPay::new(symbol, n, pay, spec.paylines.clone())?))
                    }
                }
            })
            .collect()
    }
}

fn reject_line_fields(index: usize, spec: &RuleSpec) -> Result<()> {
    if spec.n.is_some() || spec.pay.is_some() || !spec.paylines.is_empty() {
        return Err(Error::configuration(
            "rules",
            format!("rule {} is a whole-window rule and takes only pays", index),
        ));
    }
    Ok(())
}

fn reject_left_fields(index: usize, spec: &RuleSpec) -> Result<()> {
    if spec.n.is_some() || spec.pay.is_some() {
        return Err(Error::configuration(
            "rules",
            format!("rule {} is a line rule; use pays, not n/pay", index),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit_config() -> GameConfig {
        GameConfig::from_json(
            r#"{
                "symbols": [
                    {"name": "seven"},
                    {"name": "cherry"},
                    {"name": "orange"},
                    {"name": "BAR", "wild": true, "wild_excludes": ["cherry", "seven"]}
                ],
                "reels": [
                    {"symbols": ["seven", "cherry", "orange", "BAR", "orange"]},
                    {"symbols": ["seven", "orange", "cherry", "BAR", "orange"]},
                    {"symbols": ["seven", "orange", "orange", "BAR", "cherry"]}
                ],
                "rules": [
                    {"kind": "line", "symbol": "cherry", "pays": [2, 5, 20],
                     "paylines": [[1, 1, 1], [0, 0, 0], [2, 2, 2]]},
                    {"kind": "scatter", "symbol": "seven", "pays": [0, 0, 50]}
                ],
                "line_policy": "sum_all"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_fruit_config() {
        let definition = fruit_config().build().unwrap();
        assert_eq!(definition.reels.len(), 3);
        assert_eq!(definition.rules.len(), 2);
        assert_eq!(definition.line_policy, LineWinPolicy::SumAll);
        assert!(definition.reels.iter().all(|r| r.window() == 3));

        let wild = definition.reels[0].symbols().iter().find(|s| s.is_wild()).unwrap();
        assert_eq!(wild.name(), "BAR");
        assert!(wild.excludes("cherry"));
    }

    #[test]
    fn test_line_policy_defaults_to_highest_only() {
        let mut config = fruit_config();
        config.line_policy = LineWinPolicy::default();
        assert_eq!(config.build().unwrap().line_policy, LineWinPolicy::HighestOnly);
    }

    #[test]
    fn test_unknown_symbol_on_reel_is_rejected() {
        let mut config = fruit_config();
        config.reels[0].symbols[0] = "lemon".to_string();
        assert!(matches!(config.build(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_duplicate_symbol_is_rejected() {
        let mut config = fruit_config();
        config.symbols.push(SymbolSpec {
            name: "cherry".to_string(),
            wild: false,
            wild_excludes: Vec::new(),
        });
        assert!(config.build().is_err());
    }

    #[test]
    fn test_exclusions_require_wild_flag() {
        let mut config = fruit_config();
        config.symbols[1].wild_excludes = vec!["seven".to_string()];
        assert!(config.build().is_err());
    }

    #[test]
    fn test_unknown_exclusion_is_rejected() {
        let mut config = fruit_config();
        config.symbols[3].wild_excludes.push("lemon".to_string());
        assert!(config.build().is_err());
    }

    #[test]
    fn test_left_rule_requires_n_and_pay() {
        let mut config = fruit_config();
        config.rules[0] = RuleSpec {
            kind: RuleKind::Left,
            symbol: "cherry".to_string(),
            pays: Vec::new(),
            n: Some(3),
            pay: None,
            paylines: vec![vec![1, 1, 1]],
        };
        assert!(config.build().is_err());

        config.rules[0].pay = Some(40);
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_whole_window_rules_reject_line_fields() {
        let mut config = fruit_config();
        config.rules[1].paylines = vec![vec![0, 0, 0]];
        assert!(config.build().is_err());
    }

    #[test]
    fn test_payline_outside_window_is_rejected() {
        let mut config = fruit_config();
        config.rules[0].paylines[0] = vec![3, 1, 1];
        assert!(config.build().is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = fruit_config();
        let json = serde_json::to_string(&config).unwrap();
        let reparsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(reparsed.build().unwrap().rules.len(), config.build().unwrap().rules.len());
    }
}
