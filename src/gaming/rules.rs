//! Win rules: scatter, line, ways, and fixed-length left-to-right pays
//!
//! Each rule pairs one target [`Symbol`] with a pay schedule and evaluates
//! a displayed [`Window`] to a credit multiplier. Rules are plain data
//! behind the [`WinRule`] tagged enum; a central `match` dispatches
//! evaluation, the same way bet types are resolved in a table game engine.
//!
//! A pay schedule shorter than a match count actually reached is a
//! configuration error and fails the evaluation. It is never silently
//! truncated.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gaming::reels::{Reel, Window};
use crate::gaming::symbols::Symbol;

/// Payout multipliers indexed by match count minus one.
pub type PaySchedule = Vec<u64>;

/// One row index per reel, identifying which displayed row a line reads.
pub type Payline = Vec<usize>;

/// How wins are combined when several line-style rules cover the same
/// payline on one spin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineWinPolicy {
    /// Per payline, only the best-paying line rule is credited.
    #[default]
    HighestOnly,
    /// Every applicable line rule is credited; wins sum.
    SumAll,
}

/// Position-independent count of the target anywhere in view.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPay {
    pub symbol: Symbol,
    pub pays: PaySchedule,
}

impl ScatterPay {
    pub fn new(symbol: Symbol, pays: PaySchedule) -> Result<Self> {
        if pays.is_empty() {
            return Err(Error::configuration("scatter rule", "empty pay schedule"));
        }
        Ok(Self { symbol, pays })
    }

    /// Count occurrences of the target across every displayed slice and
    /// pay `pays[count-1]`.
    pub fn evaluate(&self, window: &Window) -> Result<u64> {
        let count = window.iter().filter(|s| s.pays_as(&self.symbol)).count();
        if count == 0 {
            return Ok(0);
        }
        schedule_pay(&self.pays, count, self.symbol.name())
    }
}

/// Consecutive left-to-right matches along configured paylines, paying a
/// schedule entry for the run length on each winning line.
#[derive(Debug, Clone, Serialize)]
pub struct LinePay {
    pub symbol: Symbol,
    pub pays: PaySchedule,
    pub paylines: Vec<Payline>,
}

impl LinePay {
    pub fn new(symbol: Symbol, pays: PaySchedule, paylines: Vec<Payline>) -> Result<Self> {
        if pays.is_empty() {
            return Err(Error::configuration("line rule", "empty pay schedule"));
        }
        if paylines.is_empty() {
            return Err(Error::configuration("line rule", "no paylines configured"));
        }
        Ok(Self { symbol, pays, paylines })
    }

    /// Win multiplier for a single payline: leading-run length `n` pays
    /// `pays[n-1]`.
    pub fn win_on_line(&self, window: &Window, line: &Payline) -> Result<u64> {
        let n = leading_run(window, line, &self.symbol)?;
        if n == 0 {
            return Ok(0);
        }
        schedule_pay(&self.pays, n, self.symbol.name())
    }
}

/// Adjacency ("ways") pay: every reel from the left must show the target
/// somewhere in its slice; per-reel occurrence counts multiply.
#[derive(Debug, Clone, Serialize)]
pub struct WinWays {
    pub symbol: Symbol,
    pub pays: PaySchedule,
}

impl WinWays {
    pub fn new(symbol: Symbol, pays: PaySchedule) -> Result<Self> {
        if pays.is_empty() {
            return Err(Error::configuration("ways rule", "empty pay schedule"));
        }
        Ok(Self { symbol, pays })
    }

    pub fn evaluate(&self, window: &Window) -> Result<u64> {
        let mut n = 0usize;
        let mut ways = 1u64;
        for reel in 0..window.reel_count() {
            let in_reel = window
                .slice(reel)?
                .iter()
                .filter(|s| s.pays_as(&self.symbol))
                .count() as u64;
            if in_reel == 0 {
                break;
            }
            ways = ways.saturating_mul(in_reel);
            n += 1;
        }
        if n == 0 {
            return Ok(0);
        }
        Ok(schedule_pay(&self.pays, n, self.symbol.name())?.saturating_mul(ways))
    }
}

/// Fixed-length left-to-right rule: pays a single scalar only when the
/// leading run equals `n` exactly, and not every matched symbol was a wild
/// substitution. The all-wild disqualification keeps a run of pure wilds
/// from being paid by every symbol's rule on top of the wild's own rule.
#[derive(Debug, Clone, Serialize)]
pub struct LeftPay {
    pub symbol: Symbol,
    pub n: usize,
    pub pay: u64,
    pub paylines: Vec<Payline>,
}

impl LeftPay {
    pub fn new(symbol: Symbol, n: usize, pay: u64, paylines: Vec<Payline>) -> Result<Self> {
        if n == 0 {
            return Err(Error::configuration("left-pay rule", "match count must be at least 1"));
        }
        if paylines.is_empty() {
            return Err(Error::configuration("left-pay rule", "no paylines configured"));
        }
        Ok(Self { symbol, n, pay, paylines })
    }

    /// Win multiplier for a single payline.
    pub fn win_on_line(&self, window: &Window, line: &Payline) -> Result<u64> {
        if self.n > line.len() {
            return Err(Error::configuration(
                "left-pay rule",
                format!("requires {} matches on a line of {} reels", self.n, line.len()),
            ));
        }
        let run = leading_run(window, line, &self.symbol)?;
        if run != self.n {
            return Ok(0);
        }
        let all_wild = (0..self.n).try_fold(true, |acc, reel| -> Result<bool> {
            let sym = window.symbol_at(reel, line[reel])?;
            Ok(acc && sym.substitutes_for(&self.symbol))
        })?;
        if all_wild {
            return Ok(0);
        }
        Ok(self.pay)
    }
}

/// Polymorphic win rule. Evaluation dispatches on the variant kind.
#[derive(Debug, Clone, Serialize)]
pub enum WinRule {
    Scatter(ScatterPay),
    Line(LinePay),
    Ways(WinWays),
    Left(LeftPay),
}

impl WinRule {
    /// The rule's paytable target.
    pub fn symbol(&self) -> &Symbol {
        match self {
            WinRule::Scatter(r) => &r.symbol,
            WinRule::Line(r) => &r.symbol,
            WinRule::Ways(r) => &r.symbol,
            WinRule::Left(r) => &r.symbol,
        }
    }

    /// Short display label, e.g. `line(cherry)`.
    pub fn label(&self) -> String {
        match self {
            WinRule::Scatter(r) => format!("scatter({})", r.symbol.name()),
            WinRule::Line(r) => format!("line({})", r.symbol.name()),
            WinRule::Ways(r) => format!("ways({})", r.symbol.name()),
            WinRule::Left(r) => format!("left{}({})", r.n, r.symbol.name()),
        }
    }

    /// Paylines for line-style rules, `None` for whole-window rules.
    pub fn paylines(&self) -> Option<&[Payline]> {
        match self {
            WinRule::Line(r) => Some(&r.paylines),
            WinRule::Left(r) => Some(&r.paylines),
            WinRule::Scatter(_) | WinRule::Ways(_) => None,
        }
    }

    /// Evaluate the rule against a displayed window. Whole-window rules
    /// ignore `active_lines`; line-style rules evaluate their first
    /// `active_lines` paylines and sum the wins.
    pub fn evaluate(&self, window: &Window, active_lines: usize) -> Result<u64> {
        match self {
            WinRule::Scatter(r) => r.evaluate(window),
            WinRule::Ways(r) => r.evaluate(window),
            WinRule::Line(r) => {
                let lines = active_paylines(&r.paylines, active_lines)?;
                let mut total = 0u64;
                for line in lines {
                    total = total.saturating_add(r.win_on_line(window, line)?);
                }
                Ok(total)
            }
            WinRule::Left(r) => {
                let lines = active_paylines(&r.paylines, active_lines)?;
                let mut total = 0u64;
                for line in lines {
                    total = total.saturating_add(r.win_on_line(window, line)?);
                }
                Ok(total)
            }
        }
    }

    /// Check the rule's geometry against a reel set: payline shape and row
    /// bounds. Schedule reachability is checked by the payback engine,
    /// which knows the symbol frequencies.
    pub fn validate_against(&self, reels: &[Reel]) -> Result<()> {
        if let Some(paylines) = self.paylines() {
            for (i, line) in paylines.iter().enumerate() {
                if line.len() != reels.len() {
                    return Err(Error::configuration(
                        "payline",
                        format!("line {} has {} entries for {} reels", i, line.len(), reels.len()),
                    ));
                }
                for (reel, &row) in line.iter().enumerate() {
                    if row >= reels[reel].window() {
                        return Err(Error::configuration(
                            "payline",
                            format!(
                                "line {} reads row {} on reel {} with a window of {}",
                                i,
                                row,
                                reel,
                                reels[reel].window()
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The first `active` paylines of a rule, or an error if the player has
/// activated more lines than the rule defines.
pub(crate) fn active_paylines(paylines: &[Payline], active: usize) -> Result<&[Payline]> {
    if active == 0 {
        return Err(Error::InvalidInput("at least one payline must be active".to_string()));
    }
    paylines.get(..active).ok_or_else(|| {
        Error::InvalidInput(format!("{} active lines but only {} configured", active, paylines.len()))
    })
}

/// Length of the leading run of symbols paying as `target` along `line`,
/// scanning from reel 0 and stopping at the first non-match.
fn leading_run(window: &Window, line: &Payline, target: &Symbol) -> Result<usize> {
    let mut n = 0usize;
    for (reel, &row) in line.iter().enumerate() {
        if !window.symbol_at(reel, row)?.pays_as(target) {
            break;
        }
        n += 1;
    }
    Ok(n)
}

/// Index the schedule at `count` matches, failing fast when the schedule
/// is too short for a count that was actually reached.
fn schedule_pay(pays: &PaySchedule, count: usize, symbol: &str) -> Result<u64> {
    pays.get(count - 1).copied().ok_or_else(|| {
        Error::configuration(
            "pay schedule",
            format!("{} matched {} times but the schedule has {} entries", symbol, count, pays.len()),
        )
    })
}
