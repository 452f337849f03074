//! Exact payback math and the theoretical-return engine
//!
//! Every probability here is an exact enumeration, never a sampled
//! estimate: per-rule win numerators are accumulated as `u128` integers
//! over the exact denominator `Π reel_len`, and divided into a float once
//! at the end. That is what lets a certification report state theoretical
//! return rather than simulated return.
//!
//! Frequencies are derived with the same `pays_as` predicate the runtime
//! evaluators use, so the engine's expectation and the spin path's
//! long-run average are the same quantity by construction.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::gaming::reels::Reel;
use crate::gaming::rules::{LeftPay, LinePay, ScatterPay, WinRule, WinWays};
use crate::gaming::symbols::Symbol;

/// Per-reel occurrence counts for one paytable target.
#[derive(Debug, Clone, Copy)]
pub struct ReelCounts {
    /// Strip positions that pay as the target (direct or wild).
    pub paying: u64,
    /// Strip positions that pay only through wild substitution.
    pub substituting: u64,
    /// Physical strip length.
    pub length: u64,
    /// Visible window height.
    pub window: u64,
}

/// Occurrence counts of `target` on each reel, wild contributions included.
pub fn target_counts(reels: &[Reel], target: &Symbol) -> Vec<ReelCounts> {
    reels
        .iter()
        .map(|reel| {
            let paying = reel.symbols().iter().filter(|s| s.pays_as(target)).count() as u64;
            let substituting = reel.symbols().iter().filter(|s| s.substitutes_for(target)).count() as u64;
            ReelCounts {
                paying,
                substituting,
                length: reel.len() as u64,
                window: reel.window() as u64,
            }
        })
        .collect()
}

/// Probability and expected multiplier of one rule.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaybackFigures {
    /// Probability that the rule's winning condition pays. For line-style
    /// rules this is per payline.
    pub hit_probability: f64,
    /// Expected credit multiplier. Per payline for line-style rules, per
    /// spin for whole-window rules.
    pub expected_return: f64,
}

impl ScatterPay {
    /// Exact scatter payback: every reel contributes `paying × window`
    /// winning stops; all `2^R` winning/losing reel subsets are
    /// enumerated and grouped by the number of scattering reels.
    pub fn payback(&self, counts: &[ReelCounts]) -> Result<PaybackFigures> {
        let r = counts.len();
        if r == 0 || r > 24 {
            return Err(Error::configuration("scatter payback", format!("{} reels", r)));
        }

        let mut winning = Vec::with_capacity(r);
        let mut losing = Vec::with_capacity(r);
        for (i, c) in counts.iter().enumerate() {
            let w = c.paying * c.window;
            if w > c.length {
                // Two occurrences inside one window distance break the
                // stop-counting model; that is a strip layout error.
                return Err(Error::configuration(
                    "scatter payback",
                    format!(
                        "{} appears within window distance of itself on reel {}",
                        self.symbol.name(),
                        i
                    ),
                ));
            }
            winning.push(w as u128);
            losing.push((c.length - w) as u128);
        }

        let total: u128 = counts.iter().map(|c| c.length as u128).product();
        let mut buckets = vec![0u128; r + 1];
        for mask in 0u32..(1u32 << r) {
            let mut product = 1u128;
            for (i, (w, l)) in winning.iter().zip(&losing).enumerate() {
                product *= if mask & (1 << i) != 0 { *w } else { *l };
            }
            buckets[mask.count_ones() as usize] += product;
        }

        let mut expected_num = 0u128;
        let mut hit_num = 0u128;
        for (k, &weight) in buckets.iter().enumerate().skip(1) {
            if weight == 0 {
                continue;
            }
            let pay = schedule_entry(&self.pays, k, self.symbol.name())?;
            expected_num += weight * pay as u128;
            if pay > 0 {
                hit_num += weight;
            }
        }

        Ok(PaybackFigures {
            hit_probability: ratio(hit_num, total),
            expected_return: ratio(expected_num, total),
        })
    }
}

impl LinePay {
    /// Exact per-line payback: with `A(k) = Π_{r<k} paying_r / len_r`,
    /// the run length is exactly `n` with probability `A(n) − A(n+1)`.
    pub fn payback(&self, counts: &[ReelCounts]) -> Result<PaybackFigures> {
        let r = counts.len();
        let total = denominator(counts);
        let run_prefix = prefix_products(counts, |c| c.paying);
        let tail = tail_products(counts);

        let mut expected_num = 0u128;
        let mut hit_num = 0u128;
        for n in 1..=r {
            let at_least_n = run_prefix[n] * tail[n];
            let at_least_next = if n < r { run_prefix[n + 1] * tail[n + 1] } else { 0 };
            let exactly_n = at_least_n - at_least_next;
            if exactly_n == 0 {
                continue;
            }
            let pay = schedule_entry(&self.pays, n, self.symbol.name())?;
            expected_num += exactly_n * pay as u128;
            if pay > 0 {
                hit_num += exactly_n;
            }
        }

        Ok(PaybackFigures {
            hit_probability: ratio(hit_num, total),
            expected_return: ratio(expected_num, total),
        })
    }
}

impl LeftPay {
    /// Exact per-line payback for "exactly n, not all wild":
    ///
    /// ```text
    /// P(win) = (Π_{r<n} c_r − Π_{r<n} w_r) · (L_n − c_n) / Π_{r≤n} L_r   for n < R
    ///        = (Π_{r<R} c_r − Π_{r<R} w_r) / Π_{r<R} L_r                 for n = R
    /// ```
    ///
    /// with `c_r` the paying and `w_r` the substituting counts. Subtracting
    /// the substitute-only product removes precisely the lines whose every
    /// match is a wild substitution; a wild target's own symbols are direct
    /// matches and never subtracted.
    pub fn payback(&self, counts: &[ReelCounts]) -> Result<PaybackFigures> {
        let r = counts.len();
        if self.n > r {
            return Err(Error::configuration(
                "left-pay rule",
                format!("requires {} matches across {} reels", self.n, r),
            ));
        }

        let total = denominator(counts);
        let run_prefix = prefix_products(counts, |c| c.paying);
        let wild_prefix = prefix_products(counts, |c| c.substituting);
        let tail = tail_products(counts);

        let mixed_runs = run_prefix[self.n] - wild_prefix[self.n];
        let win_num = if self.n < r {
            let blocked = (counts[self.n].length - counts[self.n].paying) as u128;
            mixed_runs * blocked * tail[self.n + 1]
        } else {
            mixed_runs
        };

        let probability = ratio(win_num, total);
        Ok(PaybackFigures {
            hit_probability: probability,
            expected_return: probability * self.pay as f64,
        })
    }
}

impl WinWays {
    /// Exact ways payback by per-reel stop enumeration through
    /// [`Reel::slice`] — the same access path the runtime uses. For each
    /// reel, tally the displayed-occurrence total and the zero-occurrence
    /// stop count; adjacency runs then factor across independent reels.
    pub fn payback(&self, reels: &[Reel]) -> Result<PaybackFigures> {
        let r = reels.len();
        if r == 0 {
            return Err(Error::configuration("ways payback", "no reels"));
        }

        let mut occurrence_sum = Vec::with_capacity(r);
        let mut zero_stops = Vec::with_capacity(r);
        let mut showing_stops = Vec::with_capacity(r);
        for reel in reels {
            let mut sum = 0u128;
            let mut zeros = 0u128;
            for stop in 0..reel.len() {
                let in_view = reel.slice(stop)?.iter().filter(|s| s.pays_as(&self.symbol)).count();
                sum += in_view as u128;
                if in_view == 0 {
                    zeros += 1;
                }
            }
            occurrence_sum.push(sum);
            zero_stops.push(zeros);
            showing_stops.push(reel.len() as u128 - zeros);
        }

        let total: u128 = reels.iter().map(|reel| reel.len() as u128).product();
        let tail: Vec<u128> = {
            let mut t = vec![1u128; r + 1];
            for i in (0..r).rev() {
                t[i] = t[i + 1] * reels[i].len() as u128;
            }
            t
        };

        let mut expected_num = 0u128;
        let mut hit_num = 0u128;
        let mut ways_product = 1u128;
        let mut showing_product = 1u128;
        for n in 1..=r {
            ways_product *= occurrence_sum[n - 1];
            showing_product *= showing_stops[n - 1];
            let boundary = if n < r { zero_stops[n] * tail[n + 1] } else { 1 };
            let occupancy = showing_product * boundary;
            if occupancy == 0 {
                continue;
            }
            let pay = schedule_entry(&self.pays, n, self.symbol.name())?;
            expected_num += ways_product * boundary * pay as u128;
            if pay > 0 {
                hit_num += occupancy;
            }
        }

        Ok(PaybackFigures {
            hit_probability: ratio(hit_num, total),
            expected_return: ratio(expected_num, total),
        })
    }
}

/// Non-fatal findings from a payback computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PaybackDiagnostic {
    /// The rule's target never pays, directly or via wild, on a reel the
    /// rule needs. The rule contributes zero; this may be an intentional
    /// configuration probe, so it is a diagnostic rather than an error.
    UnreachableSymbol { symbol: String, reel: usize },
}

/// Payback of a single rule within a report.
#[derive(Debug, Clone, Serialize)]
pub struct RulePayback {
    pub label: String,
    /// Probability the rule pays (per payline for line-style rules).
    pub hit_probability: f64,
    /// Expected credit multiplier (per payline for line-style rules).
    pub expected_return: f64,
    /// Contribution to total RTP as a fraction of total wager.
    pub rtp_contribution: f64,
    pub diagnostic: Option<PaybackDiagnostic>,
}

/// A full theoretical-return report for one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RtpReport {
    pub active_lines: usize,
    pub rules: Vec<RulePayback>,
    /// Long-run fraction of total wager returned as wins.
    pub total_rtp: f64,
}

/// Exact theoretical-return calculator over reel strips and a rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaybackEngine;

impl PaybackEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute per-rule paybacks and the aggregate theoretical RTP for a
    /// wager of `active_lines` line bets per spin.
    ///
    /// Line-style wins scale with the number of active lines while the
    /// wager does, so their per-line expectation is their contribution;
    /// whole-window wins (scatter, ways) are paid once per spin and their
    /// expectation is divided across the `active_lines` wagered.
    pub fn compute_rtp(&self, reels: &[Reel], rules: &[WinRule], active_lines: usize) -> Result<RtpReport> {
        if reels.is_empty() {
            return Err(Error::configuration("payback engine", "no reels"));
        }
        if active_lines == 0 {
            return Err(Error::InvalidInput("at least one payline must be active".to_string()));
        }
        for rule in rules {
            rule.validate_against(reels)?;
            if let Some(paylines) = rule.paylines() {
                if active_lines > paylines.len() {
                    return Err(Error::InvalidInput(format!(
                        "{} active lines but {} configures only {}",
                        active_lines,
                        rule.label(),
                        paylines.len()
                    )));
                }
            }
        }

        let mut counts_by_symbol: HashMap<String, Vec<ReelCounts>> = HashMap::new();
        let mut reports = Vec::with_capacity(rules.len());
        for rule in rules {
            let counts = counts_by_symbol
                .entry(rule.symbol().name().to_string())
                .or_insert_with(|| target_counts(reels, rule.symbol()))
                .clone();

            if let Some(reel) = unreachable_on(rule, &counts) {
                reports.push(RulePayback {
                    label: rule.label(),
                    hit_probability: 0.0,
                    expected_return: 0.0,
                    rtp_contribution: 0.0,
                    diagnostic: Some(PaybackDiagnostic::UnreachableSymbol {
                        symbol: rule.symbol().name().to_string(),
                        reel,
                    }),
                });
                continue;
            }

            let figures = match rule {
                WinRule::Scatter(r) => r.payback(&counts)?,
                WinRule::Line(r) => r.payback(&counts)?,
                WinRule::Left(r) => r.payback(&counts)?,
                WinRule::Ways(r) => r.payback(reels)?,
            };
            let rtp_contribution = match rule {
                WinRule::Line(_) | WinRule::Left(_) => figures.expected_return,
                WinRule::Scatter(_) | WinRule::Ways(_) => figures.expected_return / active_lines as f64,
            };
            reports.push(RulePayback {
                label: rule.label(),
                hit_probability: figures.hit_probability,
                expected_return: figures.expected_return,
                rtp_contribution,
                diagnostic: None,
            });
        }

        let total_rtp = reports.iter().map(|r| r.rtp_contribution).sum();
        Ok(RtpReport {
            active_lines,
            rules: reports,
            total_rtp,
        })
    }
}

/// First reel the rule needs that never shows its target, if any.
fn unreachable_on(rule: &WinRule, counts: &[ReelCounts]) -> Option<usize> {
    match rule {
        // A scatter or ways win needs the symbol somewhere; ways and line
        // runs start at reel 0.
        WinRule::Scatter(_) => {
            if counts.iter().all(|c| c.paying == 0) {
                Some(0)
            } else {
                None
            }
        }
        WinRule::Line(_) | WinRule::Ways(_) => (counts.first()?.paying == 0).then_some(0),
        WinRule::Left(r) => counts.iter().take(r.n).position(|c| c.paying == 0),
    }
}

fn denominator(counts: &[ReelCounts]) -> u128 {
    counts.iter().map(|c| c.length as u128).product()
}

/// `out[k] = Π_{r<k} f(counts[r])`, with `out[0] = 1`.
fn prefix_products(counts: &[ReelCounts], f: impl Fn(&ReelCounts) -> u64) -> Vec<u128> {
    let mut out = vec![1u128; counts.len() + 1];
    for (i, c) in counts.iter().enumerate() {
        out[i + 1] = out[i] * f(c) as u128;
    }
    out
}

/// `out[k] = Π_{r≥k} length_r`, with `out[len] = 1`.
fn tail_products(counts: &[ReelCounts]) -> Vec<u128> {
    let mut out = vec![1u128; counts.len() + 1];
    for i in (0..counts.len()).rev() {
        out[i] = out[i + 1] * counts[i].length as u128;
    }
    out
}

fn ratio(numerator: u128, denominator: u128) -> f64 {
    numerator as f64 / denominator as f64
}

/// Index the schedule for a reachable match count, failing fast when the
/// schedule is too short to cover it.
fn schedule_entry(pays: &[u64], count: usize, symbol: &str) -> Result<u64> {
    pays.get(count - 1).copied().ok_or_else(|| {
        Error::configuration(
            "pay schedule",
            format!("{} can match {} times but the schedule has {} entries", symbol, count, pays.len()),
        )
    })
}
