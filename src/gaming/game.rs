//! Spin orchestration
//!
//! A [`Game`] ties a fixed configuration (reels plus rule set) to two
//! external collaborators: a stop-selection source and a credit-meter
//! sink. One spin runs to completion synchronously — wager debit, stop
//! draws, window build, rule evaluation, win credit — so no partial
//! debit/credit is ever visible mid-spin. The reels and rules are
//! immutable after construction and safe to share across concurrent spin
//! executions; only the meter sink serializes mutation.
//!
//! Per-spin observability is a structured [`SpinEvent`] on an optional
//! channel, never embedded console output.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gaming::payback::{PaybackEngine, RtpReport};
use crate::gaming::reels::{Reel, Window};
use crate::gaming::rules::{active_paylines, LineWinPolicy, Payline, WinRule};
use crate::meters::CreditSink;
use crate::rng::StopSource;

/// Win credited to one rule within a spin, in credits (not multiplier).
#[derive(Debug, Clone, Serialize)]
pub struct RuleWin {
    pub rule: String,
    pub amount: u64,
}

/// The full result of one spin.
#[derive(Debug, Clone, Serialize)]
pub struct SpinOutcome {
    /// Stop index drawn for each reel.
    pub stops: Vec<usize>,
    /// The displayed symbols.
    pub window: Window,
    /// Credits wagered (active lines × line bet).
    pub wager: u64,
    /// Credits the sink actually debited; its policy may clamp at zero.
    pub debited: u64,
    /// Total credits won.
    pub win: u64,
    /// Per-rule breakdown of the win.
    pub rule_wins: Vec<RuleWin>,
}

/// Structured per-spin event for observers.
#[derive(Debug, Clone, Serialize)]
pub struct SpinEvent {
    pub stops: Vec<usize>,
    pub wager: u64,
    pub win: u64,
}

/// A configured slot game bound to its RNG and meter collaborators.
pub struct Game<S: StopSource, M: CreditSink> {
    reels: Vec<Reel>,
    rules: Vec<WinRule>,
    line_policy: LineWinPolicy,
    rng: S,
    meters: Arc<M>,
    events: Option<mpsc::UnboundedSender<SpinEvent>>,
}

impl<S: StopSource, M: CreditSink> Game<S, M> {
    /// Build a game, validating every rule's geometry against the reels.
    pub fn new(
        reels: Vec<Reel>,
        rules: Vec<WinRule>,
        line_policy: LineWinPolicy,
        rng: S,
        meters: Arc<M>,
    ) -> Result<Self> {
        if reels.is_empty() {
            return Err(Error::configuration("game", "no reels"));
        }
        for rule in &rules {
            rule.validate_against(&reels)?;
        }
        Ok(Self {
            reels,
            rules,
            line_policy,
            rng,
            meters,
            events: None,
        })
    }

    /// Attach a structured spin-event channel.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SpinEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn rules(&self) -> &[WinRule] {
        &self.rules
    }

    pub fn meters(&self) -> &M {
        &self.meters
    }

    /// Run one spin: debit the wager, draw one fresh stop per reel, build
    /// the window through [`Reel::slice`], evaluate every rule, credit the
    /// win.
    pub fn spin(&mut self, active_lines: usize, line_bet: u64) -> Result<SpinOutcome> {
        if active_lines == 0 {
            return Err(Error::InvalidInput("at least one payline must be active".to_string()));
        }
        if line_bet == 0 {
            return Err(Error::InvalidInput("line bet must be at least 1 credit".to_string()));
        }
        let wager = (active_lines as u64)
            .checked_mul(line_bet)
            .ok_or_else(|| Error::ArithmeticOverflow("wager".to_string()))?;
        let debited = self.meters.debit_credits(wager)?;

        let mut stops = Vec::with_capacity(self.reels.len());
        let mut slices = Vec::with_capacity(self.reels.len());
        for reel in &self.reels {
            let stop = self.rng.draw_uniform_int(0, reel.len() as u64) as usize;
            stops.push(stop);
            slices.push(reel.slice(stop)?);
        }
        let window = Window::new(slices);

        let multipliers = self.evaluate_rules(&window, active_lines)?;
        let total: u64 = multipliers.iter().try_fold(0u64, |acc, m| {
            acc.checked_add(*m).ok_or_else(|| Error::ArithmeticOverflow("win multiplier".to_string()))
        })?;
        let win = total
            .checked_mul(line_bet)
            .ok_or_else(|| Error::ArithmeticOverflow("win".to_string()))?;
        if win > 0 {
            self.meters.add_credits(win);
        }

        let rule_wins = self
            .rules
            .iter()
            .zip(&multipliers)
            .filter(|(_, &m)| m > 0)
            .map(|(rule, &m)| RuleWin {
                rule: rule.label(),
                amount: m * line_bet,
            })
            .collect();

        debug!(?stops, wager, win, "spin resolved");
        if let Some(events) = &self.events {
            let _ = events.send(SpinEvent {
                stops: stops.clone(),
                wager,
                win,
            });
        }

        Ok(SpinOutcome {
            stops,
            window,
            wager,
            debited,
            win,
            rule_wins,
        })
    }

    /// Theoretical RTP of this exact configuration, from the payback
    /// engine over the same reels and rules the spin path uses.
    pub fn theoretical_rtp(&self, active_lines: usize) -> Result<RtpReport> {
        PaybackEngine::new().compute_rtp(&self.reels, &self.rules, active_lines)
    }

    /// Cash out: clear the credit meter, returning the credits removed.
    pub fn cash_out(&self) -> u64 {
        self.meters.clear()
    }

    /// Per-rule win multipliers for one window. Whole-window rules are
    /// always additive; line-style rules combine per payline according to
    /// the configured policy.
    fn evaluate_rules(&self, window: &Window, active_lines: usize) -> Result<Vec<u64>> {
        let mut multipliers = vec![0u64; self.rules.len()];

        for (i, rule) in self.rules.iter().enumerate() {
            match rule {
                WinRule::Scatter(r) => multipliers[i] = r.evaluate(window)?,
                WinRule::Ways(r) => multipliers[i] = r.evaluate(window)?,
                WinRule::Line(_) | WinRule::Left(_) => {}
            }
        }

        match self.line_policy {
            LineWinPolicy::SumAll => {
                for (i, rule) in self.rules.iter().enumerate() {
                    if matches!(rule, WinRule::Line(_) | WinRule::Left(_)) {
                        multipliers[i] = rule.evaluate(window, active_lines)?;
                    }
                }
            }
            LineWinPolicy::HighestOnly => {
                // Per payline, keep only the best-paying line rule.
                let mut best: HashMap<&Payline, (u64, usize)> = HashMap::new();
                for (i, rule) in self.rules.iter().enumerate() {
                    let lines = match rule {
                        WinRule::Line(r) => active_paylines(&r.paylines, active_lines)?,
                        WinRule::Left(r) => active_paylines(&r.paylines, active_lines)?,
                        _ => continue,
                    };
                    for line in lines {
                        let win = match rule {
                            WinRule::Line(r) => r.win_on_line(window, line)?,
                            WinRule::Left(r) => r.win_on_line(window, line)?,
                            _ => unreachable!(),
                        };
                        let entry = best.entry(line).or_insert((0, i));
                        if win > entry.0 {
                            *entry = (win, i);
                        }
                    }
                }
                for (win, i) in best.values() {
                    multipliers[*i] += win;
                }
            }
        }

        Ok(multipliers)
    }
}
