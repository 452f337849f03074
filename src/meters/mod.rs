//! Credit accounting and cumulative meters
//!
//! The spin orchestrator reports wager-debit and win-credit events to a
//! [`CreditSink`]; the sink owns the accounting policy. The reference
//! [`CreditMeters`] keeps the catalogue a slot accounting host reads:
//! current credits, coin-in (total wagered), coin-out (total paytable
//! win), games played, and games won. Host wire encodings (BCD widths,
//! checksums, polling) are out of scope here.
//!
//! State sits behind one mutex so a spin's debit and credit are atomic
//! with respect to any concurrent reader.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;

/// Point-in-time copy of the cumulative meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MeterSnapshot {
    /// Credits currently on the machine.
    pub credits: u64,
    /// Total credits wagered.
    pub coin_in: u64,
    /// Total credits won from the paytable.
    pub coin_out: u64,
    /// Games played.
    pub games_played: u64,
    /// Games with a non-zero win.
    pub games_won: u64,
}

/// Meter mutation events for observers.
#[derive(Debug, Clone, Serialize)]
pub enum MeterEvent {
    CreditsInserted { amount: u64, balance: u64 },
    WagerDebited { requested: u64, debited: u64, balance: u64 },
    WinCredited { amount: u64, balance: u64 },
    CashedOut { amount: u64 },
}

/// Receiver of wager-debit and win-credit events.
///
/// `debit_credits` reports the full requested delta; whether a shortfall
/// clamps, rejects, or goes negative is this collaborator's policy. The
/// reference implementation clamps at zero and never rejects; a stricter
/// sink may return [`crate::error::Error::InsufficientFunds`] instead.
pub trait CreditSink: Send + Sync {
    /// Credit a win. Returns the new balance.
    fn add_credits(&self, amount: u64) -> u64;
    /// Debit a wager. Returns the credits actually removed.
    fn debit_credits(&self, amount: u64) -> Result<u64>;
    /// Cash out: remove and return all current credits.
    fn clear(&self) -> u64;
    /// Current cumulative meters.
    fn snapshot(&self) -> MeterSnapshot;
}

/// Reference credit meters with the standard counter catalogue.
pub struct CreditMeters {
    state: Mutex<MeterSnapshot>,
    events: Option<mpsc::UnboundedSender<MeterEvent>>,
}

impl CreditMeters {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MeterSnapshot::default()),
            events: None,
        }
    }

    /// Attach a meter-event channel.
    pub fn with_events(events: mpsc::UnboundedSender<MeterEvent>) -> Self {
        Self {
            state: Mutex::new(MeterSnapshot::default()),
            events: Some(events),
        }
    }

    /// Player inserts money. Moves only the credit meter; wins are
    /// credited through [`CreditSink::add_credits`].
    pub fn insert_credits(&self, amount: u64) -> u64 {
        let balance = {
            let mut state = self.state.lock().expect("meters poisoned");
            state.credits = state.credits.saturating_add(amount);
            state.credits
        };
        debug!(amount, balance, "credits inserted");
        self.emit(MeterEvent::CreditsInserted { amount, balance });
        balance
    }

    fn emit(&self, event: MeterEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

impl Default for CreditMeters {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditSink for CreditMeters {
    fn add_credits(&self, amount: u64) -> u64 {
        let balance = {
            let mut state = self.state.lock().expect("meters poisoned");
            state.credits = state.credits.saturating_add(amount);
            state.coin_out = state.coin_out.saturating_add(amount);
            if amount > 0 {
                state.games_won += 1;
            }
            state.credits
        };
        debug!(amount, balance, "win credited");
        self.emit(MeterEvent::WinCredited { amount, balance });
        balance
    }

    fn debit_credits(&self, amount: u64) -> Result<u64> {
        let (debited, balance) = {
            let mut state = self.state.lock().expect("meters poisoned");
            // One wager debit per game; the full requested delta lands on
            // coin-in even when the balance clamps at zero.
            let debited = state.credits.min(amount);
            state.credits -= debited;
            state.coin_in = state.coin_in.saturating_add(amount);
            state.games_played += 1;
            (debited, state.credits)
        };
        debug!(requested = amount, debited, balance, "wager debited");
        self.emit(MeterEvent::WagerDebited {
            requested: amount,
            debited,
            balance,
        });
        Ok(debited)
    }

    fn clear(&self) -> u64 {
        let amount = {
            let mut state = self.state.lock().expect("meters poisoned");
            std::mem::take(&mut state.credits)
        };
        debug!(amount, "cashed out");
        self.emit(MeterEvent::CashedOut { amount });
        amount
    }

    fn snapshot(&self) -> MeterSnapshot {
        *self.state.lock().expect("meters poisoned")
    }
}
