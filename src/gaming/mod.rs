//! Gaming core for BitSlots
//!
//! This module holds the whole paytable model and its evaluation:
//!
//! - Symbols with wild substitution and exclusion lists
//! - Reel strips and the wraparound display window
//! - The four win-rule evaluators (scatter, line, ways, left-pay)
//! - The exact combinatorial payback engine
//! - The spin orchestrator tying it to the RNG and meter collaborators

pub mod game;
pub mod payback;
pub mod reels;
pub mod rules;
pub mod symbols;

pub use symbols::Symbol;

pub use reels::{Reel, Window, DEFAULT_WINDOW};

pub use rules::{LeftPay, LinePay, LineWinPolicy, Payline, PaySchedule, ScatterPay, WinRule, WinWays};

pub use payback::{
    target_counts, PaybackDiagnostic, PaybackEngine, PaybackFigures, ReelCounts, RtpReport, RulePayback,
};

pub use game::{Game, RuleWin, SpinEvent, SpinOutcome};
