//! BitSlots - reel slot paytable evaluation and certifiable RTP
//!
//! The crate models a reel-based slot machine's payout logic and the exact
//! combinatorics that certify its long-run fairness:
//! - gaming: symbols, reels, win rules, payback engine, spin orchestration
//! - rng: stop selection (continuously-cycling secure RNG, deterministic
//!   verification RNG)
//! - meters: credit accounting and cumulative counters
//! - config: the serde game-definition format shared by runtime and
//!   offline certification
//!
//! The same matching and slicing semantics drive the per-spin evaluators
//! and the offline payback calculator, so a simulated long-run average
//! converges to the theoretical return the engine reports.

pub mod config; // Game definition format and validation
pub mod error;
pub mod gaming; // Paytable model, evaluators, payback engine
pub mod meters; // Credit accounting collaborator
pub mod rng; // Stop selection collaborator

// Re-export commonly used types for easy access
pub use error::{Error, Result};
pub use gaming::{
    target_counts, Game, LeftPay, LinePay, LineWinPolicy, PaybackDiagnostic, PaybackEngine,
    PaybackFigures, Payline, PaySchedule, Reel, ReelCounts, RtpReport, RulePayback, RuleWin,
    ScatterPay, SpinEvent, SpinOutcome, Symbol, Window, WinRule, WinWays, DEFAULT_WINDOW,
};
pub use meters::{CreditMeters, CreditSink, MeterEvent, MeterSnapshot};
pub use rng::{CyclingRng, DeterministicRng, StopSource};
pub use config::{GameConfig, GameDefinition, ReelSpec, RuleKind, RuleSpec, SymbolSpec};
