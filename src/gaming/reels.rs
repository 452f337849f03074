//! Reel strips and the visible window
//!
//! A [`Reel`] is an ordered physical strip plus a window height. It is
//! constructed once per game configuration and read-only afterwards.
//! [`Reel::slice`] is the sole access path to displayed content: the
//! runtime spin path and the offline payback enumeration both go through
//! it, which is what makes the two agree on wraparound semantics.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::gaming::symbols::Symbol;

/// Default visible row count.
pub const DEFAULT_WINDOW: usize = 3;

/// An ordered strip of symbols with a visible window height.
#[derive(Debug, Clone, Serialize)]
pub struct Reel {
    symbols: Vec<Symbol>,
    window: usize,
}

impl Reel {
    /// Create a reel with the default window of 3 rows.
    pub fn new(symbols: Vec<Symbol>) -> Result<Self> {
        Self::with_window(symbols, DEFAULT_WINDOW)
    }

    /// Create a reel with an explicit window height. The strip must be at
    /// least as long as the window.
    pub fn with_window(symbols: Vec<Symbol>, window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::configuration("reel", "window must be at least 1 row"));
        }
        if symbols.len() < window {
            return Err(Error::configuration(
                "reel",
                format!("strip of {} symbols is shorter than window of {}", symbols.len(), window),
            ));
        }
        Ok(Self { symbols, window })
    }

    /// Number of physical stops on the strip.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Visible row count.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The full physical strip.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The `window` consecutive symbols visible when the strip stops at
    /// `stop`, wrapping past the end of the strip back to index 0.
    pub fn slice(&self, stop: usize) -> Result<Vec<Symbol>> {
        let len = self.symbols.len();
        if stop >= len {
            return Err(Error::IndexOutOfBounds(format!(
                "stop {} on a reel of {} symbols",
                stop, len
            )));
        }
        Ok((0..self.window)
            .map(|row| self.symbols[(stop + row) % len].clone())
            .collect())
    }
}

/// The displayed symbols of one spin: one slice per reel. Built fresh for
/// every evaluation and dropped afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Window {
    reels: Vec<Vec<Symbol>>,
}

impl Window {
    pub fn new(reels: Vec<Vec<Symbol>>) -> Self {
        Self { reels }
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// The displayed slice of reel `reel`.
    pub fn slice(&self, reel: usize) -> Result<&[Symbol]> {
        self.reels
            .get(reel)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::IndexOutOfBounds(format!("reel {} in a window of {}", reel, self.reels.len())))
    }

    /// The displayed symbol at (`reel`, `row`).
    pub fn symbol_at(&self, reel: usize, row: usize) -> Result<&Symbol> {
        let slice = self.slice(reel)?;
        slice.get(row).ok_or_else(|| {
            Error::IndexOutOfBounds(format!("row {} in a window of {} rows", row, slice.len()))
        })
    }

    /// Iterate every displayed symbol across all reels.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.reels.iter().flatten()
    }
}
