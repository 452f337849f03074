//! Reel symbols and wild-aware matching
//!
//! Symbols are immutable values created at paytable-definition time. Two
//! relations live here and they are not the same thing:
//!
//! - [`Symbol::matches`] is the symmetric equality used wherever two
//!   displayed symbols are compared: either side being wild can bridge the
//!   match, minus its exclusion list.
//! - [`Symbol::pays_as`] is the directional relation used by every win
//!   evaluator and by the payback engine's frequency derivation: a
//!   displayed symbol counts toward a paytable target if it is the target
//!   or a wild that substitutes for it. A wild *target* does not absorb
//!   unrelated display symbols. For non-wild targets the two relations
//!   coincide.

use serde::Serialize;
use std::sync::Arc;

/// A reel symbol: identity plus wild-substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol {
    name: Arc<str>,
    wild: bool,
    wild_excludes: Arc<[Arc<str>]>,
}

impl Symbol {
    /// Create a plain (non-wild) symbol.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            wild: false,
            wild_excludes: Arc::from(Vec::new()),
        }
    }

    /// Create a wild symbol that substitutes for every symbol except the
    /// named exclusions.
    pub fn wild<I, S>(name: impl Into<Arc<str>>, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            name: name.into(),
            wild: true,
            wild_excludes: excludes.into_iter().map(Into::into).collect::<Vec<_>>().into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_wild(&self) -> bool {
        self.wild
    }

    /// True if this wild refuses to substitute for `name`.
    pub fn excludes(&self, name: &str) -> bool {
        self.wild_excludes.iter().any(|e| e.as_ref() == name)
    }

    /// Symmetric wild-aware equality: names agree, or either side is a
    /// wild that does not exclude the other.
    pub fn matches(&self, other: &Symbol) -> bool {
        if self.name == other.name {
            return true;
        }
        (self.wild && !self.excludes(other.name())) || (other.wild && !other.excludes(self.name()))
    }

    /// Directional pay counting: does this displayed symbol count toward
    /// `target` on a pay schedule?
    pub fn pays_as(&self, target: &Symbol) -> bool {
        self.name == target.name || (self.wild && !self.excludes(target.name()))
    }

    /// True when this symbol counts toward `target` only through wild
    /// substitution, not by name. Used for the all-wild line
    /// disqualification.
    pub fn substitutes_for(&self, target: &Symbol) -> bool {
        self.name != target.name && self.wild && !self.excludes(target.name())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
