//! Issuance tokens for ordering operations.
//!
//! Several operations against the same entity may be in flight at once and
//! complete in any order. Each operation draws an [`OpToken`] when it is
//! issued; the cache compares tokens when results are applied, so the
//! operation issued last wins regardless of completion order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonic token identifying when an operation was issued.
///
/// Tokens from the same [`Sequencer`] are totally ordered. Token 0 is never
/// issued and sorts before every issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpToken(u64);

impl OpToken {
    /// The token that precedes every issued token.
    pub const ZERO: OpToken = OpToken(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// True if `self` was issued strictly before `other`.
    pub fn issued_before(&self, other: &OpToken) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for OpToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues strictly increasing [`OpToken`]s.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    counter: u64,
}

impl Sequencer {
    /// Create a sequencer; the first issued token is `#1`.
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Issue the next token.
    pub fn issue(&mut self) -> OpToken {
        self.counter += 1;
        OpToken(self.counter)
    }

    /// The most recently issued token, or [`OpToken::ZERO`].
    pub fn last(&self) -> OpToken {
        OpToken(self.counter)
    }

    /// Advance past a token seen elsewhere so later issues sort after it.
    pub fn observe(&mut self, token: OpToken) {
        self.counter = self.counter.max(token.0);
    }
}
