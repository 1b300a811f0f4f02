//! Pattern matching under Simon's k-congruence.
//! Two words are k-congruent if they have the same subsequences of length at most k. Given a text, a
//! pattern and k, the matchers report every window of the text that is k-congruent to the pattern,
//! grouped into triples of start interval, end interval and offset.

use std::fmt;

use serde::Serialize;

pub mod alphabet;
pub mod common;
pub mod error;
pub mod experiment;
pub mod naive;
pub mod shortlex;
pub mod simon_match;

pub use error::{Error, Result};

/// Inclusive range of positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Interval {
  pub start: usize,
  pub end: usize,
}

impl Interval {
  pub fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  pub fn is_empty(&self) -> bool {
    self.start > self.end
  }

  pub fn len(&self) -> usize {
    if self.is_empty() { 0 } else { self.end - self.start + 1 }
  }
}

impl fmt::Display for Interval {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {}]", self.start, self.end)
  }
}

/// A group of matching windows.
/// Positions lie between characters, position i is right before the i-th character of the slice
/// starting at `offset`. Every `f` in `left` and `b` in `right` with `f < b` is a match
/// `text[offset+f..offset+b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Occurrence {
  pub left: Interval,
  pub right: Interval,
  pub offset: usize,
}

impl Occurrence {
  pub fn new(left: Interval, right: Interval, offset: usize) -> Self {
    Self { left, right, offset }
  }

  // the windows as absolute half-open character ranges
  pub fn windows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
    (self.left.start..=self.left.end).flat_map(move |f| {
      (self.right.start.max(f + 1)..=self.right.end).map(move |b| (self.offset + f, self.offset + b))
    })
  }

  // number of non-empty windows
  pub fn count(&self) -> usize {
    (self.left.start..=self.left.end)
      .map(|f| Interval::new(self.right.start.max(f + 1), self.right.end).len())
      .sum()
  }
}

impl fmt::Display for Occurrence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {}, {})", self.left, self.right, self.offset)
  }
}

pub trait CongruenceMatcher {
  // all windows of `text` that are k-congruent to `pattern`
  // fails for an empty pattern or a negative k
  fn find(&self, text: &str, pattern: &str, k: i64) -> Result<Vec<Occurrence>>;

  fn count(&self, text: &str, pattern: &str, k: i64) -> Result<usize> {
    Ok(self.find(text, pattern, k)?.iter().map(Occurrence::count).sum())
  }
}
