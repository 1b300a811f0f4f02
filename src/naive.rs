use crate::alphabet::Alphabet;
use crate::common::{check_parameters, slices};
use crate::error::Result;
use crate::shortlex::ShortlexEngine;
use crate::*;

/// Reference matcher comparing the normal form of every window with the pattern's.
/// Runtime O(n^3 * sigma) per slice of length n.
#[derive(Clone, Debug, Default)]
pub struct NaiveMatcher {
  alphabet: Option<Alphabet>,
}

impl NaiveMatcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_alphabet(alphabet: Alphabet) -> Self {
    Self { alphabet: Some(alphabet) }
  }
}

impl CongruenceMatcher for NaiveMatcher {
  fn find(&self, text: &str, pattern: &str, k: i64) -> Result<Vec<Occurrence>> {
    let k = check_parameters(pattern, k)?;
    if let Some(fixed) = &self.alphabet {
      fixed.encode(pattern)?;
      fixed.encode(text)?;
    }
    let alphabet = Alphabet::of_word(pattern);
    let engine = ShortlexEngine::new(&alphabet);
    let target = engine.normal_form_of(&alphabet.encode(pattern)?, k).symbols;

    let mut res = vec![];
    for (offset, fragment) in slices(text, &alphabet) {
      for f in 0..fragment.len() {
        // consecutive matching ends are merged into one triple
        let mut run: Option<Interval> = None;
        for b in f + 1..=fragment.len() {
          let hit = engine.normal_form_of(&fragment[f..b], k).symbols == target;
          match (hit, run) {
            (true, Some(r)) => run = Some(Interval::new(r.start, b)),
            (true, None) => run = Some(Interval::new(b, b)),
            (false, Some(r)) => {
              res.push(Occurrence::new(Interval::new(f, f), r, offset));
              run = None;
            }
            (false, None) => {}
          }
        }
        if let Some(r) = run {
          res.push(Occurrence::new(Interval::new(f, f), r, offset));
        }
      }
    }
    Ok(res)
  }
}
