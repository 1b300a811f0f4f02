//! Tree based matcher.
//!
//! The text is split at characters outside the pattern's alphabet. On every slice, a forward rank tree
//! leads from a start position over `iota` arches (and the rest of the pattern projected behind them)
//! to an end position `j1`, and a backward rank tree leads from `j1` back to the latest start `j2`.
//! Each candidate window `[j2, j1)` is verified by stitching its normal form from cached links, and the
//! surrounding positions that do not change the class are reported along with it.

use log::{debug, trace};

use crate::alphabet::Alphabet;
use crate::common::{Coord, check_parameters, slices, universality_index};
use crate::error::Result;
use crate::shortlex::{ShortlexEngine, ShortlexResult};
use crate::{CongruenceMatcher, Interval, Occurrence};

pub mod checkpoint;
pub mod rank_table;
pub mod rank_tree;

use checkpoint::CheckPointCache;
use rank_table::RankTable;
use rank_tree::RankTree;

/// Matcher using rank trees.
/// Without an alphabet, every character outside the pattern separates the text. With a fixed alphabet,
/// characters outside that alphabet are rejected with [`crate::Error::UnknownSymbol`].
#[derive(Clone, Debug, Default)]
pub struct SimonMatcher {
  alphabet: Option<Alphabet>,
}

impl SimonMatcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_alphabet(alphabet: Alphabet) -> Self {
    Self { alphabet: Some(alphabet) }
  }
}

impl CongruenceMatcher for SimonMatcher {
  fn find(&self, text: &str, pattern: &str, k: i64) -> Result<Vec<Occurrence>> {
    let k = check_parameters(pattern, k)?;
    if let Some(fixed) = &self.alphabet {
      fixed.encode(pattern)?;
      fixed.encode(text)?;
    }
    let alphabet = Alphabet::of_word(pattern);
    PatternContext::new(&alphabet, pattern, k).map(|context| context.find(text))
  }
}

// everything derived from the pattern, shared by all slices
struct PatternContext<'a> {
  engine: ShortlexEngine<'a>,
  k: usize,
  canonical: ShortlexResult,
  iota: usize,
  // symbols that leave the class when appended
  leave_right: Vec<usize>,
  // symbols that leave the class when prepended
  leave_left: Vec<usize>,
}

impl<'a> PatternContext<'a> {
  fn new(alphabet: &'a Alphabet, pattern: &str, k: usize) -> Result<Self> {
    let engine = ShortlexEngine::new(alphabet);
    let symbols = alphabet.encode(pattern)?;
    let canonical = engine.normal_form_of(&symbols, k);
    let iota = universality_index(&symbols, alphabet.size()).min(k);
    let threshold = k as Coord + 1;
    let leave_right = (0..alphabet.size()).filter(|&a| canonical.x_seed[a] + 1 <= threshold).collect();
    let leave_left = (0..alphabet.size()).filter(|&a| canonical.y_seed[a] + 1 <= threshold).collect();
    debug!("pattern {pattern:?} k {k}: normal form {:?}, iota {iota}", canonical.normal_form);
    Ok(Self { engine, k, canonical, iota, leave_right, leave_left })
  }

  fn find(&self, text: &str) -> Vec<Occurrence> {
    let mut res = vec![];
    for (offset, fragment) in slices(text, self.engine.alphabet()) {
      let len = fragment.len();
      if self.iota == 0 {
        // under 0-congruence all words are equivalent
        res.push(Occurrence::new(Interval::new(0, len - 1), Interval::new(1, len), offset));
        continue;
      }
      let before = res.len();
      let mut cache = CheckPointCache::new();
      self.find_in_fragment(&fragment, offset, &mut cache, &mut res);
      trace!("checkpoints: {} stored, {} hits, {} misses", cache.len(), cache.hits(), cache.misses());
      trace!("slice at {offset} of length {len}: {} triples", res.len() - before);
    }
    debug!("{} triples in total", res.len());
    res
  }

  fn find_in_fragment(&self, fragment: &[usize], offset: usize, cache: &mut CheckPointCache, res: &mut Vec<Occurrence>) {
    let len = fragment.len();
    let table = RankTable::build(fragment, self.engine.alphabet().size());
    let x_tree = RankTree::build(&table, &self.canonical, self.iota, true);
    let y_tree = RankTree::build(&table, &self.canonical, self.iota, false);

    for (id, node) in x_tree.nodes() {
      let Some(forward) = x_tree.ancestors(id, self.iota - 1) else { continue };
      let j1 = x_tree.node(forward[self.iota - 1]).register;

      let Some(start) = y_tree.owner(j1) else { continue };
      let Some(backward) = y_tree.ancestors(start, self.iota - 1) else { continue };
      let n = y_tree.node(backward[self.iota - 1]).register;

      let lower = self.left_bound(&table, n).max(node.children.start);
      let j2 = node.children.end.min(n);
      if j2 < lower {
        continue;
      }

      let mut x = vec![j2];
      x.extend(forward.iter().map(|&id| x_tree.node(id).key));
      let mut y = vec![j1];
      y.extend(backward.iter().map(|&id| y_tree.node(id).key));
      let Some(z) = cache.stitched_form(&self.engine, fragment, self.k, &x, &y) else { continue };
      if z != self.canonical.symbols {
        continue;
      }

      let left = Interval::new(self.left_bound(&table, j2).max(node.children.start), node.children.end.min(j2));
      let right_end = self.leave_right.iter()
        .filter_map(|&a| table.forward_rank(j1, a))
        .map(|r| r - 1)
        .min()
        .unwrap_or(len)
        .min(len);
      res.push(Occurrence::new(left, Interval::new(j1, right_end), offset));
    }
  }

  // first start position left of `i` from which no symbol leaving the class is prepended
  fn left_bound(&self, table: &RankTable, i: usize) -> usize {
    self.leave_left.iter()
      .filter_map(|&a| table.backward_rank(i, a))
      .map(|r| r + 1)
      .max()
      .unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;
  use crate::naive::NaiveMatcher;
  use rand::{Rng, SeedableRng, rngs::StdRng};
  use std::collections::BTreeSet;
  use test_case::test_case;

  fn occ(left: (usize, usize), right: (usize, usize), offset: usize) -> Occurrence {
    Occurrence::new(Interval::new(left.0, left.1), Interval::new(right.0, right.1), offset)
  }

  fn windows(occurrences: &[Occurrence]) -> BTreeSet<(usize, usize)> {
    occurrences.iter().flat_map(|o| o.windows()).collect()
  }

  #[test_case("aaaa", "a", 0, vec![occ((0, 3), (1, 4), 0)])]
  #[test_case("abab", "ab", 1, vec![occ((0, 0), (2, 4), 0), occ((1, 1), (3, 4), 0), occ((2, 2), (4, 4), 0)])]
  #[test_case("abxba", "ab", 1, vec![occ((0, 0), (2, 2), 0), occ((0, 0), (2, 2), 3)] ; "separated")]
  #[test_case("aabbaab", "ab", 2, vec![occ((1, 1), (3, 3), 0), occ((5, 5), (7, 7), 0)])]
  #[test_case("bacbaabada", "ab", 2, vec![occ((2, 2), (4, 4), 3)])]
  #[test_case("ccabcbac", "abc", 2, vec![occ((2, 2), (5, 5), 0)])]
  #[test_case("abbaab", "aba", 2, vec![] ; "no match")]
  #[test_case("", "a", 0, vec![] ; "empty text")]
  fn triples(text: &str, pattern: &str, k: i64, expected: Vec<Occurrence>) {
    assert_eq!(expected, SimonMatcher::new().find(text, pattern, k).unwrap());
  }

  #[test]
  fn all_single_characters() {
    let found = windows(&SimonMatcher::new().find("aaaa", "a", 0).unwrap());
    assert!((0..4).all(|i| found.contains(&(i, i + 1))));
  }

  #[test]
  fn windows_of_abab() {
    let found = windows(&SimonMatcher::new().find("abab", "ab", 1).unwrap());
    assert_eq!(BTreeSet::from([(0, 2), (0, 3), (0, 4), (1, 3), (1, 4), (2, 4)]), found);
  }

  #[test]
  fn fixed_alphabet_rejects_unknown_symbol() {
    let matcher = SimonMatcher::with_alphabet(Alphabet::fixed("ab"));
    assert!(matches!(matcher.find("abc", "ab", 0), Err(Error::UnknownSymbol('c'))));
    assert!(matches!(matcher.find("ab", "ac", 0), Err(Error::UnknownSymbol('c'))));
    assert_eq!(3, matcher.find("abab", "ab", 1).unwrap().len());
  }

  #[test_case("ab", "ab", -1 ; "negative k")]
  #[test_case("ab", "", 1 ; "empty pattern")]
  fn invalid_parameters(text: &str, pattern: &str, k: i64) {
    assert!(matches!(SimonMatcher::new().find(text, pattern, k), Err(Error::InvalidParameter(_))));
  }

  // periodic texts share arch boundaries between candidates, every link and seed pair is computed once
  #[test_case("ab", 20, "abab", 3, 19)]
  #[test_case("abbaab", 5, "abbaab", 4, 5)]
  fn checkpoints_are_reused(period: &str, repeat: usize, pattern: &str, k: usize, triples: usize) {
    let alphabet = Alphabet::of_word(pattern);
    let context = PatternContext::new(&alphabet, pattern, k).unwrap();
    let fragment = alphabet.encode(&period.repeat(repeat)).unwrap();
    let mut cache = CheckPointCache::new();
    let mut res = vec![];
    context.find_in_fragment(&fragment, 0, &mut cache, &mut res);
    assert_eq!(triples, res.len());
    assert_eq!(cache.misses(), cache.len());
    assert!(cache.hits() > cache.misses());
  }

  #[test]
  fn agrees_with_naive() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..1500 {
      let sigma = rng.gen_range(1..=4u8);
      let with_separator = rng.gen_bool(0.2);
      let text: String = (0..rng.gen_range(0..=18))
        .map(|_| {
          let c = rng.gen_range(0..sigma + with_separator as u8);
          if c == sigma { 'x' } else { (b'a' + c) as char }
        })
        .collect();
      let pattern: String = (0..rng.gen_range(1..=9)).map(|_| (b'a' + rng.gen_range(0..sigma)) as char).collect();
      let k = rng.gen_range(0..=6);

      let found = SimonMatcher::new().find(&text, &pattern, k).unwrap();
      let expected = NaiveMatcher::new().find(&text, &pattern, k).unwrap();
      assert_eq!(windows(&expected), windows(&found), "text {text:?} pattern {pattern:?} k {k}");
    }
  }
}
