//! Shortlex normal forms under Simon's k-congruence.
//!
//! The forward pass assigns every position an x-coordinate, the backward pass a y-coordinate. A
//! position whose coordinates sum to more than the threshold is redundant and dropped. Neighbouring
//! positions with equal coordinates summing to exactly the threshold commute, so every such block is
//! sorted to obtain the lexicographically smallest representative.

use std::collections::BTreeSet;

use crate::alphabet::Alphabet;
use crate::common::{Coord, advance, arch_ends};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortlexResult {
  pub normal_form: String,
  // `normal_form` as symbol codes
  pub symbols: Vec<usize>,
  pub x_coord: Vec<Coord>,
  pub y_coord: Vec<Coord>,
  // one set per block, left to right
  pub stack_form: Vec<BTreeSet<char>>,
  pub arch_ends: Vec<usize>,
  pub alphabet_used: BTreeSet<char>,
  pub universality: usize,
  // forward counters after consuming the input, for chaining to the right
  pub x_seed: Vec<Coord>,
  // backward counters after consuming the input, for chaining to the left
  pub y_seed: Vec<Coord>,
}

impl ShortlexResult {
  /// The blocks of `stack_form` as slices of `symbols`.
  pub fn blocks(&self) -> Vec<&[usize]> {
    let mut res = Vec::with_capacity(self.stack_form.len());
    let mut start = 0;
    for block in &self.stack_form {
      res.push(&self.symbols[start..start + block.len()]);
      start += block.len();
    }
    res
  }
}

pub struct ShortlexEngine<'a> {
  alphabet: &'a Alphabet,
}

impl<'a> ShortlexEngine<'a> {
  pub fn new(alphabet: &'a Alphabet) -> Self {
    Self { alphabet }
  }

  pub fn alphabet(&self) -> &Alphabet {
    self.alphabet
  }

  pub fn ones(&self) -> Vec<Coord> {
    vec![1; self.alphabet.size()]
  }

  // missing seed entries count as 1
  fn seed(&self, seed: &[Coord]) -> Vec<Coord> {
    let mut res = seed.to_vec();
    res.resize(self.alphabet.size().max(seed.len()), 1);
    res
  }

  /// Normal form of `w` under k-congruence, i.e. threshold `k+1` with all-one seeds.
  pub fn normal_form(&self, w: &str, k: usize) -> Result<ShortlexResult> {
    Ok(self.normal_form_of(&self.alphabet.encode(w)?, k))
  }

  pub fn partial_normal_form(&self, w: &str, x_seed: &[Coord], y_seed: &[Coord], threshold: Coord) -> Result<ShortlexResult> {
    Ok(self.partial_normal_form_of(&self.alphabet.encode(w)?, x_seed, y_seed, threshold))
  }

  pub fn normal_form_of(&self, w: &[usize], k: usize) -> ShortlexResult {
    let ones = self.ones();
    self.partial_normal_form_of(w, &ones, &ones, k as Coord + 1)
  }

  // normal form of the encoded word `w`, continuing from the counters `x_seed` (state left of `w`)
  // and `y_seed` (state right of `w`)
  // runtime O(|w| * sigma + |w| log sigma)
  pub fn partial_normal_form_of(&self, w: &[usize], x_seed: &[Coord], y_seed: &[Coord], threshold: Coord) -> ShortlexResult {
    let x_start = self.seed(x_seed);
    let y_start = self.seed(y_seed);

    let mut x_counters = x_start.clone();
    let x_full: Vec<Coord> = w.iter().map(|&a| advance(&mut x_counters, a)).collect();

    let mut y_counters = y_start.clone();
    let mut keep = vec![false; w.len()];
    for i in (0..w.len()).rev() {
      if x_full[i] + y_counters[w[i]] <= threshold {
        advance(&mut y_counters, w[i]);
        keep[i] = true;
      }
    }
    let mut reduced: Vec<usize> = w.iter().zip(&keep).filter(|(_, kept)| **kept).map(|(&a, _)| a).collect();

    // coordinates of the reduced word, nothing more is dropped here
    let mut counters = x_start;
    let x_coord: Vec<Coord> = reduced.iter().map(|&a| advance(&mut counters, a)).collect();
    let mut counters = y_start;
    let mut y_coord = vec![0; reduced.len()];
    for i in (0..reduced.len()).rev() {
      y_coord[i] = advance(&mut counters, reduced[i]);
    }

    let mut stack_form = vec![];
    let mut start = 0;
    while start < reduced.len() {
      let mut end = start + 1;
      while end < reduced.len()
        && x_coord[end] == x_coord[start]
        && y_coord[end] == y_coord[start]
        && x_coord[start] + y_coord[start] == threshold
      {
        end += 1;
      }
      reduced[start..end].sort_by_key(|&a| self.alphabet.index_to_char(a));
      stack_form.push(reduced[start..end].iter().filter_map(|&a| self.alphabet.index_to_char(a)).collect());
      start = end;
    }

    let mut used = vec![false; self.alphabet.size()];
    w.iter().for_each(|&a| used[a] = true);
    let alphabet_used: BTreeSet<char> = used.iter().enumerate()
      .filter(|(_, u)| **u)
      .filter_map(|(a, _)| self.alphabet.index_to_char(a))
      .collect();
    let arch_ends = arch_ends(&reduced, alphabet_used.len());

    ShortlexResult {
      normal_form: self.alphabet.decode(&reduced),
      symbols: reduced,
      x_coord,
      y_coord,
      stack_form,
      universality: arch_ends.len(),
      arch_ends,
      alphabet_used,
      x_seed: x_counters,
      y_seed: y_counters,
    }
  }
}

/// Normal form of `w` under k-congruence over the alphabet of `w`.
pub fn shortlex_normal_form(w: &str, k: usize) -> String {
  let alphabet = Alphabet::of_word(w);
  let symbols: Vec<usize> = w.chars().filter_map(|c| alphabet.index_of(c).ok()).collect();
  ShortlexEngine::new(&alphabet).normal_form_of(&symbols, k).normal_form
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::common::universality_index;
  use rand::{Rng, SeedableRng, rngs::StdRng};
  use test_case::test_case;

  #[test_case("bacbaabada", 3, "bacabbda")]
  #[test_case("bacbaabada", 2, "abcbda")]
  #[test_case("bacbaabada", 1, "abcd")]
  #[test_case("bacbaabada", 0, "" ; "everything is 0-congruent")]
  #[test_case("abab", 1, "ab")]
  #[test_case("abba", 1, "ab")]
  #[test_case("aaaa", 2, "aa")]
  #[test_case("ba", 2, "ba")]
  #[test_case("cbacba", 2, "abcabc")]
  #[test_case("aabb", 2, "aabb")]
  fn normal_forms(w: &str, k: usize, expected: &str) {
    assert_eq!(expected, shortlex_normal_form(w, k));
  }

  #[test]
  fn full_result() {
    let alphabet = Alphabet::of_word("bacbaabada");
    let res = ShortlexEngine::new(&alphabet).normal_form("bacbaabada", 3).unwrap();
    assert_eq!("bacabbda", res.normal_form);
    assert_eq!(vec![1, 1, 1, 2, 2, 3, 1, 2], res.x_coord);
    assert_eq!(vec![2, 2, 1, 2, 2, 1, 1, 1], res.y_coord);
    let blocks: Vec<String> = res.stack_form.iter().map(|b| b.iter().collect()).collect();
    assert_eq!(vec!["b", "a", "c", "ab", "b", "d", "a"], blocks);
    assert_eq!(vec![7], res.arch_ends);
    assert_eq!(1, res.universality);
    assert_eq!(vec![3, 2, 2, 2], res.x_seed);
    assert_eq!(vec![3, 3, 2, 2], res.y_seed);
    assert_eq!(alphabet.alphabet_set(), res.alphabet_used);
    assert_eq!(res.stack_form.len(), res.blocks().len());
  }

  #[test]
  fn seeded() {
    let alphabet = Alphabet::of_word("ab");
    let res = ShortlexEngine::new(&alphabet).partial_normal_form("abba", &[2, 1], &[1, 3], 4).unwrap();
    assert_eq!("abba", res.normal_form);
    assert_eq!(vec![2, 1, 2, 2], res.x_coord);
    assert_eq!(vec![2, 3, 2, 1], res.y_coord);
    assert_eq!(vec![2, 4], res.arch_ends);
    assert_eq!(vec![3, 3], res.x_seed);
    assert_eq!(vec![3, 3], res.y_seed);
  }

  #[test]
  fn blocks_are_sorted_by_character() {
    // codes do not follow character order here
    let alphabet = Alphabet::fixed("ba");
    let res = ShortlexEngine::new(&alphabet).normal_form("abba", 1).unwrap();
    assert_eq!("ab", res.normal_form);
  }

  fn random_word(rng: &mut StdRng) -> String {
    let sigma = rng.gen_range(1..=4);
    let len = rng.gen_range(0..=14);
    (0..len).map(|_| (b'a' + rng.gen_range(0..sigma)) as char).collect()
  }

  #[test]
  fn properties() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
      let w = random_word(&mut rng);
      let k = rng.gen_range(0..=5);
      let alphabet = Alphabet::of_word(&w);
      let engine = ShortlexEngine::new(&alphabet);
      let res = engine.normal_form(&w, k).unwrap();

      // idempotence and length bound
      assert_eq!(res.normal_form, engine.normal_form(&res.normal_form, k).unwrap().normal_form);
      assert!(res.normal_form.len() <= w.len());

      // partial with all-one seeds agrees with the full form
      let ones = engine.ones();
      let partial = engine.partial_normal_form(&w, &ones, &ones, k as Coord + 1).unwrap();
      assert_eq!(res.normal_form, partial.normal_form);

      // universality is the number of minimal arches, capped by k
      assert_eq!(res.universality, res.arch_ends.len());
      let mut start = 0;
      for &end in &res.arch_ends {
        let arch = &res.symbols[start..end];
        assert_eq!(res.alphabet_used.len(), arch.iter().collect::<BTreeSet<_>>().len());
        assert_eq!(res.alphabet_used.len() - 1, arch[..arch.len() - 1].iter().collect::<BTreeSet<_>>().len());
        start = end;
      }
      let encoded = alphabet.encode(&w).unwrap();
      assert_eq!(universality_index(&encoded, alphabet.size()).min(k), res.universality);

      // blocks partition the normal form
      assert_eq!(res.symbols.len(), res.stack_form.iter().map(|b| b.len()).sum::<usize>());
      if k > 0 {
        let union: BTreeSet<char> = res.stack_form.iter().flatten().copied().collect();
        assert_eq!(res.alphabet_used, union);
      }
    }
  }
}
