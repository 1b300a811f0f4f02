// memoized partial normal forms of the links a candidate window is stitched from
//
// a candidate window [x_0, y_0) is cut at the forward arch ends x_1..x_iota and the backward arch
// starts y_1..y_iota into alternating links
//   YX_i = [x_i, y_{iota-i}]        i = 0..=iota
//   XY_i = [y_{iota-i}, x_{i+1}]    i = 0..iota
// tiled as YX_0 XY_0 YX_1 ... YX_iota. Neighbouring candidates share most of these links.

use std::collections::HashMap;

use crate::Interval;
use crate::common::{Coord, advance_all};
use crate::shortlex::{ShortlexEngine, ShortlexResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
  /// the link runs from a backward arch start to a forward arch end
  ForwardThenBackward,
  /// the link runs from a forward arch end to a backward arch start
  BackwardThenForward,
}

#[derive(Clone, Debug)]
pub struct CheckPoint {
  pub link: Interval,
  pub direction: Direction,
  pub partial_form: ShortlexResult,
  pub seed_x: Vec<Coord>,
  pub seed_y: Vec<Coord>,
}

/// Cache of one fragment's links, keyed by link and direction.
/// A link keeps one checkpoint per pair of seeds it was computed from.
#[derive(Default)]
pub struct CheckPointCache {
  entries: HashMap<(usize, usize, Direction), Vec<CheckPoint>>,
  // forward counters of a link read from scratch
  forward_counters: HashMap<(usize, usize), Vec<Coord>>,
  hits: usize,
  misses: usize,
}

impl CheckPointCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn hits(&self) -> usize {
    self.hits
  }

  pub fn misses(&self) -> usize {
    self.misses
  }

  // number of checkpoints, counting every seed variant
  pub fn len(&self) -> usize {
    self.entries.values().map(Vec::len).sum()
  }

  fn lookup(
    &mut self,
    engine: &ShortlexEngine,
    fragment: &[usize],
    link: Interval,
    direction: Direction,
    seed_x: &[Coord],
    seed_y: &[Coord],
    threshold: Coord,
  ) -> &ShortlexResult {
    let variants = self.entries.entry((link.start, link.end, direction)).or_default();
    let pos = match variants.iter().position(|cp| cp.seed_x == seed_x && cp.seed_y == seed_y) {
      Some(pos) => {
        self.hits += 1;
        pos
      }
      None => {
        self.misses += 1;
        let partial_form = engine.partial_normal_form_of(&fragment[link.start..link.end], seed_x, seed_y, threshold);
        variants.push(CheckPoint { link, direction, partial_form, seed_x: seed_x.to_vec(), seed_y: seed_y.to_vec() });
        variants.len() - 1
      }
    };
    &variants[pos].partial_form
  }

  fn forward_counters_of(&mut self, fragment: &[usize], link: Interval, ones: &[Coord]) -> Vec<Coord> {
    self.forward_counters.entry((link.start, link.end))
      .or_insert_with(|| advance_all(&fragment[link.start..link.end], ones))
      .clone()
  }

  // normal form of fragment[x[0]..y[0]] under k-congruence, stitched from links
  // `x` holds x_0..x_iota, `y` holds y_0..y_iota
  // returns None if the cut points are not ordered, i.e. some link would be reversed
  // the links are computed right to left so that every link continues from the backward counters
  // of its right neighbour
  pub fn stitched_form(&mut self, engine: &ShortlexEngine, fragment: &[usize], k: usize, x: &[usize], y: &[usize]) -> Option<Vec<usize>> {
    let iota = x.len() - 1;
    let yx = |i: usize| Interval::new(x[i], y[iota - i]);
    let xy = |i: usize| Interval::new(y[iota - i], x[i + 1]);
    if (0..=iota).any(|i| yx(i).is_empty()) || (0..iota).any(|i| xy(i).is_empty()) {
      return None;
    }

    let iota_c = iota as Coord;
    let threshold = k as Coord + 1;
    let ones = engine.ones();
    let mut seed_y = ones.clone();
    // (symbol, absolute x, absolute y) per link, right to left
    let mut placed: Vec<Vec<(usize, Coord, Coord)>> = Vec::with_capacity(2 * iota + 1);
    for i in (0..=iota).rev() {
      let form = self.lookup(engine, fragment, yx(i), Direction::BackwardThenForward, &ones, &seed_y, threshold - iota_c);
      placed.push(place(form, i as Coord, iota_c - i as Coord));
      seed_y = form.y_seed.clone();

      if i > 0 {
        let left = yx(i - 1);
        let seed_x = self.forward_counters_of(fragment, left, &ones);
        let form = self.lookup(engine, fragment, xy(i - 1), Direction::ForwardThenBackward, &seed_x, &seed_y, threshold + 1 - iota_c);
        placed.push(place(form, i as Coord - 1, iota_c - i as Coord));
        // the next link lies one backward arch further out
        seed_y = form.y_seed.iter().map(|y| y - 1).collect();
      }
    }

    let mut items: Vec<(usize, Coord, Coord)> = placed.into_iter().rev().flatten().collect();
    // blocks of equal coordinates may span link boundaries
    let mut start = 0;
    while start < items.len() {
      let (_, x0, y0) = items[start];
      let mut end = start + 1;
      while end < items.len() && items[end].1 == x0 && items[end].2 == y0 && x0 + y0 == threshold {
        end += 1;
      }
      items[start..end].sort_by_key(|&(a, _, _)| engine.alphabet().index_to_char(a));
      start = end;
    }
    Some(items.into_iter().map(|(a, _, _)| a).collect())
  }
}

fn place(form: &ShortlexResult, x_offset: Coord, y_offset: Coord) -> Vec<(usize, Coord, Coord)> {
  form.symbols.iter().zip(&form.x_coord).zip(&form.y_coord)
    .map(|((&a, &x), &y)| (a, x + x_offset, y + y_offset))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alphabet::Alphabet;
  use rand::{Rng, SeedableRng, rngs::StdRng};

  #[test]
  fn reversed_links_are_rejected() {
    let alphabet = Alphabet::of_word("ab");
    let engine = ShortlexEngine::new(&alphabet);
    let mut cache = CheckPointCache::new();
    // YX_0 = [3, 2]
    assert_eq!(None, cache.stitched_form(&engine, &[0, 1, 0, 1], 1, &[3, 2], &[4, 2]));
    assert_eq!(0, cache.len());
  }

  #[test]
  fn single_link() {
    let alphabet = Alphabet::of_word("ab");
    let engine = ShortlexEngine::new(&alphabet);
    let mut cache = CheckPointCache::new();
    // iota = 0: the whole window is one link
    let fragment = [1, 0, 1, 0];
    assert_eq!(Some(vec![0, 1]), cache.stitched_form(&engine, &fragment, 1, &[0], &[4]));
    assert_eq!(Some(vec![0, 1]), cache.stitched_form(&engine, &fragment, 1, &[0], &[4]));
    assert_eq!((1, 1), (cache.hits(), cache.misses()));
    let form = cache.lookup(&engine, &fragment, Interval::new(0, 4), Direction::BackwardThenForward, &[1, 1], &[1, 1], 2);
    assert_eq!("ab", form.normal_form);
    assert_eq!((2, 1), (cache.hits(), cache.len()));
  }

  // a link reached with different seeds keeps both results
  #[test]
  fn seed_variants_are_kept() {
    let alphabet = Alphabet::of_word("ab");
    let engine = ShortlexEngine::new(&alphabet);
    let mut cache = CheckPointCache::new();
    let fragment = [0, 1, 0, 1];
    let link = Interval::new(0, 2);
    for seed_y in [[1, 1], [0, 1], [1, 1], [0, 1]] {
      cache.lookup(&engine, &fragment, link, Direction::BackwardThenForward, &[1, 1], &seed_y, 2);
    }
    assert_eq!((2, 2, 2), (cache.hits(), cache.misses(), cache.len()));
    cache.lookup(&engine, &fragment, link, Direction::ForwardThenBackward, &[1, 1], &[0, 1], 3);
    assert_eq!((2, 3, 3), (cache.hits(), cache.misses(), cache.len()));
  }

  // stitching along arch boundaries agrees with the direct computation
  #[test]
  fn stitched_agrees_with_direct() {
    let mut rng = StdRng::seed_from_u64(11);
    let alphabet = Alphabet::of_word("abc");
    let engine = ShortlexEngine::new(&alphabet);
    let mut checked = 0;
    for _ in 0..2000 {
      let len = rng.gen_range(1..=16);
      let fragment: Vec<usize> = (0..len).map(|_| rng.gen_range(0..3)).collect();
      let k = rng.gen_range(1..=4);
      let iota = rng.gen_range(1..=k);
      let start = rng.gen_range(0..len);

      // forward arch ends from `start`, backward arch starts from the end of the last one
      let ends = crate::common::arch_ends(&fragment[start..], 3);
      if ends.len() < iota {
        continue;
      }
      let mut x = vec![start];
      x.extend(ends[..iota].iter().map(|e| start + e));
      let window_end = rng.gen_range(x[iota]..=len);
      let reversed: Vec<usize> = fragment[..window_end].iter().rev().copied().collect();
      let starts = crate::common::arch_ends(&reversed, 3);
      let mut y = vec![window_end];
      y.extend(starts[..iota].iter().map(|s| window_end - s));

      let mut cache = CheckPointCache::new();
      if let Some(z) = cache.stitched_form(&engine, &fragment, k, &x, &y) {
        assert_eq!(engine.normal_form_of(&fragment[start..window_end], k).symbols, z);
        checked += 1;
      }
    }
    assert!(checked > 100);
  }
}
