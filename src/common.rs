use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// Rank coordinate. Signed, relative seeds used while stitching can drop to zero or below.
pub type Coord = i64;

// consumes one occurrence of symbol `a`
// returns the counter value of `a` before the step
// afterwards no counter is larger than the new counter of `a`
// runtime O(sigma)
pub fn advance(counters: &mut [Coord], a: usize) -> Coord {
  let before = counters[a];
  counters[a] += 1;
  let bound = counters[a];
  for c in counters.iter_mut() {
    if *c > bound {
      *c = bound;
    }
  }
  before
}

// runs `advance` over a whole word, starting from `seed`
pub fn advance_all(word: &[usize], seed: &[Coord]) -> Vec<Coord> {
  let mut counters = seed.to_vec();
  for &a in word {
    advance(&mut counters, a);
  }
  counters
}

// returns the exclusive end of every arch of `word`
// an arch ends as soon as `used` distinct symbols were seen since the previous arch
pub fn arch_ends(word: &[usize], used: usize) -> Vec<usize> {
  let mut res = vec![];
  if used == 0 {
    return res;
  }
  let mut seen: Vec<bool> = vec![];
  let mut count = 0;
  for (i, &a) in word.iter().enumerate() {
    if a >= seen.len() {
      seen.resize(a + 1, false);
    }
    if !seen[a] {
      seen[a] = true;
      count += 1;
    }
    if count == used {
      res.push(i + 1);
      seen.iter_mut().for_each(|s| *s = false);
      count = 0;
    }
  }
  res
}

/// Number of consecutive arches of `word` over an alphabet of `sigma` symbols.
pub fn universality_index(word: &[usize], sigma: usize) -> usize {
  arch_ends(word, sigma).len()
}

// splits `text` at every character outside `alphabet`
// returns (offset, encoded run) for every maximal non-empty run, offsets count characters
pub fn slices(text: &str, alphabet: &Alphabet) -> Vec<(usize, Vec<usize>)> {
  let mut res = vec![];
  let mut current: Option<(usize, Vec<usize>)> = None;
  for (i, c) in text.chars().enumerate() {
    match alphabet.index_of(c) {
      Ok(a) => current.get_or_insert_with(|| (i, vec![])).1.push(a),
      Err(_) => {
        if let Some(run) = current.take() {
          res.push(run);
        }
      }
    }
  }
  if let Some(run) = current {
    res.push(run);
  }
  res
}

// validates the arguments of a matching call, returns k as usize
pub fn check_parameters(pattern: &str, k: i64) -> Result<usize> {
  if pattern.is_empty() {
    return Err(Error::InvalidParameter("pattern must not be empty".into()));
  }
  usize::try_from(k).map_err(|_| Error::InvalidParameter(format!("k must be non-negative, got {k}")))
}
