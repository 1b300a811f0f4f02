// nearest occurrence lookups for one text fragment
// positions are space positions 0..=n, the symbol T[j] lies between positions j and j+1

const NONE: usize = usize::MAX;

pub struct RankTable {
  len: usize,
  sigma: usize,
  // (n+1) x sigma, row major
  forward: Vec<usize>,
  backward: Vec<usize>,
}

impl RankTable {
  // runtime O(n * sigma)
  pub fn build(fragment: &[usize], sigma: usize) -> Self {
    let len = fragment.len();
    let mut res = Self { len, sigma, forward: vec![NONE; (len + 1) * sigma], backward: vec![NONE; (len + 1) * sigma] };
    res.build_forward(fragment);
    res.build_backward(fragment);
    res
  }

  // backward scan, remembering the next occurrence of every symbol
  fn build_forward(&mut self, fragment: &[usize]) {
    let mut next = vec![NONE; self.sigma];
    for i in (0..self.len).rev() {
      next[fragment[i]] = i + 1;
      self.forward[i * self.sigma..(i + 1) * self.sigma].copy_from_slice(&next);
    }
  }

  // forward scan, remembering the previous occurrence of every symbol
  fn build_backward(&mut self, fragment: &[usize]) {
    let mut prev = vec![NONE; self.sigma];
    for i in 0..self.len {
      prev[fragment[i]] = i;
      self.backward[(i + 1) * self.sigma..(i + 2) * self.sigma].copy_from_slice(&prev);
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn sigma(&self) -> usize {
    self.sigma
  }

  // position right after the first occurrence of `c` at or after position i
  pub fn forward_rank(&self, i: usize, c: usize) -> Option<usize> {
    Some(self.forward[i * self.sigma + c]).filter(|&r| r != NONE)
  }

  // position right before the last occurrence of `c` before position i
  pub fn backward_rank(&self, i: usize, c: usize) -> Option<usize> {
    Some(self.backward[i * self.sigma + c]).filter(|&r| r != NONE)
  }

  // the position up to which every symbol occurs once more after i, None if some symbol is missing
  pub fn forward_key(&self, i: usize) -> Option<usize> {
    (0..self.sigma).map(|c| self.forward_rank(i, c)).try_fold(0, |acc, r| r.map(|r| acc.max(r)))
  }

  // mirror of `forward_key`
  pub fn backward_key(&self, i: usize) -> Option<usize> {
    (0..self.sigma).map(|c| self.backward_rank(i, c)).try_fold(usize::MAX, |acc, r| r.map(|r| acc.min(r)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  // "abca" over a=0, b=1, c=2
  fn table() -> RankTable {
    RankTable::build(&[0, 1, 2, 0], 3)
  }

  #[test_case(0, 0, Some(1))]
  #[test_case(1, 0, Some(4))]
  #[test_case(1, 2, Some(3))]
  #[test_case(3, 1, None)]
  #[test_case(4, 0, None ; "end of fragment")]
  fn forward(i: usize, c: usize, expected: Option<usize>) {
    assert_eq!(expected, table().forward_rank(i, c));
  }

  #[test_case(0, 0, None ; "start of fragment")]
  #[test_case(1, 0, Some(0))]
  #[test_case(4, 0, Some(3))]
  #[test_case(3, 1, Some(1))]
  #[test_case(2, 2, None)]
  fn backward(i: usize, c: usize, expected: Option<usize>) {
    assert_eq!(expected, table().backward_rank(i, c));
  }

  #[test_case(0, Some(3))]
  #[test_case(1, Some(4))]
  #[test_case(2, None)]
  #[test_case(4, None)]
  fn forward_keys(i: usize, expected: Option<usize>) {
    assert_eq!(expected, table().forward_key(i));
  }

  #[test_case(4, Some(1))]
  #[test_case(3, Some(0))]
  #[test_case(2, None)]
  fn backward_keys(i: usize, expected: Option<usize>) {
    assert_eq!(expected, table().backward_key(i));
  }
}
