//! Bijection between characters and dense integer codes.
//!
//! An alphabet is an explicit value owned by whoever runs a computation, there is no process wide
//! instance. In fixed mode unknown characters are rejected, in extensible mode they are appended.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
  symbols: Vec<char>,
  codes: HashMap<char, usize>,
  extensible: bool,
}

impl Alphabet {
  fn with_mode(symbols: &str, extensible: bool) -> Self {
    let mut res = Self { symbols: vec![], codes: HashMap::new(), extensible: true };
    for c in symbols.chars() {
      res.insert(c);
    }
    res.extensible = extensible;
    res
  }

  // duplicates are ignored, codes follow first appearance
  pub fn fixed(symbols: &str) -> Self {
    Self::with_mode(symbols, false)
  }

  pub fn extensible(symbols: &str) -> Self {
    Self::with_mode(symbols, true)
  }

  /// The sorted distinct characters of `w`, in fixed mode.
  /// Codes are therefore ordered like the characters they stand for.
  pub fn of_word(w: &str) -> Self {
    let sorted: String = w.chars().collect::<BTreeSet<_>>().into_iter().collect();
    Self::fixed(&sorted)
  }

  fn insert(&mut self, c: char) -> usize {
    if let Some(&i) = self.codes.get(&c) {
      return i;
    }
    self.symbols.push(c);
    self.codes.insert(c, self.symbols.len() - 1);
    self.symbols.len() - 1
  }

  pub fn is_extensible(&self) -> bool {
    self.extensible
  }

  /// Returns the code of `c`, assigning the next free code if the alphabet is extensible.
  pub fn char_to_index(&mut self, c: char) -> Result<usize> {
    match self.codes.get(&c) {
      Some(&i) => Ok(i),
      None if self.extensible => Ok(self.insert(c)),
      None => Err(Error::UnknownSymbol(c)),
    }
  }

  // lookup without extension
  pub fn index_of(&self, c: char) -> Result<usize> {
    self.codes.get(&c).copied().ok_or(Error::UnknownSymbol(c))
  }

  pub fn index_to_char(&self, i: usize) -> Option<char> {
    self.symbols.get(i).copied()
  }

  pub fn contains(&self, c: char) -> bool {
    self.codes.contains_key(&c)
  }

  pub fn size(&self) -> usize {
    self.symbols.len()
  }

  pub fn alphabet_set(&self) -> BTreeSet<char> {
    self.symbols.iter().copied().collect()
  }

  pub fn symbols(&self) -> &[char] {
    &self.symbols
  }

  /// Encodes a whole word, failing on the first unknown character.
  pub fn encode(&self, w: &str) -> Result<Vec<usize>> {
    w.chars().map(|c| self.index_of(c)).collect()
  }

  // like `encode`, but new characters are appended when the alphabet is extensible
  pub fn encode_extending(&mut self, w: &str) -> Result<Vec<usize>> {
    w.chars().map(|c| self.char_to_index(c)).collect()
  }

  pub fn decode(&self, codes: &[usize]) -> String {
    codes.iter().filter_map(|&i| self.index_to_char(i)).collect()
  }
}
