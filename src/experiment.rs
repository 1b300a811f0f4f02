//! Experiments: random texts, DNA datasets and the search for the best matching pattern.
//!
//! The best pattern of a text is the normal form, among those of all its substrings, whose congruence
//! class has the most windows in the text.

use std::collections::HashMap;
use std::io::BufRead;
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::shortlex::shortlex_normal_form;
use crate::simon_match::SimonMatcher;
use crate::CongruenceMatcher;

/// Sequences of this length or longer are left out when converting a dataset.
pub const MAX_SEQUENCE_LENGTH: usize = 600;

pub fn random_text(alphabet: &Alphabet, len: usize, rng: &mut impl Rng) -> String {
  if alphabet.size() == 0 {
    return String::new();
  }
  (0..len).filter_map(|_| alphabet.index_to_char(rng.gen_range(0..alphabet.size()))).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaSequence {
  pub id: usize,
  pub class: i64,
  pub sequence: String,
  pub sequence_length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaDataset {
  pub animal: String,
  pub sequences: Vec<DnaSequence>,
}

// splits "<word> <number>" lines, None if the line does not have this shape
fn word_and_number(line: &str) -> Option<(String, i64)> {
  let (word, number) = line.split_whitespace().collect_tuple()?;
  Some((word.to_string(), number.parse().ok()?))
}

// saturates instead of wrapping for durations beyond u64 microseconds
fn micros(elapsed: Duration) -> u64 {
  u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

/// Converts a dataset of `sequence class` lines, preceded by a header line, to its JSON model.
/// Sequences that are too long or contain an unknown base `N` are skipped, so are malformed lines.
pub fn convert_dna_dataset(reader: impl BufRead, animal: &str) -> Result<DnaDataset> {
  let mut sequences = vec![];
  for (number, line) in reader.lines().enumerate().skip(1) {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    let Some((sequence, class)) = word_and_number(&line) else {
      warn!("skipping malformed line {}", number + 1);
      continue;
    };
    let sequence_length = sequence.chars().count();
    if sequence_length >= MAX_SEQUENCE_LENGTH || sequence.contains('N') {
      continue;
    }
    sequences.push(DnaSequence { id: sequences.len() + 1, class, sequence_length, sequence });
  }
  debug!("converted {} sequences of {animal}", sequences.len());
  Ok(DnaDataset { animal: animal.to_string(), sequences })
}

pub fn read_dataset(reader: impl std::io::Read) -> Result<DnaDataset> {
  Ok(serde_json::from_reader(reader)?)
}

/// Reads a title line followed by `sequence key` lines.
pub fn read_sequences(reader: impl BufRead) -> Result<(String, Vec<(String, i64)>)> {
  let mut lines = reader.lines();
  let title = lines.next().transpose()?.unwrap_or_default();
  let mut res = vec![];
  for (number, line) in lines.enumerate() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    let entry = word_and_number(&line)
      .ok_or_else(|| Error::Parse { line: number + 2, reason: "expected `<sequence> <key>`".into() })?;
    res.push(entry);
  }
  Ok((title, res))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BestPattern {
  pub sequence: String,
  pub key: i64,
  pub k: usize,
  // the first substring whose class has the most windows
  pub original: String,
  pub normal_form: String,
  pub count: usize,
}

// a pattern standing for the class of `raw`, the normal form is empty for k = 0
fn class_pattern(raw: &str, k: usize) -> String {
  let normal_form = shortlex_normal_form(raw, k);
  if normal_form.is_empty() { raw.to_string() } else { normal_form }
}

/// Tries the class of every substring of `sequence` as pattern.
pub fn best_pattern(sequence: &str, key: i64, k: usize, matcher: &impl CongruenceMatcher) -> Result<BestPattern> {
  let chars: Vec<char> = sequence.chars().collect();
  let mut counts: HashMap<String, usize> = HashMap::new();
  let mut res = BestPattern { sequence: sequence.to_string(), key, k, original: String::new(), normal_form: String::new(), count: 0 };
  for i in 0..chars.len() {
    for j in i + 1..=chars.len() {
      let raw: String = chars[i..j].iter().collect();
      let pattern = class_pattern(&raw, k);
      let count = match counts.get(&pattern) {
        Some(&count) => count,
        None => {
          let count = matcher.count(sequence, &pattern, k as i64)?;
          counts.insert(pattern.clone(), count);
          count
        }
      };
      if count > res.count {
        res.count = count;
        res.normal_form = shortlex_normal_form(&pattern, k);
        res.original = raw;
      }
    }
  }
  Ok(res)
}

/// Runs [`best_pattern`] for every sequence in parallel, with `k = |sequence| / 20`.
/// Results are in input order.
pub fn run_dna_experiment(inputs: &[(String, i64)]) -> Result<Vec<BestPattern>> {
  inputs.par_iter()
    .map(|(sequence, key)| {
      let k = sequence.chars().count() / 20;
      let res = best_pattern(sequence, *key, k, &SimonMatcher::new());
      debug!("sequence with key {key} done");
      res
    })
    .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentConfig {
  pub alphabet: String,
  pub k: usize,
  pub text_lengths: Vec<usize>,
  pub seed: Option<u64>,
}

impl ExperimentConfig {
  /// Reads the alphabet, `k` and the text lengths from the first three lines.
  pub fn read(reader: impl BufRead) -> Result<Self> {
    let lines = reader.lines().take(3).collect::<std::io::Result<Vec<String>>>()?;
    let [alphabet, k, lengths] = <[String; 3]>::try_from(lines)
      .map_err(|lines| Error::Parse { line: lines.len() + 1, reason: "missing line".into() })?;
    let k = k.trim().parse().map_err(|_| Error::Parse { line: 2, reason: format!("invalid k {k:?}") })?;
    let text_lengths = lengths.split_whitespace()
      .map(|l| l.parse().map_err(|_| Error::Parse { line: 3, reason: format!("invalid text length {l:?}") }))
      .collect::<Result<Vec<usize>>>()?;
    if text_lengths.is_empty() {
      return Err(Error::Parse { line: 3, reason: "no text length given".into() });
    }
    Ok(Self { alphabet: alphabet.trim().to_string(), k, text_lengths, seed: None })
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuntimeReport {
  pub text_length: usize,
  pub text: String,
  pub best_pattern: String,
  pub best_count: usize,
  pub distinct_patterns: usize,
  pub elapsed_micros: u64,
}

/// For every text length, generates a random text and finds its best pattern among the distinct
/// normal forms of its substrings, timing the search.
pub fn run_runtime_experiment(config: &ExperimentConfig, rng: &mut impl Rng) -> Result<Vec<RuntimeReport>> {
  let alphabet = Alphabet::fixed(&config.alphabet);
  let matcher = SimonMatcher::with_alphabet(alphabet.clone());
  let mut res = vec![];
  for &len in &config.text_lengths {
    let text = random_text(&alphabet, len, rng);
    let chars: Vec<char> = text.chars().collect();
    info!("experiment for text length {len}");

    let start = Instant::now();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for s in 0..chars.len() {
      for e in s + 1..=chars.len() {
        let raw: String = chars[s..e].iter().collect();
        let pattern = class_pattern(&raw, config.k);
        if counts.contains_key(&pattern) {
          continue;
        }
        let count = matcher.count(&text, &pattern, config.k as i64)?;
        debug!("({pattern}, {count})");
        counts.insert(pattern, count);
      }
    }
    // ties are broken by the smaller pattern
    let best = counts.iter().max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
    let elapsed: Duration = start.elapsed();

    let (best_pattern, best_count) = best.map(|(p, c)| (p.clone(), *c)).unwrap_or_default();
    info!("best pattern {best_pattern:?} with {best_count} windows, took {} us", elapsed.as_micros());
    res.push(RuntimeReport {
      text_length: len,
      text,
      best_pattern,
      best_count,
      distinct_patterns: counts.len(),
      elapsed_micros: micros(elapsed),
    });
  }
  Ok(res)
}
