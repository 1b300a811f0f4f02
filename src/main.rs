use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use simon_match::alphabet::Alphabet;
use simon_match::common::{Coord, slices, universality_index};
use simon_match::experiment::{self, ExperimentConfig};
use simon_match::naive::NaiveMatcher;
use simon_match::shortlex::ShortlexEngine;
use simon_match::simon_match::SimonMatcher;
use simon_match::simon_match::rank_table::RankTable;
use simon_match::simon_match::rank_tree::RankTree;
use simon_match::{CongruenceMatcher, Error, Result};

/// Example:
/// simon-match match --text abcabcab --pattern abc -k 1
/// RUST_LOG=debug simon-match experiment dna data/human.txt
#[derive(Debug, Parser)]
#[command(name = "simon-match", about = "Pattern matching under Simon's k-congruence")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Report every window of the text that is k-congruent to the pattern
  Match {
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    text: Option<String>,

    #[arg(long = "text-file", value_name = "TEXT_FILE")]
    text_file: Option<PathBuf>,

    #[arg(short, long)]
    pattern: String,

    #[arg(short, allow_negative_numbers = true)]
    k: i64,

    /// Fixed alphabet, characters outside of it are rejected
    #[arg(long)]
    alphabet: Option<String>,

    /// Use the brute force matcher
    #[arg(long)]
    naive: bool,

    /// Only print the number of matching windows
    #[arg(long)]
    count: bool,

    #[arg(long)]
    json: bool,
  },

  /// Print the shortlex normal form of a word
  NormalForm {
    word: String,

    #[arg(short)]
    k: usize,

    /// Symbols known in advance, in code order
    #[arg(long, default_value = "")]
    alphabet: String,

    /// Reject symbols outside of --alphabet instead of adding them
    #[arg(long)]
    strict: bool,
  },

  /// Print the rank trees of every slice of the text
  Tree {
    #[arg(long)]
    text: String,

    #[arg(short, long)]
    pattern: String,

    #[arg(short)]
    k: usize,

    /// Print the backward tree instead of the forward tree
    #[arg(long)]
    backward: bool,
  },

  #[command(subcommand)]
  Experiment(ExperimentCommand),

  /// Convert a TXT DNA dataset to JSON
  Convert {
    input: PathBuf,
    output: PathBuf,
  },
}

#[derive(Debug, Subcommand)]
enum ExperimentCommand {
  /// Best pattern of every sequence of a `<sequence> <key>` file, one worker per sequence
  Dna {
    input: PathBuf,

    #[arg(long)]
    json: bool,
  },

  /// Best pattern search on random texts, configured by alphabet, k and text lengths lines
  Runtime {
    input: PathBuf,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    json: bool,
  },
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();
  let mut out = io::stdout().lock();

  match cli.command {
    Command::Match { text, text_file, pattern, k, alphabet, naive, count, json } => {
      let text = match (text, text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)?.trim_end().to_string(),
        (None, None) => return Err(Error::InvalidParameter("no text given".into())),
      };
      let matcher: Box<dyn CongruenceMatcher> = match (naive, alphabet) {
        (false, None) => Box::new(SimonMatcher::new()),
        (false, Some(a)) => Box::new(SimonMatcher::with_alphabet(Alphabet::fixed(&a))),
        (true, None) => Box::new(NaiveMatcher::new()),
        (true, Some(a)) => Box::new(NaiveMatcher::with_alphabet(Alphabet::fixed(&a))),
      };
      let occurrences = matcher.find(&text, &pattern, k)?;
      info!("{} triples", occurrences.len());
      if count {
        writeln!(out, "{}", occurrences.iter().map(|o| o.count()).sum::<usize>())?;
      } else if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&occurrences)?)?;
      } else {
        for occurrence in occurrences {
          writeln!(out, "{occurrence}")?;
        }
      }
    }

    Command::NormalForm { word, k, alphabet, strict } => {
      let mut alphabet = if strict { Alphabet::fixed(&alphabet) } else { Alphabet::extensible(&alphabet) };
      let symbols = alphabet.encode_extending(&word)?;
      let res = ShortlexEngine::new(&alphabet).normal_form_of(&symbols, k);
      writeln!(out, "{}", res.normal_form)?;
      writeln!(out, "x: {}", res.x_coord.iter().join(" "))?;
      writeln!(out, "y: {}", res.y_coord.iter().join(" "))?;
      writeln!(out, "blocks: {}", res.stack_form.iter().map(|b| b.iter().collect::<String>()).join("|"))?;
      writeln!(out, "arch ends: {}", res.arch_ends.iter().join(" "))?;
      writeln!(out, "universality: {}", res.universality)?;
    }

    Command::Tree { text, pattern, k, backward } => {
      let alphabet = Alphabet::of_word(&pattern);
      let symbols = alphabet.encode(&pattern)?;
      let canonical = ShortlexEngine::new(&alphabet).normal_form_of(&symbols, k);
      let iota = universality_index(&symbols, alphabet.size()).min(k);
      writeln!(out, "pattern {} with threshold {}, iota {iota}", canonical.normal_form, k as Coord + 1)?;
      for (offset, fragment) in slices(&text, &alphabet) {
        let table = RankTable::build(&fragment, alphabet.size());
        let tree = RankTree::build(&table, &canonical, iota, !backward);
        let direction = if tree.is_forward() { "forward" } else { "backward" };
        writeln!(out, "{direction} tree of slice at {offset}: {}", alphabet.decode(&fragment))?;
        write!(out, "{}", tree.to_text())?;
      }
    }

    Command::Experiment(ExperimentCommand::Dna { input, json }) => {
      let (title, inputs) = experiment::read_sequences(BufReader::new(File::open(input)?))?;
      info!("{title}: {} sequences", inputs.len());
      let results = experiment::run_dna_experiment(&inputs)?;
      if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&results)?)?;
      } else {
        writeln!(out, "Title: {title}\n")?;
        for (i, r) in results.iter().enumerate() {
          writeln!(out, "Sequence {}:\n[{}]", i + 1, r.sequence)?;
          writeln!(out, "k: {}", r.k)?;
          writeln!(out, "original substring: {}", r.original)?;
          writeln!(out, "normal form: {}", r.normal_form)?;
          writeln!(out, "-> with {} matches, key {}\n", r.count, r.key)?;
        }
      }
    }

    Command::Experiment(ExperimentCommand::Runtime { input, seed, json }) => {
      let mut config = ExperimentConfig::read(BufReader::new(File::open(input)?))?;
      config.seed = seed;
      let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
      };
      let reports = experiment::run_runtime_experiment(&config, &mut rng)?;
      if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
      } else {
        writeln!(out, "k: {}\n|T|: {}", config.k, config.text_lengths.iter().join(" "))?;
        for r in reports {
          writeln!(out, "\n== text length {} ==\n{}", r.text_length, r.text)?;
          writeln!(out, "best pattern {} with {} matches among {} patterns", r.best_pattern, r.best_count, r.distinct_patterns)?;
          writeln!(out, "took {} microseconds", r.elapsed_micros)?;
        }
      }
    }

    Command::Convert { input, output } => {
      let animal = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
      let dataset = experiment::convert_dna_dataset(BufReader::new(File::open(&input)?), &animal)?;
      serde_json::to_writer_pretty(File::create(output)?, &dataset)?;
      info!("wrote {} sequences", dataset.sequences.len());
    }
  }
  Ok(())
}
