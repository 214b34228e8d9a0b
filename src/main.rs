//! This crate runs noiseless round trips of the rate-1/3, constraint-length-3 convolutional code
//! through its encoder, a BPSK mapper and a Viterbi decoder, and counts the resulting bit and block
//! errors. Run parameters are specified on the command line, and results are saved to a JSON file.
//!
//! Build the executable with `cargo build --release` and then run
//! `./target/release/conv-viterbi -h` for help on the command-line interface.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

use anyhow::{Context, Result};
use clap::{crate_name, crate_version, value_parser, Arg, ArgMatches, Command};
use conv_viterbi::harness::{self, MessagePattern, RunParams};
use conv_viterbi::Termination;
use std::time::Instant;

/// Main function
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    let json_filename = json_filename_from_matches(&matches)?;
    harness::run_round_trips(&all_run_params(&matches)?, &json_filename)?;
    tracing::info!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Runs noiseless round trips of the rate-1/3 convolutional code and Viterbi decoder")
        .arg(num_info_bits_per_block())
        .arg(message_pattern_names())
        .arg(termination_name())
        .arg(num_blocks())
        .arg(json_filename())
}

/// Returns argument for number of information bits per block.
fn num_info_bits_per_block() -> Arg {
    Arg::new("num_info_bits_per_block")
        .short('i')
        .value_parser(value_parser!(usize))
        .default_value("1024")
        .help("Number of information bits per block")
}

/// Returns argument for message pattern names.
fn message_pattern_names() -> Arg {
    Arg::new("message_pattern_names")
        .short('m')
        .num_args(1 ..)
        .value_parser(["Demonstration", "AllZero", "Impulse", "Random"])
        .default_value("Demonstration")
        .help("Message pattern names (one set of round trips per pattern)")
}

/// Returns argument for termination name.
fn termination_name() -> Arg {
    Arg::new("termination_name")
        .short('t')
        .value_parser(["BestMetric", "ZeroState"])
        .default_value("BestMetric")
        .help("Rule for choosing the state from which the traceback starts")
}

/// Returns argument for number of blocks to be transmitted.
fn num_blocks() -> Arg {
    Arg::new("num_blocks")
        .short('b')
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Number of blocks to be transmitted per message pattern")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns run parameters based on command-line arguments.
fn all_run_params(matches: &ArgMatches) -> Result<Vec<RunParams>> {
    let num_info_bits = num_info_bits_per_block_from_matches(matches)?;
    let termination = termination_from_matches(matches)?;
    let num_blocks = num_blocks_from_matches(matches)?;
    Ok(message_patterns_from_matches(matches)?
        .into_iter()
        .map(|pattern| RunParams {
            num_info_bits,
            pattern,
            termination,
            num_blocks,
        })
        .collect())
}

/// Returns number of information bits per block.
fn num_info_bits_per_block_from_matches(matches: &ArgMatches) -> Result<usize> {
    matches
        .get_one("num_info_bits_per_block")
        .copied()
        .context("Missing number of information bits per block")
}

/// Returns message patterns.
fn message_patterns_from_matches(matches: &ArgMatches) -> Result<Vec<MessagePattern>> {
    matches
        .get_many::<String>("message_pattern_names")
        .context("Missing message pattern names")?
        .map(|name| match name.as_str() {
            "Demonstration" => Ok(MessagePattern::Demonstration),
            "AllZero" => Ok(MessagePattern::AllZero),
            "Impulse" => Ok(MessagePattern::Impulse),
            "Random" => Ok(MessagePattern::Random),
            _ => anyhow::bail!("Invalid message pattern name: {name}"),
        })
        .collect()
}

/// Returns termination rule.
fn termination_from_matches(matches: &ArgMatches) -> Result<Termination> {
    match matches
        .get_one::<String>("termination_name")
        .context("Missing termination name")?
        .as_str()
    {
        "BestMetric" => Ok(Termination::BestMetric),
        "ZeroState" => Ok(Termination::ZeroState),
        name => anyhow::bail!("Invalid termination name: {name}"),
    }
}

/// Returns number of blocks to be transmitted.
fn num_blocks_from_matches(matches: &ArgMatches) -> Result<usize> {
    matches
        .get_one("num_blocks")
        .copied()
        .context("Missing number of blocks")
}

/// Returns name of JSON file to which results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> Result<String> {
    matches
        .get_one::<String>("json_filename")
        .cloned()
        .context("Missing JSON file name")
}
