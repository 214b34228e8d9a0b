//! Round-trip runner for the rate-1/3 convolutional code over the noiseless BPSK channel
//!
//! For each set of [`RunParams`], a number of blocks are encoded, mapped to bipolar symbols,
//! decoded and compared with the transmitted information bits. Blocks are independent and are run
//! in parallel; the bit and block error counts for each parameter set are collected into
//! [`RunResults`], logged, and saved to a JSON file. Hard decisions on the channel symbols are
//! also compared with the code bits, giving the number of code bits in error before decoding.

use std::fs::File;
use std::io::{BufWriter, Write};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    channel, utils, Bit, Code, ConvolutionalEncoder, Error, Termination, Trellis, ViterbiDecoder,
};

/// Enumeration of message patterns
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum MessagePattern {
    /// Fixed demonstration pattern (`1111000111100` followed by alternating bits)
    Demonstration,
    /// All information bits `Zero`
    AllZero,
    /// Single `One` in the middle of the information bits
    Impulse,
    /// Random information bits, the last two being `Zero`
    Random,
}

impl MessagePattern {
    /// Returns message with given number of information bits.
    fn message(self, num_info_bits: usize) -> Result<Vec<Bit>, Error> {
        match self {
            MessagePattern::Demonstration => Ok(utils::demonstration_message(num_info_bits)),
            MessagePattern::AllZero => Ok(utils::zero_message(num_info_bits)),
            MessagePattern::Impulse => utils::impulse_message(num_info_bits, num_info_bits / 2),
            MessagePattern::Random => utils::random_message(num_info_bits),
        }
    }
}

/// Parameters for round-trip runs
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct RunParams {
    /// Number of information bits per block
    pub num_info_bits: usize,
    /// Message pattern to be transmitted
    pub pattern: MessagePattern,
    /// Rule for choosing the terminal state in the decoder
    pub termination: Termination,
    /// Number of blocks to be transmitted
    pub num_blocks: usize,
}

/// Results from round-trip runs
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct RunResults {
    /// Parameters of the runs
    pub params: RunParams,
    /// Number of information bits transmitted
    pub num_bits: usize,
    /// Number of code bits in error after hard decisions on the channel symbols
    pub num_code_bit_errors: usize,
    /// Number of information bits decoded in error
    pub num_bit_errors: usize,
    /// Number of blocks with at least one bit error
    pub num_block_errors: usize,
    /// Bit error rate
    pub ber: f64,
    /// Block error rate
    pub bler: f64,
}

impl RunResults {
    /// Returns results given the error counts for each block.
    #[allow(clippy::cast_precision_loss)]
    fn new(params: RunParams, all_block_errors: &[BlockErrors]) -> Self {
        let num_bits = params.num_info_bits * all_block_errors.len();
        let num_code_bit_errors = all_block_errors.iter().map(|e| e.num_code_bit_errors).sum();
        let num_bit_errors = all_block_errors.iter().map(|e| e.num_bit_errors).sum();
        let num_block_errors = all_block_errors
            .iter()
            .filter(|e| e.num_bit_errors > 0)
            .count();
        Self {
            params,
            num_bits,
            num_code_bit_errors,
            num_bit_errors,
            num_block_errors,
            ber: num_bit_errors as f64 / num_bits as f64,
            bler: num_block_errors as f64 / all_block_errors.len() as f64,
        }
    }
}

/// Error counts for a single round trip
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
struct BlockErrors {
    /// Code bits in error after hard decisions on the channel symbols
    num_code_bit_errors: usize,
    /// Information bits in error after decoding
    num_bit_errors: usize,
}

impl std::fmt::Display for RunResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} message, {} information bits, {}: BER = {:.3e}, BLER = {:.3e} \
            ({} bit errors, {} block errors in {} blocks; {} code bit errors)",
            self.params.pattern,
            self.params.num_info_bits,
            self.params.termination,
            self.ber,
            self.bler,
            self.num_bit_errors,
            self.num_block_errors,
            self.params.num_blocks,
            self.num_code_bit_errors
        )
    }
}

/// Runs round trips for all given parameter sets, and saves results to a JSON file.
///
/// # Parameters
///
/// - `all_params`: Parameters for each set of runs.
///
/// - `json_filename`: Name of the JSON file to which all results must be written.
///
/// # Returns
///
/// - `all_results`: Results for each set of runs.
///
/// # Errors
///
/// Returns an error if any parameter set is invalid or if the results cannot be saved.
pub fn run_round_trips(
    all_params: &[RunParams],
    json_filename: &str,
) -> Result<Vec<RunResults>, Error> {
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        let results = run_round_trips_for_params(params)?;
        tracing::info!("{results}");
        all_results.push(results);
    }
    save_all_results(&all_results, json_filename)?;
    Ok(all_results)
}

/// Returns results of round trips for a single parameter set.
fn run_round_trips_for_params(params: &RunParams) -> Result<RunResults, Error> {
    check_run_params(params)?;
    let code = Code::rate_third();
    let trellis = Trellis::from_code(&code);
    let all_block_errors = (0 .. params.num_blocks)
        .into_par_iter()
        .map(|_| run_block(params, &code, &trellis))
        .collect::<Result<Vec<BlockErrors>, Error>>()?;
    Ok(RunResults::new(*params, &all_block_errors))
}

/// Returns error counts for a single round trip.
fn run_block(params: &RunParams, code: &Code, trellis: &Trellis) -> Result<BlockErrors, Error> {
    let message = params.pattern.message(params.num_info_bits)?;
    let code_bits = ConvolutionalEncoder::new(code.clone()).encode(&message)?;
    let symbols = channel::bpsk_map(&code_bits);
    let decoded = ViterbiDecoder::new(trellis.clone(), params.termination).decode(&symbols)?;
    Ok(BlockErrors {
        num_code_bit_errors: utils::error_count(&channel::bpsk_slicer(&symbols), &code_bits),
        num_bit_errors: utils::error_count(&decoded.bits, &message[code.memory_len() ..]),
    })
}

/// Checks validity of run parameters.
fn check_run_params(params: &RunParams) -> Result<(), Error> {
    if params.num_info_bits == 0 {
        return Err(Error::InvalidInput(
            "Number of information bits per block cannot be zero".to_string(),
        ));
    }
    if params.num_blocks == 0 {
        return Err(Error::InvalidInput(
            "Number of blocks cannot be zero".to_string(),
        ));
    }
    Ok(())
}

/// Saves all results to a JSON file.
fn save_all_results(all_results: &[RunResults], json_filename: &str) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(&mut writer, all_results)?;
    writer.flush()?;
    Ok(())
}
