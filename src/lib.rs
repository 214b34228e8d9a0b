//! This crate implements encoding and decoding functionality for a rate-1/3 convolutional code
//! with two bits of encoder memory (constraint length 3). The encoder is a feedforward
//! shift-register transducer, the channel mapping is antipodal (BPSK) with no noise, and the
//! decoder is a hard-decision Viterbi decoder that runs a forward path-metric recursion over the
//! 4-state trellis followed by a traceback from the terminal state.
//!
//! # Examples
//!
//! ```
//! use conv_viterbi::{channel, decoder, encoder, utils, Code, Termination};
//!
//! let code = Code::rate_third();
//! let message = utils::demonstration_message(1024);
//! let code_bits = encoder(&message, &code)?;
//! let symbols = channel::bpsk_map(&code_bits);
//! let info_bits_hat = decoder(&symbols, &code, Termination::BestMetric)?;
//! assert_eq!(info_bits_hat, message[2 ..]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

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

use thiserror::Error;

pub mod channel;
mod codec;
pub mod encoder;
pub mod harness;
pub mod trellis;
pub mod utils;
pub mod viterbi;

pub use codec::{decoder, encoder};
pub use encoder::ConvolutionalEncoder;
pub use trellis::{Code, Trellis};
pub use viterbi::{Decoded, PathMetric, Termination, ViterbiDecoder};

/// Custom error type
#[derive(Error, Debug)]
pub enum Error {
    /// Inconsistent code or trellis definition
    #[error("{0}")]
    InvalidCode(String),
    /// Invalid input error
    #[error("{0}")]
    InvalidInput(String),
    /// File read/write error
    #[error("{0}")]
    FileReadWriteError(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWriteError(#[from] serde_json::Error),
}

/// Enumeration of binary symbol values
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub enum Bit {
    /// Binary symbol `0`
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}
