//! Block encoder and decoder for a convolutional code

use crate::{Bit, Code, ConvolutionalEncoder, Error, Termination, Trellis, ViterbiDecoder};

/// Returns code bits from convolutional encoder for given message.
///
/// # Parameters
///
/// - `message`: Message bits. The first `code.memory_len()` bits are pad bits and must be `Zero`;
///   they are followed by at least one information bit.
///
/// - `code`: Convolutional code to be used.
///
/// # Returns
///
/// - `code_bits`: Code bits from the encoder, `code.num_output_bits()` per information bit.
///
/// # Errors
///
/// Returns an error if `message` has no information bits or if a pad bit is not `Zero`.
///
/// # Examples
/// ```
/// use conv_viterbi::{encoder, Bit, Code};
/// use Bit::{One, Zero};
///
/// let code = Code::rate_third();
/// let message = [Zero, Zero, One, Zero, Zero];
/// let code_bits = encoder(&message, &code)?;
/// assert_eq!(code_bits, [One, One, One, One, Zero, Zero, One, One, Zero]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn encoder(message: &[Bit], code: &Code) -> Result<Vec<Bit>, Error> {
    ConvolutionalEncoder::new(code.clone()).encode(message)
}

/// Returns information bit decisions from Viterbi decoder for given received symbols.
///
/// # Parameters
///
/// - `symbols`: Received bipolar symbols, `code.num_output_bits()` per information bit, with
///   positive values indicating that `Zero` was sent.
///
/// - `code`: Convolutional code to be used.
///
/// - `termination`: Rule for choosing the state from which the traceback starts.
///
/// # Returns
///
/// - `info_bits_hat`: Decisions on the information bits (pad bits are not included).
///
/// # Errors
///
/// Returns an error if `symbols` is empty or if its length is not a multiple of
/// `code.num_output_bits()`.
///
/// # Examples
/// ```
/// use conv_viterbi::{decoder, Bit, Code, Termination};
/// use Bit::{One, Zero};
///
/// let code = Code::rate_third();
/// let symbols = [-1, -1, -1, -1, 1, 1, -1, -1, 1];
/// let info_bits_hat = decoder(&symbols, &code, Termination::ZeroState)?;
/// assert_eq!(info_bits_hat, [One, Zero, Zero]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decoder(
    symbols: &[i32],
    code: &Code,
    termination: Termination,
) -> Result<Vec<Bit>, Error> {
    let mut viterbi = ViterbiDecoder::new(Trellis::from_code(code), termination);
    Ok(viterbi.decode(symbols)?.bits)
}
