//! # Message sources and error counting
//!
//! Every message returned here starts with the two `Zero` pad bits required by the rate-1/3 code,
//! followed by the requested number of information bits. The [`demonstration_message`] function
//! returns the fixed demonstration pattern; [`zero_message`], [`impulse_message`] and
//! [`random_message`] return all-zero, single-`One` and random (but flushed) messages; and the
//! [`error_count`] function returns the number of errors in a sequence with respect to a reference
//! sequence.
//!
//! # Examples
//!
//! ```
//! use conv_viterbi::{channel, decoder, encoder, utils, Code, Termination};
//!
//! let code = Code::rate_third();
//! let message = utils::random_message(40)?;
//! let symbols = channel::bpsk_map(&encoder(&message, &code)?);
//! let info_bits_hat = decoder(&symbols, &code, Termination::ZeroState)?;
//! assert_eq!(utils::error_count(&info_bits_hat, &message[2 ..]), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rand::Rng;

use crate::{Bit, Error};

/// Number of pad bits at the start of every message
pub const NUM_PAD_BITS: usize = 2;

/// Leading information bits of the demonstration message
const DEMONSTRATION_PREFIX: [Bit; 13] = [
    Bit::One,
    Bit::One,
    Bit::One,
    Bit::One,
    Bit::Zero,
    Bit::Zero,
    Bit::Zero,
    Bit::One,
    Bit::One,
    Bit::One,
    Bit::One,
    Bit::Zero,
    Bit::Zero,
];

/// Returns demonstration message with given number of information bits.
///
/// The information bits are `1111000111100` followed by alternating bits, with message bit `x`
/// (counting the pad bits) being `x mod 2` from `x = 15` onward.
///
/// # Examples
///
/// ```
/// use conv_viterbi::{utils, Bit};
/// use Bit::{One, Zero};
///
/// let message = utils::demonstration_message(18);
/// assert_eq!(message.len(), 20);
/// assert_eq!(
///     message[12 ..],
///     [One, Zero, Zero, One, Zero, One, Zero, One]
/// );
/// ```
#[must_use]
pub fn demonstration_message(num_info_bits: usize) -> Vec<Bit> {
    let mut message = vec![Bit::Zero; NUM_PAD_BITS];
    message.extend((0 .. num_info_bits).map(|k| {
        DEMONSTRATION_PREFIX
            .get(k)
            .copied()
            .unwrap_or(bit_from_parity(k + NUM_PAD_BITS))
    }));
    message
}

/// Returns message whose information bits are all `Zero`.
#[must_use]
pub fn zero_message(num_info_bits: usize) -> Vec<Bit> {
    vec![Bit::Zero; num_info_bits + NUM_PAD_BITS]
}

/// Returns message whose information bits are all `Zero` except for a single `One`.
///
/// # Parameters
///
/// - `num_info_bits`: Number of information bits.
///
/// - `position`: Index of the `One` among the information bits. Must leave at least two `Zero`
///   information bits on either side, so that the encoder starts and ends in state `0` around it.
///
/// # Errors
///
/// Returns an error if `position` is less than `2` or greater than `num_info_bits - 3`.
pub fn impulse_message(num_info_bits: usize, position: usize) -> Result<Vec<Bit>, Error> {
    if position < 2 || position + 3 > num_info_bits {
        return Err(Error::InvalidInput(format!(
            "Impulse position {position} must be in the range [2, {}] for {num_info_bits} \
            information bits",
            num_info_bits.saturating_sub(3)
        )));
    }
    let mut message = zero_message(num_info_bits);
    message[NUM_PAD_BITS + position] = Bit::One;
    Ok(message)
}

/// Returns message with random information bits, the last two of which are `Zero`.
///
/// # Errors
///
/// Returns an error if `num_info_bits` is less than `2`.
pub fn random_message(num_info_bits: usize) -> Result<Vec<Bit>, Error> {
    if num_info_bits < 2 {
        return Err(Error::InvalidInput(format!(
            "Random message needs at least 2 information bits for flushing (found {num_info_bits})"
        )));
    }
    let mut message = vec![Bit::Zero; NUM_PAD_BITS];
    message.extend(random_bits(num_info_bits - 2));
    message.extend([Bit::Zero, Bit::Zero]);
    Ok(message)
}

/// Returns given number of random bits, each `One` with probability `1/2`.
#[must_use]
pub fn random_bits(num_bits: usize) -> Vec<Bit> {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| if rng.random() { Bit::One } else { Bit::Zero })
        .take(num_bits)
        .collect()
}

/// Returns number of positions at which two sequences differ.
///
/// Only the first `min(seq.len(), ref_seq.len())` positions are compared.
///
/// # Examples
///
/// ```
/// use conv_viterbi::utils;
///
/// let message = utils::demonstration_message(8);
/// assert_eq!(utils::error_count(&message, &utils::zero_message(8)), 5);
/// ```
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    seq.iter().zip(ref_seq).filter(|(x, y)| x != y).count()
}

/// Returns `Zero` for even and `One` for odd integers.
fn bit_from_parity(num: usize) -> Bit {
    match num % 2 {
        0 => Bit::Zero,
        _ => Bit::One,
    }
}
