//! Antipodal (BPSK) channel mapping
//!
//! The [`bpsk_map`] function maps code bits to bipolar channel symbols (`Zero` to `+1`, `One` to
//! `-1`); no noise is added. The [`bpsk_slicer`] function makes hard decisions on symbols.
//!
//! # Examples
//!
//! ```
//! use conv_viterbi::{channel, Bit};
//! use Bit::{One, Zero};
//!
//! let symbols = channel::bpsk_map(&[Zero, One, One]);
//! assert_eq!(symbols, [1, -1, -1]);
//! assert_eq!(channel::bpsk_slicer(&symbols), [Zero, One, One]);
//! ```

use crate::Bit;

/// Returns bipolar symbol for given bit.
#[must_use]
pub fn bpsk_symbol(bit: Bit) -> i32 {
    match bit {
        Bit::Zero => 1,
        Bit::One => -1,
    }
}

/// Returns bipolar channel symbols corresponding to given bits.
#[must_use]
pub fn bpsk_map(bits: &[Bit]) -> Vec<i32> {
    bits.iter().map(|&b| bpsk_symbol(b)).collect()
}

/// Returns BPSK slicer output.
///
/// # Parameters
///
/// - `syms`: Symbols to be sliced. Nonnegative values are mapped to `Zero`, and negative values to
///   `One`.
#[must_use]
pub fn bpsk_slicer(syms: &[i32]) -> Vec<Bit> {
    syms.iter()
        .map(|&x| if x >= 0 { Bit::Zero } else { Bit::One })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_bpsk_symbol() {
        assert_eq!(bpsk_symbol(Zero), 1);
        assert_eq!(bpsk_symbol(One), -1);
    }

    #[test]
    fn test_bpsk_map() {
        assert!(bpsk_map(&[]).is_empty());
        assert_eq!(bpsk_map(&[One, Zero, Zero, One]), [-1, 1, 1, -1]);
    }

    #[test]
    fn test_bpsk_slicer() {
        assert!(bpsk_slicer(&[]).is_empty());
        assert_eq!(bpsk_slicer(&[0, 3, -1, 1, -3]), [Zero, Zero, One, Zero, One]);
    }
}
