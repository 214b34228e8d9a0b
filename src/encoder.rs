//! Convolutional encoder
//!
//! The encoder is a finite-state transducer whose state is the last `memory_len` message bits. A
//! message begins with `memory_len` pad bits, all `Zero`, which put the encoder in state `0`
//! before the first information bit; each information bit then produces `num_output_bits` code
//! bits.

use crate::{Bit, Code, Error};

/// Convolutional encoder for a feedforward code
#[derive(Debug)]
pub struct ConvolutionalEncoder {
    /// Code implemented by the encoder
    code: Code,
    /// Current state
    state: usize,
    /// Buffer for output bits
    output_bits: Vec<Bit>,
}

impl ConvolutionalEncoder {
    /// Returns encoder for given code, in state `0`.
    #[must_use]
    pub fn new(code: Code) -> Self {
        let num_output_bits = code.num_output_bits;
        Self {
            code,
            state: 0,
            output_bits: Vec::with_capacity(num_output_bits),
        }
    }

    /// Returns encoder to state `0`.
    pub fn reset(&mut self) {
        self.state = 0;
    }

    /// Returns current state.
    #[must_use]
    pub fn state(&self) -> usize {
        self.state
    }

    /// Returns output bits for given input bit, and updates state.
    ///
    /// # Examples
    ///
    /// ```
    /// use conv_viterbi::{Bit, Code, ConvolutionalEncoder};
    /// use Bit::{One, Zero};
    ///
    /// let mut encoder = ConvolutionalEncoder::new(Code::rate_third());
    /// assert_eq!(encoder.push(One), [One, One, One]);
    /// assert_eq!(encoder.push(Zero), [One, Zero, Zero]);
    /// assert_eq!(encoder.push(Zero), [One, One, Zero]);
    /// assert_eq!(encoder.state(), 0);
    /// ```
    pub fn push(&mut self, input_bit: Bit) -> &[Bit] {
        self.output_bits.clear();
        self.output_bits
            .extend(self.code.output_bits(self.state, input_bit));
        self.state = self.code.next_state(self.state, input_bit);
        &self.output_bits
    }

    /// Returns code bits for given message.
    ///
    /// # Parameters
    ///
    /// - `message`: Message bits. The first `memory_len` bits are pad bits and must be `Zero`; the
    ///   remaining bits are the information bits, of which there must be at least one.
    ///
    /// # Returns
    ///
    /// - `code_bits`: Code bits, `num_output_bits` per information bit.
    ///
    /// # Errors
    ///
    /// Returns an error if `message` has no information bits or if a pad bit is not `Zero`.
    pub fn encode(&mut self, message: &[Bit]) -> Result<Vec<Bit>, Error> {
        check_message(message, self.code.memory_len)?;
        self.reset();
        let info_bits = &message[self.code.memory_len ..];
        let mut code_bits = Vec::with_capacity(info_bits.len() * self.code.num_output_bits);
        for &info_bit in info_bits {
            code_bits.extend_from_slice(self.push(info_bit));
        }
        Ok(code_bits)
    }
}

/// Checks validity of message for code with given memory length.
fn check_message(message: &[Bit], memory_len: usize) -> Result<(), Error> {
    if message.len() <= memory_len {
        return Err(Error::InvalidInput(format!(
            "Expected {memory_len} pad bits followed by at least one information bit \
            (found {} bits)",
            message.len()
        )));
    }
    if message[.. memory_len].iter().any(|&b| b != Bit::Zero) {
        return Err(Error::InvalidInput(format!(
            "First {memory_len} message bits are pad bits and must be zero"
        )));
    }
    Ok(())
}
