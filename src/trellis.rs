//! Code definition and trellis for a feedforward convolutional code
//!
//! A [`Code`] is given by its constraint length `L` and its generator polynomials; bit `i` of a
//! generator polynomial is the tap on the input bit delayed by `i` time steps, so bit `0` taps
//! the current input bit. The state at time `n` is the integer whose bit `i` is `b(n-1-i)`, i.e.,
//! the most recent input bit is the LSB.
//!
//! A [`Trellis`] lists the `2 * num_states` edges of the code in the order (state `0`, input
//! `Zero`), (state `0`, input `One`), (state `1`, input `Zero`), ... Each edge carries the bipolar
//! reference output expected on the channel and the bit to be output by the decoder when the edge
//! lies on the decoded path.

use itertools::Itertools;

use crate::{channel, Bit, Error};

/// Largest constraint length accepted by [`Code::new`]
const MAX_CONSTRAINT_LEN: usize = 16;

/// Generator polynomials for the rate-1/3 code of constraint length 3
///
/// The output bits for input bit `b(n)` are `b(n) + b(n-1) + b(n-2)`, `b(n) + b(n-2)` and `b(n)`
/// (modulo 2).
pub const RATE_THIRD_POLYNOMIALS: [usize; 3] = [0b111, 0b101, 0b001];

/// Constraint length of the rate-1/3 code
pub const RATE_THIRD_CONSTRAINT_LEN: usize = 3;

/// Feedforward convolutional code of rate `1/N`
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Code {
    /// Code polynomials
    pub(crate) code_polynomials: Vec<usize>,
    /// Memory length
    pub(crate) memory_len: usize,
    /// Number of states
    pub(crate) num_states: usize,
    /// Number of output bits
    pub(crate) num_output_bits: usize,
}

impl Code {
    /// Returns code with given constraint length and generator polynomials.
    ///
    /// # Parameters
    ///
    /// - `constraint_len`: Number of input bits (current plus memory) that influence each group of
    ///   output bits. Must be in the range `[2, 16]`.
    ///
    /// - `code_polynomials`: Integer representations of the generator polynomials, one per output
    ///   bit. Each must be in the range `[1, 2^constraint_len)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `constraint_len` is out of range, if `code_polynomials` is empty, or if
    /// any code polynomial is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use conv_viterbi::Code;
    ///
    /// let code = Code::new(3, &[0b111, 0b101, 0b001])?;
    /// assert_eq!(code, Code::rate_third());
    /// assert!(Code::new(3, &[0b111, 0b1000]).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(constraint_len: usize, code_polynomials: &[usize]) -> Result<Self, Error> {
        check_code_polynomials(constraint_len, code_polynomials)?;
        Ok(Self::from_valid_polynomials(constraint_len, code_polynomials))
    }

    /// Returns the rate-1/3 code of constraint length 3.
    #[must_use]
    pub fn rate_third() -> Self {
        Self::from_valid_polynomials(RATE_THIRD_CONSTRAINT_LEN, &RATE_THIRD_POLYNOMIALS)
    }

    /// Returns code polynomials.
    #[must_use]
    pub fn code_polynomials(&self) -> &[usize] {
        &self.code_polynomials
    }

    /// Returns number of memory bits, which is also the number of pad bits a message needs.
    #[must_use]
    pub fn memory_len(&self) -> usize {
        self.memory_len
    }

    /// Returns number of encoder states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Returns number of output bits per input bit.
    #[must_use]
    pub fn num_output_bits(&self) -> usize {
        self.num_output_bits
    }

    /// Returns state reached from given state on given input bit.
    pub(crate) fn next_state(&self, state: usize, input_bit: Bit) -> usize {
        self.register(state, input_bit) & (self.num_states - 1)
    }

    /// Returns output bits for given state and input bit.
    pub(crate) fn output_bits(
        &self,
        state: usize,
        input_bit: Bit,
    ) -> impl Iterator<Item = Bit> + '_ {
        let register = self.register(state, input_bit);
        self.code_polynomials
            .iter()
            .map(move |&code_poly| bitxor(register & code_poly))
    }

    /// Returns integer obtained by shifting given input bit into the LSB of given state.
    fn register(&self, state: usize, input_bit: Bit) -> usize {
        match input_bit {
            Bit::Zero => state << 1,
            Bit::One => (state << 1) | 1,
        }
    }

    fn from_valid_polynomials(constraint_len: usize, code_polynomials: &[usize]) -> Self {
        Self {
            code_polynomials: code_polynomials.to_vec(),
            memory_len: constraint_len - 1,
            num_states: 1 << (constraint_len - 1),
            num_output_bits: code_polynomials.len(),
        }
    }
}

/// Directed edge of a trellis
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Edge {
    /// State at which the edge starts
    pub origin: usize,
    /// State at which the edge ends
    pub dest: usize,
    /// Encoder input bit causing the transition
    pub input_bit: Bit,
    /// Bit output by the decoder when the edge lies on the decoded path
    pub label: Bit,
    /// Bipolar encoder output expected on the channel for the transition
    pub reference: Vec<i32>,
}

/// Trellis of a rate-`1/N` convolutional code with one input bit per time step
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Trellis {
    /// Number of states
    pub(crate) num_states: usize,
    /// Number of bipolar symbols on each edge
    pub(crate) num_outputs: usize,
    /// All edges, in order of origin state and then input bit
    pub(crate) edges: Vec<Edge>,
    /// Indices into `edges` of the edges ending at each state, in enumeration order
    pub(crate) incoming: Vec<Vec<usize>>,
}

impl Trellis {
    /// Returns trellis of given code.
    ///
    /// # Examples
    ///
    /// ```
    /// use conv_viterbi::{Code, Trellis};
    ///
    /// let trellis = Trellis::from_code(&Code::rate_third());
    /// assert_eq!(trellis.num_states(), 4);
    /// assert_eq!(trellis.edges().len(), 8);
    /// assert_eq!(trellis.edges()[1].reference, [-1, -1, -1]);
    /// ```
    #[must_use]
    pub fn from_code(code: &Code) -> Self {
        let edges = (0 .. code.num_states)
            .cartesian_product([Bit::Zero, Bit::One])
            .map(|(origin, input_bit)| Edge {
                origin,
                dest: code.next_state(origin, input_bit),
                input_bit,
                label: input_bit,
                reference: code
                    .output_bits(origin, input_bit)
                    .map(channel::bpsk_symbol)
                    .collect(),
            })
            .collect();
        Self::from_edges(code.num_states, code.num_output_bits, edges)
    }

    /// Returns trellis defined by tables of reference outputs and decoded-bit labels.
    ///
    /// # Parameters
    ///
    /// - `num_states`: Number of states. Must be a power of `2` no smaller than `2`.
    ///
    /// - `reference_outputs`: Bipolar reference output for each of the `2 * num_states` edges, in
    ///   the order (state `0`, input `Zero`), (state `0`, input `One`), (state `1`, input `Zero`),
    ///   ... All must have the same nonzero length, and every symbol must be `+1` or `-1`.
    ///
    /// - `output_labels`: Decoded-bit label for each edge, in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables are inconsistent with `num_states` or with each other, or if
    /// a reference symbol is not bipolar.
    ///
    /// # Examples
    ///
    /// ```
    /// use conv_viterbi::{Bit, Code, Trellis};
    /// use Bit::{One, Zero};
    ///
    /// let reference_outputs = [
    ///     vec![1, 1, 1],
    ///     vec![-1, -1, -1],
    ///     vec![-1, 1, 1],
    ///     vec![1, -1, -1],
    ///     vec![-1, -1, 1],
    ///     vec![1, 1, -1],
    ///     vec![1, -1, 1],
    ///     vec![-1, 1, -1],
    /// ];
    /// let output_labels = [Zero, One, Zero, One, Zero, One, Zero, One];
    /// let trellis = Trellis::from_tables(4, &reference_outputs, &output_labels)?;
    /// assert_eq!(trellis, Trellis::from_code(&Code::rate_third()));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_tables(
        num_states: usize,
        reference_outputs: &[Vec<i32>],
        output_labels: &[Bit],
    ) -> Result<Self, Error> {
        check_tables(num_states, reference_outputs, output_labels)?;
        let edges = reference_outputs
            .iter()
            .zip(output_labels)
            .enumerate()
            .map(|(edge_index, (reference, &label))| {
                let origin = edge_index / 2;
                let input_bit = bit_from_index(edge_index % 2);
                let dest = ((origin << 1) | (edge_index % 2)) & (num_states - 1);
                Edge {
                    origin,
                    dest,
                    input_bit,
                    label,
                    reference: reference.clone(),
                }
            })
            .collect();
        Ok(Self::from_edges(num_states, reference_outputs[0].len(), edges))
    }

    /// Returns number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Returns number of bipolar symbols per edge (and hence per decoded bit).
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Returns all edges, in order of origin state and then input bit.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn from_edges(num_states: usize, num_outputs: usize, edges: Vec<Edge>) -> Self {
        let mut incoming = vec![Vec::with_capacity(2); num_states];
        for (edge_index, edge) in edges.iter().enumerate() {
            incoming[edge.dest].push(edge_index);
        }
        Self {
            num_states,
            num_outputs,
            edges,
            incoming,
        }
    }
}

/// Checks validity of constraint length and code polynomials.
fn check_code_polynomials(constraint_len: usize, code_polynomials: &[usize]) -> Result<(), Error> {
    if !(2 ..= MAX_CONSTRAINT_LEN).contains(&constraint_len) {
        return Err(Error::InvalidCode(format!(
            "Constraint length must be in the range [2, {MAX_CONSTRAINT_LEN}] (found {constraint_len})"
        )));
    }
    if code_polynomials.is_empty() {
        return Err(Error::InvalidCode(
            "Expected at least one code polynomial".to_string(),
        ));
    }
    let two_pow_constraint_len = 1 << constraint_len;
    if code_polynomials
        .iter()
        .any(|&x| x == 0 || x >= two_pow_constraint_len)
    {
        return Err(Error::InvalidCode(format!(
            "For constraint length of {constraint_len}, each code polynomial must be in the \
            range [1, {two_pow_constraint_len}), found {code_polynomials:?}",
        )));
    }
    Ok(())
}

/// Checks consistency of reference-output and decoded-label tables with number of states.
fn check_tables(
    num_states: usize,
    reference_outputs: &[Vec<i32>],
    output_labels: &[Bit],
) -> Result<(), Error> {
    if num_states < 2 || !num_states.is_power_of_two() {
        return Err(Error::InvalidCode(format!(
            "Number of states must be a power of 2 no smaller than 2 (found {num_states})"
        )));
    }
    let Some(num_edges) = num_states.checked_mul(2) else {
        return Err(Error::InvalidCode(format!(
            "Number of states is too large (found {num_states})"
        )));
    };
    if reference_outputs.len() != num_edges || output_labels.len() != num_edges {
        return Err(Error::InvalidCode(format!(
            "For {num_states} states, expected {num_edges} reference outputs and labels \
            (found {} and {})",
            reference_outputs.len(),
            output_labels.len()
        )));
    }
    let num_outputs = reference_outputs[0].len();
    if num_outputs == 0 || reference_outputs.iter().any(|r| r.len() != num_outputs) {
        return Err(Error::InvalidCode(
            "Reference outputs must all have the same nonzero length".to_string(),
        ));
    }
    if reference_outputs.iter().flatten().any(|&x| x != 1 && x != -1) {
        return Err(Error::InvalidCode(
            "Reference output symbols must be +1 or -1".to_string(),
        ));
    }
    Ok(())
}

/// Returns XOR of bits in the binary representation of given integer.
fn bitxor(num: usize) -> Bit {
    match num.count_ones() % 2 {
        0 => Bit::Zero,
        _ => Bit::One,
    }
}

/// Returns bit corresponding to given index.
fn bit_from_index(bit_index: usize) -> Bit {
    match bit_index {
        0 => Bit::Zero,
        _ => Bit::One,
    }
}

#[cfg(test)]
mod tests_of_code {
    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_new() {
        let code = Code::new(3, &[0b111, 0b101, 0b001]).unwrap();
        assert_eq!(code.code_polynomials, [0b111, 0b101, 0b001]);
        assert_eq!(code.memory_len, 2);
        assert_eq!(code.num_states, 4);
        assert_eq!(code.num_output_bits, 3);
        assert_eq!(code, Code::rate_third());
        let code = Code::new(7, &[0o171, 0o133]).unwrap();
        assert_eq!(code.memory_len, 6);
        assert_eq!(code.num_states, 64);
        assert_eq!(code.num_output_bits, 2);
    }

    #[test]
    fn test_next_state() {
        let code = Code::rate_third();
        let correct_next_state_for_zero = [0, 2, 0, 2];
        let correct_next_state_for_one = [1, 3, 1, 3];
        for state in 0 .. code.num_states {
            assert_eq!(
                code.next_state(state, Zero),
                correct_next_state_for_zero[state]
            );
            assert_eq!(
                code.next_state(state, One),
                correct_next_state_for_one[state]
            );
        }
    }

    #[test]
    fn test_output_bits() {
        let code = Code::rate_third();
        let correct_output_bits_for_zero = [
            [Zero, Zero, Zero],
            [One, Zero, Zero],
            [One, One, Zero],
            [Zero, One, Zero],
        ];
        let correct_output_bits_for_one = [
            [One, One, One],
            [Zero, One, One],
            [Zero, Zero, One],
            [One, Zero, One],
        ];
        for state in 0 .. code.num_states {
            assert_eq!(
                code.output_bits(state, Zero).collect::<Vec<_>>(),
                correct_output_bits_for_zero[state]
            );
            assert_eq!(
                code.output_bits(state, One).collect::<Vec<_>>(),
                correct_output_bits_for_one[state]
            );
        }
    }

    #[test]
    fn test_register() {
        let code = Code::rate_third();
        assert_eq!(code.register(0, Zero), 0);
        assert_eq!(code.register(0, One), 1);
        assert_eq!(code.register(2, Zero), 4);
        assert_eq!(code.register(3, One), 7);
    }
}
