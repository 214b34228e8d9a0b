//! Hard-decision Viterbi decoder
//!
//! Decoding is in two phases. The forward pass walks the trellis one received symbol group at a
//! time: every edge gets a candidate path metric (the path metric of its origin state plus the
//! correlation of the received symbols with the edge's reference output), and every state keeps
//! the incoming edge with the larger candidate, the first-enumerated edge winning ties. The
//! traceback then follows the stored winning edges backward from the terminal state, reading off
//! one decoded bit per time step.

use serde::{Deserialize, Serialize};

use crate::{Bit, Error, Trellis};

/// Accumulated path metric of a trellis node
///
/// `Unreachable` compares below every `Reachable` value, and stays `Unreachable` when extended by
/// a branch metric.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Copy)]
pub enum PathMetric {
    /// No encoder path reaches the node
    Unreachable,
    /// Best accumulated correlation of any encoder path reaching the node
    Reachable(i64),
}

impl PathMetric {
    /// Returns path metric extended by given branch metric.
    fn extend(self, branch_metric: i64) -> Self {
        match self {
            PathMetric::Unreachable => PathMetric::Unreachable,
            PathMetric::Reachable(metric) => {
                PathMetric::Reachable(metric.saturating_add(branch_metric))
            }
        }
    }
}

/// Enumeration of rules for choosing the state from which the traceback starts
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Default, Deserialize, Serialize)]
pub enum Termination {
    /// Start from the state with the best final path metric (lowest index on ties)
    #[default]
    BestMetric,
    /// Start from state `0` (the message must return the encoder to state `0`)
    ZeroState,
}

impl Termination {
    /// Returns the name of the variant.
    fn name(self) -> &'static str {
        match self {
            Termination::BestMetric => "best-metric",
            Termination::ZeroState => "zero-state",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} traceback", self.name())
    }
}

/// Result of decoding a block
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Decoded {
    /// Decoded bits, one per time step
    pub bits: Vec<Bit>,
    /// State from which the traceback started
    pub terminal_state: usize,
    /// Path metric of the terminal state
    pub path_metric: PathMetric,
}

/// Workspace for decoder
#[derive(Debug)]
struct DecoderWorkspace {
    /// Number of trellis states
    num_states: usize,
    /// Path metrics for all states at all time instants, time-major
    path_metrics: Vec<PathMetric>,
    /// Winning incoming edge for all states at all time instants after the first, time-major
    predecessors: Vec<usize>,
    /// Buffer for candidate path metrics, one per edge
    candidates: Vec<PathMetric>,
}

impl DecoderWorkspace {
    /// Returns new workspace for decoder.
    fn new(num_states: usize) -> Self {
        let mut workspace = Self {
            num_states,
            path_metrics: Vec::new(),
            predecessors: Vec::new(),
            candidates: Vec::with_capacity(2 * num_states),
        };
        workspace.init_path_metrics(0);
        workspace
    }

    /// Initializes path metrics for all states at time `0` and clears all other table entries.
    fn init_path_metrics(&mut self, num_steps: usize) {
        self.path_metrics.clear();
        self.path_metrics.reserve((num_steps + 1) * self.num_states);
        self.path_metrics.push(PathMetric::Reachable(0));
        for _ in 1 .. self.num_states {
            self.path_metrics.push(PathMetric::Unreachable);
        }
        self.predecessors.clear();
        self.predecessors.reserve(num_steps * self.num_states);
    }

    /// Returns number of time steps covered by the tables.
    fn num_steps(&self) -> usize {
        self.predecessors.len() / self.num_states
    }

    /// Returns path metrics for all states at given time instant.
    fn path_metrics_at(&self, t: usize) -> &[PathMetric] {
        &self.path_metrics[t * self.num_states .. (t + 1) * self.num_states]
    }
}

/// Viterbi decoder, owning the trellis and the path metric and predecessor tables
#[derive(Debug)]
pub struct ViterbiDecoder {
    /// Trellis of the code
    trellis: Trellis,
    /// Rule for choosing the terminal state
    termination: Termination,
    /// Path metric and predecessor tables from the last decoded block
    workspace: DecoderWorkspace,
}

impl ViterbiDecoder {
    /// Returns decoder for given trellis and terminal-state rule.
    #[must_use]
    pub fn new(trellis: Trellis, termination: Termination) -> Self {
        let workspace = DecoderWorkspace::new(trellis.num_states);
        Self {
            trellis,
            termination,
            workspace,
        }
    }

    /// Returns the terminal-state rule.
    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Returns decoded bits for given received symbols.
    ///
    /// # Parameters
    ///
    /// - `symbols`: Received bipolar symbols, `num_outputs` per time step, with positive values
    ///   indicating bit `Zero`.
    ///
    /// # Returns
    ///
    /// - `decoded`: Decoded bits (one per time step), along with the state from which the
    ///   traceback started and its path metric.
    ///
    /// # Errors
    ///
    /// Returns an error if `symbols` is empty or if its length is not a multiple of
    /// `num_outputs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use conv_viterbi::{Bit, Code, PathMetric, Termination, Trellis, ViterbiDecoder};
    /// use Bit::{One, Zero};
    ///
    /// let trellis = Trellis::from_code(&Code::rate_third());
    /// let mut decoder = ViterbiDecoder::new(trellis, Termination::ZeroState);
    /// let symbols = [1, 1, 1, -1, -1, -1, -1, 1, 1, -1, -1, 1];
    /// let decoded = decoder.decode(&symbols)?;
    /// assert_eq!(decoded.bits, [Zero, One, Zero, Zero]);
    /// assert_eq!(decoded.terminal_state, 0);
    /// assert_eq!(decoded.path_metric, PathMetric::Reachable(12));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode(&mut self, symbols: &[i32]) -> Result<Decoded, Error> {
        check_symbols(symbols, &self.trellis)?;
        run_forward_pass(symbols, &self.trellis, &mut self.workspace);
        let terminal_state = terminal_state(self.termination, &self.workspace);
        let bits = run_traceback(terminal_state, &self.trellis, &self.workspace);
        let path_metric = self.workspace.path_metrics_at(bits.len())[terminal_state];
        tracing::debug!(
            num_steps = bits.len(),
            terminal_state,
            ?path_metric,
            "decoded block"
        );
        Ok(Decoded {
            bits,
            terminal_state,
            path_metric,
        })
    }

    /// Returns path metric of given state at given time instant of the last decoded block, or
    /// `None` if either is out of range.
    #[must_use]
    pub fn path_metric(&self, t: usize, state: usize) -> Option<PathMetric> {
        if t > self.workspace.num_steps() || state >= self.trellis.num_states {
            return None;
        }
        Some(self.workspace.path_metrics_at(t)[state])
    }

    /// Returns index of the winning edge into given state at given time instant of the last
    /// decoded block, or `None` if either is out of range (there is no edge into time `0`).
    #[must_use]
    pub fn predecessor(&self, t: usize, state: usize) -> Option<usize> {
        if t == 0 || t > self.workspace.num_steps() || state >= self.trellis.num_states {
            return None;
        }
        Some(self.workspace.predecessors[(t - 1) * self.trellis.num_states + state])
    }
}

/// Checks validity of received symbols.
fn check_symbols(symbols: &[i32], trellis: &Trellis) -> Result<(), Error> {
    if symbols.is_empty() || symbols.len() % trellis.num_outputs != 0 {
        return Err(Error::InvalidInput(format!(
            "Expected a positive multiple of {} received symbols (found {})",
            trellis.num_outputs,
            symbols.len()
        )));
    }
    Ok(())
}

/// Runs forward pass through the trellis, filling the path metric and predecessor tables.
fn run_forward_pass(symbols: &[i32], trellis: &Trellis, workspace: &mut DecoderWorkspace) {
    workspace.init_path_metrics(symbols.len() / trellis.num_outputs);
    for chunk in symbols.chunks_exact(trellis.num_outputs) {
        compute_next_path_metrics(chunk, trellis, workspace);
    }
}

/// Computes path metrics and winning edges for all states at next time instant.
fn compute_next_path_metrics(
    received: &[i32],
    trellis: &Trellis,
    workspace: &mut DecoderWorkspace,
) {
    let index_of_first_prev = workspace.path_metrics.len() - trellis.num_states;
    workspace.candidates.clear();
    for edge in &trellis.edges {
        let prev = workspace.path_metrics[index_of_first_prev + edge.origin];
        workspace
            .candidates
            .push(prev.extend(branch_metric(received, &edge.reference)));
    }
    for incoming in &trellis.incoming {
        // Every state has two incoming edges; the later one must be strictly better to win.
        let mut winner = incoming[0];
        for &edge_index in &incoming[1 ..] {
            if workspace.candidates[edge_index] > workspace.candidates[winner] {
                winner = edge_index;
            }
        }
        workspace.path_metrics.push(workspace.candidates[winner]);
        workspace.predecessors.push(winner);
    }
}

/// Returns state from which the traceback starts.
fn terminal_state(termination: Termination, workspace: &DecoderWorkspace) -> usize {
    match termination {
        Termination::ZeroState => 0,
        Termination::BestMetric => {
            let final_metrics = workspace.path_metrics_at(workspace.num_steps());
            let mut best_state = 0;
            for (state, &metric) in final_metrics.iter().enumerate().skip(1) {
                if metric > final_metrics[best_state] {
                    best_state = state;
                }
            }
            best_state
        }
    }
}

/// Returns decoded bits obtained by tracing back from given terminal state.
fn run_traceback(
    terminal_state: usize,
    trellis: &Trellis,
    workspace: &DecoderWorkspace,
) -> Vec<Bit> {
    let num_steps = workspace.num_steps();
    let mut bits = vec![Bit::Zero; num_steps];
    let mut state = terminal_state;
    for t in (1 ..= num_steps).rev() {
        let edge = &trellis.edges[workspace.predecessors[(t - 1) * trellis.num_states + state]];
        bits[t - 1] = edge.label;
        state = edge.origin;
    }
    bits
}

/// Returns correlation of received symbols with reference output of an edge.
fn branch_metric(received: &[i32], reference: &[i32]) -> i64 {
    received
        .iter()
        .zip(reference)
        .map(|(&y, &u)| i64::from(y) * i64::from(u))
        .sum()
}

#[cfg(test)]
mod tests_of_path_metric {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(PathMetric::Unreachable < PathMetric::Reachable(i64::MIN));
        assert!(PathMetric::Unreachable < PathMetric::Reachable(0));
        assert!(PathMetric::Reachable(-3) < PathMetric::Reachable(3));
        assert_eq!(PathMetric::Unreachable, PathMetric::Unreachable);
        assert_eq!(
            PathMetric::Unreachable.max(PathMetric::Reachable(-7)),
            PathMetric::Reachable(-7)
        );
    }

    #[test]
    fn test_extend() {
        assert_eq!(PathMetric::Unreachable.extend(3), PathMetric::Unreachable);
        assert_eq!(PathMetric::Unreachable.extend(-3), PathMetric::Unreachable);
        assert_eq!(PathMetric::Reachable(6).extend(-1), PathMetric::Reachable(5));
        assert_eq!(
            PathMetric::Reachable(i64::MAX).extend(3),
            PathMetric::Reachable(i64::MAX)
        );
    }
}

#[cfg(test)]
mod tests_of_functions {
    use super::*;
    use crate::{channel, utils, Code, ConvolutionalEncoder};
    use Bit::{One, Zero};

    fn rate_third_decoder(termination: Termination) -> ViterbiDecoder {
        ViterbiDecoder::new(Trellis::from_code(&Code::rate_third()), termination)
    }

    fn received_symbols(message: &[Bit]) -> Vec<i32> {
        let mut encoder = ConvolutionalEncoder::new(Code::rate_third());
        channel::bpsk_map(&encoder.encode(message).unwrap())
    }

    #[test]
    fn test_new() {
        let decoder = rate_third_decoder(Termination::ZeroState);
        assert_eq!(decoder.termination(), Termination::ZeroState);
        assert_eq!(decoder.path_metric(0, 0), Some(PathMetric::Reachable(0)));
        assert_eq!(decoder.path_metric(0, 3), Some(PathMetric::Unreachable));
        assert!(decoder.path_metric(1, 0).is_none());
        assert!(decoder.predecessor(0, 0).is_none());
    }

    #[test]
    fn test_predecessor() {
        let mut decoder = rate_third_decoder(Termination::BestMetric);
        decoder.decode(&[-1, -1, -1, -1, 1, 1]).unwrap();
        assert_eq!(decoder.predecessor(1, 1), Some(1));
        assert_eq!(decoder.predecessor(2, 2), Some(2));
        assert!(decoder.predecessor(3, 0).is_none());
        assert!(decoder.predecessor(1, 4).is_none());
    }

    #[test]
    fn test_decode_invalid_inputs() {
        let mut decoder = rate_third_decoder(Termination::BestMetric);
        assert!(decoder.decode(&[]).is_err());
        assert!(decoder.decode(&[1, 1]).is_err());
        assert!(decoder.decode(&[1, 1, 1, 1]).is_err());
        assert!(decoder.decode(&[1, 1, 1]).is_ok());
    }

    #[test]
    fn test_decode_all_zero() {
        for termination in [Termination::BestMetric, Termination::ZeroState] {
            let mut decoder = rate_third_decoder(termination);
            for num_info_bits in 1 .. 20 {
                let symbols = received_symbols(&utils::zero_message(num_info_bits));
                assert!(symbols.iter().all(|&y| y == 1));
                let decoded = decoder.decode(&symbols).unwrap();
                assert_eq!(decoded.bits, vec![Zero; num_info_bits]);
                assert_eq!(decoded.terminal_state, 0);
            }
        }
    }

    #[test]
    fn test_decode_impulse() {
        let mut decoder = rate_third_decoder(Termination::ZeroState);
        for position in 2 .. 8 {
            let message = utils::impulse_message(10, position).unwrap();
            let decoded = decoder.decode(&received_symbols(&message)).unwrap();
            assert_eq!(decoded.bits, message[2 ..]);
            assert_eq!(decoded.path_metric, PathMetric::Reachable(30));
        }
    }

    #[test]
    fn test_decode_flushed_random_messages() {
        for termination in [Termination::BestMetric, Termination::ZeroState] {
            let mut decoder = rate_third_decoder(termination);
            for num_info_bits in [2, 3, 17, 256] {
                let message = utils::random_message(num_info_bits).unwrap();
                let decoded = decoder.decode(&received_symbols(&message)).unwrap();
                assert_eq!(decoded.bits, message[2 ..]);
                assert_eq!(decoded.terminal_state, 0);
            }
        }
    }

    #[test]
    fn test_decode_demonstration_message() {
        let message = utils::demonstration_message(1024);
        let symbols = received_symbols(&message);
        // Message does not return the encoder to state `0`
        let mut decoder = rate_third_decoder(Termination::BestMetric);
        let decoded = decoder.decode(&symbols).unwrap();
        assert_eq!(utils::error_count(&decoded.bits, &message[2 ..]), 0);
        assert_eq!(decoded.terminal_state, 1);
        assert_eq!(decoded.path_metric, PathMetric::Reachable(3 * 1024));
        // Forcing state `0` costs exactly the last bit
        let mut decoder = rate_third_decoder(Termination::ZeroState);
        let decoded = decoder.decode(&symbols).unwrap();
        assert_eq!(utils::error_count(&decoded.bits, &message[2 ..]), 1);
        assert_eq!(decoded.bits[1023], Zero);
        assert_eq!(decoded.path_metric, PathMetric::Reachable(3 * 1024 - 6));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let message = utils::random_message(64).unwrap();
        let symbols = received_symbols(&message);
        let mut decoder = rate_third_decoder(Termination::BestMetric);
        let first = decoder.decode(&symbols).unwrap();
        let second = decoder.decode(&symbols).unwrap();
        assert_eq!(first, second);
        let mut other_decoder = rate_third_decoder(Termination::BestMetric);
        assert_eq!(other_decoder.decode(&symbols).unwrap(), first);
    }

    #[test]
    fn test_path_metric_extremum() {
        let num_info_bits = 1024;
        let message = utils::demonstration_message(num_info_bits);
        let mut decoder = rate_third_decoder(Termination::BestMetric);
        decoder.decode(&received_symbols(&message)).unwrap();
        for t in 0 ..= num_info_bits {
            let best = (0 .. 4)
                .filter_map(|state| decoder.path_metric(t, state))
                .max()
                .unwrap();
            assert_eq!(best, PathMetric::Reachable(3 * i64::try_from(t).unwrap()));
        }
        assert!(decoder.path_metric(num_info_bits + 1, 0).is_none());
        assert!(decoder.path_metric(0, 4).is_none());
    }

    #[test]
    fn test_run_forward_pass() {
        let trellis = Trellis::from_code(&Code::rate_third());
        let mut workspace = DecoderWorkspace::new(4);
        run_forward_pass(&[-1, -1, -1, -1, 1, 1], &trellis, &mut workspace);
        assert_eq!(workspace.num_steps(), 2);
        assert_eq!(
            workspace.path_metrics_at(0),
            [
                PathMetric::Reachable(0),
                PathMetric::Unreachable,
                PathMetric::Unreachable,
                PathMetric::Unreachable
            ]
        );
        assert_eq!(
            workspace.path_metrics_at(1),
            [
                PathMetric::Reachable(-3),
                PathMetric::Reachable(3),
                PathMetric::Unreachable,
                PathMetric::Unreachable
            ]
        );
        assert_eq!(
            workspace.path_metrics_at(2),
            [
                PathMetric::Reachable(-2),
                PathMetric::Reachable(-4),
                PathMetric::Reachable(6),
                PathMetric::Reachable(0)
            ]
        );
        // Unreachable states take the first-enumerated incoming edge
        assert_eq!(workspace.predecessors, [0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn test_compute_next_path_metrics_ties() {
        let trellis = Trellis::from_code(&Code::rate_third());
        let mut workspace = DecoderWorkspace::new(4);
        run_forward_pass(&[0; 9], &trellis, &mut workspace);
        assert_eq!(workspace.path_metrics_at(3), [PathMetric::Reachable(0); 4]);
        assert_eq!(&workspace.predecessors[8 ..], [0, 1, 2, 3]);
        // Later edge wins only when strictly better
        let mut workspace = DecoderWorkspace::new(4);
        run_forward_pass(&[0, 0, 0, 0, 0, 0, -1, -1, 1], &trellis, &mut workspace);
        assert_eq!(&workspace.predecessors[8 ..], [4, 1, 2, 3]);
    }

    #[test]
    fn test_terminal_state() {
        let mut workspace = DecoderWorkspace::new(4);
        workspace.init_path_metrics(1);
        workspace.path_metrics.extend([
            PathMetric::Reachable(-1),
            PathMetric::Reachable(3),
            PathMetric::Unreachable,
            PathMetric::Reachable(3),
        ]);
        workspace.predecessors.extend([0, 1, 2, 3]);
        assert_eq!(terminal_state(Termination::ZeroState, &workspace), 0);
        assert_eq!(terminal_state(Termination::BestMetric, &workspace), 1);
    }

    #[test]
    fn test_run_traceback() {
        let trellis = Trellis::from_code(&Code::rate_third());
        let mut workspace = DecoderWorkspace::new(4);
        run_forward_pass(
            &received_symbols(&[Zero, Zero, One, One, Zero, One]),
            &trellis,
            &mut workspace,
        );
        assert_eq!(run_traceback(1, &trellis, &workspace), [One, One, Zero, One]);
        assert_eq!(run_traceback(0, &trellis, &workspace), [One, One, Zero, Zero]);
    }

    #[test]
    fn test_branch_metric() {
        assert_eq!(branch_metric(&[1, 1, 1], &[1, 1, 1]), 3);
        assert_eq!(branch_metric(&[1, 1, 1], &[-1, -1, -1]), -3);
        assert_eq!(branch_metric(&[-1, 1, 1], &[1, 1, -1]), -1);
        assert_eq!(branch_metric(&[0, 0, 0], &[1, -1, 1]), 0);
    }

    #[test]
    fn test_decode_with_table_trellis() {
        let reference_outputs = [
            vec![1, 1, 1],
            vec![-1, -1, -1],
            vec![-1, 1, 1],
            vec![1, -1, -1],
            vec![-1, -1, 1],
            vec![1, 1, -1],
            vec![1, -1, 1],
            vec![-1, 1, -1],
        ];
        let output_labels = [Zero, One, Zero, One, Zero, One, Zero, One];
        let trellis = Trellis::from_tables(4, &reference_outputs, &output_labels).unwrap();
        let mut decoder = ViterbiDecoder::new(trellis, Termination::BestMetric);
        let message = utils::demonstration_message(64);
        let decoded = decoder.decode(&received_symbols(&message)).unwrap();
        assert_eq!(decoded.bits, message[2 ..]);
    }
}
