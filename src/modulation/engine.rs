//! Real-time ring-modulation engine
//!
//! The engine is moved into the audio output callback and called once per
//! buffer. Everything it touches is owned: the table and one phase
//! accumulator per channel. Processing never allocates, locks or blocks.

use super::table::ModulationTable;

/// Running index into the modulation table for one channel
///
/// Always satisfies `0 <= index < modulus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAccumulator {
    index: usize,
    modulus: usize,
}

impl PhaseAccumulator {
    /// Start at `index` (reduced modulo `modulus`)
    pub fn new(index: usize, modulus: usize) -> Self {
        debug_assert!(modulus > 0);
        Self {
            index: index % modulus,
            modulus,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step one frame forward, wrapping at the table length
    #[inline]
    pub fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.modulus {
            self.index = 0;
        }
    }
}

/// Stereo ring modulator driven by a sine lookup table
#[derive(Debug, Clone)]
pub struct ModulationEngine {
    table: ModulationTable,
    left: PhaseAccumulator,
    right: PhaseAccumulator,
}

impl ModulationEngine {
    /// Create an engine with both channels at the start of the cycle
    pub fn new(table: ModulationTable) -> Self {
        Self::with_phases(table, 0, 0)
    }

    /// Create an engine with explicit starting phases
    pub fn with_phases(table: ModulationTable, left: usize, right: usize) -> Self {
        debug_assert!(!table.is_empty());
        let len = table.len();
        Self {
            table,
            left: PhaseAccumulator::new(left, len),
            right: PhaseAccumulator::new(right, len),
        }
    }

    #[cfg(test)]
    pub fn table(&self) -> &ModulationTable {
        &self.table
    }

    #[cfg(test)]
    pub fn left_phase(&self) -> usize {
        self.left.index()
    }

    #[cfg(test)]
    pub fn right_phase(&self) -> usize {
        self.right.index()
    }

    /// Modulate one buffer of interleaved stereo samples.
    ///
    /// Processes `min(input.len(), output.len()) / 2` frames. Each channel is
    /// multiplied by the table value at its own phase, then both phases
    /// advance and wrap independently.
    #[inline]
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        for (inp, out) in input.chunks_exact(2).zip(output.chunks_exact_mut(2)) {
            out[0] = inp[0] * self.table[self.left.index()];
            out[1] = inp[1] * self.table[self.right.index()];
            self.left.advance();
            self.right.advance();
        }
    }
}
