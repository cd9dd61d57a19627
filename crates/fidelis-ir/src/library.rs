//! Pre-built benchmark circuits.
//!
//! These are the workloads routing strategies are usually compared on:
//! small programs whose ideal output is a single known bit string, so the
//! probability of observing that string measures end-to-end fidelity.

use std::f64::consts::PI;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::qubit::{ClbitId, QubitId};

/// Parse a bit string into booleans, most significant bit first.
fn parse_bits(bits: &str) -> IrResult<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(IrError::InvalidParameter(format!(
                "bit string may only contain '0' and '1', found {other:?}"
            ))),
        })
        .collect()
}

impl Circuit {
    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit with a CNOT chain.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }

    /// Append a QFT over qubits `0..n`, including the bit-reversal swaps.
    pub fn append_qft(&mut self, n: u32) -> IrResult<&mut Self> {
        for i in 0..n {
            self.h(QubitId(i))?;
            for j in (i + 1)..n {
                self.cp(PI / f64::from(1u32 << (j - i)), QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            self.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(self)
    }

    /// Append the inverse of [`append_qft`](Self::append_qft).
    pub fn append_inverse_qft(&mut self, n: u32) -> IrResult<&mut Self> {
        for i in (0..n / 2).rev() {
            self.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        for i in (0..n).rev() {
            for j in ((i + 1)..n).rev() {
                self.cp(-PI / f64::from(1u32 << (j - i)), QubitId(j), QubitId(i))?;
            }
            self.h(QubitId(i))?;
        }
        Ok(self)
    }

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("qft", n, 0);
        circuit.append_qft(n)?;
        Ok(circuit)
    }

    /// Prepare `bits`, apply QFT then its inverse, and measure everything.
    ///
    /// The ideal outcome is `bits` itself. The rightmost character is
    /// qubit 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn qft_roundtrip(bits: &str) -> IrResult<Self> {
        let values = parse_bits(bits)?;
        let n = values.len() as u32;
        let mut circuit = Self::with_size("qft_roundtrip", n, n);
        for (i, &set) in values.iter().rev().enumerate() {
            if set {
                circuit.x(QubitId(i as u32))?;
            }
        }
        circuit.append_qft(n)?.append_inverse_qft(n)?.measure_all()?;
        Ok(circuit)
    }

    /// Create a Bernstein–Vazirani circuit for the given secret string.
    ///
    /// Uses `secret.len() + 1` qubits; the last qubit is the oracle
    /// ancilla and only the first `secret.len()` qubits are measured.
    #[allow(clippy::cast_possible_truncation)]
    pub fn bernstein_vazirani(secret: &str) -> IrResult<Self> {
        let bits = parse_bits(secret)?;
        let n = bits.len() as u32;
        let mut circuit = Self::with_size("bernstein_vazirani", n + 1, n);
        let ancilla = QubitId(n);

        circuit.x(ancilla)?.barrier_all()?;
        for q in 0..=n {
            circuit.h(QubitId(q))?;
        }
        circuit.barrier_all()?;
        for (i, &set) in bits.iter().rev().enumerate() {
            if set {
                circuit.cx(QubitId(i as u32), ancilla)?;
            }
        }
        circuit.barrier_all()?;
        for q in 0..=n {
            circuit.h(QubitId(q))?;
        }
        circuit.barrier_all()?;
        for q in 0..n {
            circuit.measure(QubitId(q), ClbitId(q))?;
        }
        Ok(circuit)
    }

    /// Toffoli truth-table check on `width` qubits (at least 3).
    ///
    /// Sets both controls, applies a decomposed CCX onto qubit 2 and
    /// measures all qubits, so the ideal outcome has bits 0..=2 set.
    pub fn toffoli(width: u32) -> IrResult<Self> {
        if width < 3 {
            return Err(IrError::InvalidParameter(format!(
                "toffoli needs at least 3 qubits, got {width}"
            )));
        }
        let mut circuit = Self::with_size("toffoli", width, 0);
        circuit
            .x(QubitId(0))?
            .x(QubitId(1))?
            .ccx(QubitId(0), QubitId(1), QubitId(2))?
            .measure_all()?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(circuit: &Circuit, name: &str) -> usize {
        circuit
            .dag()
            .topological_ops()
            .filter(|(_, inst)| inst.name() == name)
            .count()
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_ghz_chain() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(count(&circuit, "cx"), 4);
        assert_eq!(count(&circuit, "measure"), 5);
    }

    #[test]
    fn test_qft_gate_counts() {
        let circuit = Circuit::qft(4).unwrap();
        assert_eq!(count(&circuit, "h"), 4);
        assert_eq!(count(&circuit, "cp"), 6);
        assert_eq!(count(&circuit, "swap"), 2);
    }

    #[test]
    fn test_qft_roundtrip_prepares_bits() {
        let circuit = Circuit::qft_roundtrip("101").unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(count(&circuit, "x"), 2);
        assert_eq!(count(&circuit, "cp"), 6);
        assert_eq!(count(&circuit, "measure"), 3);
    }

    #[test]
    fn test_bernstein_vazirani_oracle() {
        let circuit = Circuit::bernstein_vazirani("1011").unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_clbits(), 4);
        assert_eq!(count(&circuit, "cx"), 3);
        assert_eq!(count(&circuit, "measure"), 4);
    }

    #[test]
    fn test_invalid_bit_string() {
        assert!(matches!(
            Circuit::bernstein_vazirani("10x"),
            Err(IrError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_toffoli_width() {
        let circuit = Circuit::toffoli(4).unwrap();
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(count(&circuit, "cx"), 6);
        assert!(Circuit::toffoli(2).is_err());
    }
}
