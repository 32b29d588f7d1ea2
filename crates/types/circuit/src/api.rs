use std::fmt;

use emission_zk_types_base::{B256, PublicOutput, U248, U256, UINT248_BITS};

use crate::CircuitError;

/// A constraint that the assignment does not satisfy.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Violation {
    /// Index of the constraint, in the order constraints were declared.
    pub constraint: usize,
    pub label: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint #{} ({})", self.constraint, self.label)
    }
}

/// Result of running a circuit definition over a concrete input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Number of constraints declared by the circuit.
    pub constraints: usize,
    /// Constraints the input does not satisfy.
    pub violations: Vec<Violation>,
    /// Public outputs in declaration order.
    pub public_outputs: Vec<PublicOutput>,
}

impl Assignment {
    /// A satisfying assignment is one under which a proof can be generated.
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Constraint system evaluated over concrete values.
///
/// Every `assert_*` call declares one constraint. A constraint that does not hold is recorded
/// rather than raised, so a single synthesis reports every violation of an input.
#[derive(Debug, Default)]
pub struct CircuitApi {
    constraints: usize,
    violations: Vec<Violation>,
    outputs: Vec<PublicOutput>,
}

impl CircuitApi {
    /// Interpret a 32-byte word as a [`U248`]. The most significant byte must be zero.
    pub fn to_uint248(&mut self, word: B256) -> U248 {
        self.assert_is_true(word[0] == 0, "bytes32 value fits in uint248");
        U248::from_be_slice(&word[1..])
    }

    pub fn is_equal(&self, a: U248, b: U248) -> bool {
        a == b
    }

    /// Declare a constraint that `cond` holds.
    pub fn assert_is_true(&mut self, cond: bool, label: impl Into<String>) {
        let constraint = self.constraints;
        self.constraints += 1;
        if !cond {
            self.violations.push(Violation {
                constraint,
                label: label.into(),
            });
        }
    }

    /// Field addition constrained to not wrap around 2^248.
    pub fn add(&mut self, a: U248, b: U248) -> U248 {
        let (sum, overflow) = a.overflowing_add(b);
        self.assert_is_true(!overflow, "uint248 addition does not overflow");
        sum
    }

    /// Declare `value` as a public output of the given bit width.
    pub fn output_uint(&mut self, bits: usize, value: U248) -> Result<(), CircuitError> {
        if bits == 0 || bits > UINT248_BITS {
            return Err(CircuitError::UnsupportedOutputWidth { bits });
        }
        self.assert_is_true(
            value.bit_len() <= bits,
            format!("public output fits in {bits} bits"),
        );
        self.outputs.push(PublicOutput {
            bits,
            value: U256::from_limbs(value.into_limbs()),
        });
        Ok(())
    }

    pub fn finish(self) -> Assignment {
        Assignment {
            constraints: self.constraints,
            violations: self.violations,
            public_outputs: self.outputs,
        }
    }
}
