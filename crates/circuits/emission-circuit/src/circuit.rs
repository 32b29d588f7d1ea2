use emission_zk_types_base::{Allocation, CircuitInput, StorageSlot, U248, UINT248_BITS};
use emission_zk_types_circuit::{AppCircuit, CircuitApi, CircuitError, DataStream};

/// The circuit reads nothing but storage slots, at most 32 of them.
pub const EMISSION_ALLOCATION: Allocation = Allocation::new(0, 32, 0);

/// Asserts that every storage slot holds the expected emission and reveals their sum.
///
/// In a satisfying assignment the public output is therefore always
/// `expected_emission * number_of_slots`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct EmissionCircuit {
    pub expected_emission: u64,
}

impl EmissionCircuit {
    pub fn new(expected_emission: u64) -> Self {
        Self { expected_emission }
    }
}

impl AppCircuit for EmissionCircuit {
    fn name(&self) -> &'static str {
        "emission"
    }

    fn allocate(&self) -> Allocation {
        EMISSION_ALLOCATION
    }

    fn define(&self, api: &mut CircuitApi, input: &CircuitInput) -> Result<(), CircuitError> {
        let slots = DataStream::new(input.storage_slots.iter().cloned());
        let expected = U248::from(self.expected_emission);

        slots.assert_each(api, "slot value == expected emission", |api, slot: &StorageSlot| {
            let emission = api.to_uint248(slot.value);
            api.is_equal(emission, expected)
        });

        let emissions = slots.map(api, |api, slot| api.to_uint248(slot.value));
        let total = emissions.sum(api);

        api.output_uint(UINT248_BITS, total)
    }
}

#[cfg(test)]
mod tests {
    use emission_zk_types_base::B256;
    use emission_zk_types_circuit::synthesize;
    use itertools::Itertools;

    use super::*;

    fn slots(values: &[u64]) -> CircuitInput {
        CircuitInput::from_storage_slots(values.iter().map(|v| StorageSlot::with_value(*v)).collect())
    }

    #[test]
    fn allocation_is_storage_only() {
        let circuit = EmissionCircuit::new(10000);
        assert_eq!(circuit.allocate(), Allocation::new(0, 32, 0));
        assert_eq!(circuit.allocate(), circuit.allocate());
    }

    #[test]
    fn matching_slots_output_their_sum() {
        let circuit = EmissionCircuit::new(10000);
        let assignment = synthesize(&circuit, &slots(&[10000, 10000, 10000])).unwrap();

        assert!(assignment.is_satisfied());
        assert_eq!(assignment.public_outputs.len(), 1);
        assert_eq!(assignment.public_outputs[0].bits, 248);
        assert_eq!(assignment.public_outputs[0].value.to::<u64>(), 30000);
    }

    #[test]
    fn output_is_constant_times_length() {
        for len in [0usize, 1, 7, 31, 32] {
            let circuit = EmissionCircuit::new(777);
            let input = slots(&vec![777; len]);
            let assignment = synthesize(&circuit, &input).unwrap();

            assert!(assignment.is_satisfied(), "len {len}");
            assert_eq!(
                assignment.public_outputs[0].value.to::<u64>(),
                777 * len as u64,
                "len {len}"
            );
        }
    }

    #[test]
    fn any_mismatch_is_unsatisfiable() {
        let circuit = EmissionCircuit::new(10000);
        let values = [10000, 9999, 10000];
        let assignment = synthesize(&circuit, &slots(&values)).unwrap();

        assert!(!assignment.is_satisfied());
        let labels = assignment.violations.iter().map(|v| v.label.as_str()).collect_vec();
        assert_eq!(labels, vec!["slot value == expected emission[1]"]);
    }

    #[test]
    fn oversized_word_is_unsatisfiable() {
        let circuit = EmissionCircuit::new(0);
        let mut value = B256::ZERO;
        value[0] = 0x80;
        let input = CircuitInput::from_storage_slots(vec![StorageSlot {
            value,
            ..Default::default()
        }]);

        let assignment = synthesize(&circuit, &input).unwrap();
        assert!(!assignment.is_satisfied());
    }

    #[test]
    fn more_than_32_slots_are_rejected() {
        let circuit = EmissionCircuit::new(1);
        let err = synthesize(&circuit, &slots(&[1; 33])).unwrap_err();
        assert!(matches!(err, CircuitError::AllocationExceeded { len: 33, max: 32, .. }));
    }
}
