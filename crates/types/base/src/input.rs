use alloy_primitives::{Address, B256};

use crate::{Allocation, InputKind};

/// A single value read from a contract's persistent storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct StorageSlot {
    /// Block at which the value was read.
    pub block_num: u64,
    /// Contract owning the storage.
    pub address: Address,
    /// Storage key.
    pub slot: B256,
    /// Raw 32-byte word stored under `slot`.
    pub value: B256,
}

impl StorageSlot {
    /// Storage slot holding `value` as a big-endian word.
    pub fn with_value(value: u64) -> Self {
        Self {
            value: B256::left_padding_from(&value.to_be_bytes()),
            ..Default::default()
        }
    }
}

/// A transaction receipt. Kept opaque, the circuits in this workspace do not read receipts.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Receipt {
    pub block_num: u64,
    pub tx_hash: B256,
}

/// A transaction. Kept opaque, the circuits in this workspace do not read transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Transaction {
    pub block_num: u64,
    pub hash: B256,
}

/// The data streams fed to an application circuit.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct CircuitInput {
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    #[serde(default)]
    pub storage_slots: Vec<StorageSlot>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl CircuitInput {
    /// Input made of storage slots only.
    pub fn from_storage_slots(storage_slots: Vec<StorageSlot>) -> Self {
        Self {
            storage_slots,
            ..Default::default()
        }
    }

    /// Stream lengths keyed by their input kind.
    pub fn lens(&self) -> [(InputKind, usize); 3] {
        [
            (InputKind::Receipt, self.receipts.len()),
            (InputKind::StorageSlot, self.storage_slots.len()),
            (InputKind::Transaction, self.transactions.len()),
        ]
    }

    /// Check every stream against the circuit's declared allocation.
    pub fn fits(&self, allocation: &Allocation) -> Result<(), (InputKind, usize)> {
        match allocation.first_violation(self.lens()) {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_value_is_big_endian() {
        let slot = StorageSlot::with_value(10000);
        assert_eq!(&slot.value[30..], &10000u16.to_be_bytes());
        assert!(slot.value[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn allocation_bound_is_enforced_per_kind() {
        let allocation = Allocation::new(0, 32, 0);

        let input = CircuitInput::from_storage_slots(vec![StorageSlot::default(); 32]);
        assert!(input.fits(&allocation).is_ok());

        let input = CircuitInput::from_storage_slots(vec![StorageSlot::default(); 33]);
        assert_eq!(input.fits(&allocation), Err((InputKind::StorageSlot, 33)));

        let mut input = CircuitInput::default();
        input.receipts.push(Receipt::default());
        assert_eq!(input.fits(&allocation), Err((InputKind::Receipt, 1)));
    }

    #[test]
    fn missing_streams_deserialize_empty() {
        let input: CircuitInput = serde_json::from_str(r#"{"storage_slots":[]}"#).unwrap();
        assert_eq!(input, CircuitInput::default());
    }
}
