use std::fmt;

/// The kinds of data an application circuit consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Receipt,
    StorageSlot,
    Transaction,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Receipt => "receipts",
            Self::StorageSlot => "storage slots",
            Self::Transaction => "transactions",
        };
        f.write_str(name)
    }
}

/// Upper bound on every kind of input a circuit may consume.
///
/// The bounds are baked into the circuit at compile time, so an input stream longer than its bound
/// can never be proven against the compiled circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Allocation {
    pub max_receipts: usize,
    pub max_storage_slots: usize,
    pub max_transactions: usize,
}

impl Allocation {
    pub const fn new(max_receipts: usize, max_storage_slots: usize, max_transactions: usize) -> Self {
        Self {
            max_receipts,
            max_storage_slots,
            max_transactions,
        }
    }

    /// The bound declared for the given input kind.
    pub fn max(&self, kind: InputKind) -> usize {
        match kind {
            InputKind::Receipt => self.max_receipts,
            InputKind::StorageSlot => self.max_storage_slots,
            InputKind::Transaction => self.max_transactions,
        }
    }

    /// Returns the first input kind whose stream length exceeds its bound, together with that
    /// length.
    pub fn first_violation(&self, lens: [(InputKind, usize); 3]) -> Option<(InputKind, usize)> {
        lens.into_iter().find(|&(kind, len)| len > self.max(kind))
    }
}
