use emission_zk_types_base::U248;

use crate::CircuitApi;

/// An ordered stream of circuit values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataStream<T> {
    items: Vec<T>,
}

impl<T> DataStream<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Declare one constraint per item: `pred` must hold for it.
    pub fn assert_each<F>(&self, api: &mut CircuitApi, label: &str, pred: F)
    where
        F: Fn(&mut CircuitApi, &T) -> bool,
    {
        for (i, item) in self.items.iter().enumerate() {
            let holds = pred(api, item);
            api.assert_is_true(holds, format!("{label}[{i}]"));
        }
    }

    /// Element-wise transformation of the stream.
    pub fn map<U, F>(&self, api: &mut CircuitApi, f: F) -> DataStream<U>
    where
        F: Fn(&mut CircuitApi, &T) -> U,
    {
        DataStream {
            items: self.items.iter().map(|item| f(api, item)).collect(),
        }
    }
}

impl DataStream<U248> {
    /// Sum of the stream. An empty stream sums to zero.
    pub fn sum(&self, api: &mut CircuitApi) -> U248 {
        self.items
            .iter()
            .fold(U248::ZERO, |acc, &value| api.add(acc, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_each_labels_every_item() {
        let stream = DataStream::new([1u64, 2, 3]);
        let mut api = CircuitApi::default();
        stream.assert_each(&mut api, "odd", |_, v| v % 2 == 1);

        let assignment = api.finish();
        assert_eq!(assignment.constraints, 3);
        assert_eq!(assignment.violations.len(), 1);
        assert_eq!(assignment.violations[0].label, "odd[1]");
    }

    #[test]
    fn map_then_sum() {
        let stream = DataStream::new([1u64, 2, 3]);
        let mut api = CircuitApi::default();
        let mapped = stream.map(&mut api, |_, v| U248::from(*v * 10));
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped.sum(&mut api), U248::from(60u64));
        assert!(api.finish().is_satisfied());
    }

    #[test]
    fn empty_stream_sums_to_zero() {
        let mut api = CircuitApi::default();
        assert_eq!(DataStream::<U248>::default().sum(&mut api), U248::ZERO);
    }
}
