//! Write-side partitioning of records into slices and containers.

use crate::{record::Record, strategy::CramEncodingStrategy};

/// The records of one container, with its slice boundaries.
pub(crate) struct ContainerBatch {
    pub(crate) records: Vec<Record>,
    pub(crate) slice_lengths: Vec<usize>,
}

/// The reference uniformity of a record batch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BatchKind {
    /// All records share one reference sequence ID (`None` = all unplaced).
    Uniform(Option<usize>),
    /// Records span several reference sequences.
    Multi,
}

/// Accumulates records into slices, and slices into containers, per the
/// encoding strategy.
///
/// A slice closes on a reference context change (unless it is small enough
/// to coalesce into a multi-reference slice), on reaching the
/// records-per-slice limit, or on flush. A container closes when its slice
/// quota is reached or an incoming slice is incompatible with the slices it
/// already holds.
pub(crate) struct ContainerFactory {
    records_per_slice: usize,
    slices_per_container: usize,
    min_single_reference_slice_size: usize,

    current_records: Vec<Record>,
    current_kind: BatchKind,

    pending: Option<ContainerBatch>,
    pending_kind: BatchKind,
}

impl ContainerFactory {
    pub(crate) fn new(strategy: &CramEncodingStrategy) -> Self {
        Self {
            records_per_slice: strategy.records_per_slice,
            slices_per_container: strategy.slices_per_container,
            min_single_reference_slice_size: strategy.min_single_reference_slice_size,
            current_records: Vec::new(),
            current_kind: BatchKind::Uniform(None),
            pending: None,
            pending_kind: BatchKind::Uniform(None),
        }
    }

    /// Adds a record, appending any containers that became complete to
    /// `ready`.
    pub(crate) fn add(&mut self, record: Record, ready: &mut Vec<ContainerBatch>) {
        let key = record.reference_sequence_id();

        if self.current_records.is_empty() {
            self.current_kind = BatchKind::Uniform(key);
        } else if self.current_kind != BatchKind::Multi
            && self.current_kind != BatchKind::Uniform(key)
        {
            if self.current_records.len() >= self.min_single_reference_slice_size {
                self.close_slice(ready);
                self.current_kind = BatchKind::Uniform(key);
            } else {
                // Too small to stand alone: let the slice go multi-reference.
                self.current_kind = BatchKind::Multi;
            }
        }

        self.current_records.push(record);

        if self.current_records.len() >= self.records_per_slice {
            self.close_slice(ready);
        }
    }

    /// Closes the current slice and container, appending anything non-empty
    /// to `ready`.
    pub(crate) fn flush(&mut self, ready: &mut Vec<ContainerBatch>) {
        if !self.current_records.is_empty() {
            self.close_slice(ready);
        }

        if let Some(batch) = self.pending.take() {
            ready.push(batch);
        }
    }

    fn close_slice(&mut self, ready: &mut Vec<ContainerBatch>) {
        let records = std::mem::take(&mut self.current_records);
        let kind = self.current_kind;
        self.current_kind = BatchKind::Uniform(None);

        if records.is_empty() {
            return;
        }

        // An incompatible slice closes the container it cannot join.
        if let Some(batch) = self.pending.take() {
            if self.pending_kind == kind && batch.slice_lengths.len() < self.slices_per_container {
                self.pending = Some(batch);
            } else {
                ready.push(batch);
            }
        }

        match self.pending.as_mut() {
            Some(batch) => {
                batch.slice_lengths.push(records.len());
                batch.records.extend(records);
            }
            None => {
                self.pending_kind = kind;
                self.pending = Some(ContainerBatch {
                    slice_lengths: vec![records.len()],
                    records,
                });
            }
        }

        if self
            .pending
            .as_ref()
            .is_some_and(|batch| batch.slice_lengths.len() >= self.slices_per_container)
        {
            ready.push(self.pending.take().expect("pending batch exists"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference_sequence_id: Option<usize>) -> Record {
        Record {
            reference_sequence_id,
            ..Default::default()
        }
    }

    fn strategy(records_per_slice: usize, min_single: usize) -> CramEncodingStrategy {
        CramEncodingStrategy {
            records_per_slice,
            min_single_reference_slice_size: min_single,
            ..Default::default()
        }
    }

    #[test]
    fn test_slice_closes_at_records_per_slice() {
        let mut factory = ContainerFactory::new(&strategy(2, 1));
        let mut ready = Vec::new();

        for _ in 0..5 {
            factory.add(record(Some(0)), &mut ready);
        }

        factory.flush(&mut ready);

        let lengths: Vec<_> = ready
            .iter()
            .flat_map(|batch| batch.slice_lengths.iter().copied())
            .collect();

        assert_eq!(lengths, [2, 2, 1]);
    }

    #[test]
    fn test_large_slice_closes_on_reference_change() {
        let mut factory = ContainerFactory::new(&strategy(100, 2));
        let mut ready = Vec::new();

        for _ in 0..3 {
            factory.add(record(Some(0)), &mut ready);
        }

        factory.add(record(Some(1)), &mut ready);
        factory.flush(&mut ready);

        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].slice_lengths, [3]);
        assert_eq!(ready[1].slice_lengths, [1]);
    }

    #[test]
    fn test_small_slice_coalesces_into_multi_reference() {
        let mut factory = ContainerFactory::new(&strategy(100, 10));
        let mut ready = Vec::new();

        factory.add(record(Some(0)), &mut ready);
        factory.add(record(Some(1)), &mut ready);
        factory.add(record(None), &mut ready);
        factory.flush(&mut ready);

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].slice_lengths, [3]);
    }

    #[test]
    fn test_flush_with_no_records() {
        let mut factory = ContainerFactory::new(&strategy(10, 1));
        let mut ready = Vec::new();

        factory.flush(&mut ready);

        assert!(ready.is_empty());
    }
}
