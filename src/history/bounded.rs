//! Fixed-capacity sample log with FIFO eviction.

use crate::conversion::Sample;
use std::collections::VecDeque;

/// Maximum number of samples retained per session.
pub const HISTORY_CAPACITY: usize = 200;

/// Insertion-ordered sample log.
///
/// Once full, every append evicts the oldest sample, so the log always
/// holds the most recent [`HISTORY_CAPACITY`] samples.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    samples: VecDeque<Sample>,
}

impl BoundedHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Appends a sample, evicting the oldest one if over capacity.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        if self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }

        tracing::trace!(
            sample = %sample,
            len = self.samples.len(),
            "Recorded sample"
        );
    }

    /// Returns the retained samples, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.iter().copied().collect()
    }

    /// Renders the retained samples as six-digit RGB hex strings.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.iter().map(|s| s.to_hex()).collect()
    }

    /// Iterates the retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Returns the most recent sample.
    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first append.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Always [`HISTORY_CAPACITY`].
    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }
}

impl Default for BoundedHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_empty() {
        let history = BoundedHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
        assert_eq!(history.capacity(), 200);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = BoundedHistory::new();
        for i in 1..=250u32 {
            history.append(Sample::from_argb(i));
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 200);

        let expected: Vec<Sample> = (51..=250u32).map(Sample::from_argb).collect();
        assert_eq!(snapshot, expected);
        assert_eq!(history.latest(), Some(Sample::from_argb(250)));
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut history = BoundedHistory::new();
        history.append(Sample::from_argb(0xFF11_2233));

        assert_eq!(history.snapshot(), history.snapshot());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_hex_export() {
        let mut history = BoundedHistory::new();
        history.append(Sample::from_argb(0xFFFF_0000));
        history.append(Sample::from_argb(0xFF00_0A0B));

        assert_eq!(history.to_hex_strings(), vec!["ff0000", "000a0b"]);
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent(values in proptest::collection::vec(any::<u32>(), 0..600)) {
            let mut history = BoundedHistory::new();
            for &v in &values {
                history.append(Sample::from_argb(v));
                prop_assert!(history.len() <= HISTORY_CAPACITY);
            }

            let skip = values.len().saturating_sub(HISTORY_CAPACITY);
            let expected: Vec<Sample> = values[skip..].iter().copied().map(Sample::from_argb).collect();
            prop_assert_eq!(history.snapshot(), expected);
        }
    }
}
