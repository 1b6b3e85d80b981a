// Rust guideline compliant 2026-02-16

//! Ordered k-way merge of multiple producers into a single stream of
//! [`IdentifiedTimestamp`] (spec §4.2).

use domain::{IdentifiedTimestamp, InputPlugin, ProducerId, Timestamp};
use std::collections::VecDeque;

/// Merges timestamps from several [`InputPlugin`]s, preserving global order.
///
/// Single-producer configurations bypass the cutoff algorithm entirely (spec
/// §4.2 edge case): every timestamp is tagged with that producer's id and
/// passed through untouched.
pub struct Merger {
    producers: Vec<Box<dyn InputPlugin + Send>>,
    peek: Vec<VecDeque<Timestamp>>,
    active: Vec<bool>,
}

impl std::fmt::Debug for Merger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger").field("producer_count", &self.producers.len()).finish()
    }
}

impl Merger {
    /// # Panics
    ///
    /// Panics if `producers` is empty -- at least one producer is required
    /// by construction (the generator config requires a non-empty `input`
    /// list).
    #[must_use]
    pub fn new(producers: Vec<Box<dyn InputPlugin + Send>>) -> Self {
        assert!(!producers.is_empty(), "merger requires at least one producer");
        let active = vec![true; producers.len()];
        let peek = producers.iter().map(|_| VecDeque::new()).collect();
        Self { producers, peek, active }
    }

    fn refill(&mut self, index: usize, size: usize) {
        if !self.active[index] || !self.peek[index].is_empty() {
            return;
        }
        loop {
            match self.producers[index].next_array(size) {
                Some(array) if array.is_empty() => continue,
                Some(array) => {
                    self.peek[index].extend(array);
                    return;
                }
                None => {
                    self.active[index] = false;
                    return;
                }
            }
        }
    }

    /// Pull and merge the next slice. Returns `None` once every producer has
    /// ended.
    pub fn next_slice(&mut self, size: usize) -> Option<Vec<IdentifiedTimestamp>> {
        if self.producers.len() == 1 {
            self.refill(0, size);
            let id = self.producers[0].id();
            if self.peek[0].is_empty() {
                return None;
            }
            return Some(
                self.peek[0]
                    .drain(..)
                    .map(|timestamp| IdentifiedTimestamp { timestamp, producer_id: id })
                    .collect(),
            );
        }

        for i in 0..self.producers.len() {
            self.refill(i, size);
        }

        let active_indices: Vec<usize> = (0..self.producers.len()).filter(|&i| !self.peek[i].is_empty()).collect();
        if active_indices.is_empty() {
            return None;
        }

        let cutoff = active_indices
            .iter()
            .map(|&i| *self.peek[i].back().expect("non-empty by filter"))
            .min()
            .expect("at least one active producer");

        let mut taken: Vec<(ProducerId, Vec<Timestamp>)> = Vec::with_capacity(active_indices.len());
        for &i in &active_indices {
            let last = *self.peek[i].back().expect("non-empty by filter");
            if last <= cutoff {
                let id = self.producers[i].id();
                taken.push((id, self.peek[i].drain(..).collect()));
            } else {
                let split_at = self.peek[i].partition_point(|t| *t <= cutoff);
                if split_at > 0 {
                    let id = self.producers[i].id();
                    let left: Vec<Timestamp> = self.peek[i].drain(..split_at).collect();
                    taken.push((id, left));
                }
            }
        }

        let mut merged: Vec<IdentifiedTimestamp> = taken
            .into_iter()
            .flat_map(|(id, timestamps)| {
                timestamps.into_iter().map(move |timestamp| IdentifiedTimestamp { timestamp, producer_id: id })
            })
            .collect();
        merged.sort_by_key(|it| it.timestamp);

        if merged.is_empty() { None } else { Some(merged) }
    }
}

#[cfg(test)]
mod tests {
    use super::Merger;
    use domain::{InputPlugin, ProducerId, Tags, Timestamp};

    struct VecProducer {
        id: ProducerId,
        arrays: std::collections::VecDeque<Vec<i64>>,
    }

    impl InputPlugin for VecProducer {
        fn id(&self) -> ProducerId {
            self.id
        }

        fn tags(&self) -> Tags {
            Tags::from(vec![])
        }

        fn next_array(&mut self, _size: usize) -> Option<Vec<Timestamp>> {
            self.arrays.pop_front().map(|v| v.into_iter().map(Timestamp::from_micros).collect())
        }
    }

    #[test]
    fn single_producer_bypasses_cutoff_logic() {
        let producer = VecProducer { id: ProducerId::new(0), arrays: vec![vec![1, 2, 3]].into() };
        let mut merger = Merger::new(vec![Box::new(producer)]);
        let slice = merger.next_slice(10).unwrap();
        assert_eq!(slice.len(), 3);
        assert!(slice.iter().all(|it| it.producer_id == ProducerId::new(0)));
    }

    #[test]
    fn two_producers_merge_in_order_and_split_at_cutoff() {
        let a = VecProducer { id: ProducerId::new(0), arrays: vec![vec![1, 3, 5]].into() };
        let b = VecProducer { id: ProducerId::new(1), arrays: vec![vec![2, 4]].into() };
        let mut merger = Merger::new(vec![Box::new(a), Box::new(b)]);

        // cutoff = min(last(a)=5, last(b)=4) = 4.
        // a: last=5 > cutoff, split at first index > 4 -> [1,3] taken, [5] kept.
        // b: last=4 <= cutoff -> whole array [2,4] taken.
        let slice = merger.next_slice(10).unwrap();
        let values: Vec<i64> = slice.iter().map(|it| it.timestamp.as_micros()).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_arrays_are_silently_skipped() {
        let a = VecProducer {
            id: ProducerId::new(0),
            arrays: vec![vec![], vec![1, 2]].into(),
        };
        let mut merger = Merger::new(vec![Box::new(a)]);
        let slice = merger.next_slice(10).unwrap();
        assert_eq!(slice.len(), 2);
    }

    #[test]
    fn terminates_when_all_producers_exhausted() {
        let a = VecProducer { id: ProducerId::new(0), arrays: vec![vec![1]].into() };
        let mut merger = Merger::new(vec![Box::new(a)]);
        assert!(merger.next_slice(10).is_some());
        assert!(merger.next_slice(10).is_none());
    }
}
