//! Quorum arithmetic.

use smallvec::SmallVec;

use crate::Identifier;

/// Number of recorders that make up a majority in a cluster of the given size.
pub fn majority(cluster_size: usize) -> usize {
    cluster_size / 2 + 1
}

/// Counts distinct recorders that replied at a single step.
#[derive(Clone, Debug)]
pub struct Quorum<N> {
    threshold: usize,
    replied: SmallVec<[N; 8]>,
}

impl<N: Identifier> Quorum<N> {
    pub fn new(cluster_size: usize) -> Self {
        Self {
            threshold: majority(cluster_size),
            replied: SmallVec::new(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn count(&self) -> usize {
        self.replied.len()
    }

    pub fn is_reached(&self) -> bool {
        self.replied.len() >= self.threshold
    }

    /// Whether a reply from `recorder` was already counted.
    pub fn contains(&self, recorder: &N) -> bool {
        self.replied.contains(recorder)
    }

    /// Records a reply from `recorder`.
    ///
    /// Returns `true` iff this reply is the one that completes the quorum.
    /// Repeated replies from the same recorder are not counted.
    pub fn track(&mut self, recorder: N) -> bool {
        if self.contains(&recorder) {
            return false;
        }

        self.replied.push(recorder);

        self.replied.len() == self.threshold
    }

    pub fn reset(&mut self) {
        self.replied.clear();
    }
}
