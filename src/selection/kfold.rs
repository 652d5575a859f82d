//! K-Fold cross-validation splitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// K-Fold cross-validator.
///
/// Splits sample indices into k consecutive folds, distributing the
/// remainder across the first folds. Shuffling is off by default; setting
/// a random state implies shuffling with that seed.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new K-Fold cross-validator with `n_splits` folds.
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Enable or disable shuffling before splitting.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set a seed for reproducible shuffling. Implies shuffling.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true;
        self
    }

    /// Number of folds.
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate `(train_indices, test_indices)` for each fold.
    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            match self.random_state {
                Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => indices.shuffle(&mut rand::thread_rng()),
            }
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            let current = if i < remainder { fold_size + 1 } else { fold_size };
            let end = start + current;

            let test: Vec<usize> = indices[start..end].to_vec();
            let mut train = Vec::with_capacity(n_samples - current);
            train.extend_from_slice(&indices[..start]);
            train.extend_from_slice(&indices[end..]);

            result.push((train, test));
            start = end;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_count_and_coverage() {
        let kfold = KFold::new(3);
        let splits = kfold.split(10);
        assert_eq!(splits.len(), 3);

        let mut all_test: Vec<usize> = splits.iter().flat_map(|(_, t)| t.clone()).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_remainder_spread_over_first_folds() {
        let splits = KFold::new(3).split(10);
        assert_eq!(splits[0].1.len(), 4);
        assert_eq!(splits[1].1.len(), 3);
        assert_eq!(splits[2].1.len(), 3);
    }

    #[test]
    fn test_train_test_disjoint() {
        for (train, test) in KFold::new(4).split(12) {
            for idx in &test {
                assert!(!train.contains(idx));
            }
            assert_eq!(train.len() + test.len(), 12);
        }
    }

    #[test]
    fn test_seeded_shuffle_reproducible() {
        let a = KFold::new(3).with_random_state(11).split(9);
        let b = KFold::new(3).with_random_state(11).split(9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_changes_order() {
        let plain = KFold::new(3).split(30);
        let shuffled = KFold::new(3).with_random_state(11).split(30);
        assert_ne!(plain, shuffled);
    }
}
