//! Deterministic train/test split.
//!
//! The shuffle is pinned down completely so the split (and therefore the
//! reported error) is the same on every platform and every run:
//!
//! * generator: xoshiro256**, state words seeded from the `u64` seed by the
//!   LCG `x ← x·6364136223846793005 + 1`;
//! * shuffle: Fisher–Yates from the last index down, `j` drawn from `0..=i`
//!   as the high 64 bits of `next_u64() · (i + 1)`;
//! * the first `ceil(n · test_size)` shuffled indices form the test set.

use rand::{RngCore, SeedableRng};

use super::matrix::Matrix;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Xoshiro256 – the seeded generator
// ---------------------------------------------------------------------------

/// xoshiro256** with a fixed seeding scheme.
#[derive(Debug, Clone)]
pub struct Xoshiro256 {
    state: [u64; 4],
}

impl RngCore for Xoshiro256 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Xoshiro256 {
    type Seed = [u8; 32];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut state = [0u64; 4];
        for (word, bytes) in state.iter_mut().zip(seed.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            *word = u64::from_le_bytes(buf);
        }
        // the all-zero state is a fixed point
        if state == [0; 4] {
            return Self::seed_from_u64(0);
        }
        Self { state }
    }

    fn seed_from_u64(seed: u64) -> Self {
        let mut state = [0u64; 4];
        let mut x = seed;
        for slot in &mut state {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        Self { state }
    }
}

/// Uniform draw from `0..n` by widening multiply.
fn bounded(rng: &mut Xoshiro256, n: u64) -> u64 {
    ((u128::from(rng.next_u64()) * u128::from(n)) >> 64) as u64
}

/// Seeded permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = Xoshiro256::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = bounded(&mut rng, i as u64 + 1) as usize;
        indices.swap(i, j);
    }
    indices
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// Training and held-out partitions of a feature matrix and its targets.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Matrix,
    pub x_test: Matrix,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

/// `(n_train, n_test)` for `n_samples` rows.
pub fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::InvalidTestSize(test_size));
    }
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples - n_test;
    if n_train == 0 || n_test == 0 {
        return Err(Error::EmptySplit {
            n_samples,
            n_train,
            n_test,
        });
    }
    Ok((n_train, n_test))
}

/// Shuffle rows with `seed` and hold out `ceil(n · test_size)` of them.
pub fn train_test_split(x: &Matrix, y: &[f64], test_size: f64, seed: u64) -> Result<Split> {
    let n_samples = x.shape().0;
    if n_samples != y.len() {
        return Err(Error::ShapeMismatch(format!(
            "X has {n_samples} rows but y has {} values",
            y.len()
        )));
    }
    let (n_train, n_test) = split_sizes(n_samples, test_size)?;

    let indices = permutation(n_samples, seed);
    let (test_idx, train_idx) = indices.split_at(n_test);
    log::debug!("split {n_samples} rows into {n_train} train / {n_test} test (seed {seed})");

    Ok(Split {
        x_train: x.select_rows(train_idx),
        x_test: x.select_rows(test_idx),
        y_train: train_idx.iter().map(|&i| y[i]).collect(),
        y_test: test_idx.iter().map(|&i| y[i]).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Matrix, Vec<f64>) {
        let x = Matrix::from_vec(n, 2, (0..2 * n).map(|i| i as f64).collect()).unwrap();
        let y = (0..n).map(|i| i as f64 * 10.0).collect();
        (x, y)
    }

    #[test]
    fn generator_is_reproducible() {
        let mut a = Xoshiro256::seed_from_u64(42);
        let mut b = Xoshiro256::seed_from_u64(42);
        let mut c = Xoshiro256::seed_from_u64(43);
        let xs: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        let zs: Vec<u64> = (0..8).map(|_| c.next_u64()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
    }

    #[test]
    fn zero_seed_bytes_do_not_stall() {
        let mut rng = Xoshiro256::from_seed([0; 32]);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn permutation_is_a_permutation() {
        let mut p = permutation(506, 42);
        assert_ne!(p, (0..506).collect::<Vec<_>>());
        p.sort_unstable();
        assert_eq!(p, (0..506).collect::<Vec<_>>());
        assert_eq!(permutation(506, 42), permutation(506, 42));
        assert!(permutation(0, 42).is_empty());
    }

    #[test]
    fn sizes_round_test_set_up() {
        assert_eq!(split_sizes(506, 0.2).unwrap(), (404, 102));
        assert_eq!(split_sizes(10, 0.2).unwrap(), (8, 2));
        assert_eq!(split_sizes(5, 0.2).unwrap(), (4, 1));
        assert!(matches!(split_sizes(1, 0.2), Err(Error::EmptySplit { .. })));
        assert!(matches!(split_sizes(0, 0.2), Err(Error::EmptySplit { .. })));
        assert!(matches!(split_sizes(10, 1.0), Err(Error::InvalidTestSize(_))));
        assert!(matches!(split_sizes(10, f64::NAN), Err(Error::InvalidTestSize(_))));
    }

    #[test]
    fn split_keeps_rows_with_their_targets() {
        let (x, y) = dataset(10);
        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        assert_eq!(split.x_train.shape(), (8, 2));
        assert_eq!(split.x_test.shape(), (2, 2));
        for (m, t) in [(&split.x_train, &split.y_train), (&split.x_test, &split.y_test)] {
            for (i, target) in t.iter().enumerate() {
                // row k holds [2k, 2k+1] and target 10k
                assert_eq!(m.get(i, 0) * 5.0, *target);
            }
        }

        let mut all: Vec<f64> = split.y_train.iter().chain(&split.y_test).copied().collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(all, y);
    }

    #[test]
    fn same_seed_same_split() {
        let (x, y) = dataset(50);
        let a = train_test_split(&x, &y, 0.2, 42).unwrap();
        let b = train_test_split(&x, &y, 0.2, 42).unwrap();
        let c = train_test_split(&x, &y, 0.2, 7).unwrap();
        assert_eq!(a.y_test, b.y_test);
        assert_eq!(a.x_train, b.x_train);
        assert_ne!(a.y_test, c.y_test);
    }

    #[test]
    fn length_mismatch() {
        let (x, _) = dataset(10);
        assert!(matches!(
            train_test_split(&x, &[1.0; 9], 0.2, 42),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
