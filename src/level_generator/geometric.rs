//! Geometric level generator.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::level_generator::LevelGenerator;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[non_exhaustive]
pub enum GeometricError {
    /// The total number of levels must be non-zero.
    #[error("total levels must be non-zero")]
    ZeroLevels,
    /// The probability `p` must be in the range `(0, 1)`.
    #[error("p must be in (0, 1)")]
    InvalidProbability,
    /// Failed to initialize the random number generator.
    #[error("failed to initialize the random number generator")]
    RngInit,
}

/// A level generator using a geometric distribution.
///
/// The height of a new node starts at 1 and is repeatedly incremented with
/// probability `p` until a trial fails or the total number of levels is
/// reached, so that `P(height >= k) = p^(k - 1)`, truncated at the maximum
/// number of levels allowed.
#[derive(Debug)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node also occupies the next level up.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level. The random number generator is seeded from the operating
    /// system.
    ///
    /// # Errors
    ///
    /// `total` must be non-zero and `p` must be strictly between 0 and 1;
    /// [`GeometricError`] is returned otherwise, or if no OS entropy is
    /// available.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        let rng = SmallRng::try_from_os_rng().map_err(|_err| GeometricError::RngInit)?;
        Self::with_rng(total, p, rng)
    }

    /// Create a new geometric level generator whose random number generator
    /// is seeded with `seed`, so that the sequence of generated heights is
    /// reproducible.
    ///
    /// # Errors
    ///
    /// As for [`new`][Geometric::new], except that seeding cannot fail.
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroLevels);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(Geometric { total, p, rng })
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn height(&mut self) -> usize {
        let mut height = 1;
        while height < self.total && self.rng.random::<f64>() < self.p {
            height += 1;
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Geometric, GeometricError, LevelGenerator};

    #[test]
    fn invalid_total() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroLevels));
    }

    #[rstest]
    fn invalid_p(#[values(-0.5, 0.0, 1.0, 1.5)] p: f64) {
        assert_eq!(
            Geometric::new(4, p).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[rstest]
    fn heights_in_range(
        #[values(1, 2, 16, 64)] total: usize,
        #[values(0.1, 0.5, 0.9)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(total, p)?;
        assert_eq!(generator.total(), total);
        for _ in 0..10_000 {
            let height = generator.height();
            assert!((1..=total).contains(&height));
        }
        Ok(())
    }

    #[test]
    fn extremes_reachable() -> Result<()> {
        let total = 4;
        let mut generator = Geometric::new(total, 0.5)?;

        let mut found_min = false;
        let mut found_max = false;
        for _ in 0..10_000 {
            match generator.height() {
                1 => found_min = true,
                h if h == total => found_max = true,
                _ => {}
            }
            if found_min && found_max {
                return Ok(());
            }
        }
        bail!("failed to generate both a height-1 and a height-{total} node");
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::with_seed(16, 0.5, 0xdead_beef)?;
        let mut b = Geometric::with_seed(16, 0.5, 0xdead_beef)?;
        for _ in 0..1000 {
            assert_eq!(a.height(), b.height());
        }
        Ok(())
    }
}
