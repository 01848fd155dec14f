use rand::Rng;

use crate::environment::Action;

/// A stream of uniform random draws.
///
/// Every operation that needs randomness takes one of these explicitly, so a
/// run is reproducible from its seed. Any [`rand::Rng`] is a source.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, bound)`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no candidate actions to sample from")]
    Empty,
}

/// Picks one action uniformly at random.
///
/// `[0, 1)` is split into `actions.len()` equal buckets in list order and the
/// action whose bucket holds the draw wins, so the reward of an action never
/// affects its chance of being picked.
pub fn sample_random<R>(actions: &[Action], rng: &mut R) -> Result<Action, SelectionError>
where
    R: RandomSource + ?Sized,
{
    let last = actions.last().ok_or(SelectionError::Empty)?;
    let draw = rng.next_unit();
    let width = 1.0 / actions.len() as f64;
    for (i, action) in actions.iter().enumerate() {
        if draw < (i + 1) as f64 * width {
            return Ok(*action);
        }
    }
    Ok(*last)
}
