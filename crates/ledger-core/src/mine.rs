use crate::{constants::POW_BATCH_SIZE, error::MineError, pow::ProofOfWork};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Searches nonces in parallel, one batch of [`POW_BATCH_SIZE`] at a time, and
/// returns the smallest nonce solving the puzzle for `previous_nonce`.
///
/// The result is the same as [`ProofOfWork::solve`]; batches are scanned in
/// order and `find_first` keeps the lowest hit within a batch. `cancel` is
/// checked before every batch.
pub fn solve_parallel(
    pow: &ProofOfWork,
    previous_nonce: u64,
    cancel: &AtomicBool,
) -> Result<u64, MineError> {
    let mut start = 0u64;
    while start < u64::MAX {
        if cancel.load(Ordering::Relaxed) {
            debug!(previous_nonce, searched = start, "proof-of-work search cancelled");
            return Err(MineError::Cancelled);
        }
        let end = start.saturating_add(POW_BATCH_SIZE);
        let found = (start..end)
            .into_par_iter()
            .find_first(|nonce| pow.validate(previous_nonce, *nonce));
        if let Some(nonce) = found {
            debug!(previous_nonce, nonce, "proof-of-work solved");
            return Ok(nonce);
        }
        start = end;
    }
    panic!("nonce space exhausted (practically impossible)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_search_matches_sequential() {
        let cancel = AtomicBool::new(false);
        for difficulty in 1..=3 {
            let pow = ProofOfWork::new(difficulty);
            for previous_nonce in [0, 1, 1337, 93574] {
                assert_eq!(
                    solve_parallel(&pow, previous_nonce, &cancel),
                    Ok(pow.solve(previous_nonce))
                );
            }
        }
    }

    #[test]
    fn parallel_search_crosses_batches() {
        // 93574 lies beyond the first few batches.
        let cancel = AtomicBool::new(false);
        let pow = ProofOfWork::default();
        assert_eq!(solve_parallel(&pow, 1337, &cancel), Ok(93574));
    }

    #[test]
    fn cancelled_search_returns_error() {
        let cancel = AtomicBool::new(true);
        assert_eq!(
            solve_parallel(&ProofOfWork::default(), 1337, &cancel),
            Err(MineError::Cancelled)
        );
    }
}
