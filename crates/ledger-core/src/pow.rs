use crate::constants::{HASH_HEX_SIZE, POW_TARGET_DIFFICULTY};
use crate::hash::sha256_hex;
use crate::Hash;

/// Proof-of-work puzzle chaining each block's nonce to its predecessor's.
///
/// A nonce `n` solves the puzzle for a previous nonce `p` when the hex
/// SHA-256 digest of the decimal concatenation `"{p}{n}"` starts with
/// `difficulty` zero digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(POW_TARGET_DIFFICULTY)
    }
}

impl ProofOfWork {
    /// Difficulty is capped at the digest length.
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty: difficulty.min(HASH_HEX_SIZE),
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn guess_hash(previous_nonce: u64, nonce: u64) -> Hash {
        sha256_hex(format!("{previous_nonce}{nonce}").as_bytes())
    }

    pub fn validate(&self, previous_nonce: u64, nonce: u64) -> bool {
        count_leading_zero_digits(&Self::guess_hash(previous_nonce, nonce)) >= self.difficulty
    }

    /// Smallest nonce solving the puzzle for `previous_nonce`. Blocks until found.
    pub fn solve(&self, previous_nonce: u64) -> u64 {
        (0..=u64::MAX)
            .find(|nonce| self.validate(previous_nonce, *nonce))
            .expect("nonce space exhausted (practically impossible)")
    }
}

pub fn count_leading_zero_digits(hex_digest: &str) -> usize {
    hex_digest.bytes().take_while(|b| *b == b'0').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_digit_examples() {
        assert_eq!(count_leading_zero_digits(""), 0);
        assert_eq!(count_leading_zero_digits("abc"), 0);
        assert_eq!(count_leading_zero_digits("0a0"), 1);
        assert_eq!(count_leading_zero_digits("0000f"), 4);
        assert_eq!(count_leading_zero_digits("0000"), 4);
    }

    #[test]
    fn validate_matches_digest_prefix() {
        let pow = ProofOfWork::default();
        assert_eq!(
            ProofOfWork::guess_hash(1337, 93574),
            "0000890d184adc240568de6aa85497f1af3bda263d53ed5ee06d3a80b0433b0c"
        );
        assert!(pow.validate(1337, 93574));
        assert!(!pow.validate(1337, 93573));
        assert!(!pow.validate(1337, 0));
        for nonce in 0..500 {
            let digest = ProofOfWork::guess_hash(1337, nonce);
            assert_eq!(pow.validate(1337, nonce), digest.starts_with("0000"));
        }
    }

    #[test]
    fn solve_returns_smallest_solution() {
        // Reference values: first nonce whose sha256("{prev}{nonce}") has the zero prefix.
        assert_eq!(ProofOfWork::new(1).solve(1337), 10);
        assert_eq!(ProofOfWork::new(2).solve(1337), 401);
        assert_eq!(ProofOfWork::new(2).solve(0), 563);
        assert_eq!(ProofOfWork::new(3).solve(0), 2832);

        let pow = ProofOfWork::new(2);
        let nonce = pow.solve(1337);
        assert!((0..nonce).all(|n| !pow.validate(1337, n)));
    }

    #[test]
    fn solve_with_default_difficulty() {
        assert_eq!(ProofOfWork::default().solve(1337), 93574);
    }

    #[test]
    fn zero_difficulty_accepts_everything() {
        let pow = ProofOfWork::new(0);
        assert!(pow.validate(7, 0));
        assert_eq!(pow.solve(7), 0);
    }

    #[test]
    fn difficulty_is_capped() {
        assert_eq!(ProofOfWork::new(1000).difficulty(), HASH_HEX_SIZE);
    }
}
