//! Attempt budget for malformed model output.
//!
//! [`RetryPolicy`] bounds how many times the [`Recommender`](crate::engine::Recommender)
//! runs the full pipeline (entry validation, prompt, completion, output
//! validation) before giving up. Only malformed output consumes an attempt;
//! transport and service errors end the request immediately.

/// Default number of total attempts (the first try plus two retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound on `max_attempts`, to keep worst-case latency and cost sane.
pub const MAX_ATTEMPTS_CAP: u32 = 10;

/// How many pipeline runs a single request may use.
///
/// # Example
///
/// ```
/// use booklog_recs::retry::RetryPolicy;
///
/// assert_eq!(RetryPolicy::default().max_attempts(), 3);
/// assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
/// assert_eq!(RetryPolicy::no_retry().retries(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Range: 1-10.
    max_attempts: u32,
}

impl RetryPolicy {
    /// Allow up to `max_attempts` total runs, clamped to 1-10.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS_CAP),
        }
    }

    /// A single attempt with no retry.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Retries after the first attempt.
    pub fn retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }

    /// Attempt numbers, 1-indexed.
    pub fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.retries(), 2);
        assert_eq!(policy.attempts().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_clamped_low() {
        let policy = RetryPolicy::new(0);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.retries(), 0);
        assert_eq!(policy.attempts().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_clamped_high() {
        assert_eq!(RetryPolicy::new(50).max_attempts(), MAX_ATTEMPTS_CAP);
    }
}
