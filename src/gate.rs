use std::time::{Duration, Instant};

use crate::error::{ChatError, Result};

/// Minimum spacing between two accepted sends
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1000);

/// Fixed-delay rate gate. Only a successful pass moves `last_sent_at`.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    delay: Duration,
    last_sent_at: Option<Instant>,
}

impl DispatchGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_sent_at: None,
        }
    }

    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    /// Check without recording anything
    pub fn check(&self, now: Instant) -> Result<()> {
        match self.last_sent_at {
            Some(last) if now.saturating_duration_since(last) < self.delay => {
                Err(ChatError::RateLimited)
            }
            _ => Ok(()),
        }
    }

    /// Check and, if allowed, record `now` as the last send
    pub fn pass(&mut self, now: Instant) -> Result<()> {
        self.check(now)?;
        self.last_sent_at = Some(now);
        Ok(())
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new(RATE_LIMIT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_pass_always_allowed() {
        let mut gate = DispatchGate::default();
        assert!(gate.pass(Instant::now()).is_ok());
    }

    #[test]
    fn rejects_inside_window_without_moving_timestamp() {
        let t0 = Instant::now();
        let mut gate = DispatchGate::default();
        gate.pass(t0).unwrap();

        assert_eq!(gate.pass(t0 + ms(500)), Err(ChatError::RateLimited));
        assert_eq!(gate.last_sent_at(), Some(t0));

        // Measured from the accepted send, not the rejected one
        assert!(gate.pass(t0 + ms(1100)).is_ok());
        assert_eq!(gate.last_sent_at(), Some(t0 + ms(1100)));
    }

    #[test]
    fn exact_delay_is_allowed() {
        let t0 = Instant::now();
        let mut gate = DispatchGate::new(ms(1000));
        gate.pass(t0).unwrap();
        assert!(gate.check(t0 + ms(999)).is_err());
        assert!(gate.check(t0 + ms(1000)).is_ok());
    }

    #[test]
    fn zero_delay_never_limits() {
        let t0 = Instant::now();
        let mut gate = DispatchGate::new(Duration::ZERO);
        gate.pass(t0).unwrap();
        assert!(gate.pass(t0).is_ok());
    }
}
