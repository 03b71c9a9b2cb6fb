//! Account lockout policy
//!
//! Pure state transitions for the per-account lockout guard. Nothing here
//! touches storage; [`crate::services::LockoutService`] persists the states
//! this module computes.
//!
//! ```text
//!            failure (n+1 < max)
//!           ┌──────────┐
//!           ▼          │
//!         Open ────────┘
//!          │  ▲
//! failure  │  │ success, or check after the window elapsed
//! n+1>=max ▼  │
//!         Locked ── check within window ──▶ reject, hasher not consulted
//! ```

use crate::account::LockoutState;
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub enabled: bool,
    /// Failures that lock the account. The attempt that reaches this count
    /// is the one that locks.
    pub max_failed_attempts: u32,
    pub lockout_period: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_period: Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        }
    }
}

/// Result of the pre-verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutDecision {
    /// Verify the password. `lock_expired` is set when the stored lock has
    /// run out and must be cleared before verification.
    Proceed { lock_expired: bool },
    RejectLocked { remaining: Duration },
}

impl LockoutDecision {
    /// Remaining lock time in whole minutes, rounded up. `None` unless the
    /// decision is a rejection.
    pub fn remaining_minutes(&self) -> Option<i64> {
        match self {
            LockoutDecision::RejectLocked { remaining } => Some(ceil_minutes(*remaining)),
            LockoutDecision::Proceed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

impl LockoutPolicy {
    pub fn new(max_failed_attempts: u32, lockout_period: Duration) -> Self {
        Self {
            enabled: true,
            max_failed_attempts,
            lockout_period,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn check(&self, state: &LockoutState, now: DateTime<Utc>) -> LockoutDecision {
        if !self.enabled || !state.is_locked {
            return LockoutDecision::Proceed {
                lock_expired: false,
            };
        }

        let Some(locked_at) = state.locked_at else {
            return LockoutDecision::Proceed { lock_expired: true };
        };

        let elapsed = now - locked_at;
        if elapsed >= self.lockout_period {
            LockoutDecision::Proceed { lock_expired: true }
        } else {
            // A lock stamped in the future (clock skew) never reports more
            // than one full period.
            let remaining = (self.lockout_period - elapsed).min(self.lockout_period);
            LockoutDecision::RejectLocked { remaining }
        }
    }

    pub fn after_attempt(
        &self,
        state: &LockoutState,
        outcome: AttemptOutcome,
        now: DateTime<Utc>,
    ) -> LockoutState {
        if !self.enabled {
            return *state;
        }

        match outcome {
            AttemptOutcome::Success => LockoutState::default(),
            AttemptOutcome::Failure => {
                let attempts = state.failed_login_attempts.saturating_add(1);
                match (state.is_locked, state.locked_at) {
                    (true, Some(locked_at)) => LockoutState::locked(attempts, locked_at),
                    _ if attempts >= self.max_failed_attempts => {
                        LockoutState::locked(attempts, now)
                    }
                    _ => LockoutState::open(attempts),
                }
            }
        }
    }
}

fn ceil_minutes(remaining: Duration) -> i64 {
    let millis = remaining.num_milliseconds().max(0);
    (millis + 59_999) / 60_000
}
