use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Waiting,
    Authenticated,
    TimedOut,
}

/// Bounded polling for an interactive login.
///
/// The caller checks the page, reports the result together with the time
/// elapsed since polling began, and sleeps for [`LoginPoll::next_delay`]
/// while the state is `Waiting`. Terminal states are sticky.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPoll {
    interval: Duration,
    max_wait: Duration,
    state: LoginState,
}

impl LoginPoll {
    const MIN_INTERVAL: Duration = Duration::from_millis(10);

    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval: interval.max(Self::MIN_INTERVAL),
            max_wait,
            state: LoginState::Waiting,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn observe(&mut self, authenticated: bool, elapsed: Duration) -> LoginState {
        if self.state != LoginState::Waiting {
            return self.state;
        }
        self.state = if authenticated {
            LoginState::Authenticated
        } else if elapsed >= self.max_wait {
            LoginState::TimedOut
        } else {
            LoginState::Waiting
        };
        self.state
    }

    /// Sleep before the next check, clipped so the last check lands on the deadline.
    pub fn next_delay(&self, elapsed: Duration) -> Option<Duration> {
        if self.state != LoginState::Waiting {
            return None;
        }
        let remaining = self.max_wait.saturating_sub(elapsed);
        Some(self.interval.min(remaining).max(Self::MIN_INTERVAL))
    }
}
