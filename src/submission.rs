//! State shared by the customer-facing submission forms
//!
//! A submission is either idle or in flight. Success shows a notice that
//! clears itself after a fixed delay; failure keeps a message for the user
//! until the next attempt.

use std::time::Duration;
use tokio::time::Instant;

use crate::error::SubmitError;

/// Self-clearing success indicator
#[derive(Debug, Clone, Copy)]
pub struct TransientNotice {
    duration: Duration,
    expires_at: Option<Instant>,
}

impl TransientNotice {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            expires_at: None,
        }
    }

    /// Show the notice, restarting the timer if already shown
    pub fn show(&mut self) {
        self.expires_at = Some(Instant::now() + self.duration);
    }

    pub fn dismiss(&mut self) {
        self.expires_at = None;
    }

    pub fn is_visible(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() < at)
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionState {
    in_flight: bool,
    notice: TransientNotice,
    error: Option<String>,
}

impl SubmissionState {
    pub fn new(notice_duration: Duration) -> Self {
        Self {
            in_flight: false,
            notice: TransientNotice::new(notice_duration),
            error: None,
        }
    }

    /// Disables the submit control; a second call before completion is rejected
    pub fn begin(&mut self) -> Result<(), SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }
        self.in_flight = true;
        self.error = None;
        self.notice.dismiss();
        Ok(())
    }

    pub fn succeed(&mut self) {
        self.in_flight = false;
        self.notice.show();
    }

    pub fn fail(&mut self, message: &str) {
        self.in_flight = false;
        self.error = Some(message.to_string());
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn success_visible(&self) -> bool {
        self.notice.is_visible()
    }

    /// User-facing message from the last failed attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notice_clears_itself_after_duration() {
        let mut notice = TransientNotice::new(Duration::from_secs(5));
        assert!(!notice.is_visible());

        notice.show();
        assert!(notice.is_visible());

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(notice.is_visible());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!notice.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn second_begin_while_in_flight_is_rejected() {
        let mut state = SubmissionState::new(Duration::from_secs(5));
        state.begin().unwrap();
        assert!(matches!(state.begin(), Err(SubmitError::InFlight)));

        state.fail("Error placing order. Please try again.");
        assert!(!state.is_in_flight());
        assert_eq!(state.error(), Some("Error placing order. Please try again."));

        state.begin().unwrap();
        assert_eq!(state.error(), None);
        state.succeed();
        assert!(state.success_visible());
    }
}
