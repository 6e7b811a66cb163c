//! Throttled forwarding of user interactions to the session store.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use super::session::SessionStore;

/// Minimum gap, in seconds, between forwarded activity updates.
pub const ACTIVITY_THROTTLE_SECS: i64 = 60;

/// Forwards interactions to [`SessionStore::update_activity`] at most once
/// per [`ACTIVITY_THROTTLE_SECS`], measured from the last forwarded update.
pub struct ActivityTracker {
    clock: Arc<dyn Clock>,
    last_forwarded: Mutex<Option<DateTime<Utc>>>,
}

impl ActivityTracker {
    /// Create a tracker that has not forwarded anything yet.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_forwarded: Mutex::new(None),
        }
    }

    /// Record an interaction. Returns `true` when the session was stamped.
    ///
    /// Interactions while logged out are ignored and do not open a window.
    pub fn record_interaction(&self, session: &SessionStore) -> bool {
        if !session.is_authenticated() {
            return false;
        }
        let now = self.clock.utc();
        let mut last = self
            .last_forwarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.is_some_and(|previous| now - previous < TimeDelta::seconds(ACTIVITY_THROTTLE_SECS)) {
            return false;
        }
        *last = Some(now);
        drop(last);
        session.update_activity();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SessionFixture, admin_user};
    use rstest::rstest;

    #[rstest]
    fn forwards_once_per_rolling_window() {
        let fixture = SessionFixture::new();
        fixture.session.login(admin_user(), "token-1");
        let tracker = ActivityTracker::new(fixture.clock.clone());

        assert!(tracker.record_interaction(&fixture.session));
        fixture.clock.advance_seconds(30);
        assert!(!tracker.record_interaction(&fixture.session));
        fixture.clock.advance_seconds(29);
        assert!(!tracker.record_interaction(&fixture.session));
        fixture.clock.advance_seconds(1);
        assert!(tracker.record_interaction(&fixture.session));
        assert_eq!(
            fixture.session.snapshot().last_activity(),
            Some(fixture.clock.utc().timestamp_millis())
        );
    }

    #[rstest]
    fn ignores_interactions_while_logged_out() {
        let fixture = SessionFixture::new();
        fixture.session.rehydrate();
        let tracker = ActivityTracker::new(fixture.clock.clone());

        assert!(!tracker.record_interaction(&fixture.session));
        assert_eq!(fixture.session.snapshot().last_activity(), None);
    }
}
