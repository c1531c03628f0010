//! Round window and phase model.
//!
//! A round is a half-open bidding window `[start, end)`. Its phase is never
//! stored: it is recomputed from the window and the current time on every
//! access, so there is no close transition to drive.
//!
//! ```text
//!   now < start        start <= now < end       now >= end
//!   ┌─────────┐        ┌────────┐               ┌───────┐
//!   │ PENDING ├───────▶│ ACTIVE ├──────────────▶│ ENDED │
//!   └─────────┘        └────────┘               └───────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SealbidError};

/// The three phases of a round, derived from wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// The window has not opened yet.
    Pending,
    /// Bids may be placed, replaced, and withdrawn.
    Active,
    /// Bidding closed; the owner may read the aggregate.
    Ended,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

/// Absolute bounds of a round's bidding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RoundWindow {
    /// Build a window, rejecting `end <= start`.
    ///
    /// # Errors
    /// Returns `InvalidWindow` if the window is empty or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(SealbidError::InvalidWindow {
                reason: format!("end {end} is not after start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Phase of this window at `now`.
    #[must_use]
    pub fn phase_at(&self, now: DateTime<Utc>) -> RoundPhase {
        if now < self.start {
            RoundPhase::Pending
        } else if now < self.end {
            RoundPhase::Active
        } else {
            RoundPhase::Ended
        }
    }

    /// Whether `now` falls inside the bidding window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.phase_at(now) == RoundPhase::Active
    }

    /// Whether two half-open windows intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_and_empty_windows() {
        assert!(RoundWindow::new(t(10), t(5)).is_err());
        let err = RoundWindow::new(t(10), t(10)).unwrap_err();
        assert!(matches!(err, SealbidError::InvalidWindow { .. }));
    }

    #[test]
    fn phase_boundaries() {
        let w = RoundWindow::new(t(0), t(20)).unwrap();
        assert_eq!(w.phase_at(t(-1)), RoundPhase::Pending);
        assert_eq!(w.phase_at(t(0)), RoundPhase::Active);
        assert_eq!(w.phase_at(t(19)), RoundPhase::Active);
        assert_eq!(w.phase_at(t(20)), RoundPhase::Ended);
        assert_eq!(w.phase_at(t(500)), RoundPhase::Ended);
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = RoundWindow::new(t(0), t(20)).unwrap();
        let b = RoundWindow::new(t(20), t(40)).unwrap();
        let c = RoundWindow::new(t(19), t(25)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn contains_is_half_open() {
        let w = RoundWindow::new(t(0), t(20)).unwrap();
        assert!(!w.contains(t(-1)));
        assert!(w.contains(t(0)));
        assert!(!w.contains(t(20)));
    }

    #[test]
    fn phase_display() {
        assert_eq!(RoundPhase::Pending.to_string(), "PENDING");
        assert_eq!(RoundPhase::Ended.to_string(), "ENDED");
    }
}
