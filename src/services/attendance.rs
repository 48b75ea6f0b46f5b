//! # Attendance Tracker
//!
//! Check-in handling plus the no-show penalty engine.
//!
//! ## Check-in Window
//!
//! A resident may check in from 15 minutes before the slot starts until
//! 15 minutes after. Checking in records `check_in_time` on the booking;
//! the status stays CONFIRMED until the periodic sweep marks attended
//! bookings COMPLETED.
//!
//! ## No-show Escalation
//!
//! The sweep examines CONFIRMED bookings whose check-in window has
//! closed:
//!
//! ```text
//! checked in?  --yes-->  COMPLETED
//!      |
//!      no
//!      v
//!   NO_SHOW, debit penalty (capped at balance), strike +1
//!      |
//!   3rd strike?  --yes-->  suspend 30 days, reset strikes to 0
//! ```
//!
//! Every transition is a guarded conditional UPDATE, so running the
//! sweep twice over the same rows is harmless.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::queries;
use crate::db::{BookingRecord, BookingStatus, Database, TransactionType};

use super::{BookingError, PointsLedger};

/// What the no-show sweep did to a single booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAction {
    /// Check-in was recorded; booking marked completed.
    Completed,

    /// No check-in; penalty applied.
    MarkedNoShow { penalty: i64, suspended: bool },

    /// Another writer got there first.
    Skipped,
}

/// Check-in and no-show tracking.
#[derive(Clone)]
pub struct AttendanceTracker {
    /// Database connection.
    db: Database,

    /// Policy numbers (window width, penalty size, strike limit).
    config: AppConfig,
}

impl AttendanceTracker {
    /// Create a new AttendanceTracker instance.
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self { db, config }
    }

    /// Record a check-in for a confirmed booking.
    pub async fn check_in(
        &self,
        booking_id: Uuid,
        resident_id: Uuid,
    ) -> Result<BookingRecord, BookingError> {
        let now = Utc::now();

        let booking = queries::get_booking(self.db.pool(), booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.resident_id != resident_id {
            return Err(BookingError::NotOwner);
        }
        if booking.check_in_time.is_some() {
            return Err(BookingError::AlreadyCheckedIn);
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::OutsideCheckInWindow);
        }
        if !in_check_in_window(booking.starts_at(), now, self.config.check_in_window_minutes) {
            return Err(BookingError::OutsideCheckInWindow);
        }

        let client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        // Conditional write: loses cleanly to a concurrent check-in.
        let recorded = queries::set_check_in(&**client, booking.id, now).await?;
        if !recorded {
            return Err(BookingError::AlreadyCheckedIn);
        }

        info!("Resident {} checked in to booking {}", resident_id, booking.id);

        let mut updated = booking;
        updated.check_in_time = Some(now);
        Ok(updated)
    }

    /// Sweep bookings whose check-in window has closed.
    ///
    /// Checked-in bookings become COMPLETED; the rest become NO_SHOW and
    /// the resident is penalised. Returns the number of bookings acted
    /// on.
    pub async fn run_no_show_sweep(&self, now: DateTime<Utc>) -> Result<usize, BookingError> {
        let cutoff =
            (now - Duration::minutes(self.config.check_in_window_minutes)).naive_utc();
        let expired = queries::confirmed_past_window(self.db.pool(), cutoff).await?;

        let mut acted = 0;
        let mut total_penalty = 0;
        let mut suspensions = 0;
        for booking in expired {
            match self.settle_booking(&booking).await {
                Ok(SweepAction::Skipped) => {}
                Ok(SweepAction::Completed) => acted += 1,
                Ok(SweepAction::MarkedNoShow { penalty, suspended }) => {
                    acted += 1;
                    total_penalty += penalty;
                    if suspended {
                        suspensions += 1;
                    }
                }
                Err(e) => {
                    warn!("No-show sweep failed for booking {}: {}", booking.id, e);
                }
            }
        }
        if total_penalty > 0 || suspensions > 0 {
            info!(
                "No-show sweep debited {} pts, {} suspension(s)",
                total_penalty, suspensions
            );
        }
        Ok(acted)
    }

    /// Settle one expired booking: complete it or mark it a no-show.
    async fn settle_booking(&self, booking: &BookingRecord) -> Result<SweepAction, BookingError> {
        if booking.check_in_time.is_some() {
            let client = self
                .db
                .pool()
                .get()
                .await
                .map_err(|e| BookingError::Database(e.to_string()))?;
            let flipped = queries::transition_booking_status(
                &**client,
                booking.id,
                BookingStatus::Confirmed,
                BookingStatus::Completed,
            )
            .await?;
            return Ok(if flipped {
                SweepAction::Completed
            } else {
                SweepAction::Skipped
            });
        }

        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let tx = client.transaction().await?;

        let flipped = queries::transition_booking_status(
            &*tx,
            booking.id,
            BookingStatus::Confirmed,
            BookingStatus::NoShow,
        )
        .await?;
        if !flipped {
            return Ok(SweepAction::Skipped);
        }

        let account = queries::lock_account(&*tx, booking.resident_id).await?;

        // Debit is capped at the balance; the ledger never goes negative.
        let penalty = self.config.no_show_penalty_points.min(account.balance);
        if penalty > 0 {
            PointsLedger::apply(
                &*tx,
                booking.resident_id,
                -penalty,
                TransactionType::NoShowPenalty,
                Some(booking.id),
                None,
            )
            .await?;
        }

        let outcome = penalty_outcome(account.penalty_count + 1, self.config.penalty_strike_limit);
        let suspended_until = if outcome.suspend {
            Some(Utc::now() + Duration::days(self.config.suspension_days))
        } else {
            account.suspended_until
        };
        queries::set_penalty_state(
            &*tx,
            booking.resident_id,
            outcome.strikes,
            suspended_until,
        )
        .await?;

        tx.commit().await?;

        if outcome.suspend {
            warn!(
                "Resident {} suspended after repeated no-shows (booking {})",
                booking.resident_id, booking.id
            );
        } else {
            info!(
                "Booking {} marked NO_SHOW: {} pts penalty, strike {}",
                booking.id, penalty, outcome.strikes
            );
        }

        Ok(SweepAction::MarkedNoShow {
            penalty,
            suspended: outcome.suspend,
        })
    }
}

/// Strike bookkeeping after a no-show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// New strike counter to store.
    pub strikes: i32,

    /// Whether this strike triggers a suspension.
    pub suspend: bool,
}

/// Whether `now` falls inside the check-in window around `slot_start`.
///
/// The window is closed on both ends: `[start - w, start + w]`.
pub fn in_check_in_window(
    slot_start: DateTime<Utc>,
    now: DateTime<Utc>,
    window_minutes: i64,
) -> bool {
    let pad = Duration::minutes(window_minutes);
    now >= slot_start - pad && now <= slot_start + pad
}

/// Strike counter arithmetic: every `limit`-th strike suspends and
/// resets the counter.
pub fn penalty_outcome(new_count: i32, limit: i32) -> PenaltyOutcome {
    if new_count >= limit {
        PenaltyOutcome {
            strikes: 0,
            suspend: true,
        }
    } else {
        PenaltyOutcome {
            strikes: new_count,
            suspend: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 5, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_check_in_window_boundaries() {
        let start = at(10, 0);
        assert!(in_check_in_window(start, at(9, 45), 15));
        assert!(in_check_in_window(start, at(10, 0), 15));
        assert!(in_check_in_window(start, at(10, 15), 15));
        assert!(!in_check_in_window(start, at(9, 44), 15));
        assert!(!in_check_in_window(start, at(10, 16), 15));
    }

    #[test]
    fn test_first_two_strikes_accumulate() {
        assert_eq!(
            penalty_outcome(1, 3),
            PenaltyOutcome {
                strikes: 1,
                suspend: false
            }
        );
        assert_eq!(
            penalty_outcome(2, 3),
            PenaltyOutcome {
                strikes: 2,
                suspend: false
            }
        );
    }

    #[test]
    fn test_third_strike_suspends_and_resets() {
        assert_eq!(
            penalty_outcome(3, 3),
            PenaltyOutcome {
                strikes: 0,
                suspend: true
            }
        );
    }
}
