//! # Cancellation Engine
//!
//! Handles voluntary cancellation of bookings and the tiered refund that
//! goes with it.
//!
//! ## Refund Policy
//!
//! | When cancelled | Refund |
//! |----------------|--------|
//! | 24h or more before slot start | 100% of points spent |
//! | Less than 24h before start | 50%; the retained half is the fee |
//!
//! The late-cancel fee is implicit: the resident was debited in full at
//! booking time, so retaining half simply means refunding the other
//! half. No separate fee transaction is written.
//!
//! Cancelling a PENDING_LOTTERY placeholder withdraws the bid instead:
//! bid row deleted, placeholder cancelled, zero ledger impact (nothing
//! was ever charged).

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::queries;
use crate::db::{BookingRecord, BookingStatus, Database, TransactionType};

use super::{BookingError, PointsLedger};

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// The cancelled booking (status already updated).
    pub booking: BookingRecord,

    /// Points credited back to the resident.
    pub refund: i64,
}

/// The cancellation engine.
#[derive(Clone)]
pub struct CancellationEngine {
    /// Database connection.
    db: Database,

    /// Policy numbers (full-refund window).
    config: AppConfig,
}

impl CancellationEngine {
    /// Create a new CancellationEngine instance.
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self { db, config }
    }

    /// Cancel a booking on behalf of its owner.
    ///
    /// Only the owning resident may cancel, and only before the slot
    /// starts. The status flip and the refund credit share one database
    /// transaction; the freed slot becomes bookable by others the moment
    /// it commits (the partial unique index no longer sees the row).
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        resident_id: Uuid,
    ) -> Result<CancellationOutcome, BookingError> {
        let now = Utc::now();

        let booking = queries::get_booking(self.db.pool(), booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.resident_id != resident_id {
            return Err(BookingError::NotOwner);
        }

        match booking.status {
            BookingStatus::Confirmed => {}
            BookingStatus::PendingLottery => return self.withdraw_bid(booking, now).await,
            BookingStatus::Cancelled
            | BookingStatus::Completed
            | BookingStatus::NoShow => return Err(BookingError::BookingNotCancellable),
        }

        if booking.starts_at() <= now {
            return Err(BookingError::BookingNotCancellable);
        }

        let refund = refund_amount(
            booking.points_spent,
            booking.starts_at(),
            now,
            self.config.full_refund_hours,
        );

        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let tx = client.transaction().await?;

        // Guarded flip: a concurrent cancel or sweep loses here.
        let flipped = queries::transition_booking_status(
            &*tx,
            booking.id,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        )
        .await?;
        if !flipped {
            return Err(BookingError::BookingNotCancellable);
        }

        if refund > 0 {
            queries::lock_account(&*tx, resident_id).await?;
            PointsLedger::apply(
                &*tx,
                resident_id,
                refund,
                TransactionType::BookingRefund,
                Some(booking.id),
                None,
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            "Booking {} cancelled by resident {} ({} of {} pts refunded)",
            booking.id, resident_id, refund, booking.points_spent
        );

        let mut cancelled = booking;
        cancelled.status = BookingStatus::Cancelled;
        Ok(CancellationOutcome {
            booking: cancelled,
            refund,
        })
    }

    /// Withdraw a pending lottery bid: cancel the placeholder and delete
    /// the bid row. Nothing was charged, so nothing is refunded.
    async fn withdraw_bid(
        &self,
        booking: BookingRecord,
        _now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, BookingError> {
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
            BookingStatus::PendingLottery,
            BookingStatus::Cancelled,
        )
        .await?;
        if !flipped {
            // The lottery already resolved this slot.
            return Err(BookingError::BookingNotCancellable);
        }

        queries::delete_bid(
            &*tx,
            booking.facility_id,
            booking.booking_date,
            booking.start_time,
            booking.resident_id,
        )
        .await?;

        tx.commit().await?;

        info!(
            "Lottery bid withdrawn: booking {} by resident {}",
            booking.id, booking.resident_id
        );

        let mut cancelled = booking;
        cancelled.status = BookingStatus::Cancelled;
        Ok(CancellationOutcome {
            booking: cancelled,
            refund: 0,
        })
    }
}

/// Refund for cancelling at `now` a booking that cost `points_spent`
/// and starts at `starts_at`.
///
/// At or before `full_refund_hours` ahead of the start the refund is
/// 100%; after that boundary it is half, rounded down.
pub fn refund_amount(
    points_spent: i64,
    starts_at: DateTime<Utc>,
    now: DateTime<Utc>,
    full_refund_hours: i64,
) -> i64 {
    if now <= starts_at - Duration::hours(full_refund_hours) {
        points_spent
    } else {
        points_spent / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_full_refund_at_exactly_24h() {
        let start = at(2, 10, 0);
        assert_eq!(refund_amount(100, start, at(1, 10, 0), 24), 100);
    }

    #[test]
    fn test_half_refund_inside_24h() {
        let start = at(2, 10, 0);
        // 23h59m before start: only half comes back.
        assert_eq!(refund_amount(100, start, at(1, 10, 1), 24), 50);
        // One minute before start still refunds half.
        assert_eq!(refund_amount(100, start, at(2, 9, 59), 24), 50);
    }

    #[test]
    fn test_half_refund_rounds_down() {
        let start = at(2, 10, 0);
        assert_eq!(refund_amount(75, start, at(2, 9, 0), 24), 37);
    }

    #[test]
    fn test_zero_spent_refunds_zero() {
        let start = at(2, 10, 0);
        assert_eq!(refund_amount(0, start, at(1, 9, 0), 24), 0);
    }
}
