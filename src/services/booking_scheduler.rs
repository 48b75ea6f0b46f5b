//! # Booking Scheduler Service
//!
//! The BookingScheduler is the central service for acquiring slots. It
//! turns a slot selection into either a confirmed direct booking or a
//! sealed lottery bid, enforcing suspensions, per-resident limits and
//! facility cooldowns on the way in.
//!
//! ## Flow Example: Direct Booking
//!
//! ```text
//! 1. Resident requests a slot via API
//!                ↓
//! 2. Suspension / concurrency-limit / cooldown checks
//!                ↓
//! 3. Slot re-derived from live booking state (authoritative price)
//!                ↓
//! 4. One DB transaction: debit final_price + insert CONFIRMED booking
//!                ↓
//! 5. Unique index on the slot decides races: exactly one winner,
//!    losers get SLOT_UNAVAILABLE (after one internal retry)
//! ```
//!
//! ## Race handling
//!
//! Two residents racing for the same slot both pass the derive check and
//! both reach the insert; the partial unique index lets exactly one row
//! in. The loser's transaction rolls back, debit included, and
//! the attempt is retried once against fresh state. Losing again
//! surfaces as `SLOT_UNAVAILABLE`, a legitimate outcome rather than a
//! fault.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::queries;
use crate::db::{
    BookingRecord, BookingStatus, Database, FacilityRecord, LotteryBidRecord,
};
use crate::utils::format_slot;

use super::slot_generator::{BookingType, SlotGenerator, SlotStatus, TimeSlot};
use super::{BookingError, PointsLedger};

/// Outcome of one transactional booking attempt.
enum AttemptOutcome {
    /// Booking committed.
    Booked(BookingRecord),
    /// Unique-violation on the slot index: somebody else won the race.
    RaceLost,
}

/// The booking scheduler service.
#[derive(Clone)]
pub struct BookingScheduler {
    /// Database connection.
    db: Database,

    /// Slot derivation and pricing.
    slots: SlotGenerator,

    /// Booking policy numbers.
    config: AppConfig,
}

impl BookingScheduler {
    /// Create a new BookingScheduler instance.
    pub fn new(db: Database, slots: SlotGenerator, config: AppConfig) -> Self {
        Self { db, slots, config }
    }

    // ==========================================
    // DIRECT BOOKING
    // ==========================================

    /// Attempt to book a direct slot for a resident.
    ///
    /// Returns the confirmed booking, or the first failed check as a
    /// typed error. The debit and the booking insert share one database
    /// transaction keyed by the slot uniqueness index.
    pub async fn attempt_booking(
        &self,
        resident_id: Uuid,
        facility_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        note: Option<String>,
    ) -> Result<BookingRecord, BookingError> {
        let now = Utc::now();
        let facility = self.load_facility(facility_id).await?;

        self.run_admission_checks(&facility, resident_id, date, start_time, now)
            .await?;

        // One internal retry: a unique violation means we lost a race,
        // and fresh state may still show the slot free (e.g. the winner
        // cancelled), but normally the second pass reports BOOKED.
        for attempt in 0..2 {
            match self
                .try_book_direct(&facility, resident_id, date, start_time, note.clone(), now)
                .await?
            {
                AttemptOutcome::Booked(booking) => {
                    info!(
                        "Booking confirmed: {} at {} {} for resident {} ({} pts)",
                        booking.id,
                        facility.name,
                        format_slot(date, start_time),
                        resident_id,
                        booking.points_spent
                    );
                    return Ok(booking);
                }
                AttemptOutcome::RaceLost => {
                    warn!(
                        "Lost slot race for {} {} (attempt {})",
                        facility_id,
                        format_slot(date, start_time),
                        attempt + 1
                    );
                }
            }
        }

        Err(BookingError::SlotUnavailable)
    }

    /// One transactional attempt at a direct booking.
    async fn try_book_direct(
        &self,
        facility: &FacilityRecord,
        resident_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, BookingError> {
        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let tx = client.transaction().await?;

        // Authoritative slot state inside the transaction.
        let slot = self
            .derive_slot_tx(&*tx, facility, date, start_time, now)
            .await?;

        match slot.status {
            SlotStatus::Open => {}
            SlotStatus::Held | SlotStatus::Booked => return Err(BookingError::SlotUnavailable),
        }
        if slot.booking_type == BookingType::Lottery {
            return Err(BookingError::SlotIsLottery);
        }

        // Serialize debits against this account for the rest of the unit.
        queries::lock_account(&*tx, resident_id).await?;

        let booking = BookingRecord {
            id: Uuid::new_v4(),
            facility_id: facility.id,
            resident_id,
            booking_date: date,
            start_time,
            end_time: slot.end_time,
            points_spent: slot.final_price,
            status: BookingStatus::Confirmed,
            check_in_time: None,
            note,
            created_at: now,
            updated_at: now,
        };

        PointsLedger::apply(
            &*tx,
            resident_id,
            -slot.final_price,
            crate::db::TransactionType::BookingDeduct,
            Some(booking.id),
            None,
        )
        .await?;

        match queries::insert_booking(&*tx, &booking).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(AttemptOutcome::Booked(booking))
            }
            Err(e) if e.is_unique_violation() => {
                // Dropping the transaction rolls the debit back too.
                Ok(AttemptOutcome::RaceLost)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // LOTTERY BIDDING
    // ==========================================

    /// Place a sealed bid on a lottery slot.
    ///
    /// No points move: the bid and a PENDING_LOTTERY placeholder booking
    /// are inserted so the bid shows up in the resident's list and
    /// counts toward their concurrency limit. Funds are taken from the
    /// winner only, at resolution time.
    pub async fn join_lottery(
        &self,
        resident_id: Uuid,
        facility_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        bid_amount: i64,
    ) -> Result<BookingRecord, BookingError> {
        let now = Utc::now();
        let facility = self.load_facility(facility_id).await?;

        self.run_admission_checks(&facility, resident_id, date, start_time, now)
            .await?;

        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let tx = client.transaction().await?;

        let slot = self
            .derive_slot_tx(&*tx, &facility, date, start_time, now)
            .await?;

        if slot.status == SlotStatus::Booked {
            return Err(BookingError::SlotUnavailable);
        }
        if slot.booking_type != BookingType::Lottery {
            // Direct slots take the first-come path, not bids.
            return Err(BookingError::SlotUnavailable);
        }

        let slot_start = date.and_time(start_time).and_utc();
        if !bidding_open(slot_start, now, self.config.lottery_lock_hours) {
            return Err(BookingError::SlotUnavailable);
        }

        if bid_amount < slot.final_price {
            return Err(BookingError::BidTooLow {
                minimum: slot.final_price,
            });
        }

        let bid = LotteryBidRecord {
            id: Uuid::new_v4(),
            facility_id: facility.id,
            booking_date: date,
            start_time,
            resident_id,
            bid_amount,
            placed_at: now,
        };

        match queries::insert_bid(&*tx, &bid).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => return Err(BookingError::DuplicateBid),
            Err(e) => return Err(e.into()),
        }

        let placeholder = BookingRecord {
            id: Uuid::new_v4(),
            facility_id: facility.id,
            resident_id,
            booking_date: date,
            start_time,
            end_time: slot.end_time,
            points_spent: 0,
            status: BookingStatus::PendingLottery,
            check_in_time: None,
            note: None,
            created_at: now,
            updated_at: now,
        };
        queries::insert_booking(&*tx, &placeholder).await?;

        tx.commit().await?;

        info!(
            "Lottery bid of {} pts placed by resident {} on {} {}",
            bid_amount,
            resident_id,
            facility.name,
            format_slot(date, start_time)
        );

        Ok(placeholder)
    }

    // ==========================================
    // SHARED CHECKS
    // ==========================================

    async fn load_facility(&self, facility_id: Uuid) -> Result<FacilityRecord, BookingError> {
        queries::get_facility(self.db.pool(), facility_id)
            .await?
            .ok_or(BookingError::FacilityNotFound(facility_id))
    }

    /// Suspension, concurrency-limit and cooldown checks shared by the
    /// direct and lottery paths.
    async fn run_admission_checks(
        &self,
        facility: &FacilityRecord,
        resident_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        self.slots.validate_date(date, now.date_naive())?;

        let client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        // 1. Suspension
        let account = queries::get_or_create_account(&**client, resident_id).await?;
        if let Some(until) = account.suspended_until {
            if until > now {
                return Err(BookingError::AccountSuspended(until));
            }
        }

        // 2. Concurrency limit
        let active =
            queries::count_future_active_bookings(&**client, resident_id, now.naive_utc()).await?;
        if active >= facility.max_concurrent_bookings as i64 {
            return Err(BookingError::ConcurrencyLimitExceeded {
                limit: facility.max_concurrent_bookings,
            });
        }

        // 3. Cooldown
        if facility.cool_down_hours > 0 {
            let reach_days = (facility.cool_down_hours as i64 + 23) / 24 + 1;
            let existing = queries::resident_bookings_in_window(
                &**client,
                resident_id,
                facility.id,
                date - Duration::days(reach_days),
                date + Duration::days(reach_days),
            )
            .await?;

            let requested_start = date.and_time(start_time).and_utc();
            let requested_end = requested_start + Duration::hours(1);
            let intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = existing
                .iter()
                .map(|b| (b.starts_at(), b.ends_at()))
                .collect();

            if cooldown_conflict(
                &intervals,
                requested_start,
                requested_end,
                facility.cool_down_hours,
            ) {
                return Err(BookingError::CooldownActive {
                    hours: facility.cool_down_hours,
                });
            }
        }

        Ok(())
    }

    /// Re-derive one slot inside a transaction from live booking state.
    async fn derive_slot_tx<C: tokio_postgres::GenericClient>(
        &self,
        client: &C,
        facility: &FacilityRecord,
        date: NaiveDate,
        start_time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<TimeSlot, BookingError> {
        let bookings = queries::bookings_on_date(client, facility.id, date).await?;
        self.slots
            .derive_slot(facility, date, start_time, now.date_naive(), &bookings)
    }
}

/// Whether bidding on a slot is still open at `now`.
///
/// Bidding locks `lock_hours` before the slot starts; the allocator
/// resolves the slot from that instant on.
pub fn bidding_open(slot_start: DateTime<Utc>, now: DateTime<Utc>, lock_hours: i64) -> bool {
    now < slot_start - Duration::hours(lock_hours)
}

/// Whether a requested interval violates the facility cooldown against
/// any of the resident's existing booking intervals.
///
/// A conflict exists when the requested interval falls within
/// `cooldown_hours` of an existing interval on either side. A gap of
/// exactly the cooldown is allowed.
pub fn cooldown_conflict(
    existing: &[(DateTime<Utc>, DateTime<Utc>)],
    requested_start: DateTime<Utc>,
    requested_end: DateTime<Utc>,
    cooldown_hours: i32,
) -> bool {
    let pad = Duration::hours(cooldown_hours as i64);
    existing
        .iter()
        .any(|(start, end)| *end + pad > requested_start && *start - pad < requested_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_cooldown_blocks_within_window() {
        // Existing booking ends 10:00 on the 1st, cooldown 24h.
        let existing = vec![(ts(1, 9, 0), ts(1, 10, 0))];

        // 09:00 next day is inside the cooldown.
        assert!(cooldown_conflict(
            &existing,
            ts(2, 9, 0),
            ts(2, 10, 0),
            24
        ));

        // 10:01 next day has the full cooldown elapsed.
        assert!(!cooldown_conflict(
            &existing,
            ts(2, 10, 1),
            ts(2, 11, 1),
            24
        ));
    }

    #[test]
    fn test_cooldown_boundary_exactly_elapsed() {
        let existing = vec![(ts(1, 9, 0), ts(1, 10, 0))];
        // Gap of exactly 24h is allowed.
        assert!(!cooldown_conflict(
            &existing,
            ts(2, 10, 0),
            ts(2, 11, 0),
            24
        ));
    }

    #[test]
    fn test_cooldown_symmetric_before_existing() {
        // Existing booking starts 18:00 on the 2nd; a new booking the
        // evening before is just as blocked.
        let existing = vec![(ts(2, 18, 0), ts(2, 19, 0))];
        assert!(cooldown_conflict(
            &existing,
            ts(2, 8, 0),
            ts(2, 9, 0),
            24
        ));
        assert!(!cooldown_conflict(
            &existing,
            ts(1, 16, 0),
            ts(1, 17, 0),
            24
        ));
    }

    #[test]
    fn test_cooldown_zero_hours_only_blocks_overlap() {
        let existing = vec![(ts(1, 9, 0), ts(1, 10, 0))];
        assert!(!cooldown_conflict(
            &existing,
            ts(1, 10, 0),
            ts(1, 11, 0),
            0
        ));
        assert!(cooldown_conflict(
            &existing,
            ts(1, 9, 30),
            ts(1, 10, 30),
            0
        ));
    }

    #[test]
    fn test_bidding_lock_deadline() {
        let start = ts(3, 18, 0);
        // More than 24h out: open.
        assert!(bidding_open(start, ts(2, 17, 59), 24));
        // Exactly at the deadline: locked.
        assert!(!bidding_open(start, ts(2, 18, 0), 24));
        // Inside the lock window: locked.
        assert!(!bidding_open(start, ts(3, 10, 0), 24));
    }
}
