//! # Lottery Allocator Service
//!
//! Resolves contested slots at their lock deadline. Residents bid
//! sealed amounts on high-demand slots; when bidding locks (24h before
//! the slot by default) the allocator picks one winner per slot and
//! charges them the slot's floor price.
//!
//! ## Resolution Algorithm
//!
//! ```text
//! 1. Load all bids for the slot (highest bid first, ties by placed_at)
//! 2. No bids        → record an empty resolution, done
//! 3. Walk candidates in priority order:
//!      lock account → affordable? → promote placeholder → charge floor
//! 4. Cancel every remaining PENDING_LOTTERY placeholder (no charge,
//!    no refund; bids are non-custodial)
//! 5. Insert the resolution row and commit
//! ```
//!
//! Bids are a priority signal only: the winner pays `final_price`, not
//! their bid. The sealed amount is still persisted in the resolution
//! row for auditability.
//!
//! ## Idempotency
//!
//! The whole resolution is one database transaction whose final write
//! is the resolution row, keyed by the slot. Two workers racing on the
//! same slot both do the work, but the second one's commit hits the
//! primary-key conflict and rolls back everything, charge included.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::queries;
use crate::db::{Database, LotteryBidRecord, LotteryResolutionRecord, TransactionType};
use crate::utils::format_slot;

use super::slot_generator::SlotGenerator;
use super::{BookingError, PointsLedger};

/// The lottery allocator service.
#[derive(Clone)]
pub struct LotteryAllocator {
    /// Database connection.
    db: Database,

    /// Pricing, for the floor price the winner is charged.
    slots: SlotGenerator,

    /// Policy numbers (lock offset).
    config: AppConfig,
}

impl LotteryAllocator {
    /// Create a new LotteryAllocator instance.
    pub fn new(db: Database, slots: SlotGenerator, config: AppConfig) -> Self {
        Self { db, slots, config }
    }

    /// Resolve every slot whose lock deadline has passed.
    ///
    /// Returns how many slots were resolved in this pass. Safe to run
    /// from multiple workers; already-resolved slots are skipped.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<u32, BookingError> {
        let lock_cutoff = (now + Duration::hours(self.config.lottery_lock_hours)).naive_utc();
        let due = queries::unresolved_locked_slots(self.db.pool(), lock_cutoff).await?;

        if due.is_empty() {
            return Ok(0);
        }
        debug!("Lottery sweep: {} slot(s) due for resolution", due.len());

        let mut resolved = 0;
        for (facility_id, date, start_time) in due {
            match self.resolve_slot(facility_id, date, start_time, now).await {
                Ok(true) => resolved += 1,
                Ok(false) => {}
                Err(e) => warn!(
                    "Lottery resolution failed for {} {} {}: {}",
                    facility_id, date, start_time, e
                ),
            }
        }

        Ok(resolved)
    }

    /// Resolve one contested slot.
    ///
    /// Returns `Ok(true)` if this call performed the resolution,
    /// `Ok(false)` if another worker got there first.
    pub async fn resolve_slot(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        // Deactivated facilities still settle their open bids, so skip
        // the catalog's is_active filter here.
        let facility = queries::get_facility_any(self.db.pool(), facility_id)
            .await?
            .ok_or(BookingError::FacilityNotFound(facility_id))?;
        let final_price = self.slots.quote(&facility, date, start_time).1;

        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let tx = client.transaction().await?;

        let bids = queries::bids_for_slot(&*tx, facility_id, date, start_time).await?;
        let ordered = priority_order(&bids);

        let mut winner: Option<(&LotteryBidRecord, Uuid)> = None;
        for candidate in &ordered {
            // Lock the account so the affordability check holds until commit.
            let account = queries::lock_account(&*tx, candidate.resident_id).await?;
            if account.balance < final_price {
                debug!(
                    "Bidder {} cannot afford floor price {}, passing over",
                    candidate.resident_id, final_price
                );
                continue;
            }

            let booking_id = match queries::confirm_pending_booking(
                &*tx,
                facility_id,
                date,
                start_time,
                candidate.resident_id,
                final_price,
            )
            .await?
            {
                Some(id) => id,
                // Placeholder vanished (withdrawn bid); next candidate.
                None => continue,
            };

            PointsLedger::apply(
                &*tx,
                candidate.resident_id,
                -final_price,
                TransactionType::LotteryCharge,
                Some(booking_id),
                None,
            )
            .await?;

            winner = Some((candidate, booking_id));
            break;
        }

        // Everyone still pending lost; their placeholders go away with
        // zero charge.
        let losers = queries::cancel_pending_losers(&*tx, facility_id, date, start_time).await?;

        let resolution = LotteryResolutionRecord {
            facility_id,
            booking_date: date,
            start_time,
            winner_resident_id: winner.map(|(b, _)| b.resident_id),
            winning_bid: winner.map(|(b, _)| b.bid_amount),
            charged: winner.map(|_| final_price),
            bid_count: bids.len() as i32,
            resolved_at: now,
        };

        match queries::insert_resolution(&*tx, &resolution).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                // Another worker resolved this slot; our transaction
                // (charge included) rolls back on drop.
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;

        match winner {
            Some((bid, _booking_id)) => info!(
                "Lottery resolved: {} {} → resident {} (bid {}, charged {}, {} bids, {} losers)",
                facility.name,
                format_slot(date, start_time),
                bid.resident_id,
                bid.bid_amount,
                final_price,
                bids.len(),
                losers
            ),
            None => info!(
                "Lottery resolved: {} {} → no chargeable winner ({} bids)",
                facility.name,
                format_slot(date, start_time),
                bids.len()
            ),
        }

        Ok(true)
    }
}

/// Bids in winning order: highest amount first, ties broken by earliest
/// `placed_at`, so the first bidder wins ties.
pub fn priority_order(bids: &[LotteryBidRecord]) -> Vec<&LotteryBidRecord> {
    let mut ordered: Vec<&LotteryBidRecord> = bids.iter().collect();
    ordered.sort_by(|a, b| {
        b.bid_amount
            .cmp(&a.bid_amount)
            .then(a.placed_at.cmp(&b.placed_at))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bid(amount: i64, placed_minute: u32) -> LotteryBidRecord {
        LotteryBidRecord {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            booking_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            resident_id: Uuid::new_v4(),
            bid_amount: amount,
            placed_at: Utc
                .with_ymd_and_hms(2026, 9, 1, 12, placed_minute, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_highest_bid_wins() {
        let a = bid(50, 30);
        let b = bid(80, 45);
        let bids = vec![a.clone(), b.clone()];

        let ordered = priority_order(&bids);
        assert_eq!(ordered[0].resident_id, b.resident_id);
        assert_eq!(ordered[1].resident_id, a.resident_id);
    }

    #[test]
    fn test_tie_broken_by_earliest_placed_at() {
        // Two equal bids of 50; A placed earlier than B.
        let a = bid(50, 10);
        let b = bid(50, 20);
        let bids = vec![b.clone(), a.clone()];

        let ordered = priority_order(&bids);
        assert_eq!(ordered[0].resident_id, a.resident_id);
    }

    #[test]
    fn test_empty_bids() {
        assert!(priority_order(&[]).is_empty());
    }

    #[test]
    fn test_resolution_price_ignores_is_active() {
        // Bids placed before a facility was deactivated still settle,
        // at the same floor price an active facility would see.
        use crate::db::FacilityRecord;
        use crate::services::slot_generator::PricingPolicy;

        let mut facility = FacilityRecord {
            id: Uuid::new_v4(),
            name: "Party Room".to_string(),
            base_price: 50,
            cool_down_hours: 24,
            max_concurrent_bookings: 2,
            is_lottery_enabled: true,
            capacity: 30,
            open_hour: 10,
            close_hour: 22,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let slots = SlotGenerator::new(PricingPolicy::standard(), 14, 1.3);
        let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let start = NaiveTime::from_hms_opt(19, 0, 0).unwrap();

        let active_price = slots.quote(&facility, date, start).1;
        facility.is_active = false;
        assert_eq!(slots.quote(&facility, date, start).1, active_price);
    }
}
