//! # Database Models
//!
//! This module defines the data structures that map to database tables.
//! Each struct represents a row in a table.
//!
//! ## Table Overview
//!
//! | Table | Description |
//! |-------|-------------|
//! | `facilities` | Bookable amenity catalog |
//! | `points_accounts` | Per-resident point balance and penalty state |
//! | `points_transactions` | Append-only ledger of every point movement |
//! | `bookings` | Reservations (status transitions only, never deleted) |
//! | `lottery_bids` | Sealed bids on contested slots |
//! | `lottery_resolutions` | One row per resolved lottery slot |
//!
//! ## Relationship Diagram
//!
//! ```text
//! ┌──────────────┐       ┌──────────────────┐
//! │  facilities  │──────<│     bookings     │
//! │              │       │                  │
//! │ id (PK)      │       │ facility_id (FK) │
//! │ base_price   │       │ resident_id      │
//! │ ...          │       │ status           │
//! └──────────────┘       └──────────────────┘
//!                                 │
//!                                 │ related_booking_id
//!                                 ▼
//! ┌──────────────────┐   ┌─────────────────────┐
//! │ points_accounts  │──<│ points_transactions │
//! │                  │   │                     │
//! │ resident_id (PK) │   │ resident_id (FK)    │
//! │ balance          │   │ amount (signed)     │
//! └──────────────────┘   └─────────────────────┘
//! ```
//!
//! ## Note on Types
//!
//! Point amounts use `i64` because PostgreSQL has no unsigned integers.
//! Ledger amounts are signed on purpose: credits positive, debits negative.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable amenity and its booking policy.
///
/// Facility rows are managed by administrators and treated as immutable
/// for the lifetime of any booking against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Facility identifier.
    pub id: Uuid,

    /// Display name (e.g., "Party Room").
    pub name: String,

    /// Base price in points for one slot, before the time-of-day modifier.
    pub base_price: i64,

    /// Minimum idle hours required between a resident's bookings
    /// of this facility. Zero disables the cooldown.
    pub cool_down_hours: i32,

    /// Maximum simultaneous future bookings one resident may hold here.
    pub max_concurrent_bookings: i32,

    /// Whether high-demand slots of this facility are resolved by lottery.
    pub is_lottery_enabled: bool,

    /// Head count the facility supports (informational).
    pub capacity: i32,

    /// First bookable hour of the day (inclusive).
    pub open_hour: i32,

    /// Last bookable hour of the day (exclusive).
    pub close_hour: i32,

    /// Inactive facilities are hidden from the catalog.
    pub is_active: bool,

    /// When the facility was created.
    pub created_at: DateTime<Utc>,

    /// Last admin update.
    pub updated_at: DateTime<Utc>,
}

/// A resident's points account.
///
/// `balance` is a cached aggregate: it must always equal the sum of that
/// resident's `points_transactions` rows. It is only ever updated as a
/// side effect of appending a transaction, inside the same database
/// transaction (see `services::points_ledger`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAccountRecord {
    /// Resident identifier (opaque; identity lives in a collaborator system).
    pub resident_id: Uuid,

    /// Current point balance. Invariant: never negative.
    pub balance: i64,

    /// No-show strikes since the last suspension.
    pub penalty_count: i32,

    /// If set and in the future, the account may not book.
    pub suspended_until: Option<DateTime<Utc>>,

    /// When the account row was first created.
    pub created_at: DateTime<Utc>,

    /// Last balance/penalty update.
    pub updated_at: DateTime<Utc>,
}

/// Ledger transaction types.
///
/// Each variant names why points moved. The set is closed: every debit
/// and credit in the system goes through exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Monthly stipend credited to every active account.
    MonthlyAllocation,
    /// Debit taken when a direct booking is confirmed.
    BookingDeduct,
    /// Credit returned on voluntary cancellation (full or half).
    BookingRefund,
    /// Explicit cancellation fee (currently unused: the late-cancel fee
    /// is the retained half of the original debit, so no row is written).
    CancelFee,
    /// Debit applied when a confirmed booking is never checked in.
    NoShowPenalty,
    /// Manual administrator adjustment, either direction.
    AdminAdjust,
    /// Debit taken from a lottery winner at resolution time.
    LotteryCharge,
    /// Credit returned if a lottery charge must be reversed.
    LotteryRefund,
}

impl TransactionType {
    /// Database representation of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::MonthlyAllocation => "monthly_allocation",
            TransactionType::BookingDeduct => "booking_deduct",
            TransactionType::BookingRefund => "booking_refund",
            TransactionType::CancelFee => "cancel_fee",
            TransactionType::NoShowPenalty => "no_show_penalty",
            TransactionType::AdminAdjust => "admin_adjust",
            TransactionType::LotteryCharge => "lottery_charge",
            TransactionType::LotteryRefund => "lottery_refund",
        }
    }

    /// Parse the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly_allocation" => Some(TransactionType::MonthlyAllocation),
            "booking_deduct" => Some(TransactionType::BookingDeduct),
            "booking_refund" => Some(TransactionType::BookingRefund),
            "cancel_fee" => Some(TransactionType::CancelFee),
            "no_show_penalty" => Some(TransactionType::NoShowPenalty),
            "admin_adjust" => Some(TransactionType::AdminAdjust),
            "lottery_charge" => Some(TransactionType::LotteryCharge),
            "lottery_refund" => Some(TransactionType::LotteryRefund),
            _ => None,
        }
    }
}

/// One immutable row of the points ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransactionRecord {
    /// Transaction identifier.
    pub id: Uuid,

    /// Resident whose balance moved.
    pub resident_id: Uuid,

    /// Signed amount: positive credits, negative debits.
    pub amount: i64,

    /// Why the points moved.
    pub transaction_type: TransactionType,

    /// Booking this movement relates to, if any.
    pub related_booking_id: Option<Uuid>,

    /// Free-form note (admin adjustments carry a reason here).
    pub note: Option<String>,

    /// When the row was appended.
    pub created_at: DateTime<Utc>,
}

/// Booking lifecycle states.
///
/// Bookings are never physically deleted; they only move between these
/// states. `Confirmed`, `Completed` and `NoShow` occupy the slot
/// (enforced by the partial unique index); `PendingLottery` placeholders
/// share it until resolution; `Cancelled` frees it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Reservation is live; the slot is taken.
    Confirmed,
    /// Voluntarily cancelled (or lost a lottery); slot is free.
    Cancelled,
    /// The resident checked in and the slot has elapsed.
    Completed,
    /// The check-in window closed without a check-in.
    NoShow,
    /// Lottery bid placeholder, awaiting resolution at the lock deadline.
    PendingLottery,
}

impl BookingStatus {
    /// Database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no_show",
            BookingStatus::PendingLottery => "pending_lottery",
        }
    }

    /// Parse the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            "no_show" => Some(BookingStatus::NoShow),
            "pending_lottery" => Some(BookingStatus::PendingLottery),
            _ => None,
        }
    }

    /// Whether this status holds the slot exclusively.
    pub fn occupies_slot(&self) -> bool {
        match self {
            BookingStatus::Confirmed
            | BookingStatus::Completed
            | BookingStatus::NoShow => true,
            BookingStatus::Cancelled | BookingStatus::PendingLottery => false,
        }
    }
}

/// A reservation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Booking identifier.
    pub id: Uuid,

    /// Facility being reserved.
    pub facility_id: Uuid,

    /// Resident holding the reservation.
    pub resident_id: Uuid,

    /// Calendar date of the slot.
    pub booking_date: NaiveDate,

    /// Slot start (inclusive).
    pub start_time: NaiveTime,

    /// Slot end (exclusive).
    pub end_time: NaiveTime,

    /// Points debited for this booking. Zero while pending lottery.
    pub points_spent: i64,

    /// Current lifecycle state.
    pub status: BookingStatus,

    /// When the resident checked in, if they did.
    pub check_in_time: Option<DateTime<Utc>>,

    /// Free-form note supplied at booking time.
    pub note: Option<String>,

    /// When the booking was created.
    pub created_at: DateTime<Utc>,

    /// Last status transition.
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    /// The slot start as an absolute instant (all slot math is UTC).
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.booking_date.and_time(self.start_time).and_utc()
    }

    /// The slot end as an absolute instant.
    ///
    /// A slot ending at midnight stores `end_time` 00:00, so an end at
    /// or before the start rolls over to the next day.
    pub fn ends_at(&self) -> DateTime<Utc> {
        let date = if self.end_time <= self.start_time {
            self.booking_date.succ_opt().unwrap_or(self.booking_date)
        } else {
            self.booking_date
        };
        date.and_time(self.end_time).and_utc()
    }
}

/// A sealed bid on a contested slot.
///
/// Bids are non-custodial: no points move when a bid is placed. The bid
/// amount only acts as a priority signal at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryBidRecord {
    /// Bid identifier.
    pub id: Uuid,

    /// Slot key: facility.
    pub facility_id: Uuid,

    /// Slot key: date.
    pub booking_date: NaiveDate,

    /// Slot key: start time.
    pub start_time: NaiveTime,

    /// Bidding resident. At most one bid per resident per slot.
    pub resident_id: Uuid,

    /// Sealed bid amount; must be at least the slot's final price.
    pub bid_amount: i64,

    /// When the bid was placed. Earlier bids win ties.
    pub placed_at: DateTime<Utc>,
}

/// Outcome of a resolved lottery slot.
///
/// The existence of this row is what makes the resolution sweep
/// idempotent: a second worker hitting the same slot gets a primary-key
/// conflict and backs off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryResolutionRecord {
    /// Slot key: facility.
    pub facility_id: Uuid,

    /// Slot key: date.
    pub booking_date: NaiveDate,

    /// Slot key: start time.
    pub start_time: NaiveTime,

    /// Winning resident, if any bid was placed and chargeable.
    pub winner_resident_id: Option<Uuid>,

    /// The winner's sealed bid amount (kept for auditability).
    pub winning_bid: Option<i64>,

    /// What the winner was actually charged (the floor price, not the bid).
    pub charged: Option<i64>,

    /// How many bids contested the slot.
    pub bid_count: i32,

    /// When the sweep resolved the slot.
    pub resolved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn booking_for_slot(start: &str, end: &str) -> BookingRecord {
        let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        BookingRecord {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            resident_id: Uuid::new_v4(),
            booking_date: date,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            points_spent: 10,
            status: BookingStatus::Confirmed,
            check_in_time: None,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_slot_interval_ordering() {
        let booking = booking_for_slot("18:00", "19:00");
        assert!(booking.ends_at() > booking.starts_at());
        assert_eq!(
            (booking.ends_at() - booking.starts_at()).num_hours(),
            1
        );
    }

    #[test]
    fn test_midnight_slot_end_rolls_to_next_day() {
        // The last slot of a close_hour=24 facility ends at 00:00,
        // which belongs to the following day.
        let booking = booking_for_slot("23:00", "00:00");
        assert!(booking.ends_at() > booking.starts_at());
        assert_eq!(
            (booking.ends_at() - booking.starts_at()).num_hours(),
            1
        );
        assert_eq!(
            booking.ends_at().date_naive(),
            NaiveDate::from_ymd_opt(2026, 9, 8).unwrap()
        );
    }
}
