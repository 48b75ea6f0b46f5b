//! # Services Module
//!
//! This module contains the core business logic services for the
//! facility booking backend. Each service handles a specific domain.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `PointsLedger` | Point balances, append-only transaction log |
//! | `SlotGenerator` | Slot grid derivation, dynamic pricing |
//! | `BookingScheduler` | Direct bookings, lottery bids, limits/cooldowns |
//! | `LotteryAllocator` | Sealed-bid resolution at lock deadlines |
//! | `CancellationEngine` | Voluntary cancellation and refunds |
//! | `AttendanceTracker` | Check-in validation, no-show penalties |
//! | `Sweeper` | Background lottery / no-show / allocation passes |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                   BookingScheduler                        │   │
//! │  │  • attempt_booking()      • join_lottery()                │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                              │                                   │
//! │         ┌────────────────────┼────────────────────┐             │
//! │         ▼                    ▼                    ▼             │
//! │  ┌────────────┐      ┌────────────┐       ┌────────────┐       │
//! │  │   Slot     │      │   Points   │       │  Sweeper   │       │
//! │  │ Generator  │      │   Ledger   │       │            │       │
//! │  │            │      │            │       │ Lottery    │       │
//! │  │ Pricing    │      │ Debits     │       │ No-shows   │       │
//! │  │ Lottery?   │      │ Credits    │       │ Allocation │       │
//! │  └────────────┘      └────────────┘       └────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All business failures across these services share the [`BookingError`]
//! enum so the API layer can translate any of them to the standard
//! `{code, message}` error envelope.

pub mod attendance;
pub mod booking_scheduler;
pub mod cancellation;
pub mod lottery_allocator;
pub mod points_ledger;
pub mod slot_generator;
pub mod sweeper;

pub use attendance::AttendanceTracker;
pub use booking_scheduler::BookingScheduler;
pub use cancellation::CancellationEngine;
pub use lottery_allocator::LotteryAllocator;
pub use points_ledger::PointsLedger;
pub use slot_generator::{PricingPolicy, SlotGenerator};
pub use sweeper::Sweeper;

use thiserror::Error;

use crate::db::DatabaseError;

/// Errors that can occur in booking operations.
///
/// Every variant is recovered at the operation boundary and surfaced to
/// the caller as a `{code, message}` pair; none propagate as faults.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Requested date is outside the bookable horizon.
    #[error("Requested date is outside the bookable window")]
    InvalidDateRange,

    /// The resident's account is suspended.
    #[error("Account is suspended until {0}")]
    AccountSuspended(chrono::DateTime<chrono::Utc>),

    /// The resident already holds the maximum number of future bookings.
    #[error("Too many active bookings: limit is {limit}")]
    ConcurrencyLimitExceeded { limit: i32 },

    /// A recent booking at the same facility is still within its cooldown.
    #[error("Facility cooldown of {hours}h has not elapsed")]
    CooldownActive { hours: i32 },

    /// The slot is taken, locked or was lost to a concurrent request.
    #[error("Slot is not available")]
    SlotUnavailable,

    /// The slot is resolved by lottery; direct booking is not allowed.
    #[error("Slot is allocated by lottery; place a bid instead")]
    SlotIsLottery,

    /// The debit would overdraw the account.
    #[error("Insufficient point balance")]
    InsufficientBalance,

    /// Bid is below the slot's final price.
    #[error("Bid must be at least the slot price of {minimum}")]
    BidTooLow { minimum: i64 },

    /// The resident already bid on this slot.
    #[error("A bid was already placed on this slot")]
    DuplicateBid,

    /// The caller does not own the booking.
    #[error("Booking belongs to another resident")]
    NotOwner,

    /// The booking was already checked in.
    #[error("Booking is already checked in")]
    AlreadyCheckedIn,

    /// Check-in attempted outside the allowed window.
    #[error("Outside the check-in window")]
    OutsideCheckInWindow,

    /// The booking is not in a cancellable state.
    #[error("Booking cannot be cancelled")]
    BookingNotCancellable,

    /// No such facility.
    #[error("Facility not found: {0}")]
    FacilityNotFound(uuid::Uuid),

    /// No such booking.
    #[error("Booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl BookingError {
    /// Stable machine-readable code for the API error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidDateRange => "INVALID_DATE_RANGE",
            BookingError::AccountSuspended(_) => "ACCOUNT_SUSPENDED",
            BookingError::ConcurrencyLimitExceeded { .. } => "CONCURRENCY_LIMIT_EXCEEDED",
            BookingError::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            BookingError::SlotUnavailable => "SLOT_UNAVAILABLE",
            BookingError::SlotIsLottery => "SLOT_IS_LOTTERY",
            BookingError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            BookingError::BidTooLow { .. } => "BID_TOO_LOW",
            BookingError::DuplicateBid => "DUPLICATE_BID",
            BookingError::NotOwner => "NOT_OWNER",
            BookingError::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            BookingError::OutsideCheckInWindow => "OUTSIDE_CHECK_IN_WINDOW",
            BookingError::BookingNotCancellable => "BOOKING_NOT_CANCELLABLE",
            BookingError::FacilityNotFound(_) => "FACILITY_NOT_FOUND",
            BookingError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            BookingError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DatabaseError> for BookingError {
    fn from(e: DatabaseError) -> Self {
        BookingError::Database(e.to_string())
    }
}

impl From<tokio_postgres::Error> for BookingError {
    fn from(e: tokio_postgres::Error) -> Self {
        BookingError::Database(e.to_string())
    }
}
