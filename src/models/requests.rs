//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to book a slot directly.
///
/// ## Example JSON
///
/// ```json
/// {
///     "residentId": "550e8400-e29b-41d4-a716-446655440000",
///     "facilityId": "a1b2c3d4-0000-0000-0000-000000000001",
///     "date": "2026-09-12",
///     "startTime": "18:00:00",
///     "note": "birthday party"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Resident placing the booking.
    pub resident_id: Uuid,

    /// Facility to reserve.
    pub facility_id: Uuid,

    /// Slot date (ISO 8601, `YYYY-MM-DD`).
    pub date: NaiveDate,

    /// Slot start time (`HH:MM:SS`, must be on the hour grid).
    pub start_time: NaiveTime,

    /// Optional free-form note stored on the booking.
    pub note: Option<String>,
}

/// Request to place a sealed bid on a lottery slot.
///
/// ## Example JSON
///
/// ```json
/// {
///     "residentId": "550e8400-e29b-41d4-a716-446655440000",
///     "facilityId": "a1b2c3d4-0000-0000-0000-000000000002",
///     "date": "2026-09-12",
///     "startTime": "19:00:00",
///     "bidAmount": 75
/// }
/// ```
///
/// ## Notes
///
/// - The bid must be at least the slot's final price.
/// - The bid is priority only: the winner pays the slot price, not
///   the bid.
/// - Nothing is charged until the lottery resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryBidRequest {
    /// Resident placing the bid.
    pub resident_id: Uuid,

    /// Facility the contested slot belongs to.
    pub facility_id: Uuid,

    /// Slot date.
    pub date: NaiveDate,

    /// Slot start time.
    pub start_time: NaiveTime,

    /// Sealed bid in points.
    pub bid_amount: i64,
}

/// Request body for cancellation.
///
/// The booking is addressed in the path; the body identifies the
/// caller so ownership can be checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    /// Resident requesting the cancellation.
    pub resident_id: Uuid,
}

/// Request body for check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Resident checking in.
    pub resident_id: Uuid,
}

/// Request to manually adjust a resident's point balance.
///
/// ## Example JSON
///
/// ```json
/// {
///     "residentId": "550e8400-e29b-41d4-a716-446655440000",
///     "amount": -25,
///     "note": "damage fee, ticket #4821"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPointsRequest {
    /// Account to adjust.
    pub resident_id: Uuid,

    /// Signed amount: positive credits, negative debits.
    pub amount: i64,

    /// Reason for the adjustment (recorded in the ledger).
    pub note: Option<String>,
}

/// Query parameters for the slot listing endpoint.
///
/// ## Example URL
///
/// ```text
/// GET /facilities/{id}/slots?date=2026-09-12
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    /// The date to list slots for.
    pub date: NaiveDate,
}

/// Query parameters for ledger history.
///
/// ## Example URL
///
/// ```text
/// GET /points/history/{resident}?limit=20&offset=0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Maximum number of transactions to return.
    /// Default: 20, Max: 100
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Number of transactions to skip (for pagination).
    /// Default: 0
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
