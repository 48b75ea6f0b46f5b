//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//! All responses are wrapped in a standard format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{BookingRecord, FacilityRecord, PointsAccountRecord, PointsTransactionRecord};
use crate::services::slot_generator::TimeSlot;

/// Standard API response wrapper.
///
/// All API responses follow this format:
///
/// ## Success Response
///
/// ```json
/// {
///     "success": true,
///     "data": { ... },
///     "error": null
/// }
/// ```
///
/// ## Error Response
///
/// ```json
/// {
///     "success": false,
///     "data": null,
///     "error": {
///         "code": "SLOT_UNAVAILABLE",
///         "message": "Slot is not available"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (null on error).
    pub data: Option<T>,

    /// Error information (null on success).
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// API error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code (e.g., "INSUFFICIENT_BALANCE").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// Facility catalog entry.
///
/// Returned by `GET /facilities`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResponse {
    /// Facility identifier.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Base slot price in points.
    pub base_price: i64,

    /// Required idle hours between one resident's bookings here.
    pub cool_down_hours: i32,

    /// Max simultaneous future bookings per resident.
    pub max_concurrent_bookings: i32,

    /// Whether high-demand slots are resolved by lottery.
    pub is_lottery_enabled: bool,

    /// Supported head count.
    pub capacity: i32,

    /// First bookable hour (inclusive).
    pub open_hour: i32,

    /// Last bookable hour (exclusive).
    pub close_hour: i32,
}

impl From<FacilityRecord> for FacilityResponse {
    fn from(f: FacilityRecord) -> Self {
        Self {
            id: f.id,
            name: f.name,
            base_price: f.base_price,
            cool_down_hours: f.cool_down_hours,
            max_concurrent_bookings: f.max_concurrent_bookings,
            is_lottery_enabled: f.is_lottery_enabled,
            capacity: f.capacity,
            open_hour: f.open_hour,
            close_hour: f.close_hour,
        }
    }
}

/// Slot grid for one facility and date.
///
/// Returned by `GET /facilities/{id}/slots?date=...`
///
/// ## Example Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "facilityId": "a1b2c3d4-...",
///         "date": "2026-09-12",
///         "slots": [
///             {
///                 "startTime": "18:00:00",
///                 "endTime": "19:00:00",
///                 "priceModifier": 1.5,
///                 "finalPrice": 75,
///                 "bookingType": "lottery",
///                 "status": "open"
///             }
///         ]
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotListResponse {
    /// Facility the grid belongs to.
    pub facility_id: Uuid,

    /// Requested date.
    pub date: NaiveDate,

    /// Derived slots, in start-time order.
    pub slots: Vec<TimeSlot>,
}

/// A single booking.
///
/// Returned by booking creation, cancellation, check-in and listing
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    /// Booking identifier.
    pub id: Uuid,

    /// Facility reserved.
    pub facility_id: Uuid,

    /// Resident holding the reservation.
    pub resident_id: Uuid,

    /// Slot date.
    pub booking_date: NaiveDate,

    /// Slot start time.
    pub start_time: chrono::NaiveTime,

    /// Slot end time.
    pub end_time: chrono::NaiveTime,

    /// Points debited (zero while pending lottery).
    pub points_spent: i64,

    /// Lifecycle state: confirmed, cancelled, completed, no_show,
    /// pending_lottery.
    pub status: String,

    /// When the resident checked in, if they did.
    pub check_in_time: Option<DateTime<Utc>>,

    /// Free-form note.
    pub note: Option<String>,

    /// When the booking was created.
    pub created_at: DateTime<Utc>,
}

impl From<BookingRecord> for BookingResponse {
    fn from(b: BookingRecord) -> Self {
        Self {
            id: b.id,
            facility_id: b.facility_id,
            resident_id: b.resident_id,
            booking_date: b.booking_date,
            start_time: b.start_time,
            end_time: b.end_time,
            points_spent: b.points_spent,
            status: b.status.as_str().to_string(),
            check_in_time: b.check_in_time,
            note: b.note,
            created_at: b.created_at,
        }
    }
}

/// Cancellation outcome.
///
/// Returned by `POST /bookings/{id}/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    /// The cancelled booking.
    pub booking: BookingResponse,

    /// Points credited back.
    pub refund: i64,
}

/// Point balance response.
///
/// Returned by `GET /points/balance/{resident}`
///
/// ## Example Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "residentId": "550e8400-...",
///         "balance": 120,
///         "penaltyCount": 1,
///         "suspendedUntil": null,
///         "formattedBalance": "120 pts"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Account owner.
    pub resident_id: Uuid,

    /// Current point balance.
    pub balance: i64,

    /// No-show strikes since the last suspension.
    pub penalty_count: i32,

    /// Active suspension end, if any.
    pub suspended_until: Option<DateTime<Utc>>,

    /// Human-readable balance (e.g., "120 pts").
    pub formatted_balance: String,
}

impl From<PointsAccountRecord> for BalanceResponse {
    fn from(a: PointsAccountRecord) -> Self {
        Self {
            resident_id: a.resident_id,
            balance: a.balance,
            penalty_count: a.penalty_count,
            suspended_until: a.suspended_until,
            formatted_balance: crate::utils::format_points(a.balance),
        }
    }
}

/// One ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,

    /// Signed amount: positive credits, negative debits.
    pub amount: i64,

    /// Human-readable amount (e.g., "-50 pts").
    pub formatted_amount: String,

    /// Why the points moved.
    pub transaction_type: String,

    /// Related booking, if any.
    pub related_booking_id: Option<Uuid>,

    /// Free-form note.
    pub note: Option<String>,

    /// When the row was appended.
    pub created_at: DateTime<Utc>,
}

impl From<PointsTransactionRecord> for TransactionResponse {
    fn from(t: PointsTransactionRecord) -> Self {
        Self {
            id: t.id,
            amount: t.amount,
            formatted_amount: crate::utils::format_points_signed(t.amount),
            transaction_type: t.transaction_type.as_str().to_string(),
            related_booking_id: t.related_booking_id,
            note: t.note,
            created_at: t.created_at,
        }
    }
}

/// Ledger history with pagination.
///
/// Returned by `GET /points/history/{resident}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// Account owner.
    pub resident_id: Uuid,

    /// Transactions, newest first.
    pub transactions: Vec<TransactionResponse>,

    /// Current offset.
    pub offset: i64,

    /// Requested page size.
    pub limit: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status: "healthy" or "unhealthy".
    pub status: String,

    /// Database connection status.
    pub database: bool,

    /// Service version.
    pub version: String,

    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}
