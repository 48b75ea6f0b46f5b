//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Validates input
//! 3. Calls the appropriate service
//! 4. Returns a formatted response
//!
//! ## Error Handling
//!
//! All errors are caught and returned as JSON:
//!
//! ```json
//! {
//!     "success": false,
//!     "error": {
//!         "code": "SLOT_UNAVAILABLE",
//!         "message": "Slot is not available"
//!     }
//! }
//! ```
//!
//! The HTTP status reflects the error class: 400 for bad input, 403
//! for authorization, 404 for missing resources, 409 for state
//! conflicts, 500 for infrastructure faults.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{
    AdjustPointsRequest, ApiResponse, BalanceResponse, BookingRequest, BookingResponse,
    CancelRequest, CancellationResponse, CheckInRequest, FacilityResponse, HealthResponse,
    HistoryQuery, HistoryResponse, LotteryBidRequest, SlotListResponse, SlotQuery,
    TransactionResponse,
};
use crate::db::queries;
use crate::services::BookingError;
use crate::AppState;

/// Map a [`BookingError`] to an HTTP response with the standard error
/// envelope.
fn booking_error_response(e: &BookingError) -> HttpResponse {
    let body = ApiResponse::<()>::error(e.code(), &e.to_string());
    match e {
        BookingError::InvalidDateRange
        | BookingError::InsufficientBalance
        | BookingError::BidTooLow { .. } => HttpResponse::BadRequest().json(body),

        BookingError::AccountSuspended(_) | BookingError::NotOwner => {
            HttpResponse::Forbidden().json(body)
        }

        BookingError::FacilityNotFound(_) | BookingError::BookingNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }

        BookingError::SlotUnavailable
        | BookingError::SlotIsLottery
        | BookingError::DuplicateBid
        | BookingError::ConcurrencyLimitExceeded { .. }
        | BookingError::CooldownActive { .. }
        | BookingError::AlreadyCheckedIn
        | BookingError::OutsideCheckInWindow
        | BookingError::BookingNotCancellable => HttpResponse::Conflict().json(body),

        BookingError::Database(_) => {
            error!("Request failed on database error: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

/// API information endpoint (root).
///
/// Returns information about available API endpoints.
///
/// ## Endpoint
///
/// `GET /`
pub async fn api_info(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let info = json!({
        "name": "Facility Booking API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Backend API for facility bookings and the resident points economy",
        "policy": {
            "bookingHorizonDays": state.config.booking_horizon_days,
            "lotteryLockHours": state.config.lottery_lock_hours,
            "checkInWindowMinutes": state.config.check_in_window_minutes,
            "fullRefundHours": state.config.full_refund_hours,
        },
        "endpoints": {
            "health": {
                "method": "GET",
                "path": "/health",
                "description": "Health check endpoint"
            },
            "facilities": {
                "list": {
                    "method": "GET",
                    "path": "/facilities",
                    "description": "Facility catalog"
                },
                "slots": {
                    "method": "GET",
                    "path": "/facilities/{id}/slots?date=YYYY-MM-DD",
                    "description": "Slot grid for one facility and date"
                }
            },
            "bookings": {
                "create": {
                    "method": "POST",
                    "path": "/bookings",
                    "description": "Book a slot directly"
                },
                "lottery": {
                    "method": "POST",
                    "path": "/bookings/lottery",
                    "description": "Place a sealed bid on a lottery slot"
                },
                "cancel": {
                    "method": "POST",
                    "path": "/bookings/{id}/cancel",
                    "description": "Cancel a booking or withdraw a pending bid"
                },
                "checkIn": {
                    "method": "POST",
                    "path": "/bookings/{id}/check-in",
                    "description": "Check in during the check-in window"
                },
                "byResident": {
                    "method": "GET",
                    "path": "/bookings/resident/{resident}",
                    "description": "List a resident's bookings"
                }
            },
            "points": {
                "balance": {
                    "method": "GET",
                    "path": "/points/balance/{resident}",
                    "description": "Current point balance"
                },
                "history": {
                    "method": "GET",
                    "path": "/points/history/{resident}",
                    "description": "Ledger history"
                },
                "adjust": {
                    "method": "POST",
                    "path": "/points/adjust",
                    "description": "Manual balance adjustment"
                }
            }
        }
    });

    HttpResponse::Ok()
        .content_type("application/json")
        .json(ApiResponse::success(info))
}

/// Health check endpoint.
///
/// Check if the backend is running and healthy.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Example
///
/// ```bash
/// curl http://127.0.0.1:8080/health
/// ```
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "status": "healthy",
///         "database": true,
///         "version": "0.1.0",
///         "timestamp": "2026-09-12T12:00:00Z"
///     }
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    // Check database
    let db_healthy = state.db.pool().get().await.is_ok();

    let response = HealthResponse {
        status: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: db_healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let status_code = if db_healthy {
        actix_web::http::StatusCode::OK
    } else {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status_code).json(ApiResponse::success(response))
}

/// Facility catalog.
///
/// ## Endpoint
///
/// `GET /facilities`
pub async fn list_facilities(state: web::Data<Arc<AppState>>) -> HttpResponse {
    match queries::list_facilities(state.db.pool()).await {
        Ok(facilities) => {
            let out: Vec<FacilityResponse> =
                facilities.into_iter().map(FacilityResponse::from).collect();
            HttpResponse::Ok().json(ApiResponse::success(out))
        }
        Err(e) => {
            error!("Facility listing failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("DATABASE_ERROR", &e.to_string()))
        }
    }
}

/// Slot grid for one facility and date.
///
/// Slots are derived on the fly from the facility's operating hours,
/// the pricing policy and the day's existing bookings; nothing is
/// persisted by this read.
///
/// ## Endpoint
///
/// `GET /facilities/{id}/slots?date=YYYY-MM-DD`
///
/// ## Example
///
/// ```bash
/// curl "http://127.0.0.1:8080/facilities/a1b2.../slots?date=2026-09-12"
/// ```
pub async fn get_slots(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
    query: web::Query<SlotQuery>,
) -> HttpResponse {
    let facility_id = path.into_inner();
    let date = query.date;

    let facility = match queries::get_facility(state.db.pool(), facility_id).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return booking_error_response(&BookingError::FacilityNotFound(facility_id));
        }
        Err(e) => return booking_error_response(&e.into()),
    };

    let client = match state.db.pool().get().await {
        Ok(c) => c,
        Err(e) => return booking_error_response(&BookingError::Database(e.to_string())),
    };
    let bookings = match queries::bookings_on_date(&**client, facility_id, date).await {
        Ok(b) => b,
        Err(e) => return booking_error_response(&e.into()),
    };

    let today = Utc::now().date_naive();
    match state.slots.generate(&facility, date, today, &bookings) {
        Ok(slots) => HttpResponse::Ok().json(ApiResponse::success(SlotListResponse {
            facility_id,
            date,
            slots,
        })),
        Err(e) => booking_error_response(&e),
    }
}

/// Book a slot directly.
///
/// Debits the slot price and confirms the reservation in one step.
/// Lottery slots reject direct booking; place a bid instead.
///
/// ## Endpoint
///
/// `POST /bookings`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/bookings \
///   -H "Content-Type: application/json" \
///   -d '{
///     "residentId": "550e8400-...",
///     "facilityId": "a1b2c3d4-...",
///     "date": "2026-09-12",
///     "startTime": "18:00:00"
///   }'
/// ```
pub async fn create_booking(
    state: web::Data<Arc<AppState>>,
    body: web::Json<BookingRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    info!(
        "Booking request: resident {} facility {} at {} {}",
        req.resident_id, req.facility_id, req.date, req.start_time
    );

    match state
        .scheduler
        .attempt_booking(
            req.resident_id,
            req.facility_id,
            req.date,
            req.start_time,
            req.note,
        )
        .await
    {
        Ok(booking) => {
            HttpResponse::Created().json(ApiResponse::success(BookingResponse::from(booking)))
        }
        Err(e) => booking_error_response(&e),
    }
}

/// Place a sealed bid on a lottery slot.
///
/// Nothing is charged at bid time. When the slot's lock deadline
/// passes, the resolution sweep picks the winner (highest bid, ties to
/// the earliest) and charges the slot price, not the bid.
///
/// ## Endpoint
///
/// `POST /bookings/lottery`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/bookings/lottery \
///   -H "Content-Type: application/json" \
///   -d '{
///     "residentId": "550e8400-...",
///     "facilityId": "a1b2c3d4-...",
///     "date": "2026-09-12",
///     "startTime": "19:00:00",
///     "bidAmount": 75
///   }'
/// ```
pub async fn join_lottery(
    state: web::Data<Arc<AppState>>,
    body: web::Json<LotteryBidRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    info!(
        "Lottery bid: resident {} facility {} at {} {} for {}",
        req.resident_id, req.facility_id, req.date, req.start_time, req.bid_amount
    );

    match state
        .scheduler
        .join_lottery(
            req.resident_id,
            req.facility_id,
            req.date,
            req.start_time,
            req.bid_amount,
        )
        .await
    {
        Ok(placeholder) => {
            HttpResponse::Created().json(ApiResponse::success(BookingResponse::from(placeholder)))
        }
        Err(e) => booking_error_response(&e),
    }
}

/// Cancel a booking, or withdraw a pending lottery bid.
///
/// Refunds follow the cancellation policy: 100% at 24h or more before
/// the slot, 50% inside 24h. Withdrawn bids refund nothing because
/// nothing was charged.
///
/// ## Endpoint
///
/// `POST /bookings/{id}/cancel`
pub async fn cancel_booking(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
    body: web::Json<CancelRequest>,
) -> HttpResponse {
    let booking_id = path.into_inner();
    let req = body.into_inner();

    match state.cancellation.cancel(booking_id, req.resident_id).await {
        Ok(outcome) => HttpResponse::Ok().json(ApiResponse::success(CancellationResponse {
            booking: BookingResponse::from(outcome.booking),
            refund: outcome.refund,
        })),
        Err(e) => booking_error_response(&e),
    }
}

/// Check in to a confirmed booking.
///
/// Allowed from 15 minutes before the slot start to 15 minutes after.
///
/// ## Endpoint
///
/// `POST /bookings/{id}/check-in`
pub async fn check_in(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
    body: web::Json<CheckInRequest>,
) -> HttpResponse {
    let booking_id = path.into_inner();
    let req = body.into_inner();

    match state.attendance.check_in(booking_id, req.resident_id).await {
        Ok(booking) => {
            HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking)))
        }
        Err(e) => booking_error_response(&e),
    }
}

/// List a resident's bookings, newest slot first.
///
/// ## Endpoint
///
/// `GET /bookings/resident/{resident}?limit=20&offset=0`
pub async fn resident_bookings(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> HttpResponse {
    let resident_id = path.into_inner();
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    match queries::list_resident_bookings(state.db.pool(), resident_id, limit, offset).await {
        Ok(bookings) => {
            let out: Vec<BookingResponse> =
                bookings.into_iter().map(BookingResponse::from).collect();
            HttpResponse::Ok().json(ApiResponse::success(out))
        }
        Err(e) => {
            error!("Booking listing failed for {}: {}", resident_id, e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("DATABASE_ERROR", &e.to_string()))
        }
    }
}

/// Current point balance.
///
/// Accounts are created lazily: querying an unknown resident returns a
/// fresh zero-balance account rather than 404.
///
/// ## Endpoint
///
/// `GET /points/balance/{resident}`
pub async fn get_balance(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let resident_id = path.into_inner();

    match state.ledger.account(resident_id).await {
        Ok(account) => {
            HttpResponse::Ok().json(ApiResponse::success(BalanceResponse::from(account)))
        }
        Err(e) => booking_error_response(&e),
    }
}

/// Ledger history, newest first.
///
/// ## Endpoint
///
/// `GET /points/history/{resident}?limit=20&offset=0`
pub async fn get_history(
    state: web::Data<Arc<AppState>>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> HttpResponse {
    let resident_id = path.into_inner();
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    match state.ledger.history(resident_id, limit, offset).await {
        Ok(transactions) => {
            let out = HistoryResponse {
                resident_id,
                transactions: transactions
                    .into_iter()
                    .map(TransactionResponse::from)
                    .collect(),
                offset,
                limit,
            };
            HttpResponse::Ok().json(ApiResponse::success(out))
        }
        Err(e) => booking_error_response(&e),
    }
}

/// Manually adjust a resident's balance.
///
/// Debits are refused rather than letting the balance go negative.
///
/// ## Endpoint
///
/// `POST /points/adjust`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/points/adjust \
///   -H "Content-Type: application/json" \
///   -d '{
///     "residentId": "550e8400-...",
///     "amount": -25,
///     "note": "damage fee, ticket #4821"
///   }'
/// ```
pub async fn adjust_points(
    state: web::Data<Arc<AppState>>,
    body: web::Json<AdjustPointsRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    if req.amount == 0 {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "INVALID_AMOUNT",
            "Adjustment amount must be non-zero",
        ));
    }

    info!(
        "Points adjustment: resident {} by {}",
        req.resident_id, req.amount
    );

    match state
        .ledger
        .adjust(req.resident_id, req.amount, req.note)
        .await
    {
        Ok(new_balance) => HttpResponse::Ok().json(ApiResponse::success(json!({
            "residentId": req.resident_id,
            "balance": new_balance,
        }))),
        Err(e) => booking_error_response(&e),
    }
}
