//! # Database Queries
//!
//! This module contains all the SQL for the booking core. Each function
//! performs one database operation.
//!
//! ## Query Organization
//!
//! Queries are grouped by the table they operate on:
//! - `facility_*` / catalog reads
//! - `account_*` / `ledger_*` - Points account and transaction ledger
//! - `booking_*` - Booking table operations
//! - `bid_*` / `resolution_*` - Lottery tables
//!
//! ## Pool vs. GenericClient
//!
//! Read-only catalog and history queries take the connection `Pool`
//! directly. Everything that must participate in an atomic unit (ledger
//! writes, booking inserts, lottery resolution) is generic over
//! [`tokio_postgres::GenericClient`] so the same function runs against a
//! plain pooled client or inside an explicit transaction. The booking
//! scheduler relies on this: debit and booking insert commit or roll back
//! together.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::{GenericClient, Row};
use tracing::debug;
use uuid::Uuid;

use super::models::*;
use super::DatabaseError;

// ============================================
// ROW MAPPERS
// ============================================

/// Helper to convert a database row to FacilityRecord
fn row_to_facility(row: &Row) -> FacilityRecord {
    FacilityRecord {
        id: row.get("id"),
        name: row.get("name"),
        base_price: row.get("base_price"),
        cool_down_hours: row.get("cool_down_hours"),
        max_concurrent_bookings: row.get("max_concurrent_bookings"),
        is_lottery_enabled: row.get("is_lottery_enabled"),
        capacity: row.get("capacity"),
        open_hour: row.get("open_hour"),
        close_hour: row.get("close_hour"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Helper to convert a database row to PointsAccountRecord
fn row_to_account(row: &Row) -> PointsAccountRecord {
    PointsAccountRecord {
        resident_id: row.get("resident_id"),
        balance: row.get("balance"),
        penalty_count: row.get("penalty_count"),
        suspended_until: row.get("suspended_until"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Helper to convert a database row to PointsTransactionRecord
fn row_to_transaction(row: &Row) -> Result<PointsTransactionRecord, DatabaseError> {
    let type_str: String = row.get("transaction_type");
    let transaction_type = TransactionType::parse(&type_str).ok_or_else(|| {
        DatabaseError::NotFound(format!("Unknown transaction type: {}", type_str))
    })?;

    Ok(PointsTransactionRecord {
        id: row.get("id"),
        resident_id: row.get("resident_id"),
        amount: row.get("amount"),
        transaction_type,
        related_booking_id: row.get("related_booking_id"),
        note: row.get("note"),
        created_at: row.get("created_at"),
    })
}

/// Helper to convert a database row to BookingRecord
fn row_to_booking(row: &Row) -> Result<BookingRecord, DatabaseError> {
    let status_str: String = row.get("status");
    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| DatabaseError::NotFound(format!("Unknown booking status: {}", status_str)))?;

    Ok(BookingRecord {
        id: row.get("id"),
        facility_id: row.get("facility_id"),
        resident_id: row.get("resident_id"),
        booking_date: row.get("booking_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        points_spent: row.get("points_spent"),
        status,
        check_in_time: row.get("check_in_time"),
        note: row.get("note"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Helper to convert a database row to LotteryBidRecord
fn row_to_bid(row: &Row) -> LotteryBidRecord {
    LotteryBidRecord {
        id: row.get("id"),
        facility_id: row.get("facility_id"),
        booking_date: row.get("booking_date"),
        start_time: row.get("start_time"),
        resident_id: row.get("resident_id"),
        bid_amount: row.get("bid_amount"),
        placed_at: row.get("placed_at"),
    }
}

// ============================================
// FACILITY QUERIES
// ============================================

/// Get a facility by id.
pub async fn get_facility(
    pool: &Pool,
    facility_id: Uuid,
) -> Result<Option<FacilityRecord>, DatabaseError> {
    debug!("Fetching facility: {}", facility_id);

    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let row = client
        .query_opt(
            r#"
            SELECT id, name, base_price, cool_down_hours, max_concurrent_bookings,
                   is_lottery_enabled, capacity, open_hour, close_hour, is_active,
                   created_at, updated_at
            FROM facilities
            WHERE id = $1 AND is_active
            "#,
            &[&facility_id],
        )
        .await?;

    Ok(row.map(|r| row_to_facility(&r)))
}

/// Fetch a facility regardless of its `is_active` flag.
///
/// The lottery sweep needs this: bids placed before a facility was
/// deactivated must still settle, otherwise their pending placeholders
/// would stay unresolved forever.
pub async fn get_facility_any(
    pool: &Pool,
    facility_id: Uuid,
) -> Result<Option<FacilityRecord>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let row = client
        .query_opt(
            r#"
            SELECT id, name, base_price, cool_down_hours, max_concurrent_bookings,
                   is_lottery_enabled, capacity, open_hour, close_hour, is_active,
                   created_at, updated_at
            FROM facilities
            WHERE id = $1
            "#,
            &[&facility_id],
        )
        .await?;

    Ok(row.map(|r| row_to_facility(&r)))
}

/// List all active facilities.
pub async fn list_facilities(pool: &Pool) -> Result<Vec<FacilityRecord>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query(
            r#"
            SELECT id, name, base_price, cool_down_hours, max_concurrent_bookings,
                   is_lottery_enabled, capacity, open_hour, close_hour, is_active,
                   created_at, updated_at
            FROM facilities
            WHERE is_active
            ORDER BY name
            "#,
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_facility).collect())
}

// ============================================
// ACCOUNT & LEDGER QUERIES
// ============================================

/// Get a resident's account, creating a zero-balance row on first touch.
pub async fn get_or_create_account<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
) -> Result<PointsAccountRecord, DatabaseError> {
    client
        .execute(
            r#"
            INSERT INTO points_accounts (resident_id)
            VALUES ($1)
            ON CONFLICT (resident_id) DO NOTHING
            "#,
            &[&resident_id],
        )
        .await?;

    let row = client
        .query_one(
            r#"
            SELECT resident_id, balance, penalty_count, suspended_until,
                   created_at, updated_at
            FROM points_accounts
            WHERE resident_id = $1
            "#,
            &[&resident_id],
        )
        .await?;

    Ok(row_to_account(&row))
}

/// Lock a resident's account row for the duration of the enclosing
/// transaction (`SELECT ... FOR UPDATE`).
///
/// Serializes concurrent debits against the same account so the
/// balance guard cannot be raced past.
pub async fn lock_account<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
) -> Result<PointsAccountRecord, DatabaseError> {
    // Ensure the row exists before locking it.
    client
        .execute(
            r#"
            INSERT INTO points_accounts (resident_id)
            VALUES ($1)
            ON CONFLICT (resident_id) DO NOTHING
            "#,
            &[&resident_id],
        )
        .await?;

    let row = client
        .query_one(
            r#"
            SELECT resident_id, balance, penalty_count, suspended_until,
                   created_at, updated_at
            FROM points_accounts
            WHERE resident_id = $1
            FOR UPDATE
            "#,
            &[&resident_id],
        )
        .await?;

    Ok(row_to_account(&row))
}

/// Apply a guarded balance delta.
///
/// The `balance + delta >= 0` predicate makes the non-negative balance
/// invariant a database-level guarantee: a debit that would overdraw the
/// account updates zero rows, and the caller aborts its transaction.
///
/// Returns the new balance, or `None` if the guard rejected the delta.
pub async fn update_balance_guarded<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
    delta: i64,
) -> Result<Option<i64>, DatabaseError> {
    let row = client
        .query_opt(
            r#"
            UPDATE points_accounts
            SET balance = balance + $2, updated_at = NOW()
            WHERE resident_id = $1 AND balance + $2 >= 0
            RETURNING balance
            "#,
            &[&resident_id, &delta],
        )
        .await?;

    Ok(row.map(|r| r.get("balance")))
}

/// Append a ledger transaction row.
///
/// Must run in the same database transaction as the balance update it
/// records (see `services::points_ledger::PointsLedger::apply`).
pub async fn insert_ledger_transaction<C: GenericClient>(
    client: &C,
    tx: &PointsTransactionRecord,
) -> Result<(), DatabaseError> {
    client
        .execute(
            r#"
            INSERT INTO points_transactions (
                id, resident_id, amount, transaction_type,
                related_booking_id, note, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            &[
                &tx.id,
                &tx.resident_id,
                &tx.amount,
                &tx.transaction_type.as_str(),
                &tx.related_booking_id,
                &tx.note,
                &tx.created_at,
            ],
        )
        .await?;

    Ok(())
}

/// Get a resident's ledger history, newest first.
pub async fn get_ledger_history(
    pool: &Pool,
    resident_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<PointsTransactionRecord>, DatabaseError> {
    debug!("Fetching ledger history for resident: {}", resident_id);

    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query(
            r#"
            SELECT id, resident_id, amount, transaction_type,
                   related_booking_id, note, created_at
            FROM points_transactions
            WHERE resident_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            &[&resident_id, &limit, &offset],
        )
        .await?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row_to_transaction(&row)?);
    }

    Ok(transactions)
}

/// Whether the resident already received a `monthly_allocation` credit
/// within the given month window.
pub async fn has_allocation_since<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
    month_start: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS n
            FROM points_transactions
            WHERE resident_id = $1
              AND transaction_type = 'monthly_allocation'
              AND created_at >= $2
            "#,
            &[&resident_id, &month_start],
        )
        .await?;

    let n: i64 = row.get("n");
    Ok(n > 0)
}

/// All known account ids (for the monthly allocation sweep).
pub async fn list_account_ids(pool: &Pool) -> Result<Vec<Uuid>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query("SELECT resident_id FROM points_accounts", &[])
        .await?;

    Ok(rows.iter().map(|r| r.get("resident_id")).collect())
}

/// Overwrite a resident's penalty state.
///
/// The three-strikes policy itself lives in `services::attendance`; this
/// just persists its outcome.
pub async fn set_penalty_state<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
    penalty_count: i32,
    suspended_until: Option<DateTime<Utc>>,
) -> Result<(), DatabaseError> {
    client
        .execute(
            r#"
            UPDATE points_accounts
            SET penalty_count = $2, suspended_until = $3, updated_at = NOW()
            WHERE resident_id = $1
            "#,
            &[&resident_id, &penalty_count, &suspended_until],
        )
        .await?;

    Ok(())
}

// ============================================
// BOOKING QUERIES
// ============================================

/// Get a booking by id.
pub async fn get_booking(
    pool: &Pool,
    booking_id: Uuid,
) -> Result<Option<BookingRecord>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let row = client
        .query_opt(
            r#"
            SELECT id, facility_id, resident_id, booking_date, start_time, end_time,
                   points_spent, status, check_in_time, note, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
            &[&booking_id],
        )
        .await?;

    row.map(|r| row_to_booking(&r)).transpose()
}

/// All non-cancelled bookings for a facility on a date.
///
/// Feeds the slot generator: occupied slots show BOOKED, pending-lottery
/// placeholders show HELD.
pub async fn bookings_on_date<C: GenericClient>(
    client: &C,
    facility_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<BookingRecord>, DatabaseError> {
    let rows = client
        .query(
            r#"
            SELECT id, facility_id, resident_id, booking_date, start_time, end_time,
                   points_spent, status, check_in_time, note, created_at, updated_at
            FROM bookings
            WHERE facility_id = $1 AND booking_date = $2 AND status <> 'cancelled'
            ORDER BY start_time
            "#,
            &[&facility_id, &date],
        )
        .await?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row_to_booking(&row)?);
    }

    Ok(bookings)
}

/// Insert a new booking row.
///
/// A unique violation on `idx_bookings_slot_exclusive` means the caller
/// lost the race for the slot; detect it with
/// [`DatabaseError::is_unique_violation`].
pub async fn insert_booking<C: GenericClient>(
    client: &C,
    booking: &BookingRecord,
) -> Result<(), DatabaseError> {
    client
        .execute(
            r#"
            INSERT INTO bookings (
                id, facility_id, resident_id, booking_date, start_time, end_time,
                points_spent, status, check_in_time, note, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
            &[
                &booking.id,
                &booking.facility_id,
                &booking.resident_id,
                &booking.booking_date,
                &booking.start_time,
                &booking.end_time,
                &booking.points_spent,
                &booking.status.as_str(),
                &booking.check_in_time,
                &booking.note,
                &booking.created_at,
                &booking.updated_at,
            ],
        )
        .await?;

    Ok(())
}

/// Count a resident's future CONFIRMED / PENDING_LOTTERY bookings.
///
/// This is the concurrency-limit check; the count is derived instead of
/// cached so it can never drift from the booking rows.
pub async fn count_future_active_bookings<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS n
            FROM bookings
            WHERE resident_id = $1
              AND status IN ('confirmed', 'pending_lottery')
              AND (booking_date + start_time) > $2
            "#,
            &[&resident_id, &now],
        )
        .await?;

    Ok(row.get("n"))
}

/// A resident's non-cancelled bookings at one facility inside a date
/// window. Fetched broadly; the cooldown decision itself is the pure
/// function `services::booking_scheduler::cooldown_conflict`.
pub async fn resident_bookings_in_window<C: GenericClient>(
    client: &C,
    resident_id: Uuid,
    facility_id: Uuid,
    from_date: NaiveDate,
    to_date: NaiveDate,
) -> Result<Vec<BookingRecord>, DatabaseError> {
    let rows = client
        .query(
            r#"
            SELECT id, facility_id, resident_id, booking_date, start_time, end_time,
                   points_spent, status, check_in_time, note, created_at, updated_at
            FROM bookings
            WHERE resident_id = $1
              AND facility_id = $2
              AND status <> 'cancelled'
              AND booking_date BETWEEN $3 AND $4
            "#,
            &[&resident_id, &facility_id, &from_date, &to_date],
        )
        .await?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row_to_booking(&row)?);
    }

    Ok(bookings)
}

/// List a resident's bookings, newest slot first.
pub async fn list_resident_bookings(
    pool: &Pool,
    resident_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<BookingRecord>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query(
            r#"
            SELECT id, facility_id, resident_id, booking_date, start_time, end_time,
                   points_spent, status, check_in_time, note, created_at, updated_at
            FROM bookings
            WHERE resident_id = $1
            ORDER BY booking_date DESC, start_time DESC
            LIMIT $2 OFFSET $3
            "#,
            &[&resident_id, &limit, &offset],
        )
        .await?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row_to_booking(&row)?);
    }

    Ok(bookings)
}

/// Conditionally transition a booking between statuses.
///
/// The `WHERE status = $3` guard makes every transition idempotent under
/// concurrent sweeps: only one worker observes the affected-row count of 1.
pub async fn transition_booking_status<C: GenericClient>(
    client: &C,
    booking_id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<bool, DatabaseError> {
    let affected = client
        .execute(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
            &[&booking_id, &to.as_str(), &from.as_str()],
        )
        .await?;

    Ok(affected == 1)
}

/// Record a check-in on a confirmed, not-yet-checked-in booking.
pub async fn set_check_in<C: GenericClient>(
    client: &C,
    booking_id: Uuid,
    check_in_time: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let affected = client
        .execute(
            r#"
            UPDATE bookings
            SET check_in_time = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed' AND check_in_time IS NULL
            "#,
            &[&booking_id, &check_in_time],
        )
        .await?;

    Ok(affected == 1)
}

/// Confirmed bookings whose check-in window has already closed.
///
/// `cutoff` is `now - check-in grace`, i.e. a slot qualifies once its
/// start time is older than the cutoff.
pub async fn confirmed_past_window(
    pool: &Pool,
    cutoff: NaiveDateTime,
) -> Result<Vec<BookingRecord>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query(
            r#"
            SELECT id, facility_id, resident_id, booking_date, start_time, end_time,
                   points_spent, status, check_in_time, note, created_at, updated_at
            FROM bookings
            WHERE status = 'confirmed'
              AND (booking_date + start_time) < $1
            ORDER BY booking_date, start_time
            "#,
            &[&cutoff],
        )
        .await?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row_to_booking(&row)?);
    }

    Ok(bookings)
}

/// Promote the winner's pending-lottery placeholder to a confirmed
/// booking, stamping what they actually paid.
pub async fn confirm_pending_booking<C: GenericClient>(
    client: &C,
    facility_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    resident_id: Uuid,
    points_spent: i64,
) -> Result<Option<Uuid>, DatabaseError> {
    let row = client
        .query_opt(
            r#"
            UPDATE bookings
            SET status = 'confirmed', points_spent = $5, updated_at = NOW()
            WHERE facility_id = $1 AND booking_date = $2 AND start_time = $3
              AND resident_id = $4 AND status = 'pending_lottery'
            RETURNING id
            "#,
            &[&facility_id, &date, &start_time, &resident_id, &points_spent],
        )
        .await?;

    Ok(row.map(|r| r.get("id")))
}

/// Cancel every remaining pending-lottery placeholder for a slot.
///
/// Losers were never charged, so no ledger rows accompany this.
pub async fn cancel_pending_losers<C: GenericClient>(
    client: &C,
    facility_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<u64, DatabaseError> {
    let affected = client
        .execute(
            r#"
            UPDATE bookings
            SET status = 'cancelled', updated_at = NOW()
            WHERE facility_id = $1 AND booking_date = $2 AND start_time = $3
              AND status = 'pending_lottery'
            "#,
            &[&facility_id, &date, &start_time],
        )
        .await?;

    Ok(affected)
}

// ============================================
// LOTTERY BID QUERIES
// ============================================

/// Insert a sealed bid.
///
/// A unique violation on (facility, date, start, resident) means the
/// resident already bid on this slot.
pub async fn insert_bid<C: GenericClient>(
    client: &C,
    bid: &LotteryBidRecord,
) -> Result<(), DatabaseError> {
    client
        .execute(
            r#"
            INSERT INTO lottery_bids (
                id, facility_id, booking_date, start_time,
                resident_id, bid_amount, placed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            &[
                &bid.id,
                &bid.facility_id,
                &bid.booking_date,
                &bid.start_time,
                &bid.resident_id,
                &bid.bid_amount,
                &bid.placed_at,
            ],
        )
        .await?;

    Ok(())
}

/// All bids for one slot.
pub async fn bids_for_slot<C: GenericClient>(
    client: &C,
    facility_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<Vec<LotteryBidRecord>, DatabaseError> {
    let rows = client
        .query(
            r#"
            SELECT id, facility_id, booking_date, start_time,
                   resident_id, bid_amount, placed_at
            FROM lottery_bids
            WHERE facility_id = $1 AND booking_date = $2 AND start_time = $3
            ORDER BY bid_amount DESC, placed_at ASC
            "#,
            &[&facility_id, &date, &start_time],
        )
        .await?;

    Ok(rows.iter().map(row_to_bid).collect())
}

/// Withdraw a resident's bid on a slot (pending-lottery cancellation).
pub async fn delete_bid<C: GenericClient>(
    client: &C,
    facility_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    resident_id: Uuid,
) -> Result<u64, DatabaseError> {
    let affected = client
        .execute(
            r#"
            DELETE FROM lottery_bids
            WHERE facility_id = $1 AND booking_date = $2 AND start_time = $3
              AND resident_id = $4
            "#,
            &[&facility_id, &date, &start_time, &resident_id],
        )
        .await?;

    Ok(affected)
}

/// Distinct bid slot-keys whose lock deadline has passed and which have
/// no resolution row yet.
///
/// `lock_cutoff` is `now + lottery lock offset`: a slot is due once its
/// start instant is at or before the cutoff.
pub async fn unresolved_locked_slots(
    pool: &Pool,
    lock_cutoff: NaiveDateTime,
) -> Result<Vec<(Uuid, NaiveDate, NaiveTime)>, DatabaseError> {
    let client = pool
        .get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    let rows = client
        .query(
            r#"
            SELECT DISTINCT b.facility_id, b.booking_date, b.start_time
            FROM lottery_bids b
            WHERE (b.booking_date + b.start_time) <= $1
              AND NOT EXISTS (
                  SELECT 1 FROM lottery_resolutions r
                  WHERE r.facility_id = b.facility_id
                    AND r.booking_date = b.booking_date
                    AND r.start_time = b.start_time
              )
            "#,
            &[&lock_cutoff],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|r| (r.get("facility_id"), r.get("booking_date"), r.get("start_time")))
        .collect())
}

// ============================================
// LOTTERY RESOLUTION QUERIES
// ============================================

/// Record a slot resolution.
///
/// The composite primary key doubles as the idempotency guard: a second
/// worker resolving the same slot hits a unique violation and backs off.
pub async fn insert_resolution<C: GenericClient>(
    client: &C,
    resolution: &LotteryResolutionRecord,
) -> Result<(), DatabaseError> {
    client
        .execute(
            r#"
            INSERT INTO lottery_resolutions (
                facility_id, booking_date, start_time,
                winner_resident_id, winning_bid, charged, bid_count, resolved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            &[
                &resolution.facility_id,
                &resolution.booking_date,
                &resolution.start_time,
                &resolution.winner_resident_id,
                &resolution.winning_bid,
                &resolution.charged,
                &resolution.bid_count,
                &resolution.resolved_at,
            ],
        )
        .await?;

    Ok(())
}
