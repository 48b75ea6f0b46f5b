//! # Points Ledger Service
//!
//! The PointsLedger owns resident point balances and the append-only
//! transaction log behind them.
//!
//! ## The one primitive
//!
//! Every debit and credit in the system (booking charges, refunds,
//! lottery charges, no-show penalties, monthly stipends, admin
//! adjustments) goes through [`PointsLedger::apply`]. It does two
//! things in the caller's database transaction:
//!
//! 1. Updates the cached balance with a `balance + delta >= 0` guard,
//!    so a debit can never overdraw the account.
//! 2. Appends the immutable `points_transactions` row recording why.
//!
//! Because both writes share the caller's transaction, the cached
//! balance always equals the sum of the ledger rows, and a crash can
//! never separate a charge from the booking change it paid for.
//!
//! ## Flow Example: Direct Booking
//!
//! ```text
//! 1. BookingScheduler opens a transaction
//!                ↓
//! 2. PointsLedger::apply(tx, resident, -final_price, BookingDeduct)
//!                ↓
//! 3. Booking row inserted (slot uniqueness enforced here)
//!                ↓
//! 4. Commit: ledger and booking move together or not at all
//! ```

use chrono::{Datelike, DateTime, TimeZone, Utc};
use tokio_postgres::GenericClient;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::queries;
use crate::db::{Database, PointsAccountRecord, PointsTransactionRecord, TransactionType};

use super::BookingError;

/// The points ledger service.
#[derive(Clone)]
pub struct PointsLedger {
    /// Database connection for account reads and standalone credits.
    db: Database,
}

impl PointsLedger {
    /// Create a new PointsLedger instance.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a resident's current balance.
    ///
    /// Accounts are created lazily with a zero balance on first touch.
    pub async fn balance(&self, resident_id: Uuid) -> Result<i64, BookingError> {
        Ok(self.account(resident_id).await?.balance)
    }

    /// Get a resident's full account row.
    pub async fn account(&self, resident_id: Uuid) -> Result<PointsAccountRecord, BookingError> {
        let client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        Ok(queries::get_or_create_account(&**client, resident_id).await?)
    }

    /// Apply a signed point movement inside the caller's transaction.
    ///
    /// This is an associated function on purpose: callers that already
    /// hold a database transaction (the scheduler, the allocator, the
    /// attendance sweep) pass it in, and the ledger write commits or
    /// rolls back with everything else in that unit.
    ///
    /// Returns `InsufficientBalance` if a debit would take the balance
    /// negative; the caller must abort its transaction on that error.
    pub async fn apply<C: GenericClient>(
        client: &C,
        resident_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        related_booking_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<PointsTransactionRecord, BookingError> {
        // The account row must exist before the guarded update can match.
        queries::get_or_create_account(client, resident_id).await?;

        let new_balance = queries::update_balance_guarded(client, resident_id, amount)
            .await?
            .ok_or(BookingError::InsufficientBalance)?;

        let record = PointsTransactionRecord {
            id: Uuid::new_v4(),
            resident_id,
            amount,
            transaction_type,
            related_booking_id,
            note,
            created_at: Utc::now(),
        };
        queries::insert_ledger_transaction(client, &record).await?;

        debug!(
            "Ledger: {} {} for resident {} (balance now {})",
            transaction_type.as_str(),
            amount,
            resident_id,
            new_balance
        );

        Ok(record)
    }

    /// Get a resident's transaction history, newest first.
    pub async fn history(
        &self,
        resident_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointsTransactionRecord>, BookingError> {
        Ok(queries::get_ledger_history(self.db.pool(), resident_id, limit, offset).await?)
    }

    /// Manual administrator adjustment, either direction.
    ///
    /// Runs in its own transaction with the account row locked so a
    /// concurrent debit cannot slip between guard and append.
    pub async fn adjust(
        &self,
        resident_id: Uuid,
        amount: i64,
        note: Option<String>,
    ) -> Result<i64, BookingError> {
        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let tx = client.transaction().await?;
        queries::lock_account(&*tx, resident_id).await?;
        Self::apply(
            &*tx,
            resident_id,
            amount,
            TransactionType::AdminAdjust,
            None,
            note,
        )
        .await?;
        tx.commit().await?;

        let balance = self.balance(resident_id).await?;
        info!(
            "Admin adjustment of {} points for resident {} (balance now {})",
            amount, resident_id, balance
        );

        Ok(balance)
    }

    /// Credit the monthly stipend if this account has not yet received
    /// one in the current calendar month.
    ///
    /// Idempotent per (resident, month): the existence check and the
    /// credit share one transaction, so concurrent sweep workers grant
    /// at most one stipend.
    pub async fn grant_monthly_allocation(
        &self,
        resident_id: Uuid,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let mut client = self
            .db
            .pool()
            .get()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let tx = client.transaction().await?;
        queries::lock_account(&*tx, resident_id).await?;

        if queries::has_allocation_since(&*tx, resident_id, month_start).await? {
            // Already granted this month; nothing to do.
            return Ok(false);
        }

        Self::apply(
            &*tx,
            resident_id,
            amount,
            TransactionType::MonthlyAllocation,
            None,
            None,
        )
        .await?;
        tx.commit().await?;

        info!(
            "Monthly allocation of {} points granted to resident {}",
            amount, resident_id
        );
        Ok(true)
    }

    /// All account ids known to the ledger (for the allocation sweep).
    pub async fn account_ids(&self) -> Result<Vec<Uuid>, BookingError> {
        Ok(queries::list_account_ids(self.db.pool()).await?)
    }
}
