//! # Sweeper Service
//!
//! The Sweeper runs the periodic maintenance loops that keep the
//! booking system consistent without any human intervention:
//! - Lottery resolution for slots whose bidding window has closed
//! - No-show detection and penalty escalation
//! - Monthly points allocation for every known account
//!
//! ## Sweep Flow
//!
//! ```text
//! Sweeper (background task)
//!         │
//!         ├── Every 60s (configurable): resolve locked lottery slots
//!         │
//!         ├── Every 60s (configurable): settle expired check-in windows
//!         │
//!         └── Every 24h: grant monthly allocations (idempotent per month)
//! ```
//!
//! All sweeps are idempotent; overlapping or repeated runs are safe.

use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::AppConfig;

use super::{AttendanceTracker, LotteryAllocator, PointsLedger};

/// The background maintenance service.
///
/// ## Usage
///
/// ```rust,ignore
/// let sweeper = Sweeper::new(allocator, attendance, ledger, config);
///
/// // Runs forever
/// tokio::spawn(async move {
///     sweeper.start().await;
/// });
/// ```
#[derive(Clone)]
pub struct Sweeper {
    /// Lottery resolution engine.
    allocator: LotteryAllocator,

    /// Check-in / no-show engine.
    attendance: AttendanceTracker,

    /// Points ledger (for monthly allocations).
    ledger: PointsLedger,

    /// Application configuration.
    config: AppConfig,
}

impl Sweeper {
    /// Create a new Sweeper instance.
    pub fn new(
        allocator: LotteryAllocator,
        attendance: AttendanceTracker,
        ledger: PointsLedger,
        config: AppConfig,
    ) -> Self {
        Self {
            allocator,
            attendance,
            ledger,
            config,
        }
    }

    /// Start the sweep loop.
    ///
    /// Runs continuously, performing each sweep at its own interval.
    ///
    /// | Sweep | Interval | Description |
    /// |-------|----------|-------------|
    /// | Lottery | Configurable (default: 60s) | Resolve slots past their lock time |
    /// | No-show | Configurable (default: 60s) | Settle bookings past the check-in window |
    /// | Allocation | 24 hours | Grant each account its monthly points |
    pub async fn start(&self) {
        info!("Starting Sweeper service");

        let mut lottery_ticker =
            interval(Duration::from_secs(self.config.lottery_sweep_interval));
        let mut no_show_ticker =
            interval(Duration::from_secs(self.config.no_show_sweep_interval));
        let mut allocation_ticker = interval(Duration::from_secs(86_400)); // 24 hours

        loop {
            tokio::select! {
                // Lottery resolution tick
                _ = lottery_ticker.tick() => {
                    match self.allocator.run_sweep(Utc::now()).await {
                        Ok(0) => debug!("Lottery sweep: nothing to resolve"),
                        Ok(n) => info!("Lottery sweep resolved {} slot(s)", n),
                        Err(e) => error!("Lottery sweep failed: {}", e),
                    }
                }

                // No-show settlement tick
                _ = no_show_ticker.tick() => {
                    match self.attendance.run_no_show_sweep(Utc::now()).await {
                        Ok(0) => debug!("No-show sweep: nothing expired"),
                        Ok(n) => info!("No-show sweep settled {} booking(s)", n),
                        Err(e) => error!("No-show sweep failed: {}", e),
                    }
                }

                // Monthly allocation tick
                _ = allocation_ticker.tick() => {
                    if let Err(e) = self.grant_allocations().await {
                        error!("Monthly allocation sweep failed: {}", e);
                    }
                }
            }
        }
    }

    /// Grant the monthly allocation to every known account.
    ///
    /// The per-account grant is guarded by a per-month check, so running
    /// this daily only credits each account once per calendar month.
    async fn grant_allocations(&self) -> Result<(), super::BookingError> {
        let now = Utc::now();
        let accounts = self.ledger.account_ids().await?;
        let mut granted = 0;

        for resident_id in accounts {
            match self
                .ledger
                .grant_monthly_allocation(resident_id, self.config.monthly_allocation_points, now)
                .await
            {
                Ok(true) => granted += 1,
                Ok(false) => {} // already granted this month
                Err(e) => error!("Allocation failed for resident {}: {}", resident_id, e),
            }
        }

        if granted > 0 {
            info!("Granted monthly allocation to {} account(s)", granted);
        }
        Ok(())
    }
}
