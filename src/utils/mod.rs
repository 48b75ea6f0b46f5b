//! # Utilities Module
//!
//! This module contains helper functions and utilities used
//! across the backend service.

use chrono::{NaiveDate, NaiveTime};

/// Format a point amount as a human-readable string.
///
/// ## Examples
///
/// ```rust
/// assert_eq!(format_points(120), "120 pts");
/// assert_eq!(format_points(1), "1 pt");
/// ```
pub fn format_points(amount: i64) -> String {
    if amount == 1 || amount == -1 {
        format!("{} pt", amount)
    } else {
        format!("{} pts", amount)
    }
}

/// Format a signed ledger amount with an explicit sign.
///
/// Credits carry a leading `+` so they read unambiguously in history
/// views; debits already carry `-` from the value itself.
///
/// ## Examples
///
/// ```rust
/// assert_eq!(format_points_signed(50), "+50 pts");
/// assert_eq!(format_points_signed(-50), "-50 pts");
/// ```
pub fn format_points_signed(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_points(amount))
    } else {
        format_points(amount)
    }
}

/// Format a slot as a compact human-readable key.
///
/// Useful for logging: `2026-09-12 18:00`.
pub fn format_slot(date: NaiveDate, start_time: NaiveTime) -> String {
    format!("{} {}", date, start_time.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(120), "120 pts");
        assert_eq!(format_points(1), "1 pt");
        assert_eq!(format_points(0), "0 pts");
        assert_eq!(format_points(-1), "-1 pt");
    }

    #[test]
    fn test_format_points_signed() {
        assert_eq!(format_points_signed(50), "+50 pts");
        assert_eq!(format_points_signed(-50), "-50 pts");
        assert_eq!(format_points_signed(0), "0 pts");
    }

    #[test]
    fn test_format_slot() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).unwrap();
        let time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        assert_eq!(format_slot(date, time), "2026-09-12 18:00");
    }

}
