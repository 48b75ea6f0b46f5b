//! # Slot Generator Service
//!
//! Derives the bookable slot grid for a facility and date. Slots are
//! ephemeral: they are computed on every read from facility policy plus
//! the bookings that already exist, and are never persisted themselves.
//!
//! ## Responsibilities
//!
//! - Divide a facility's operating hours into fixed one-hour slots
//! - Apply the time-of-day / day-of-week pricing policy
//! - Classify high-demand slots of lottery-enabled facilities as LOTTERY
//! - Report occupancy (OPEN / HELD / BOOKED) from existing bookings
//!
//! The generator is a pure function of its inputs; all database reads
//! happen in the caller. `derive_slot` re-runs the same logic for a
//! single slot and is the authoritative check the scheduler performs
//! right before committing a booking.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{BookingRecord, BookingStatus, FacilityRecord};

use super::BookingError;

/// Occupancy state of a derived slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// No live booking holds the slot.
    Open,
    /// Pending-lottery placeholders exist; resolution will pick a winner.
    Held,
    /// A confirmed / completed / no-show booking occupies the slot.
    Booked,
}

/// How a slot is acquired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    /// First come, first served.
    Direct,
    /// Sealed-bid lottery, resolved at the lock deadline.
    Lottery,
}

/// One derived, bookable interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Facility the slot belongs to.
    pub facility_id: Uuid,

    /// Calendar date.
    pub date: NaiveDate,

    /// Slot start (inclusive).
    pub start_time: NaiveTime,

    /// Slot end (exclusive).
    pub end_time: NaiveTime,

    /// Multiplier applied to the facility base price.
    pub price_modifier: f64,

    /// `round(base_price × price_modifier)`.
    pub final_price: i64,

    /// Direct booking or sealed-bid lottery.
    pub booking_type: BookingType,

    /// Occupancy derived from existing bookings.
    pub status: SlotStatus,
}

/// Which days of the week a pricing rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDays {
    /// Monday through Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
    /// Every day.
    All,
}

impl RuleDays {
    fn matches(&self, weekday: Weekday) -> bool {
        let is_weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        match self {
            RuleDays::Weekdays => !is_weekend,
            RuleDays::Weekends => is_weekend,
            RuleDays::All => true,
        }
    }
}

/// One row of the pricing policy table.
#[derive(Debug, Clone)]
pub struct PricingRule {
    /// Days the rule applies to.
    pub days: RuleDays,

    /// First hour covered (inclusive).
    pub from_hour: u32,

    /// Last hour covered (exclusive).
    pub to_hour: u32,

    /// Multiplier on the facility base price.
    pub multiplier: f64,
}

/// Ordered pricing rule table; the first matching rule wins and the
/// baseline multiplier is 1.0.
///
/// The table is data, not code, so the peak/off-peak schedule can be
/// tuned per deployment.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    rules: Vec<PricingRule>,
}

impl PricingPolicy {
    /// Build a policy from an explicit rule table.
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self { rules }
    }

    /// The shipped default: weekend evenings peak at ×1.5, weekday
    /// evenings at ×1.3, weekday mornings are off-peak at ×0.8.
    pub fn standard() -> Self {
        Self::new(vec![
            PricingRule {
                days: RuleDays::Weekends,
                from_hour: 18,
                to_hour: 22,
                multiplier: 1.5,
            },
            PricingRule {
                days: RuleDays::Weekdays,
                from_hour: 18,
                to_hour: 21,
                multiplier: 1.3,
            },
            PricingRule {
                days: RuleDays::Weekdays,
                from_hour: 6,
                to_hour: 9,
                multiplier: 0.8,
            },
        ])
    }

    /// Price modifier for a given date and hour of day.
    pub fn modifier(&self, date: NaiveDate, hour: u32) -> f64 {
        let weekday = date.weekday();
        self.rules
            .iter()
            .find(|r| r.days.matches(weekday) && hour >= r.from_hour && hour < r.to_hour)
            .map(|r| r.multiplier)
            .unwrap_or(1.0)
    }
}

/// The slot derivation service.
#[derive(Clone)]
pub struct SlotGenerator {
    /// Pricing rule table.
    policy: PricingPolicy,

    /// Days ahead of today a slot may be booked (inclusive).
    horizon_days: i64,

    /// Modifier at or above which a lottery-enabled facility's slot is
    /// resolved by sealed bid.
    high_demand_threshold: f64,
}

impl SlotGenerator {
    /// Create a generator with the given policy and limits.
    pub fn new(policy: PricingPolicy, horizon_days: i64, high_demand_threshold: f64) -> Self {
        Self {
            policy,
            horizon_days,
            high_demand_threshold,
        }
    }

    /// Reject dates outside `[today, today + horizon]`.
    pub fn validate_date(&self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
        let offset = (date - today).num_days();
        if offset < 0 || offset > self.horizon_days {
            return Err(BookingError::InvalidDateRange);
        }
        Ok(())
    }

    /// Derive the full slot grid for a facility on a date.
    ///
    /// `bookings` must be the facility's non-cancelled bookings for that
    /// date; occupancy is read from them.
    pub fn generate(
        &self,
        facility: &FacilityRecord,
        date: NaiveDate,
        today: NaiveDate,
        bookings: &[BookingRecord],
    ) -> Result<Vec<TimeSlot>, BookingError> {
        self.validate_date(date, today)?;

        let mut slots = Vec::new();
        for hour in facility.open_hour..facility.close_hour {
            let start = NaiveTime::from_hms_opt(hour as u32, 0, 0)
                .ok_or(BookingError::InvalidDateRange)?;
            slots.push(self.build_slot(facility, date, start, bookings));
        }

        Ok(slots)
    }

    /// Re-derive a single slot; the authoritative pre-commit check.
    ///
    /// Rejects starts that are off the hourly grid or outside operating
    /// hours with `SlotUnavailable`.
    pub fn derive_slot(
        &self,
        facility: &FacilityRecord,
        date: NaiveDate,
        start_time: NaiveTime,
        today: NaiveDate,
        bookings: &[BookingRecord],
    ) -> Result<TimeSlot, BookingError> {
        self.validate_date(date, today)?;

        use chrono::Timelike;
        let hour = start_time.hour() as i32;
        if start_time.minute() != 0
            || start_time.second() != 0
            || hour < facility.open_hour
            || hour >= facility.close_hour
        {
            return Err(BookingError::SlotUnavailable);
        }

        Ok(self.build_slot(facility, date, start_time, bookings))
    }

    /// Price a slot without occupancy or date-window checks.
    ///
    /// Used by the allocator at resolution time, when the slot is by
    /// definition already contested.
    pub fn quote(
        &self,
        facility: &FacilityRecord,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> (f64, i64) {
        use chrono::Timelike;
        let modifier = self.policy.modifier(date, start_time.hour());
        (modifier, round_price(facility.base_price, modifier))
    }

    fn build_slot(
        &self,
        facility: &FacilityRecord,
        date: NaiveDate,
        start_time: NaiveTime,
        bookings: &[BookingRecord],
    ) -> TimeSlot {
        use chrono::Timelike;

        let hour = start_time.hour();
        let end_time = NaiveTime::from_hms_opt((hour + 1) % 24, 0, 0)
            .unwrap_or(NaiveTime::MIN);

        let price_modifier = self.policy.modifier(date, hour);
        let final_price = round_price(facility.base_price, price_modifier);

        let booking_type = if facility.is_lottery_enabled
            && price_modifier >= self.high_demand_threshold
        {
            BookingType::Lottery
        } else {
            BookingType::Direct
        };

        let status = slot_occupancy(bookings, start_time);

        TimeSlot {
            facility_id: facility.id,
            date,
            start_time,
            end_time,
            price_modifier,
            final_price,
            booking_type,
            status,
        }
    }
}

/// `round(base_price × modifier)`, half away from zero.
pub fn round_price(base_price: i64, modifier: f64) -> i64 {
    (base_price as f64 * modifier).round() as i64
}

/// Occupancy for a start time given the day's non-cancelled bookings.
///
/// A slot-occupying booking wins over any number of pending-lottery
/// placeholders at the same start.
pub fn slot_occupancy(bookings: &[BookingRecord], start_time: NaiveTime) -> SlotStatus {
    let mut held = false;
    for b in bookings.iter().filter(|b| b.start_time == start_time) {
        match b.status {
            BookingStatus::Confirmed | BookingStatus::Completed | BookingStatus::NoShow => {
                return SlotStatus::Booked;
            }
            BookingStatus::PendingLottery => held = true,
            BookingStatus::Cancelled => {}
        }
    }
    if held {
        SlotStatus::Held
    } else {
        SlotStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn facility(base_price: i64, lottery: bool) -> FacilityRecord {
        FacilityRecord {
            id: Uuid::new_v4(),
            name: "Party Room".to_string(),
            base_price,
            cool_down_hours: 24,
            max_concurrent_bookings: 2,
            is_lottery_enabled: lottery,
            capacity: 30,
            open_hour: 10,
            close_hour: 22,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(start: NaiveTime, status: BookingStatus) -> BookingRecord {
        BookingRecord {
            id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            resident_id: Uuid::new_v4(),
            booking_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            start_time: start,
            end_time: start,
            points_spent: 0,
            status,
            check_in_time: None,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn generator() -> SlotGenerator {
        SlotGenerator::new(PricingPolicy::standard(), 14, 1.3)
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_standard_policy_modifiers() {
        let policy = PricingPolicy::standard();
        // 2026-09-05 is a Saturday, 2026-09-07 a Monday
        let saturday = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();

        assert_eq!(policy.modifier(saturday, 19), 1.5);
        assert_eq!(policy.modifier(monday, 19), 1.3);
        assert_eq!(policy.modifier(monday, 7), 0.8);
        assert_eq!(policy.modifier(monday, 12), 1.0);
        assert_eq!(policy.modifier(saturday, 7), 1.0);
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(50, 1.5), 75);
        assert_eq!(round_price(50, 0.8), 40);
        assert_eq!(round_price(33, 1.3), 43); // 42.9 rounds up
        assert_eq!(round_price(10, 1.0), 10);
    }

    #[test]
    fn test_date_window() {
        let gen = generator();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        assert!(gen.validate_date(today, today).is_ok());
        assert!(gen
            .validate_date(today + chrono::Duration::days(14), today)
            .is_ok());
        assert!(matches!(
            gen.validate_date(today + chrono::Duration::days(15), today),
            Err(BookingError::InvalidDateRange)
        ));
        assert!(matches!(
            gen.validate_date(today - chrono::Duration::days(1), today),
            Err(BookingError::InvalidDateRange)
        ));
    }

    #[test]
    fn test_lottery_classification() {
        let gen = generator();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let f = facility(50, true);

        // Weekday evening hits the 1.3 threshold
        let slot = gen.derive_slot(&f, monday, t(19), today, &[]).unwrap();
        assert_eq!(slot.booking_type, BookingType::Lottery);
        assert_eq!(slot.final_price, 65);

        // Midday is baseline and direct
        let slot = gen.derive_slot(&f, monday, t(12), today, &[]).unwrap();
        assert_eq!(slot.booking_type, BookingType::Direct);
        assert_eq!(slot.final_price, 50);

        // Lottery disabled facility never classifies as lottery
        let f_direct = facility(50, false);
        let slot = gen.derive_slot(&f_direct, monday, t(19), today, &[]).unwrap();
        assert_eq!(slot.booking_type, BookingType::Direct);
    }

    #[test]
    fn test_occupancy() {
        assert_eq!(slot_occupancy(&[], t(10)), SlotStatus::Open);

        let confirmed = booking(t(10), BookingStatus::Confirmed);
        assert_eq!(slot_occupancy(&[confirmed], t(10)), SlotStatus::Booked);

        let pending = booking(t(10), BookingStatus::PendingLottery);
        assert_eq!(slot_occupancy(&[pending], t(10)), SlotStatus::Held);

        // Pending at another hour does not touch this slot
        let other = booking(t(11), BookingStatus::PendingLottery);
        assert_eq!(slot_occupancy(&[other], t(10)), SlotStatus::Open);

        // An occupying status wins over placeholders
        let pending = booking(t(10), BookingStatus::PendingLottery);
        let no_show = booking(t(10), BookingStatus::NoShow);
        assert_eq!(slot_occupancy(&[pending, no_show], t(10)), SlotStatus::Booked);
    }

    #[test]
    fn test_generate_covers_operating_hours() {
        let gen = generator();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let f = facility(50, true);

        let slots = gen.generate(&f, monday, today, &[]).unwrap();
        assert_eq!(slots.len(), 12); // 10:00 .. 21:00 starts
        assert_eq!(slots.first().unwrap().start_time, t(10));
        assert_eq!(slots.last().unwrap().start_time, t(21));
        assert_eq!(slots.last().unwrap().end_time, t(22));
    }

    #[test]
    fn test_derive_slot_off_grid() {
        let gen = generator();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let f = facility(50, true);

        let off_grid = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert!(matches!(
            gen.derive_slot(&f, monday, off_grid, today, &[]),
            Err(BookingError::SlotUnavailable)
        ));
        assert!(matches!(
            gen.derive_slot(&f, monday, t(9), today, &[]),
            Err(BookingError::SlotUnavailable)
        ));
        assert!(matches!(
            gen.derive_slot(&f, monday, t(22), today, &[]),
            Err(BookingError::SlotUnavailable)
        ));
    }

    #[test]
    fn test_booked_slot_reported() {
        let gen = generator();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let f = facility(50, false);

        let existing = booking(t(12), BookingStatus::Confirmed);
        let slot = gen.derive_slot(&f, monday, t(12), today, &[existing]).unwrap();
        assert_eq!(slot.status, SlotStatus::Booked);
    }
}
