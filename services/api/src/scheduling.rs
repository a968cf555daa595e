//! Slot availability engine
//!
//! Computes the free booking slots for a barber on a given day and provides
//! the interval-overlap test used again on the booking write path. All
//! wall-clock values are interpreted as UTC.
//!
//! Slots are stepped every [`SLOT_STEP_MINUTES`] minutes through the business
//! hours. When listing, each candidate window is one step long; when
//! validating a concrete booking the window uses the order type's own
//! duration instead.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::OrderType;

/// Step between candidate slot start times, in minutes.
pub const SLOT_STEP_MINUTES: i64 = 30;

/// Business hours of the shop. Candidate slots start at opening time and the
/// last one starts strictly before closing time.
#[derive(Debug, Clone, Copy)]
pub struct BusinessHours {
    opening: NaiveTime,
    closing: NaiveTime,
}

impl BusinessHours {
    pub fn new(opening: NaiveTime, closing: NaiveTime) -> Self {
        Self { opening, closing }
    }

    /// Create business hours from environment variables
    ///
    /// # Environment Variables
    /// - `OPENING_TIME`: shop opening, "HH:MM" (default: "09:00")
    /// - `CLOSING_TIME`: shop closing, "HH:MM" (default: "20:30")
    pub fn from_env() -> Result<Self> {
        let opening = match std::env::var("OPENING_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| anyhow::anyhow!("Invalid OPENING_TIME '{}': {}", raw, e))?,
            Err(_) => default_opening(),
        };
        let closing = match std::env::var("CLOSING_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| anyhow::anyhow!("Invalid CLOSING_TIME '{}': {}", raw, e))?,
            Err(_) => default_closing(),
        };
        if opening >= closing {
            anyhow::bail!("OPENING_TIME must be before CLOSING_TIME");
        }
        Ok(Self::new(opening, closing))
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self::new(default_opening(), default_closing())
    }
}

fn default_opening() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("valid opening time")
}

fn default_closing() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 30, 0).expect("valid closing time")
}

/// Exclusive interval overlap: two intervals conflict only if they share more
/// than a boundary instant. A booking ending at 10:30 does not conflict with
/// one starting at 10:30.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// List the available slot start times ("HH:MM", ascending) for one day,
/// given the bookings already taken for that barber.
///
/// A slot is available when no booked interval overlaps its step-sized
/// candidate window.
pub fn available_slots(
    date: NaiveDate,
    hours: BusinessHours,
    booked: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<String> {
    let step = Duration::minutes(SLOT_STEP_MINUTES);
    let closing = date.and_time(hours.closing).and_utc();

    let mut slots = Vec::new();
    let mut current = date.and_time(hours.opening).and_utc();
    while current < closing {
        let candidate_end = current + step;
        let taken = booked
            .iter()
            .any(|&(start, end)| intervals_overlap(current, candidate_end, start, end));
        if !taken {
            slots.push(current.format("%H:%M").to_string());
        }
        current += step;
    }

    slots
}

/// Compute the `[start, end)` window of a concrete booking request: the end
/// time is derived from the order type's duration.
pub fn booking_window(
    date: NaiveDate,
    start: NaiveTime,
    order_type: OrderType,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(start).and_utc();
    let end = start + Duration::minutes(order_type.duration_minutes());
    (start, end)
}

/// The `[start of day, start of next day)` range used to fetch one day's
/// bookings.
pub fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        date()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).expect("valid time"))
            .and_utc()
    }

    #[test]
    fn overlap_is_exclusive_at_boundaries() {
        // Touching intervals do not conflict.
        assert!(!intervals_overlap(at(10, 0), at(10, 30), at(10, 30), at(11, 0)));
        assert!(!intervals_overlap(at(10, 30), at(11, 0), at(10, 0), at(10, 30)));
        // Any shared interior instant does.
        assert!(intervals_overlap(at(10, 0), at(10, 30), at(10, 15), at(10, 45)));
        assert!(intervals_overlap(at(10, 0), at(11, 0), at(10, 15), at(10, 30)));
        assert!(intervals_overlap(at(10, 15), at(10, 30), at(10, 0), at(11, 0)));
    }

    #[test]
    fn empty_day_lists_every_step() {
        let slots = available_slots(date(), BusinessHours::default(), &[]);
        // 09:00 through 20:00 inclusive, every 30 minutes.
        assert_eq!(slots.len(), 23);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("20:00"));
    }

    #[test]
    fn booked_slot_is_omitted_and_neighbours_remain() {
        let booked = vec![(at(10, 0), at(10, 30))];
        let slots = available_slots(date(), BusinessHours::default(), &booked);
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"10:30".to_string()));
    }

    #[test]
    fn long_booking_blocks_every_step_it_covers() {
        // A 45-minute home-service booking at 11:00 spills into the 11:30 step.
        let booked = vec![(at(11, 0), at(11, 45))];
        let slots = available_slots(date(), BusinessHours::default(), &booked);
        assert!(!slots.contains(&"11:00".to_string()));
        assert!(!slots.contains(&"11:30".to_string()));
        assert!(slots.contains(&"12:00".to_string()));
    }

    #[test]
    fn slots_are_ordered_ascending() {
        let booked = vec![(at(12, 0), at(12, 30)), (at(9, 30), at(10, 0))];
        let slots = available_slots(date(), BusinessHours::default(), &booked);
        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }

    #[test]
    fn booking_window_uses_type_specific_duration() {
        let start = NaiveTime::from_hms_opt(10, 0, 0).expect("valid time");
        let (s, e) = booking_window(date(), start, OrderType::InShop);
        assert_eq!(e - s, Duration::minutes(30));
        let (s, e) = booking_window(date(), start, OrderType::HomeService);
        assert_eq!(e - s, Duration::minutes(45));
        assert_eq!(s, at(10, 0));
    }

    #[test]
    fn day_range_covers_whole_day_half_open() {
        let (start, end) = day_range(date());
        assert_eq!(start, at(0, 0));
        assert_eq!(end - start, Duration::days(1));
    }
}
