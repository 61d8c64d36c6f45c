//! Presentation partitions of a booking list. Computed on demand, never stored.

use chrono::NaiveDate;
use shared::BookingDetails;

/// Active bookings scheduled today or later.
pub fn upcoming(bookings: &[BookingDetails], today: NaiveDate) -> Vec<&BookingDetails> {
    bookings
        .iter()
        .filter(|d| d.status().is_active() && d.booking.scheduled_date >= today)
        .collect()
}

/// Finished bookings, plus anything whose date has gone by.
pub fn past(bookings: &[BookingDetails], today: NaiveDate) -> Vec<&BookingDetails> {
    bookings
        .iter()
        .filter(|d| d.status().is_terminal() || d.booking.scheduled_date < today)
        .collect()
}
