use crate::schedule::format_long_date;
use crate::types::{Booking, ReservationDraft};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

pub const NO_BOOKINGS: &str = "No bookings yet. Submit the form to see them here.";

pub fn party_label(guests: u8) -> String {
    match guests {
        1 => "1 Guest".into(),
        n => format!("{n} Guests"),
    }
}

fn present(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Date, time and party size of the draft, shown while contact details are entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub date: String,
    pub time: String,
    pub party: String,
}

impl ReservationSummary {
    pub fn of(draft: &ReservationDraft, today: NaiveDate) -> Self {
        Self {
            date: format_long_date(&draft.date, today),
            time: draft.time.clone(),
            party: party_label(draft.guests),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub party: String,
    pub confirmation: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub occasion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<String>,
    pub seating: String,
}

impl BookingSummary {
    pub fn of(booking: &Booking, today: NaiveDate) -> Self {
        let reservation = &booking.reservation;
        Self {
            id: booking.id,
            date: format_long_date(&reservation.date, today),
            time: reservation.time.clone(),
            party: party_label(reservation.guests),
            confirmation: booking.confirmation.clone(),
            full_name: reservation.full_name.clone(),
            email: reservation.email.clone(),
            phone: present(&reservation.phone),
            occasion: reservation.occasion.to_string(),
            requests: present(&reservation.requests),
            seating: reservation.seating.to_string(),
        }
    }
}

impl fmt::Display for BookingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reservation #{}", self.confirmation)?;
        writeln!(f, "  {} at {}, {}", self.date, self.time, self.party)?;
        writeln!(f, "  Name: {}", self.full_name)?;
        writeln!(f, "  Email: {}", self.email)?;
        if let Some(phone) = &self.phone {
            writeln!(f, "  Phone: {phone}")?;
        }
        writeln!(f, "  Special occasion: {}", self.occasion)?;
        if let Some(requests) = &self.requests {
            writeln!(f, "  Requests: {requests}")?;
        }
        write!(f, "  Seating: {}", self.seating)
    }
}

/// What the bookings panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BookingsView {
    Empty { message: String },
    Bookings { bookings: Vec<BookingSummary> },
}

pub fn render_bookings(bookings: &[Booking], today: NaiveDate) -> BookingsView {
    if bookings.is_empty() {
        return BookingsView::Empty {
            message: NO_BOOKINGS.into(),
        };
    }
    BookingsView::Bookings {
        bookings: bookings
            .iter()
            .map(|booking| BookingSummary::of(booking, today))
            .collect(),
    }
}
