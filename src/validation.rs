use crate::schedule::parse_calendar_date;
use crate::types::{Field, FieldErrors, Occasion, Seating, MAX_GUESTS};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

lazy_static! {
    static ref NON_BLANK: Regex = Regex::new(r"\S").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    // Empty is allowed, the phone number is optional.
    static ref PHONE_PATTERN: Regex = Regex::new(r"^(?:[0-9\s+().-]{7,})?$").unwrap();
}

pub const DATE_REQUIRED: &str = "Choose a date to continue.";
pub const DATE_MALFORMED: &str = "Enter the date as YYYY-MM-DD.";
pub const DATE_IN_PAST: &str = "Date must be today or later.";
pub const TIME_UNAVAILABLE: &str = "That time is no longer available.";
pub const GUESTS_OUT_OF_RANGE: &str = "Party size should be between 1 and 10 guests.";

/// Input of the availability step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AvailabilityForm {
    pub date: String,
    #[validate(length(min = 1, message = "Select a seating time."))]
    pub time: String,
    /// `0` means no party size was selected.
    #[validate(range(min = 1, message = "Select your party size."))]
    pub guests: u8,
}

/// Input of the details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    #[validate(regex(
        path = *NON_BLANK,
        message = "Please enter the name for this reservation."
    ))]
    pub full_name: String,
    #[validate(regex(
        path = *EMAIL_PATTERN,
        message = "Add a valid email so we can send your confirmation."
    ))]
    pub email: String,
    #[validate(regex(
        path = *PHONE_PATTERN,
        message = "Use digits and common characters like +, -, or parentheses."
    ))]
    pub phone: String,
    pub occasion: Occasion,
    pub seating: Seating,
    pub requests: String,
}

/// Checks every availability rule and reports all violations at once.
///
/// `time_slots` must be the slot list generated for `form.date`.
pub fn validate_availability(
    form: &AvailabilityForm,
    time_slots: &[String],
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = collect_field_errors(form.validate());

    if form.date.trim().is_empty() {
        errors.insert(Field::Date, DATE_REQUIRED);
    } else {
        match parse_calendar_date(&form.date) {
            None => errors.insert(Field::Date, DATE_MALFORMED),
            Some(date) if date < today => errors.insert(Field::Date, DATE_IN_PAST),
            Some(_) => {}
        }
    }

    if form.guests > MAX_GUESTS {
        errors.insert(Field::Guests, GUESTS_OUT_OF_RANGE);
    }

    if !errors.contains(Field::Time) && !time_slots.contains(&form.time) {
        errors.insert(Field::Time, TIME_UNAVAILABLE);
    }

    errors
}

pub fn validate_details(details: &ContactDetails) -> FieldErrors {
    collect_field_errors(details.validate())
}

fn collect_field_errors(result: Result<(), ValidationErrors>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Err(validation_errors) = result else {
        return errors;
    };

    for (name, field_errors) in validation_errors.field_errors() {
        let (Some(field), Some(error)) = (Field::from_struct_field(&name), field_errors.first())
        else {
            continue;
        };
        let message = match &error.message {
            Some(message) => message.to_string(),
            None => error.code.to_string(),
        };
        errors.insert(field, message);
    }
    errors
}
