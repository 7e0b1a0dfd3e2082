use crate::clock::Clock;
use crate::schedule::{compute_default_date_time, generate_time_slots, Schedule};
use crate::types::{Booking, FieldErrors, ReservationDraft};
use crate::validation::{validate_availability, validate_details, AvailabilityForm, ContactDetails};
use serde::Serialize;
use std::mem;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The three mutually exclusive views of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Availability,
    Details,
    Confirmed {
        #[serde(rename = "bookingId")]
        booking_id: Uuid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChangeDate,
    SubmitAvailability,
    SubmitDetails,
    GoBack,
    EditDetails,
    Reset,
}

impl Step {
    pub fn accepts(&self, action: Action) -> bool {
        matches!(
            (self, action),
            (Step::Availability, Action::ChangeDate)
                | (Step::Availability, Action::SubmitAvailability)
                | (Step::Details, Action::SubmitDetails)
                | (Step::Details, Action::GoBack)
                | (Step::Confirmed { .. }, Action::EditDetails)
                | (Step::Confirmed { .. }, Action::Reset)
        )
    }
}

/// Something the user asked for on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ChangeDate(String),
    SubmitAvailability(AvailabilityForm),
    SubmitDetails(ContactDetails),
    GoBack,
    EditDetails,
    Reset,
}

impl Intent {
    pub fn action(&self) -> Action {
        match self {
            Intent::ChangeDate(_) => Action::ChangeDate,
            Intent::SubmitAvailability(_) => Action::SubmitAvailability,
            Intent::SubmitDetails(_) => Action::SubmitDetails,
            Intent::GoBack => Action::GoBack,
            Intent::EditDetails => Action::EditDetails,
            Intent::Reset => Action::Reset,
        }
    }
}

/// State of one booking session.
///
/// Every transition consumes the session and hands back the next one. Actions the
/// current step does not accept return the session unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    step: Step,
    draft: ReservationDraft,
    time_slots: Vec<String>,
    errors: FieldErrors,
    bookings: Vec<Booking>,
    #[serde(skip)]
    schedule: Schedule,
}

impl Session {
    pub fn new(schedule: Schedule, clock: &dyn Clock) -> Self {
        let selection = compute_default_date_time(clock.now(), &schedule);
        let time_slots = generate_time_slots(&selection.date, &schedule);
        Self {
            step: Step::Availability,
            draft: ReservationDraft::new(selection.date, selection.time),
            time_slots,
            errors: FieldErrors::new(),
            bookings: vec![],
            schedule,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &ReservationDraft {
        &self.draft
    }

    pub fn time_slots(&self) -> &[String] {
        &self.time_slots
    }

    /// Messages from the last rejected submission.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// All confirmed bookings in creation order.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn latest_booking(&self) -> Option<&Booking> {
        self.bookings.iter().max_by_key(|booking| booking.created_at)
    }

    /// The booking shown by the confirmation view.
    pub fn confirmed_booking(&self) -> Option<&Booking> {
        match self.step {
            Step::Confirmed { booking_id } => {
                self.bookings.iter().find(|booking| booking.id == booking_id)
            }
            _ => None,
        }
    }

    pub fn apply(self, intent: Intent, clock: &dyn Clock) -> Self {
        match intent {
            Intent::ChangeDate(date) => self.change_date(&date),
            Intent::SubmitAvailability(form) => self.submit_availability(form, clock),
            Intent::SubmitDetails(details) => self.submit_details(details, clock),
            Intent::GoBack => self.go_back(),
            Intent::EditDetails => self.edit_details(),
            Intent::Reset => self.reset(clock),
        }
    }

    /// Same as [`Session::apply`] for a session behind a shared reference.
    pub fn apply_in_place(&mut self, intent: Intent, clock: &dyn Clock) {
        let placeholder = Self::placeholder(self.schedule);
        let current = mem::replace(self, placeholder);
        *self = current.apply(intent, clock);
    }

    fn placeholder(schedule: Schedule) -> Self {
        Self {
            step: Step::Availability,
            draft: ReservationDraft::new(String::new(), String::new()),
            time_slots: vec![],
            errors: FieldErrors::new(),
            bookings: vec![],
            schedule,
        }
    }

    pub fn change_date(mut self, date: &str) -> Self {
        if !self.permits(Action::ChangeDate) {
            return self;
        }

        let time_slots = generate_time_slots(date, &self.schedule);
        if !time_slots.contains(&self.draft.time) {
            self.draft.time = time_slots.first().cloned().unwrap_or_default();
        }
        debug!(date, time = %self.draft.time, slots = time_slots.len(), "Date changed");
        self.draft.date = date.to_string();
        self.time_slots = time_slots;
        self
    }

    pub fn submit_availability(mut self, form: AvailabilityForm, clock: &dyn Clock) -> Self {
        if !self.permits(Action::SubmitAvailability) {
            return self;
        }

        let time_slots = generate_time_slots(&form.date, &self.schedule);
        let errors = validate_availability(&form, &time_slots, clock.now().date());
        if !errors.is_empty() {
            info!(?errors, "Availability rejected");
            self.errors = errors;
            return self;
        }

        self.draft.date = form.date;
        self.draft.time = form.time;
        self.draft.guests = form.guests;
        self.time_slots = time_slots;
        self.move_to(Step::Details)
    }

    pub fn submit_details(mut self, details: ContactDetails, clock: &dyn Clock) -> Self {
        if !self.permits(Action::SubmitDetails) {
            return self;
        }

        let errors = validate_details(&details);
        if !errors.is_empty() {
            info!(?errors, "Contact details rejected");
            self.errors = errors;
            return self;
        }

        let ContactDetails {
            full_name,
            email,
            phone,
            occasion,
            seating,
            requests,
        } = details;
        self.draft.full_name = full_name;
        self.draft.email = email;
        self.draft.phone = phone;
        self.draft.occasion = occasion;
        self.draft.seating = seating;
        self.draft.requests = requests;

        let booking = Booking::confirm(self.draft.clone(), clock.now());
        let booking_id = booking.id;
        info!(
            id = %booking.id,
            confirmation = %booking.confirmation,
            date = %booking.reservation.date,
            time = %booking.reservation.time,
            guests = booking.reservation.guests,
            "Reservation confirmed"
        );
        self.bookings.push(booking);
        self.move_to(Step::Confirmed { booking_id })
    }

    pub fn go_back(self) -> Self {
        if !self.permits(Action::GoBack) {
            return self;
        }
        self.move_to(Step::Availability)
    }

    pub fn edit_details(self) -> Self {
        if !self.permits(Action::EditDetails) {
            return self;
        }
        self.move_to(Step::Details)
    }

    /// Starts a new reservation. Confirmed bookings are kept.
    pub fn reset(mut self, clock: &dyn Clock) -> Self {
        if !self.permits(Action::Reset) {
            return self;
        }

        let selection = compute_default_date_time(clock.now(), &self.schedule);
        self.time_slots = generate_time_slots(&selection.date, &self.schedule);
        self.draft = ReservationDraft::new(selection.date, selection.time);
        self.move_to(Step::Availability)
    }

    fn permits(&self, action: Action) -> bool {
        let accepted = self.step.accepts(action);
        if !accepted {
            warn!(step = ?self.step, ?action, "Action not accepted in current step");
        }
        accepted
    }

    fn move_to(mut self, step: Step) -> Self {
        info!(from = ?self.step, to = ?step, "Reservation step changed");
        self.errors = FieldErrors::new();
        self.step = step;
        self
    }
}
