use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_GUESTS: u8 = 2;
pub const MAX_GUESTS: u8 = 10;
pub const CONFIRMATION_PREFIX: &str = "LL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occasion {
    #[default]
    Birthday,
    Business,
    Anniversary,
    Casual,
}

impl Occasion {
    pub const ALL: [Occasion; 4] = [
        Occasion::Birthday,
        Occasion::Business,
        Occasion::Anniversary,
        Occasion::Casual,
    ];
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Occasion::Birthday => "Birthday",
            Occasion::Business => "Business",
            Occasion::Anniversary => "Anniversary",
            Occasion::Casual => "Casual",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seating {
    #[default]
    Indoor,
    Courtyard,
    #[serde(rename = "Chef counter")]
    ChefCounter,
}

impl Seating {
    pub const ALL: [Seating; 3] = [Seating::Indoor, Seating::Courtyard, Seating::ChefCounter];
}

impl fmt::Display for Seating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seating::Indoor => "Indoor",
            Seating::Courtyard => "Courtyard",
            Seating::ChefCounter => "Chef counter",
        };
        f.write_str(label)
    }
}

/// The reservation being filled in across the availability and details steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub date: String,
    pub time: String,
    pub guests: u8,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub occasion: Occasion,
    pub seating: Seating,
    pub requests: String,
}

impl ReservationDraft {
    pub fn new(date: String, time: String) -> Self {
        Self {
            date,
            time,
            guests: DEFAULT_GUESTS,
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            occasion: Occasion::default(),
            seating: Seating::default(),
            requests: String::new(),
        }
    }
}

/// A confirmed reservation. Created once and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    pub confirmation: String,
    #[serde(flatten)]
    pub reservation: ReservationDraft,
}

impl Booking {
    pub fn confirm(reservation: ReservationDraft, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            confirmation: confirmation_code(),
            reservation,
        }
    }
}

pub fn confirmation_code() -> String {
    let number: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{CONFIRMATION_PREFIX}{number}")
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Date,
    Time,
    Guests,
    FullName,
    Email,
    Phone,
}

impl Field {
    /// Maps a struct field name as reported by `validator` to its form field.
    pub fn from_struct_field(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Field::Date),
            "time" => Some(Field::Time),
            "guests" => Some(Field::Guests),
            "full_name" => Some(Field::FullName),
            "email" => Some(Field::Email),
            "phone" => Some(Field::Phone),
            _ => None,
        }
    }
}

/// One message per offending field. Empty means the submission is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}
