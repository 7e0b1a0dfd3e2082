use crate::configuration::{Configuration, RestaurantInfo};
use crate::schedule::{Schedule, ScheduleError, SLOT_FORMAT};
use chrono::NaiveTime;
use clap::Parser;
use std::path::PathBuf;

fn parse_clock_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, SLOT_FORMAT)
}

#[derive(Debug, Clone, Parser)]
#[command(name = "table_reservations", about = "Restaurant table reservation page")]
pub struct ConfigurationHandler {
    #[arg(long, env = "PORT", default_value = "3000")]
    port: String,

    #[arg(long, env = "FRONTEND_PATH", default_value = "frontend/index.html")]
    frontend_path: PathBuf,

    /// First bookable slot, HH:MM
    #[arg(long, env = "OPENING_TIME", default_value = "17:00", value_parser = parse_clock_time)]
    opening_time: NaiveTime,

    /// Last bookable slot, HH:MM
    #[arg(long, env = "CLOSING_TIME", default_value = "21:30", value_parser = parse_clock_time)]
    closing_time: NaiveTime,

    /// Minutes between two slots
    #[arg(long, env = "SLOT_INTERVAL", default_value_t = 15)]
    slot_interval: i64,

    /// Hours between now and the slot preselected for a new reservation
    #[arg(long, env = "LEAD_TIME", default_value_t = 2)]
    lead_time: i64,

    #[arg(long, env = "RESTAURANT_NAME", default_value = "Little Lemon")]
    restaurant_name: String,

    #[arg(
        long,
        env = "RESTAURANT_ADDRESS",
        default_value = "123 Main Street, Chicago, IL 60601"
    )]
    address: String,

    #[arg(long, env = "RESTAURANT_PHONE", default_value = "(312) 555-0100")]
    phone: String,

    #[arg(skip)]
    schedule: Schedule,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Result<Self, ScheduleError> {
        Self::parse().checked()
    }

    fn checked(mut self) -> Result<Self, ScheduleError> {
        self.schedule = Schedule::new(
            self.opening_time,
            self.closing_time,
            self.slot_interval,
            self.lead_time,
        )?;
        Ok(self)
    }
}

impl Configuration for ConfigurationHandler {
    fn restaurant(&self) -> RestaurantInfo {
        RestaurantInfo {
            name: self.restaurant_name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
        }
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn schedule(&self) -> Schedule {
        self.schedule
    }
}
