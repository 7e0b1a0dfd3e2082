use crate::{
    clock::{Clock, MockClock},
    configuration::{Configuration, RestaurantInfo},
    http::create_app,
    schedule::{Schedule, DATE_FORMAT},
};
use chrono::{Duration, NaiveDateTime};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub fn local_time(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
}

pub fn fixed_clock(now: NaiveDateTime) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_now().return_const(now);
    clock
}

pub fn date_after(clock: &dyn Clock, days: i64) -> String {
    (clock.now().date() + Duration::days(days))
        .format(DATE_FORMAT)
        .to_string()
}

/// Default schedule, with the page served from a temporary directory.
#[derive(Clone)]
pub struct TestConfiguration {
    frontend_dir: Arc<TempDir>,
}

impl TestConfiguration {
    pub fn new() -> Self {
        Self {
            frontend_dir: Arc::new(TempDir::new().unwrap()),
        }
    }
}

impl Configuration for TestConfiguration {
    fn restaurant(&self) -> RestaurantInfo {
        RestaurantInfo {
            name: "Little Lemon".into(),
            address: "123 Main Street, Chicago, IL 60601".into(),
            phone: "(312) 555-0100".into(),
        }
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_dir.path().join("index.html")
    }

    fn port(&self) -> String {
        "0".into()
    }

    fn schedule(&self) -> Schedule {
        Schedule::default()
    }
}

pub async fn spawn_app<C: Configuration>(
    configuration: C,
    clock: Arc<dyn Clock>,
) -> (JoinHandle<()>, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = create_app(configuration, clock);
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (server, format!("http://{address}"))
}
