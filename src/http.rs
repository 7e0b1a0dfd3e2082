use crate::clock::Clock;
use crate::configuration::{Configuration, RestaurantInfo};
use crate::reservation::{Action, Intent, Session, Step};
use crate::schedule::DATE_FORMAT;
use crate::summary::{
    render_bookings, BookingSummary, BookingsView, ReservationSummary, NO_BOOKINGS,
};
use crate::types::{Occasion, Seating, MAX_GUESTS};
use crate::validation::{AvailabilityForm, ContactDetails};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::fs;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const ARRIVAL_NOTES: [&str; 3] = [
    "Please arrive 10 minutes before your reservation time.",
    "To modify or cancel, give us a call.",
    "We'll send a reminder 24 hours before your reservation.",
];

#[derive(Clone)]
pub struct AppState<C: Configuration> {
    configuration: C,
    clock: Arc<dyn Clock>,
    session: Arc<Mutex<Session>>,
}

impl<C: Configuration> AppState<C> {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChangeDateRequest {
    date: String,
}

/// Everything the page needs to render the current step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    #[serde(flatten)]
    session: &'a Session,
    min_date: String,
    guest_options: Vec<u8>,
    occasions: Vec<Occasion>,
    seating_options: Vec<Seating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ReservationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmation: Option<BookingSummary>,
}

impl<'a> SessionView<'a> {
    fn of(session: &'a Session, today: NaiveDate) -> Self {
        let summary = match session.step() {
            Step::Details => Some(ReservationSummary::of(session.draft(), today)),
            _ => None,
        };
        Self {
            session,
            min_date: today.format(DATE_FORMAT).to_string(),
            guest_options: (1..=MAX_GUESTS).collect(),
            occasions: Occasion::ALL.to_vec(),
            seating_options: Seating::ALL.to_vec(),
            summary,
            confirmation: session
                .confirmed_booking()
                .map(|booking| BookingSummary::of(booking, today)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantView {
    #[serde(flatten)]
    info: RestaurantInfo,
    hours: String,
    notes: Vec<&'static str>,
}

pub fn create_app<C: Configuration>(configuration: C, clock: Arc<dyn Clock>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let session = Session::new(configuration.schedule(), clock.as_ref());
    let state = AppState {
        configuration,
        clock,
        session: Arc::new(Mutex::new(session)),
    };

    let page = Router::new()
        .route("/frontend", get(get_frontend::<C>))
        .route("/restaurant", get(get_restaurant::<C>))
        .route("/bookings", get(get_bookings::<C>))
        .route("/bookings/latest", get(get_latest_booking::<C>));

    let reservation = Router::new()
        .route("/reservation", get(get_reservation::<C>))
        .route("/reservation/date", post(change_date::<C>))
        .route("/reservation/availability", post(submit_availability::<C>))
        .route("/reservation/details", post(submit_details::<C>))
        .route("/reservation/back", post(go_back::<C>))
        .route("/reservation/edit", post(edit_details::<C>))
        .route("/reservation/reset", post(reset::<C>));

    Router::new()
        .merge(page)
        .merge(reservation)
        .with_state(state)
        .layer(cors)
}

fn apply_intent<C: Configuration>(state: &AppState<C>, intent: Intent) -> Response {
    let action = intent.action();
    let today = state.today();
    let mut session = state.session();

    if !session.step().accepts(action) {
        warn!(step = ?session.step(), ?action, "Rejected intent");
        return (
            StatusCode::CONFLICT,
            format!("{action:?} is not possible in the current step"),
        )
            .into_response();
    }

    session.apply_in_place(intent, state.clock.as_ref());

    if action == Action::SubmitDetails {
        if let Some(booking) = session.confirmed_booking() {
            info!("\n{}", BookingSummary::of(booking, today));
        }
    }

    Json(SessionView::of(&session, today)).into_response()
}

async fn get_reservation<C: Configuration>(State(state): State<AppState<C>>) -> Response {
    let session = state.session();
    Json(SessionView::of(&session, state.today())).into_response()
}

async fn change_date<C: Configuration>(
    State(state): State<AppState<C>>,
    Json(request): Json<ChangeDateRequest>,
) -> Response {
    apply_intent(&state, Intent::ChangeDate(request.date))
}

async fn submit_availability<C: Configuration>(
    State(state): State<AppState<C>>,
    Json(form): Json<AvailabilityForm>,
) -> Response {
    apply_intent(&state, Intent::SubmitAvailability(form))
}

async fn submit_details<C: Configuration>(
    State(state): State<AppState<C>>,
    Json(details): Json<ContactDetails>,
) -> Response {
    apply_intent(&state, Intent::SubmitDetails(details))
}

async fn go_back<C: Configuration>(State(state): State<AppState<C>>) -> Response {
    apply_intent(&state, Intent::GoBack)
}

async fn edit_details<C: Configuration>(State(state): State<AppState<C>>) -> Response {
    apply_intent(&state, Intent::EditDetails)
}

async fn reset<C: Configuration>(State(state): State<AppState<C>>) -> Response {
    apply_intent(&state, Intent::Reset)
}

async fn get_bookings<C: Configuration>(State(state): State<AppState<C>>) -> Json<BookingsView> {
    let session = state.session();
    Json(render_bookings(session.bookings(), state.today()))
}

async fn get_latest_booking<C: Configuration>(
    State(state): State<AppState<C>>,
) -> Result<Json<BookingSummary>, (StatusCode, String)> {
    let session = state.session();
    match session.latest_booking() {
        Some(booking) => Ok(Json(BookingSummary::of(booking, state.today()))),
        None => Err((StatusCode::NOT_FOUND, NO_BOOKINGS.to_string())),
    }
}

async fn get_restaurant<C: Configuration>(State(state): State<AppState<C>>) -> Json<RestaurantView> {
    Json(RestaurantView {
        info: state.configuration.restaurant(),
        hours: state.configuration.schedule().hours_label(),
        notes: ARRIVAL_NOTES.to_vec(),
    })
}

async fn get_frontend<C: Configuration>(
    State(state): State<AppState<C>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let path = state.configuration.frontend_path();

    match fs::read_to_string(&path).await {
        Ok(contents) => Ok(Html(contents)),
        Err(err) => {
            error!(?err, path = %path.display(), "Failed to read frontend file");
            let error_message = format!("Failed to read frontend file: {}", err);
            Err((StatusCode::INTERNAL_SERVER_ERROR, error_message))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::{fixed_clock, local_time, spawn_app, TestConfiguration};
    use reqwest::Client;
    use serde_json::{json, Value};
    use std::io::Write;

    async fn init() -> (tokio::task::JoinHandle<()>, String, TestConfiguration) {
        let configuration = TestConfiguration::new();
        let clock = Arc::new(fixed_clock(local_time("2026-10-16", "12:00")));
        let (server, base_url) = spawn_app(configuration.clone(), clock).await;
        (server, base_url, configuration)
    }

    async fn post(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
        let response = client.post(url).json(&body).send().await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        let body = if status == StatusCode::OK {
            response.json().await.unwrap()
        } else {
            Value::String(response.text().await.unwrap())
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_initial_reservation() {
        let (server, base_url, _) = init().await;

        let response: Value = reqwest::get(format!("{base_url}/reservation"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(response["step"], "availability");
        assert_eq!(response["draft"]["date"], "2026-10-16");
        assert_eq!(response["draft"]["time"], "17:00");
        assert_eq!(response["timeSlots"].as_array().unwrap().len(), 19);
        assert_eq!(response["minDate"], "2026-10-16");
        assert_eq!(response["guestOptions"].as_array().unwrap().len(), 10);
        assert_eq!(response["occasions"][1], "Business");
        assert_eq!(
            response["seatingOptions"],
            json!(["Indoor", "Courtyard", "Chef counter"])
        );
        assert_eq!(response["draft"]["seating"], "Indoor");
        assert!(response.get("summary").is_none());

        server.abort();
    }

    #[tokio::test]
    async fn test_booking_flow() {
        let (server, base_url, _) = init().await;
        let client = Client::new();

        let (status, view) = post(
            &client,
            format!("{base_url}/reservation/date"),
            json!({ "date": "2026-10-18" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["draft"]["date"], "2026-10-18");

        let (status, view) = post(
            &client,
            format!("{base_url}/reservation/availability"),
            json!({ "date": "2026-10-18", "time": "17:00", "guests": 4 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "details");
        assert_eq!(view["summary"]["date"], "Sunday, October 18, 2026");
        assert_eq!(view["summary"]["party"], "4 Guests");

        let (status, view) = post(
            &client,
            format!("{base_url}/reservation/details"),
            json!({
                "fullName": "Jamie Doe",
                "email": "jamie@example.com",
                "phone": "3125550101",
                "occasion": "Business",
                "seating": "Chef counter",
                "requests": "Window seat please"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "confirmed");
        assert_eq!(view["confirmation"]["fullName"], "Jamie Doe");
        assert_eq!(view["confirmation"]["occasion"], "Business");
        assert_eq!(view["confirmation"]["seating"], "Chef counter");
        assert_eq!(view["bookingId"], view["confirmation"]["id"]);
        let code = view["confirmation"]["confirmation"].as_str().unwrap();
        assert!(code.starts_with("LL"));
        assert_eq!(code.len(), 8);

        let bookings: Value = reqwest::get(format!("{base_url}/bookings"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(bookings["kind"], "bookings");
        assert_eq!(bookings["bookings"][0]["confirmation"], code);

        let latest: Value = reqwest::get(format!("{base_url}/bookings/latest"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(latest["requests"], "Window seat please");

        let (status, view) =
            post(&client, format!("{base_url}/reservation/reset"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "availability");
        assert_eq!(view["draft"]["fullName"], "");
        assert_eq!(view["bookings"].as_array().unwrap().len(), 1);

        server.abort();
    }

    #[tokio::test]
    async fn test_validation_errors_are_returned_as_data() {
        let (server, base_url, _) = init().await;
        let client = Client::new();

        let (status, view) = post(
            &client,
            format!("{base_url}/reservation/availability"),
            json!({ "date": "2026-10-01", "time": "", "guests": 0 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "availability");
        assert_eq!(view["errors"]["date"], "Date must be today or later.");
        assert_eq!(view["errors"]["time"], "Select a seating time.");
        assert_eq!(view["errors"]["guests"], "Select your party size.");

        let (status, view) = post(
            &client,
            format!("{base_url}/reservation/availability"),
            json!({ "date": "2026-10-18", "time": "17:00", "guests": 12 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "availability");
        assert_eq!(
            view["errors"]["guests"],
            "Party size should be between 1 and 10 guests."
        );

        server.abort();
    }

    #[test_case::test_case("back", json!({}); "back")]
    #[test_case::test_case("edit", json!({}); "edit")]
    #[test_case::test_case("reset", json!({}); "reset")]
    #[test_case::test_case("details", json!({ "fullName": "Jamie", "email": "a@b.co" }); "details")]
    #[tokio::test]
    async fn test_intents_outside_their_step(path: &str, body: Value) {
        let (server, base_url, _) = init().await;
        let client = Client::new();

        let (status, _) = post(&client, format!("{base_url}/reservation/{path}"), body).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let view: Value = reqwest::get(format!("{base_url}/reservation"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["step"], "availability");

        server.abort();
    }

    #[tokio::test]
    async fn test_empty_bookings() {
        let (server, base_url, _) = init().await;

        let bookings: Value = reqwest::get(format!("{base_url}/bookings"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(bookings["kind"], "empty");
        assert_eq!(bookings["message"], NO_BOOKINGS);

        let response = reqwest::get(format!("{base_url}/bookings/latest"))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());

        server.abort();
    }

    #[tokio::test]
    async fn test_get_restaurant() {
        let (server, base_url, _) = init().await;

        let info: Value = reqwest::get(format!("{base_url}/restaurant"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(info["name"], "Little Lemon");
        assert_eq!(info["hours"], "Seating daily: 5:00 PM - 9:30 PM");
        assert_eq!(info["notes"].as_array().unwrap().len(), 3);

        server.abort();
    }

    #[tokio::test]
    async fn test_get_frontend() {
        let (server, base_url, configuration) = init().await;
        let mut file = std::fs::File::create(configuration.frontend_path()).unwrap();
        writeln!(file, "<h1>Reserve a table</h1>").unwrap();

        let response = reqwest::get(format!("{base_url}/frontend")).await.unwrap();

        assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/html; charset=utf-8"
        );
        assert!(response
            .text()
            .await
            .unwrap()
            .contains("<h1>Reserve a table</h1>"));

        server.abort();
    }

    #[tokio::test]
    async fn test_missing_frontend() {
        let (server, base_url, _) = init().await;

        let response = reqwest::get(format!("{base_url}/frontend")).await.unwrap();
        assert_eq!(
            response.status().as_u16(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        );

        server.abort();
    }

    #[test]
    fn test_shipped_frontend_renders_from_the_session_view() {
        let page = include_str!("../frontend/index.html");

        assert!(page.contains("view.seatingOptions.map"));
        assert!(page.contains("view.occasions.map"));
        assert!(!page.contains("'Outdoor'"));
        // A date change must not drop the party size picked before submitting.
        assert!(page.contains("pending.guests ?? view.draft.guests"));
        assert!(page.contains("render(await request('POST', '/reservation/date', { date: date.value }), { guests })"));
    }
}
