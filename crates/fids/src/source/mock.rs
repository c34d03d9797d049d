//! Random flight generator used when the board runs on mock data.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{FlightSource, SourceError};
use crate::flight::{sort_by_departure, Category, FlightDirection, FlightRecord, FlightStatus};

const AIRLINES: [&str; 14] = [
    "Air India",
    "IndiGo",
    "SpiceJet",
    "Vistara",
    "GoAir",
    "AirAsia India",
    "Emirates",
    "Qatar Airways",
    "Singapore Airlines",
    "British Airways",
    "Lufthansa",
    "Turkish Airlines",
    "Thai Airways",
    "Malaysia Airlines",
];

const DOMESTIC_DESTINATIONS: [&str; 10] = [
    "Mumbai (BOM)",
    "Delhi (DEL)",
    "Bangalore (BLR)",
    "Hyderabad (HYD)",
    "Kolkata (CCU)",
    "Pune (PNQ)",
    "Ahmedabad (AMD)",
    "Goa (GOI)",
    "Kochi (COK)",
    "Trivandrum (TRV)",
];

const INTERNATIONAL_DESTINATIONS: [&str; 8] = [
    "Dubai (DXB)",
    "Singapore (SIN)",
    "Kuala Lumpur (KUL)",
    "Bangkok (BKK)",
    "London (LHR)",
    "Frankfurt (FRA)",
    "Paris (CDG)",
    "Amsterdam (AMS)",
];

const AIRCRAFT_TYPES: [&str; 9] = [
    "A320", "A321", "A330", "A350", "B737", "B777", "B787", "ATR 72", "Q400",
];

// Weighted: on-time is three times as likely as the others.
const STATUSES: [FlightStatus; 7] = [
    FlightStatus::OnTime,
    FlightStatus::OnTime,
    FlightStatus::OnTime,
    FlightStatus::Boarding,
    FlightStatus::Delayed,
    FlightStatus::Scheduled,
    FlightStatus::Cancelled,
];

const GATES: [&str; 11] = [
    "A1", "A2", "A3", "B1", "B2", "B3", "C1", "C2", "C3", "D1", "D2",
];

const TERMINALS: [&str; 3] = ["1", "2", "3"];

/// Generates random departures from a fixed origin.
///
/// Each fetch produces a fresh set after a simulated network delay. With a
/// category, destinations are drawn only from that category's pool.
#[derive(Debug)]
pub struct MockSource {
    count: usize,
    origin: String,
    latency_ms: (u64, u64),
    seeded: Option<Mutex<StdRng>>,
}

impl MockSource {
    /// Create a generator producing `count` flights per fetch, without latency.
    #[must_use]
    pub fn new(count: usize, origin: impl Into<String>) -> Self {
        Self {
            count,
            origin: origin.into(),
            latency_ms: (0, 0),
            seeded: None,
        }
    }

    /// Simulate a response delay drawn from `[low, high]` milliseconds.
    #[must_use]
    pub fn with_latency(mut self, low: u64, high: u64) -> Self {
        self.latency_ms = (low.min(high), high.max(low));
        self
    }

    /// Use a deterministic generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seeded = Some(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Generate a batch of flights departing within `window` of `now`.
    #[must_use]
    pub fn generate(
        &self,
        category: Option<Category>,
        window: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Vec<FlightRecord> {
        match &self.seeded {
            Some(rng) => match rng.lock() {
                Ok(mut rng) => self.generate_with(&mut *rng, category, window, now),
                Err(poisoned) => {
                    self.generate_with(&mut *poisoned.into_inner(), category, window, now)
                }
            },
            None => self.generate_with(&mut rand::rng(), category, window, now),
        }
    }

    fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: Option<Category>,
        window: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Vec<FlightRecord> {
        let window_secs = window.num_seconds().max(1);

        let mut flights: Vec<FlightRecord> = (0..self.count)
            .map(|i| {
                let departure = now + chrono::Duration::seconds(rng.random_range(0..window_secs));
                let status = STATUSES[rng.random_range(0..STATUSES.len())];

                let actual_departure = match status {
                    FlightStatus::Delayed => {
                        Some(departure + chrono::Duration::minutes(rng.random_range(15..=60)))
                    }
                    FlightStatus::OnTime | FlightStatus::Boarding => Some(departure),
                    _ => None,
                };

                let prefix: String = pick(rng, &AIRLINES)
                    .split(' ')
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(2)
                    .collect::<String>()
                    .to_uppercase();
                let flight_number = format!("{prefix}{}", rng.random_range(1000..10_000u32));

                let destination = match category {
                    Some(Category::Domestic) => pick(rng, &DOMESTIC_DESTINATIONS),
                    Some(Category::International) => pick(rng, &INTERNATIONAL_DESTINATIONS),
                    None => {
                        let all = DOMESTIC_DESTINATIONS.len() + INTERNATIONAL_DESTINATIONS.len();
                        let n = rng.random_range(0..all);
                        DOMESTIC_DESTINATIONS
                            .get(n)
                            .or_else(|| INTERNATIONAL_DESTINATIONS.get(n - DOMESTIC_DESTINATIONS.len()))
                            .copied()
                            .unwrap_or(DOMESTIC_DESTINATIONS[0])
                    }
                };

                let flight_minutes = rng.random_range(60..=9 * 60);
                let gate = (status != FlightStatus::Cancelled).then(|| pick(rng, &GATES).to_string());

                FlightRecord {
                    id: format!("mock-{}", i + 1),
                    flight_number,
                    airline: pick(rng, &AIRLINES).to_string(),
                    aircraft_type: Some(pick(rng, &AIRCRAFT_TYPES).to_string()),
                    origin: Some(self.origin.clone()),
                    destination: Some(destination.to_string()),
                    scheduled_departure: Some(departure),
                    scheduled_arrival: Some(departure + chrono::Duration::minutes(flight_minutes)),
                    actual_departure,
                    actual_arrival: None,
                    gate,
                    terminal: Some(pick(rng, &TERMINALS).to_string()),
                    status,
                    direction: FlightDirection::Departure,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        sort_by_departure(&mut flights);
        flights
    }

    fn latency(&self) -> Duration {
        let (low, high) = self.latency_ms;
        if high == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(low..=high))
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

#[async_trait::async_trait]
impl FlightSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_upcoming(
        &self,
        category: Option<Category>,
        window: chrono::Duration,
    ) -> Result<Vec<FlightRecord>, SourceError> {
        let delay = self.latency();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let flights = self.generate(category, window, Utc::now());
        debug!(count = flights.len(), ?category, "Generated mock flights");
        Ok(flights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> chrono::Duration {
        chrono::Duration::hours(3)
    }

    #[test]
    fn test_generates_requested_count_sorted() {
        let source = MockSource::new(15, "Chennai (MAA)").with_seed(7);
        let flights = source.generate(None, window(), Utc::now());

        assert_eq!(flights.len(), 15);
        assert!(flights
            .windows(2)
            .all(|w| w[0].scheduled_departure <= w[1].scheduled_departure));
    }

    #[test]
    fn test_departures_fall_inside_window() {
        let now = Utc::now();
        let source = MockSource::new(50, "Chennai (MAA)").with_seed(1);

        for flight in source.generate(None, window(), now) {
            let departure = flight.scheduled_departure.unwrap();
            assert!(departure >= now);
            assert!(departure < now + window());
            assert_eq!(flight.origin.as_deref(), Some("Chennai (MAA)"));
            assert_eq!(flight.direction, FlightDirection::Departure);
        }
    }

    #[test]
    fn test_category_selects_destination_pool() {
        let source = MockSource::new(40, "Chennai (MAA)").with_seed(3);

        let domestic = source.generate(Some(Category::Domestic), window(), Utc::now());
        assert!(domestic.iter().all(|f| f.category() == Category::Domestic));

        let international = source.generate(Some(Category::International), window(), Utc::now());
        assert!(international
            .iter()
            .all(|f| f.category() == Category::International));
    }

    #[test]
    fn test_status_rules() {
        let source = MockSource::new(200, "Chennai (MAA)").with_seed(11);

        for flight in source.generate(None, window(), Utc::now()) {
            let departure = flight.scheduled_departure.unwrap();
            match flight.status {
                FlightStatus::Cancelled => {
                    assert!(flight.gate.is_none());
                    assert!(flight.actual_departure.is_none());
                }
                FlightStatus::Delayed => {
                    let delay = flight.actual_departure.unwrap() - departure;
                    assert!(delay >= chrono::Duration::minutes(15));
                    assert!(delay <= chrono::Duration::minutes(60));
                }
                FlightStatus::OnTime | FlightStatus::Boarding => {
                    assert_eq!(flight.actual_departure, Some(departure));
                }
                _ => assert!(flight.actual_departure.is_none()),
            }

            let duration = flight.scheduled_arrival.unwrap() - departure;
            assert!(duration >= chrono::Duration::hours(1));
            assert!(duration <= chrono::Duration::hours(9));
        }
    }

    #[test]
    fn test_flight_number_shape() {
        let source = MockSource::new(30, "Chennai (MAA)").with_seed(5);

        for flight in source.generate(None, window(), Utc::now()) {
            let (prefix, digits) = flight.flight_number.split_at(2);
            assert!(prefix.chars().all(|c| c.is_ascii_uppercase()));
            let number: u32 = digits.parse().unwrap();
            assert!((1000..10_000).contains(&number));
        }
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let now = Utc::now();
        let a = MockSource::new(10, "X").with_seed(42).generate(None, window(), now);
        let b = MockSource::new(10, "X").with_seed(42).generate(None, window(), now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_latency_orders_bounds() {
        let source = MockSource::new(1, "X").with_latency(900, 100);
        assert_eq!(source.latency_ms, (100, 900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_latency() {
        let source = MockSource::new(4, "Chennai (MAA)").with_latency(500, 500);
        let started = tokio::time::Instant::now();

        let flights = source.fetch_upcoming(None, window()).await.unwrap();
        assert_eq!(flights.len(), 4);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
