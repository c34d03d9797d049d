//! Flight source backed by the local flight store.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::debug;

use super::{FlightSource, SourceError};
use crate::error::Error;
use crate::flight::{Category, FlightRecord};
use crate::storage::Storage;

/// Reads upcoming departures from a [`Storage`].
///
/// The query runs on the blocking pool so the board keeps ticking while the
/// database is busy. Category filtering is applied to the destination after
/// the window query.
#[derive(Debug, Clone)]
pub struct LiveSource {
    store: Arc<Mutex<Storage>>,
}

impl LiveSource {
    /// Create a source over a shared store.
    #[must_use]
    pub fn new(store: Arc<Mutex<Storage>>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl FlightSource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn fetch_upcoming(
        &self,
        category: Option<Category>,
        window: chrono::Duration,
    ) -> Result<Vec<FlightRecord>, SourceError> {
        let store = Arc::clone(&self.store);

        let flights = tokio::task::spawn_blocking(move || {
            let storage = store
                .lock()
                .map_err(|_| SourceError::transport("flight store lock poisoned"))?;
            let now = Utc::now();
            storage
                .upcoming(now, now + window)
                .map_err(|err| match err {
                    Error::DatabaseOpen { .. } | Error::Io(_) => {
                        SourceError::transport(err.to_string())
                    }
                    other => SourceError::query(other.to_string()),
                })
        })
        .await
        .map_err(|err| SourceError::transport(err.to_string()))??;

        let flights: Vec<FlightRecord> = match category {
            Some(category) => flights
                .into_iter()
                .filter(|flight| flight.category() == category)
                .collect(),
            None => flights,
        };

        debug!(count = flights.len(), ?category, "Fetched flights from store");
        Ok(flights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::NewFlight;

    fn shared_store() -> Arc<Mutex<Storage>> {
        Arc::new(Mutex::new(Storage::open_in_memory().unwrap()))
    }

    fn add(store: &Arc<Mutex<Storage>>, number: &str, destination: &str, minutes: i64) {
        let mut form = NewFlight::new(number, "IndiGo");
        form.destination = Some(destination.to_string());
        form.scheduled_departure = Some(Utc::now() + chrono::Duration::minutes(minutes));
        store.lock().unwrap().insert(form).unwrap();
    }

    #[tokio::test]
    async fn test_fetch_filters_by_category() {
        let store = shared_store();
        add(&store, "6E1", "Mumbai (BOM)", 30);
        add(&store, "EK1", "Dubai (DXB)", 40);
        add(&store, "6E2", "Goa (GOI)", 50);
        add(&store, "XX1", "Nowhere", 60);

        let source = LiveSource::new(store);
        let window = chrono::Duration::hours(3);

        let domestic = source
            .fetch_upcoming(Some(Category::Domestic), window)
            .await
            .unwrap();
        let numbers: Vec<_> = domestic.iter().map(|f| f.flight_number.as_str()).collect();
        assert_eq!(numbers, ["6E1", "6E2"]);

        let international = source
            .fetch_upcoming(Some(Category::International), window)
            .await
            .unwrap();
        let numbers: Vec<_> = international
            .iter()
            .map(|f| f.flight_number.as_str())
            .collect();
        assert_eq!(numbers, ["EK1", "XX1"]);

        let all = source.fetch_upcoming(None, window).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_respects_window() {
        let store = shared_store();
        add(&store, "SOON", "Delhi (DEL)", 30);
        add(&store, "LATE", "Delhi (DEL)", 5 * 60);
        add(&store, "GONE", "Delhi (DEL)", -10);

        let source = LiveSource::new(store);
        let flights = source
            .fetch_upcoming(None, chrono::Duration::hours(3))
            .await
            .unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].flight_number, "SOON");
    }

    #[tokio::test]
    async fn test_poisoned_store_is_transport_error() {
        let store = shared_store();
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        let source = LiveSource::new(store);
        let err = source
            .fetch_upcoming(None, chrono::Duration::hours(3))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
