//! Storage layer for fids.
//!
//! This module provides the `SQLite`-backed flight store behind the live data
//! source and the CRUD commands: insertion, edits, deletion, filtered listing,
//! the upcoming-departures window query and summary statistics.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::flight::{FlightDirection, FlightRecord, FlightStatus, NewFlight};

const SELECT_COLUMNS: &str = r"
SELECT id, flight_number, airline, aircraft_type, origin, destination,
       scheduled_departure, scheduled_arrival, actual_departure, actual_arrival,
       gate, terminal, status, flight_type, created_at, updated_at
FROM flights
";

/// Filter for listing flights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightQuery {
    /// Case-insensitive substring over number, airline, origin and destination.
    pub search: Option<String>,
    /// Only flights with this status.
    pub status: Option<FlightStatus>,
    /// Only flights in this direction.
    pub direction: Option<FlightDirection>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

/// Summary counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlightStats {
    /// Number of departure records.
    pub total_departures: i64,
    /// Number of arrival records.
    pub total_arrivals: i64,
    /// Flights that are on time or simply scheduled.
    pub on_time: i64,
    /// Delayed flights.
    pub delayed: i64,
}

/// Flight store backed by `SQLite`.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a flight store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening flight store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Flight store opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing and demos.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a flight from form data.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the insert fails.
    pub fn insert(&self, form: NewFlight) -> Result<FlightRecord> {
        form.validate()?;
        let form = form.normalized();
        let now = Utc::now();

        let record = FlightRecord {
            id: uuid::Uuid::new_v4().to_string(),
            flight_number: form.flight_number,
            airline: form.airline,
            aircraft_type: form.aircraft_type,
            origin: form.origin,
            destination: form.destination,
            scheduled_departure: form.scheduled_departure,
            scheduled_arrival: form.scheduled_arrival,
            actual_departure: None,
            actual_arrival: None,
            gate: form.gate,
            terminal: form.terminal,
            status: form.status.unwrap_or(FlightStatus::Scheduled),
            direction: form.direction,
            created_at: now,
            updated_at: now,
        };

        self.insert_record(&record)?;
        // Read back so the caller sees times at the stored precision.
        self.get(&record.id)?
            .ok_or_else(|| Error::internal(format!("inserted flight {} vanished", record.id)))
    }

    /// Store a complete record as-is, keeping its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the id already exists or the insert fails.
    pub fn insert_record(&self, record: &FlightRecord) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO flights (
                id, flight_number, airline, aircraft_type, origin, destination,
                scheduled_departure, scheduled_arrival, actual_departure, actual_arrival,
                gate, terminal, status, flight_type, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ",
            params![
                record.id,
                record.flight_number,
                record.airline,
                record.aircraft_type,
                record.origin,
                record.destination,
                record.scheduled_departure.map(encode_time),
                record.scheduled_arrival.map(encode_time),
                record.actual_departure.map(encode_time),
                record.actual_arrival.map(encode_time),
                record.gate,
                record.terminal,
                record.status.as_str(),
                record.direction.as_str(),
                encode_time(record.created_at),
                encode_time(record.updated_at),
            ],
        )?;

        debug!(id = %record.id, flight = %record.flight_number, "Inserted flight");
        Ok(())
    }

    /// Get a flight by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: &str) -> Result<Option<FlightRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id], Self::row_to_flight)
            .optional()?;
        Ok(result)
    }

    /// Replace the editable fields of a flight.
    ///
    /// Actual times and `created_at` are preserved; `updated_at` is bumped.
    /// A form without a status keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlightNotFound`] if no flight has this id, or an error
    /// if the form is invalid or the update fails.
    pub fn update(&self, id: &str, form: NewFlight) -> Result<FlightRecord> {
        form.validate()?;
        let form = form.normalized();

        let affected = self.conn.execute(
            r"
            UPDATE flights SET
                flight_number = ?2, airline = ?3, aircraft_type = ?4,
                origin = ?5, destination = ?6,
                scheduled_departure = ?7, scheduled_arrival = ?8,
                gate = ?9, terminal = ?10,
                status = COALESCE(?11, status), flight_type = ?12,
                updated_at = ?13
            WHERE id = ?1
            ",
            params![
                id,
                form.flight_number,
                form.airline,
                form.aircraft_type,
                form.origin,
                form.destination,
                form.scheduled_departure.map(encode_time),
                form.scheduled_arrival.map(encode_time),
                form.gate,
                form.terminal,
                form.status.map(FlightStatus::as_str),
                form.direction.as_str(),
                encode_time(Utc::now()),
            ],
        )?;

        if affected == 0 {
            return Err(Error::FlightNotFound { id: id.to_string() });
        }

        debug!(id, "Updated flight");
        self.get(id)?
            .ok_or_else(|| Error::FlightNotFound { id: id.to_string() })
    }

    /// Record actual departure/arrival times, as an external feed would.
    ///
    /// `None` leaves the corresponding time unchanged. Returns `true` if the
    /// flight exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_actual_times(
        &self,
        id: &str,
        departure: Option<DateTime<Utc>>,
        arrival: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE flights SET
                actual_departure = COALESCE(?2, actual_departure),
                actual_arrival = COALESCE(?3, actual_arrival),
                updated_at = ?4
            WHERE id = ?1
            ",
            params![
                id,
                departure.map(encode_time),
                arrival.map(encode_time),
                encode_time(Utc::now()),
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a flight by id.
    ///
    /// Returns `true` if a flight was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM flights WHERE id = ?1", [id])?;
        if affected > 0 {
            info!(id, "Deleted flight");
        }
        Ok(affected > 0)
    }

    /// List flights matching a query, ascending by scheduled departure.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, query: &FlightQuery) -> Result<Vec<FlightRecord>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(term) = query.search.as_deref().filter(|t| !t.is_empty()) {
            values.push(Value::Text(format!("%{}%", term.to_lowercase())));
            let n = values.len();
            clauses.push(format!(
                "(lower(flight_number) LIKE ?{n} OR lower(airline) LIKE ?{n} \
                 OR lower(origin) LIKE ?{n} OR lower(destination) LIKE ?{n})"
            ));
        }
        if let Some(status) = query.status {
            values.push(Value::Text(status.as_str().to_string()));
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(direction) = query.direction {
            values.push(Value::Text(direction.as_str().to_string()));
            clauses.push(format!("flight_type = ?{}", values.len()));
        }

        let mut sql = SELECT_COLUMNS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY scheduled_departure IS NULL, scheduled_departure ASC");
        if let Some(limit) = query.limit {
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ?{}", values.len()));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let flights = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Flights whose scheduled departure falls in `[since, until]`, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upcoming(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<FlightRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE scheduled_departure >= ?1 AND scheduled_departure <= ?2 \
             ORDER BY scheduled_departure ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let flights = stmt
            .query_map(
                params![encode_time(since), encode_time(until)],
                Self::row_to_flight,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Flights departing or arriving in `[since, until]`, ordered by their
    /// earliest scheduled time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upcoming_movements(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<FlightRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE (scheduled_departure >= ?1 AND scheduled_departure <= ?2) \
             OR (scheduled_arrival >= ?1 AND scheduled_arrival <= ?2) \
             ORDER BY COALESCE(scheduled_departure, scheduled_arrival) ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let flights = stmt
            .query_map(
                params![encode_time(since), encode_time(until)],
                Self::row_to_flight,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Count flights in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flights", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Compute dashboard statistics over every stored flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<FlightStats> {
        let stats = self.conn.query_row(
            r"
            SELECT
                COALESCE(SUM(flight_type = 'departure'), 0),
                COALESCE(SUM(flight_type = 'arrival'), 0),
                COALESCE(SUM(status IN ('on-time', 'scheduled')), 0),
                COALESCE(SUM(status = 'delayed'), 0)
            FROM flights
            ",
            [],
            |row| {
                Ok(FlightStats {
                    total_departures: row.get(0)?,
                    total_arrivals: row.get(1)?,
                    on_time: row.get(2)?,
                    delayed: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Convert a database row to a [`FlightRecord`].
    fn row_to_flight(row: &rusqlite::Row) -> rusqlite::Result<FlightRecord> {
        let id: String = row.get(0)?;
        let status_str: String = row.get(12)?;
        let direction_str: String = row.get(13)?;

        let status = status_str.parse().unwrap_or_else(|_| {
            warn!(%id, status = %status_str, "Unknown flight status, defaulting to scheduled");
            FlightStatus::Scheduled
        });
        let direction = direction_str.parse().unwrap_or_else(|_| {
            warn!(%id, direction = %direction_str, "Unknown flight type, defaulting to departure");
            FlightDirection::Departure
        });

        Ok(FlightRecord {
            flight_number: row.get(1)?,
            airline: row.get(2)?,
            aircraft_type: row.get(3)?,
            origin: row.get(4)?,
            destination: row.get(5)?,
            scheduled_departure: decode_optional_time(row, 6)?,
            scheduled_arrival: decode_optional_time(row, 7)?,
            actual_departure: decode_optional_time(row, 8)?,
            actual_arrival: decode_optional_time(row, 9)?,
            gate: row.get(10)?,
            terminal: row.get(11)?,
            status,
            direction,
            created_at: decode_time(row, 14)?,
            updated_at: decode_time(row, 15)?,
            id,
        })
    }
}

/// Encode a timestamp as fixed-width RFC 3339 UTC text.
fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_time(idx, &text)
}

fn decode_optional_time(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| parse_time(idx, &text)).transpose()
}

fn parse_time(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            warn!(column = idx, value = text, "Unparseable timestamp in flight store");
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
        })
}
