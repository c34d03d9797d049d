//! `SQLite` schema definitions for the flight store.

/// SQL statement to create the flights table.
///
/// Timestamps are fixed-width RFC 3339 UTC strings, so text comparison orders
/// them chronologically.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id TEXT PRIMARY KEY,
    flight_number TEXT NOT NULL,
    airline TEXT NOT NULL,
    aircraft_type TEXT,
    origin TEXT,
    destination TEXT,
    scheduled_departure TEXT,
    scheduled_arrival TEXT,
    actual_departure TEXT,
    actual_arrival TEXT,
    gate TEXT,
    terminal TEXT,
    status TEXT NOT NULL DEFAULT 'scheduled',
    flight_type TEXT NOT NULL DEFAULT 'departure',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Index backing the upcoming-departures window query.
pub const CREATE_DEPARTURE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_departure ON flights(scheduled_departure)
";

/// Index on `status` for filtering and statistics.
pub const CREATE_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_status ON flights(status)
";

/// Index on `flight_type` for direction filters.
pub const CREATE_TYPE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_type ON flights(flight_type)
";

/// Index on `scheduled_arrival`, added in schema version 2.
pub const CREATE_ARRIVAL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_arrival ON flights(scheduled_arrival)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Base schema statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_FLIGHTS_TABLE,
    CREATE_DEPARTURE_INDEX,
    CREATE_STATUS_INDEX,
    CREATE_TYPE_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_flights_table_contains_required_columns() {
        assert!(CREATE_FLIGHTS_TABLE.contains("id TEXT PRIMARY KEY"));
        assert!(CREATE_FLIGHTS_TABLE.contains("flight_number TEXT NOT NULL"));
        assert!(CREATE_FLIGHTS_TABLE.contains("airline TEXT NOT NULL"));
        assert!(CREATE_FLIGHTS_TABLE.contains("status TEXT NOT NULL"));
        assert!(CREATE_FLIGHTS_TABLE.contains("flight_type TEXT NOT NULL"));
    }
}
