//! Text rendering of the departures board.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use super::state::DisplaySnapshot;
use crate::config::BoardConfig;
use crate::flight::FlightRecord;

const RULE_WIDTH: usize = 96;

/// Render the whole board as plain text, one line per row.
#[must_use]
pub fn board(snapshot: &DisplaySnapshot, config: &BoardConfig) -> String {
    let view = &snapshot.view;
    let mut out = String::new();

    let mut header = format!(
        "{}  FLIGHT INFORMATION  [{}]",
        config.airport_name.to_uppercase(),
        view.connection.indicator()
    );
    if let Some(updated) = view.last_updated {
        let _ = write!(header, "  Updated {}", clock(updated));
    }
    if snapshot.settings.show_system_time {
        let _ = write!(header, "  {}", clock(view.now));
    }
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));

    let _ = write!(
        out,
        "{} Departures - Next {} Hours",
        view.category.title(),
        config.look_ahead_hours
    );
    if snapshot.total_pages > 0 {
        let _ = write!(
            out,
            "    Page {} of {}",
            view.current_page + 1,
            snapshot.total_pages
        );
    }
    out.push('\n');
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    if view.flights.is_empty() {
        if view.loading {
            let _ = writeln!(out, "Loading flights...");
        } else {
            let _ = writeln!(
                out,
                "No upcoming {} departures",
                view.category.title().to_lowercase()
            );
        }
    } else {
        let _ = writeln!(
            out,
            "{:<8} {:<20} {:<22} {:>5} {:>5}  {:<5} {:<4} {}",
            "FLIGHT", "AIRLINE", "DESTINATION", "SCHED", "ACT", "GATE", "TERM", "STATUS"
        );
        for flight in &snapshot.page {
            let _ = writeln!(out, "{}", row(flight));
        }
    }

    if snapshot.settings.use_mock_data {
        let _ = writeln!(out, "\n(demo data)");
    }

    if view.settings_open {
        out.push('\n');
        out.push_str(&settings_panel(snapshot));
    }

    if view.show_admin_controls {
        let _ = writeln!(
            out,
            "\n[s] settings  [r] refresh  [d] domestic  [i] international  [a] hide controls  [F11] fullscreen"
        );
    }

    out
}

/// One board row for a flight.
#[must_use]
pub fn row(flight: &FlightRecord) -> String {
    let scheduled = flight.scheduled_departure.map_or_else(|| "--:--".to_string(), hour_minute);
    let actual = flight.actual_departure.map_or_else(String::new, hour_minute);

    format!(
        "{:<8} {:<20} {:<22} {:>5} {:>5}  {:<5} {:<4} {}",
        fit(&flight.flight_number, 8),
        fit(&flight.airline, 20),
        fit(flight.destination.as_deref().unwrap_or("TBA"), 22),
        scheduled,
        actual,
        fit(flight.gate.as_deref().unwrap_or("TBA"), 5),
        fit(flight.terminal.as_deref().unwrap_or("-"), 4),
        flight.status.label()
    )
}

fn settings_panel(snapshot: &DisplaySnapshot) -> String {
    let s = &snapshot.settings;
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    let mut panel = String::from("SETTINGS (press a number to change, Esc to close)\n");
    let _ = writeln!(
        panel,
        "  [1] Data source        {}",
        if s.use_mock_data { "mock" } else { "live" }
    );
    let _ = writeln!(panel, "  [2] Refresh interval   {}s", s.refresh_interval_secs);
    let _ = writeln!(panel, "  [3] System time        {}", on_off(s.show_system_time));
    let _ = writeln!(panel, "  [4] Kiosk mode         {}", on_off(s.kiosk_mode));
    let _ = writeln!(panel, "  [5] Auto fullscreen    {}", on_off(s.auto_fullscreen));
    let _ = writeln!(panel, "  [6] Flights per page   {}", s.flights_per_page);
    let _ = writeln!(panel, "  [7] Page interval      {}s", s.page_interval_secs);
    panel
}

fn hour_minute(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M").to_string()
}

fn clock(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
