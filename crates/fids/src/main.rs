//! `fids` - CLI for the flight information display system
//!
//! This binary runs the departures board and manages the local flight store
//! that its live source reads.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::{Arc, Mutex};

use chrono::{Local, Utc};
use clap::Parser;
use tracing::{debug, info};

use fids::cli::{
    Cli, Command, ConfigCommand, DashboardCommand, DisplayArgs, FlightsCommand, OutputFormat,
    SeedCommand,
};
use fids::display::{render, InputBus, InputEvent, TerminalInput, TerminalSurface};
use fids::logging::{init_logging_to, LogOutput};
use fids::{
    init_logging, spawn_display, Config, DisplayController, Error, FlightQuery, FlightRecord,
    LiveSource, MockSource, NewFlight, SourceSet, Storage,
};

/// Log file used while the board is on screen.
const LOG_FILE_NAME: &str = "fids.log";

/// Window the dashboard looks ahead for movements.
const DASHBOARD_WINDOW_HOURS: i64 = 2;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Keep log lines off the terminal while the board owns it
    match &cli.command {
        Command::Display(args) if !args.once => {
            let log_file = Config::default_data_dir().join(LOG_FILE_NAME);
            init_logging_to(cli.verbosity(), &LogOutput::File(log_file))?;
        }
        _ => init_logging(cli.verbosity()),
    }

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Display(args) => handle_display(&config, &args).await,
        Command::Flights(cmd) => handle_flights(&config, cmd),
        Command::Seed(cmd) => handle_seed(&config, &cmd),
        Command::Dashboard(cmd) => handle_dashboard(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<Storage, Error> {
    let path = config.database_path();
    debug!(path = %path.display(), "Opening flight store");
    Storage::open(path)
}

async fn handle_display(config: &Config, args: &DisplayArgs) -> CliResult {
    let settings = config.display.apply(&args.settings_update()?)?;

    let store = Arc::new(Mutex::new(open_store(config)?));
    let (low, high) = config.board.mock_latency_ms;
    let mock = MockSource::new(config.board.mock_flight_count, config.board.origin.clone())
        .with_latency(low, high);
    let sources = SourceSet::new(Arc::new(mock), Arc::new(LiveSource::new(store)));

    let mut controller = DisplayController::new(settings, sources, config.board.clone());
    if let Some(category) = args.category {
        controller = controller.with_category(category.into());
    }

    if args.once {
        controller.refresh().await;
        print!("{}", render::board(&controller.snapshot(), controller.board()));
        return Ok(());
    }

    let bus = InputBus::new();
    let mut interrupts = bus.subscribe();
    let surface = TerminalSurface::new()?;
    let reader = TerminalInput::spawn(bus.clone());
    let handle = spawn_display(controller, surface, bus.subscribe());
    info!("Board running, press Ctrl+C to quit");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = interrupts.recv() => match event {
                Some(InputEvent::Interrupt) | None => break,
                Some(_) => {}
            },
        }
    }
    drop(interrupts);

    handle.shutdown().await;
    reader.stop().await;
    info!(subscribers = bus.subscriber_count(), "Board stopped");
    Ok(())
}

fn handle_flights(config: &Config, cmd: FlightsCommand) -> CliResult {
    let store = open_store(config)?;

    match cmd {
        FlightsCommand::Add(fields) => {
            let form = fields.apply_to(NewFlight::default());
            let flight = store.insert(form)?;
            println!("Added {} ({})", flight.flight_number, flight.id);
        }
        FlightsCommand::List {
            search,
            status,
            direction,
            limit,
            format,
        } => {
            let query = FlightQuery {
                search,
                status: status.map(Into::into),
                direction: direction.map(Into::into),
                limit,
            };
            let flights = store.list(&query)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&flights)?),
                OutputFormat::Table => print_flight_table(&flights),
            }
        }
        FlightsCommand::Show { id, json } => {
            let flight = store
                .get(&id)?
                .ok_or_else(|| Error::FlightNotFound { id: id.clone() })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&flight)?);
            } else {
                print_flight_details(&flight);
            }
        }
        FlightsCommand::Edit { id, fields } => {
            let current = store
                .get(&id)?
                .ok_or_else(|| Error::FlightNotFound { id: id.clone() })?;
            let form = fields.apply_to(NewFlight::from(&current));
            let flight = store.update(&id, form)?;
            println!("Updated {} ({})", flight.flight_number, flight.id);
        }
        FlightsCommand::Delete { id, yes } => {
            if !yes {
                println!("This will delete flight {id}.");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            if store.delete(&id)? {
                println!("Deleted {id}");
            } else {
                return Err(Error::FlightNotFound { id }.into());
            }
        }
    }
    Ok(())
}

fn handle_seed(config: &Config, cmd: &SeedCommand) -> CliResult {
    let store = open_store(config)?;
    let generator = MockSource::new(cmd.count, config.board.origin.clone());
    let flights = generator.generate(
        cmd.category.map(Into::into),
        config.board.look_ahead(),
        Utc::now(),
    );

    for mut flight in flights.iter().cloned() {
        flight.id = uuid::Uuid::new_v4().to_string();
        store.insert_record(&flight)?;
    }
    info!(count = flights.len(), "Seeded flight store");
    println!(
        "Seeded {} flights into {}",
        flights.len(),
        store.path().display()
    );
    Ok(())
}

fn handle_dashboard(config: &Config, cmd: &DashboardCommand) -> CliResult {
    let store = open_store(config)?;
    let stats = store.stats()?;
    let now = Utc::now();
    let upcoming =
        store.upcoming_movements(now, now + chrono::Duration::hours(DASHBOARD_WINDOW_HOURS))?;

    if cmd.json {
        let report = serde_json::json!({
            "stats": stats,
            "upcoming": upcoming,
            "database_path": store.path(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} dashboard", config.board.airport_name);
    println!("------------------------");
    println!("Departures:    {}", stats.total_departures);
    println!("Arrivals:      {}", stats.total_arrivals);
    println!("On time:       {}", stats.on_time);
    println!("Delayed:       {}", stats.delayed);
    println!();
    println!("Next {DASHBOARD_WINDOW_HOURS} hours");
    if upcoming.is_empty() {
        println!("  No scheduled movements");
    } else {
        print_flight_table(&upcoming);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let display = &config.display;
                let board = &config.board;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Display]");
                println!("  Mock data:          {}", display.use_mock_data);
                println!("  Refresh (secs):     {}", display.refresh_interval_secs);
                println!("  System time:        {}", display.show_system_time);
                println!("  Kiosk mode:         {}", display.kiosk_mode);
                println!("  Auto fullscreen:    {}", display.auto_fullscreen);
                println!("  Flights per page:   {}", display.flights_per_page);
                println!("  Page interval:      {}", display.page_interval_secs);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Board]");
                println!("  Airport:            {}", board.airport_name);
                println!("  Origin:             {}", board.origin);
                println!("  Look ahead (hours): {}", board.look_ahead_hours);
                println!("  Mock flights:       {}", board.mock_flight_count);
                println!(
                    "  Mock latency (ms):  {}-{}",
                    board.mock_latency_ms.0, board.mock_latency_ms.1
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_flight_table(flights: &[FlightRecord]) {
    println!(
        "{:<8} {:<8} {:<18} {:<9} {:<22} {:<16} STATUS",
        "ID", "FLIGHT", "AIRLINE", "TYPE", "ROUTE", "SCHEDULED"
    );
    for flight in flights {
        let route = match flight.direction {
            fids::FlightDirection::Departure => flight.destination.as_deref(),
            fids::FlightDirection::Arrival => flight.origin.as_deref(),
        };
        println!(
            "{:<8} {:<8} {:<18} {:<9} {:<22} {:<16} {}",
            flight.id.chars().take(8).collect::<String>(),
            flight.flight_number,
            flight.airline.chars().take(18).collect::<String>(),
            flight.direction.as_str(),
            route.unwrap_or("-").chars().take(22).collect::<String>(),
            flight
                .own_time()
                .map_or_else(|| "-".to_string(), local_time),
            flight.status.label()
        );
    }
}

fn print_flight_details(flight: &FlightRecord) {
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
    let time = |value: Option<chrono::DateTime<Utc>>| {
        value.map_or_else(|| "-".to_string(), local_time)
    };

    println!("Flight {}", flight.flight_number);
    println!("----------------");
    println!("Id:                {}", flight.id);
    println!("Airline:           {}", flight.airline);
    println!("Aircraft:          {}", or_dash(flight.aircraft_type.as_deref()));
    println!("Type:              {}", flight.direction);
    println!("Origin:            {}", or_dash(flight.origin.as_deref()));
    println!("Destination:       {}", or_dash(flight.destination.as_deref()));
    println!("Category:          {}", flight.category());
    println!("Departure:         {}", time(flight.scheduled_departure));
    println!("Arrival:           {}", time(flight.scheduled_arrival));
    println!("Actual departure:  {}", time(flight.actual_departure));
    println!("Actual arrival:    {}", time(flight.actual_arrival));
    println!("Gate:              {}", or_dash(flight.gate.as_deref()));
    println!("Terminal:          {}", or_dash(flight.terminal.as_deref()));
    println!("Status:            {}", flight.status.label());
    println!("Updated:           {}", local_time(flight.updated_at));
}

fn local_time(time: chrono::DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
