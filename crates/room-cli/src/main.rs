//! `rooms` CLI: search open campus rooms from feed files on disk.
//!
//! ## Usage
//!
//! ```sh
//! # Rooms with free time today between 1 and 3 PM, largest-first buildings
//! rooms search --inventory rooms.json --course-book coursebook.json \
//!     --astra astra.json --mazevo mazevo.json \
//!     --date 2026-03-16 --start 13:00 --end 15:00
//!
//! # Completely free rooms with 40+ seats near the user, as JSON
//! rooms search ... --full --min-capacity 40 --buildings nearby \
//!     --lat 32.9857 --lng -96.7502 --json
//!
//! # Availability of one room's events over a window
//! rooms availability -i events.json --start 2026-03-16T14:00:00Z --end 2026-03-16T18:00:00Z
//!
//! # Print the built-in campus configuration
//! rooms config -o campus.toml
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use room_engine::availability::DEFAULT_GAP_THRESHOLD_MINUTES;
use room_engine::{
    find_rooms, free_slots, room_availability, CampusConfig, CampusSnapshot, CanonicalEvent,
    Coordinates, Fetched, FreeSlot, QueryParams, RoomQuery, RoomSearchResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rooms", version, about = "Find open campus rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for rooms that are free during a window
    Search(SearchArgs),
    /// Classify a single room's events over a window
    Availability {
        /// JSON array of events (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Window start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Window end (RFC 3339)
        #[arg(long)]
        end: String,
        /// Minimum free run, in minutes, that counts as free time
        #[arg(long, default_value_t = DEFAULT_GAP_THRESHOLD_MINUTES)]
        gap: u32,
    },
    /// Print the built-in campus configuration as TOML
    Config {
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Room inventory JSON
    #[arg(long)]
    inventory: String,
    /// Class schedule feed JSON
    #[arg(long)]
    course_book: String,
    /// Ad-hoc booking feed JSON
    #[arg(long)]
    astra: String,
    /// Event-management feed JSON
    #[arg(long)]
    mazevo: String,
    /// Query date (YYYY-MM-DD)
    #[arg(long)]
    date: String,
    /// Window start (HH:MM, campus time)
    #[arg(long)]
    start: Option<String>,
    /// Window end (HH:MM, campus time)
    #[arg(long)]
    end: Option<String>,
    /// Comma-separated building codes, or "nearby"
    #[arg(long)]
    buildings: Option<String>,
    /// Minimum room capacity
    #[arg(long)]
    min_capacity: Option<u32>,
    /// Only list rooms that are completely free
    #[arg(long)]
    full: bool,
    /// Prefix search over room names, building names and event subjects
    #[arg(long)]
    search: Option<String>,
    /// User latitude, for distance sorting
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// User longitude, for distance sorting
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
    /// Campus configuration TOML (built-in campus if omitted)
    #[arg(long)]
    config: Option<String>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AvailabilityReport {
    completely_free: bool,
    has_acceptable_gap: bool,
    free_slots: Vec<FreeSlot>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            let config = load_config(args.config.as_deref())?;
            let query = build_query(&args, &config)?;
            let snapshot = load_snapshot(&args);
            let result =
                find_rooms(&snapshot, &query, &config).context("Room search failed")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_result(&result, config.tz()?));
            }
        }
        Commands::Availability {
            input,
            start,
            end,
            gap,
        } => {
            let json = read_input(input.as_deref())?;
            let events: Vec<CanonicalEvent> =
                serde_json::from_str(&json).context("Failed to parse events JSON")?;
            let ws = parse_instant(&start)?;
            let we = parse_instant(&end)?;
            if we < ws {
                anyhow::bail!("Window end {} is before its start {}", end, start);
            }
            let availability = room_availability(&events, ws, we, gap);
            let report = AvailabilityReport {
                completely_free: availability.completely_free,
                has_acceptable_gap: availability.has_acceptable_gap,
                free_slots: free_slots(&events, ws, we),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config { output } => {
            let config = CampusConfig::builtin().context("Built-in campus configuration is invalid")?;
            let toml = config
                .to_toml_string()
                .context("Failed to serialize campus configuration")?;
            write_output(output.as_deref(), &toml)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<CampusConfig> {
    match path {
        Some(path) => CampusConfig::from_file(path)
            .with_context(|| format!("Failed to load campus configuration: {}", path)),
        None => CampusConfig::builtin().context("Built-in campus configuration is invalid"),
    }
}

/// Route the flags through the same raw-parameter parsing the web front end uses.
fn build_query(args: &SearchArgs, config: &CampusConfig) -> Result<RoomQuery> {
    let params = QueryParams {
        date: Some(args.date.clone()),
        start_time: args.start.clone(),
        end_time: args.end.clone(),
        buildings: args.buildings.clone(),
        min_capacity: args.min_capacity.map(|n| n.to_string()),
        full_availability: args.full.then(|| "true".to_string()),
        search: args.search.clone(),
    };
    let mut query = RoomQuery::from_params(&params, config).context("Invalid search parameters")?;
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        query.user_location = Some(Coordinates::new(lat, lng));
    }
    Ok(query)
}

fn load_snapshot(args: &SearchArgs) -> CampusSnapshot {
    CampusSnapshot {
        rooms: load_feed(&args.inventory),
        course_book: load_feed(&args.course_book),
        astra: load_feed(&args.astra),
        mazevo: load_feed(&args.mazevo),
    }
}

/// A feed file that cannot be read or parsed is a failed source, not a CLI error,
/// so the search reports it the same way it would an upstream outage.
fn load_feed<T: DeserializeOwned>(path: &str) -> Fetched<T> {
    let parsed = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read file: {}", path))
        .and_then(|raw| {
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON: {}", path))
        });
    match parsed {
        Ok(data) => {
            debug!(path, "loaded feed");
            Fetched::ready(data)
        }
        Err(err) => {
            warn!(path, "{:#}", err);
            Fetched::failed(format!("{:#}", err))
        }
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid RFC 3339 datetime: {}", s))
}

/// Plain-text listing: the summary, then each building with its rooms.
fn render_result(result: &RoomSearchResult, tz: Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.summary);

    for building in &result.buildings {
        let _ = writeln!(out);
        match building.distance {
            Some(d) => {
                let _ = writeln!(out, "{} [{} mi]", building.text, d.miles());
            }
            None => {
                let _ = writeln!(out, "{}", building.text);
            }
        }
        for room in result.rooms.iter().filter(|r| r.building_id == building.id) {
            let open = if room.availability.completely_free {
                "free".to_string()
            } else {
                room.free_slots
                    .iter()
                    .map(|s| {
                        format!(
                            "{}-{}",
                            s.start.with_timezone(&tz).format("%H:%M"),
                            s.end.with_timezone(&tz).format("%H:%M")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(
                out,
                "  {:<12} cap {:<8} {}",
                room.qualified_name,
                room.capacity.to_string(),
                open
            );
        }
    }
    out
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
