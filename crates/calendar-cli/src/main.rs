//! `chronicle-cal` CLI: detect, import, advance and inspect campaign calendars.
//!
//! ## Usage
//!
//! ```sh
//! # Which tool exported this file?
//! chronicle-cal detect -i harptos.json
//!
//! # Convert a Simple Calendar / Calendaria / Fantasy-Calendar.com export to Chronicle JSON
//! chronicle-cal import -i harptos.json -o harptos.chronicle.json
//!
//! # Move a calendar forward (stdin -> stdout)
//! cat harptos.chronicle.json | chronicle-cal advance --days 10
//! chronicle-cal advance -i harptos.chronicle.json --hours 5 --minutes 30
//!
//! # Show today's date, weekday, season and moon phases
//! chronicle-cal info -i harptos.chronicle.json
//!
//! # Tighter limits from a TOML file, with debug logging
//! chronicle-cal --config limits.toml -vv advance -i cal.json --days 400
//! ```

mod logging;

use std::io::{self, Read};

use anyhow::{Context, Result};
use calendar_core::export::{to_json_pretty, ChronicleDocument};
use calendar_core::{
    detect_format, CalendarError, CalendarRepository, CalendarService, CurrentDate,
    ImportFormat, InMemoryRepository, Limits, NewCalendar, ROLE_OWNER,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "chronicle-cal",
    version,
    about = "Fantasy calendar import, export and date arithmetic"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file with service limits (max_advance_days, max_advance_hours, max_import_bytes)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected format of a calendar file
    Detect {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Convert any supported calendar file to Chronicle JSON
    Import {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Campaign id recorded for the imported calendar
        #[arg(long, default_value = "cli")]
        campaign: String,
    },
    /// Advance a calendar's current date or time and write it back as Chronicle JSON
    Advance {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Whole days to advance
        #[arg(long, conflicts_with_all = ["hours", "minutes"])]
        days: Option<u64>,
        /// Hours to advance
        #[arg(long)]
        hours: Option<u64>,
        /// Minutes to advance
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Show the current date with weekday, season, era and moon phases
    Info {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let limits = match cli.config.as_deref() {
        Some(path) => Limits::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => Limits::default(),
    };

    match cli.command {
        Commands::Detect { input } => {
            let raw = read_input(input.as_deref())?;
            let format = detect_format(raw.as_bytes()).context("Failed to detect format")?;
            if format == ImportFormat::Unknown {
                return Err(CalendarError::UnrecognizedFormat.into());
            }
            println!("{}", format);
        }
        Commands::Import {
            input,
            output,
            campaign,
        } => {
            let raw = read_input(input.as_deref())?;
            let loaded = load_calendar(raw.as_bytes(), &campaign, limits)?;
            let document = loaded
                .service
                .export(&loaded.calendar_id, true, ROLE_OWNER)
                .context("Failed to export calendar")?;
            write_document(output.as_deref(), &document)?;
        }
        Commands::Advance {
            input,
            output,
            days,
            hours,
            minutes,
        } => {
            let raw = read_input(input.as_deref())?;
            let mut loaded = load_calendar(raw.as_bytes(), "cli", limits)?;
            let id = loaded.calendar_id.clone();

            let current = match (days, hours, minutes) {
                (Some(days), _, _) => loaded
                    .service
                    .advance_date(&id, days)
                    .context("Failed to advance date")?,
                (None, None, None) => {
                    anyhow::bail!("Nothing to advance: pass --days, or --hours and/or --minutes")
                }
                (None, hours, minutes) => loaded
                    .service
                    .advance_time(&id, hours.unwrap_or(0), minutes.unwrap_or(0))
                    .context("Failed to advance time")?,
            };
            info!(
                year = current.year,
                month = current.month,
                day = current.day,
                hour = current.hour,
                minute = current.minute,
                "advanced calendar"
            );

            let document = loaded
                .service
                .export(&id, true, ROLE_OWNER)
                .context("Failed to export calendar")?;
            write_document(output.as_deref(), &document)?;
        }
        Commands::Info { input } => {
            let raw = read_input(input.as_deref())?;
            let loaded = load_calendar(raw.as_bytes(), "cli", limits)?;
            print_info(&loaded)?;
        }
    }

    Ok(())
}

/// A calendar file loaded into a throwaway in-memory service.
struct Loaded {
    service: CalendarService<InMemoryRepository>,
    calendar_id: String,
    format: ImportFormat,
}

/// Detect, parse and import `bytes` into a fresh calendar.
///
/// Import resets the current date to the start of the imported year; Chronicle
/// files carry a full current date, which is restored afterwards.
fn load_calendar(bytes: &[u8], campaign: &str, limits: Limits) -> Result<Loaded> {
    let format = detect_format(bytes).context("Failed to parse calendar file")?;
    if format == ImportFormat::Unknown {
        return Err(CalendarError::UnrecognizedFormat.into());
    }

    let mut service = CalendarService::with_limits(InMemoryRepository::new(), limits);
    let calendar = service
        .create_calendar(NewCalendar::fantasy(campaign, "Imported Calendar"))
        .context("Failed to create calendar")?;
    let calendar = service
        .import_bytes(&calendar.id, bytes)
        .with_context(|| format!("Failed to import {} calendar", format))?;

    if format == ImportFormat::Chronicle {
        let document: ChronicleDocument =
            serde_json::from_slice(bytes).context("Failed to read Chronicle current date")?;
        let saved = CurrentDate {
            year: document.calendar.current_year,
            month: document.calendar.current_month,
            day: document.calendar.current_day,
            hour: document.calendar.current_hour,
            minute: document.calendar.current_minute,
        };
        let month_len = saved
            .month
            .checked_sub(1)
            .map(|idx| calendar.month_days(idx as usize, saved.year))
            .unwrap_or(0);
        let in_range = saved.day >= 1
            && i64::from(saved.day) <= i64::from(month_len)
            && saved.hour < calendar.hours_per_day
            && saved.minute < calendar.minutes_per_hour;
        if in_range {
            service
                .repository_mut()
                .update_current_date(&calendar.id, saved)
                .context("Failed to restore current date")?;
        } else {
            warn!(
                month = saved.month,
                day = saved.day,
                "stored current date does not fit the calendar, starting at day 1"
            );
        }
    }

    info!(format = %format, calendar = %calendar.name, "loaded calendar");
    Ok(Loaded {
        service,
        calendar_id: calendar.id,
        format,
    })
}

fn print_info(loaded: &Loaded) -> Result<()> {
    let calendar = loaded
        .service
        .get_calendar(&loaded.calendar_id)
        .context("Failed to load calendar")?;
    let snapshot = calendar.current_snapshot();

    let leap = if calendar.leap_year_every > 0 {
        format!(", leap every {} years", calendar.leap_year_every)
    } else {
        String::new()
    };

    println!("Calendar:  {}", calendar.name);
    println!("Format:    {}", loaded.format);
    println!(
        "Months:    {} ({} days{})",
        calendar.months.len(),
        calendar.year_length(),
        leap
    );
    println!("Weekdays:  {}", calendar.week_length());
    println!("Date:      {} {}", snapshot.formatted, snapshot.time);
    println!("Weekday:   {}", snapshot.weekday.as_deref().unwrap_or("-"));
    println!("Season:    {}", snapshot.season.as_deref().unwrap_or("-"));
    println!("Era:       {}", snapshot.era.as_deref().unwrap_or("-"));
    for moon in &snapshot.moons {
        println!(
            "Moon:      {} ({}, {:.0}%)",
            moon.name,
            moon.phase_name,
            moon.phase * 100.0
        );
    }
    Ok(())
}

fn write_document(path: Option<&str>, document: &ChronicleDocument) -> Result<()> {
    let json = to_json_pretty(document).context("Failed to serialize calendar")?;
    write_output(path, &format!("{}\n", json))
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
