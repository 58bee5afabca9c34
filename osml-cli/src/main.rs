//! OSML Logger Tools CLI Application
//!
//! This is the command-line interface for the NMEA data logger.
//! It uses the osml-decoder library and adds:
//! - Storage card checks with cleaned captures and a JSON report
//! - Track summaries across several captures
//! - Reading and writing the logger configuration file

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use osml_decoder::{
    extract_track, merge_lines, CheckConfig, CheckResult, Checker, FileAnalyzer, LoggerConfig,
    Track,
};
use std::path::{Path, PathBuf};

mod config;

/// OSML Logger Tools - Check and analyse NMEA data logger captures
#[derive(Parser, Debug)]
#[command(name = "osml")]
#[command(about = "Check and analyse NMEA data logger captures", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (osml.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a storage card folder or a single capture
    Check {
        /// Card folder or capture file
        source: PathBuf,

        /// Folder for cleaned captures and the report
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Replace existing output files
        #[arg(short = 'w', long)]
        overwrite: bool,

        /// Write report.json into the output folder
        #[arg(short, long)]
        report: bool,

        /// Print the report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Build a track from one or more captures
    Track {
        /// Capture files, merged in time order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Track name (default: first file name)
        #[arg(long)]
        name: Option<String>,

        /// Print the track as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Read or write the logger configuration on a storage card
    Logger {
        #[command(subcommand)]
        action: LoggerCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LoggerCommand {
    /// Show the configuration stored on the card
    Read {
        /// Card folder
        card: PathBuf,
    },

    /// Validate and write a new configuration to the card
    Write {
        /// Card folder
        card: PathBuf,

        /// Baud rate of channel A
        #[arg(long, default_value_t = 4800)]
        baud_a: u32,

        /// Baud rate of channel B
        #[arg(long, default_value_t = 4800)]
        baud_b: u32,

        /// Channel A is a seatalk bus
        #[arg(long)]
        seatalk: bool,

        /// Record gyroscope and accelerometer
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        gyro: bool,

        /// Record supply voltage
        #[arg(long)]
        supply: bool,

        /// Vessel identifier (0-9999)
        #[arg(long, default_value_t = 0)]
        vessel_id: u16,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let app_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };

    // Initialize logging
    init_logging(
        args.verbose,
        args.quiet,
        app_config.logging.level,
    );

    log::info!("OSML Logger Tools CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", osml_decoder::VERSION);
    if let Some(path) = &args.config {
        log::debug!("Configuration loaded from: {:?}", path);
    }

    match args.command {
        Command::Check {
            source,
            output,
            overwrite,
            report,
            json,
        } => {
            let mut check_config = app_config.check;
            if let Some(dir) = output {
                check_config = check_config.with_output_dir(dir);
            }
            if overwrite {
                check_config = check_config.with_overwrite(true);
            }
            if report {
                check_config = check_config.with_report(true);
            }
            check_mode(&source, check_config, json)
        }
        Command::Track { files, name, json } => track_mode(&files, name, json),
        Command::Logger { action } => logger_mode(action),
    }
}

/// Check mode - analyse all data files, write cleaned captures, print results
fn check_mode(source: &Path, check_config: CheckConfig, json: bool) -> Result<()> {
    let checker = Checker::new(check_config);
    let result = checker
        .check(source)
        .with_context(|| format!("Failed to check {:?}", source))?;

    if json {
        println!("{}", result.to_json()?);
    } else {
        print_check_summary(&result);
    }
    Ok(())
}

fn print_check_summary(result: &CheckResult) {
    println!("═══════════════════════════════════════════════");
    println!("  Check Results");
    println!("═══════════════════════════════════════════════\n");

    for (name, file) in &result.files {
        println!("{}", name);
        if !file.filename.is_empty() {
            println!("  Output:     {}", file.filename);
        }
        println!("  Vessel:     {}", file.vessel_id);
        println!("  Version:    {}", file.version);
        println!("  Datagrams:  {}", file.datagram_count);
        if let (Some(first), Some(last)) = (file.first_timestamp, file.last_timestamp) {
            println!(
                "  Time range: {} .. {}",
                first.to_rfc3339_opts(SecondsFormat::Secs, true),
                last.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        }
        println!(
            "  Errors:     {}   Warnings: {}",
            file.error_count(),
            file.warning_count()
        );
        for issue in file.errors() {
            println!("    ✗ {}", issue);
        }
        for issue in file.warnings() {
            println!("    ⚠ {}", issue);
        }
        println!();
    }

    println!(
        "Total: {} files, {} errors, {} warnings",
        result.files.len(),
        result.error_count(),
        result.warning_count()
    );
}

/// Track mode - analyse captures, merge them and summarise the track
fn track_mode(files: &[PathBuf], name: Option<String>, json: bool) -> Result<()> {
    let analyzer = FileAnalyzer::new();

    let mut captures = Vec::with_capacity(files.len());
    for path in files {
        let analysis = analyzer
            .analyze_file(path)
            .with_context(|| format!("Failed to analyse {:?}", path))?;
        log::info!(
            "{:?}: {} lines, {} errors",
            path,
            analysis.lines.len(),
            analysis.result.error_count()
        );
        captures.push(analysis.lines);
    }

    let name = name.unwrap_or_else(|| default_track_name(files));
    let lines = merge_lines(captures);
    let track = extract_track(name, &lines);
    if json {
        println!("{}", serde_json::to_string_pretty(&track)?);
    } else {
        print_track_summary(&track);
    }
    Ok(())
}

fn default_track_name(files: &[PathBuf]) -> String {
    files
        .first()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string())
}

fn print_track_summary(track: &Track) {
    println!("Track: {}", track.name);
    println!("  Waypoints: {}", track.waypoints.len());

    match (track.start(), track.end()) {
        (Some(start), Some(end)) => {
            println!(
                "  Start:     {} ({:.5}, {:.5})",
                start.time.to_rfc3339_opts(SecondsFormat::Millis, true),
                start.lat,
                start.lon
            );
            println!(
                "  End:       {} ({:.5}, {:.5})",
                end.time.to_rfc3339_opts(SecondsFormat::Millis, true),
                end.lat,
                end.lon
            );
        }
        _ => println!("  No valid position fix found"),
    }

    let depths: Vec<f64> = track
        .waypoints
        .iter()
        .map(|w| w.depth)
        .filter(|d| *d > 0.0)
        .collect();
    if !depths.is_empty() {
        let max = depths.iter().copied().fold(f64::MIN, f64::max);
        let min = depths.iter().copied().fold(f64::MAX, f64::min);
        println!(
            "  Depth:     {:.1} m .. {:.1} m ({} soundings)",
            min,
            max,
            depths.len()
        );
    }

    let max_speed = track
        .waypoints
        .iter()
        .map(|w| w.speed)
        .fold(0.0, f64::max);
    println!("  Max speed: {:.1} kn", max_speed);
}

/// Logger mode - read or write config.dat on a card
fn logger_mode(action: LoggerCommand) -> Result<()> {
    match action {
        LoggerCommand::Read { card } => {
            let logger = LoggerConfig::read_from_card(&card)
                .with_context(|| format!("Failed to read logger configuration from {:?}", card))?;
            println!("{}", logger);
        }
        LoggerCommand::Write {
            card,
            baud_a,
            baud_b,
            seatalk,
            gyro,
            supply,
            vessel_id,
        } => {
            let logger = LoggerConfig::new()
                .with_baud_a(baud_a)
                .with_baud_b(baud_b)
                .with_seatalk(seatalk)
                .with_gyro(gyro)
                .with_supply(supply)
                .with_vessel_id(vessel_id);
            logger.validate()?;
            logger
                .write_to_card(&card)
                .with_context(|| format!("Failed to write logger configuration to {:?}", card))?;
            println!("✓ Written: {}", logger);
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
///
/// Without `-v`/`-q` the level from the configuration file applies.
fn init_logging(verbose: u8, quiet: bool, configured: Option<LevelFilter>) {
    use env_logger::Builder;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => configured.unwrap_or(LevelFilter::Info),
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
