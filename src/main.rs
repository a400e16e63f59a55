// Physical Access Engine - Command Line Front End
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/physical-access --dataset swipes.json currently-in cleanroom
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/physical-access --config engine.json --output-format csv passback 2024-01-01 2024-01-31
// ```

use anyhow::{Context, Result};
use clap::Parser;
use physical_access_engine::client::NewClient;
use physical_access_engine::logging::LoggingConfig;
use physical_access_engine::output::{write_records, Tabular};
use physical_access_engine::service::PhysicalAccessService;
use physical_access_engine::store::InMemoryStore;
use physical_access_engine::types::config::{CliArgs, Command};
use physical_access_engine::types::{Cutoff, EngineConfig, OutputFormat};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use tracing::{error, info, warn};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match EngineConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Configuration decides the log directory, so it is loaded before logging
    let config = match EngineConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let mut logging = if args.debug {
        LoggingConfig::new().with_level(tracing::Level::DEBUG).with_span_events()
    } else if args.verbose {
        LoggingConfig::new().with_level(tracing::Level::INFO).with_span_events()
    } else {
        // Default: warnings only, stdout carries results
        LoggingConfig::new()
    };
    if let Some(dir) = &config.log_directory {
        logging = logging.with_file_logging(dir.clone());
    }
    let guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    let code = launch(args, config);

    // Flush queued file log lines before the process ends
    drop(guard);
    process::exit(code);
}

/// Validate, run the command and map the outcome to an exit code
fn launch(args: CliArgs, config: EngineConfig) -> i32 {
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return 1;
    }
    info!("Configuration loaded and validated successfully");

    match run(args, config) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run(args: CliArgs, config: EngineConfig) -> Result<i32> {
    let format = config
        .get_output_format()
        .map_err(anyhow::Error::msg)
        .context("Invalid output format")?;
    let store = open_store(&config.dataset_path)?;

    if args.dry_run {
        let data = store.snapshot();
        eprintln!("Configuration validation successful!");
        eprintln!(
            "Dataset {}: {} clients, {} badges, {} cards, {} areas, {} events",
            config.dataset_path,
            data.clients.len(),
            data.badges.len(),
            data.cards.len(),
            data.areas.len(),
            data.events.len()
        );
        eprintln!("Dry run mode - no command will be executed.");
        return Ok(0);
    }

    let Some(command) = args.command else {
        eprintln!("No command given. Run with --help to list the available commands.");
        return Ok(2);
    };

    let service = PhysicalAccessService::new(store, &config);
    let written = execute(&service, command, format)?;

    if written {
        service
            .store()
            .save(&config.dataset_path)
            .with_context(|| format!("Failed to save dataset to {}", config.dataset_path))?;
        info!(path = %config.dataset_path, "Saved dataset");
    }
    Ok(0)
}

fn open_store(path: &str) -> Result<InMemoryStore> {
    if !Path::new(path).exists() {
        warn!(path, "Dataset file not found, starting with an empty store");
        return Ok(InMemoryStore::new());
    }
    InMemoryStore::load(path).with_context(|| format!("Failed to load dataset from {}", path))
}

fn print<T: Serialize + Tabular>(format: OutputFormat, records: &[T]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_records(&mut handle, format, records).context("Failed to write results")?;
    handle.flush().context("Failed to write results")
}

/// Run one command; returns whether the dataset was modified
fn execute(
    service: &PhysicalAccessService<InMemoryStore>,
    command: Command,
    format: OutputFormat,
) -> Result<bool> {
    let expiration = |cutoff: Option<Cutoff>| cutoff.map(|c| c.end_instant());

    match command {
        Command::Name => print(format, &[service.api_name().to_string()])?,
        Command::Badges { client } => print(format, &service.get_badges(client)?)?,
        Command::Cards { client } => print(format, &service.get_cards(client)?)?,
        Command::ExpiringCards { cutoff } => print(format, &service.get_expiring_cards(cutoff)?)?,
        Command::Areas => print(format, &service.get_areas()?)?,
        Command::CurrentlyIn { alias, at } => {
            let occupants = match at {
                Some(as_of) => service.currently_in_at(&alias, as_of)?,
                None => service.currently_in(&alias)?,
            };
            print(format, &occupants)?
        }
        Command::BadgeInAreas { alias } => print(format, &service.badge_in_areas(&alias)?)?,
        Command::Events { start, end, client, area } => {
            print(format, &service.get_events(start, end, client, area)?)?
        }
        Command::RawEvents { start, end, client, area } => {
            print(format, &service.get_raw_events(start, end, client, area)?)?
        }
        Command::Sessions { start, end, client, area } => {
            print(format, &service.get_sessions(start, end, client, area)?)?
        }
        Command::PreviousIn { event, start } => {
            print(format, &[service.find_previous_in(event, start)?])?
        }
        Command::NextOut { event, end } => print(format, &[service.find_next_out(event, end)?])?,
        Command::AllowReenable { client, days } => {
            let days = days.unwrap_or(service.default_reenable_days());
            print(format, &[service.allow_reenable(client, days)?])?
        }
        Command::Passback { start, end } => {
            let clients: Vec<_> = service.get_passback_violations(start, end)?.into_iter().collect();
            print(format, &clients)?
        }
        Command::Violations { start, end } => print(format, &service.get_violations(start, end)?)?,
        Command::AddClient { client, user_name, first_name, last_name, expires } => {
            let request = NewClient {
                client_id: client,
                user_name,
                first_name,
                last_name,
                expire_on: expiration(expires),
            };
            print(format, &[service.add_client(request)?])?;
            return Ok(true);
        }
        Command::Enable { client, expires } => {
            print(format, &[service.enable_access(client, expiration(expires))?])?;
            return Ok(true);
        }
        Command::Disable { client, expires } => {
            print(format, &[service.disable_access(client, expiration(expires))?])?;
            return Ok(true);
        }
    }
    Ok(false)
}
