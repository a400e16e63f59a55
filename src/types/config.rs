//! Configuration structures for the physical access engine
//!
//! This module contains the engine configuration, the command line interface
//! and the validation logic applied before the engine is started.

use super::{AreaId, ClientId, Cutoff, EventId, NeverDisabledPolicy, OutputFormat};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default policy constants
pub mod defaults {
    /// Window used by `allow-reenable` when no day count is given
    pub const REENABLE_DAYS: i64 = 30;

    /// Area alias used when none is given
    pub const AREA_ALIAS: &str = "all";

    /// Dataset file read by the command line front end
    pub const DATASET_PATH: &str = "physical-access.json";
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "physical-access",
    version = "1.0.0",
    about = "Physical Access Engine - occupancy, session pairing and passback detection over badge swipes",
    long_about = "Correlates badge-swipe events (entries and exits across lab areas) into occupancy, paired IN/OUT sessions and passback violations, and manages client access lifecycles.

EXAMPLES:
    # Who is in the cleanroom right now
    physical-access --dataset swipes.json currently-in cleanroom

    # Prepared events for a day, as CSV
    physical-access --output-format csv events 2024-01-01 2024-01-01

    # Passback violations for January
    physical-access passback 2024-01-01 2024-01-31

    # Can client 42 be re-enabled within 30 days of expiring
    physical-access allow-reenable 42 --days 30

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)

    Use --print-config to generate a template configuration file."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Dataset file backing the in-memory store
    #[arg(
        long,
        help = "Dataset file (JSON) holding clients, badges, cards, areas and events",
        long_help = "Path to the JSON dataset loaded into the in-memory store. Write commands (add-client, enable, disable) save the dataset back to this file. Default: physical-access.json"
    )]
    pub dataset: Option<String>,

    /// Output format for command results
    #[arg(long, help = "Output format (json or csv)")]
    pub output_format: Option<String>,

    /// Policy for clients with no expiration on record
    #[arg(long, help = "Re-enable policy when no expiration is recorded (allow or deny)")]
    pub never_disabled_policy: Option<String>,

    /// Only report occupants holding an unexpired card
    #[arg(
        long,
        overrides_with = "no_require_active_card",
        help = "Exclude occupants with no unexpired card"
    )]
    pub require_active_card: bool,

    /// Report occupants regardless of card state
    #[arg(
        long,
        overrides_with = "require_active_card",
        help = "Report occupants regardless of card state (overrides the config file)"
    )]
    pub no_require_active_card: bool,

    /// Disable the one-event look-behind/look-ahead around violation windows
    #[arg(
        long,
        overrides_with = "no_strict_window",
        help = "Evaluate violations strictly inside the requested window"
    )]
    pub strict_window: bool,

    /// Enable the one-event look-behind/look-ahead around violation windows
    #[arg(
        long,
        overrides_with = "strict_window",
        help = "Look one event past each edge of the window (overrides the config file)"
    )]
    pub no_strict_window: bool,

    /// Directory for rolling log files
    #[arg(long, help = "Write JSON logs to a daily rolling file in this directory")]
    pub log_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration and dataset without running a command
    #[arg(long, help = "Validate configuration and dataset without running a command")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Engine operations exposed on the command line
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the API name
    Name,

    /// List badges, one per client
    Badges {
        /// Client filter (0 for all)
        #[arg(default_value = "0")]
        client: ClientId,
    },

    /// List cards; a badge can hold several
    Cards {
        /// Client filter (0 for all)
        #[arg(default_value = "0")]
        client: ClientId,
    },

    /// List unexpired cards that expire on or before the cutoff
    ExpiringCards {
        /// Cutoff date or date-time
        cutoff: Cutoff,
    },

    /// List lab areas
    Areas,

    /// List occupants of the areas matching an alias
    CurrentlyIn {
        /// Area alias (all, cleanroom, robin, ...)
        #[arg(default_value = defaults::AREA_ALIAS)]
        alias: String,
        /// Evaluate occupancy as of this date or date-time instead of now
        #[arg(long)]
        at: Option<Cutoff>,
    },

    /// List occupants per area joined with their badges
    BadgeInAreas {
        /// Area alias (all, cleanroom, robin, ...)
        #[arg(default_value = defaults::AREA_ALIAS)]
        alias: String,
    },

    /// Events prepared for import (ordered, de-duplicated)
    Events {
        /// Start date or date-time
        start: Cutoff,
        /// End date or date-time
        end: Cutoff,
        /// Client filter (0 for all)
        #[arg(long, default_value = "0")]
        client: ClientId,
        /// Area filter (0 for all)
        #[arg(long, default_value = "0")]
        area: AreaId,
    },

    /// Events exactly as stored
    RawEvents {
        /// Start date or date-time
        start: Cutoff,
        /// End date or date-time
        end: Cutoff,
        /// Client filter (0 for all)
        #[arg(long, default_value = "0")]
        client: ClientId,
        /// Area filter (0 for all)
        #[arg(long, default_value = "0")]
        area: AreaId,
    },

    /// Reconstructed IN/OUT sessions
    Sessions {
        /// Start date or date-time
        start: Cutoff,
        /// End date or date-time
        end: Cutoff,
        /// Client filter (0 for all)
        #[arg(long, default_value = "0")]
        client: ClientId,
        /// Area filter (0 for all)
        #[arg(long, default_value = "0")]
        area: AreaId,
    },

    /// Find the IN event preceding an event
    PreviousIn {
        /// Reference event
        event: EventId,
        /// Events before this cutoff are not considered
        start: Cutoff,
    },

    /// Find the OUT event following an event
    NextOut {
        /// Reference event
        event: EventId,
        /// Events after this cutoff are not considered
        end: Cutoff,
    },

    /// Check whether a client can be re-enabled
    AllowReenable {
        /// Client to check
        client: ClientId,
        /// Days after expiration beyond which re-enabling is refused
        #[arg(long)]
        days: Option<i64>,
    },

    /// Clients with passback violations in the period
    Passback {
        /// Start date or date-time
        start: Cutoff,
        /// End date or date-time
        end: Cutoff,
    },

    /// Individual passback violations in the period
    Violations {
        /// Start date or date-time
        start: Cutoff,
        /// End date or date-time
        end: Cutoff,
    },

    /// Add a client and its badge
    AddClient {
        /// Client identifier from the directory system
        client: ClientId,
        /// Login name
        #[arg(long)]
        user_name: String,
        /// First name
        #[arg(long)]
        first_name: String,
        /// Last name
        #[arg(long)]
        last_name: String,
        /// Access expiration date or date-time
        #[arg(long)]
        expires: Option<Cutoff>,
    },

    /// Enable access for a client
    Enable {
        /// Client to enable
        client: ClientId,
        /// New expiration date or date-time
        #[arg(long)]
        expires: Option<Cutoff>,
    },

    /// Disable access for a client
    Disable {
        /// Client to disable
        client: ClientId,
        /// Effective expiration date or date-time (defaults to now)
        #[arg(long)]
        expires: Option<Cutoff>,
    },
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Dataset file backing the in-memory store
    pub dataset_path: Option<String>,

    /// Output format for command results
    pub output_format: Option<String>,

    /// Window used by `allow-reenable` when no day count is given
    pub default_reenable_days: Option<i64>,

    /// Re-enable decision for clients with no expiration on record
    pub never_disabled_policy: Option<NeverDisabledPolicy>,

    /// Only report occupants holding an unexpired card
    pub occupancy_requires_active_card: Option<bool>,

    /// Extend violation windows by the event just before them
    pub violation_look_behind: Option<bool>,

    /// Extend violation windows by the event just after them
    pub violation_look_ahead: Option<bool>,

    /// Directory for rolling log files
    pub log_directory: Option<String>,
}

/// Configuration for the physical access engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dataset file backing the in-memory store
    pub dataset_path: String,

    /// Output format for command results
    pub output_format: String,

    /// Window used by `allow-reenable` when no day count is given
    pub default_reenable_days: i64,

    /// Re-enable decision for clients with no expiration on record
    pub never_disabled_policy: NeverDisabledPolicy,

    /// Only report occupants holding an unexpired card
    pub occupancy_requires_active_card: bool,

    /// Extend violation windows by the event just before them
    pub violation_look_behind: bool,

    /// Extend violation windows by the event just after them
    pub violation_look_ahead: bool,

    /// Directory for rolling log files
    pub log_directory: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// A command line value could not be interpreted
    #[error("Invalid value for {field}: {message}")]
    InvalidArgument {
        /// Name of the offending option
        field: String,
        /// Parser message
        message: String,
    },
}

/// Validation errors for engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Output format is not supported
    #[error("Unknown output format: {0} (supported: json, csv)")]
    InvalidOutputFormat(String),

    /// Re-enable window is negative
    #[error("Default re-enable days must not be negative, got {0}")]
    InvalidReenableDays(i64),

    /// Dataset path is empty
    #[error("Dataset path must not be empty")]
    EmptyDatasetPath,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_path: defaults::DATASET_PATH.to_string(),
            output_format: "json".to_string(),
            default_reenable_days: defaults::REENABLE_DAYS,
            never_disabled_policy: NeverDisabledPolicy::Allow,
            occupancy_requires_active_card: false,
            violation_look_behind: true,
            violation_look_ahead: true,
            log_directory: None,
        }
    }
}

impl EngineConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config = Self::default();

        // Load from config file if specified
        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // Override with command line arguments (CLI takes precedence)
        Self::apply_cli_overrides(&mut config, args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            dataset_path: config_file.dataset_path.unwrap_or(defaults.dataset_path),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            default_reenable_days: config_file
                .default_reenable_days
                .unwrap_or(defaults.default_reenable_days),
            never_disabled_policy: config_file
                .never_disabled_policy
                .unwrap_or(defaults.never_disabled_policy),
            occupancy_requires_active_card: config_file
                .occupancy_requires_active_card
                .unwrap_or(defaults.occupancy_requires_active_card),
            violation_look_behind: config_file
                .violation_look_behind
                .unwrap_or(defaults.violation_look_behind),
            violation_look_ahead: config_file
                .violation_look_ahead
                .unwrap_or(defaults.violation_look_ahead),
            log_directory: config_file.log_directory.or(defaults.log_directory),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(value) = &args.dataset {
            config.dataset_path = value.clone();
        }
        if let Some(value) = &args.output_format {
            config.output_format = value.clone();
        }
        if let Some(value) = &args.never_disabled_policy {
            config.never_disabled_policy =
                value.parse().map_err(|message| ConfigError::InvalidArgument {
                    field: "never-disabled-policy".to_string(),
                    message,
                })?;
        }
        if args.require_active_card {
            config.occupancy_requires_active_card = true;
        } else if args.no_require_active_card {
            config.occupancy_requires_active_card = false;
        }
        if args.strict_window {
            config.violation_look_behind = false;
            config.violation_look_ahead = false;
        } else if args.no_strict_window {
            config.violation_look_behind = true;
            config.violation_look_ahead = true;
        }
        if let Some(value) = &args.log_dir {
            config.log_directory = Some(value.clone());
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.get_output_format()
            .map_err(|_| ConfigValidationError::InvalidOutputFormat(self.output_format.clone()))?;

        if self.default_reenable_days < 0 {
            return Err(ConfigValidationError::InvalidReenableDays(self.default_reenable_days));
        }

        if self.dataset_path.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatasetPath);
        }

        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }
}
