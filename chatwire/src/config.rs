//! Configuration for the `chatwire` tool.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/chatwire/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use chatwire_proto::binary::BinaryReadOptions;
use chatwire_proto::json::{JsonReadOptions, JsonWriteOptions};

/// Errors that can occur when loading tool configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    json: JsonFileConfig,
    binary: BinaryFileConfig,
    log: LogFileConfig,
}

/// `[json]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct JsonFileConfig {
    emit_default_values: Option<bool>,
    use_proto_field_name: Option<bool>,
    strict: Option<bool>,
    pretty: Option<bool>,
}

/// `[binary]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BinaryFileConfig {
    preserve_unknown_fields: Option<bool>,
}

/// `[log]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the tool.
#[derive(clap::Parser, Debug)]
#[command(version, about = "Encode, decode and inspect chat wire messages")]
pub struct CliArgs {
    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
///
/// Switches are tri-state: `--strict` or `--strict=true` turns a behavior on,
/// `--strict=false` turns it off, and leaving the switch out defers to the
/// config file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to config file (default: `~/.config/chatwire/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "CHATWIRE_LOG")]
    pub log_level: Option<String>,

    /// Reject JSON keys the schema does not declare.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub strict: Option<bool>,

    /// Write default-valued string fields in JSON output.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub emit_defaults: Option<bool>,

    /// Key JSON output by declared field names instead of camelCase.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub proto_names: Option<bool>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Discard unknown binary fields instead of keeping them.
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub drop_unknown: Option<bool>,
}

/// Subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Encode a JSON message to hex-encoded binary.
    Encode {
        /// Message type, e.g. `chat.Message` or `Message`.
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// JSON input (`-` or omitted reads stdin).
        input: Option<String>,
    },
    /// Decode hex-encoded binary to JSON.
    Decode {
        /// Message type, e.g. `chat.Message` or `Message`.
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Hex input (`-` or omitted reads stdin).
        input: Option<String>,
    },
    /// Compare two JSON messages structurally. Exits 1 when they differ.
    Compare {
        /// Message type, e.g. `chat.Message` or `Message`.
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// First JSON message.
        left: String,
        /// Second JSON message (`-` or omitted reads stdin).
        right: Option<String>,
    },
    /// List the raw fields of a hex-encoded payload without a schema.
    Inspect {
        /// Hex input (`-` or omitted reads stdin).
        input: Option<String>,
    },
    /// List registered message types and service methods.
    Types,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// JSON output options.
    pub json_write: JsonWriteOptions,
    /// JSON input options.
    pub json_read: JsonReadOptions,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Binary input options.
    pub binary_read: BinaryReadOptions,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            json_write: JsonWriteOptions::default(),
            json_read: JsonReadOptions::default(),
            pretty: false,
            binary_read: BinaryReadOptions::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl ToolConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and missing file
    /// is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ToolConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &GlobalArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let flag = |from_cli: Option<bool>, from_file: Option<bool>, default: bool| {
            from_cli.or(from_file).unwrap_or(default)
        };

        Self {
            json_write: JsonWriteOptions {
                emit_default_values: flag(
                    cli.emit_defaults,
                    file.json.emit_default_values,
                    defaults.json_write.emit_default_values,
                ),
                use_proto_field_name: flag(
                    cli.proto_names,
                    file.json.use_proto_field_name,
                    defaults.json_write.use_proto_field_name,
                ),
            },
            json_read: JsonReadOptions {
                strict: flag(cli.strict, file.json.strict, defaults.json_read.strict),
            },
            pretty: flag(cli.pretty, file.json.pretty, defaults.pretty),
            binary_read: BinaryReadOptions {
                read_unknown_fields: flag(
                    cli.drop_unknown.map(|drop| !drop),
                    file.binary.preserve_unknown_fields,
                    defaults.binary_read.read_unknown_fields,
                ),
            },
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.log.level.clone())
                .unwrap_or(defaults.log_level),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the tool.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("chatwire").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
