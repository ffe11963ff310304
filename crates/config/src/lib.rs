//! Configuration management for tandem
//!
//! This crate provides functionality for managing the tandem configuration, including loading,
//! saving, updating, and deleting configuration settings. The exploration limits used by the
//! analysis engine are read from here unless a command overrides them.

/// Error types for the configuration module
pub mod error;

use crate::error::Error;
use clap::Parser;
use serde::{Deserialize, Serialize};
#[allow(deprecated)]
use std::env::home_dir;
use std::path::PathBuf;
use tandem_common::utils::io::file::{delete_path, read_file, write_file};
use tandem_vm::{
    core::constants::{GAS_CONSTANT, LOOP_ITERATION_CAP, MAX_CALL_DEPTH, MAX_MEMORY_SIZE},
    ext::exec::ExplorationConfig,
};
use tracing::{error, info};

/// Command line arguments for the configuration command
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Display and edit the current configuration",
    override_usage = "tandem config [OPTIONS]"
)]
pub struct ConfigArgs {
    /// The target key to update.
    #[clap(required = false, default_value = "")]
    key: String,

    /// The value to set the key to.
    #[clap(required = false, default_value = "")]
    value: String,
}

/// The [`Configuration`] struct represents the configuration of the CLI. Every tandem command
/// reads its defaults from this configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    /// The chain snapshot to analyze when a command doesn't name one
    pub snapshot_path: String,

    /// How many times a loop body is re-executed before the transaction is abandoned
    pub loop_iteration_cap: usize,

    /// The deepest nested call level explored
    pub max_call_depth: usize,

    /// Upper bound on the memory of a call frame, in bytes
    pub max_memory_size: u64,

    /// The value reported by the GAS opcode
    pub gas_constant: u64,

    /// Whether an invalid opcode abandons the transaction instead of ending its branch
    pub strict_invalid: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            snapshot_path: "".to_string(),
            loop_iteration_cap: LOOP_ITERATION_CAP,
            max_call_depth: MAX_CALL_DEPTH,
            max_memory_size: MAX_MEMORY_SIZE,
            gas_constant: GAS_CONSTANT,
            strict_invalid: false,
        }
    }
}

/// The path of the configuration file, `$HOME/.tandem/config.toml`.
#[allow(deprecated)]
fn config_path() -> Result<String, Error> {
    let mut home: PathBuf = home_dir().ok_or_else(|| {
        Error::Generic(
            "failed to get home directory. does your os support `std::env::home_dir()`?"
                .to_string(),
        )
    })?;
    home.push(".tandem");
    home.push("config.toml");

    home.to_str()
        .map(|path| path.to_string())
        .ok_or_else(|| Error::Generic("failed to convert path to string".to_string()))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse::<T>().map_err(|_| {
        Error::ParseError(format!("invalid value: \'{value}\' is not a valid \'{key}\'."))
    })
}

impl Configuration {
    /// Returns the current configuration.
    pub fn load() -> Result<Self, Error> {
        let path = config_path()?;

        // if the config file doesn't exist, create it
        if !std::path::Path::new(&path).exists() {
            let config = Configuration::default();
            config.save()?;
        }

        // read the config file
        let contents = read_file(&path)
            .map_err(|e| Error::Generic(format!("failed to read config file: {e}")))?;

        // parse the config file
        toml::from_str(&contents)
            .map_err(|e| Error::ParseError(format!("failed to parse config file: {e}")))
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> Result<(), Error> {
        write_file(
            &config_path()?,
            &toml::to_string(&self)
                .map_err(|e| Error::ParseError(format!("failed to serialize config: {e}")))?,
        )
        .map_err(|e| Error::Generic(format!("failed to write config file: {e}")))?;

        Ok(())
    }

    /// Deletes the configuration file at `$HOME/.tandem/config.toml`.
    pub fn delete() -> Result<(), Error> {
        delete_path(&config_path()?);
        Ok(())
    }

    /// Update a single key/value pair in the configuration.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), Error> {
        // update the key in the struct and ensure it's the correct type
        match key {
            "snapshot_path" => {
                self.snapshot_path = value.to_string();
            }
            "loop_iteration_cap" => {
                self.loop_iteration_cap = parse_value(key, value)?;
            }
            "max_call_depth" => {
                self.max_call_depth = parse_value(key, value)?;
            }
            "max_memory_size" => {
                self.max_memory_size = parse_value(key, value)?;
            }
            "gas_constant" => {
                self.gas_constant = parse_value(key, value)?;
            }
            "strict_invalid" => {
                self.strict_invalid = parse_value(key, value)?;
            }
            _ => return Err(Error::UnknownKey(key.to_string())),
        }

        // write the updated config to disk
        self.save()?;

        Ok(())
    }

    /// The exploration limits described by this configuration.
    pub fn exploration_config(&self) -> ExplorationConfig {
        ExplorationConfig {
            loop_iteration_cap: self.loop_iteration_cap,
            max_call_depth: self.max_call_depth,
            max_memory_size: self.max_memory_size,
            gas_constant: self.gas_constant,
            strict_invalid: self.strict_invalid,
            record_blocks: false,
        }
    }
}

/// The `config` command is used to display and edit the current configuration.
pub fn config(args: ConfigArgs) -> Result<(), Error> {
    if !args.key.is_empty() {
        if !args.value.is_empty() {
            // read the config file and update the key/value pair
            let mut config = Configuration::load()?;
            config.update(&args.key, &args.value)?;
            info!("updated configuration! Set \'{}\' = \'{}\' .", &args.key, &args.value);
        } else {
            // key is set, but no value is set
            error!("found key but no value to set. Please specify a value to set, use `tandem config --help` for more information.");
        }
    } else {
        // no key is set, print the config file
        println!("{:#?}", Configuration::load()?);
        info!("use `tandem config <KEY> <VALUE>` to set a key/value pair.");
    }

    Ok(())
}
