//! Configuration file handling.
//!
//! This module handles loading fleet files (`.fleetdispatch.toml`) and
//! turning them into agents and tasks.

use crate::agent::{Agent, AgentSpec, TransitProfile, TransitTime};
use crate::dispatch::Task;
use crate::error::FleetError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default fleet file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".fleetdispatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Simulated transit times.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Agents available for dispatch. Empty when a fleet file declares none.
    #[serde(default)]
    pub agents: Vec<AgentSpec>,

    /// Deliveries to perform. Empty when a fleet file declares none.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            timing: TimingConfig::default(),
            agents: default_agents(),
            tasks: default_tasks(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output format: text, markdown or json.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Rendering of the dispatch results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text lines (default)
    #[default]
    Text,
    /// Markdown report
    Markdown,
    /// JSON report
    Json,
}

/// Transit times in seconds, before scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Multiplier applied to every transit time. `0.0` makes deliveries instant.
    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(default = "default_ground_min")]
    pub ground_min_secs: f64,

    #[serde(default = "default_ground_max")]
    pub ground_max_secs: f64,

    #[serde(default = "default_air")]
    pub air_secs: f64,

    #[serde(default = "default_sea")]
    pub sea_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            ground_min_secs: default_ground_min(),
            ground_max_secs: default_ground_max(),
            air_secs: default_air(),
            sea_secs: default_sea(),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_ground_min() -> f64 {
    3.0
}

fn default_ground_max() -> f64 {
    7.0
}

fn default_air() -> f64 {
    1.0
}

fn default_sea() -> f64 {
    5.0
}

impl TimingConfig {
    /// Validate the timings and build the per-kind transit profile.
    pub fn profile(&self) -> Result<TransitProfile, FleetError> {
        let fields = [
            ("scale", self.scale),
            ("ground_min_secs", self.ground_min_secs),
            ("ground_max_secs", self.ground_max_secs),
            ("air_secs", self.air_secs),
            ("sea_secs", self.sea_secs),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(FleetError::InvalidTiming(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.ground_min_secs > self.ground_max_secs {
            return Err(FleetError::InvalidTiming(format!(
                "ground_min_secs ({}) exceeds ground_max_secs ({})",
                self.ground_min_secs, self.ground_max_secs
            )));
        }

        let secs = |s: f64| {
            Duration::try_from_secs_f64(s * self.scale).map_err(|_| {
                FleetError::InvalidTiming(format!("{}s scaled by {} is out of range", s, self.scale))
            })
        };
        Ok(TransitProfile {
            ground: TransitTime::Between {
                min: secs(self.ground_min_secs)?,
                max: secs(self.ground_max_secs)?,
            },
            air: TransitTime::Fixed(secs(self.air_secs)?),
            sea: TransitTime::Fixed(secs(self.sea_secs)?),
        })
    }
}

/// A delivery request as written in the fleet file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Id of the agent that should carry the package.
    pub agent: String,
    pub destination: String,
}

fn default_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec::ground("A8U5", 5),
        AgentSpec::air("1234N", 15),
        AgentSpec::sea("6TD4G", "Clear"),
    ]
}

fn default_tasks() -> Vec<TaskSpec> {
    [("A8U5", "Marseille"), ("1234N", "Belgique"), ("6TD4G", "Allemagne")]
        .into_iter()
        .map(|(agent, destination)| TaskSpec {
            agent: agent.to_string(),
            destination: destination.to_string(),
        })
        .collect()
}

/// Agents and tasks ready for dispatch.
#[derive(Debug, Clone)]
pub struct Fleet {
    /// Agents in declaration order.
    pub agents: Vec<Arc<Agent>>,
    pub tasks: Vec<Task>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(scale) = args.time_scale {
            self.timing.scale = scale;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level after merging: `--quiet` wins, then verbose from either source.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if args.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build every agent, then resolve every task against them.
    ///
    /// Fails on the first configuration problem, before anything is dispatched.
    pub fn build_fleet(&self) -> Result<Fleet, FleetError> {
        let profile = self.timing.profile()?;

        let mut agents = Vec::with_capacity(self.agents.len());
        let mut by_id: HashMap<&str, Arc<Agent>> = HashMap::new();

        for spec in &self.agents {
            let agent = Arc::new(spec.build(&profile)?);
            if by_id.insert(spec.id.as_str(), agent.clone()).is_some() {
                return Err(FleetError::DuplicateAgent(spec.id.clone()));
            }
            agents.push(agent);
        }

        let tasks = self
            .tasks
            .iter()
            .map(|t| {
                by_id
                    .get(t.agent.as_str())
                    .map(|agent| Task::new(agent.clone(), t.destination.clone()))
                    .ok_or_else(|| FleetError::UnknownAgent {
                        destination: t.destination.clone(),
                        agent: t.agent.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Fleet { agents, tasks })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
