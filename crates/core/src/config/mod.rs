use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Result, ScopeError, Sensor};

pub const MIN_FIXED_INTERVAL_S: i64 = 1;
pub const MAX_FIXED_INTERVAL_S: i64 = 3600;
pub const DEFAULT_FIXED_INTERVAL_S: i64 = 900;

/// Validated length of one resampling interval in simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedInterval(i64);

impl FixedInterval {
    pub fn new(seconds: i64) -> Result<Self> {
        if (MIN_FIXED_INTERVAL_S..=MAX_FIXED_INTERVAL_S).contains(&seconds) {
            Ok(Self(seconds))
        } else {
            Err(ScopeError::InvalidInterval {
                seconds,
                min: MIN_FIXED_INTERVAL_S,
                max: MAX_FIXED_INTERVAL_S,
            })
        }
    }

    pub fn seconds(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FixedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s", self.0)
    }
}

/// How incoming ticks are turned into plotted points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingMode {
    /// Every tick becomes a point with its raw values.
    Passthrough,
    /// Ticks are averaged, weighted by elapsed time, into fixed intervals.
    FixedInterval(FixedInterval),
}

impl ResamplingMode {
    pub fn fixed_interval(seconds: i64) -> Result<Self> {
        FixedInterval::new(seconds).map(Self::FixedInterval)
    }

    pub fn interval(&self) -> Option<FixedInterval> {
        match self {
            Self::Passthrough => None,
            Self::FixedInterval(interval) => Some(*interval),
        }
    }
}

impl fmt::Display for ResamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => f.write_str("passthrough"),
            Self::FixedInterval(interval) => write!(f, "fixed interval of {interval}"),
        }
    }
}

/// How often, in simulation time, a renderer should redraw the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateInterval {
    Realtime,
    #[default]
    Hourly,
    Daily,
}

impl UpdateInterval {
    pub fn seconds(self) -> i64 {
        match self {
            Self::Realtime => 1,
            Self::Hourly => 3_600,
            Self::Daily => 86_400,
        }
    }
}

/// Operator-facing scope settings as declared by the host plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Plot every variable simulation step instead of averaging.
    pub variable_time_steps: bool,
    pub fixed_timestep_s: i64,
    pub update_interval: UpdateInterval,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            variable_time_steps: true,
            fixed_timestep_s: DEFAULT_FIXED_INTERVAL_S,
            update_interval: UpdateInterval::default(),
        }
    }
}

impl ScopeConfig {
    pub fn averaged(fixed_timestep_s: i64) -> Self {
        Self {
            variable_time_steps: false,
            fixed_timestep_s,
            ..Self::default()
        }
    }

    /// Resolves the settings into a resampling mode. The fixed step size is
    /// only validated when it is actually used.
    pub fn resampling_mode(&self) -> Result<ResamplingMode> {
        if self.variable_time_steps {
            Ok(ResamplingMode::Passthrough)
        } else {
            ResamplingMode::fixed_interval(self.fixed_timestep_s)
        }
    }
}

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl AppConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
