use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Aggregator, ChannelSet, RefreshSchedule, ResamplingMode, Result, Scope, ScopeConfig,
    ScopeError, SeriesReader, Sensor,
};

/// Maximum number of generic sensor inputs the host exposes to the scope.
pub const MAX_SENSORS: usize = 30;

/// One call of the host's control loop, as seen by the scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostTick {
    pub simulation_time: i64,
    /// `false` while the controller is switched off in the host model.
    #[serde(default = "default_status")]
    pub status: bool,
    /// Set during the host's initialisation pass before the actual run.
    #[serde(default)]
    pub pre_run: bool,
    pub values: Vec<f32>,
}

fn default_status() -> bool {
    true
}

impl HostTick {
    pub fn new(simulation_time: i64, values: Vec<f32>) -> Self {
        Self {
            simulation_time,
            status: true,
            pre_run: false,
            values,
        }
    }

    pub fn is_recordable(&self) -> bool {
        self.status && !self.pre_run
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Recorded,
    /// Inactive or pre-run tick; no state was touched.
    Skipped,
}

/// Host integration layer. Owns the aggregator but none of its math.
#[derive(Debug)]
pub struct ScopeController {
    config: ScopeConfig,
    aggregator: Aggregator<Sensor>,
}

impl ScopeController {
    pub fn build(config: ScopeConfig, sensors: Vec<Sensor>) -> Result<Self> {
        if sensors.len() > MAX_SENSORS {
            return Err(ScopeError::TooManyChannels {
                count: sensors.len(),
                max: MAX_SENSORS,
            });
        }

        let mode = config.resampling_mode()?;
        let channels = ChannelSet::from_sensors(sensors);
        tracing::info!(
            %mode,
            sensors = channels.len(),
            tracked = channels.active_len(),
            "built scope controller"
        );

        Ok(Self {
            config,
            aggregator: Aggregator::new(channels, mode),
        })
    }

    pub fn name(&self) -> &'static str {
        "Scope"
    }

    pub fn description(&self) -> &'static str {
        "Plots the sensor inputs to a scope during simulation."
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn initialise_simulation(&self, parameters: &BTreeMap<String, serde_json::Value>) {
        tracing::info!("simulation started");
        for (key, value) in parameters {
            tracing::debug!(key = key.as_str(), %value, "simulation parameter");
        }
    }

    /// Forwards a recordable tick to the aggregator. Switched-off and pre-run
    /// ticks are dropped before they can affect accumulated state.
    pub fn control(&mut self, tick: &HostTick) -> Result<TickOutcome> {
        if !tick.is_recordable() {
            return Ok(TickOutcome::Skipped);
        }

        self.aggregator
            .update(tick.simulation_time, &tick.values)
            .map_err(|err| {
                tracing::warn!(simulation_time = tick.simulation_time, %err, "rejected tick");
                err
            })?;
        Ok(TickOutcome::Recorded)
    }

    /// Largest step size the host may take. When averaging, the host must
    /// land on every interval boundary.
    pub fn fixed_timestep(&self, host_default: i64) -> i64 {
        self.resampling_mode()
            .interval()
            .map(|interval| interval.seconds())
            .unwrap_or(host_default)
    }

    pub fn resampling_mode(&self) -> ResamplingMode {
        self.aggregator.resampling_mode()
    }

    pub fn refresh_schedule(&self) -> RefreshSchedule {
        RefreshSchedule::new(self.config.update_interval)
    }

    pub fn reader(&self) -> SeriesReader<Sensor> {
        self.aggregator.reader()
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &Aggregator<Sensor> {
        &self.aggregator
    }
}
