use serde::{Deserialize, Serialize};

/// Descriptor for a single sensor input wired into the scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    /// Whether the sensor is connected in the host model.
    #[serde(default = "default_used")]
    pub used: bool,
}

fn default_used() -> bool {
    true
}

impl Sensor {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            used: true,
        }
    }

    pub fn unused(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            used: false,
            ..Self::new(name, unit)
        }
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Legend label shown next to the plotted series.
    pub fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} / {}", self.name, self.unit)
        }
    }
}

/// Fixed, ordered list of channels together with the subset that is tracked.
///
/// The activation predicate runs exactly once per channel when the set is
/// built. Everything downstream iterates [`ChannelSet::active`] and never
/// looks at inactive channels again.
#[derive(Debug, Clone)]
pub struct ChannelSet<C> {
    channels: Vec<C>,
    active: Vec<usize>,
}

impl<C> ChannelSet<C> {
    pub fn new<P>(channels: Vec<C>, mut predicate: P) -> Self
    where
        P: FnMut(&C) -> bool,
    {
        let active = channels
            .iter()
            .enumerate()
            .filter_map(|(index, channel)| predicate(channel).then_some(index))
            .collect();
        Self { channels, active }
    }

    pub fn all_active(channels: Vec<C>) -> Self {
        Self::new(channels, |_| true)
    }

    /// Number of channels a tick must carry values for.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.binary_search(&index).is_ok()
    }

    /// Indices into the tick value slice of every tracked channel, in order.
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    /// Tracked channels paired with their index in the tick value slice.
    pub fn active(&self) -> impl Iterator<Item = (usize, &C)> + '_ {
        self.active.iter().map(|&index| (index, &self.channels[index]))
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[C] {
        &self.channels
    }
}

impl ChannelSet<Sensor> {
    /// Tracks only the sensors that are connected in the host model.
    pub fn from_sensors(sensors: Vec<Sensor>) -> Self {
        Self::new(sensors, Sensor::is_used)
    }
}
