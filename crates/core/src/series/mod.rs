use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::{Result, ScopeError};

#[derive(Debug)]
struct SeriesData<C> {
    channels: Vec<C>,
    timestamps: Vec<i64>,
    values: Vec<Vec<f64>>,
}

/// Write side of the flushed series. Owned by the aggregator, which is the
/// only writer; renderers get a [`SeriesReader`] instead.
#[derive(Debug)]
pub struct SeriesStore<C> {
    shared: Arc<RwLock<SeriesData<C>>>,
}

impl<C> SeriesStore<C> {
    /// Creates an empty store with one series per tracked channel.
    pub fn new(channels: Vec<C>) -> Self {
        let values = channels.iter().map(|_| Vec::new()).collect();
        Self {
            shared: Arc::new(RwLock::new(SeriesData {
                channels,
                timestamps: Vec::new(),
                values,
            })),
        }
    }

    /// Appends one point to every series. The timestamp and all values land
    /// under the same write lock, so readers see either all or none of them.
    pub fn append(&mut self, timestamp: i64, values: &[f64]) -> Result<()> {
        let mut data = self.write()?;
        if values.len() != data.values.len() {
            return Err(ScopeError::ShapeMismatch {
                expected: data.values.len(),
                actual: values.len(),
            });
        }

        data.timestamps.push(timestamp);
        for (series, value) in data.values.iter_mut().zip(values) {
            series.push(*value);
        }
        Ok(())
    }

    pub fn reader(&self) -> SeriesReader<C> {
        SeriesReader {
            shared: self.shared.clone(),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SeriesData<C>>> {
        self.shared
            .write()
            .map_err(|_| ScopeError::Poisoned("series store"))
    }
}

/// Shared, thread-safe read view over a [`SeriesStore`].
pub struct SeriesReader<C> {
    shared: Arc<RwLock<SeriesData<C>>>,
}

impl<C> Clone for SeriesReader<C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<C> SeriesReader<C> {
    /// Visits every tracked channel in order with the shared timestamp axis
    /// and that channel's values. Only fully flushed points are visible.
    pub fn for_each_series<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&C, &[i64], &[f64]),
    {
        let data = self.read()?;
        for (channel, values) in data.channels.iter().zip(&data.values) {
            visit(channel, &data.timestamps, values);
        }
        Ok(())
    }

    /// Number of flushed points per series.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.timestamps.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Timestamp and per-channel values of the most recent flush.
    pub fn latest(&self) -> Result<Option<(i64, Vec<f64>)>> {
        let data = self.read()?;
        Ok(data.timestamps.last().map(|&timestamp| {
            let values = data
                .values
                .iter()
                .filter_map(|series| series.last().copied())
                .collect();
            (timestamp, values)
        }))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SeriesData<C>>> {
        self.shared
            .read()
            .map_err(|_| ScopeError::Poisoned("series store"))
    }
}

impl<C: Clone> SeriesReader<C> {
    /// Copies the current state of every series out of the store.
    pub fn snapshot(&self) -> Result<SeriesSnapshot<C>> {
        let data = self.read()?;
        Ok(SeriesSnapshot {
            timestamps: data.timestamps.clone(),
            series: data
                .channels
                .iter()
                .zip(&data.values)
                .map(|(channel, values)| ChannelSeries {
                    channel: channel.clone(),
                    values: values.clone(),
                })
                .collect(),
        })
    }
}

impl<C> std::fmt::Debug for SeriesReader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesReader").finish()
    }
}

/// Owned copy of the flushed series, detached from the live store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot<C> {
    pub timestamps: Vec<i64>,
    pub series: Vec<ChannelSeries<C>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSeries<C> {
    pub channel: C,
    pub values: Vec<f64>,
}
