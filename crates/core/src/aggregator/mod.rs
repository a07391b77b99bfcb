//! Time-weighted resampling of simulation ticks.
//!
//! Ticks arrive at irregular, simulation-controlled steps. In
//! [`ResamplingMode::FixedInterval`] each tick contributes its values scaled
//! by the fraction of one interval that elapsed since the previous tick, and
//! the accumulated sums are emitted whenever the simulation time lands on an
//! interval boundary. [`ResamplingMode::Passthrough`] emits every tick as-is.

use crate::{ChannelSet, ResamplingMode, Result, ScopeError, SeriesReader, SeriesStore};

/// Narrow interface a host integration drives the scope through.
pub trait Scope<C> {
    /// Feeds one simulation tick, with one value per channel.
    fn update(&mut self, simulation_time: i64, values: &[f32]) -> Result<()>;

    /// Visits every tracked channel with the shared timestamp axis.
    fn for_each_series<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&C, &[i64], &[f64]);

    fn resampling_mode(&self) -> ResamplingMode;
}

/// Resampling state machine holding the running sums of every tracked
/// channel between two flush points.
#[derive(Debug)]
pub struct Aggregator<C> {
    channels: ChannelSet<C>,
    mode: ResamplingMode,
    /// One entry per active channel, in [`ChannelSet::active_indices`] order.
    running_sums: Vec<f64>,
    pending_weight: f64,
    last_simulation_time: i64,
    /// Most recent interval boundary that has been emitted. The run starts on
    /// the closed boundary at 0.
    last_boundary: i64,
    store: SeriesStore<C>,
}

impl<C: Clone> Aggregator<C> {
    pub fn new(channels: ChannelSet<C>, mode: ResamplingMode) -> Self {
        let tracked = channels.active().map(|(_, channel)| channel.clone()).collect();
        Self {
            running_sums: vec![0.0; channels.active_len()],
            channels,
            mode,
            pending_weight: 0.0,
            last_simulation_time: 0,
            last_boundary: 0,
            store: SeriesStore::new(tracked),
        }
    }
}

impl<C> Aggregator<C> {
    pub fn channels(&self) -> &ChannelSet<C> {
        &self.channels
    }

    /// Handle for renderers, which may live on another thread.
    pub fn reader(&self) -> SeriesReader<C> {
        self.store.reader()
    }

    pub fn last_simulation_time(&self) -> i64 {
        self.last_simulation_time
    }

    /// Fraction of the current interval covered by ticks accumulated since
    /// the last flush.
    pub fn pending_weight(&self) -> f64 {
        self.pending_weight
    }

    fn validate(&self, simulation_time: i64, values: &[f32]) -> Result<()> {
        if values.len() != self.channels.len() {
            return Err(ScopeError::ShapeMismatch {
                expected: self.channels.len(),
                actual: values.len(),
            });
        }
        if simulation_time < self.last_simulation_time {
            return Err(ScopeError::NonMonotonicTime {
                previous: self.last_simulation_time,
                current: simulation_time,
            });
        }
        Ok(())
    }

    fn timestep_weight(&self, simulation_time: i64) -> f64 {
        match self.mode {
            ResamplingMode::Passthrough => 1.0,
            ResamplingMode::FixedInterval(interval) => {
                (simulation_time - self.last_simulation_time) as f64 / interval.seconds() as f64
            }
        }
    }

    fn is_flush_point(&self, simulation_time: i64) -> bool {
        match self.mode {
            ResamplingMode::Passthrough => true,
            ResamplingMode::FixedInterval(interval) => {
                simulation_time.rem_euclid(interval.seconds()) == 0
                    && simulation_time > self.last_boundary
            }
        }
    }

    fn flush(&mut self, simulation_time: i64, values: &[f32], weight: f64) -> Result<()> {
        let emitted: Vec<f64> = self
            .channels
            .active_indices()
            .iter()
            .zip(&self.running_sums)
            .map(|(&index, sum)| sum + f64::from(values[index]) * weight)
            .collect();

        self.store.append(simulation_time, &emitted)?;
        self.running_sums.iter_mut().for_each(|sum| *sum = 0.0);
        self.pending_weight = 0.0;
        self.last_boundary = simulation_time;

        tracing::debug!(
            simulation_time,
            channels = emitted.len(),
            "flushed scope point"
        );
        Ok(())
    }

    fn accumulate(&mut self, values: &[f32], weight: f64) {
        for (&index, sum) in self
            .channels
            .active_indices()
            .iter()
            .zip(self.running_sums.iter_mut())
        {
            *sum += f64::from(values[index]) * weight;
        }
        self.pending_weight += weight;
    }
}

impl<C> Scope<C> for Aggregator<C> {
    fn update(&mut self, simulation_time: i64, values: &[f32]) -> Result<()> {
        self.validate(simulation_time, values)?;

        let weight = self.timestep_weight(simulation_time);
        if self.is_flush_point(simulation_time) {
            self.flush(simulation_time, values, weight)?;
        } else {
            self.accumulate(values, weight);
        }
        self.last_simulation_time = simulation_time;
        Ok(())
    }

    fn for_each_series<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&C, &[i64], &[f64]),
    {
        self.store.reader().for_each_series(visit)
    }

    fn resampling_mode(&self) -> ResamplingMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<C: Clone>(scope: &Aggregator<C>) -> Vec<(C, Vec<i64>, Vec<f64>)> {
        let mut out = Vec::new();
        scope
            .for_each_series(|channel, timestamps, values| {
                out.push((channel.clone(), timestamps.to_vec(), values.to_vec()));
            })
            .unwrap();
        out
    }

    fn fixed(seconds: i64) -> ResamplingMode {
        ResamplingMode::fixed_interval(seconds).unwrap()
    }

    #[test]
    fn passthrough_emits_raw_values() {
        let channels = ChannelSet::all_active(vec!["a", "b"]);
        let mut scope = Aggregator::new(channels, ResamplingMode::Passthrough);

        scope.update(3, &[1.5, -2.0]).unwrap();
        scope.update(7, &[2.5, 4.0]).unwrap();
        scope.update(8, &[0.0, 8.0]).unwrap();

        let series = collect(&scope);
        assert_eq!(series[0], ("a", vec![3, 7, 8], vec![1.5, 2.5, 0.0]));
        assert_eq!(series[1], ("b", vec![3, 7, 8], vec![-2.0, 4.0, 8.0]));
        assert_eq!(scope.pending_weight(), 0.0);
    }

    #[test]
    fn averages_quarter_steps_into_one_point() {
        let channels = ChannelSet::all_active(vec!["t"]);
        let mut scope = Aggregator::new(channels, fixed(900));

        for time in [0, 225, 450, 675, 900] {
            scope.update(time, &[4.0]).unwrap();
        }

        assert_eq!(collect(&scope), vec![("t", vec![900], vec![4.0])]);
    }

    #[test]
    fn first_tick_on_boundary_has_full_weight() {
        let channels = ChannelSet::all_active(vec!["t"]);
        let mut scope = Aggregator::new(channels, fixed(60));

        scope.update(60, &[7.0]).unwrap();

        assert_eq!(collect(&scope), vec![("t", vec![60], vec![7.0])]);
    }

    #[test]
    fn weights_irregular_steps_by_elapsed_time() {
        let channels = ChannelSet::all_active(vec!["t"]);
        let mut scope = Aggregator::new(channels, fixed(100));

        scope.update(10, &[10.0]).unwrap();
        scope.update(50, &[20.0]).unwrap();
        assert!((scope.pending_weight() - 0.5).abs() < 1e-12);
        scope.update(100, &[40.0]).unwrap();

        // 0.1 * 10 + 0.4 * 20 + 0.5 * 40
        let series = collect(&scope);
        assert_eq!(series[0].1, vec![100]);
        assert!((series[0].2[0] - 29.0).abs() < 1e-9);
    }

    #[test]
    fn running_sums_reset_after_flush() {
        let channels = ChannelSet::all_active(vec!["t"]);
        let mut scope = Aggregator::new(channels, fixed(10));

        scope.update(5, &[100.0]).unwrap();
        scope.update(10, &[100.0]).unwrap();
        scope.update(15, &[2.0]).unwrap();
        scope.update(20, &[2.0]).unwrap();

        assert_eq!(collect(&scope), vec![("t", vec![10, 20], vec![100.0, 2.0])]);
    }

    #[test]
    fn repeated_boundary_tick_does_not_flush_twice() {
        let channels = ChannelSet::all_active(vec!["t"]);
        let mut scope = Aggregator::new(channels, fixed(10));

        scope.update(10, &[1.0]).unwrap();
        scope.update(10, &[5.0]).unwrap();
        scope.update(20, &[1.0]).unwrap();

        assert_eq!(collect(&scope), vec![("t", vec![10, 20], vec![1.0, 1.0])]);
    }

    #[test]
    fn inactive_channels_are_never_stored() {
        let channels = ChannelSet::new(vec!["on", "off", "on2"], |name| !name.starts_with("off"));
        let mut scope = Aggregator::new(channels, ResamplingMode::Passthrough);

        scope.update(1, &[1.0, 999.0, 3.0]).unwrap();

        let series = collect(&scope);
        let names: Vec<_> = series.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, vec!["on", "on2"]);
        assert_eq!(series[1].2, vec![3.0]);
    }

    #[test]
    fn rejects_shape_mismatch_without_state_change() {
        let channels = ChannelSet::all_active(vec!["a", "b"]);
        let mut scope = Aggregator::new(channels, ResamplingMode::Passthrough);

        let err = scope.update(5, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(scope.last_simulation_time(), 0);
        assert!(scope.reader().is_empty().unwrap());
    }

    #[test]
    fn rejects_time_going_backwards() {
        let channels = ChannelSet::all_active(vec!["a"]);
        let mut scope = Aggregator::new(channels, fixed(10));

        scope.update(5, &[1.0]).unwrap();
        let err = scope.update(3, &[1.0]).unwrap_err();

        assert!(matches!(
            err,
            ScopeError::NonMonotonicTime {
                previous: 5,
                current: 3
            }
        ));
        assert_eq!(scope.last_simulation_time(), 5);
        assert!((scope.pending_weight() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reading_twice_is_idempotent() {
        let channels = ChannelSet::all_active(vec!["a", "b"]);
        let mut scope = Aggregator::new(channels, fixed(2));
        for time in 1..=6 {
            scope.update(time, &[time as f32, 1.0]).unwrap();
        }

        assert_eq!(collect(&scope), collect(&scope));
        assert_eq!(scope.resampling_mode(), fixed(2));
    }
}
