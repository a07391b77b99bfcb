use crate::{Result, ScopeError, SeriesReader};

/// Chart backend abstraction. Implementations receive whole series and never
/// touch the aggregation state.
pub trait RenderAdapter {
    fn add_series(&mut self, label: &str, timestamps: &[i64], values: &[f64]) -> Result<()>;

    fn update_series(&mut self, label: &str, timestamps: &[i64], values: &[f64]) -> Result<()>;

    /// Repaints after a batch of series updates.
    fn draw(&mut self) -> Result<()> {
        Ok(())
    }
}

type Labeller<C> = Box<dyn Fn(&C) -> String + Send>;

/// Pushes the flushed series of a scope into a [`RenderAdapter`].
pub struct ScopeView<C, A> {
    reader: SeriesReader<C>,
    labeller: Labeller<C>,
    adapter: A,
}

impl<C, A: RenderAdapter> ScopeView<C, A> {
    /// Registers one chart series per tracked channel.
    pub fn new<L>(reader: SeriesReader<C>, labeller: L, mut adapter: A) -> Result<Self>
    where
        L: Fn(&C) -> String + Send + 'static,
    {
        let mut outcome = Ok(());
        reader.for_each_series(|channel, timestamps, values| {
            if outcome.is_ok() {
                outcome = adapter.add_series(&labeller(channel), timestamps, values);
            }
        })?;
        outcome?;

        Ok(Self {
            reader,
            labeller: Box::new(labeller),
            adapter,
        })
    }

    /// Replaces every chart series with the current store contents and
    /// repaints.
    pub fn refresh(&mut self) -> Result<()> {
        let mut outcome = Ok(());
        let labeller = &self.labeller;
        let adapter = &mut self.adapter;
        self.reader.for_each_series(|channel, timestamps, values| {
            if outcome.is_ok() {
                outcome = adapter.update_series(&labeller(channel), timestamps, values);
            }
        })?;
        outcome?;
        self.adapter.draw()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }
}

impl<C, A: std::fmt::Debug> std::fmt::Debug for ScopeView<C, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeView")
            .field("adapter", &self.adapter)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSeries {
    pub label: String,
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

/// In-memory chart that keeps the latest copy of every series.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    series: Vec<RecordedSeries>,
    updates: usize,
    draws: usize,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> &[RecordedSeries] {
        &self.series
    }

    pub fn get(&self, label: &str) -> Option<&RecordedSeries> {
        self.series.iter().find(|series| series.label == label)
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RenderAdapter for RecordingAdapter {
    fn add_series(&mut self, label: &str, timestamps: &[i64], values: &[f64]) -> Result<()> {
        if self.get(label).is_some() {
            return Err(ScopeError::msg(format!("series `{label}` is already registered")));
        }
        self.series.push(RecordedSeries {
            label: label.to_string(),
            timestamps: timestamps.to_vec(),
            values: values.to_vec(),
        });
        Ok(())
    }

    fn update_series(&mut self, label: &str, timestamps: &[i64], values: &[f64]) -> Result<()> {
        let series = self
            .series
            .iter_mut()
            .find(|series| series.label == label)
            .ok_or_else(|| ScopeError::msg(format!("unknown series `{label}`")))?;
        series.timestamps = timestamps.to_vec();
        series.values = values.to_vec();
        self.updates += 1;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.draws += 1;
        Ok(())
    }
}

/// Headless chart that reports each refresh through `tracing`.
#[derive(Debug, Default)]
pub struct TracingAdapter {
    draws: usize,
}

impl TracingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RenderAdapter for TracingAdapter {
    fn add_series(&mut self, label: &str, timestamps: &[i64], _values: &[f64]) -> Result<()> {
        tracing::info!(label, points = timestamps.len(), "added scope series");
        Ok(())
    }

    fn update_series(&mut self, label: &str, timestamps: &[i64], values: &[f64]) -> Result<()> {
        tracing::debug!(
            label,
            points = timestamps.len(),
            time = timestamps.last().copied(),
            value = values.last().copied(),
            "updated scope series"
        );
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.draws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Aggregator, ChannelSet, ResamplingMode, Scope, Sensor};

    fn scope() -> Aggregator<Sensor> {
        let channels = ChannelSet::from_sensors(vec![
            Sensor::new("T tank", "°C"),
            Sensor::unused("Spare", ""),
        ]);
        Aggregator::new(channels, ResamplingMode::Passthrough)
    }

    #[test]
    fn registers_then_updates_series() {
        let mut scope = scope();
        let mut view =
            ScopeView::new(scope.reader(), Sensor::label, RecordingAdapter::new()).unwrap();

        assert_eq!(view.adapter().series().len(), 1);
        assert!(view.adapter().get("T tank / °C").unwrap().values.is_empty());

        scope.update(60, &[21.5, 0.0]).unwrap();
        view.refresh().unwrap();

        let series = view.adapter().get("T tank / °C").unwrap();
        assert_eq!(series.timestamps, vec![60]);
        assert_eq!(series.values, vec![21.5]);
        assert_eq!(view.adapter().updates(), 1);
        assert_eq!(view.adapter().draws(), 1);
    }

    #[test]
    fn duplicate_labels_fail_registration() {
        let channels = ChannelSet::all_active(vec!["a", "b"]);
        let scope = Aggregator::new(channels, ResamplingMode::Passthrough);

        let result = ScopeView::new(scope.reader(), |_| "same".to_string(), RecordingAdapter::new());
        assert!(result.is_err());
    }

    #[test]
    fn tracing_adapter_counts_draws() {
        let mut scope = scope();
        let mut view =
            ScopeView::new(scope.reader(), Sensor::label, TracingAdapter::new()).unwrap();
        scope.update(1, &[1.0, 2.0]).unwrap();
        view.refresh().unwrap();
        view.refresh().unwrap();

        assert_eq!(view.into_adapter().draws(), 2);
    }
}
