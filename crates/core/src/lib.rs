//! Core library for the Sensor Scope.
//!
//! The crate turns a stream of per-tick simulation sensor readings into
//! plottable series. Each module owns a distinct concern (channel selection,
//! configuration, time-weighted aggregation, the shared series store, render
//! adapters and the host-facing controller) so hosts and renderers only ever
//! talk to narrow interfaces.

pub mod aggregator;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod series;
pub mod timeline;

pub use aggregator::{Aggregator, Scope};
pub use channel::{ChannelSet, Sensor};
pub use config::{AppConfig, FixedInterval, ResamplingMode, ScopeConfig, UpdateInterval};
pub use controller::{HostTick, ScopeController, TickOutcome, MAX_SENSORS};
pub use error::{Result, ScopeError};
pub use render::{RecordedSeries, RecordingAdapter, RenderAdapter, ScopeView, TracingAdapter};
pub use series::{ChannelSeries, SeriesReader, SeriesSnapshot, SeriesStore};
pub use timeline::RefreshSchedule;
