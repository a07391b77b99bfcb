/// Result alias that carries the custom [`ScopeError`] type.
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// The fixed resampling interval lies outside the accepted range.
    #[error("fixed interval of {seconds} s is outside the valid range {min}..={max} s")]
    InvalidInterval { seconds: i64, min: i64, max: i64 },
    /// A tick carried a different number of values than there are channels.
    #[error("tick carries {actual} values but the scope tracks {expected} channels")]
    ShapeMismatch { expected: usize, actual: usize },
    /// A tick arrived with a simulation time earlier than the previous one.
    #[error("simulation time went backwards from {previous} s to {current} s")]
    NonMonotonicTime { previous: i64, current: i64 },
    /// More channels were supplied than the host boundary supports.
    #[error("{count} channels were supplied but at most {max} are supported")]
    TooManyChannels { count: usize, max: usize },
    /// A lock guarding shared state was poisoned by a panicking thread.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    /// Free-form message for failures at the integration layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around configuration and snapshot (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ScopeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ScopeError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ScopeError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
