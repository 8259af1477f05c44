use thiserror::Error;

/// Configuration errors raised by the filtering layer.
#[derive(Debug, Error)]
pub enum FilterError {
    /// An active filter references a field the section never registered.
    /// This is a wiring mistake in the view adapter, surfaced at the call
    /// site rather than silently ignored.
    #[error("No filter definition registered for field '{0}'")]
    UnknownField(String),
}
