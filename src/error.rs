use thiserror::Error;

/// Errors surfaced while building the computation: configuration mistakes,
/// range parsing and stop-token loading. Measure comparisons themselves never
/// fail recoverably; they return their value and log warnings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("delimiters are required if the granularity is tokens")]
    MissingDelimiters,

    #[error("invalid range '{0}': expected 'start:end' with start < end")]
    InvalidRange(String),

    #[error("invalid split '{0}': expected 'blocks:id' with id < blocks")]
    InvalidSplit(String),

    #[error("range {start}:{end} exceeds the number of strings ({num})")]
    RangeOutOfBounds { start: usize, end: usize, num: usize },

    #[error("could not read stop token file '{path}': {source}")]
    StopTokenFile {
        path: String,
        source: std::io::Error,
    },
}
