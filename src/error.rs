use thiserror::Error;

/// Internal invariant violations of the vector engine.
///
/// These should be unreachable as long as every vector in a generation is
/// built against the same global item index; if one fires it fails the
/// current request only and leaves shared state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}
