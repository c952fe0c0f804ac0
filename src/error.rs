use thiserror::Error;

/// Errors raised by grid construction, configuration and action parsing.
///
/// Moves that leave the grid or hit a wall are not errors, and neither is
/// running out of iterations before convergence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An action outside the four cardinal directions.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A cell override that does not fit inside the grid.
    #[error("position ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Result type for grid-world operations
pub type Result<T> = std::result::Result<T, Error>;
