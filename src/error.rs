use std::io;

/// Every fallible entry point in the crate returns this error.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A plan node was run without an operator ever being set on it.
    #[error("graph node has no operation configured")]
    EmptyOperation,

    /// `from_iter` referenced a name absent from the sources map passed to `run`.
    #[error("unbound source: {0}")]
    UnboundSource(String),

    /// A file-backed source or a sort spill run failed to read or write.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A row was missing a column a mapper, reducer or joiner needed.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A key tuple compared values of incompatible variants (e.g. a string
    /// against a number) in the same key column.
    #[error("incompatible value types in key column {column}")]
    IncompatibleKeyTypes { column: String },

    /// A user-supplied parser, mapper, reducer or joiner rejected its input.
    #[error("{0}")]
    Parse(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
