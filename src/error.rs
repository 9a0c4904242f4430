//! Crate-wide error type for the fail-fast preconditions of the core.
//!
//! Everything else (an empty edge set during add-node, a cycle-creating
//! candidate edge, an already-occupied edge key, ...) is a normal branch and
//! is handled as a no-op rather than an error.

#[derive(thiserror::Error, miette::Diagnostic, Debug)]
pub enum NeatError {
    #[error("input vector has {actual} values, network expects {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error("output_size ({output_size}) must be less than min_node_count ({min_node_count})")]
    OutputSizeTooLarge {
        output_size: usize,
        min_node_count: usize,
    },

    #[error("cannot adjust fitnesses over an empty fitness map")]
    EmptyFitnessMap,
}

pub type Result<T> = std::result::Result<T, NeatError>;
