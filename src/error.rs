use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to parse trace file: {0}")]
    TraceError(#[from] TraceError),

    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors related to trace file parsing
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Invalid format at {0}:{1}: {2}")]
    ParseError(PathBuf, usize, String),
}

/// Errors related to resolving a run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cache size must be a power of two: got {0}")]
    NotPowerOfTwo(usize),

    #[error("Cache size {size} is not a multiple of line size {line_size}")]
    SizeNotMultipleOfLine { size: usize, line_size: usize },

    #[error("Associativity {assoc} exceeds the maximum supported ways per set ({max})")]
    TooManyWays { assoc: usize, max: usize },

    #[error("Set count is not a multiple of associativity: {block_num} blocks / {assoc} ways")]
    SetsNotDivisible { block_num: usize, assoc: usize },

    #[error("Set count must be a power of two: {block_num} blocks / {assoc} ways = {sets} sets")]
    SetsNotPowerOfTwo { block_num: usize, assoc: usize, sets: usize },

    #[error("SWP quota {q} out of range [0, {max_ways}]")]
    QuotaOutOfRange { q: usize, max_ways: usize },

    #[error("mode {0:?} requires num_cores == 2, got {1}")]
    WrongCoreCount(crate::config::Mode, usize),
}

/// Type alias for Result with SimError
pub type SimResult<T> = Result<T, SimError>;
