// src/error.rs
use thiserror::Error;

/// Hard failures. Optional inputs (config files, custom rules, constraint
/// sentences) never error — they degrade to "strategy unavailable".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("file record {index} has an empty path")]
    EmptyPath { index: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
