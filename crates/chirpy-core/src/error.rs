//! Core error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Chirp is too long: {length} characters (max {max})")]
    ChirpTooLong { length: usize, max: usize },
}
